//! # Graph Options
//!
//! Global graph attributes with their defaults.
//!
//! The recognised names form a closed set (`GraphAttribute`). Options can be
//! set through typed accessors, through the validated `get`/`set` pair, or
//! deserialized from a config file; an unknown name is always an
//! `InvalidGraphOption` error.

use crate::types::DotGraphError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// RANK DIRECTION
// =============================================================================

/// Layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "BT")]
    BottomTop,
    #[serde(rename = "RL")]
    RightLeft,
}

impl RankDir {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::LeftRight => "LR",
            Self::BottomTop => "BT",
            Self::RightLeft => "RL",
        }
    }
}

impl fmt::Display for RankDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ATTRIBUTE NAMES
// =============================================================================

/// The recognised global attribute names, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphAttribute {
    Label,
    Fontname,
    Fontsize,
    Labelloc,
    Compound,
    Rankdir,
}

impl GraphAttribute {
    pub const ALL: [Self; 6] = [
        Self::Label,
        Self::Fontname,
        Self::Fontsize,
        Self::Labelloc,
        Self::Compound,
        Self::Rankdir,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Fontname => "fontname",
            Self::Fontsize => "fontsize",
            Self::Labelloc => "labelloc",
            Self::Compound => "compound",
            Self::Rankdir => "rankdir",
        }
    }
}

impl FromStr for GraphAttribute {
    type Err = DotGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str() == s)
            .ok_or_else(|| DotGraphError::InvalidGraphOption(s.to_string()))
    }
}

// =============================================================================
// GRAPH ATTRIBUTES
// =============================================================================

/// Global attributes of a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphAttributes {
    label: Option<String>,
    fontname: String,
    fontsize: u32,
    labelloc: String,
    compound: bool,
    rankdir: RankDir,
}

impl Default for GraphAttributes {
    fn default() -> Self {
        Self {
            label: None,
            fontname: "Arial".to_string(),
            fontsize: 18,
            labelloc: "t".to_string(),
            compound: true,
            rankdir: RankDir::TopBottom,
        }
    }
}

macro_rules! attribute_accessors {
    ($($field:ident, $setter:ident: $ty:ty;)*) => {
        impl GraphAttributes {
            $(
                pub fn $field(&self) -> &$ty {
                    &self.$field
                }

                pub fn $setter(&mut self, value: impl Into<$ty>) -> &mut Self {
                    self.$field = value.into();
                    self
                }
            )*
        }
    };
}

attribute_accessors! {
    fontname, set_fontname: String;
    fontsize, set_fontsize: u32;
    labelloc, set_labelloc: String;
    compound, set_compound: bool;
    rankdir, set_rankdir: RankDir;
}

impl GraphAttributes {
    /// Build from `(name, value)` options over the defaults.
    pub fn from_options<'a, I>(options: I) -> Result<Self, DotGraphError>
    where
        I: IntoIterator<Item = (&'a str, JsonValue)>,
    {
        let mut attrs = Self::default();
        for (name, value) in options {
            attrs.set(name, value)?;
        }
        Ok(attrs)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn clear_label(&mut self) -> &mut Self {
        self.label = None;
        self
    }

    /// Get an attribute by name.
    pub fn get(&self, name: &str) -> Result<JsonValue, DotGraphError> {
        Ok(self.value_of(name.parse()?))
    }

    /// Set an attribute by name. The value must have the attribute's type;
    /// a JSON null clears the label.
    pub fn set(&mut self, name: &str, value: JsonValue) -> Result<&mut Self, DotGraphError> {
        let attr: GraphAttribute = name.parse()?;
        let invalid = |e: serde_json::Error| {
            DotGraphError::InvalidGraphOption(format!("{} ({})", name, e))
        };
        match attr {
            GraphAttribute::Label => self.label = serde_json::from_value(value).map_err(invalid)?,
            GraphAttribute::Fontname => {
                self.fontname = serde_json::from_value(value).map_err(invalid)?;
            }
            GraphAttribute::Fontsize => {
                self.fontsize = serde_json::from_value(value).map_err(invalid)?;
            }
            GraphAttribute::Labelloc => {
                self.labelloc = serde_json::from_value(value).map_err(invalid)?;
            }
            GraphAttribute::Compound => {
                self.compound = serde_json::from_value(value).map_err(invalid)?;
            }
            GraphAttribute::Rankdir => {
                self.rankdir = serde_json::from_value(value).map_err(invalid)?;
            }
        }
        Ok(self)
    }

    /// Set an attribute from command-line text.
    ///
    /// String-typed attributes take the text verbatim. The others parse it
    /// as JSON, falling back to a plain string.
    pub fn set_str(&mut self, name: &str, raw: &str) -> Result<&mut Self, DotGraphError> {
        let value = match name.parse()? {
            GraphAttribute::Label | GraphAttribute::Fontname | GraphAttribute::Labelloc => {
                JsonValue::from(raw)
            }
            GraphAttribute::Fontsize | GraphAttribute::Compound | GraphAttribute::Rankdir => {
                serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::from(raw))
            }
        };
        self.set(name, value)
    }

    fn value_of(&self, attr: GraphAttribute) -> JsonValue {
        match attr {
            GraphAttribute::Label => self
                .label
                .as_deref()
                .map(JsonValue::from)
                .unwrap_or(JsonValue::Null),
            GraphAttribute::Fontname => JsonValue::from(self.fontname.as_str()),
            GraphAttribute::Fontsize => JsonValue::from(self.fontsize),
            GraphAttribute::Labelloc => JsonValue::from(self.labelloc.as_str()),
            GraphAttribute::Compound => JsonValue::from(self.compound),
            GraphAttribute::Rankdir => JsonValue::from(self.rankdir.as_str()),
        }
    }

    /// Attributes to emit, in enumeration order. An unset label is skipped.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, JsonValue)> {
        GraphAttribute::ALL
            .into_iter()
            .map(|attr| (attr.as_str(), self.value_of(attr)))
            .filter(|(_, value)| !value.is_null())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let attrs = GraphAttributes::default();
        assert_eq!(attrs.label(), None);
        assert_eq!(attrs.fontname(), "Arial");
        assert_eq!(*attrs.fontsize(), 18);
        assert_eq!(attrs.labelloc(), "t");
        assert!(*attrs.compound());
        assert_eq!(*attrs.rankdir(), RankDir::TopBottom);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = GraphAttributes::from_options([("colour", json!("red"))]);
        assert_eq!(
            err,
            Err(DotGraphError::InvalidGraphOption("colour".to_string()))
        );
    }

    #[test]
    fn wrong_type_is_rejected() {
        let mut attrs = GraphAttributes::default();
        let err = attrs.set("fontsize", json!("big"));
        assert!(matches!(err, Err(DotGraphError::InvalidGraphOption(_))));
        assert_eq!(*attrs.fontsize(), 18);
    }

    #[test]
    fn set_and_get_by_name() {
        let attrs = GraphAttributes::from_options([
            ("label", json!("Example")),
            ("rankdir", json!("LR")),
        ])
        .expect("valid options");
        assert_eq!(attrs.get("label").expect("known"), json!("Example"));
        assert_eq!(*attrs.rankdir(), RankDir::LeftRight);
    }

    #[test]
    fn set_str_parses_json_or_falls_back_to_text() {
        let mut attrs = GraphAttributes::default();
        attrs.set_str("fontsize", "24").expect("number");
        attrs.set_str("fontname", "Courier").expect("text");
        assert_eq!(*attrs.fontsize(), 24);
        assert_eq!(attrs.fontname(), "Courier");
    }

    #[test]
    fn set_str_keeps_text_attributes_verbatim() {
        let mut attrs = GraphAttributes::default();
        attrs.set_str("label", "2024").expect("numeric text");
        assert_eq!(attrs.label(), Some("2024"));
        attrs.set_str("label", "null").expect("null text");
        assert_eq!(attrs.label(), Some("null"));
        attrs.set_str("fontname", "123").expect("numeric text");
        assert_eq!(attrs.fontname(), "123");
        attrs.set_str("labelloc", "true").expect("bool text");
        assert_eq!(attrs.labelloc(), "true");

        attrs.set_str("compound", "false").expect("bool");
        attrs.set_str("rankdir", "LR").expect("bare text");
        assert!(!*attrs.compound());
        assert_eq!(*attrs.rankdir(), RankDir::LeftRight);
        assert!(matches!(
            attrs.set_str("shape", "box"),
            Err(DotGraphError::InvalidGraphOption(_))
        ));
    }

    #[test]
    fn entries_skip_unset_label() {
        let mut attrs = GraphAttributes::default();
        let names: Vec<_> = attrs.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["fontname", "fontsize", "labelloc", "compound", "rankdir"]
        );
        attrs.set_label("G");
        assert_eq!(attrs.entries()[0], ("label", json!("G")));
    }

    #[test]
    fn chained_setters() {
        let mut attrs = GraphAttributes::default();
        attrs
            .set_fontname("Courier")
            .set_rankdir(RankDir::BottomTop)
            .set_compound(false);
        assert_eq!(attrs.fontname(), "Courier");
        assert_eq!(*attrs.rankdir(), RankDir::BottomTop);
        assert!(!*attrs.compound());
    }
}
