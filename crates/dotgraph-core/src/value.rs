//! # Value Model
//!
//! The values a graph node can represent and the explorer can walk.
//!
//! A `Heap` is an append-only arena of objects. Each object has a kind, an
//! optional prototype and an ordered list of own properties. A `Value` is
//! either a primitive or a handle into the heap.
//!
//! ## Identity
//!
//! Graph registries and explorations deduplicate by `Identity`, never by
//! structure:
//! - primitives are identified by their value (numbers use same-value-zero:
//!   `-0` equals `0`, every NaN equals every other NaN)
//! - symbols and objects are identified by their handle, so two objects with
//!   identical properties are still two distinct identities
//!
//! ## Intrinsics
//!
//! Every heap starts with `Object.prototype` (no prototype and no own
//! properties), `Function.prototype`, and the `Array`, `Number`, `String`
//! and `Boolean` constructor/prototype pairs.

use std::collections::BTreeSet;

// =============================================================================
// HANDLES
// =============================================================================

/// Handle to an object allocated in a `Heap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

/// Handle to a symbol allocated in a `Heap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub usize);

// =============================================================================
// VALUE & IDENTITY
// =============================================================================

/// A value that a node can represent.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Symbol(SymbolId),
    Object(ObjectId),
}

impl Value {
    /// The identity key of this value.
    #[must_use]
    pub fn identity(&self) -> Identity {
        match self {
            Self::Undefined => Identity::Undefined,
            Self::Null => Identity::Null,
            Self::Bool(b) => Identity::Bool(*b),
            Self::Number(n) => Identity::Number(number_bits(*n)),
            Self::String(s) => Identity::String(s.clone()),
            Self::Symbol(id) => Identity::Symbol(*id),
            Self::Object(id) => Identity::Object(*id),
        }
    }

    /// Whether this value is a primitive (anything but an object handle).
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        !matches!(self, Self::Object(_))
    }

    /// Whether this value is `null` or `undefined`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// The object handle, if this value is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Self::Object(id)
    }
}

impl From<SymbolId> for Value {
    fn from(id: SymbolId) -> Self {
        Self::Symbol(id)
    }
}

/// Ordered identity key of a `Value`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identity {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    String(String),
    Symbol(SymbolId),
    Object(ObjectId),
}

/// Same-value-zero bit pattern.
fn number_bits(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0.0f64.to_bits()
    } else {
        n.to_bits()
    }
}

/// Format a number the way it is written in JSON-ish text.
///
/// Integral values print without a fractional part, `-0` prints as `0`,
/// and the non-finite values print as `NaN`, `Infinity` and `-Infinity`.
/// Magnitudes from `1e21` up and below `1e-6` use exponent notation with
/// an explicit sign (`1e+21`, `1.5e-7`).
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n.is_sign_negative() {
            "-Infinity".to_string()
        } else {
            "Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => text,
        }
    } else {
        format!("{}", n)
    }
}

// =============================================================================
// OBJECTS
// =============================================================================

/// What kind of object a heap slot holds.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    /// A plain object.
    Ordinary,
    /// A callable object. Its name lives in the own `name` property.
    Function,
    /// An array; elements are own properties `"0"`, `"1"`, ...
    Array,
    /// A wrapper around a primitive, as produced by `new Number(42)`.
    Boxed(Value),
}

/// A heap object.
#[derive(Debug, Clone)]
pub struct Object {
    pub kind: ObjectKind,
    pub prototype: Option<ObjectId>,
    properties: Vec<(String, Value)>,
}

impl Object {
    fn new(kind: ObjectKind, prototype: Option<ObjectId>) -> Self {
        Self {
            kind,
            prototype,
            properties: Vec::new(),
        }
    }

    /// Own properties in definition order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn own(&self, key: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn define(&mut self, key: &str, value: Value) {
        match self.properties.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((key.to_string(), value)),
        }
    }
}

/// Handles of the objects every heap starts with.
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub object_prototype: ObjectId,
    pub function_prototype: ObjectId,
    pub array: ObjectId,
    pub array_prototype: ObjectId,
    pub number_prototype: ObjectId,
    pub string_prototype: ObjectId,
    pub boolean_prototype: ObjectId,
}

// =============================================================================
// HEAP
// =============================================================================

/// Append-only arena of objects and symbols.
#[derive(Debug, Clone)]
pub struct Heap {
    objects: Vec<Object>,
    symbols: Vec<String>,
    intrinsics: Intrinsics,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    /// Create a heap holding only the intrinsic objects.
    #[must_use]
    pub fn new() -> Self {
        let object_prototype = ObjectId(0);
        let function_prototype = ObjectId(1);
        let mut heap = Self {
            objects: vec![
                Object::new(ObjectKind::Ordinary, None),
                Object::new(ObjectKind::Function, Some(object_prototype)),
            ],
            symbols: Vec::new(),
            intrinsics: Intrinsics {
                object_prototype,
                function_prototype,
                array: object_prototype,
                array_prototype: object_prototype,
                number_prototype: object_prototype,
                string_prototype: object_prototype,
                boolean_prototype: object_prototype,
            },
        };

        let (array, array_prototype) = heap.define_class("Array");
        let (_, number_prototype) = heap.define_class("Number");
        let (_, string_prototype) = heap.define_class("String");
        let (_, boolean_prototype) = heap.define_class("Boolean");

        for (prototype, boxed) in [
            (number_prototype, Value::Number(0.0)),
            (string_prototype, Value::String(String::new())),
            (boolean_prototype, Value::Bool(false)),
        ] {
            heap.install_value_of(prototype);
            if let Some(object) = heap.objects.get_mut(prototype.0) {
                object.kind = ObjectKind::Boxed(boxed);
            }
        }

        heap.intrinsics.array = array;
        heap.intrinsics.array_prototype = array_prototype;
        heap.intrinsics.number_prototype = number_prototype;
        heap.intrinsics.string_prototype = string_prototype;
        heap.intrinsics.boolean_prototype = boolean_prototype;
        heap
    }

    /// Handles of the intrinsic objects.
    #[must_use]
    pub const fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// Number of allocated objects, intrinsics included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Always false: a heap holds its intrinsics from creation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.0)
    }

    fn alloc(&mut self, kind: ObjectKind, prototype: Option<ObjectId>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(Object::new(kind, prototype));
        id
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Allocate a plain object inheriting from `Object.prototype`.
    pub fn object(&mut self) -> ObjectId {
        self.alloc(ObjectKind::Ordinary, Some(self.intrinsics.object_prototype))
    }

    /// Allocate a plain object with an explicit (possibly absent) prototype.
    pub fn object_with_prototype(&mut self, prototype: Option<ObjectId>) -> ObjectId {
        self.alloc(ObjectKind::Ordinary, prototype)
    }

    /// Allocate a function without a `prototype` property.
    ///
    /// An empty name makes the function anonymous.
    pub fn method(&mut self, name: &str) -> ObjectId {
        let id = self.alloc(ObjectKind::Function, Some(self.intrinsics.function_prototype));
        if !name.is_empty() {
            self.set(id, "name", Value::from(name));
        }
        id
    }

    /// Allocate a constructor function together with its prototype object.
    ///
    /// The prototype object inherits from `Object.prototype` and points back
    /// at the constructor through its own `constructor` property.
    pub fn define_class(&mut self, name: &str) -> (ObjectId, ObjectId) {
        let constructor = self.method(name);
        let prototype = self.object();
        self.set(constructor, "prototype", Value::Object(prototype));
        self.set(prototype, "constructor", Value::Object(constructor));
        (constructor, prototype)
    }

    /// Allocate a constructor function and return it.
    pub fn function(&mut self, name: &str) -> ObjectId {
        self.define_class(name).0
    }

    /// Allocate an array holding `items`.
    pub fn array(&mut self, items: Vec<Value>) -> ObjectId {
        let id = self.alloc(ObjectKind::Array, Some(self.intrinsics.array_prototype));
        let len = items.len();
        for (i, item) in items.into_iter().enumerate() {
            self.set(id, &i.to_string(), item);
        }
        self.set(id, "length", Value::Number(len as f64));
        id
    }

    /// Allocate a wrapper object around a primitive.
    ///
    /// Wrapping an object returns the object itself.
    pub fn boxed(&mut self, primitive: Value) -> ObjectId {
        let prototype = match &primitive {
            Value::Object(id) => return *id,
            Value::Number(_) => self.intrinsics.number_prototype,
            Value::String(_) => self.intrinsics.string_prototype,
            Value::Bool(_) => self.intrinsics.boolean_prototype,
            _ => self.intrinsics.object_prototype,
        };
        self.alloc(ObjectKind::Boxed(primitive), Some(prototype))
    }

    /// Allocate a fresh symbol.
    pub fn symbol(&mut self, description: &str) -> Value {
        let id = SymbolId(self.symbols.len());
        self.symbols.push(description.to_string());
        Value::Symbol(id)
    }

    /// Description of a symbol, empty for foreign handles.
    #[must_use]
    pub fn symbol_description(&self, id: SymbolId) -> &str {
        self.symbols.get(id.0).map(String::as_str).unwrap_or("")
    }

    fn install_value_of(&mut self, prototype: ObjectId) {
        let value_of = self.method("valueOf");
        self.set(prototype, "valueOf", Value::Object(value_of));
    }

    // -------------------------------------------------------------------------
    // Properties & prototypes
    // -------------------------------------------------------------------------

    /// Define or overwrite an own property. Ignored for foreign handles.
    pub fn set(&mut self, id: ObjectId, key: &str, value: Value) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.define(key, value);
        }
    }

    /// Own property lookup.
    #[must_use]
    pub fn get_own(&self, id: ObjectId, key: &str) -> Option<&Value> {
        self.get(id)?.own(key)
    }

    /// Whether `key` is an own property of `id`.
    #[must_use]
    pub fn has_own(&self, id: ObjectId, key: &str) -> bool {
        self.get_own(id, key).is_some()
    }

    /// Property lookup through the prototype chain.
    ///
    /// Cyclic prototype chains end the lookup instead of looping.
    #[must_use]
    pub fn lookup(&self, id: ObjectId, key: &str) -> Option<&Value> {
        let mut seen = BTreeSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if !seen.insert(cur) {
                return None;
            }
            let object = self.get(cur)?;
            if let Some(v) = object.own(key) {
                return Some(v);
            }
            current = object.prototype;
        }
        None
    }

    /// The prototype of an object.
    #[must_use]
    pub fn prototype_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.get(id)?.prototype
    }

    /// The prototype of any value: primitives resolve to the prototype of
    /// their wrapper. Nullish values and symbols have none.
    #[must_use]
    pub fn prototype_of_value(&self, value: &Value) -> Option<ObjectId> {
        match value {
            Value::Object(id) => self.prototype_of(*id),
            Value::Bool(_) => Some(self.intrinsics.boolean_prototype),
            Value::Number(_) => Some(self.intrinsics.number_prototype),
            Value::String(_) => Some(self.intrinsics.string_prototype),
            Value::Undefined | Value::Null | Value::Symbol(_) => None,
        }
    }

    /// Replace the prototype of an object.
    pub fn set_prototype(&mut self, id: ObjectId, prototype: Option<ObjectId>) {
        if let Some(object) = self.objects.get_mut(id.0) {
            object.prototype = prototype;
        }
    }

    // -------------------------------------------------------------------------
    // Reflection
    // -------------------------------------------------------------------------

    /// The runtime type tag of a value.
    #[must_use]
    pub fn type_of(&self, value: &Value) -> &'static str {
        match value {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(id) => match self.get(*id).map(|o| &o.kind) {
                Some(ObjectKind::Function) => "function",
                _ => "object",
            },
        }
    }

    /// Whether the value is a callable object.
    #[must_use]
    pub fn is_function(&self, value: &Value) -> bool {
        self.type_of(value) == "function"
    }

    /// Result of `valueOf()`: the wrapped primitive for boxed objects, the
    /// value itself otherwise.
    #[must_use]
    pub fn value_of(&self, value: &Value) -> Value {
        let boxed = value
            .as_object()
            .and_then(|id| self.get(id))
            .and_then(|object| match &object.kind {
                ObjectKind::Boxed(inner) => Some(inner.clone()),
                _ => None,
            });
        boxed.unwrap_or_else(|| value.clone())
    }

    /// The own `name` of a function, if it is a string.
    #[must_use]
    pub fn function_name(&self, id: ObjectId) -> Option<&str> {
        match self.get_own(id, "name") {
            Some(Value::String(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// `constructor.name` as seen through the prototype chain.
    #[must_use]
    pub fn constructor_name(&self, id: ObjectId) -> Option<&str> {
        match self.lookup(id, "constructor") {
            Some(Value::Object(ctor)) => self.function_name(*ctor),
            _ => None,
        }
    }

    /// Short human description of a value, used in error messages.
    #[must_use]
    pub fn describe(&self, value: &Value) -> String {
        match value {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => serde_json::Value::from(s.as_str()).to_string(),
            Value::Symbol(id) => format!("Symbol({})", self.symbol_description(*id)),
            Value::Object(id) => {
                if self.is_function(value) {
                    match self.function_name(*id) {
                        Some(name) => format!("[Function: {}]", name),
                        None => "[Function (anonymous)]".to_string(),
                    }
                } else {
                    format!("[object #{}]", id.0)
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // JSON import
    // -------------------------------------------------------------------------

    /// Load a JSON document into the heap.
    ///
    /// Objects and arrays become fresh heap objects (every JSON object is its
    /// own identity); scalars become primitives.
    pub fn load_json(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let items = items.iter().map(|item| self.load_json(item)).collect();
                Value::Object(self.array(items))
            }
            serde_json::Value::Object(map) => {
                let id = self.object();
                for (key, item) in map {
                    let item = self.load_json(item);
                    self.set(id, key, item);
                }
                Value::Object(id)
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
