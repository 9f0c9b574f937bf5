//! # Autolabel
//!
//! Default label derivation for nodes that were not given one.
//!
//! The label is two lines: the runtime type tag, then a short rendering
//! of the value. `autolabel` is total; it never fails, whatever the shape of
//! the heap (prototype-less objects, missing constructors, prototype
//! cycles, foreign handles).

use crate::value::{Heap, Value, format_number};

/// Constructor name used when none can be found on the prototype chain.
const FALLBACK_CONSTRUCTOR: &str = "Object";

/// Derive the default label for `value`.
#[must_use]
pub fn autolabel(heap: &Heap, value: &Value) -> String {
    let type_tag = heap.type_of(value);
    match value {
        Value::Null => "null".to_string(),
        Value::Undefined => "undefined".to_string(),
        Value::Object(id) => {
            if let Some(ctor) = heap.get_own(*id, "constructor") {
                let name = ctor
                    .as_object()
                    .and_then(|c| heap.function_name(c))
                    .unwrap_or("");
                format!("{}\n{}.prototype", type_tag, name)
            } else if heap.is_function(value) {
                match heap.function_name(*id) {
                    Some(name) if !name.is_empty() => format!("function\n{}", name),
                    _ => "function".to_string(),
                }
            } else {
                let ctor = heap
                    .constructor_name(*id)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(FALLBACK_CONSTRUCTOR);
                let inner = heap.value_of(value);
                if inner.is_primitive() {
                    format!("object\nnew {}({})", ctor, primitive_json(heap, &inner))
                } else {
                    format!("object\nnew {}(...)", ctor)
                }
            }
        }
        primitive => format!("{}\n{}", type_tag, primitive_json(heap, primitive)),
    }
}

/// JSON-style rendering of a primitive.
fn primitive_json(heap: &Heap, value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::String(s) => serde_json::Value::from(s.as_str()).to_string(),
        Value::Symbol(id) => format!("Symbol({})", heap.symbol_description(*id)),
        Value::Object(_) => "...".to_string(),
    }
}
