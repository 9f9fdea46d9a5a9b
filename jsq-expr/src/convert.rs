//! Conversion between JSON values and script values

use std::collections::HashMap;

use jsq_format::{JsqError, Result, Value};
use rhai::{Array, Dynamic, Map};
use serde_json::Number;

/// Convert a JSON value into a script value.
pub fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(int) => Dynamic::from_int(int),
            None => Dynamic::from_float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Array(items) => Dynamic::from_array(items.iter().map(to_dynamic).collect()),
        Value::Object(map) => Dynamic::from_map(
            map.iter()
                .map(|(key, field)| (key.as_str().into(), to_dynamic(field)))
                .collect::<Map>(),
        ),
    }
}

/// Convert a script value back into JSON.
///
/// Non-finite floats become `null`. Functions and other host objects have no
/// data representation and fail.
pub fn from_dynamic(value: &Dynamic) -> Result<Value> {
    let value = value.flatten_clone();
    if value.is_unit() {
        return Ok(Value::Null);
    }
    if let Ok(b) = value.as_bool() {
        return Ok(Value::Bool(b));
    }
    if let Ok(int) = value.as_int() {
        return Ok(Value::Number(int.into()));
    }
    if let Ok(float) = value.as_float() {
        return Ok(Number::from_f64(float).map_or(Value::Null, Value::Number));
    }
    if let Ok(c) = value.as_char() {
        return Ok(Value::String(c.to_string()));
    }
    if value.is_string() {
        let text = value.into_string().map_err(unrepresentable)?;
        return Ok(Value::String(text));
    }
    if value.is_array() {
        let items: Array = value.into_array().map_err(unrepresentable)?;
        return items
            .iter()
            .map(from_dynamic)
            .collect::<Result<Vec<_>>>()
            .map(Value::Array);
    }
    if value.is_map() {
        let type_name = value.type_name();
        let map = value.try_cast::<Map>().ok_or_else(|| unrepresentable(type_name))?;
        let mut object = serde_json::Map::with_capacity(map.len());
        for (key, field) in &map {
            object.insert(key.to_string(), from_dynamic(field)?);
        }
        return Ok(Value::Object(object));
    }
    Err(unrepresentable(value.type_name()))
}

/// Restore input key order on a script result.
///
/// Script maps are key-sorted. Objects that mirror the input (same place in
/// the tree) take the order of their counterpart. Any other object takes
/// the order of the first input object whose keys cover its own, so
/// `$.users[0]` keeps the order it had under `users`. Keys unknown to the
/// chosen source follow in sorted order.
pub fn align_order(result: Value, input: &Value) -> Value {
    Aligner {
        root: input,
        found: HashMap::new(),
    }
    .align(result, Some(input))
}

type Object = serde_json::Map<String, Value>;

struct Aligner<'a> {
    root: &'a Value,
    // sorted key set -> covering input object
    found: HashMap<Vec<String>, Option<&'a Object>>,
}

impl<'a> Aligner<'a> {
    fn align(&mut self, result: Value, counterpart: Option<&'a Value>) -> Value {
        match result {
            Value::Object(map) => {
                let source = match counterpart {
                    Some(Value::Object(original)) if map.keys().any(|key| original.contains_key(key)) => {
                        Some(original)
                    }
                    _ => self.covering(&map),
                };
                let mut aligned = Object::with_capacity(map.len());
                let mut rest: Vec<(String, Value)> = map.into_iter().collect();
                for (key, field) in source.into_iter().flatten() {
                    if let Some(pos) = rest.iter().position(|(name, _)| name == key) {
                        let (name, value) = rest.remove(pos);
                        let value = self.align(value, Some(field));
                        aligned.insert(name, value);
                    }
                }
                for (name, value) in rest {
                    let value = self.align(value, None);
                    aligned.insert(name, value);
                }
                Value::Object(aligned)
            }
            Value::Array(items) => {
                let original = match counterpart {
                    Some(Value::Array(original)) => Some(original),
                    _ => None,
                };
                Value::Array(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(idx, item)| {
                            let field = original.and_then(|original| original.get(idx));
                            self.align(item, field)
                        })
                        .collect(),
                )
            }
            other => other,
        }
    }

    fn covering(&mut self, map: &Object) -> Option<&'a Object> {
        if map.is_empty() {
            return None;
        }
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        if let Some(found) = self.found.get(&keys) {
            return *found;
        }
        let found = find_covering(self.root, &keys);
        self.found.insert(keys, found);
        found
    }
}

fn find_covering<'a>(value: &'a Value, keys: &[String]) -> Option<&'a Object> {
    match value {
        Value::Object(map) => {
            if keys.iter().all(|key| map.contains_key(key)) {
                return Some(map);
            }
            map.values().find_map(|field| find_covering(field, keys))
        }
        Value::Array(items) => items.iter().find_map(|item| find_covering(item, keys)),
        _ => None,
    }
}

fn unrepresentable(type_name: &str) -> JsqError {
    JsqError::Runtime(format!(
        "result of type '{type_name}' cannot be represented as data"
    ))
}
