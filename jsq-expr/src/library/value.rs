//! Helpers for inspecting script values

use std::cmp::Ordering;

use rhai::{Array, Dynamic, Map, NativeCallContext};

use super::RhaiResult;

/// Elements of a collection: array items, or map values in key order.
/// `()` is an empty collection.
pub(crate) fn items(value: &Dynamic, op: &str) -> Result<Array, Box<rhai::EvalAltResult>> {
    let value = value.flatten_clone();
    if value.is_unit() {
        return Ok(Array::new());
    }
    if let Some(map) = as_map(&value) {
        return Ok(map.into_values().collect());
    }
    let type_name = value.type_name();
    value
        .try_cast::<Array>()
        .ok_or_else(|| format!("{op} expects an array or object map, got {type_name}").into())
}

pub(crate) fn as_map(value: &Dynamic) -> Option<Map> {
    value.flatten_clone().try_cast::<Map>()
}

pub(crate) fn as_array(value: &Dynamic) -> Option<Array> {
    value.flatten_clone().try_cast::<Array>()
}

pub(crate) fn as_string(value: &Dynamic) -> Option<String> {
    let value = value.flatten_clone();
    if let Ok(c) = value.as_char() {
        return Some(c.to_string());
    }
    value.into_string().ok()
}

pub(crate) fn as_number(value: &Dynamic) -> Option<f64> {
    let value = value.flatten_clone();
    match value.as_int() {
        Ok(int) => Some(int as f64),
        Err(_) => value.as_float().ok(),
    }
}

pub(crate) fn as_count(value: &Dynamic, op: &str) -> Result<usize, Box<rhai::EvalAltResult>> {
    match value.flatten_clone().as_int() {
        Ok(n) => Ok(usize::try_from(n).unwrap_or(0)),
        Err(type_name) => Err(format!("{op} expects an integer count, got {type_name}").into()),
    }
}

/// Loose truthiness: `()`, `false`, zero, NaN and `""` are false.
pub(crate) fn truthy(value: &Dynamic) -> bool {
    let value = value.flatten_clone();
    if value.is_unit() {
        return false;
    }
    if let Ok(b) = value.as_bool() {
        return b;
    }
    if let Some(n) = as_number(&value) {
        return n != 0.0 && !n.is_nan();
    }
    if value.is_string() {
        return value.into_string().map(|s| !s.is_empty()).unwrap_or(true);
    }
    true
}

/// Key used for grouping and de-duplication.
pub(crate) fn key_string(value: &Dynamic) -> String {
    let value = value.flatten_clone();
    if value.is_unit() {
        return "null".to_string();
    }
    match as_string(&value) {
        Some(text) => text,
        None => value.to_string(),
    }
}

fn rank(value: &Dynamic) -> u8 {
    if value.is_unit() {
        0
    } else if value.is_bool() {
        1
    } else if value.is_int() || value.is_float() {
        2
    } else if value.is_string() || value.is_char() {
        3
    } else if value.is_array() {
        4
    } else if value.is_map() {
        5
    } else {
        6
    }
}

/// Total order used by `sort_by`, `min` and friends: values of different
/// kinds order by kind, numbers numerically, containers element-wise.
pub(crate) fn compare(a: &Dynamic, b: &Dynamic) -> Ordering {
    let (a, b) = (a.flatten_clone(), b.flatten_clone());
    let by_rank = rank(&a).cmp(&rank(&b));
    if by_rank != Ordering::Equal {
        return by_rank;
    }
    if let (Some(x), Some(y)) = (as_number(&a), as_number(&b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    if let (Ok(x), Ok(y)) = (a.as_bool(), b.as_bool()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (as_string(&a), as_string(&b)) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (as_array(&a), as_array(&b)) {
        for (left, right) in x.iter().zip(y.iter()) {
            let ord = compare(left, right);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        return x.len().cmp(&y.len());
    }
    if let (Some(x), Some(y)) = (as_map(&a), as_map(&b)) {
        for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
            let ord = lk.cmp(rk).then_with(|| compare(lv, rv));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        return x.len().cmp(&y.len());
    }
    Ordering::Equal
}

pub(crate) fn equals(a: &Dynamic, b: &Dynamic) -> bool {
    compare(a, b) == Ordering::Equal
}

/// Follow a dotted path (`a.b.0`) or an array of keys through maps and arrays.
pub(crate) fn get_path(value: &Dynamic, path: &Dynamic) -> Option<Dynamic> {
    let segments: Vec<String> = match as_array(path) {
        Some(keys) => keys.iter().map(key_string).collect(),
        None => key_string(path).split('.').map(str::to_string).collect(),
    };

    let mut current = value.flatten_clone();
    for segment in &segments {
        current = if let Some(map) = as_map(&current) {
            map.get(segment.as_str())?.clone()
        } else if let Some(array) = as_array(&current) {
            let idx = segment.parse::<usize>().ok()?;
            array.get(idx)?.clone()
        } else {
            return None;
        };
    }
    Some(current)
}

/// Partial deep match used when an object map is given as an iteratee.
pub(crate) fn matches(value: &Dynamic, pattern: &Map) -> bool {
    let Some(map) = as_map(value) else {
        return false;
    };
    pattern.iter().all(|(key, expected)| match map.get(key.as_str()) {
        Some(actual) => match as_map(expected) {
            Some(nested) => matches(actual, &nested),
            None => equals(actual, expected),
        },
        None => false,
    })
}

/// Apply an iteratee: a function, a property path or a match pattern.
/// `()` is the identity.
pub(crate) fn call_iteratee(
    ctx: &NativeCallContext,
    iteratee: &Dynamic,
    item: Dynamic,
) -> RhaiResult {
    let iteratee = iteratee.flatten_clone();
    if iteratee.is_unit() {
        return Ok(item);
    }
    if iteratee.is::<rhai::FnPtr>() {
        let f = iteratee.cast::<rhai::FnPtr>();
        return f.call_within_context::<Dynamic>(ctx, (item,));
    }
    if let Some(pattern) = as_map(&iteratee) {
        return Ok(Dynamic::from_bool(matches(&item, &pattern)));
    }
    if as_string(&iteratee).is_some() || iteratee.is_int() || iteratee.is_array() {
        return Ok(get_path(&item, &iteratee).unwrap_or(Dynamic::UNIT));
    }
    Err(format!(
        "iteratee must be a function, property path or object map, got {}",
        iteratee.type_name()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Dynamic)]) -> Dynamic {
        Dynamic::from_map(
            entries
                .iter()
                .map(|(k, v)| ((*k).into(), v.clone()))
                .collect::<Map>(),
        )
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&Dynamic::UNIT));
        assert!(!truthy(&Dynamic::from_int(0)));
        assert!(!truthy(&Dynamic::from("")));
        assert!(truthy(&Dynamic::from("0")));
        assert!(truthy(&Dynamic::from_array(Array::new())));
    }

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(compare(&Dynamic::from_int(2), &Dynamic::from_float(2.5)), Ordering::Less);
        assert!(equals(&Dynamic::from_int(1), &Dynamic::from_float(1.0)));
        assert_eq!(compare(&Dynamic::UNIT, &Dynamic::from_int(0)), Ordering::Less);
    }

    #[test]
    fn paths_walk_maps_and_arrays() {
        let value = map(&[(
            "a",
            Dynamic::from_array(vec![map(&[("b", Dynamic::from_int(7))])]),
        )]);
        let found = get_path(&value, &Dynamic::from("a.0.b")).unwrap();
        assert_eq!(found.as_int().unwrap(), 7);
        assert!(get_path(&value, &Dynamic::from("a.1.b")).is_none());
    }

    #[test]
    fn patterns_match_partially() {
        let value = map(&[("a", Dynamic::from_int(1)), ("b", Dynamic::from("x"))]);
        let pattern = as_map(&map(&[("a", Dynamic::from_int(1))])).unwrap();
        assert!(matches(&value, &pattern));
        let pattern = as_map(&map(&[("c", Dynamic::UNIT)])).unwrap();
        assert!(!matches(&value, &pattern));
    }
}
