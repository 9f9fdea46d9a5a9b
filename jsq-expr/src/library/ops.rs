//! Collection operations shared by `_`, `fp` and `$$`
//!
//! Every operation takes its data first. The registration layer flips the
//! argument order for `fp`.

use std::collections::HashSet;

use rhai::{Array, Dynamic, Map, NativeCallContext};

use super::RhaiResult;

use super::value::{
    as_array, as_count, as_map, as_number, as_string, call_iteratee, compare, equals, get_path,
    items, key_string, truthy,
};

// Iteratee operations

pub(crate) fn map(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mapped = items(&data, "map")?
        .into_iter()
        .map(|item| call_iteratee(ctx, &f, item))
        .collect::<Result<Array, _>>()?;
    Ok(Dynamic::from_array(mapped))
}

fn select(ctx: &NativeCallContext, data: &Dynamic, f: &Dynamic, keep: bool, op: &str) -> RhaiResult {
    let mut selected = Array::new();
    for item in items(data, op)? {
        if truthy(&call_iteratee(ctx, f, item.clone())?) == keep {
            selected.push(item);
        }
    }
    Ok(Dynamic::from_array(selected))
}

pub(crate) fn filter(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    select(ctx, &data, &f, true, "filter")
}

pub(crate) fn reject(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    select(ctx, &data, &f, false, "reject")
}

pub(crate) fn find(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    for item in items(&data, "find")? {
        if truthy(&call_iteratee(ctx, &f, item.clone())?) {
            return Ok(item);
        }
    }
    Ok(Dynamic::UNIT)
}

pub(crate) fn some(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    for item in items(&data, "some")? {
        if truthy(&call_iteratee(ctx, &f, item)?) {
            return Ok(Dynamic::TRUE);
        }
    }
    Ok(Dynamic::FALSE)
}

pub(crate) fn every(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    for item in items(&data, "every")? {
        if !truthy(&call_iteratee(ctx, &f, item)?) {
            return Ok(Dynamic::FALSE);
        }
    }
    Ok(Dynamic::TRUE)
}

fn keyed(ctx: &NativeCallContext, data: &Dynamic, f: &Dynamic, op: &str) -> Result<Vec<(Dynamic, Dynamic)>, Box<rhai::EvalAltResult>> {
    items(data, op)?
        .into_iter()
        .map(|item| Ok((call_iteratee(ctx, f, item.clone())?, item)))
        .collect()
}

pub(crate) fn sort_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mut pairs = keyed(ctx, &data, &f, "sort_by")?;
    pairs.sort_by(|(a, _), (b, _)| compare(a, b));
    Ok(Dynamic::from_array(pairs.into_iter().map(|(_, item)| item).collect()))
}

pub(crate) fn group_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mut groups = Map::new();
    for (key, item) in keyed(ctx, &data, &f, "group_by")? {
        let slot = groups
            .entry(key_string(&key).into())
            .or_insert_with(|| Dynamic::from_array(Array::new()));
        if let Some(mut group) = slot.write_lock::<Array>() {
            group.push(item);
        }
    }
    Ok(Dynamic::from_map(groups))
}

pub(crate) fn key_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mut keyed_map = Map::new();
    for (key, item) in keyed(ctx, &data, &f, "key_by")? {
        keyed_map.insert(key_string(&key).into(), item);
    }
    Ok(Dynamic::from_map(keyed_map))
}

pub(crate) fn count_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mut counts = Map::new();
    for (key, _) in keyed(ctx, &data, &f, "count_by")? {
        let slot = counts
            .entry(key_string(&key).into())
            .or_insert(Dynamic::from_int(0));
        let next = slot.as_int().unwrap_or(0) + 1;
        *slot = Dynamic::from_int(next);
    }
    Ok(Dynamic::from_map(counts))
}

pub(crate) fn partition(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let (mut pass, mut fail) = (Array::new(), Array::new());
    for (key, item) in keyed(ctx, &data, &f, "partition")? {
        if truthy(&key) {
            pass.push(item);
        } else {
            fail.push(item);
        }
    }
    Ok(Dynamic::from_array(vec![
        Dynamic::from_array(pass),
        Dynamic::from_array(fail),
    ]))
}

pub(crate) fn uniq_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let mut seen = HashSet::new();
    let unique = keyed(ctx, &data, &f, "uniq_by")?
        .into_iter()
        .filter(|(key, _)| seen.insert(key_string(key)))
        .map(|(_, item)| item)
        .collect();
    Ok(Dynamic::from_array(unique))
}

pub(crate) fn sum_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let values = keyed(ctx, &data, &f, "sum_by")?
        .into_iter()
        .map(|(key, _)| key)
        .collect();
    sum(Dynamic::from_array(values))
}

fn extreme_by(ctx: &NativeCallContext, data: &Dynamic, f: &Dynamic, want_max: bool, op: &str) -> RhaiResult {
    let pairs = keyed(ctx, data, f, op)?;
    let best = pairs.into_iter().reduce(|best, candidate| {
        let ord = compare(&candidate.0, &best.0);
        let better = if want_max { ord.is_gt() } else { ord.is_lt() };
        if better {
            candidate
        } else {
            best
        }
    });
    Ok(best.map(|(_, item)| item).unwrap_or(Dynamic::UNIT))
}

pub(crate) fn min_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    extreme_by(ctx, &data, &f, false, "min_by")
}

pub(crate) fn max_by(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    extreme_by(ctx, &data, &f, true, "max_by")
}

pub(crate) fn map_values(ctx: &NativeCallContext, data: Dynamic, f: Dynamic) -> RhaiResult {
    let source = match as_map(&data) {
        Some(map) => map,
        None => match as_array(&data) {
            Some(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| (idx.to_string().into(), item))
                .collect(),
            None => return Err(format!("map_values expects an object map, got {}", data.type_name()).into()),
        },
    };
    let mut mapped = Map::new();
    for (key, field) in source {
        let value = call_iteratee(ctx, &f, field)?;
        mapped.insert(key, value);
    }
    Ok(Dynamic::from_map(mapped))
}

// Operations with an argument

pub(crate) fn take(data: Dynamic, n: Dynamic) -> RhaiResult {
    let n = as_count(&n, "take")?;
    Ok(Dynamic::from_array(items(&data, "take")?.into_iter().take(n).collect()))
}

pub(crate) fn drop(data: Dynamic, n: Dynamic) -> RhaiResult {
    let n = as_count(&n, "drop")?;
    Ok(Dynamic::from_array(items(&data, "drop")?.into_iter().skip(n).collect()))
}

pub(crate) fn chunk(data: Dynamic, size: Dynamic) -> RhaiResult {
    let size = as_count(&size, "chunk")?;
    if size == 0 {
        return Ok(Dynamic::from_array(Array::new()));
    }
    let chunks = items(&data, "chunk")?
        .chunks(size)
        .map(|chunk| Dynamic::from_array(chunk.to_vec()))
        .collect();
    Ok(Dynamic::from_array(chunks))
}

pub(crate) fn get(data: Dynamic, path: Dynamic) -> RhaiResult {
    Ok(get_path(&data, &path).unwrap_or(Dynamic::UNIT))
}

pub(crate) fn has(data: Dynamic, path: Dynamic) -> RhaiResult {
    Ok(Dynamic::from_bool(get_path(&data, &path).is_some()))
}

fn key_list(keys: &Dynamic) -> Vec<String> {
    match as_array(keys) {
        Some(list) => list.iter().map(key_string).collect(),
        None => vec![key_string(keys)],
    }
}

pub(crate) fn pick(data: Dynamic, keys: Dynamic) -> RhaiResult {
    let source = as_map(&data).unwrap_or_default();
    let picked: Map = key_list(&keys)
        .into_iter()
        .filter_map(|key| {
            let field = source.get(key.as_str())?.clone();
            Some((key.into(), field))
        })
        .collect();
    Ok(Dynamic::from_map(picked))
}

pub(crate) fn omit(data: Dynamic, keys: Dynamic) -> RhaiResult {
    let mut source = as_map(&data).unwrap_or_default();
    for key in key_list(&keys) {
        source.remove(key.as_str());
    }
    Ok(Dynamic::from_map(source))
}

pub(crate) fn includes(data: Dynamic, needle: Dynamic) -> RhaiResult {
    if let Some(text) = as_string(&data) {
        let found = as_string(&needle).is_some_and(|needle| text.contains(&needle));
        return Ok(Dynamic::from_bool(found));
    }
    let found = items(&data, "includes")?
        .iter()
        .any(|item| equals(item, &needle));
    Ok(Dynamic::from_bool(found))
}

pub(crate) fn join(data: Dynamic, separator: Dynamic) -> RhaiResult {
    let separator = if separator.is_unit() {
        ",".to_string()
    } else {
        key_string(&separator)
    };
    let parts: Vec<String> = items(&data, "join")?
        .iter()
        .map(|item| if item.is_unit() { String::new() } else { key_string(item) })
        .collect();
    Ok(Dynamic::from(parts.join(&separator)))
}

// Unary operations

pub(crate) fn keys(data: Dynamic) -> RhaiResult {
    let keys: Array = match as_map(&data) {
        Some(map) => map.keys().map(|key| Dynamic::from(key.to_string())).collect(),
        None => (0..items(&data, "keys")?.len())
            .map(|idx| Dynamic::from(idx.to_string()))
            .collect(),
    };
    Ok(Dynamic::from_array(keys))
}

pub(crate) fn values(data: Dynamic) -> RhaiResult {
    Ok(Dynamic::from_array(items(&data, "values")?))
}

pub(crate) fn entries(data: Dynamic) -> RhaiResult {
    let pairs: Array = match as_map(&data) {
        Some(map) => map
            .into_iter()
            .map(|(key, field)| Dynamic::from_array(vec![Dynamic::from(key.to_string()), field]))
            .collect(),
        None => items(&data, "entries")?
            .into_iter()
            .enumerate()
            .map(|(idx, item)| Dynamic::from_array(vec![Dynamic::from(idx.to_string()), item]))
            .collect(),
    };
    Ok(Dynamic::from_array(pairs))
}

pub(crate) fn from_pairs(data: Dynamic) -> RhaiResult {
    let mut map = Map::new();
    for pair in items(&data, "from_pairs")? {
        let pair = as_array(&pair).unwrap_or_default();
        if let Some(key) = pair.first() {
            let value = pair.get(1).cloned().unwrap_or(Dynamic::UNIT);
            map.insert(key_string(key).into(), value);
        }
    }
    Ok(Dynamic::from_map(map))
}

fn flatten_into(out: &mut Array, items: Array, depth: usize) {
    for item in items {
        match as_array(&item) {
            Some(nested) if depth > 0 => flatten_into(out, nested, depth - 1),
            _ => out.push(item),
        }
    }
}

pub(crate) fn flatten(data: Dynamic) -> RhaiResult {
    let mut out = Array::new();
    flatten_into(&mut out, items(&data, "flatten")?, 1);
    Ok(Dynamic::from_array(out))
}

pub(crate) fn flatten_deep(data: Dynamic) -> RhaiResult {
    let mut out = Array::new();
    flatten_into(&mut out, items(&data, "flatten_deep")?, usize::MAX);
    Ok(Dynamic::from_array(out))
}

pub(crate) fn compact(data: Dynamic) -> RhaiResult {
    let kept = items(&data, "compact")?.into_iter().filter(truthy).collect();
    Ok(Dynamic::from_array(kept))
}

pub(crate) fn uniq(data: Dynamic) -> RhaiResult {
    let mut unique = Array::new();
    for item in items(&data, "uniq")? {
        if !unique.iter().any(|seen| equals(seen, &item)) {
            unique.push(item);
        }
    }
    Ok(Dynamic::from_array(unique))
}

pub(crate) fn reverse(data: Dynamic) -> RhaiResult {
    if let Some(text) = as_string(&data) {
        return Ok(Dynamic::from(text.chars().rev().collect::<String>()));
    }
    let mut reversed = items(&data, "reverse")?;
    reversed.reverse();
    Ok(Dynamic::from_array(reversed))
}

pub(crate) fn sum(data: Dynamic) -> RhaiResult {
    let values = items(&data, "sum")?;
    if values.iter().all(|value| value.flatten_clone().is_int()) {
        let total = values
            .iter()
            .filter_map(|value| value.flatten_clone().as_int().ok())
            .try_fold(0i64, i64::checked_add);
        if let Some(total) = total {
            return Ok(Dynamic::from_int(total));
        }
    }
    Ok(Dynamic::from_float(values.iter().filter_map(as_number).sum()))
}

pub(crate) fn mean(data: Dynamic) -> RhaiResult {
    let numbers: Vec<f64> = items(&data, "mean")?.iter().filter_map(as_number).collect();
    if numbers.is_empty() {
        return Ok(Dynamic::from_float(f64::NAN));
    }
    Ok(Dynamic::from_float(numbers.iter().sum::<f64>() / numbers.len() as f64))
}

pub(crate) fn min(data: Dynamic) -> RhaiResult {
    let least = items(&data, "min")?
        .into_iter()
        .reduce(|a, b| if compare(&b, &a).is_lt() { b } else { a });
    Ok(least.unwrap_or(Dynamic::UNIT))
}

pub(crate) fn max(data: Dynamic) -> RhaiResult {
    let greatest = items(&data, "max")?
        .into_iter()
        .reduce(|a, b| if compare(&b, &a).is_gt() { b } else { a });
    Ok(greatest.unwrap_or(Dynamic::UNIT))
}

pub(crate) fn size(data: Dynamic) -> RhaiResult {
    let len = match as_string(&data) {
        Some(text) => text.chars().count(),
        None => items(&data, "size")?.len(),
    };
    Ok(Dynamic::from_int(i64::try_from(len).unwrap_or(i64::MAX)))
}

pub(crate) fn first(data: Dynamic) -> RhaiResult {
    Ok(items(&data, "first")?.into_iter().next().unwrap_or(Dynamic::UNIT))
}

pub(crate) fn last(data: Dynamic) -> RhaiResult {
    Ok(items(&data, "last")?.into_iter().last().unwrap_or(Dynamic::UNIT))
}
