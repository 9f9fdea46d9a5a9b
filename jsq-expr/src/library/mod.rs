//! The utility namespace available to expressions
//!
//! The same operations are exposed three ways:
//!
//! - `_.map(data, f)` on [`Lodash`], data first
//! - `fp.map(f)` on [`LodashFp`], data last and curried: with only the
//!   leading arguments it returns a function awaiting the data
//! - `$$.map(f)` on [`Chain`], returning another chain until `.value()`
//!
//! Iteratees can be a closure, a property path (`"a.b"`) or an object map
//! used as a partial-match predicate.

mod ops;
pub(crate) mod value;

use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, NativeCallContext};

use crate::compiler::FP_BINDING;

pub(crate) type RhaiResultOf<T> = Result<T, Box<EvalAltResult>>;
pub(crate) type RhaiResult = RhaiResultOf<Dynamic>;

/// Data-first namespace bound to `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lodash;

/// Data-last, curried namespace bound to `fp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LodashFp;

/// A value wrapped for method chaining, bound to `$$`.
#[derive(Debug, Clone)]
pub struct Chain(Dynamic);

impl Chain {
    /// Wrap a value.
    pub fn wrap(value: Dynamic) -> Self {
        Self(value)
    }

    /// Copy of the wrapped value.
    pub fn value(&self) -> Dynamic {
        self.0.clone()
    }

    /// Unwrap.
    pub fn into_value(self) -> Dynamic {
        self.0
    }
}

fn curry(name: &str, args: Vec<Dynamic>) -> RhaiResultOf<FnPtr> {
    let mut fn_ptr = FnPtr::new(format!("{FP_BINDING}_{name}"))?;
    for arg in args {
        fn_ptr.add_curry(arg);
    }
    Ok(fn_ptr)
}

macro_rules! register_iteratee {
    ($engine:expr, $($name:literal => $op:path),* $(,)?) => {$(
        $engine.register_fn($name, |ctx: NativeCallContext, _: &mut Lodash, data: Dynamic, f: Dynamic| -> RhaiResult {
            $op(&ctx, data, f)
        });
        $engine.register_fn($name, |ctx: NativeCallContext, chain: &mut Chain, f: Dynamic| -> RhaiResultOf<Chain> {
            $op(&ctx, chain.value(), f).map(Chain::wrap)
        });
        $engine.register_fn($name, |ctx: NativeCallContext, _: &mut LodashFp, f: Dynamic, data: Dynamic| -> RhaiResult {
            $op(&ctx, data, f)
        });
        $engine.register_fn($name, |_: &mut LodashFp, f: Dynamic| curry($name, vec![f]));
        $engine.register_fn(concat!("fp_", $name), |ctx: NativeCallContext, f: Dynamic, data: Dynamic| -> RhaiResult {
            $op(&ctx, data, f)
        });
    )*};
}

macro_rules! register_binary {
    ($engine:expr, $($name:literal => $op:path),* $(,)?) => {$(
        $engine.register_fn($name, |_: &mut Lodash, data: Dynamic, arg: Dynamic| -> RhaiResult {
            $op(data, arg)
        });
        $engine.register_fn($name, |chain: &mut Chain, arg: Dynamic| -> RhaiResultOf<Chain> {
            $op(chain.value(), arg).map(Chain::wrap)
        });
        $engine.register_fn($name, |_: &mut LodashFp, arg: Dynamic, data: Dynamic| -> RhaiResult {
            $op(data, arg)
        });
        $engine.register_fn($name, |_: &mut LodashFp, arg: Dynamic| curry($name, vec![arg]));
        $engine.register_fn(concat!("fp_", $name), |arg: Dynamic, data: Dynamic| -> RhaiResult {
            $op(data, arg)
        });
    )*};
}

macro_rules! register_unary {
    ($engine:expr, $($name:literal => $op:path),* $(,)?) => {$(
        $engine.register_fn($name, |_: &mut Lodash, data: Dynamic| -> RhaiResult { $op(data) });
        $engine.register_fn($name, |_: &mut LodashFp, data: Dynamic| -> RhaiResult { $op(data) });
        $engine.register_fn($name, |chain: &mut Chain| -> RhaiResultOf<Chain> {
            $op(chain.value()).map(Chain::wrap)
        });
    )*};
}

/// Install the namespace types and every operation into `engine`.
pub fn register(engine: &mut Engine) {
    engine
        .register_type_with_name::<Lodash>("Lodash")
        .register_type_with_name::<LodashFp>("LodashFp")
        .register_type_with_name::<Chain>("Chain");

    register_iteratee!(engine,
        "map" => ops::map,
        "filter" => ops::filter,
        "reject" => ops::reject,
        "find" => ops::find,
        "some" => ops::some,
        "every" => ops::every,
        "sort_by" => ops::sort_by,
        "group_by" => ops::group_by,
        "key_by" => ops::key_by,
        "count_by" => ops::count_by,
        "partition" => ops::partition,
        "uniq_by" => ops::uniq_by,
        "sum_by" => ops::sum_by,
        "min_by" => ops::min_by,
        "max_by" => ops::max_by,
        "map_values" => ops::map_values,
    );

    register_binary!(engine,
        "take" => ops::take,
        "drop" => ops::drop,
        "chunk" => ops::chunk,
        "get" => ops::get,
        "has" => ops::has,
        "pick" => ops::pick,
        "omit" => ops::omit,
        "includes" => ops::includes,
        "join" => ops::join,
    );

    register_unary!(engine,
        "keys" => ops::keys,
        "values" => ops::values,
        "entries" => ops::entries,
        "from_pairs" => ops::from_pairs,
        "flatten" => ops::flatten,
        "flatten_deep" => ops::flatten_deep,
        "compact" => ops::compact,
        "uniq" => ops::uniq,
        "reverse" => ops::reverse,
        "sum" => ops::sum,
        "mean" => ops::mean,
        "min" => ops::min,
        "max" => ops::max,
        "size" => ops::size,
        "first" => ops::first,
        "last" => ops::last,
    );

    // Composition
    engine.register_fn("flow", |_: &mut LodashFp, f: FnPtr, g: FnPtr| {
        curry("flow", vec![Dynamic::from_array(vec![f.into(), g.into()])])
    });
    engine.register_fn("flow", |_: &mut LodashFp, f: FnPtr, g: FnPtr, h: FnPtr| {
        curry("flow", vec![Dynamic::from_array(vec![f.into(), g.into(), h.into()])])
    });
    engine.register_fn("flow", |_: &mut LodashFp, fns: Array| {
        curry("flow", vec![Dynamic::from_array(fns)])
    });
    engine.register_fn("fp_flow", |ctx: NativeCallContext, fns: Array, data: Dynamic| -> RhaiResult {
        fns.iter()
            .try_fold(data, |acc, f| value::call_iteratee(&ctx, f, acc))
    });

    // Chain terminals
    engine.register_fn("value", |chain: &mut Chain| chain.value());
    engine.register_fn("thru", |ctx: NativeCallContext, chain: &mut Chain, f: FnPtr| -> RhaiResultOf<Chain> {
        f.call_within_context::<Dynamic>(&ctx, (chain.value(),))
            .map(Chain::wrap)
    });
}
