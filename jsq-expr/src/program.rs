//! Compiled expressions and their evaluation

use std::fmt;

use jsq_format::{CompileError, JsqError, Result, Value};
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, Map, Scope, AST};
use tracing::debug;

use crate::compiler::{self, CHAIN_BINDING, FP_BINDING, LIB_BINDING, SELF_BINDING};
use crate::convert::{align_order, from_dynamic, to_dynamic};
use crate::library::{self, Chain, Lodash, LodashFp};

/// What an expression produced before post-processing.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// An ordinary value
    Plain(Dynamic),
    /// A `$$` chain; its wrapped value is the result
    Chain(Dynamic),
    /// A function; it is applied once to the current value
    Callable(FnPtr),
}

impl Outcome {
    /// Classify a raw engine result.
    pub fn classify(raw: Dynamic) -> Self {
        let raw = raw.flatten();
        if raw.is::<Chain>() {
            return Outcome::Chain(raw.cast::<Chain>().into_value());
        }
        if raw.is::<FnPtr>() {
            return Outcome::Callable(raw.cast::<FnPtr>());
        }
        Outcome::Plain(raw)
    }
}

/// An expression compiled once and evaluated against many values.
pub struct Program {
    engine: Engine,
    ast: AST,
}

impl Program {
    /// Compile `source`. Use [`compiler::normalize_expression`] first to
    /// apply the identity placeholder.
    pub fn compile(source: &str) -> std::result::Result<Self, CompileError> {
        let engine = build_engine();
        let rewritten = compiler::rewrite(source);
        debug!(rewritten = %rewritten.text, "compiling expression");
        let ast = engine
            .compile(&rewritten.text)
            .map_err(|err| compiler::compile_error(source, &rewritten, &err))?;
        Ok(Self { engine, ast })
    }

    /// Evaluate against `value` and convert the result back to data.
    pub fn evaluate(&self, value: Value) -> Result<Value> {
        let input = to_dynamic(&value);
        let result = self.resolve(input).map_err(runtime_error)?;
        Ok(align_order(from_dynamic(&result)?, &value))
    }

    fn resolve(&self, input: Dynamic) -> std::result::Result<Dynamic, Box<EvalAltResult>> {
        let raw = self.run(input.clone())?;
        let unwrapped = match Outcome::classify(raw) {
            Outcome::Plain(value) | Outcome::Chain(value) => value,
            Outcome::Callable(f) => {
                let applied = f.call::<Dynamic>(&self.engine, &self.ast, (input,))?;
                match Outcome::classify(applied) {
                    Outcome::Chain(value) | Outcome::Plain(value) => value,
                    Outcome::Callable(f) => Dynamic::from(f),
                }
            }
        };
        Ok(unwrapped)
    }

    fn run(&self, input: Dynamic) -> std::result::Result<Dynamic, Box<EvalAltResult>> {
        let mut scope = Scope::new();
        if let Some(fields) = input.read_lock::<Map>() {
            for (key, field) in fields.iter() {
                if key.contains('$') {
                    scope.push_dynamic(compiler::mangle(key), field.clone());
                } else {
                    scope.push_dynamic(key.clone(), field.clone());
                }
            }
        }
        scope.push_dynamic(SELF_BINDING, input.clone());
        scope.push(CHAIN_BINDING, Chain::wrap(input));
        scope.push(LIB_BINDING, Lodash);
        scope.push(FP_BINDING, LodashFp);
        self.engine.eval_ast_with_scope::<Dynamic>(&mut scope, &self.ast)
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").finish_non_exhaustive()
    }
}

fn build_engine() -> Engine {
    let mut engine = Engine::new();
    engine.disable_symbol("eval");
    engine.on_print(|text| eprintln!("{text}"));
    engine.on_debug(|text, source, pos| {
        debug!(target: "jsq::script", source = source.unwrap_or(""), %pos, "{text}");
    });
    library::register(&mut engine);
    engine
}

fn runtime_error(err: Box<EvalAltResult>) -> JsqError {
    JsqError::Runtime(compiler::unmangle(&err.to_string()))
}
