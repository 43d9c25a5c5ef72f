//! Procedures and the registry they are resolved from.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use bridge_core::{InvocationContext, StringInput, ValidationError, Validator};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Why a call produced no result.
#[derive(Debug, thiserror::Error)]
pub enum ProcedureError {
    /// Input rejected by the procedure's validator. Reported as 400.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The procedure body failed. Reported as 500.
    #[error("{0}")]
    Execution(String),
}

/// A named remote operation, erased over its input and output types.
pub trait Procedure: Send + Sync {
    fn call(&self, input: Value, context: &InvocationContext) -> Result<Value, ProcedureError>;
}

/// A procedure built from a validator and a handler over the validated
/// value.
pub struct Typed<V, F, R> {
    validator: V,
    handler: F,
    _output: PhantomData<fn() -> R>,
}

impl<V, F, R> Typed<V, F, R>
where
    V: Validator,
    F: Fn(V::Output, &InvocationContext) -> Result<R, String> + Send + Sync,
    R: Serialize,
{
    pub fn new(validator: V, handler: F) -> Self {
        Self {
            validator,
            handler,
            _output: PhantomData,
        }
    }
}

impl<V, F, R> Procedure for Typed<V, F, R>
where
    V: Validator,
    F: Fn(V::Output, &InvocationContext) -> Result<R, String> + Send + Sync,
    R: Serialize,
{
    fn call(&self, input: Value, context: &InvocationContext) -> Result<Value, ProcedureError> {
        let input = self.validator.validate(&input)?;
        let output = (self.handler)(input, context).map_err(ProcedureError::Execution)?;
        serde_json::to_value(output).map_err(|e| ProcedureError::Execution(e.to_string()))
    }
}

pub fn greet(name: &str) -> String {
    format!("Hello, {name}!")
}

/// `hello`: one string input, bare or wrapped, answered with a greeting.
pub fn hello() -> impl Procedure {
    Typed::new(StringInput::default(), |name: String, context: &InvocationContext| {
        info!(request_id = context.request_id(), %name, "hello called");
        Ok::<_, String>(greet(&name))
    })
}

/// Immutable name-to-procedure map, cheap to clone into handlers.
#[derive(Clone, Default)]
pub struct Registry {
    procedures: Arc<HashMap<String, Arc<dyn Procedure>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, procedure: impl Procedure + 'static) -> Self {
        Arc::make_mut(&mut self.procedures).insert(name.into(), Arc::new(procedure));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Procedure>> {
        self.procedures.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.procedures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
