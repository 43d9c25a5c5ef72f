//! Pluggable input validation: given raw input, return a typed value or a
//! `ValidationError`. The dispatcher depends on this trait only, never on a
//! particular schema library.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

pub trait Validator: Send + Sync {
    type Output;

    fn validate(&self, raw: &Value) -> Result<Self::Output, ValidationError>;
}

/// Which JSON shapes a string input may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputShape {
    /// `"World"`
    Bare,
    /// `{"input": "World"}`
    Wrapped,
    #[default]
    Either,
}

/// Accepts a single string input.
#[derive(Debug, Clone)]
pub struct StringInput {
    shape: InputShape,
    field: String,
}

impl StringInput {
    pub fn new(shape: InputShape) -> Self {
        Self {
            shape,
            field: "input".to_string(),
        }
    }

    /// Name of the wrapping field. Defaults to `input`.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

impl Default for StringInput {
    fn default() -> Self {
        Self::new(InputShape::Either)
    }
}

impl Validator for StringInput {
    type Output = String;

    fn validate(&self, raw: &Value) -> Result<String, ValidationError> {
        match (self.shape, raw) {
            (InputShape::Bare | InputShape::Either, Value::String(s)) => Ok(s.clone()),
            (InputShape::Wrapped | InputShape::Either, Value::Object(fields)) => {
                match fields.get(&self.field) {
                    Some(Value::String(s)) => Ok(s.clone()),
                    Some(other) => Err(ValidationError::new(format!(
                        "expected `{}` to be a string, received {}",
                        self.field,
                        kind(other)
                    ))),
                    None => Err(ValidationError::new(format!("missing required field `{}`", self.field))),
                }
            }
            (InputShape::Bare, other) => Err(ValidationError::new(format!(
                "expected a string, received {}",
                kind(other)
            ))),
            (_, other) => Err(ValidationError::new(format!(
                "expected an object with a `{}` string, received {}",
                self.field,
                kind(other)
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
