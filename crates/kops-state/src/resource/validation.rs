use std::fmt::{Display, Write};

use k8s_openapi::jiff;
use serde_json::Value;
use snafu::{IntoError, Snafu};

use crate::{duration::DurationParseError, resource::ValueType};

/// Contains context used for generating state errors
///
/// Constructed by [`Validator::root`] and extended with [`Validator::field`] while walking a state map.
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    ident: Option<&'a dyn Display>,
    parent: Option<&'a Validator<'a>>,
}

impl Validator<'static> {
    /// Creates a `Validator` for the root of a state map
    pub fn root() -> Self {
        Validator {
            ident: None,
            parent: None,
        }
    }
}

impl<'a> Validator<'a> {
    /// Creates a `Validator` for a subfield (or list index) of the current object
    pub fn field<'b>(&'b self, ident: &'b dyn Display) -> Validator<'b> {
        Validator {
            ident: Some(ident),
            parent: Some(self),
        }
    }

    fn error_problem(&self, problem: StateProblem) -> StateError {
        let mut idents = Vec::new();
        let mut curr = Some(self);
        while let Some(curr_some) = curr {
            if let Some(ident) = curr_some.ident {
                idents.push(ident.to_string());
            }
            curr = curr_some.parent;
        }
        StateError {
            path: FieldPath { idents },
            problem,
        }
    }

    /// Returns an error indicating that the `Validator` refers to a required field that is currently not provided
    pub fn error_required(&self) -> StateError {
        self.error_problem(FieldRequiredSnafu.build())
    }

    pub fn error_unexpected_type(&self, expected: ValueType, found: &Value) -> StateError {
        self.error_problem(
            UnexpectedTypeSnafu {
                expected,
                found: value_kind(found),
            }
            .build(),
        )
    }

    pub fn error_out_of_range(&self, value: impl Display, target: &'static str) -> StateError {
        self.error_problem(
            OutOfRangeSnafu {
                value: value.to_string(),
                target,
            }
            .build(),
        )
    }

    pub fn error_too_many_items(&self, max: usize, found: usize) -> StateError {
        self.error_problem(TooManyItemsSnafu { max, found }.build())
    }

    pub fn error_unknown_field(&self) -> StateError {
        self.error_problem(UnknownFieldSnafu.build())
    }

    pub fn error_unknown_variant(&self, value: &str, expected: &[&str]) -> StateError {
        self.error_problem(
            UnknownVariantSnafu {
                value,
                expected: expected.join(", "),
            }
            .build(),
        )
    }

    pub fn error_invalid_duration(&self, source: DurationParseError) -> StateError {
        self.error_problem(InvalidDurationSnafu.into_error(source))
    }

    pub fn error_invalid_timestamp(&self, error: jiff::Error) -> StateError {
        self.error_problem(InvalidTimestampSnafu { error }.build())
    }
}

/// Names the kind of a state value, as used in error messages.
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[derive(Debug, PartialEq, Eq)]
struct FieldPath {
    idents: Vec<String>,
}
impl Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.idents.is_empty() {
            return f.write_str("<root>");
        }
        for (i, ident) in self.idents.iter().rev().enumerate() {
            if i > 0 {
                f.write_char('.')?;
            }
            f.write_str(ident)?;
        }
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("invalid state at {path}"))]
/// An error that occurred when expanding or validating a state map.
///
/// It is constructed by calling one of the `error_*` methods on [`Validator`], such as [`Validator::error_required`].
pub struct StateError {
    path: FieldPath,
    #[snafu(source)]
    problem: StateProblem,
}

impl StateError {
    /// The dotted path of the offending attribute, for example `spec.0.etcd_cluster.1.name`.
    pub fn path(&self) -> String {
        self.path.to_string()
    }

    pub fn problem(&self) -> &StateProblem {
        &self.problem
    }
}

/// A problem that was discovered in a state map, with no additional context.
#[derive(Debug, Snafu)]
pub enum StateProblem {
    #[snafu(display("field is required"))]
    FieldRequired,

    #[snafu(display("expected {expected}, found {found}"))]
    UnexpectedType {
        expected: ValueType,
        found: &'static str,
    },

    #[snafu(display("{value} does not fit into {target}"))]
    OutOfRange { value: String, target: &'static str },

    #[snafu(display("expected at most {max} item(s), found {found}"))]
    TooManyItems { max: usize, found: usize },

    #[snafu(display("field is not declared in the schema"))]
    UnknownField,

    #[snafu(display("unknown value {value:?}, expected one of: {expected}"))]
    UnknownVariant { value: String, expected: String },

    #[snafu(display("failed to parse duration"))]
    InvalidDuration { source: DurationParseError },

    #[snafu(display("failed to parse timestamp: {error}"))]
    InvalidTimestamp {
        error: jiff::Error,
    },
}
