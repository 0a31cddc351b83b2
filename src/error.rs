//! Error types for formula parsing, graph construction and evaluation.
//!
//! Parsing failures are reported as [`ExpressionError`]. Everything the
//! calculation engine and its probabilistic consumers can fail with is a
//! [`CalculationError`]. Building rules from configuration decorates both
//! with the position of the offending entry in a [`ConfigError`].

use crate::variable::VariableName;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[VariableName]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Format a list of variable names as `a, b, c`.
fn format_names(names: &[VariableName]) -> String {
    names
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while parsing or evaluating a single formula.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{Expression, ExpressionError};
///
/// let err = Expression::parse("min(1,").unwrap_err();
/// assert!(matches!(err, ExpressionError::UnexpectedEnd));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpressionError {
    /// The formula contains a character that starts no token.
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected token '{token}' at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    /// The formula ended in the middle of an expression.
    #[error("unexpected end of formula")]
    UnexpectedEnd,

    /// A numeric literal could not be read.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// A call to a function that is not part of the formula vocabulary.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A function was called with the wrong number of arguments.
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    /// The formula references a variable outside the declared set.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// A variable was not bound at evaluation time.
    #[error("variable '{0}' is not bound")]
    MissingVariable(String),

    /// A function received an argument outside its domain.
    #[error("cannot evaluate '{function}': {reason}")]
    Evaluation { function: String, reason: String },

    /// The formula nests deeper than the parser accepts.
    #[error("formula nests deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors raised by the calculation engine, weighted selection and drop
/// generation.
///
/// # Examples
///
/// ```rust
/// use spawncalc::{CalculationError, VariableName};
///
/// let err = CalculationError::DuplicateNode(VariableName::new("level").unwrap());
/// assert_eq!(err.to_string(), "variable 'level' is already provided");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalculationError {
    /// A node or seed variable with this name already exists in the graph.
    #[error("variable '{0}' is already provided")]
    DuplicateNode(VariableName),

    /// A variable name was empty or not a valid identifier.
    #[error("invalid variable name '{0}'")]
    InvalidVariableName(String),

    /// A node's formula references the variable the node itself provides.
    #[error("formula for '{0}' references itself")]
    SelfReference(VariableName),

    /// The variable mapping lacks required seed variables.
    #[error("missing variables: {}", format_names(.0))]
    MissingVariables(Vec<VariableName>),

    /// A node's formula failed to evaluate.
    #[error("cannot calculate '{variable}': {source}")]
    Evaluation {
        variable: VariableName,
        #[source]
        source: ExpressionError,
    },

    /// A dependency cycle among unresolved nodes.
    ///
    /// The path is closed: `[A, B, A]`.
    #[error("cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<VariableName> },

    /// A node depends on variables that nothing provides.
    #[error("'{variable}' depends on unprovided variables: {}", format_names(.missing))]
    UnresolvedDependency {
        variable: VariableName,
        missing: Vec<VariableName>,
    },

    /// A value does not fit the target integer width.
    #[error("{value} does not fit into {target}")]
    ArithmeticOverflow { value: f64, target: &'static str },

    /// Weights cannot be used for a random draw.
    #[error("invalid weight: {0}")]
    InvalidWeight(String),

    /// Weighted selection over an empty set.
    #[error("nothing to select from")]
    EmptySelection,

    /// A border whose minimum exceeds its maximum.
    #[error("invalid bounds: minimum {min} is greater than maximum {max}")]
    InvalidBounds { min: i32, max: i32 },

    /// A second variant or drop entry with an existing name.
    #[error("entry '{0}' is already defined")]
    DuplicateEntry(String),

    /// A numeric setting outside its valid range.
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Errors raised while building rules from configuration.
///
/// `path` locates the offending entry, e.g.
/// `worlds.overworld.variables.distance`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The document is not valid JSON or does not match the schema.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A formula failed to parse or references an unknown variable.
    #[error("{path}: {source}")]
    Formula {
        path: String,
        #[source]
        source: ExpressionError,
    },

    /// An entry was rejected by the engine.
    #[error("{path}: {source}")]
    Invalid {
        path: String,
        #[source]
        source: CalculationError,
    },

    /// A required entry is absent or entries contradict each other.
    #[error("{path}: {message}")]
    Structure { path: String, message: String },
}

impl ConfigError {
    /// The position of the offending entry, if the error has one.
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::Io { path, .. }
            | ConfigError::Formula { path, .. }
            | ConfigError::Invalid { path, .. }
            | ConfigError::Structure { path, .. } => Some(path),
            ConfigError::Toml(_) | ConfigError::Json(_) => None,
        }
    }
}

/// Errors raised by [`RuleRegistry::reload`](crate::RuleRegistry::reload).
#[derive(Debug, Error)]
pub enum ReloadError {
    /// Another reload holds the guard; this request was rejected.
    #[error("a reload is already in progress")]
    InProgress,

    /// The new configuration was rejected; the previous rules stay active.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
