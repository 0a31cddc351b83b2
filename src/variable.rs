//! Variable names and variable mappings.
//!
//! [`VariableName`] is an interned, validated identifier. [`Variables`] is the
//! mapping of names to values that calculations read from and write into.

use crate::error::CalculationError;
use crate::expression::is_reserved;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

/// Check whether `s` is a formula identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Interned identifier of a seed or derived variable.
///
/// Constants (`pi`, `e`) and function names (`min`, `random`, ...) are
/// reserved: a formula would read them as the built-in, never as the
/// variable.
///
/// Uses `Arc<str>` so that clones are cheap; the same name is copied into
/// the graph's provided set, the resolved order and every variable mapping.
///
/// # Examples
///
/// ```rust
/// use spawncalc::VariableName;
///
/// let level = VariableName::new("level").unwrap();
/// assert_eq!(level.as_str(), "level");
///
/// assert!(VariableName::new("").is_err());
/// assert!(VariableName::new("2fast").is_err());
/// assert!(VariableName::new("pi").is_err());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VariableName(Arc<str>);

impl VariableName {
    /// Create a name, validating that it is a non-empty identifier and not
    /// reserved.
    pub fn new(name: &str) -> Result<Self, CalculationError> {
        if !is_identifier(name) || is_reserved(name) {
            return Err(CalculationError::InvalidVariableName(name.to_string()));
        }
        Ok(Self(Arc::from(name)))
    }

    /// Get the string representation of this name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VariableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for VariableName {
    type Error = CalculationError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl Serialize for VariableName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VariableName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        VariableName::new(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for VariableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mapping of variable names to values.
///
/// Seed variables are put in by the caller; [`Calculation::execute`]
/// adds every derived variable.
///
/// [`Calculation::execute`]: crate::Calculation::execute
///
/// # Examples
///
/// ```rust
/// use spawncalc::Variables;
///
/// let mut variables = Variables::from_pairs([("x", 1.0), ("y", 64.0)]).unwrap();
/// variables.try_set("z", -3.0).unwrap();
///
/// assert_eq!(variables.get("y"), Some(64.0));
/// assert!(variables.contains("z"));
/// assert_eq!(variables.get("level"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variables {
    values: HashMap<VariableName, f64>,
}

impl Variables {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from `(name, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, CalculationError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut variables = Self::new();
        for (name, value) in pairs {
            variables.try_set(name.as_ref(), value)?;
        }
        Ok(variables)
    }

    /// Set a value, returning the one it replaced.
    pub fn set(&mut self, name: VariableName, value: f64) -> Option<f64> {
        self.values.insert(name, value)
    }

    /// Set a value by string name, validating the name first.
    pub fn try_set(&mut self, name: &str, value: f64) -> Result<Option<f64>, CalculationError> {
        Ok(self.set(VariableName::new(name)?, value))
    }

    /// Get a value.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Check if a variable is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names from `required` that are not bound, in the iteration order of
    /// `required`.
    pub fn missing<'a, I>(&self, required: I) -> Vec<VariableName>
    where
        I: IntoIterator<Item = &'a VariableName>,
    {
        required
            .into_iter()
            .filter(|name| !self.values.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariableName, f64)> {
        self.values.iter().map(|(name, value)| (name, *value))
    }
}
