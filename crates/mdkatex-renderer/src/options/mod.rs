//! Ordered renderer options and their values.
//!
//! [`RenderOptions`] preserves insertion order because the order of the
//! generated argument vector feeds the cache digest: two logically identical
//! configurations only share cache entries when they iterate identically.

use std::fmt;

/// A single option value passed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Free-form text, for example a colour or macro definition.
    Str(String),
    /// Whole number, for example `--max-size 10`.
    Integer(i64),
    /// Floating point number, for example `--min-rule-thickness 0.05`.
    Float(f64),
    /// Switch: `true` emits a bare flag, `false` omits the option.
    Bool(bool),
}

impl OptionValue {
    /// Interprets command-line text as the narrowest matching value.
    ///
    /// `true` and `false` become booleans, then integers and finite floats
    /// are tried, and anything else is kept as text.
    ///
    /// ```
    /// use mdkatex_renderer::OptionValue;
    ///
    /// assert_eq!(OptionValue::parse("true"), OptionValue::Bool(true));
    /// assert_eq!(OptionValue::parse("12"), OptionValue::Integer(12));
    /// assert_eq!(OptionValue::parse("#cc0000"), OptionValue::Str("#cc0000".into()));
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(number) = text.parse::<i64>() {
            return Self::Integer(number);
        }
        match text.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Float(number),
            _ => Self::Str(text.to_owned()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(text) => f.write_str(text),
            Self::Integer(number) => write!(f, "{number}"),
            Self::Float(number) => write!(f, "{number}"),
            Self::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Insertion-ordered mapping of option name to value.
///
/// Re-inserting an existing name replaces the value in place, so the option
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    entries: Vec<(String, OptionValue)>,
}

impl RenderOptions {
    /// Creates an empty option set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `name` to `value`, returning the previous value if present.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        let key: String = name.into();
        let replacement: OptionValue = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(slot, replacement));
        }
        self.entries.push((key, replacement));
        None
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        drop(self.insert(name, value));
        self
    }

    /// Looks up the value stored for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Removes `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterates options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no option is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for RenderOptions
where
    N: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut options = Self::new();
        for (name, value) in iter {
            drop(options.insert(name, value));
        }
        options
    }
}
