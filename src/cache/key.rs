//! Cache Key Module
//!
//! Canonical keys built from an operation tag and its parameters, and the
//! patterns used to invalidate families of keys.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde_json::Value;

// == Cache Key ==
/// Canonical key for a cached operation result.
///
/// Parameters are kept sorted by name, so two keys built from the same
/// name/value pairs compare equal and render identically no matter the
/// order they were added in. Absent parameters are never recorded.
///
/// # Example
/// ```
/// use slackline::cache::CacheKey;
///
/// let a = CacheKey::new("history").with("channel", "C1").with("limit", 10);
/// let b = CacheKey::new("history").with("limit", 10).with("channel", "C1");
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "history:channel=C1,limit=10");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    tag: String,
    params: BTreeMap<String, String>,
}

impl CacheKey {
    // == Constructor ==
    /// Creates a key with no parameters.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builds a key from a tag and a parameter mapping, skipping `None` values.
    pub fn from_params<I, K, V>(tag: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: fmt::Display,
    {
        params
            .into_iter()
            .fold(Self::new(tag), |key, (name, value)| key.with_opt(name, value))
    }

    /// Builds a key from a JSON object of arguments.
    ///
    /// `null` members are treated as absent. String members are recorded
    /// without quotes; every other value uses its compact JSON form.
    pub fn from_json(tag: impl Into<String>, args: &Value) -> Self {
        let mut key = Self::new(tag);
        if let Value::Object(map) = args {
            for (name, value) in map {
                match value {
                    Value::Null => {}
                    Value::String(s) => key = key.with(name.clone(), s),
                    other => key = key.with(name.clone(), other),
                }
            }
        }
        key
    }

    // == Builders ==
    /// Adds a parameter, replacing any previous value under the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter only when a value is present.
    pub fn with_opt(self, name: impl Into<String>, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    // == Accessors ==
    /// The operation tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The value recorded for `name`, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All parameters in canonical order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.tag)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            f.write_str(if i == 0 { ":" } else { "," })?;
            write_escaped(f, name)?;
            f.write_str("=")?;
            write_escaped(f, value)?;
        }
        Ok(())
    }
}

/// Escapes the separators so distinct keys never render the same.
fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        if matches!(c, '\\' | ',' | '=' | ':') {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

// == Key Pattern ==
/// Predicate selecting a family of keys for invalidation.
///
/// Most patterns look at the key's tag and parameters directly so they keep
/// working if the rendered form changes. [`KeyPattern::contains`] and
/// [`KeyPattern::regex`] match the rendered form for callers that need it.
pub struct KeyPattern {
    description: String,
    predicate: Box<dyn Fn(&CacheKey) -> bool + Send + Sync>,
}

impl KeyPattern {
    /// Matches every key with the given tag.
    pub fn tag(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            description: format!("tag={}", tag),
            predicate: Box::new(move |key| key.tag() == tag),
        }
    }

    /// Matches keys with the given tag whose `name` parameter equals `value`.
    pub fn tag_with(
        tag: impl Into<String>,
        name: impl Into<String>,
        value: impl fmt::Display,
    ) -> Self {
        let tag = tag.into();
        let name = name.into();
        let value = value.to_string();
        Self {
            description: format!("tag={} {}={}", tag, name, value),
            predicate: Box::new(move |key| {
                key.tag() == tag && key.param(&name) == Some(value.as_str())
            }),
        }
    }

    /// Matches keys whose rendered form contains `needle`.
    pub fn contains(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        Self {
            description: format!("contains {:?}", needle),
            predicate: Box::new(move |key| key.to_string().contains(&needle)),
        }
    }

    /// Matches keys whose rendered form matches `pattern`.
    pub fn regex(pattern: Regex) -> Self {
        Self {
            description: format!("regex /{}/", pattern.as_str()),
            predicate: Box::new(move |key| pattern.is_match(&key.to_string())),
        }
    }

    /// Wraps an arbitrary predicate.
    pub fn custom(
        description: impl Into<String>,
        predicate: impl Fn(&CacheKey) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Matches when both patterns match.
    pub fn and(self, other: KeyPattern) -> Self {
        let description = format!("{} and {}", self.description, other.description);
        Self {
            description,
            predicate: Box::new(move |key| self.matches(key) && other.matches(key)),
        }
    }

    /// Evaluates the pattern against `key`.
    pub fn matches(&self, key: &CacheKey) -> bool {
        (self.predicate)(key)
    }
}

impl fmt::Debug for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPattern")
            .field("description", &self.description)
            .finish()
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}
