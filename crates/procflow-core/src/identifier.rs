//! Identifier management using string interning
//!
//! Node, edge and document ids are compared constantly while diffing and
//! routing, so they are interned once and carried around as [`Id`] handles.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Interned identifier of a node, edge or document.
///
/// Two ids created from the same string are equal regardless of which
/// document they were read from, which is what the structural diff relies on.
///
/// # Examples
///
/// ```
/// use procflow_core::identifier::Id;
///
/// let task = Id::new("TASK_001");
/// assert_eq!(task, "TASK_001");
/// assert_eq!(task, Id::new("TASK_001"));
/// assert!(Id::default().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Returns `true` if this id was created from an empty string.
    ///
    /// Documents read from JSON without an `id` field end up with an empty
    /// id; layout and routing skip such entries.
    pub fn is_empty(self) -> bool {
        self == ""
    }

    /// Creates an id with a generated, prefixed name such as `edge_3`.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::identifier::Id;
    ///
    /// assert_eq!(Id::generated("edge", 3), "edge_3");
    /// ```
    pub fn generated(prefix: &str, idx: usize) -> Self {
        Self::new(&format!("{prefix}_{idx}"))
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let str_value = interner.resolve(self.0).unwrap_or_default();
        f.write_str(str_value)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `null` ids are treated like missing ones.
        let name = Option::<String>::deserialize(deserializer)?;
        Ok(Self::new(name.as_deref().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        let a = Id::new("TASK_001");
        let b: Id = "TASK_001".into();
        let c = Id::new("TASK_002");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a == "TASK_001");
        assert!(a != "TASK_002");
    }

    #[test]
    fn test_id_display() {
        let id = Id::new("START_EVENT_001");
        assert_eq!(id.to_string(), "START_EVENT_001");
        assert_eq!(format!("{id}"), "START_EVENT_001");
    }

    #[test]
    fn test_empty_id() {
        assert!(Id::new("").is_empty());
        assert!(Id::default().is_empty());
        assert!(!Id::new("n1").is_empty());
    }

    #[test]
    fn test_generated_id() {
        assert_eq!(Id::generated("n", 0), "n_0");
        assert_eq!(Id::generated("edge", 12), Id::new("edge_12"));
    }

    #[test]
    fn test_id_serde() {
        let id = Id::new("e1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"e1\"");

        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let null: Id = serde_json::from_str("null").unwrap();
        assert!(null.is_empty());
    }
}
