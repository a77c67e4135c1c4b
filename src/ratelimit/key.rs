//! Storage key generation and handling.

/// A key that uniquely identifies one counter in the backing store.
///
/// The key is composed of the limit name and the caller-supplied label,
/// joined in a stable order so repeated calls for the same pair always
/// address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    /// The limit this counter belongs to
    pub name: String,
    /// Caller-supplied label distinguishing independent counters
    pub label: String,
}

impl CounterKey {
    /// Create a new counter key from a limit name and a label.
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
        }
    }

    /// Render the key as it is stored in the backing store.
    pub fn to_storage_key(&self) -> String {
        format!("{}:{}", self.name, self.label)
    }
}

impl std::fmt::Display for CounterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_storage_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_creation() {
        let key = CounterKey::new("api_calls", "user:42");
        assert_eq!(key.name, "api_calls");
        assert_eq!(key.label, "user:42");
    }

    #[test]
    fn test_storage_key_format() {
        let key = CounterKey::new("api_calls", "user:42");
        assert_eq!(key.to_storage_key(), "api_calls:user:42");
        assert_eq!(key.to_string(), "api_calls:user:42");
    }

    #[test]
    fn test_distinct_labels_produce_distinct_keys() {
        let a = CounterKey::new("api_calls", "alice");
        let b = CounterKey::new("api_calls", "bob");
        assert_ne!(a.to_storage_key(), b.to_storage_key());
    }

    #[test]
    fn test_distinct_names_produce_distinct_keys() {
        let a = CounterKey::new("api_calls", "alice");
        let b = CounterKey::new("logins", "alice");
        assert_ne!(a.to_storage_key(), b.to_storage_key());
    }
}
