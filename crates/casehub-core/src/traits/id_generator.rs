//! Identifier generator collaborator.
//!
//! Task rows and rewritten workflow specs need fresh identity strings.
//! Production code uses [`UuidGenerator`]; tests that assert on concrete
//! identities use [`SequentialIdGenerator`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Supplies fresh unique identity strings.
pub trait IdGenerator: Send + Sync + fmt::Debug + 'static {
    /// Produce an identifier that has not been returned before.
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs rendered as 32 lowercase hex digits without hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic `{prefix}-{n}` identifiers, starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    /// Create a generator whose ids start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_is_hex_and_unique() {
        let generator = UuidGenerator;
        let a = generator.next_id();
        let b = generator.next_id();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_sequential_generator_counts_from_one() {
        let generator = SequentialIdGenerator::new("node");
        assert_eq!(generator.next_id(), "node-1");
        assert_eq!(generator.next_id(), "node-2");
    }
}
