//! Shared test utilities for the scheduler crates
//!
//! - `TestNats`: NATS container with JetStream and automatic cleanup (feature: "nats")
//! - `TestDataBuilder`: deterministic sender ids and event names (always available)
//! - `assertions`: custom assertion helpers (always available)
//!
//! # NATS Testing
//!
//! Add `features = ["nats"]` to your dev-dependencies:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { workspace = true, features = ["nats"] }
//! ```
//!
//! Then in your tests:
//!
//! ```rust,ignore
//! use test_utils::TestNats;
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_broker_test() {
//!     let nats = TestNats::new().await;
//!     let broker = JetStreamBroker::new(nats.jetstream(), ExchangeConfig::default());
//! }
//! ```

#[cfg(feature = "nats")]
mod nats;

#[cfg(feature = "nats")]
pub use nats::TestNats;

/// Builder for test data with deterministic values
///
/// Tests that share a process (and therefore a stream or a registry) stay
/// isolated by deriving their sender ids and names from the test name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// # Example
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_publish_due_event");
    /// assert!(builder.sender_id() > 0);
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A positive sender id that fits the wire's `int64`.
    ///
    /// Offset well above the ids a fresh registry hands out so a returning
    /// identity never collides with a newly issued one.
    pub fn sender_id(&self) -> i64 {
        1_000_000 + (self.seed % 1_000_000_000) as i64
    }

    /// Generate a unique name for testing
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("event", "launch"), "test-event-7-launch");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}

/// Test assertion helpers
pub mod assertions {
    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Assert that every id is greater than the one before it
    pub fn assert_strictly_increasing(ids: &[i64], context: &str) {
        for pair in ids.windows(2) {
            assert!(
                pair[0] < pair[1],
                "{}: ids not strictly increasing at {} -> {} in {:?}",
                context,
                pair[0],
                pair[1],
                ids
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.sender_id(), builder2.sender_id());
        assert_eq!(builder1.name("event", "a"), builder2.name("event", "a"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.sender_id(), builder2.sender_id());
    }

    #[test]
    fn test_sender_id_is_positive() {
        let builder = TestDataBuilder::new(u64::MAX);
        assert!(builder.sender_id() >= 1_000_000);
    }

    #[test]
    fn test_assert_strictly_increasing_accepts_sorted() {
        assertions::assert_strictly_increasing(&[1, 2, 5, 9], "sorted");
        assertions::assert_strictly_increasing(&[], "empty");
    }

    #[test]
    #[should_panic(expected = "not strictly increasing")]
    fn test_assert_strictly_increasing_rejects_duplicates() {
        assertions::assert_strictly_increasing(&[1, 2, 2], "dup");
    }
}
