//! Run identifiers

use std::fmt;

/// Identifier for one pipeline run, based on UUIDv7
///
/// UUIDv7 sorts chronologically, so log lines from consecutive runs order
/// naturally by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(uuid::Uuid);

impl RunId {
    /// Generate a new run id
    ///
    /// # Examples
    ///
    /// ```
    /// use vantage_domain::RunId;
    ///
    /// let first = RunId::new();
    /// let second = RunId::new();
    /// assert_ne!(first, second);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Millisecond Unix timestamp embedded in the id
    pub fn timestamp_ms(&self) -> u64 {
        (self.0.as_u128() >> 80) as u64
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
