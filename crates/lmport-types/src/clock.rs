/// Source of "now" for timestamp fallbacks.
///
/// Conversations with missing or unparsable creation times are stamped with
/// the current time. Routing that through a trait keeps the normalizer pure
/// in tests, where a `FixedClock` is injected instead of `SystemClock`.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Constant time, for deterministic output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
