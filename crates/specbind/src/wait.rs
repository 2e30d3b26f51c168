//! Wait Mechanisms
//!
//! Bounded polling used by element waits, validation retries and page waits.
//! Every wait runs on the calling thread; nothing here schedules work
//! asynchronously.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: A "remains" wait stops the moment the state is violated
//! - **Poka-Yoke**: The nine element conditions are a closed enumeration
//! - **Muda**: Fixed-interval polling instead of busy loops

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::result::{SpecBindError, SpecBindResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element and page waits (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (200ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Whether the wait was successful
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was evaluated
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER
// =============================================================================

/// Polls a condition until it holds or the timeout elapses
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// Poll `predicate` until it returns true or `timeout` elapses. The
    /// predicate is evaluated once more at the deadline.
    pub fn poll<F>(&self, mut predicate: F, timeout: Duration, waited_for: &str) -> WaitResult
    where
        F: FnMut() -> bool,
    {
        let start = Instant::now();
        let interval = self.options.poll_interval();
        let mut attempts = 0;
        loop {
            attempts += 1;
            if predicate() {
                return WaitResult {
                    success: true,
                    elapsed: start.elapsed(),
                    attempts,
                    waited_for: waited_for.to_string(),
                };
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return WaitResult {
                    success: false,
                    elapsed,
                    attempts,
                    waited_for: waited_for.to_string(),
                };
            }
            std::thread::sleep(interval.min(timeout - elapsed));
        }
    }

    /// Poll with the configured timeout; a timeout is an error
    pub fn wait_for<F>(&self, predicate: F, waited_for: &str) -> SpecBindResult<WaitResult>
    where
        F: FnMut() -> bool,
    {
        let result = self.poll(predicate, self.options.timeout(), waited_for);
        if result.success {
            Ok(result)
        } else {
            Err(SpecBindError::Timeout {
                ms: self.options.timeout_ms,
                message: waited_for.to_string(),
            })
        }
    }
}

/// Wait for a condition with the default poll interval
pub fn wait_until<F>(predicate: F, timeout_ms: u64) -> SpecBindResult<()>
where
    F: FnMut() -> bool,
{
    let waiter = Waiter::with_options(WaitOptions::new().with_timeout(timeout_ms));
    let _ = waiter.wait_for(predicate, "condition")?;
    Ok(())
}

// =============================================================================
// ELEMENT CONDITIONS
// =============================================================================

/// Screen position of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    /// Horizontal offset
    pub x: i64,
    /// Vertical offset
    pub y: i64,
}

/// The states an element wait can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitConditions {
    /// Exists at some point before the timeout
    BecomesExistent,
    /// Exists for the whole timeout
    RemainsExistent,
    /// Goes away at some point before the timeout
    BecomesNonExistent,
    /// Stays absent for the whole timeout
    RemainsNonExistent,
    /// Becomes enabled before the timeout
    BecomesEnabled,
    /// Becomes disabled before the timeout
    BecomesDisabled,
    /// Stays enabled for the whole timeout
    RemainsEnabled,
    /// Stays disabled for the whole timeout
    RemainsDisabled,
    /// Stops changing position
    NotMoving,
}

impl WaitConditions {
    /// All conditions
    pub const ALL: [Self; 9] = [
        Self::BecomesExistent,
        Self::RemainsExistent,
        Self::BecomesNonExistent,
        Self::RemainsNonExistent,
        Self::BecomesEnabled,
        Self::BecomesDisabled,
        Self::RemainsEnabled,
        Self::RemainsDisabled,
        Self::NotMoving,
    ];

    /// Whether the condition must hold for the entire window
    #[must_use]
    pub const fn is_remains(&self) -> bool {
        matches!(
            self,
            Self::RemainsExistent
                | Self::RemainsNonExistent
                | Self::RemainsEnabled
                | Self::RemainsDisabled
        )
    }

    /// Step phrase, e.g. "becomes enabled"
    #[must_use]
    pub const fn phrase(&self) -> &'static str {
        match self {
            Self::BecomesExistent => "becomes existent",
            Self::RemainsExistent => "remains existent",
            Self::BecomesNonExistent => "becomes non-existent",
            Self::RemainsNonExistent => "remains non-existent",
            Self::BecomesEnabled => "becomes enabled",
            Self::BecomesDisabled => "becomes disabled",
            Self::RemainsEnabled => "remains enabled",
            Self::RemainsDisabled => "remains disabled",
            Self::NotMoving => "stops moving",
        }
    }
}

impl fmt::Display for WaitConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

impl FromStr for WaitConditions {
    type Err = SpecBindError;

    /// Accepts the enum name or step phrasing ("become enabled", "remain
    /// existent", "stop moving"), ignoring case, spaces, dashes and a
    /// trailing "s" on the verb.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        let condition = match key.as_str() {
            "becomesexistent" | "becomeexistent" | "exists" | "existent" | "becomesvisible"
            | "becomevisible" => Self::BecomesExistent,
            "remainsexistent" | "remainexistent" | "remainsvisible" | "remainvisible" => {
                Self::RemainsExistent
            }
            "becomesnonexistent" | "becomenonexistent" | "notexists" | "nonexistent"
            | "becomesnotexistent" | "becomenotexistent" => Self::BecomesNonExistent,
            "remainsnonexistent" | "remainnonexistent" | "remainsnotexistent"
            | "remainnotexistent" => Self::RemainsNonExistent,
            "becomesenabled" | "becomeenabled" | "enabled" => Self::BecomesEnabled,
            "becomesdisabled" | "becomedisabled" | "disabled" | "notenabled" => {
                Self::BecomesDisabled
            }
            "remainsenabled" | "remainenabled" => Self::RemainsEnabled,
            "remainsdisabled" | "remaindisabled" => Self::RemainsDisabled,
            "notmoving" | "stopsmoving" | "stopmoving" => Self::NotMoving,
            _ => {
                return Err(SpecBindError::invalid_argument(
                    "condition",
                    format!("'{s}' is not a known wait condition"),
                ))
            }
        };
        Ok(condition)
    }
}

/// Live state reads an element wait is evaluated against
pub trait ElementProbe {
    /// Element is present (and visible, where the driver distinguishes)
    fn exists(&self) -> bool;
    /// Element is absent
    fn not_exists(&self) -> bool;
    /// Element is present and enabled
    fn enabled(&self) -> bool;
    /// Current position, if the element can be found
    fn location(&self) -> Option<Point>;
}

/// Evaluate a wait condition.
///
/// "Becomes" conditions succeed on the first poll that observes the target
/// state. "Remains" conditions succeed only when the full `timeout` has
/// elapsed without a single violating observation.
pub fn wait_for_condition(
    probe: &dyn ElementProbe,
    condition: WaitConditions,
    timeout: Duration,
    waiter: &Waiter,
) -> bool {
    let description = condition.phrase();
    match condition {
        WaitConditions::BecomesExistent => waiter.poll(|| probe.exists(), timeout, description).success,
        WaitConditions::BecomesNonExistent => {
            waiter.poll(|| probe.not_exists(), timeout, description).success
        }
        WaitConditions::BecomesEnabled => waiter.poll(|| probe.enabled(), timeout, description).success,
        WaitConditions::BecomesDisabled => {
            waiter.poll(|| !probe.enabled(), timeout, description).success
        }
        WaitConditions::RemainsExistent => remains(waiter, timeout, description, || probe.not_exists()),
        WaitConditions::RemainsNonExistent => remains(waiter, timeout, description, || probe.exists()),
        WaitConditions::RemainsEnabled => remains(waiter, timeout, description, || !probe.enabled()),
        WaitConditions::RemainsDisabled => remains(waiter, timeout, description, || probe.enabled()),
        WaitConditions::NotMoving => {
            let mut previous = probe.location();
            waiter
                .poll(
                    || {
                        let current = probe.location();
                        let settled = current.is_some() && current == previous;
                        previous = current;
                        settled
                    },
                    timeout,
                    description,
                )
                .success
        }
    }
}

fn remains<F>(waiter: &Waiter, timeout: Duration, description: &str, violated: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();
    let result = waiter.poll(violated, timeout, description);
    if result.success {
        tracing::debug!(condition = description, elapsed_ms = result.elapsed.as_millis() as u64, "state violated before timeout");
        return false;
    }
    start.elapsed() >= timeout
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Cooperative cancellation flag with an optional deadline
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// A token that is never cancelled unless [`cancel`](Self::cancel) is called
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that reports cancelled once `timeout` has elapsed
    #[must_use]
    pub fn cancel_after(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Cancel now
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the token has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast() -> Waiter {
        Waiter::with_options(WaitOptions::new().with_poll_interval(5))
    }

    /// Probe whose state flips after a number of reads
    struct Flipping {
        reads: Cell<u32>,
        flip_after: u32,
        before: bool,
    }

    impl Flipping {
        fn new(before: bool, flip_after: u32) -> Self {
            Self {
                reads: Cell::new(0),
                flip_after,
                before,
            }
        }

        fn state(&self) -> bool {
            let n = self.reads.get();
            self.reads.set(n + 1);
            if n < self.flip_after {
                self.before
            } else {
                !self.before
            }
        }
    }

    impl ElementProbe for Flipping {
        fn exists(&self) -> bool {
            self.state()
        }
        fn not_exists(&self) -> bool {
            !self.state()
        }
        fn enabled(&self) -> bool {
            self.state()
        }
        fn location(&self) -> Option<Point> {
            let n = self.reads.get();
            self.reads.set(n + 1);
            let x = i64::from(n.min(self.flip_after));
            Some(Point { x, y: 0 })
        }
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(options.poll_interval(), Duration::from_millis(200));
        }

        #[test]
        fn test_chained() {
            let options = WaitOptions::new().with_timeout(5).with_poll_interval(1);
            assert_eq!(options.timeout(), Duration::from_millis(5));
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let result = fast().poll(|| true, Duration::from_millis(50), "now");
            assert!(result.success);
            assert_eq!(result.attempts, 1);
        }

        #[test]
        fn test_timeout_is_error() {
            let waiter = Waiter::with_options(WaitOptions::new().with_timeout(20).with_poll_interval(5));
            let err = waiter.wait_for(|| false, "never").unwrap_err();
            assert!(matches!(err, SpecBindError::Timeout { ms: 20, .. }));
        }

        #[test]
        fn test_wait_until_eventually() {
            let mut n = 0;
            wait_until(
                || {
                    n += 1;
                    n > 2
                },
                1_000,
            )
            .unwrap();
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_parse_phrases() {
            assert_eq!("become enabled".parse::<WaitConditions>().unwrap(), WaitConditions::BecomesEnabled);
            assert_eq!("remain existent".parse::<WaitConditions>().unwrap(), WaitConditions::RemainsExistent);
            assert_eq!("Stop Moving".parse::<WaitConditions>().unwrap(), WaitConditions::NotMoving);
            assert_eq!(
                "becomes non-existent".parse::<WaitConditions>().unwrap(),
                WaitConditions::BecomesNonExistent
            );
            assert!("explode".parse::<WaitConditions>().is_err());
        }

        #[test]
        fn test_phrase_roundtrip() {
            for condition in WaitConditions::ALL {
                assert_eq!(condition.phrase().parse::<WaitConditions>().unwrap(), condition);
            }
        }

        #[test]
        fn test_becomes_first_success_wins() {
            let probe = Flipping::new(false, 3);
            let start = Instant::now();
            assert!(wait_for_condition(
                &probe,
                WaitConditions::BecomesExistent,
                Duration::from_secs(5),
                &fast()
            ));
            assert!(start.elapsed() < Duration::from_secs(5));
        }

        #[test]
        fn test_remains_true_only_after_full_window() {
            let probe = Flipping::new(true, u32::MAX);
            let timeout = Duration::from_millis(60);
            let start = Instant::now();
            assert!(wait_for_condition(&probe, WaitConditions::RemainsExistent, timeout, &fast()));
            assert!(start.elapsed() >= timeout);
        }

        #[test]
        fn test_remains_false_on_violation() {
            let probe = Flipping::new(true, 2);
            assert!(!wait_for_condition(
                &probe,
                WaitConditions::RemainsEnabled,
                Duration::from_secs(5),
                &fast()
            ));
            let probe = Flipping::new(false, 2);
            assert!(!wait_for_condition(
                &probe,
                WaitConditions::RemainsNonExistent,
                Duration::from_secs(5),
                &fast()
            ));
        }

        #[test]
        fn test_remains_disabled_holds() {
            let probe = Flipping::new(false, u32::MAX);
            assert!(wait_for_condition(
                &probe,
                WaitConditions::RemainsDisabled,
                Duration::from_millis(30),
                &fast()
            ));
        }

        #[test]
        fn test_not_moving_settles() {
            let probe = Flipping::new(true, 4);
            assert!(wait_for_condition(
                &probe,
                WaitConditions::NotMoving,
                Duration::from_secs(5),
                &fast()
            ));
        }
    }

    mod cancellation_tests {
        use super::*;

        #[test]
        fn test_manual_cancel() {
            let token = CancellationToken::new();
            assert!(!token.is_cancelled());
            token.cancel();
            assert!(token.is_cancelled());
        }

        #[test]
        fn test_cancel_after_timer() {
            let token = CancellationToken::cancel_after(Duration::from_millis(10));
            wait_until(|| token.is_cancelled(), 2_000).unwrap();
        }

        #[test]
        fn test_deadline_without_timer_thread() {
            let token = CancellationToken::cancel_after(Duration::from_millis(20));
            let clone = token.clone();
            assert!(!token.is_cancelled());
            std::thread::sleep(Duration::from_millis(40));
            assert!(token.is_cancelled());
            assert!(clone.is_cancelled());
        }

        #[test]
        fn test_far_deadline_still_cancellable() {
            let token = CancellationToken::cancel_after(Duration::MAX);
            assert!(!token.is_cancelled());
            token.clone().cancel();
            assert!(token.is_cancelled());
        }
    }
}
