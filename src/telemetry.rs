//! Structured telemetry for generation anomalies and broken invariants.
//!
//! Maze generation has no recoverable failure paths, but a few situations are
//! still worth surfacing: requested dimensions that had to be clamped, a
//! phase-1 stall threshold that had to be raised, a random source asked for an
//! empty range, or a node grid that did not end up as one spanning tree.
//! These are reported as [`Violation`] values to the observer installed with
//! [`MazeBuilder::with_violation_observer`], or logged through `tracing` when
//! none is installed.
//!
//! # Example
//!
//! ```
//! use labyrinth::telemetry::{CollectingObserver, ViolationKind};
//! use labyrinth::MazeBuilder;
//! use std::sync::Arc;
//!
//! let observer = Arc::new(CollectingObserver::new());
//! let maze = MazeBuilder::new(3, 41)
//!     .with_seed(7)
//!     .with_violation_observer(observer.clone())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(maze.pix_width(), 5);
//! let clamp = &observer.violations_of_kind(ViolationKind::Configuration)[0];
//! assert_eq!(clamp.context["requested"], "3");
//! assert_eq!(clamp.context["used"], "5");
//! ```
//!
//! [`MazeBuilder::with_violation_observer`]: crate::MazeBuilder::with_violation_observer

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

/// Severity of a violation, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    /// Caller input was normalized; the maze is exactly what that input means.
    ///
    /// Logged at `debug` level by [`TracingObserver`].
    Notice,
    /// Generation continued with a fallback value.
    Warning,
    /// A primitive was misused and returned a placeholder result.
    Error,
    /// The produced maze may not be perfect.
    Critical,
}

impl ViolationSeverity {
    /// Lowercase label used in logs and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Notice => "notice",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl Display for ViolationSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What part of maze construction a violation comes from.
///
/// # Forward Compatibility
///
/// This enum is `#[non_exhaustive]`; include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ViolationKind {
    /// A requested dimension was clamped, or a random draw asked for an
    /// empty range.
    Configuration,
    /// Phase 1 needed a fallback stall threshold.
    Generation,
    /// The finished node grid is not a single spanning tree.
    Connectivity,
    /// A [`InvariantChecker`] check failed.
    ///
    /// Only checked in debug builds or when the `paranoid` feature is enabled.
    Invariant,
}

impl ViolationKind {
    /// Lowercase label used in logs and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Generation => "generation",
            Self::Connectivity => "connectivity",
            Self::Invariant => "invariant",
        }
    }
}

impl Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported violation.
///
/// `context` carries the numbers behind the message (for example the
/// `requested` and `used` width of a clamp) so observers need not parse
/// `message`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Violation {
    /// How bad it is.
    pub severity: ViolationSeverity,
    /// Where in construction it happened.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
    /// `file:line` of the report.
    pub location: &'static str,
    /// Structured values keyed by name.
    pub context: BTreeMap<&'static str, String>,
}

impl Violation {
    /// Creates a violation without context.
    #[must_use]
    pub fn new(
        severity: ViolationSeverity,
        kind: ViolationKind,
        message: impl Into<String>,
        location: &'static str,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            location,
            context: BTreeMap::new(),
        }
    }

    /// Attaches a named value.
    #[must_use]
    pub fn with_context(mut self, key: &'static str, value: impl Display) -> Self {
        self.context.insert(key, value.to_string());
        self
    }

    /// Serializes this violation to a JSON string.
    ///
    /// Returns `None` if serialization fails.
    #[cfg(feature = "json")]
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    fn context_string(&self) -> String {
        let pairs: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        pairs.join(", ")
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}/{}] {} (at {})",
            self.severity, self.kind, self.message, self.location
        )?;
        if !self.context.is_empty() {
            write!(f, " {{{}}}", self.context_string())?;
        }
        Ok(())
    }
}

/// Receives violations reported during maze construction.
///
/// With the `sync-send` feature observers must be `Send + Sync`.
///
/// # Example
///
/// ```
/// use labyrinth::telemetry::{Violation, ViolationObserver, ViolationSeverity};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// struct CriticalCounter {
///     count: AtomicUsize,
/// }
///
/// impl ViolationObserver for CriticalCounter {
///     fn on_violation(&self, violation: &Violation) {
///         if violation.severity == ViolationSeverity::Critical {
///             self.count.fetch_add(1, Ordering::Relaxed);
///         }
///     }
/// }
/// ```
#[cfg(feature = "sync-send")]
pub trait ViolationObserver: Send + Sync {
    /// Called once per reported violation.
    fn on_violation(&self, violation: &Violation);
}

#[cfg(not(feature = "sync-send"))]
/// Receives violations reported during maze construction.
pub trait ViolationObserver {
    /// Called once per reported violation.
    fn on_violation(&self, violation: &Violation);
}

/// Default observer: logs each violation as a `tracing` event.
///
/// `Notice` goes to `debug!`, `Warning` to `warn!`, and `Error` and
/// `Critical` to `error!`. The event carries `severity`, `kind`, `location`
/// and `context` fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ViolationObserver for TracingObserver {
    fn on_violation(&self, violation: &Violation) {
        let severity = violation.severity.as_str();
        let kind = violation.kind.as_str();
        let location = violation.location;
        let context = violation.context_string();
        let message = &violation.message;

        match violation.severity {
            ViolationSeverity::Notice => {
                tracing::debug!(severity, kind, location, context = %context, "{message}");
            },
            ViolationSeverity::Warning => {
                tracing::warn!(severity, kind, location, context = %context, "{message}");
            },
            ViolationSeverity::Error | ViolationSeverity::Critical => {
                tracing::error!(severity, kind, location, context = %context, "{message}");
            },
        }
    }
}

/// Observer that keeps every violation, for tests and tooling.
///
/// ```
/// use labyrinth::telemetry::{CollectingObserver, ViolationKind, ViolationSeverity};
/// use labyrinth::MazeBuilder;
/// use std::sync::Arc;
///
/// let observer = Arc::new(CollectingObserver::new());
/// MazeBuilder::new(1, 1)
///     .with_violation_observer(observer.clone())
///     .build()
///     .unwrap();
///
/// assert_eq!(observer.len(), 2);
/// assert!(observer.has_violation(ViolationKind::Configuration));
/// assert!(!observer.has_severity(ViolationSeverity::Critical));
/// ```
#[derive(Debug, Default)]
pub struct CollectingObserver {
    violations: Mutex<Vec<Violation>>,
}

impl CollectingObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything collected so far, in report order.
    #[must_use]
    pub fn violations(&self) -> Vec<Violation> {
        self.violations.lock().clone()
    }

    /// Number of collected violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.lock().len()
    }

    /// True if nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.lock().is_empty()
    }

    /// True if any collected violation has this kind.
    #[must_use]
    pub fn has_violation(&self, kind: ViolationKind) -> bool {
        self.violations.lock().iter().any(|v| v.kind == kind)
    }

    /// True if any collected violation has this severity.
    #[must_use]
    pub fn has_severity(&self, severity: ViolationSeverity) -> bool {
        self.violations
            .lock()
            .iter()
            .any(|v| v.severity == severity)
    }

    /// The collected violations of one kind, in report order.
    #[must_use]
    pub fn violations_of_kind(&self, kind: ViolationKind) -> Vec<Violation> {
        self.violations
            .lock()
            .iter()
            .filter(|v| v.kind == kind)
            .cloned()
            .collect()
    }
}

impl ViolationObserver for CollectingObserver {
    fn on_violation(&self, violation: &Violation) {
        self.violations.lock().push(violation.clone());
    }
}

/// Hands `violation` to `observer`, or to [`TracingObserver`] when there is
/// none.
pub fn report_to_observer<O: ViolationObserver + ?Sized>(
    observer: Option<&Arc<O>>,
    violation: &Violation,
) {
    match observer {
        Some(obs) => obs.on_violation(violation),
        None => TracingObserver.on_violation(violation),
    }
}

/// Reports a violation at the current `file:line` straight to
/// [`TracingObserver`].
///
/// For code paths that have no observer in reach, such as [`Rng::below`].
///
/// [`Rng::below`]: crate::Rng::below
#[macro_export]
macro_rules! report_violation {
    ($severity:expr, $kind:expr, $msg:literal) => {{
        use $crate::telemetry::ViolationObserver as _;
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            $msg,
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::TracingObserver.on_violation(&violation);
    }};
}

/// Reports a violation at the current `file:line` through an
/// `&Option<Arc<dyn ViolationObserver>>`.
///
/// ```text
/// report_violation_to!(observer, severity, kind, "message {}", arg);
/// report_violation_to!(observer, severity, kind, { "key" => value, .. }, "message {}", arg);
/// ```
#[macro_export]
macro_rules! report_violation_to {
    ($observer:expr, $severity:expr, $kind:expr, { $($key:literal => $value:expr),* $(,)? }, $fmt:literal, $($arg:tt)+) => {{
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        )
        $(.with_context($key, $value))*;
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};

    ($observer:expr, $severity:expr, $kind:expr, $fmt:literal, $($arg:tt)+) => {{
        let violation = $crate::telemetry::Violation::new(
            $severity,
            $kind,
            format!($fmt, $($arg)+),
            concat!(file!(), ":", line!()),
        );
        $crate::telemetry::report_to_observer($observer.as_ref(), &violation);
    }};
}

/// Asserts that a [`CollectingObserver`] holds no violations.
///
/// # Panics
///
/// Panics and prints the violations if there are any.
#[macro_export]
macro_rules! assert_no_violations {
    ($observer:expr) => {{
        let violations = $observer.violations();
        assert!(
            violations.is_empty(),
            "Expected no violations, but found {}:\n{:#?}",
            violations.len(),
            violations
        );
    }};
}

/// Asserts that a [`CollectingObserver`] holds a violation of `kind`.
///
/// # Panics
///
/// Panics and prints the violations if none has that kind.
#[macro_export]
macro_rules! assert_violation {
    ($observer:expr, $kind:expr) => {{
        assert!(
            $observer.has_violation($kind),
            "Expected violation of kind {:?}, but found: {:#?}",
            $kind,
            $observer.violations()
        );
    }};
}

// ==========================================
// Runtime Invariant Checking
// ==========================================

/// A failed invariant check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InvariantViolation {
    /// Type whose invariant failed.
    pub type_name: &'static str,
    /// The invariant that failed.
    pub invariant: String,
    /// Offending values, if any.
    pub details: Option<String>,
}

impl InvariantViolation {
    /// Creates an invariant violation without details.
    #[must_use]
    pub fn new(type_name: &'static str, invariant: impl Into<String>) -> Self {
        Self {
            type_name,
            invariant: invariant.into(),
            details: None,
        }
    }

    /// Adds the offending values.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.type_name, self.invariant)?;
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

/// Types that can verify their own structural invariants.
pub trait InvariantChecker {
    /// Returns the first broken invariant, if any.
    fn check_invariants(&self) -> Result<(), InvariantViolation>;
}

/// Checks `subject`'s invariants in debug builds (or with the `paranoid`
/// feature) and reports a failure as a `Critical` [`ViolationKind::Invariant`]
/// through `observer`, with the construction `stage` as context.
///
/// ```text
/// debug_check_invariants!(observer, grid, "after generation");
/// ```
///
/// Compiles to nothing in release builds without `paranoid`.
#[macro_export]
#[cfg(any(debug_assertions, feature = "paranoid"))]
macro_rules! debug_check_invariants {
    ($observer:expr, $subject:expr, $stage:literal) => {{
        use $crate::telemetry::InvariantChecker as _;
        if let Err(broken) = $subject.check_invariants() {
            $crate::report_violation_to!(
                $observer,
                $crate::telemetry::ViolationSeverity::Critical,
                $crate::telemetry::ViolationKind::Invariant,
                { "stage" => $stage },
                "{}",
                broken
            );
        }
    }};
}

/// No-op version for release builds without the `paranoid` feature.
#[macro_export]
#[cfg(not(any(debug_assertions, feature = "paranoid")))]
macro_rules! debug_check_invariants {
    ($observer:expr, $subject:expr, $stage:literal) => {{}};
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn sample(severity: ViolationSeverity, kind: ViolationKind) -> Violation {
        Violation::new(severity, kind, "sample", "test.rs:1")
    }

    struct OpenBorder;

    impl InvariantChecker for OpenBorder {
        fn check_invariants(&self) -> Result<(), InvariantViolation> {
            Err(InvariantViolation::new("OpenBorder", "border not sealed").with_details("node=3"))
        }
    }

    #[test]
    fn test_violation_severity_ordering() {
        assert!(ViolationSeverity::Notice < ViolationSeverity::Warning);
        assert!(ViolationSeverity::Warning < ViolationSeverity::Error);
        assert!(ViolationSeverity::Error < ViolationSeverity::Critical);
    }

    #[test]
    fn test_violation_kind_as_str() {
        assert_eq!(ViolationKind::Configuration.as_str(), "configuration");
        assert_eq!(ViolationKind::Generation.as_str(), "generation");
        assert_eq!(ViolationKind::Connectivity.as_str(), "connectivity");
        assert_eq!(ViolationKind::Invariant.as_str(), "invariant");
    }

    #[test]
    fn test_violation_display_without_context() {
        let violation = sample(ViolationSeverity::Warning, ViolationKind::Generation);
        assert_eq!(violation.to_string(), "[warning/generation] sample (at test.rs:1)");
    }

    #[test]
    fn test_violation_display_lists_context_in_key_order() {
        let violation = sample(ViolationSeverity::Critical, ViolationKind::Connectivity)
            .with_context("interior", 49)
            .with_context("detached", 2);
        assert_eq!(
            violation.to_string(),
            "[critical/connectivity] sample (at test.rs:1) {detached=2, interior=49}"
        );
    }

    #[test]
    fn test_violation_serializes_context() {
        let violation = sample(ViolationSeverity::Notice, ViolationKind::Configuration)
            .with_context("requested", 2)
            .with_context("used", 5);
        let json = serde_json::to_string(&violation).unwrap();
        assert!(json.contains(r#""severity":"notice""#));
        assert!(json.contains(r#""context":{"requested":"2","used":"5"}"#));
    }

    #[test]
    fn test_collecting_observer() {
        let observer = CollectingObserver::new();
        assert!(observer.is_empty());

        observer.on_violation(&sample(ViolationSeverity::Notice, ViolationKind::Configuration));
        observer.on_violation(&sample(ViolationSeverity::Warning, ViolationKind::Generation));

        assert_eq!(observer.len(), 2);
        assert!(observer.has_violation(ViolationKind::Configuration));
        assert!(!observer.has_violation(ViolationKind::Connectivity));
        assert!(observer.has_severity(ViolationSeverity::Warning));
        assert!(!observer.has_severity(ViolationSeverity::Critical));
        assert_eq!(observer.violations_of_kind(ViolationKind::Generation).len(), 1);
    }

    #[test]
    fn test_report_to_observer_falls_back_to_tracing() {
        let observer = Arc::new(CollectingObserver::new());
        let violation = sample(ViolationSeverity::Warning, ViolationKind::Generation);

        report_to_observer(Some(&observer), &violation);
        report_to_observer(None::<&Arc<CollectingObserver>>, &violation);
        assert_eq!(observer.len(), 1);
    }

    #[test]
    fn test_report_violation_to_none_uses_tracing() {
        let observer: Option<Arc<dyn ViolationObserver>> = None;
        report_violation_to!(
            &observer,
            ViolationSeverity::Notice,
            ViolationKind::Configuration,
            "value {} clamped",
            2
        );
    }

    #[test]
    fn test_report_violation_to_attaches_context() {
        let collecting = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
        report_violation_to!(
            &observer,
            ViolationSeverity::Warning,
            ViolationKind::Generation,
            { "batch_limit" => 100, "stall_divisor" => 200 },
            "threshold {} raised",
            0
        );

        let violation = &collecting.violations()[0];
        assert_eq!(violation.message, "threshold 0 raised");
        assert_eq!(violation.context["batch_limit"], "100");
        assert_eq!(violation.context["stall_divisor"], "200");
        assert!(violation.location.contains("telemetry.rs"));
    }

    #[cfg(any(debug_assertions, feature = "paranoid"))]
    #[test]
    fn test_failed_invariant_goes_to_installed_observer() {
        let collecting = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
        debug_check_invariants!(&observer, OpenBorder, "after generation");

        let violations = collecting.violations_of_kind(ViolationKind::Invariant);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, ViolationSeverity::Critical);
        assert_eq!(
            violations[0].message,
            "OpenBorder: border not sealed (node=3)"
        );
        assert_eq!(violations[0].context["stage"], "after generation");
    }

    #[test]
    fn test_assert_no_violations_passes_when_empty() {
        let observer = CollectingObserver::new();
        assert_no_violations!(observer);
    }
}
