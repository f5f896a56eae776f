//! Telemetry surfaced while building mazes.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use labyrinth::telemetry::{
    CollectingObserver, Violation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use labyrinth::{assert_no_violations, assert_violation, GeneratorConfig, MazeBuilder};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn build_observed(width: u32, height: u32) -> Arc<CollectingObserver> {
    let observer = Arc::new(CollectingObserver::new());
    MazeBuilder::new(width, height)
        .with_seed(11)
        .with_violation_observer(observer.clone())
        .build()
        .unwrap();
    observer
}

#[test]
fn test_regular_build_reports_nothing() {
    let observer = build_observed(81, 41);
    assert_no_violations!(observer);
}

#[test]
fn test_clamped_width_reported() {
    let observer = build_observed(2, 41);
    assert_violation!(observer, ViolationKind::Configuration);
    let violations = observer.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, ViolationSeverity::Notice);
    assert!(violations[0].message.contains("width 2"));
    assert!(violations[0].location.contains("maze.rs"));
    assert_eq!(violations[0].context["axis"], "width");
    assert_eq!(violations[0].context["requested"], "2");
    assert_eq!(violations[0].context["used"], "5");
}

#[test]
fn test_zero_stall_threshold_reported() {
    let observer = Arc::new(CollectingObserver::new());
    let config = GeneratorConfig {
        min_batch: 2,
        max_batch: 2,
        stall_divisor: 3,
        ..GeneratorConfig::default()
    };
    let maze = MazeBuilder::new(21, 21)
        .with_config(config)
        .with_violation_observer(observer.clone())
        .build()
        .unwrap();
    assert_eq!(maze.stats().stall_threshold, 1);
    assert_violation!(observer, ViolationKind::Generation);
    assert!(!observer.has_severity(ViolationSeverity::Critical));

    let raised = &observer.violations_of_kind(ViolationKind::Generation)[0];
    assert_eq!(raised.severity, ViolationSeverity::Warning);
    assert_eq!(raised.context["batch_limit"], "2");
    assert_eq!(raised.context["stall_divisor"], "3");
}

#[test]
fn test_invalid_config_reports_error_not_violation() {
    let observer = Arc::new(CollectingObserver::new());
    let config = GeneratorConfig {
        min_batch: 0,
        ..GeneratorConfig::default()
    };
    let result = MazeBuilder::new(2, 2)
        .with_config(config)
        .with_violation_observer(observer.clone())
        .build();
    assert!(result.is_err());
    assert!(observer.is_empty());
}

#[test]
fn test_custom_observer_receives_violations() {
    struct CountingObserver {
        count: AtomicUsize,
    }

    impl ViolationObserver for CountingObserver {
        fn on_violation(&self, violation: &Violation) {
            assert_eq!(violation.kind, ViolationKind::Configuration);
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    let observer = Arc::new(CountingObserver {
        count: AtomicUsize::new(0),
    });
    MazeBuilder::new(1, 1)
        .with_violation_observer(observer.clone())
        .build()
        .unwrap();
    assert_eq!(observer.count.load(Ordering::Relaxed), 2);
}

/// Captures formatted tracing output at `level` while `build` runs.
fn captured_logs(level: tracing::Level, build: impl FnOnce()) -> String {
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, build);

    let bytes = buffer.0.lock().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn test_clamp_without_observer_is_debug_only() {
    let quiet = captured_logs(tracing::Level::WARN, || {
        let maze = MazeBuilder::new(0, 2).build().unwrap();
        assert_eq!((maze.pix_width(), maze.pix_height()), (5, 5));
    });
    assert_eq!(quiet, "");

    let verbose = captured_logs(tracing::Level::DEBUG, || {
        let _ = MazeBuilder::new(2, 41).build().unwrap();
    });
    assert!(verbose.contains("requested width 2 is below the minimum of 5"));
    assert!(verbose.contains("requested=2"));
    assert!(verbose.contains("used=5"));
}

#[test]
fn test_zero_stall_threshold_without_observer_warns() {
    let config = GeneratorConfig {
        min_batch: 2,
        max_batch: 2,
        stall_divisor: 3,
        ..GeneratorConfig::default()
    };
    let logs = captured_logs(tracing::Level::WARN, || {
        let _ = MazeBuilder::new(21, 21).with_config(config).build().unwrap();
    });
    assert!(logs.contains("WARN"));
    assert!(logs.contains("stall threshold"));
}

#[test]
fn test_stats_serialize() {
    let maze = MazeBuilder::new(41, 41).with_seed(10).build().unwrap();
    let json = serde_json::to_value(maze.stats()).unwrap();
    assert_eq!(json["batch_limit"], 882);
    assert_eq!(json["stall_threshold"], 44);
    assert_eq!(json["sampled_joins"], 361);
    assert!(json["elapsed"].is_object());
}

#[cfg(feature = "json")]
#[test]
fn test_violation_to_json() {
    let observer = build_observed(41, 3);
    let json = observer.violations()[0].to_json().unwrap();
    assert!(json.contains(r#""kind":"configuration""#));
    assert!(json.contains(r#""severity":"notice""#));
    assert!(json.contains(r#""requested":"3""#));
}
