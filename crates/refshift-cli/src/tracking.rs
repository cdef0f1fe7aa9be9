//! Usage tracking sink
//!
//! Each run reports one summary event. Transport is pluggable behind the
//! `Tracker` trait; the default sink emits a structured log record and the
//! no-op sink drops everything. Tracking can never fail or block the run.

use refshift_core::Config;
use serde::Serialize;

/// Summary record for one hook run
#[derive(Debug, Clone, Serialize)]
pub struct HookEvent {
    pub hook_name: &'static str,
    pub description: &'static str,
    pub status: i32,
    pub execution_time: f64,
    pub file_count: usize,
    pub is_test: bool,
}

impl HookEvent {
    /// Event properties as a JSON map, the shape handed to a transport
    pub fn properties(&self) -> serde_json::Value {
        serde_json::json!({
            "hook_name": self.hook_name,
            "description": self.description,
            "status": self.status,
            "execution_time": self.execution_time,
            "file_count": self.file_count,
            "is_test": self.is_test,
        })
    }
}

/// Fire-and-forget sink for hook events
pub trait Tracker {
    fn track_hook_event(&self, event: &HookEvent);
}

/// Emits events as structured log records
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track_hook_event(&self, event: &HookEvent) {
        tracing::info!(
            event = "hook_executed",
            properties = %event.properties(),
            "{}",
            event.description
        );
    }
}

/// Drops every event; used in tests and when tracking is disabled
pub struct NoopTracker;

impl Tracker for NoopTracker {
    fn track_hook_event(&self, _event: &HookEvent) {}
}

/// Pick a tracker from config and environment (DO_NOT_TRACK disables)
pub fn tracker_from_env(config: &Config) -> Box<dyn Tracker> {
    if config.tracking.disabled || std::env::var_os("DO_NOT_TRACK").is_some() {
        Box::new(NoopTracker)
    } else {
        Box::new(LogTracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> HookEvent {
        HookEvent {
            hook_name: "refshift",
            description: "Replace table names with source() or ref() macros in the script.",
            status: 1,
            execution_time: 0.25,
            file_count: 3,
            is_test: true,
        }
    }

    #[test]
    fn properties_carry_the_summary_fields() {
        let properties = event().properties();

        assert_eq!(properties["hook_name"], "refshift");
        assert_eq!(properties["status"], 1);
        assert_eq!(properties["file_count"], 3);
        assert_eq!(properties["is_test"], true);
    }

    #[test]
    fn noop_tracker_accepts_events() {
        NoopTracker.track_hook_event(&event());
    }

    #[test]
    fn disabled_config_selects_the_noop_tracker() {
        let mut config = Config::default();
        config.tracking.disabled = true;

        // The returned tracker must swallow events without side effects
        tracker_from_env(&config).track_hook_event(&event());
    }
}
