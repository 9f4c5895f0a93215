//! Observability for aeroplan
//!
//! - Structured logging (JSON, one line per event, on stderr)
//! - Plan cache counters
//! - Typed events
//!
//! Observability is read-only: logging and counting never change what a
//! cache operation returns.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{PlanCacheMetrics, PlanCacheMetricsSnapshot};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
