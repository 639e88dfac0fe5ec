//! Observability sink interface and in-process sinks.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// A single loggable value inside a log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogValue {
    Text(String),
    Number(i64),
    Bool(bool),
}

impl LogValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LogValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Text(s) => f.write_str(s),
            LogValue::Number(n) => write!(f, "{}", n),
            LogValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Text(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Text(s)
    }
}

impl From<u16> for LogValue {
    fn from(n: u16) -> Self {
        LogValue::Number(i64::from(n))
    }
}

impl From<i64> for LogValue {
    fn from(n: i64) -> Self {
        LogValue::Number(n)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

/// An error reported to the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkError {
    pub message: String,
    /// Extra context (request id, status, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl ToString) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}

/// Destination for structured log and error records.
///
/// Implementations must accept concurrent calls; each call is one record.
pub trait ObservabilitySink: Send + Sync {
    fn push_log(&self, fields: &[LogValue]);

    fn push_error(&self, error: &SinkError);
}

/// Sink that drops everything. Installed when telemetry is not initialized.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ObservabilitySink for NoopSink {
    fn push_log(&self, _fields: &[LogValue]) {}

    fn push_error(&self, _error: &SinkError) {}
}

/// Emits each record as a single `tracing` event.
///
/// Fallback when the collector cannot be started.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ObservabilitySink for TracingSink {
    fn push_log(&self, fields: &[LogValue]) {
        let record = fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        tracing::info!(target: "storefront_facade::sink", %record, "Sink record");
    }

    fn push_error(&self, error: &SinkError) {
        tracing::error!(
            target: "storefront_facade::sink",
            attributes = ?error.attributes,
            "{}",
            error.message
        );
    }
}

/// Forwards every record to each inner sink, in order.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ObservabilitySink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn ObservabilitySink>>) -> Self {
        Self { sinks }
    }
}

impl ObservabilitySink for FanoutSink {
    fn push_log(&self, fields: &[LogValue]) {
        for sink in &self.sinks {
            sink.push_log(fields);
        }
    }

    fn push_error(&self, error: &SinkError) {
        for sink in &self.sinks {
            sink.push_error(error);
        }
    }
}

/// A record captured by a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkEvent {
    Log { fields: Vec<LogValue> },
    Error(SinkError),
}

impl SinkEvent {
    /// First field of a log record, or the error message.
    pub fn label(&self) -> &str {
        match self {
            SinkEvent::Log { fields } => fields.first().and_then(LogValue::as_text).unwrap_or(""),
            SinkEvent::Error(err) => &err.message,
        }
    }

    /// Request id carried by facade records, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            SinkEvent::Log { fields } => fields.get(3).and_then(LogValue::as_text),
            SinkEvent::Error(err) => err.attributes.get("request_id").map(String::as_str),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SinkEvent::Error(_))
    }
}

/// Sink that keeps every record in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SinkEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// Remove and return every captured record.
    pub fn drain(&self) -> Vec<SinkEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ObservabilitySink for MemorySink {
    fn push_log(&self, fields: &[LogValue]) {
        self.lock().push(SinkEvent::Log {
            fields: fields.to_vec(),
        });
    }

    fn push_error(&self, error: &SinkError) {
        self.lock().push(SinkEvent::Error(error.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.push_log(&["API Request".into(), "GET".into(), "/users".into()]);
        sink.push_error(&SinkError::new("API Error: 500 /users - boom"));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].label(), "API Request");
        assert!(events[1].is_error());
        assert!(sink.drain().len() == 2 && sink.is_empty());
    }

    #[test]
    fn test_concurrent_pushes_are_whole_records() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        sink.push_log(&[LogValue::from("tick"), LogValue::from(t as i64), LogValue::from(i as i64)]);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let events = sink.events();
        assert_eq!(events.len(), 800);
        assert!(events.iter().all(|e| matches!(e, SinkEvent::Log { fields } if fields.len() == 3)));
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(MemorySink::new());
        let b = Arc::new(MemorySink::new());
        let sinks: Vec<Arc<dyn ObservabilitySink>> = vec![a.clone(), Arc::new(NoopSink), b.clone()];
        let fanout = FanoutSink::new(sinks);
        fanout.push_error(&SinkError::new("boom"));
        assert_eq!(a.events(), b.events());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_tracing_sink_accepts_records_without_subscriber() {
        let sink = TracingSink;
        sink.push_log(&["API Request".into(), "GET".into(), "/users".into()]);
        sink.push_error(&SinkError::new("API Error: 404 /users/9 - user 9 not found").with_attribute("code", "NOT_FOUND"));
    }

    #[test]
    fn test_log_value_json() {
        let fields = vec![LogValue::from("API Response Success"), LogValue::from(200u16)];
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"["API Response Success",200]"#
        );
    }

    #[test]
    fn test_error_request_id() {
        let event = SinkEvent::Error(SinkError::new("x").with_attribute("request_id", "abc"));
        assert_eq!(event.request_id(), Some("abc"));
    }
}
