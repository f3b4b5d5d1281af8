//! JSON-lines layer.
//!
//! Writes one object per event: `timestamp`, `level`, `target`, `message`,
//! then every event field at the top level. Records coming from
//! [`TracingSink`](crate::logger::sink::TracingSink) carry their structured
//! fields as one JSON-encoded `fields` value; that value is decoded and
//! spread into the line, so `request`, `response`, `error`, `md` and `dd`
//! come out as nested objects.

use std::fmt;
use std::io::Write;

use serde_json::{json, Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::logger::sink::FIELDS_KEY;

/// Structured JSON output to any `MakeWriter` (stdout, a rolling file, ...).
pub struct JsonLayer<W> {
    make_writer: W,
}

impl<W> JsonLayer<W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    pub fn new(make_writer: W) -> Self {
        Self { make_writer }
    }
}

impl<S, W> Layer<S> for JsonLayer<W>
where
    S: Subscriber,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let mut line = visitor.values;
        line.insert(
            "timestamp".into(),
            json!(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
        );
        line.insert(
            "level".into(),
            json!(metadata.level().as_str().to_ascii_lowercase()),
        );
        line.insert("target".into(), json!(metadata.target()));
        line.insert("message".into(), json!(visitor.message));

        let mut buf = match serde_json::to_vec(&line) {
            Ok(buf) => buf,
            Err(_) => return,
        };
        buf.push(b'\n');

        // Single write per line so concurrent events never interleave.
        let mut writer = self.make_writer.make_writer_for(metadata);
        let _ = writer.write_all(&buf);
    }
}

#[derive(Default)]
struct JsonVisitor {
    message: String,
    values: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.values.insert(field.name().to_string(), value);
    }

    fn record_text(&mut self, field: &Field, text: String) {
        match field.name() {
            "message" => self.message = text,
            FIELDS_KEY => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(fields) => self.values.extend(fields),
                Err(_) => {
                    self.insert(field, Value::String(text));
                }
            },
            _ => self.insert(field, Value::String(text)),
        }
    }
}

impl Visit for JsonVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_text(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_text(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, json!(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, json!(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, json!(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, json!(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, json!(value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;
    use crate::logger::sink::{Sink, TracingSink};
    use crate::logger::{Level, LogRecord};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Value> {
        let out = Captured::default();
        let subscriber = tracing_subscriber::registry().with(JsonLayer::new(out.clone()));
        tracing::subscriber::with_default(subscriber, f);
        out.lines()
    }

    #[test]
    fn test_record_fields_are_nested_objects() {
        let lines = capture(|| {
            let record = LogRecord::new(Level::Warn, "slow request")
                .with_field("request", json!({ "user_id": 7 }))
                .with_field("md", json!({ "httpserver_md": { "ip": "10.0.0.1" } }));
            TracingSink.emit(&record);
        });

        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["request"]["user_id"], 7);
        assert_eq!(line["md"]["httpserver_md"]["ip"], "10.0.0.1");
        assert_eq!(line["message"], "slow request");
        assert_eq!(line["level"], "warn");
        assert_eq!(line["target"], "blogger");
        assert!(line.get(FIELDS_KEY).is_none());
        assert!(line["timestamp"].is_string());
    }

    #[test]
    fn test_plain_events_keep_their_fields() {
        let lines = capture(|| {
            tracing::info!(port = 8080u64, ready = true, name = "api", "listening");
        });

        let line = &lines[0];
        assert_eq!(line["message"], "listening");
        assert_eq!(line["port"], 8080);
        assert_eq!(line["ready"], true);
        assert_eq!(line["name"], "api");
    }
}
