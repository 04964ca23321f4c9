//! Log routing
//!
//! Engine code logs through `tracing`. Events go to the host's log callback
//! when one is installed, otherwise to the `fmt` formatter on stderr.

use arc_swap::ArcSwapOption;
use haptics_shared::LogLevel;
use std::fmt::{self, Write as _};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Host log sink. Called from any thread, the render thread included, often
/// while SDK locks are held, so it must not call back into the SDK.
pub type LogCallback = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

struct LogSink {
    callback: LogCallback,
}

lazy_static::lazy_static! {
    static ref LOG_SINK: ArcSwapOption<LogSink> = ArcSwapOption::empty();
}

/// Installs the process-wide log callback. Only the first one is kept;
/// returns whether `callback` was installed.
pub fn set_log_callback(callback: LogCallback) -> bool {
    let sink = Arc::new(LogSink { callback });
    let previous = LOG_SINK.rcu(|current| current.clone().or_else(|| Some(sink.clone())));
    previous.is_none()
}

pub fn has_log_callback() -> bool {
    LOG_SINK.load().is_some()
}

/// Installs the global subscriber once per process; later calls are no-ops.
/// `RUST_LOG` takes precedence over `filter`.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|_| !has_log_callback()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(CallbackLayer::global())
        .try_init();
}

pub fn level_of(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Forwards events to a log callback as `message key=value ...`
pub struct CallbackLayer {
    callback: Option<LogCallback>,
}

impl CallbackLayer {
    /// Uses whatever callback `set_log_callback` installed
    pub fn global() -> Self {
        Self { callback: None }
    }

    pub fn with_callback(callback: LogCallback) -> Self {
        Self { callback: Some(callback) }
    }

    fn dispatch(&self, level: LogLevel, line: &str) {
        if let Some(callback) = &self.callback {
            callback(level, line);
        } else if let Some(sink) = &*LOG_SINK.load() {
            (sink.callback)(level, line);
        }
    }
}

impl<S: Subscriber> Layer<S> for CallbackLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if self.callback.is_none() && !has_log_callback() {
            return;
        }
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.dispatch(level_of(event.metadata().level()), &visitor.finish());
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
