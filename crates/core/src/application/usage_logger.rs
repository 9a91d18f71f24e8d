use std::sync::Arc;

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, Instrument};

use crate::{
    domain::usage_log::LogEntry,
    ports::usage_log_sink::{LogError, UsageLogSink},
};

/// Fire-and-forget usage logging. Appends run on their own task and their
/// outcome never reaches the caller.
#[derive(Clone, Default)]
pub struct UsageLogger {
    sink: Option<Arc<dyn UsageLogSink>>,
}

impl UsageLogger {
    pub fn new(sink: Arc<dyn UsageLogSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A logger that drops every entry.
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Returns the append task, or `None` when logging is off or there is no
    /// runtime to spawn on. Callers are free to drop the handle.
    pub fn log(&self, entry: LogEntry) -> Option<JoinHandle<error_stack::Result<(), LogError>>> {
        let sink = self.sink.clone()?;
        let runtime = Handle::try_current().ok()?;
        let span = tracing::debug_span!("usage_log", event = %entry.event);

        Some(runtime.spawn(
            async move {
                let result = sink.append(&entry).await;
                if let Err(report) = &result {
                    debug!("Usage log append failed, ignoring: {:?}", report);
                }
                result
            }
            .instrument(span),
        ))
    }
}
