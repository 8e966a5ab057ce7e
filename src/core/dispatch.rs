use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::convert::{FieldIssue, convert};
use crate::core::error::DispatchError;
use crate::core::input::ConvertedInputs;
use crate::core::markup::{escape_html, html_list};
use crate::core::processor::Processor;
use crate::core::registry::ProcessorRegistry;

/// Shown when no processor matches the requested label.
pub const NOT_FOUND_MESSAGE: &str = "<h2>Invalid data processor.</h2>";
/// Shown when the raw values do not convert against the schema.
pub const INVALID_INPUT_MESSAGE: &str = "<h2>Error. Invalid input.</h2>";
/// Shown when a run ends without anything more specific to say.
pub const UNKNOWN_ERROR_MESSAGE: &str = "<h2>Unknown error.</h2>";

/// Configuration for a [`Dispatcher`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Append a per-field list of problems to the invalid input message (default: false)
    pub detailed_errors: bool,
    /// Upper bound on an execute routine, in milliseconds. Async dispatch only (default: none)
    pub execute_timeout_ms: Option<u64>,
    pub not_found_message: String,
    pub invalid_input_message: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            detailed_errors: false,
            execute_timeout_ms: None,
            not_found_message: NOT_FOUND_MESSAGE.to_string(),
            invalid_input_message: INVALID_INPUT_MESSAGE.to_string(),
        }
    }
}

impl DispatchConfig {
    pub fn with_detailed_errors(mut self, detailed: bool) -> Self {
        self.detailed_errors = detailed;
        self
    }

    pub fn with_execute_timeout(mut self, timeout: Duration) -> Self {
        self.execute_timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn with_not_found_message(mut self, message: impl Into<String>) -> Self {
        self.not_found_message = message.into();
        self
    }

    pub fn with_invalid_input_message(mut self, message: impl Into<String>) -> Self {
        self.invalid_input_message = message.into();
        self
    }

    pub fn execute_timeout(&self) -> Option<Duration> {
        self.execute_timeout_ms.map(Duration::from_millis)
    }
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// The processor ran. Its message may still describe a refusal.
    Completed,
    ProcessorNotFound,
    InvalidInput,
    ExecutionFailed,
    TimedOut,
}

/// The uniform response of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessResult {
    /// Display-ready markup.
    pub message: String,
    pub status: ProcessStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldIssue>,
}

impl ProcessResult {
    pub fn new(status: ProcessStatus, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status,
            errors: Vec::new(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProcessStatus::Completed
    }
}

/// A dispatch that passed lookup and conversion, or the reason it did not.
enum Prepared {
    Ready(Arc<dyn Processor>, ConvertedInputs),
    Rejected(ProcessResult),
}

/// Resolves processors by label, converts raw values against their schema and runs them.
///
/// Holds no per-call state; clone it freely or share it behind a reference.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<ProcessorRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProcessorRegistry>) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    pub fn with_config(registry: Arc<ProcessorRegistry>, config: DispatchConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ProcessorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs the processor named `label` against `raw`.
    ///
    /// Never fails: collaborator faults are reported as an
    /// [`ExecutionFailed`](ProcessStatus::ExecutionFailed) result.
    pub fn process<S: AsRef<str>>(&self, label: &str, raw: &[S]) -> ProcessResult {
        self.try_process(label, raw)
            .unwrap_or_else(|e| self.failure_result(e))
    }

    /// Like [`process`](Self::process), but collaborator faults are returned as errors.
    pub fn try_process<S: AsRef<str>>(
        &self,
        label: &str,
        raw: &[S],
    ) -> Result<ProcessResult, DispatchError> {
        let (processor, inputs) = match self.prepare(label, raw) {
            Prepared::Ready(processor, inputs) => (processor, inputs),
            Prepared::Rejected(result) => return Ok(result),
        };

        match processor.execute(&inputs) {
            Ok(message) => Ok(self.completed(processor.label(), message)),
            Err(source) => Err(DispatchError::Execution {
                label: processor.label().to_string(),
                source,
            }),
        }
    }

    /// Runs the processor on the blocking pool, bounded by the configured timeout.
    ///
    /// A routine that overruns is abandoned, not cancelled: its backend calls
    /// may still complete after the result is returned.
    pub async fn process_async<S: AsRef<str>>(&self, label: &str, raw: &[S]) -> ProcessResult {
        match self.try_process_async(label, raw).await {
            Ok(result) => result,
            Err(e) => self.failure_result(e),
        }
    }

    /// Like [`process_async`](Self::process_async), but failures are returned as errors.
    pub async fn try_process_async<S: AsRef<str>>(
        &self,
        label: &str,
        raw: &[S],
    ) -> Result<ProcessResult, DispatchError> {
        let (processor, inputs) = match self.prepare(label, raw) {
            Prepared::Ready(processor, inputs) => (processor, inputs),
            Prepared::Rejected(result) => return Ok(result),
        };
        let label = processor.label().to_string();

        let task = tokio::task::spawn_blocking(move || processor.execute(&inputs));
        let joined = match self.config.execute_timeout() {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    log::warn!("Processor '{}' timed out after {:?}", label, limit);
                    return Err(DispatchError::TimedOut {
                        label,
                        timeout: limit,
                    });
                }
            },
            None => task.await,
        };

        match joined {
            Ok(Ok(message)) => Ok(self.completed(&label, message)),
            Ok(Err(source)) => Err(DispatchError::Execution { label, source }),
            Err(join_error) => {
                log::error!("Processor '{}' did not finish: {}", label, join_error);
                Err(DispatchError::Panicked(label))
            }
        }
    }

    fn prepare<S: AsRef<str>>(&self, label: &str, raw: &[S]) -> Prepared {
        let Some(processor) = self.registry.find(label) else {
            log::warn!("No processor registered under '{}'", label);
            return Prepared::Rejected(ProcessResult::new(
                ProcessStatus::ProcessorNotFound,
                self.config.not_found_message.clone(),
            ));
        };

        log::debug!(
            "Dispatching '{}' with {} raw value(s)",
            processor.label(),
            raw.len()
        );

        match convert(&processor.inputs(), raw) {
            Ok(inputs) => Prepared::Ready(Arc::clone(processor), inputs),
            Err(report) => {
                log::warn!(
                    "Rejected input for '{}': {} issue(s)",
                    processor.label(),
                    report.issues.len()
                );
                let mut message = self.config.invalid_input_message.clone();
                if self.config.detailed_errors {
                    message.push_str(&html_list(report.issues.iter().map(|i| i.to_string())));
                }
                Prepared::Rejected(ProcessResult {
                    message,
                    status: ProcessStatus::InvalidInput,
                    errors: report.issues,
                })
            }
        }
    }

    fn completed(&self, label: &str, message: String) -> ProcessResult {
        log::info!("Processor '{}' completed", label);
        ProcessResult::new(ProcessStatus::Completed, message)
    }

    fn failure_result(&self, error: DispatchError) -> ProcessResult {
        log::warn!("{}", error);
        match &error {
            DispatchError::Execution { source, .. } => ProcessResult::new(
                ProcessStatus::ExecutionFailed,
                format!("<h2>Error</h2><br />{}", escape_html(&source.to_string())),
            ),
            DispatchError::TimedOut { timeout, .. } => ProcessResult::new(
                ProcessStatus::TimedOut,
                format!(
                    "<h2>Error</h2><br />The operation did not finish within {} ms.",
                    timeout.as_millis()
                ),
            ),
            DispatchError::Panicked(_) => {
                ProcessResult::new(ProcessStatus::ExecutionFailed, UNKNOWN_ERROR_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{BackendError, ProcessorError};
    use crate::core::input::InputSpec;
    use crate::core::processor::FnProcessor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn spy(calls: Arc<AtomicUsize>) -> FnProcessor {
        FnProcessor::new(
            "Spy",
            vec![InputSpec::node_set("Ids"), InputSpec::text("Note")],
            move |inputs| {
                calls.fetch_add(1, Ordering::SeqCst);
                let ids = inputs.node_set(0)?;
                Ok(format!("{} ids, note '{}'", ids.len(), inputs.text(1)?))
            },
        )
    }

    fn dispatcher_with(processor: FnProcessor, config: DispatchConfig) -> Dispatcher {
        let registry = ProcessorRegistry::new().with(processor);
        Dispatcher::with_config(Arc::new(registry), config)
    }

    #[test]
    fn test_unknown_label_never_executes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(spy(calls.clone()), DispatchConfig::default());

        let result = dispatcher.process("Nope", &["1", "x"]);

        assert_eq!(result.status, ProcessStatus::ProcessorNotFound);
        assert_eq!(result.message, NOT_FOUND_MESSAGE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_input_never_executes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(spy(calls.clone()), DispatchConfig::default());

        let result = dispatcher.process("spy", &["", "note"]);

        assert_eq!(result.status, ProcessStatus::InvalidInput);
        assert_eq!(result.message, INVALID_INPUT_MESSAGE);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detailed_errors_list_each_field() {
        let calls = Arc::new(AtomicUsize::new(0));
        let config = DispatchConfig::default().with_detailed_errors(true);
        let dispatcher = dispatcher_with(spy(calls), config);

        let result = dispatcher.process("Spy", &["<a>"]);

        assert!(result.message.starts_with(INVALID_INPUT_MESSAGE));
        assert!(result.message.contains("&#39;&lt;a&gt;&#39; is not a valid node id"));
        assert!(result.message.contains("Note (input 2): no value was supplied"));
    }

    #[test]
    fn test_message_is_returned_verbatim() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(spy(calls.clone()), DispatchConfig::default());

        let result = dispatcher.process("SPY", &["1 2 3", "<b>raw</b>"]);

        assert!(result.is_completed());
        assert_eq!(result.message, "3 ids, note '<b>raw</b>'");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backend_failure_is_reported_or_raised() {
        let failing = FnProcessor::new("Failing", vec![InputSpec::node("Id")], |inputs| {
            Err(BackendError::NodeNotFound(inputs.node(0)?).into())
        });
        let dispatcher = dispatcher_with(failing, DispatchConfig::default());

        let reported = dispatcher.process("Failing", &["12"]);
        assert_eq!(reported.status, ProcessStatus::ExecutionFailed);
        assert_eq!(reported.message, "<h2>Error</h2><br />Node 12 was not found");

        match dispatcher.try_process("Failing", &["12"]) {
            Err(DispatchError::Execution { label, source }) => {
                assert_eq!(label, "Failing");
                assert!(matches!(
                    source,
                    ProcessorError::Backend(BackendError::NodeNotFound(12))
                ));
            }
            other => panic!("Expected execution error, got {:?}", other),
        }
    }

    #[test]
    fn test_result_wire_shape() {
        let result = ProcessResult::new(ProcessStatus::Completed, "<h2>Success</h2>");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({"Message": "<h2>Success</h2>", "Status": "Completed"})
        );
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config: DispatchConfig =
            serde_json::from_str(r#"{"detailed_errors": true, "execute_timeout_ms": 250}"#)
                .unwrap();
        assert!(config.detailed_errors);
        assert_eq!(config.execute_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.not_found_message, NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn test_async_dispatch_runs_processor() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(spy(calls.clone()), DispatchConfig::default());

        let result = dispatcher.process_async("Spy", &["4", ""]).await;

        assert!(result.is_completed());
        assert_eq!(result.message, "1 ids, note ''");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_dispatch_times_out() {
        let slow = FnProcessor::new("Slow", Vec::new(), |_| {
            std::thread::sleep(Duration::from_millis(200));
            Ok("late".to_string())
        });
        let config = DispatchConfig::default().with_execute_timeout(Duration::from_millis(10));
        let dispatcher = dispatcher_with(slow, config);
        let raw: [&str; 0] = [];

        let result = dispatcher.process_async("Slow", &raw).await;

        assert_eq!(result.status, ProcessStatus::TimedOut);
        assert!(result.message.contains("10 ms"));
    }

    #[tokio::test]
    async fn test_async_dispatch_reports_panics() {
        let panicking = FnProcessor::new("Boom", Vec::new(), |_| panic!("boom"));
        let dispatcher = dispatcher_with(panicking, DispatchConfig::default());
        let raw: [&str; 0] = [];

        let err = dispatcher.try_process_async("Boom", &raw).await.unwrap_err();
        assert!(matches!(err, DispatchError::Panicked(ref label) if label == "Boom"));

        let result = dispatcher.process_async("Boom", &raw).await;
        assert_eq!(result.message, UNKNOWN_ERROR_MESSAGE);
    }
}
