//! The request surface the browser-side form talks to.
//!
//! Transport is left to the host: each method maps one-to-one onto a GET
//! endpoint and returns a value that serializes to the JSON the form expects.

use crate::core::dispatch::{Dispatcher, ProcessResult};
use crate::core::input::InputSpec;

/// Query-facing wrapper around a [`Dispatcher`].
#[derive(Clone, Debug)]
pub struct ProcessorApi {
    dispatcher: Dispatcher,
}

impl ProcessorApi {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// `GetProcessors`: every processor label, in registration order.
    pub fn get_processors(&self) -> Vec<String> {
        self.dispatcher.registry().labels()
    }

    /// `GetProcessorInputs`: the schema of one processor, empty if the label is unknown.
    pub fn get_processor_inputs(&self, processor: &str) -> Vec<InputSpec> {
        self.dispatcher
            .registry()
            .inputs_of(processor)
            .unwrap_or_default()
    }

    /// `ProcessInputs`: converts `data` and runs the processor.
    pub fn process_inputs<S: AsRef<str>>(&self, processor: &str, data: &[S]) -> ProcessResult {
        self.dispatcher.process(processor, data)
    }

    /// Async form of [`process_inputs`](Self::process_inputs), honouring the execute timeout.
    pub async fn process_inputs_async<S: AsRef<str>>(
        &self,
        processor: &str,
        data: &[S],
    ) -> ProcessResult {
        self.dispatcher.process_async(processor, data).await
    }
}
