use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::ProcessorError;
use crate::core::input::{ConvertedInputs, InputSpec};

/// A named unit of work with a declared input schema.
///
/// The dispatcher only ever sees `dyn Processor`: it converts raw request data
/// against [`inputs`](Processor::inputs) and hands the typed result to
/// [`execute`](Processor::execute). Implementations are registered once and
/// shared across callers, so they must be `Send + Sync`.
pub trait Processor: Send + Sync + 'static {
    /// The label shown to users. Lookups match it case-insensitively.
    fn label(&self) -> &str;

    /// The ordered input schema. Position `i` consumes raw value `i`.
    fn inputs(&self) -> Vec<InputSpec>;

    /// Performs the operation.
    ///
    /// `inputs` always matches [`inputs`](Processor::inputs) in length and kind.
    /// The returned string is display-ready markup describing the outcome,
    /// including business-rule refusals. Only collaborator faults should be
    /// returned as `Err`.
    fn execute(&self, inputs: &ConvertedInputs) -> Result<String, ProcessorError>;

    /// Snapshot of this processor's identity and schema.
    fn descriptor(&self) -> ProcessorDescriptor {
        ProcessorDescriptor {
            label: self.label().to_string(),
            inputs: self.inputs(),
        }
    }
}

/// The declared identity and schema of a processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorDescriptor {
    pub label: String,
    pub inputs: Vec<InputSpec>,
}

type ExecuteFn = dyn Fn(&ConvertedInputs) -> Result<String, ProcessorError> + Send + Sync;

/// A processor assembled from a label, a schema and a closure.
///
/// Handy for registration tables where a dedicated type would be overkill.
pub struct FnProcessor {
    label: String,
    inputs: Vec<InputSpec>,
    execute: Box<ExecuteFn>,
}

impl FnProcessor {
    pub fn new<F>(label: impl Into<String>, inputs: Vec<InputSpec>, execute: F) -> Self
    where
        F: Fn(&ConvertedInputs) -> Result<String, ProcessorError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            inputs,
            execute: Box::new(execute),
        }
    }
}

impl fmt::Debug for FnProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor")
            .field("label", &self.label)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

impl Processor for FnProcessor {
    fn label(&self) -> &str {
        &self.label
    }

    fn inputs(&self) -> Vec<InputSpec> {
        self.inputs.clone()
    }

    fn execute(&self, inputs: &ConvertedInputs) -> Result<String, ProcessorError> {
        (self.execute)(inputs)
    }
}
