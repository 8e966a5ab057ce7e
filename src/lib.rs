//! # Data Processor
//!
//! A pluggable command-processing framework: a registry of named processors,
//! each declaring a typed input schema and an execution routine that acts on a
//! content backend and returns a display-ready message.
//!
//! ## Features
//!
//! - **Open-ended registry**: Processors are registered explicitly or discovered from providers
//! - **Schema-driven conversion**: Raw request strings become typed inputs before any processor runs
//! - **Per-field validation**: Every failing input is reported, not just the first
//! - **Uniform results**: Every dispatch ends in one [`ProcessResult`] shape
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dataprocessor::prelude::*;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(InMemoryContentService::new());
//! let builtin = BuiltinProvider::new(backend);
//! let registry = ProcessorRegistry::discover(&[&builtin]);
//! let api = ProcessorApi::new(Dispatcher::new(Arc::new(registry)));
//!
//! for label in api.get_processors() {
//!     println!("{}: {:?}", label, api.get_processor_inputs(&label));
//! }
//! let result = api.process_inputs("Bulk Move Nodes", &["1061, 1062", "1070"]);
//! println!("{}", result.message);
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`]: The content backend interface and an in-memory implementation
//! - [`processors`]: The built-in Bulk Move and Bulk Create processors
//! - [`api`]: The request surface consumed by the browser-side form
//! - [`prelude`]: Commonly used types and traits (import with `use dataprocessor::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

pub mod api;
pub mod backend;
pub mod processors;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

// Schema
pub use crate::core::input::{ConvertedInput, ConvertedInputs, InputSpec, NodeId};
pub use crate::core::kind::InputKind;

// Processors and discovery
pub use crate::core::processor::{FnProcessor, Processor, ProcessorDescriptor};
pub use crate::core::registry::{FnProvider, ProcessorProvider, ProcessorRegistry};

// Conversion
pub use crate::core::convert::{
    FieldIssue, IssueReason, ValidationReport, convert, parse_node, parse_node_set,
};

// Dispatch
pub use crate::core::dispatch::{
    DispatchConfig, Dispatcher, INVALID_INPUT_MESSAGE, NOT_FOUND_MESSAGE, ProcessResult,
    ProcessStatus, UNKNOWN_ERROR_MESSAGE,
};

// Errors
pub use crate::core::error::{BackendError, DiscoveryError, DispatchError, ProcessorError};

pub use crate::core::markup::escape_html;

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: imports everything needed to register, describe and run processors.
///
/// # Example
/// ```rust
/// use dataprocessor::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        // Backend
        backend::{ContentNode, ContentService, InMemoryContentService},
        // Surface
        api::ProcessorApi,
        processors::{BuiltinProvider, BulkCreateNodes, BulkMoveNodes},
        // Core
        ConvertedInput,
        ConvertedInputs,
        DispatchConfig,
        Dispatcher,
        FnProcessor,
        InputKind,
        InputSpec,
        ProcessResult,
        ProcessStatus,
        Processor,
        ProcessorError,
        ProcessorProvider,
        ProcessorRegistry,
    };
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
