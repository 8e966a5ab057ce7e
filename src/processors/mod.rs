//! The processors shipped with the crate.

pub mod bulk_create;
pub mod bulk_move;

use std::sync::Arc;

use crate::backend::ContentService;
use crate::core::error::DiscoveryError;
use crate::core::processor::Processor;
use crate::core::registry::ProcessorProvider;

pub use bulk_create::BulkCreateNodes;
pub use bulk_move::BulkMoveNodes;

/// Offers the built-in processors, all bound to one content backend.
#[derive(Clone)]
pub struct BuiltinProvider {
    backend: Arc<dyn ContentService>,
}

impl BuiltinProvider {
    pub fn new(backend: Arc<dyn ContentService>) -> Self {
        Self { backend }
    }
}

impl ProcessorProvider for BuiltinProvider {
    fn name(&self) -> &str {
        "builtin"
    }

    fn processors(&self) -> Result<Vec<Arc<dyn Processor>>, DiscoveryError> {
        Ok(vec![
            Arc::new(BulkMoveNodes::new(Arc::clone(&self.backend))),
            Arc::new(BulkCreateNodes::new(Arc::clone(&self.backend))),
        ])
    }
}
