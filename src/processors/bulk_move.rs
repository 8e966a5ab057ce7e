use std::sync::Arc;

use crate::backend::ContentService;
use crate::core::error::ProcessorError;
use crate::core::input::{ConvertedInputs, InputSpec};
use crate::core::processor::Processor;

pub const LABEL: &str = "Bulk Move Nodes";

/// Returned, without moving anything, when the destination sits at or under a source.
pub const DESTINATION_UNDER_SOURCE: &str = "<h2>Error</h2><br />The destination node cannot be one of or reside under any of the source nodes.";

/// Moves several nodes under a new parent.
pub struct BulkMoveNodes {
    backend: Arc<dyn ContentService>,
}

impl BulkMoveNodes {
    pub fn new(backend: Arc<dyn ContentService>) -> Self {
        Self { backend }
    }
}

impl Processor for BulkMoveNodes {
    fn label(&self) -> &str {
        LABEL
    }

    fn inputs(&self) -> Vec<InputSpec> {
        vec![
            InputSpec::node_set("Select Nodes to Move"),
            InputSpec::node("Select Destination Node"),
        ]
    }

    fn execute(&self, inputs: &ConvertedInputs) -> Result<String, ProcessorError> {
        let sources = inputs.node_set(0)?;
        let destination = inputs.node(1)?;

        // Nothing moves unless the whole batch is safe and every source exists.
        let destination_node = self.backend.get_by_id(destination)?;
        if sources.iter().any(|&id| destination_node.is_at_or_under(id)) {
            log::warn!(
                "Refusing to move {:?} under {}: destination path is {}",
                sources,
                destination,
                destination_node.path_string()
            );
            return Ok(DESTINATION_UNDER_SOURCE.to_string());
        }
        let nodes = sources
            .iter()
            .map(|&source| self.backend.get_by_id(source))
            .collect::<Result<Vec<_>, _>>()?;

        for (moved, node) in nodes.iter().enumerate() {
            if let Err(e) = self.backend.move_node(node, destination) {
                // Earlier moves already happened; the cache must still see them.
                if moved > 0 {
                    if let Err(refresh) = self.backend.refresh_cache() {
                        log::warn!("Cache refresh after a failed move also failed: {}", refresh);
                    }
                }
                return Err(e.into());
            }
        }
        self.backend.refresh_cache()?;

        Ok(format!("<h2>Success</h2>Moved {} nodes.", sources.len()))
    }
}
