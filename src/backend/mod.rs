//! The content backend the sample processors act on.
//!
//! Only the interface lives here; hosts plug in their own store. [`memory`]
//! provides a self-contained tree for tests and demos.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::core::error::BackendError;
use crate::core::input::NodeId;

pub use memory::{BackendCall, InMemoryContentService};

/// The id of the virtual root every content path starts from.
pub const ROOT_ID: NodeId = -1;

/// A content node as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    pub name: String,
    pub parent_id: NodeId,
    pub doc_type_alias: String,
    /// Ancestry from the root down to this node, inclusive.
    pub path: Vec<NodeId>,
}

impl ContentNode {
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// True if `id` is this node or one of its ancestors.
    pub fn is_at_or_under(&self, id: NodeId) -> bool {
        self.path.contains(&id)
    }
}

/// Operations the sample processors need from the content store.
///
/// Calls are synchronous and authoritative; nothing here is retried.
pub trait ContentService: Send + Sync {
    fn get_by_id(&self, id: NodeId) -> Result<ContentNode, BackendError>;

    /// Direct children of `parent_id`, in the backend's order.
    fn children(&self, parent_id: NodeId) -> Result<Vec<ContentNode>, BackendError>;

    fn move_node(&self, node: &ContentNode, destination: NodeId) -> Result<(), BackendError>;

    /// Builds a new, unsaved node under `parent_id`.
    fn create_content(
        &self,
        name: &str,
        parent_id: NodeId,
        doc_type_alias: &str,
    ) -> Result<ContentNode, BackendError>;

    fn save(&self, node: &ContentNode) -> Result<(), BackendError>;

    /// Rebuilds whatever published-content cache sits in front of the store.
    fn refresh_cache(&self) -> Result<(), BackendError>;
}
