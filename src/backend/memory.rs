use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::backend::{ContentNode, ContentService, ROOT_ID};
use crate::core::error::BackendError;
use crate::core::input::NodeId;

/// One call made against an [`InMemoryContentService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    GetById(NodeId),
    Children(NodeId),
    Move { node: NodeId, destination: NodeId },
    Create { name: String, parent_id: NodeId },
    Save(NodeId),
    RefreshCache,
}

#[derive(Debug)]
struct Store {
    nodes: BTreeMap<NodeId, ContentNode>,
    next_id: NodeId,
    journal: Vec<BackendCall>,
}

/// A content tree held in memory, recording every call made through [`ContentService`].
#[derive(Debug)]
pub struct InMemoryContentService {
    store: Mutex<Store>,
}

impl Default for InMemoryContentService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryContentService {
    /// Creates an empty tree holding only the root.
    pub fn new() -> Self {
        let root = ContentNode {
            id: ROOT_ID,
            name: "Content".to_string(),
            parent_id: ROOT_ID,
            doc_type_alias: String::new(),
            path: vec![ROOT_ID],
        };
        Self {
            store: Mutex::new(Store {
                nodes: BTreeMap::from([(ROOT_ID, root)]),
                next_id: 1,
                journal: Vec::new(),
            }),
        }
    }

    /// Seeds a saved node without journaling the call.
    pub fn insert(
        &self,
        name: impl Into<String>,
        parent_id: NodeId,
        doc_type_alias: impl Into<String>,
    ) -> Result<NodeId, BackendError> {
        let mut store = self.store();
        let parent_path = store
            .nodes
            .get(&parent_id)
            .map(|p| p.path.clone())
            .ok_or(BackendError::NodeNotFound(parent_id))?;
        let id = store.allocate_id();
        let mut path = parent_path;
        path.push(id);
        store.nodes.insert(
            id,
            ContentNode {
                id,
                name: name.into(),
                parent_id,
                doc_type_alias: doc_type_alias.into(),
                path,
            },
        );
        Ok(id)
    }

    /// Every call recorded so far, oldest first.
    pub fn journal(&self) -> Vec<BackendCall> {
        self.store().journal.clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.store().journal.iter().filter(|c| predicate(c)).count()
    }

    /// Names of the saved children of `parent_id`, without journaling the call.
    pub fn child_names(&self, parent_id: NodeId) -> Vec<String> {
        self.store()
            .children_of(parent_id)
            .map(|n| n.name.clone())
            .collect()
    }

    /// Looks a node up without journaling the call.
    pub fn peek(&self, id: NodeId) -> Option<ContentNode> {
        self.store().nodes.get(&id).cloned()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store {
    fn allocate_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn children_of(&self, parent_id: NodeId) -> impl Iterator<Item = &ContentNode> {
        self.nodes
            .values()
            .filter(move |n| n.parent_id == parent_id && n.id != ROOT_ID)
    }

    fn get(&self, id: NodeId) -> Result<&ContentNode, BackendError> {
        self.nodes.get(&id).ok_or(BackendError::NodeNotFound(id))
    }
}

impl ContentService for InMemoryContentService {
    fn get_by_id(&self, id: NodeId) -> Result<ContentNode, BackendError> {
        let mut store = self.store();
        store.journal.push(BackendCall::GetById(id));
        store.get(id).cloned()
    }

    fn children(&self, parent_id: NodeId) -> Result<Vec<ContentNode>, BackendError> {
        let mut store = self.store();
        store.journal.push(BackendCall::Children(parent_id));
        store.get(parent_id)?;
        let children = store.children_of(parent_id).cloned().collect();
        Ok(children)
    }

    fn move_node(&self, node: &ContentNode, destination: NodeId) -> Result<(), BackendError> {
        let mut store = self.store();
        store.journal.push(BackendCall::Move {
            node: node.id,
            destination,
        });

        if node.id == ROOT_ID {
            return Err(BackendError::Operation("the root cannot be moved".to_string()));
        }
        store.get(node.id)?;
        let destination_path = store.get(destination)?.path.clone();
        if destination_path.contains(&node.id) {
            return Err(BackendError::Operation(format!(
                "node {} cannot be moved under itself",
                node.id
            )));
        }

        // Rebase the moved node and every descendant onto the destination's path.
        for moved in store.nodes.values_mut() {
            if let Some(at) = moved.path.iter().position(|id| *id == node.id) {
                let mut path = destination_path.clone();
                path.extend_from_slice(&moved.path[at..]);
                moved.path = path;
                if moved.id == node.id {
                    moved.parent_id = destination;
                }
            }
        }
        Ok(())
    }

    fn create_content(
        &self,
        name: &str,
        parent_id: NodeId,
        doc_type_alias: &str,
    ) -> Result<ContentNode, BackendError> {
        let mut store = self.store();
        store.journal.push(BackendCall::Create {
            name: name.to_string(),
            parent_id,
        });
        let mut path = store.get(parent_id)?.path.clone();
        let id = store.allocate_id();
        path.push(id);
        Ok(ContentNode {
            id,
            name: name.to_string(),
            parent_id,
            doc_type_alias: doc_type_alias.to_string(),
            path,
        })
    }

    fn save(&self, node: &ContentNode) -> Result<(), BackendError> {
        let mut store = self.store();
        store.journal.push(BackendCall::Save(node.id));
        store.get(node.parent_id)?;
        store.nodes.insert(node.id, node.clone());
        Ok(())
    }

    fn refresh_cache(&self) -> Result<(), BackendError> {
        self.store().journal.push(BackendCall::RefreshCache);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_builds_paths() {
        let backend = InMemoryContentService::new();
        let a = backend.insert("A", ROOT_ID, "folder").unwrap();
        let b = backend.insert("B", a, "page").unwrap();

        assert_eq!(backend.peek(b).unwrap().path, vec![ROOT_ID, a, b]);
        assert_eq!(backend.child_names(a), vec!["B"]);
        assert!(backend.journal().is_empty());
        assert_eq!(
            backend.insert("C", 999, "page"),
            Err(BackendError::NodeNotFound(999))
        );
    }

    #[test]
    fn test_move_rebases_descendants() {
        let backend = InMemoryContentService::new();
        let a = backend.insert("A", ROOT_ID, "folder").unwrap();
        let b = backend.insert("B", a, "page").unwrap();
        let c = backend.insert("C", b, "page").unwrap();
        let target = backend.insert("Target", ROOT_ID, "folder").unwrap();

        let node = backend.get_by_id(b).unwrap();
        backend.move_node(&node, target).unwrap();

        assert_eq!(backend.peek(b).unwrap().parent_id, target);
        assert_eq!(backend.peek(c).unwrap().path, vec![ROOT_ID, target, b, c]);
        assert!(backend.child_names(a).is_empty());
        assert_eq!(
            backend.journal(),
            vec![
                BackendCall::GetById(b),
                BackendCall::Move {
                    node: b,
                    destination: target
                }
            ]
        );
    }

    #[test]
    fn test_move_under_own_descendant_is_refused() {
        let backend = InMemoryContentService::new();
        let a = backend.insert("A", ROOT_ID, "folder").unwrap();
        let b = backend.insert("B", a, "page").unwrap();

        let node = backend.peek(a).unwrap();
        assert!(matches!(
            backend.move_node(&node, b),
            Err(BackendError::Operation(_))
        ));
        assert_eq!(backend.peek(a).unwrap().path, vec![ROOT_ID, a]);
    }

    #[test]
    fn test_created_content_is_visible_after_save() {
        let backend = InMemoryContentService::new();
        let parent = backend.insert("Parent", ROOT_ID, "folder").unwrap();

        let node = backend.create_content("New", parent, "page").unwrap();
        assert!(backend.child_names(parent).is_empty());

        backend.save(&node).unwrap();
        assert_eq!(backend.child_names(parent), vec!["New"]);
        assert_eq!(
            backend.count_calls(|c| matches!(c, BackendCall::Save(_))),
            1
        );
    }
}
