use serde::{Deserialize, Serialize};

use crate::core::error::ProcessorError;
use crate::core::kind::InputKind;

/// The identifier the content backend uses for a node.
pub type NodeId = i32;

/// One slot of a processor's input schema.
///
/// Serializes as `{"Kind": "...", "Label": "..."}`, the shape the form renderer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputSpec {
    pub kind: InputKind,
    pub label: String,
}

impl InputSpec {
    pub fn new(kind: InputKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    pub fn node(label: impl Into<String>) -> Self {
        Self::new(InputKind::Node, label)
    }

    pub fn node_set(label: impl Into<String>) -> Self {
        Self::new(InputKind::NodeSet, label)
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::new(InputKind::Text, label)
    }
}

/// A raw value after conversion against its [`InputSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvertedInput {
    Node(NodeId),
    NodeSet(Vec<NodeId>),
    Text(String),
}

impl ConvertedInput {
    pub fn kind(&self) -> InputKind {
        match self {
            ConvertedInput::Node(_) => InputKind::Node,
            ConvertedInput::NodeSet(_) => InputKind::NodeSet,
            ConvertedInput::Text(_) => InputKind::Text,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ConvertedInput::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_node_set(&self) -> Option<&[NodeId]> {
        match self {
            ConvertedInput::NodeSet(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConvertedInput::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The converted inputs handed to [`Processor::execute`](crate::Processor::execute),
/// positionally aligned with the processor's schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertedInputs(Vec<ConvertedInput>);

impl ConvertedInputs {
    pub fn new(values: Vec<ConvertedInput>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&ConvertedInput> {
        self.0.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConvertedInput> {
        self.0.iter()
    }

    /// Reads the `Node` input at `position`.
    pub fn node(&self, position: usize) -> Result<NodeId, ProcessorError> {
        self.get(position)
            .and_then(ConvertedInput::as_node)
            .ok_or(ProcessorError::InputMismatch {
                position,
                expected: InputKind::Node,
            })
    }

    /// Reads the `Nodes` input at `position`.
    pub fn node_set(&self, position: usize) -> Result<&[NodeId], ProcessorError> {
        self.get(position)
            .and_then(ConvertedInput::as_node_set)
            .ok_or(ProcessorError::InputMismatch {
                position,
                expected: InputKind::NodeSet,
            })
    }

    /// Reads the `Text` input at `position`.
    pub fn text(&self, position: usize) -> Result<&str, ProcessorError> {
        self.get(position)
            .and_then(ConvertedInput::as_text)
            .ok_or(ProcessorError::InputMismatch {
                position,
                expected: InputKind::Text,
            })
    }

    pub fn into_inner(self) -> Vec<ConvertedInput> {
        self.0
    }
}

impl From<Vec<ConvertedInput>> for ConvertedInputs {
    fn from(values: Vec<ConvertedInput>) -> Self {
        Self(values)
    }
}

impl<'a> IntoIterator for &'a ConvertedInputs {
    type Item = &'a ConvertedInput;
    type IntoIter = std::slice::Iter<'a, ConvertedInput>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
