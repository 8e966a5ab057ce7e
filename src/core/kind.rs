use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kinds of input a processor may request.
///
/// The wire names are the ones the form renderer keys on:
/// - `Node`: a tree picker where exactly one node must be chosen.
/// - `Nodes`: a tree picker where at least one node must be chosen.
/// - `Text`: a plain text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Node,
    #[serde(rename = "Nodes")]
    NodeSet,
    Text,
}

impl InputKind {
    /// Every kind, in declaration order.
    pub const ALL: [InputKind; 3] = [InputKind::Node, InputKind::NodeSet, InputKind::Text];

    /// The name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Node => "Node",
            InputKind::NodeSet => "Nodes",
            InputKind::Text => "Text",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InputKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown input kind '{}'", s))
    }
}
