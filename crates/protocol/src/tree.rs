use serde::{Deserialize, Serialize};

/// The per-thread call tree shipped to the rendering side.
///
/// ```text
///   YourKit CSV ─┐
///   folded stacks├─▶ CallTree forest ──▶ TreeMessage[] ──▶ flame-graph renderer
///   …            ┘    (engine-internal)    (this crate)
/// ```
///
/// Nodes are stored flat in pre-order and reference their children by index
/// instead of owning them, so a renderer can address any node directly and
/// the message survives serialization boundaries without recursion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeMessage {
    /// Thread name from the export's marker record; `None` when the file
    /// carried call records without any thread marker.
    pub thread_name: Option<String>,
    /// Indices of the top-level nodes, in call order.
    pub roots: Vec<u32>,
    /// All nodes of this tree, pre-order.
    pub nodes: Vec<TreeNode>,
}

impl TreeMessage {
    pub fn node(&self, index: u32) -> Option<&TreeNode> {
        self.nodes.get(index as usize)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// One call-tree node: a method frame with its timing aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub class_name: String,
    pub method_name: String,
    pub return_type: String,
    /// Parameter type names, in declaration order.
    pub parameters: Vec<String>,
    /// Time attributed to this frame excluding descendants, in milliseconds.
    pub self_time_ms: u64,
    /// Time attributed to this frame including all descendants, in milliseconds.
    pub total_time_ms: u64,
    /// How many call-site occurrences this node aggregates.
    pub call_count: u64,
    /// Indices of direct children, in call order.
    pub children: Vec<u32>,
}
