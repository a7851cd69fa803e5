use serde::{Deserialize, Serialize};

use crate::model::MethodSignature;

/// A reconstructed call-tree node.
///
/// Frames form a strict ownership tree: every frame is owned exclusively
/// by its parent (or by the tree for top-level frames), with no back-edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallFrame {
    pub signature: MethodSignature,
    /// Nesting level as recorded in the export (0 = root level).
    pub depth: u32,
    /// Time including all descendants, in milliseconds.
    pub total_time_ms: u64,
    /// Time excluding descendants, in milliseconds. Filled in by the
    /// rollup pass; equals `total_time_ms` straight out of the builder.
    pub self_time_ms: u64,
    /// How many call-site occurrences this frame aggregates.
    pub call_count: u64,
    /// Direct children, in call order.
    pub children: Vec<CallFrame>,
}

/// One thread's reconstructed call tree. Write-once: the builder is the
/// only producer, and nothing mutates a tree after construction besides
/// the rollup pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTree {
    /// Thread name from the depth-0 marker record; `None` for the implicit
    /// tree that adopts records seen before any marker.
    pub thread_name: Option<String>,
    /// Top-level frames, in call order.
    pub frames: Vec<CallFrame>,
}

impl CallTree {
    /// Pre-order walk over all method frames. The root container itself is
    /// not a frame and is not visited.
    ///
    /// Iterative on purpose: tree shape is derived from uploaded files, so
    /// traversal must not recurse on the native stack.
    pub fn walk(&self) -> Vec<&CallFrame> {
        let mut out = Vec::new();
        let mut stack: Vec<&CallFrame> = self.frames.iter().rev().collect();
        while let Some(frame) = stack.pop() {
            out.push(frame);
            stack.extend(frame.children.iter().rev());
        }
        out
    }

    /// Number of method frames in this tree.
    pub fn frame_count(&self) -> usize {
        self.walk().len()
    }

    /// The depth of every record this tree was built from, in original file
    /// order: the marker record's depth 0 when the root is thread-named,
    /// then each frame's recorded depth pre-order. Implicit roots are
    /// synthetic and contribute nothing.
    pub fn depth_sequence(&self) -> Vec<u32> {
        let mut depths = Vec::new();
        if self.thread_name.is_some() {
            depths.push(0);
        }
        depths.extend(self.walk().iter().map(|f| f.depth));
        depths
    }
}
