//! Reconstructs per-thread call trees from a flat record sequence, using
//! the recorded depth as the nesting signal.

use thiserror::Error;

use crate::formats::ParseError;
use crate::model::{CallFrame, CallRecord, CallTree, Descriptor, MethodSignature};

#[derive(Debug, Error)]
pub enum BuildError {
    /// A record failed parsing mid-stream. Mapped back to the parse stage
    /// by the pipeline.
    #[error(transparent)]
    Record(#[from] ParseError),
    /// A depth sequence implied an impossible ancestor chain: a depth-0
    /// call record arrived while a thread-named tree was open, so no valid
    /// parent exists on the stack.
    #[error("record {index}: depth 0 call record with an open thread root")]
    StructuralInconsistency { index: usize },
}

/// Build a forest of call trees, one per thread marker encountered.
///
/// The open-ancestor chain is an explicit stack, never native recursion —
/// depth sequences come from arbitrary uploaded files and must not be able
/// to exhaust the call stack.
///
/// A thread marker finalizes the open tree and starts a new one. A call
/// record closes every open frame at its own depth or deeper, then attaches
/// to the nearest remaining ancestor; intermediate levels skipped by a
/// downward depth jump are treated as implicitly closed, and missing
/// ancestors are never synthesized. Call records seen before any marker
/// collect under an implicit unnamed tree. Empty input yields an empty
/// forest.
pub fn build_forest<I>(records: I) -> Result<Vec<CallTree>, BuildError>
where
    I: IntoIterator<Item = Result<CallRecord, ParseError>>,
{
    let mut forest: Vec<CallTree> = Vec::new();
    let mut current: Option<CallTree> = None;
    let mut open: Vec<CallFrame> = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let record = record?;
        match record.descriptor {
            Descriptor::Thread(name) => {
                finalize(current.take(), &mut open, &mut forest);
                current = Some(CallTree {
                    thread_name: Some(name),
                    frames: Vec::new(),
                });
            }
            Descriptor::Call(text) => {
                let tree = current.get_or_insert_with(|| CallTree {
                    thread_name: None,
                    frames: Vec::new(),
                });
                if record.depth == 0 && tree.thread_name.is_some() {
                    return Err(BuildError::StructuralInconsistency { index });
                }
                while open.last().is_some_and(|top| top.depth >= record.depth) {
                    close_top(&mut open, tree);
                }
                open.push(CallFrame {
                    signature: MethodSignature::parse(&text),
                    depth: record.depth,
                    total_time_ms: record.elapsed_ms,
                    self_time_ms: record.elapsed_ms,
                    call_count: 1,
                    children: Vec::new(),
                });
            }
        }
    }

    finalize(current.take(), &mut open, &mut forest);
    Ok(forest)
}

/// Pop the deepest open frame and attach it to its parent, or to the tree
/// when it was top-level.
fn close_top(open: &mut Vec<CallFrame>, tree: &mut CallTree) {
    let Some(done) = open.pop() else { return };
    match open.last_mut() {
        Some(parent) => parent.children.push(done),
        None => tree.frames.push(done),
    }
}

fn finalize(current: Option<CallTree>, open: &mut Vec<CallFrame>, forest: &mut Vec<CallTree>) {
    let Some(mut tree) = current else { return };
    while !open.is_empty() {
        close_top(open, &mut tree);
    }
    forest.push(tree);
}

/// Fill in `self_time_ms` for every frame: total time minus the totals of
/// direct children, clamped at zero (a parent's recorded total may fall
/// short of its children's sum on noisy exports).
///
/// Kept separate from the builder so construction and aggregation test
/// independently.
pub fn roll_up_self_times(tree: &mut CallTree) {
    let mut stack: Vec<&mut CallFrame> = tree.frames.iter_mut().collect();
    while let Some(frame) = stack.pop() {
        let child_total: u64 = frame.children.iter().map(|c| c.total_time_ms).sum();
        frame.self_time_ms = frame.total_time_ms.saturating_sub(child_total);
        stack.extend(frame.children.iter_mut());
    }
}
