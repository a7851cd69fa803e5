//! Conversion from the in-memory call-tree forest to the wire schema.

use treeline_protocol::{TreeMessage, TreeNode};

use crate::model::{CallFrame, CallTree};

/// Serialize a forest into one wire message per tree. Total: a tree
/// produced by the builder always converts.
pub fn to_tree_messages(forest: &[CallTree]) -> Vec<TreeMessage> {
    forest.iter().map(to_tree_message).collect()
}

fn to_tree_message(tree: &CallTree) -> TreeMessage {
    let mut nodes = Vec::new();
    let mut roots = Vec::new();
    for frame in &tree.frames {
        roots.push(emit_subtree(frame, &mut nodes));
    }
    TreeMessage {
        thread_name: tree.thread_name.clone(),
        roots,
        nodes,
    }
}

/// Append a frame and its descendants to `nodes` in pre-order, wiring up
/// child indices as each node is emitted. Explicit work stack; frame depth
/// comes from uploaded files, so no native recursion.
fn emit_subtree(root: &CallFrame, nodes: &mut Vec<TreeNode>) -> u32 {
    let root_index = nodes.len() as u32;
    let mut stack: Vec<(&CallFrame, Option<u32>)> = vec![(root, None)];
    while let Some((frame, parent)) = stack.pop() {
        let index = nodes.len() as u32;
        nodes.push(TreeNode {
            class_name: frame.signature.class_name.clone(),
            method_name: frame.signature.method_name.clone(),
            return_type: frame.signature.return_type.clone(),
            parameters: frame.signature.parameters.clone(),
            self_time_ms: frame.self_time_ms,
            total_time_ms: frame.total_time_ms,
            call_count: frame.call_count,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            nodes[parent as usize].children.push(index);
        }
        for child in frame.children.iter().rev() {
            stack.push((child, Some(index)));
        }
    }
    root_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_forest, roll_up_self_times};
    use crate::model::CallRecord;

    fn forest() -> Vec<CallTree> {
        let records = vec![
            CallRecord::thread("main", 0),
            CallRecord::call("void A.a()", 10, 1),
            CallRecord::call("int A.b(int, long)", 4, 2),
            CallRecord::call("void A.c()", 3, 2),
            CallRecord::thread("worker", 0),
            CallRecord::call("void B.d()", 7, 1),
        ];
        let mut forest = build_forest(records.into_iter().map(Ok)).expect("build");
        for tree in &mut forest {
            roll_up_self_times(tree);
        }
        forest
    }

    #[test]
    fn one_message_per_tree() {
        let messages = to_tree_messages(&forest());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].thread_name.as_deref(), Some("main"));
        assert_eq!(messages[1].thread_name.as_deref(), Some("worker"));
    }

    #[test]
    fn node_count_matches_frame_count() {
        let forest = forest();
        let messages = to_tree_messages(&forest);
        for (tree, message) in forest.iter().zip(&messages) {
            assert_eq!(message.node_count(), tree.frame_count());
        }
    }

    #[test]
    fn preorder_indices_and_children() {
        let messages = to_tree_messages(&forest());
        let main = &messages[0];
        assert_eq!(main.roots, vec![0]);
        let a = main.node(0).expect("root node");
        assert_eq!(a.method_name, "a");
        assert_eq!(a.children, vec![1, 2]);
        assert_eq!(a.total_time_ms, 10);
        assert_eq!(a.self_time_ms, 3);
        let b = main.node(1).expect("child node");
        assert_eq!(b.method_name, "b");
        assert_eq!(b.return_type, "int");
        assert_eq!(b.parameters, vec!["int", "long"]);
        assert_eq!(b.call_count, 1);
    }

    #[test]
    fn all_child_indices_resolve() {
        for message in to_tree_messages(&forest()) {
            for node in &message.nodes {
                for &child in &node.children {
                    assert!(message.node(child).is_some());
                }
            }
            for &root in &message.roots {
                assert!(message.node(root).is_some());
            }
        }
    }

    #[test]
    fn empty_forest_serializes_to_nothing() {
        assert!(to_tree_messages(&[]).is_empty());
    }
}
