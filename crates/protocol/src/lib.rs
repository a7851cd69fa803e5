pub mod tree;

pub use tree::{TreeMessage, TreeNode};
