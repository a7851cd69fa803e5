pub mod call_tree;
pub mod record;
pub mod signature;

pub use call_tree::{CallFrame, CallTree};
pub use record::{CallRecord, Descriptor};
pub use signature::MethodSignature;
