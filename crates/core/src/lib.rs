//! Format detection and call-tree reconstruction for profiler export files.
//!
//! A conversion runs as one synchronous pipeline per file:
//! [`FormatRegistry::detect`] picks the first format whose sniffer accepts
//! the file, the format's record parser yields flat depth-annotated
//! [`model::CallRecord`]s, [`builder::build_forest`] reconstructs one
//! [`model::CallTree`] per thread, and [`serialize::to_tree_messages`]
//! produces the wire trees consumed by rendering. The engine holds no
//! state across conversions; files processed in parallel never interact.

pub mod builder;
pub mod formats;
pub mod model;
pub mod serialize;

pub use builder::{BuildError, build_forest, roll_up_self_times};
pub use formats::{ConvertError, FormatHandler, FormatId, FormatRegistry, ParseError};
pub use model::{CallFrame, CallRecord, CallTree, Descriptor, MethodSignature};
pub use serialize::to_tree_messages;
