/// What the descriptor field of a call record contained.
///
/// Classification follows the export convention: a depth-0 record whose
/// descriptor contains `:` marks the start of a thread's record block;
/// everything else is a call-site occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Descriptor {
    /// Thread/category marker, trailing colon removed (`"main:"` → `main`).
    Thread(String),
    /// Raw callable text, parsed into a
    /// [`MethodSignature`](crate::model::MethodSignature) by the builder.
    Call(String),
}

/// One flattened call record: what was called, how long it took, how deep
/// in the call stack it sat.
///
/// Records exist only transiently — produced lazily in file order and
/// consumed in a single pass by the builder. Order is load-bearing: it
/// encodes the call sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub descriptor: Descriptor,
    /// Elapsed time in milliseconds, inclusive of callees.
    pub elapsed_ms: u64,
    /// Zero-based nesting distance from the thread root.
    pub depth: u32,
}

impl CallRecord {
    pub fn thread(name: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            descriptor: Descriptor::Thread(name.into()),
            elapsed_ms,
            depth: 0,
        }
    }

    pub fn call(descriptor: impl Into<String>, elapsed_ms: u64, depth: u32) -> Self {
        Self {
            descriptor: Descriptor::Call(descriptor.into()),
            elapsed_ms,
            depth,
        }
    }
}
