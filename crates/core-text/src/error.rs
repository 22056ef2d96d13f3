//! Error type for box store operations.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxError {
    #[error("offset {offset} beyond end of content (len {len})")]
    OutOfRange { offset: usize, len: usize },
    #[error("find target {target} precedes scan start {start}")]
    FindBeforeStart { start: usize, target: usize },
    #[error("box index {index} out of range ({count} boxes)")]
    BoxIndex { index: usize, count: usize },
    #[error("cannot split box {index} of length {len} at {at}")]
    SplitPoint { index: usize, len: usize, at: usize },
    #[error("byte count {count} exceeds length {len} of box {index}")]
    ByteCount {
        index: usize,
        len: usize,
        count: usize,
    },
    #[error("short read: wanted {wanted} bytes, got {read}")]
    ShortRead { read: usize, wanted: usize },
    #[error("box 0 is the reserved insertion box")]
    ReservedBox,
}
