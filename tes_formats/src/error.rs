use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::tag::RecordTag;

/// Failures surfaced while walking a plugin file.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to open {path}: {source}")]
    FileOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("not a plugin file: first record is {found}, expected TES4")]
    NotAPlugin { found: RecordTag },
    #[error("{what} at offset {offset} runs past end of file ({file_len} bytes)")]
    Truncated {
        what: &'static str,
        offset: u64,
        file_len: u64,
    },
    #[error("group at offset {offset} declares size {size}, smaller than its header")]
    MalformedGroup { offset: u64, size: u32 },
    #[error("subrecord {tag} at offset {offset} overruns its record by {excess} bytes")]
    SubrecordOverrun {
        tag: RecordTag,
        offset: u64,
        excess: u64,
    },
    #[error("short read: wanted {wanted} bytes at offset {offset}")]
    ShortRead { offset: u64, wanted: usize },
    #[error("cursor is not positioned on a subrecord")]
    NoSubrecord,
    #[error(transparent)]
    Io(#[from] io::Error),
}
