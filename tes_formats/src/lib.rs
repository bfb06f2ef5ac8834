pub mod cell;
pub mod cursor;
pub mod error;
pub mod plugin;
pub mod tag;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod zstring;

pub use cell::{CELL_FLAG_INTERIOR, CellRecord, scan_cells};
pub use cursor::{RecordCursor, RecordHeader};
pub use error::PluginError;
pub use plugin::{CompileIndex, FormIdMapper, PluginHeader};
pub use tag::RecordTag;
pub use zstring::{MAX_ZSTRING_LEN, decode_zstring};
