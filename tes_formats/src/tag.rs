use std::fmt;

/// Four-byte record/subrecord type code, stored in file byte order.
///
/// The engine compares these as native-endian `u32` multi-character literals
/// (`'LLEC'` for `CELL`); keeping the raw bytes sidesteps the reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordTag(pub [u8; 4]);

impl RecordTag {
    pub const TES4: RecordTag = RecordTag(*b"TES4");
    pub const GRUP: RecordTag = RecordTag(*b"GRUP");
    pub const CELL: RecordTag = RecordTag(*b"CELL");
    pub const EDID: RecordTag = RecordTag(*b"EDID");
    pub const DATA: RecordTag = RecordTag(*b"DATA");
    pub const MAST: RecordTag = RecordTag(*b"MAST");
    pub const HEDR: RecordTag = RecordTag(*b"HEDR");
    pub const XXXX: RecordTag = RecordTag(*b"XXXX");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for RecordTag {
    fn from(bytes: [u8; 4]) -> Self {
        RecordTag(bytes)
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &byte in &self.0 {
            let ch = if byte.is_ascii_graphic() || byte == b' ' {
                byte as char
            } else {
                '?'
            };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}
