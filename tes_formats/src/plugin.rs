use std::fmt;
use std::path::Path;

use crate::cursor::RecordCursor;
use crate::error::PluginError;

/// `TES4` flag: file is a master.
pub const HEADER_FLAG_MASTER: u32 = 0x0000_0001;
/// `TES4` flag: file is light and shares the `0xFE` load slot.
pub const HEADER_FLAG_LIGHT: u32 = 0x0000_0200;

/// Primary load slot shared by every light file.
pub const LIGHT_PRIMARY_INDEX: u8 = 0xFE;
/// Number of primary slots available to regular files.
pub const MAX_PRIMARY_FILES: usize = LIGHT_PRIMARY_INDEX as usize;
/// Number of light slots under `0xFE`.
pub const MAX_LIGHT_FILES: usize = 0x1000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginHeader {
    pub flags: u32,
    pub masters: Vec<String>,
}

impl PluginHeader {
    /// Open `path` just long enough to read its header record.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, PluginError> {
        let cursor = RecordCursor::open(path)?;
        let header = cursor.plugin_header().clone();
        cursor.close();
        Ok(header)
    }

    pub fn is_master(&self) -> bool {
        self.flags & HEADER_FLAG_MASTER != 0
    }

    pub fn is_light(&self) -> bool {
        self.flags & HEADER_FLAG_LIGHT != 0
    }
}

/// Load slot of a container file.
///
/// Regular files own a primary byte; light files share `0xFE` and own a
/// 12-bit light index beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompileIndex {
    primary: u8,
    light: Option<u16>,
}

impl CompileIndex {
    /// Slot for the `index`-th regular file, if one is left.
    pub fn primary(index: usize) -> Option<Self> {
        (index < MAX_PRIMARY_FILES).then(|| Self {
            primary: index as u8,
            light: None,
        })
    }

    /// Slot for the `index`-th light file, if one is left.
    pub fn light(index: usize) -> Option<Self> {
        (index < MAX_LIGHT_FILES).then(|| Self {
            primary: LIGHT_PRIMARY_INDEX,
            light: Some(index as u16),
        })
    }

    pub fn is_light(self) -> bool {
        self.light.is_some()
    }

    /// Form-ID prefix: primary byte in bits 24..32, light index in bits 12..24.
    pub fn prefix(self) -> u32 {
        (u32::from(self.primary) << 24) | (u32::from(self.light.unwrap_or(0)) << 12)
    }

    /// Replace the file-local part of `raw` with this slot.
    pub fn qualify_local(self, raw: u32) -> u32 {
        if self.is_light() {
            self.prefix() | (raw & 0x0000_0FFF)
        } else {
            self.prefix() | (raw & 0x00FF_FFFF)
        }
    }
}

impl fmt::Display for CompileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.light {
            Some(light) => write!(f, "{:02X}:{light:03X}", self.primary),
            None => write!(f, "{:02X}", self.primary),
        }
    }
}

/// Maps raw on-disk form IDs of one file into load-order form IDs.
#[derive(Debug, Clone)]
pub struct FormIdMapper {
    own: CompileIndex,
    masters: Vec<Option<CompileIndex>>,
}

impl FormIdMapper {
    /// `masters` follows the file's `MAST` order; `None` marks a master that
    /// is not part of the load order.
    pub fn new(own: CompileIndex, masters: Vec<Option<CompileIndex>>) -> Self {
        Self { own, masters }
    }

    /// Mapper for a file with no masters.
    pub fn standalone(own: CompileIndex) -> Self {
        Self::new(own, Vec::new())
    }

    pub fn own(&self) -> CompileIndex {
        self.own
    }

    pub fn qualify(&self, raw: u32) -> u32 {
        let slot = (raw >> 24) as usize;
        match self.masters.get(slot) {
            Some(Some(master)) => master.qualify_local(raw),
            Some(None) => raw,
            None => self.own.qualify_local(raw),
        }
    }
}
