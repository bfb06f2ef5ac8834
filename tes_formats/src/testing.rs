//! Fixture writer for plugin bytes.
//!
//! Only compiled for tests and under the `testing` feature; the crate itself
//! never writes plugins.

use std::fs;
use std::io;
use std::path::Path;

/// Encode one subrecord, emitting an `XXXX` prefix for payloads over 64 KiB.
pub fn subrecord(tag: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 16);
    let short_len = match u16::try_from(data.len()) {
        Ok(len) => len,
        Err(_) => {
            out.extend_from_slice(b"XXXX");
            out.extend_from_slice(&4u16.to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            0
        }
    };
    out.extend_from_slice(tag);
    out.extend_from_slice(&short_len.to_le_bytes());
    out.extend_from_slice(data);
    out
}

/// NUL-terminated string payload.
pub fn zstring(value: &str) -> Vec<u8> {
    let mut out = value.as_bytes().to_vec();
    out.push(0);
    out
}

/// Encode a record with a 24-byte header.
pub fn record(tag: &[u8; 4], flags: u32, form_id: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 24);
    out.extend_from_slice(tag);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out.extend_from_slice(&form_id.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&44u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Encode a group around already-encoded children.
pub fn group(label: [u8; 4], group_type: u32, children: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(children.len() + 24);
    out.extend_from_slice(b"GRUP");
    out.extend_from_slice(&((children.len() + 24) as u32).to_le_bytes());
    out.extend_from_slice(&label);
    out.extend_from_slice(&group_type.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(children);
    out
}

/// `CELL` record with optional `EDID` and `DATA` fields, in that order.
pub fn cell_record(form_id: u32, editor_id: Option<&str>, flags: Option<u16>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(editor_id) = editor_id {
        body.extend(subrecord(b"EDID", &zstring(editor_id)));
    }
    if let Some(flags) = flags {
        body.extend(subrecord(b"DATA", &flags.to_le_bytes()));
    }
    record(b"CELL", 0, form_id, &body)
}

/// Assembles a plugin: `TES4` header, loose records, then a `CELL` top group.
#[derive(Debug, Default, Clone)]
pub struct PluginBuilder {
    flags: u32,
    masters: Vec<String>,
    records: Vec<Vec<u8>>,
    cells: Vec<Vec<u8>>,
}

impl PluginBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn master(mut self, name: &str) -> Self {
        self.masters.push(name.to_string());
        self
    }

    pub fn record(mut self, bytes: Vec<u8>) -> Self {
        self.records.push(bytes);
        self
    }

    pub fn cell(self, form_id: u32, editor_id: Option<&str>, flags: Option<u16>) -> Self {
        self.raw_cell(cell_record(form_id, editor_id, flags))
    }

    pub fn raw_cell(mut self, bytes: Vec<u8>) -> Self {
        self.cells.push(bytes);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut header = Vec::new();
        let mut hedr = Vec::new();
        hedr.extend_from_slice(&1.7f32.to_le_bytes());
        hedr.extend_from_slice(&((self.records.len() + self.cells.len()) as u32).to_le_bytes());
        hedr.extend_from_slice(&0x800u32.to_le_bytes());
        header.extend(subrecord(b"HEDR", &hedr));
        for master in &self.masters {
            header.extend(subrecord(b"MAST", &zstring(master)));
            header.extend(subrecord(b"DATA", &0u64.to_le_bytes()));
        }

        let mut out = record(b"TES4", self.flags, 0, &header);
        for bytes in &self.records {
            out.extend_from_slice(bytes);
        }
        if !self.cells.is_empty() {
            let cells = self.cells.concat();
            let subblock = group(0u32.to_le_bytes(), 3, &cells);
            let block = group(0u32.to_le_bytes(), 2, &subblock);
            out.extend(group(*b"CELL", 0, &block));
        }
        out
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        fs::write(path, self.build())
    }
}
