use std::io::{Read, Seek};
use std::path::Path;

use log::{debug, warn};

use crate::cursor::{RecordCursor, RecordHeader};
use crate::error::PluginError;
use crate::plugin::{CompileIndex, FormIdMapper};
use crate::tag::RecordTag;

/// `DATA` flag bit set on interior cells.
pub const CELL_FLAG_INTERIOR: u16 = 0x0001;

/// Exterior cell recovered from a plugin file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRecord {
    pub identifier: String,
    pub flags: u16,
    /// Load-order form ID.
    pub form_id: u32,
    pub compile_index: CompileIndex,
}

/// Collect the exterior cells defined by the plugin at `path`.
///
/// Failing to open the file or read its header is an error. Problems further
/// in are logged: a bad record is skipped, a broken record stream ends the
/// scan with whatever was found up to that point.
pub fn scan_cells<P: AsRef<Path>>(
    path: P,
    mapper: &FormIdMapper,
) -> Result<Vec<CellRecord>, PluginError> {
    let mut cursor = RecordCursor::open(path)?;
    let cells = scan_cursor(&mut cursor, mapper);
    cursor.close();
    Ok(cells)
}

pub fn scan_cursor<R: Read + Seek>(
    cursor: &mut RecordCursor<R>,
    mapper: &FormIdMapper,
) -> Vec<CellRecord> {
    let source = cursor
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<memory>".to_string());

    let mut cells = Vec::new();
    loop {
        let record = match cursor.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(err) => {
                warn!("{source}: stopping cell scan early: {err}");
                break;
            }
        };
        if record.tag != RecordTag::CELL {
            continue;
        }

        match read_cell(cursor, &record, mapper, &source) {
            Ok(Some(cell)) => cells.push(cell),
            Ok(None) => {}
            Err(err) => warn!("{source}: skipping CELL {:08X}: {err}", record.form_id),
        }
    }
    cells
}

fn read_cell<R: Read + Seek>(
    cursor: &mut RecordCursor<R>,
    record: &RecordHeader,
    mapper: &FormIdMapper,
    source: &str,
) -> Result<Option<CellRecord>, PluginError> {
    let mut identifier: Option<String> = None;
    let mut flags: Option<u16> = None;

    while let Some((tag, _)) = cursor.next_subrecord()? {
        match tag {
            RecordTag::EDID => match cursor.read_zstring() {
                Ok(value) => identifier = Some(value),
                Err(err) => warn!(
                    "{source}: unreadable EDID in CELL {:08X}: {err}",
                    record.form_id
                ),
            },
            RecordTag::DATA => match read_flags(cursor) {
                Ok(Some(value)) => flags = Some(value),
                Ok(None) => debug!("{source}: empty DATA in CELL {:08X}", record.form_id),
                Err(err) => warn!(
                    "{source}: unreadable DATA in CELL {:08X}: {err}",
                    record.form_id
                ),
            },
            _ => {}
        }

        let (Some(identifier), Some(flags)) = (identifier.as_ref(), flags) else {
            continue;
        };
        if flags & CELL_FLAG_INTERIOR != 0 {
            return Ok(None);
        }

        let compile_index = mapper.own();
        let form_id = mapper.qualify(record.form_id);
        if compile_index.prefix() > form_id {
            // Override of a cell owned by an earlier file.
            debug!("{source}: CELL {identifier} ({form_id:08X}) belongs to a master");
            return Ok(None);
        }

        return Ok(Some(CellRecord {
            identifier: identifier.clone(),
            flags,
            form_id,
            compile_index,
        }));
    }

    Ok(None)
}

/// Little-endian flags from the first two bytes of `DATA`; `None` when the
/// subrecord is empty.
fn read_flags<R: Read + Seek>(
    cursor: &mut RecordCursor<R>,
) -> Result<Option<u16>, PluginError> {
    let mut buf = [0u8; 2];
    let read = cursor.read(&mut buf)?;
    Ok((read > 0).then(|| u16::from_le_bytes(buf)))
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;
    use crate::testing::{PluginBuilder, record, subrecord, zstring};
    use tempfile::NamedTempFile;

    fn scan_bytes(bytes: Vec<u8>, mapper: &FormIdMapper) -> Vec<CellRecord> {
        let mut cursor = RecordCursor::from_reader(Cursor::new(bytes)).unwrap();
        scan_cursor(&mut cursor, mapper)
    }

    fn mapper(index: usize) -> FormIdMapper {
        FormIdMapper::standalone(CompileIndex::primary(index).unwrap())
    }

    fn identifiers(cells: &[CellRecord]) -> Vec<&str> {
        cells.iter().map(|cell| cell.identifier.as_str()).collect()
    }

    #[test]
    fn keeps_cells_with_clear_interior_bit() {
        let bytes = PluginBuilder::new()
            .cell(0x0000_0D62, Some("WhiterunMarket"), Some(0x0002))
            .build();
        let cells = scan_bytes(bytes, &mapper(1));
        assert_eq!(
            cells,
            vec![CellRecord {
                identifier: "WhiterunMarket".to_string(),
                flags: 0x0002,
                form_id: 0x0100_0D62,
                compile_index: CompileIndex::primary(1).unwrap(),
            }]
        );
    }

    #[test]
    fn drops_interior_cells() {
        let bytes = PluginBuilder::new()
            .cell(0x10, Some("BanneredMare"), Some(CELL_FLAG_INTERIOR))
            .cell(0x11, Some("Tundra01"), Some(0))
            .build();
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["Tundra01"]);
    }

    #[test]
    fn requires_both_identifier_and_flags() {
        let bytes = PluginBuilder::new()
            .cell(0x10, Some("OnlyEditorId"), None)
            .cell(0x11, None, Some(0))
            .cell(0x12, Some("Both"), Some(0))
            .build();
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["Both"]);
    }

    #[test]
    fn accepts_fields_in_either_order() {
        let body = [
            subrecord(b"DATA", &0u16.to_le_bytes()),
            subrecord(b"XCLC", &[0; 8]),
            subrecord(b"EDID", &zstring("Reversed")),
        ]
        .concat();
        let bytes = PluginBuilder::new().raw_cell(record(b"CELL", 0, 0x10, &body)).build();
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["Reversed"]);
    }

    #[test]
    fn single_byte_flags_are_accepted() {
        let body = [
            subrecord(b"EDID", &zstring("OldFormat")),
            subrecord(b"DATA", &[0x02]),
        ]
        .concat();
        let bytes = PluginBuilder::new().raw_cell(record(b"CELL", 0, 0x10, &body)).build();
        let cells = scan_bytes(bytes, &mapper(0));
        assert_eq!(cells[0].flags, 0x0002);
    }

    #[test]
    fn empty_data_counts_as_missing_flags() {
        let body = [
            subrecord(b"EDID", &zstring("NoFlags")),
            subrecord(b"DATA", &[]),
        ]
        .concat();
        let bytes = PluginBuilder::new()
            .raw_cell(record(b"CELL", 0, 0x10, &body))
            .cell(0x11, Some("WithFlags"), Some(0))
            .build();
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["WithFlags"]);
    }

    #[test]
    fn skips_overrides_of_master_cells() {
        let master = CompileIndex::primary(0).unwrap();
        let own = CompileIndex::primary(1).unwrap();
        let mapper = FormIdMapper::new(own, vec![Some(master)]);
        let bytes = PluginBuilder::new()
            .master("Skyrim.esm")
            .cell(0x0000_0D62, Some("OverriddenTundra"), Some(0))
            .cell(0x0100_0801, Some("NewCoast"), Some(0))
            .build();

        let cells = scan_bytes(bytes, &mapper);
        assert_eq!(identifiers(&cells), vec!["NewCoast"]);
        assert_eq!(cells[0].form_id, 0x0100_0801);
    }

    #[test]
    fn ignores_other_record_types() {
        let edid = subrecord(b"EDID", &zstring("NotACell"));
        let data = subrecord(b"DATA", &0u16.to_le_bytes());
        let bytes = PluginBuilder::new()
            .record(record(b"WRLD", 0, 0x20, &[edid, data].concat()))
            .build();
        assert!(scan_bytes(bytes, &mapper(0)).is_empty());
    }

    #[test]
    fn bad_record_does_not_stop_the_scan() {
        let mut broken = Vec::new();
        broken.extend_from_slice(b"EDID");
        broken.extend_from_slice(&90u16.to_le_bytes());
        broken.extend_from_slice(b"xy");
        let bytes = PluginBuilder::new()
            .raw_cell(record(b"CELL", 0, 0x10, &broken))
            .cell(0x11, Some("Survivor"), Some(0))
            .build();
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["Survivor"]);
    }

    #[test]
    fn truncated_stream_keeps_earlier_cells() {
        let mut bytes = PluginBuilder::new()
            .cell(0x10, Some("First"), Some(0))
            .cell(0x11, Some("Second"), Some(0))
            .build();
        bytes.truncate(bytes.len() - 4);
        assert_eq!(identifiers(&scan_bytes(bytes, &mapper(0))), vec!["First"]);
    }

    #[test]
    fn scan_cells_reads_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        let bytes = PluginBuilder::new().cell(0x10, Some("Riverwood"), Some(0)).build();
        file.write_all(&bytes).unwrap();

        let cells = scan_cells(file.path(), &mapper(2)).unwrap();
        assert_eq!(identifiers(&cells), vec!["Riverwood"]);
    }

    #[test]
    fn scan_cells_rejects_garbage() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a plugin file").unwrap();
        assert!(matches!(
            scan_cells(file.path(), &mapper(0)),
            Err(PluginError::NotAPlugin { .. })
        ));
    }
}
