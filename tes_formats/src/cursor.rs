use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::error::PluginError;
use crate::plugin::PluginHeader;
use crate::tag::RecordTag;
use crate::zstring::{MAX_ZSTRING_LEN, decode_zstring};

/// Size of a record or group header in bytes.
pub const RECORD_HEADER_LEN: u64 = 24;
/// Size of a subrecord header (tag + u16 length).
pub const SUBRECORD_HEADER_LEN: u64 = 6;
/// Record flag marking a zlib-compressed body.
pub const RECORD_FLAG_COMPRESSED: u32 = 0x0004_0000;

/// Header of a single record as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: RecordTag,
    pub data_size: u32,
    pub flags: u32,
    /// Raw form ID; its high byte indexes the file's master list.
    pub form_id: u32,
    pub version_control: u32,
    pub form_version: u16,
    /// Offset of the header within the file.
    pub offset: u64,
}

impl RecordHeader {
    pub fn is_compressed(&self) -> bool {
        self.flags & RECORD_FLAG_COMPRESSED != 0
    }

    fn data_start(&self) -> u64 {
        self.offset + RECORD_HEADER_LEN
    }

    fn data_end(&self) -> u64 {
        self.data_start() + u64::from(self.data_size)
    }
}

#[derive(Debug, Clone, Copy)]
struct Subrecord {
    data_offset: u64,
    len: u32,
}

#[derive(Debug)]
struct CurrentRecord {
    header: RecordHeader,
    next_subrecord: u64,
    subrecord: Option<Subrecord>,
}

/// Forward-only cursor over the records of one plugin file.
///
/// Groups are entered transparently, so [`RecordCursor::next_record`] only
/// ever yields real records. Within the current record,
/// [`RecordCursor::next_subrecord`] walks its fields and
/// [`RecordCursor::read`] copies the payload of the field it stopped on.
/// The only way back to the start of a file is a fresh [`RecordCursor::open`].
#[derive(Debug)]
pub struct RecordCursor<R = BufReader<File>> {
    reader: R,
    path: Option<PathBuf>,
    file_len: u64,
    plugin_header: PluginHeader,
    next_record: u64,
    current: Option<CurrentRecord>,
}

impl RecordCursor<BufReader<File>> {
    /// Open a plugin read-only and consume its `TES4` header record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PluginError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PluginError::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cursor = Self::from_reader(BufReader::new(file))?;
        cursor.path = Some(path.to_path_buf());
        debug!(
            "opened {} ({} bytes, {} masters)",
            path.display(),
            cursor.file_len,
            cursor.plugin_header.masters.len()
        );
        Ok(cursor)
    }
}

impl<R: Read + Seek> RecordCursor<R> {
    /// Wrap an arbitrary seekable reader holding plugin bytes.
    pub fn from_reader(mut reader: R) -> Result<Self, PluginError> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        let header = read_record_header(&mut reader, 0, file_len)?;
        if header.tag != RecordTag::TES4 {
            return Err(PluginError::NotAPlugin { found: header.tag });
        }
        if header.data_end() > file_len {
            return Err(PluginError::Truncated {
                what: "header record",
                offset: 0,
                file_len,
            });
        }

        let mut cursor = Self {
            reader,
            path: None,
            file_len,
            plugin_header: PluginHeader {
                flags: header.flags,
                masters: Vec::new(),
            },
            next_record: header.data_end(),
            current: Some(CurrentRecord {
                header,
                next_subrecord: header.data_start(),
                subrecord: None,
            }),
        };

        while let Some((tag, _)) = cursor.next_subrecord()? {
            if tag == RecordTag::MAST {
                let master = cursor.read_zstring()?;
                cursor.plugin_header.masters.push(master);
            }
        }
        cursor.current = None;

        Ok(cursor)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Flags and master list read from the `TES4` record.
    pub fn plugin_header(&self) -> &PluginHeader {
        &self.plugin_header
    }

    /// Header of the record the cursor is positioned on.
    pub fn record(&self) -> Option<&RecordHeader> {
        self.current.as_ref().map(|current| &current.header)
    }

    /// Advance to the next record, descending into groups.
    ///
    /// Returns `Ok(None)` at the end of the file. Unknown tags are yielded
    /// like any other; callers skip what they do not care about.
    pub fn next_record(&mut self) -> Result<Option<RecordHeader>, PluginError> {
        self.current = None;
        loop {
            let offset = self.next_record;
            if offset >= self.file_len {
                return Ok(None);
            }

            let header = read_record_header(&mut self.reader, offset, self.file_len)?;
            if header.tag == RecordTag::GRUP {
                // For groups the size field covers the header as well.
                if u64::from(header.data_size) < RECORD_HEADER_LEN {
                    return Err(PluginError::MalformedGroup {
                        offset,
                        size: header.data_size,
                    });
                }
                self.next_record = offset + RECORD_HEADER_LEN;
                continue;
            }

            if header.data_end() > self.file_len {
                return Err(PluginError::Truncated {
                    what: "record body",
                    offset,
                    file_len: self.file_len,
                });
            }

            self.next_record = header.data_end();
            self.current = Some(CurrentRecord {
                header,
                next_subrecord: header.data_start(),
                subrecord: None,
            });
            return Ok(Some(header));
        }
    }

    /// Advance to the next subrecord of the current record.
    ///
    /// Yields the tag and payload length. `XXXX` length overrides are folded
    /// into the subrecord that follows them. Compressed records yield nothing.
    pub fn next_subrecord(&mut self) -> Result<Option<(RecordTag, u32)>, PluginError> {
        let Self {
            reader, current, ..
        } = self;
        let Some(current) = current.as_mut() else {
            return Ok(None);
        };
        current.subrecord = None;

        let data_end = current.header.data_end();
        if current.header.is_compressed() {
            if current.next_subrecord < data_end {
                debug!(
                    "skipping compressed {} record {:08X}",
                    current.header.tag, current.header.form_id
                );
                current.next_subrecord = data_end;
            }
            return Ok(None);
        }

        let mut length_override = None;
        loop {
            let offset = current.next_subrecord;
            if offset + SUBRECORD_HEADER_LEN > data_end {
                if offset < data_end {
                    debug!(
                        "ignoring {} trailing bytes in {} record {:08X}",
                        data_end - offset,
                        current.header.tag,
                        current.header.form_id
                    );
                    current.next_subrecord = data_end;
                }
                return Ok(None);
            }

            reader.seek(SeekFrom::Start(offset))?;
            let mut tag = [0u8; 4];
            reader.read_exact(&mut tag)?;
            let tag = RecordTag(tag);
            let short_len = reader.read_u16::<LittleEndian>()?;
            let len = length_override.take().unwrap_or(u32::from(short_len));

            let data_offset = offset + SUBRECORD_HEADER_LEN;
            let end = data_offset + u64::from(len);
            if end > data_end {
                current.next_subrecord = data_end;
                return Err(PluginError::SubrecordOverrun {
                    tag,
                    offset,
                    excess: end - data_end,
                });
            }
            current.next_subrecord = end;

            if tag == RecordTag::XXXX && len == 4 {
                length_override = Some(reader.read_u32::<LittleEndian>()?);
                continue;
            }

            current.subrecord = Some(Subrecord { data_offset, len });
            return Ok(Some((tag, len)));
        }
    }

    /// Copy the current subrecord's payload into `buf`.
    ///
    /// Copies `min(buf.len(), length)` bytes and returns the count; excess
    /// payload is left unread.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, PluginError> {
        let subrecord = self
            .current
            .as_ref()
            .and_then(|current| current.subrecord)
            .ok_or(PluginError::NoSubrecord)?;

        let wanted = buf.len().min(subrecord.len as usize);
        self.reader.seek(SeekFrom::Start(subrecord.data_offset))?;
        self.reader
            .read_exact(&mut buf[..wanted])
            .map_err(|err| match err.kind() {
                ErrorKind::UnexpectedEof => PluginError::ShortRead {
                    offset: subrecord.data_offset,
                    wanted,
                },
                _ => PluginError::Io(err),
            })?;
        Ok(wanted)
    }

    /// Read the current subrecord as a bounded zero-terminated string.
    pub fn read_zstring(&mut self) -> Result<String, PluginError> {
        let mut buf = [0u8; MAX_ZSTRING_LEN];
        let len = self.read(&mut buf)?;
        Ok(decode_zstring(&buf[..len]))
    }

    /// Release the underlying handle.
    ///
    /// Dropping the cursor has the same effect; this exists so call sites can
    /// make the release point explicit.
    pub fn close(self) {
        if let Some(path) = &self.path {
            debug!("closed {}", path.display());
        }
    }
}

fn read_record_header<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    file_len: u64,
) -> Result<RecordHeader, PluginError> {
    if offset + RECORD_HEADER_LEN > file_len {
        return Err(PluginError::Truncated {
            what: "record header",
            offset,
            file_len,
        });
    }

    reader.seek(SeekFrom::Start(offset))?;
    let mut tag = [0u8; 4];
    reader.read_exact(&mut tag)?;
    let data_size = reader.read_u32::<LittleEndian>()?;
    let flags = reader.read_u32::<LittleEndian>()?;
    let form_id = reader.read_u32::<LittleEndian>()?;
    let version_control = reader.read_u32::<LittleEndian>()?;
    let form_version = reader.read_u16::<LittleEndian>()?;
    let _unknown = reader.read_u16::<LittleEndian>()?;

    Ok(RecordHeader {
        tag: RecordTag(tag),
        data_size,
        flags,
        form_id,
        version_control,
        form_version,
        offset,
    })
}
