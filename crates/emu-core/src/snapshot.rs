//! Chunked save-state framing.
//!
//! A snapshot is a sequence of chunks. Each chunk is laid out as
//!
//! | Offset | Size | Field                              |
//! |--------|------|------------------------------------|
//! | 0      | 4    | ASCII tag, e.g. `CPUR`             |
//! | 4      | 1    | Payload format version             |
//! | 5      | 4    | Payload length, little-endian      |
//! | 9      | len  | Payload                            |
//!
//! All multi-byte payload fields are little-endian. A reader accepts any
//! version up to the newest it knows and ignores payload bytes it does not
//! consume, so a newer field appended to a chunk only needs a version bump.

use std::fmt;

use thiserror::Error;

/// Four-character chunk identifier.
pub type Tag = [u8; 4];

const HEADER_LEN: usize = 9;

/// Why a snapshot could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("expected chunk {expected}, found {found}")]
    WrongTag { expected: TagName, found: TagName },

    #[error("chunk {tag} has version {version}, newest supported is {supported}")]
    UnsupportedVersion {
        tag: TagName,
        version: u8,
        supported: u8,
    },

    #[error("chunk {0} is truncated")]
    Truncated(TagName),

    #[error("chunk {tag}: invalid {field} value {value:#x}")]
    InvalidValue {
        tag: TagName,
        field: &'static str,
        value: u64,
    },
}

/// A chunk tag printed as text in error messages.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TagName(pub Tag);

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() { b as char } else { '?' };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{self}\"")
    }
}

/// Builds a snapshot one chunk at a time.
#[derive(Debug, Default)]
pub struct SnapshotWriter {
    data: Vec<u8>,
}

impl SnapshotWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk whose payload is produced by `fill`.
    pub fn chunk(&mut self, tag: Tag, version: u8, fill: impl FnOnce(&mut ChunkWriter)) {
        let mut chunk = ChunkWriter {
            payload: Vec::new(),
        };
        fill(&mut chunk);
        self.data.extend_from_slice(&tag);
        self.data.push(version);
        let len = u32::try_from(chunk.payload.len()).unwrap_or(u32::MAX);
        self.data.extend_from_slice(&len.to_le_bytes());
        self.data.extend_from_slice(&chunk.payload);
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Payload under construction.
#[derive(Debug)]
pub struct ChunkWriter {
    payload: Vec<u8>,
}

impl ChunkWriter {
    pub fn put_u8(&mut self, v: u8) {
        self.payload.push(v);
    }

    pub fn put_bool(&mut self, v: bool) {
        self.payload.push(u8::from(v));
    }

    pub fn put_u16(&mut self, v: u16) {
        self.payload.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.payload.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.payload.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_u64(&mut self, v: u64) {
        self.payload.extend_from_slice(&v.to_le_bytes());
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.payload.extend_from_slice(bytes);
    }
}

/// Walks the chunks of a snapshot in order.
#[derive(Debug)]
pub struct SnapshotReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SnapshotReader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// True once every chunk has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Tag of the next chunk without consuming it.
    #[must_use]
    pub fn peek_tag(&self) -> Option<Tag> {
        let rest = self.data.get(self.pos..)?;
        rest.get(..4)?.try_into().ok()
    }

    /// Consume the next chunk, which must carry `tag` and a version no newer
    /// than `supported`.
    pub fn read_chunk(&mut self, tag: Tag, supported: u8) -> Result<ChunkReader<'a>, SnapshotError> {
        let rest = &self.data[self.pos.min(self.data.len())..];
        let Some(header) = rest.get(..HEADER_LEN) else {
            return Err(SnapshotError::Truncated(TagName(tag)));
        };
        let found = [header[0], header[1], header[2], header[3]];
        if found != tag {
            return Err(SnapshotError::WrongTag {
                expected: TagName(tag),
                found: TagName(found),
            });
        }
        let version = header[4];
        if version > supported {
            return Err(SnapshotError::UnsupportedVersion {
                tag: TagName(tag),
                version,
                supported,
            });
        }
        let len = u32::from_le_bytes([header[5], header[6], header[7], header[8]]) as usize;
        let Some(payload) = rest.get(HEADER_LEN..HEADER_LEN + len) else {
            return Err(SnapshotError::Truncated(TagName(tag)));
        };
        self.pos += HEADER_LEN + len;
        Ok(ChunkReader {
            tag,
            version,
            payload,
            pos: 0,
        })
    }
}

/// Typed access to one chunk's payload.
#[derive(Debug)]
pub struct ChunkReader<'a> {
    tag: Tag,
    version: u8,
    payload: &'a [u8],
    pos: usize,
}

impl ChunkReader<'_> {
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// True when every payload byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.payload.len()
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let bytes = self
            .payload
            .get(self.pos..self.pos + N)
            .ok_or(SnapshotError::Truncated(TagName(self.tag)))?;
        self.pos += N;
        let mut out = [0; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn get_u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take::<1>()?[0])
    }

    pub fn get_bool(&mut self, field: &'static str) -> Result<bool, SnapshotError> {
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.invalid(field, u64::from(other))),
        }
    }

    pub fn get_u16(&mut self) -> Result<u16, SnapshotError> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn get_u32(&mut self) -> Result<u32, SnapshotError> {
        self.take().map(u32::from_le_bytes)
    }

    pub fn get_i32(&mut self) -> Result<i32, SnapshotError> {
        self.take().map(i32::from_le_bytes)
    }

    pub fn get_u64(&mut self) -> Result<u64, SnapshotError> {
        self.take().map(u64::from_le_bytes)
    }

    pub fn get_bytes<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        self.take()
    }

    /// Error for a field that decoded but holds a value out of range.
    #[must_use]
    pub fn invalid(&self, field: &'static str, value: u64) -> SnapshotError {
        SnapshotError::InvalidValue {
            tag: TagName(self.tag),
            field,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        let mut w = SnapshotWriter::new();
        w.chunk(*b"AAAA", 1, |c| {
            c.put_u8(0x12);
            c.put_u16(0x3456);
        });
        w.chunk(*b"BBBB", 2, |c| {
            c.put_bool(true);
            c.put_i32(-3);
            c.put_u64(1 << 40);
        });
        w.into_bytes()
    }

    #[test]
    fn header_layout() {
        let bytes = sample();
        assert_eq!(&bytes[..4], b"AAAA");
        assert_eq!(bytes[4], 1);
        assert_eq!(&bytes[5..9], &[3, 0, 0, 0]);
        assert_eq!(&bytes[9..12], &[0x12, 0x56, 0x34]);
    }

    #[test]
    fn reads_chunks_in_order() {
        let bytes = sample();
        let mut r = SnapshotReader::new(&bytes);
        let mut a = r.read_chunk(*b"AAAA", 1).expect("chunk A");
        assert_eq!(a.get_u8(), Ok(0x12));
        assert_eq!(a.get_u16(), Ok(0x3456));
        assert!(a.is_empty());
        let mut b = r.read_chunk(*b"BBBB", 2).expect("chunk B");
        assert_eq!(b.version(), 2);
        assert_eq!(b.get_bool("flag"), Ok(true));
        assert_eq!(b.get_i32(), Ok(-3));
        assert_eq!(b.get_u64(), Ok(1 << 40));
        assert!(r.is_empty());
    }

    #[test]
    fn rejects_wrong_tag_and_newer_version() {
        let bytes = sample();
        let mut r = SnapshotReader::new(&bytes);
        assert!(matches!(
            r.read_chunk(*b"ZZZZ", 1),
            Err(SnapshotError::WrongTag { .. })
        ));
        assert!(matches!(
            r.read_chunk(*b"AAAA", 0),
            Err(SnapshotError::UnsupportedVersion { version: 1, .. })
        ));
    }

    #[test]
    fn truncated_payload_is_reported() {
        let bytes = sample();
        let mut r = SnapshotReader::new(&bytes[..10]);
        assert_eq!(
            r.read_chunk(*b"AAAA", 1).err(),
            Some(SnapshotError::Truncated(TagName(*b"AAAA")))
        );

        let mut r = SnapshotReader::new(&bytes);
        let mut a = r.read_chunk(*b"AAAA", 1).expect("chunk A");
        a.get_u16().expect("two bytes");
        assert!(a.get_u16().is_err());
    }

    #[test]
    fn bool_out_of_range_is_invalid() {
        let mut w = SnapshotWriter::new();
        w.chunk(*b"FLAG", 1, |c| c.put_u8(7));
        let bytes = w.into_bytes();
        let mut r = SnapshotReader::new(&bytes);
        let mut c = r.read_chunk(*b"FLAG", 1).expect("chunk");
        assert!(matches!(
            c.get_bool("halted"),
            Err(SnapshotError::InvalidValue { value: 7, .. })
        ));
    }
}
