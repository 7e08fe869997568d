// src/egt/reader.rs
use std::io::BufRead;

use super::{Entry, EntryType, RECORD_CONTENT_MULTI};
use crate::error::LoadError;

/// Pull reader over the record framing.
///
/// Entries are only readable inside the current record; once the record's
/// entry count is used up `read_entry` yields [`Entry::Empty`] without touching
/// the stream, and `next_record` skips whatever the caller left unread.
pub struct EgtReader<R> {
    inner: R,
    offset: u64,
    header: String,
    entry_count: u16,
    entries_read: u16,
}

impl<R: BufRead> EgtReader<R> {
    /// Reads the file header and positions the reader before the first record.
    pub fn open(inner: R) -> Result<Self, LoadError> {
        let mut reader = Self {
            inner,
            offset: 0,
            header: String::new(),
            entry_count: 0,
            entries_read: 0,
        };
        reader.header = reader.raw_string()?;
        Ok(reader)
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn entry_count(&self) -> u16 {
        self.entry_count
    }

    pub fn record_complete(&self) -> bool {
        self.entries_read >= self.entry_count
    }

    pub fn at_end(&mut self) -> Result<bool, LoadError> {
        let offset = self.offset;
        let buf = self
            .inner
            .fill_buf()
            .map_err(|source| LoadError::Io { offset, source })?;
        Ok(buf.is_empty())
    }

    /// Finishes the current record and starts the next one.
    /// Returns `false` when the stream ends cleanly between records.
    pub fn next_record(&mut self) -> Result<bool, LoadError> {
        while !self.record_complete() {
            self.read_entry()?;
        }
        if self.at_end()? {
            return Ok(false);
        }

        let offset = self.offset;
        let tag = self.raw_byte()?;
        if tag != RECORD_CONTENT_MULTI {
            return Err(LoadError::UnexpectedRecordTag { tag, offset });
        }
        self.entry_count = self.raw_u16()?;
        self.entries_read = 0;
        Ok(true)
    }

    pub fn read_entry(&mut self) -> Result<Entry, LoadError> {
        if self.record_complete() {
            return Ok(Entry::Empty);
        }
        self.entries_read += 1;

        let offset = self.offset;
        let tag = self.raw_byte()?;
        let entry = match EntryType::from_tag(tag) {
            Some(EntryType::Empty) => Entry::Empty,
            Some(EntryType::Boolean) => Entry::Boolean(self.raw_byte()? == 1),
            Some(EntryType::UInt16) => Entry::UInt16(self.raw_u16()?),
            Some(EntryType::String) => Entry::String(self.raw_string()?),
            Some(EntryType::Byte) => Entry::Byte(self.raw_byte()?),
            Some(EntryType::Error) | None => {
                return Err(LoadError::UnknownEntryType { tag, offset });
            }
        };
        Ok(entry)
    }

    pub fn read_u16(&mut self) -> Result<u16, LoadError> {
        self.read_typed(EntryType::UInt16, |e| match e {
            Entry::UInt16(v) => Some(v),
            _ => None,
        })
    }

    pub fn read_string(&mut self) -> Result<String, LoadError> {
        self.read_typed(EntryType::String, |e| match e {
            Entry::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn read_bool(&mut self) -> Result<bool, LoadError> {
        self.read_typed(EntryType::Boolean, |e| match e {
            Entry::Boolean(b) => Some(b),
            _ => None,
        })
    }

    pub fn read_byte(&mut self) -> Result<u8, LoadError> {
        self.read_typed(EntryType::Byte, |e| match e {
            Entry::Byte(b) => Some(b),
            _ => None,
        })
    }

    /// Reads one entry and unwraps it with `pick`; any other entry type
    /// (including the implicit Empty past the record end) is a mismatch.
    fn read_typed<T>(&mut self, expected: EntryType, pick: fn(Entry) -> Option<T>) -> Result<T, LoadError> {
        let offset = self.offset;
        let entry = self.read_entry()?;
        let found = entry.entry_type();
        pick(entry).ok_or(LoadError::TypeMismatch {
            expected,
            found,
            offset,
        })
    }

    // -------------------- raw little-endian reads --------------------

    fn raw_exact<const N: usize>(&mut self) -> Result<[u8; N], LoadError> {
        let mut buf = [0u8; N];
        let offset = self.offset;
        self.inner
            .read_exact(&mut buf)
            .map_err(|source| LoadError::Io { offset, source })?;
        self.offset += N as u64;
        Ok(buf)
    }

    fn raw_byte(&mut self) -> Result<u8, LoadError> {
        Ok(self.raw_exact::<1>()?[0])
    }

    fn raw_u16(&mut self) -> Result<u16, LoadError> {
        Ok(u16::from_le_bytes(self.raw_exact::<2>()?))
    }

    fn raw_string(&mut self) -> Result<String, LoadError> {
        let mut units = Vec::new();
        loop {
            match self.raw_u16()? {
                0 => break,
                u => units.push(u),
            }
        }
        Ok(String::from_utf16_lossy(&units))
    }
}
