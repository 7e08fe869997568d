// src/egt/writer.rs
use std::io::{self, Write};

use super::{Entry, EntryType, RECORD_CONTENT_MULTI};

/// Writes the same framing [`EgtReader`](super::EgtReader) consumes.
pub struct EgtWriter<W> {
    inner: W,
}

impl<W: Write> EgtWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.raw_string(header)
    }

    /// Writes one content record holding `entries`.
    pub fn write_record(&mut self, entries: &[Entry]) -> io::Result<()> {
        let count = u16::try_from(entries.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("record has {} entries; at most u16::MAX fit", entries.len()),
            )
        })?;
        self.inner.write_all(&[RECORD_CONTENT_MULTI])?;
        self.inner.write_all(&count.to_le_bytes())?;
        for e in entries {
            self.inner.write_all(&[e.entry_type() as u8])?;
            match e {
                Entry::Empty => {}
                Entry::Boolean(b) => self.inner.write_all(&[*b as u8])?,
                Entry::UInt16(v) => self.inner.write_all(&v.to_le_bytes())?,
                Entry::String(s) => self.raw_string(s)?,
                Entry::Byte(b) => self.inner.write_all(&[*b])?,
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn raw_string(&mut self, s: &str) -> io::Result<()> {
        if s.contains('\0') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{:?} entries cannot hold NUL characters", EntryType::String),
            ));
        }
        for unit in s.encode_utf16() {
            self.inner.write_all(&unit.to_le_bytes())?;
        }
        self.inner.write_all(&0u16.to_le_bytes())
    }
}
