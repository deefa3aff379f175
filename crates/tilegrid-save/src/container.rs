//! Generic keyed and versioned save container.
//!
//! Sections are opaque byte blobs addressed by a stable string key, each with
//! its own version number. [`SaveFile`] keeps them in memory and reads or
//! writes the whole set as one binary file:
//!
//! ```text
//! [u8; 4] magic "TGSV"
//! u32     container version
//! u32     section count
//! per section:
//!   u32 key length, key bytes (UTF-8)
//!   u32 section version
//!   u32 data length, data bytes
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tilegrid_core::wire::{read_u32, write_u32};

use crate::error::{Result, SaveError};

pub const SAVE_FILE_MAGIC: [u8; 4] = *b"TGSV";

pub const SAVE_FILE_VERSION: u32 = 1;

/// Borrowed view of one stored section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRef<'a> {
    pub version: u32,
    pub bytes: &'a [u8],
}

/// Storage that sections are written to and read from
pub trait SaveContainer {
    /// Store a section, replacing any previous section under the same key
    fn put_section(&mut self, key: &str, version: u32, bytes: Vec<u8>);

    fn section(&self, key: &str) -> Option<SectionRef<'_>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionData {
    version: u32,
    bytes: Vec<u8>,
}

/// In-memory set of sections with a binary file representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveFile {
    sections: BTreeMap<String, SectionData>,
}

impl SaveFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate `(key, section)` pairs in key order
    pub fn sections(&self) -> impl Iterator<Item = (&str, SectionRef<'_>)> {
        self.sections.iter().map(|(key, data)| {
            (
                key.as_str(),
                SectionRef {
                    version: data.version,
                    bytes: &data.bytes,
                },
            )
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&SAVE_FILE_MAGIC)?;
        write_u32(writer, SAVE_FILE_VERSION)?;
        write_u32(writer, len_u32(self.sections.len())?)?;
        for (key, data) in &self.sections {
            write_u32(writer, len_u32(key.len())?)?;
            writer.write_all(key.as_bytes())?;
            write_u32(writer, data.version)?;
            write_u32(writer, len_u32(data.bytes.len())?)?;
            writer.write_all(&data.bytes)?;
        }
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != SAVE_FILE_MAGIC {
            return Err(SaveError::Corrupt("not a tilegrid save file".to_string()));
        }
        let version = read_u32(reader)?;
        if version != SAVE_FILE_VERSION {
            return Err(SaveError::Corrupt(format!(
                "unsupported save file version {}",
                version
            )));
        }

        let count = read_u32(reader)?;
        let mut file = SaveFile::new();
        for _ in 0..count {
            let key_bytes = read_blob(reader)?;
            let key = String::from_utf8(key_bytes)
                .map_err(|_| SaveError::Corrupt("section key is not UTF-8".to_string()))?;
            let version = read_u32(reader)?;
            let bytes = read_blob(reader)?;
            if file
                .sections
                .insert(key.clone(), SectionData { version, bytes })
                .is_some()
            {
                return Err(SaveError::Corrupt(format!("duplicate section '{}'", key)));
            }
        }
        Ok(file)
    }

    /// Encode the whole file into memory. Fails if a key, a section or the
    /// section count does not fit a `u32` length.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        Self::read_from(&mut bytes)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(fs::File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::debug!(path = %path.display(), sections = self.len(), "save file written");
        Ok(())
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(fs::File::open(path)?);
        let file = Self::read_from(&mut reader)?;
        tracing::debug!(path = %path.display(), sections = file.len(), "save file read");
        Ok(file)
    }
}

impl SaveContainer for SaveFile {
    fn put_section(&mut self, key: &str, version: u32, bytes: Vec<u8>) {
        self.sections
            .insert(key.to_string(), SectionData { version, bytes });
    }

    fn section(&self, key: &str) -> Option<SectionRef<'_>> {
        self.sections.get(key).map(|data| SectionRef {
            version: data.version,
            bytes: &data.bytes,
        })
    }
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| SaveError::Corrupt(format!("length {} exceeds u32", len)))
}

fn read_blob<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let len = read_u32(reader)? as u64;
    let mut bytes = Vec::new();
    // Bounded read so a corrupt length cannot force a huge allocation up front
    reader.by_ref().take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(SaveError::Corrupt(format!(
            "blob truncated: expected {} bytes, found {}",
            len,
            bytes.len()
        )));
    }
    Ok(bytes)
}
