use std::io::{Read, Write};

use crate::container::SaveContainer;
use crate::error::{Result, SaveError};

/// A piece of state stored under its own key in a [`SaveContainer`].
///
/// `VERSION` describes the section layout and is independent of any format
/// versions nested inside the section's bytes.
///
/// Loading happens in two steps. [`read_section`](Self::read_section) decodes
/// and validates everything without touching live state, and
/// [`apply`](Self::apply) moves the result into place only once the whole
/// section has been accepted.
pub trait SaveSection {
    const KEY: &'static str;
    const VERSION: u32;

    type State;

    /// Fully decoded section contents, not yet applied to any state
    type Decoded;

    fn write_section<W: Write>(state: &Self::State, writer: &mut W) -> Result<()>;

    fn read_section<R: Read>(reader: &mut R) -> Result<Self::Decoded>;

    /// Build state from scratch
    fn build(decoded: Self::Decoded) -> Result<Self::State>;

    /// Replace `state` with the decoded contents, reusing it where possible.
    ///
    /// On error `state` must be left as it was.
    fn apply(decoded: Self::Decoded, state: &mut Self::State) -> Result<()>;
}

/// Encode `state` and store it under the section's key
pub fn save_section<S: SaveSection, C: SaveContainer + ?Sized>(
    container: &mut C,
    state: &S::State,
) -> Result<()> {
    let mut bytes = Vec::new();
    S::write_section(state, &mut bytes)?;
    tracing::debug!(key = S::KEY, version = S::VERSION, bytes = bytes.len(), "section saved");
    container.put_section(S::KEY, S::VERSION, bytes);
    Ok(())
}

/// Look up and decode a section. Fails if it is missing, has another
/// version, or carries bytes past its end.
pub fn decode_section<S: SaveSection, C: SaveContainer + ?Sized>(
    container: &C,
) -> Result<S::Decoded> {
    let section = container
        .section(S::KEY)
        .ok_or_else(|| SaveError::MissingSection(S::KEY.to_string()))?;
    if section.version != S::VERSION {
        return Err(SaveError::UnsupportedSection {
            key: S::KEY.to_string(),
            found: section.version,
            supported: S::VERSION,
        });
    }

    let mut bytes = section.bytes;
    let decoded = S::read_section(&mut bytes)?;
    if !bytes.is_empty() {
        return Err(SaveError::Corrupt(format!(
            "{} trailing bytes after section '{}'",
            bytes.len(),
            S::KEY
        )));
    }
    Ok(decoded)
}

/// Load a section into new state
pub fn load_section<S: SaveSection, C: SaveContainer + ?Sized>(container: &C) -> Result<S::State> {
    S::build(decode_section::<S, C>(container)?)
}

/// Load a section over existing state. A failed load leaves `state` untouched.
pub fn load_section_into<S: SaveSection, C: SaveContainer + ?Sized>(
    container: &C,
    state: &mut S::State,
) -> Result<()> {
    let decoded = decode_section::<S, C>(container)?;
    S::apply(decoded, state)
}
