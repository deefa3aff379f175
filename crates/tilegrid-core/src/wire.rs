//! Little-endian scalar helpers shared by the chunk codec and save sections.

use std::io::{self, Read, Write};

pub fn write_i32<W: Write>(writer: &mut W, n: i32) -> io::Result<()> {
    writer.write_all(&n.to_le_bytes())
}

pub fn write_u32<W: Write>(writer: &mut W, n: u32) -> io::Result<()> {
    writer.write_all(&n.to_le_bytes())
}

pub fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_u16<R: Read>(reader: &mut R) -> io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
