//! The compressed container: three newline-terminated header lines followed
//! by the packed payload.
//!
//! ```text
//! <source name>\n
//! <serialized tree>\n
//! <padding bits, 0-7>\n
//! <payload bytes...>
//! ```

use std::io::{BufRead, Read, Write};

use crate::error::{HuffmanError, Result};

/// Longest name line a reader accepts, and therefore the longest a writer may emit.
pub const MAX_NAME_LEN: usize = 4096;
const MAX_NAME_LINE: u64 = MAX_NAME_LEN as u64;
// 256 escaped leaves plus the parentheses and spaces of 255 internal nodes
const MAX_TREE_LINE: u64 = 2048;
const MAX_PADDING_LINE: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: Vec<u8>,
    pub tree: Vec<u8>,
    pub padding: u8,
}

/// Fails with `InvalidName` unless `name` fits on one header line that
/// [`read_header`] will accept.
pub fn check_name(name: &[u8]) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN || name.contains(&b'\n') {
        return Err(HuffmanError::InvalidName);
    }
    Ok(())
}

pub fn write_header<W: Write>(writer: &mut W, header: &Header) -> Result<()> {
    check_name(&header.name)?;
    debug_assert!(!header.tree.contains(&b'\n'));
    debug_assert!(header.padding < 8);

    writer.write_all(&header.name)?;
    writer.write_all(b"\n")?;
    writer.write_all(&header.tree)?;
    writer.write_all(b"\n")?;
    writeln!(writer, "{}", header.padding)?;
    Ok(())
}

pub fn read_header<R: BufRead>(reader: &mut R) -> Result<Header> {
    let name = read_line(reader, MAX_NAME_LINE, "name")?;
    if name.is_empty() {
        return Err(HuffmanError::MalformedHeader("empty name line".to_string()));
    }
    let tree = read_line(reader, MAX_TREE_LINE, "tree")?;
    let padding_line = read_line(reader, MAX_PADDING_LINE, "padding")?;

    let padding = std::str::from_utf8(&padding_line)
        .ok()
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|&p| p < 8)
        .ok_or_else(|| {
            HuffmanError::MalformedHeader(format!(
                "padding must be a digit 0-7, got {:?}",
                String::from_utf8_lossy(&padding_line)
            ))
        })?;

    Ok(Header {
        name,
        tree,
        padding,
    })
}

fn read_line<R: BufRead>(reader: &mut R, limit: u64, what: &str) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    reader.by_ref().take(limit + 1).read_until(b'\n', &mut line)?;
    if line.pop() != Some(b'\n') {
        return Err(HuffmanError::MalformedHeader(format!(
            "{what} line is missing or longer than {limit} bytes"
        )));
    }
    Ok(line)
}
