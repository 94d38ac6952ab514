use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::bit_packer::{padding_bits, BitPacker};
use crate::code_table::CodeTable;
use crate::config::CodecConfig;
use crate::container::{self, Header};
use crate::error::{HuffmanError, Result};
use crate::frequency::{for_each_byte, FrequencyTable};
use crate::hufftree::HuffmanTree;

const TEMP_EXT: &str = "tmp";

/// What an encode produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub input_bytes: u64,
    pub distinct_symbols: usize,
    pub total_bits: u64,
    pub padding_bits: u8,
    pub payload_bytes: u64,
}

/// What a decode produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Source name recorded on the first header line.
    pub name: Vec<u8>,
    pub output_bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct HuffmanCodec {
    config: CodecConfig,
}

impl HuffmanCodec {
    pub fn new(mut config: CodecConfig) -> Self {
        // a zero-capacity BufReader reports every source as exhausted
        config.buffer_size = config.buffer_size.max(1);
        HuffmanCodec { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compresses `input` into a container written to `output`.
    ///
    /// The input is read three times: once to count bytes, once to total the
    /// encoded bit length for the padding line, and once to pack the payload.
    /// Memory use does not depend on the input size.
    pub fn encode<R, W>(&self, name: &[u8], input: R, output: &mut W) -> Result<EncodeSummary>
    where
        R: Read + Seek,
        W: Write,
    {
        container::check_name(name)?;
        let mut reader = BufReader::with_capacity(self.config.buffer_size, input);

        let frequencies = FrequencyTable::from_reader(&mut reader)?;
        let tree = HuffmanTree::from_frequencies(&frequencies)?;
        let tree_text = tree.serialize();
        let codes = tree.generate_table();
        debug!(
            distinct_symbols = frequencies.len(),
            input_bytes = frequencies.total(),
            tree_len = tree_text.len(),
            max_code_len = codes.max_code_len(),
            "built huffman tree"
        );

        reader.rewind()?;
        let total_bits = encoded_bit_length(&mut reader, &codes)?;
        let padding = padding_bits(total_bits);
        debug!(total_bits, padding, "measured encoded length");

        let mut writer = BufWriter::with_capacity(self.config.buffer_size, output);
        container::write_header(
            &mut writer,
            &Header {
                name: name.to_vec(),
                tree: tree_text,
                padding,
            },
        )?;

        reader.rewind()?;
        let payload_bytes = self.pack(&mut reader, &codes, frequencies.len(), &mut writer)?;
        writer.flush()?;

        let summary = EncodeSummary {
            input_bytes: frequencies.total(),
            distinct_symbols: frequencies.len(),
            total_bits,
            padding_bits: padding,
            payload_bytes,
        };
        info!(?summary, "encoded");
        Ok(summary)
    }

    fn pack<R: BufRead, W: Write>(
        &self,
        reader: &mut R,
        codes: &CodeTable,
        symbol_count: usize,
        writer: &mut W,
    ) -> Result<u64> {
        let mut packer = BitPacker::new(symbol_count);
        let mut written = 0u64;

        for_each_byte(reader, |byte| {
            let code = codes.get(byte).ok_or(HuffmanError::MissingCode(byte))?;
            if packer.push_code(code) >= self.config.flush_threshold {
                let bytes = packer.take_completed_bytes();
                writer.write_all(&bytes)?;
                written += bytes.len() as u64;
            }
            Ok(())
        })?;

        let (tail, _) = packer.finish();
        writer.write_all(&tail)?;
        Ok(written + tail.len() as u64)
    }

    /// Reads a container from `input` and writes the original bytes to `output`.
    pub fn decode<R, W>(&self, input: R, output: &mut W) -> Result<DecodeSummary>
    where
        R: Read,
        W: Write,
    {
        let mut reader = BufReader::with_capacity(self.config.buffer_size, input);
        let header = container::read_header(&mut reader)?;
        let tree = HuffmanTree::parse(&header.tree)?;
        debug!(
            name = %String::from_utf8_lossy(&header.name),
            symbols = tree.leaf_count(),
            padding = header.padding,
            "read container header"
        );

        let mut writer = BufWriter::with_capacity(self.config.buffer_size, output);
        let mut walker = tree.walker();
        let mut output_bytes = 0u64;
        let mut emit = |byte: u8, bits: u8| -> Result<()> {
            for i in 0..bits {
                if let Some(symbol) = walker.step(byte & (0x80 >> i) != 0) {
                    writer.write_all(&[symbol])?;
                    output_bytes += 1;
                }
            }
            Ok(())
        };

        // hold back one byte: only the last one loses its padding bits
        let mut pending: Option<u8> = None;
        for_each_byte(&mut reader, |byte| match pending.replace(byte) {
            Some(previous) => emit(previous, 8),
            None => Ok(()),
        })?;
        match pending {
            Some(last) => emit(last, 8 - header.padding)?,
            None if header.padding != 0 => return Err(HuffmanError::TruncatedPayload),
            None => {}
        }
        drop(emit);

        if !walker.at_root() {
            return Err(HuffmanError::TruncatedPayload);
        }
        writer.flush()?;

        let summary = DecodeSummary {
            name: header.name,
            output_bytes,
        };
        info!(output_bytes, "decoded");
        Ok(summary)
    }

    /// Compresses `src` into `dst`, recording the source's file name in the header.
    ///
    /// The container is written to a temporary sibling and renamed into place
    /// only once it is complete.
    pub fn compress_file(&self, src: &Path, dst: &Path) -> Result<EncodeSummary> {
        let name = src
            .file_name()
            .map(|n| n.as_encoded_bytes().to_vec())
            .ok_or(HuffmanError::InvalidName)?;
        let input = File::open(src)?;
        info!(src = %src.display(), dst = %dst.display(), "compressing");
        self.write_atomically(dst, |out| self.encode(&name, input, out))
    }

    /// Decompresses `src`. With no `dst`, the name stored in the header is
    /// used, reduced to its final component and placed in `default_dir`.
    pub fn decompress_file(
        &self,
        src: &Path,
        dst: Option<&Path>,
        default_dir: &Path,
    ) -> Result<(PathBuf, DecodeSummary)> {
        let mut reader = BufReader::with_capacity(self.config.buffer_size, File::open(src)?);
        let header = container::read_header(&mut reader)?;
        let target = match dst {
            Some(path) => path.to_path_buf(),
            None => default_dir.join(stored_file_name(&header.name)?),
        };
        info!(src = %src.display(), dst = %target.display(), "decompressing");

        // decode parses the header itself, so start over from the top
        let mut input = reader.into_inner();
        input.rewind()?;
        let summary = self.write_atomically(&target, |out| self.decode(input, out))?;
        Ok((target, summary))
    }

    fn write_atomically<T, F>(&self, dst: &Path, write: F) -> Result<T>
    where
        F: FnOnce(&mut File) -> Result<T>,
    {
        if !self.config.overwrite && dst.exists() {
            return Err(HuffmanError::OutputExists(dst.to_path_buf()));
        }
        let temp_path = temp_path_for(dst);
        // never truncate or later delete a file this call did not create
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        let result = write(&mut file)
            .and_then(|value| {
                file.sync_all()?;
                drop(file);
                Ok(value)
            })
            .and_then(|value| {
                fs::rename(&temp_path, dst)?;
                Ok(value)
            });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Default container path for `src`: the configured extension appended to its name.
    pub fn default_output_path(&self, src: &Path) -> PathBuf {
        let mut name = src.as_os_str().to_owned();
        name.push(".");
        name.push(&self.config.extension);
        PathBuf::from(name)
    }
}

/// Second pass: the exact number of payload bits.
fn encoded_bit_length<R: BufRead>(reader: &mut R, codes: &CodeTable) -> Result<u64> {
    let mut total = 0u64;
    for_each_byte(reader, |byte| {
        let code = codes.get(byte).ok_or(HuffmanError::MissingCode(byte))?;
        total += code.len() as u64;
        Ok(())
    })?;
    Ok(total)
}

fn temp_path_for(dst: &Path) -> PathBuf {
    let mut name = dst.as_os_str().to_owned();
    name.push(".");
    name.push(TEMP_EXT);
    PathBuf::from(name)
}

fn stored_file_name(name: &[u8]) -> Result<PathBuf> {
    let name = String::from_utf8_lossy(name);
    Path::new(name.as_ref())
        .file_name()
        .map(PathBuf::from)
        .ok_or(HuffmanError::InvalidName)
}
