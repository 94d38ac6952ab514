//! # huffzip
//!
//! File-to-file Huffman compression with a small text-header container.
//!
//! ## Quick Start
//!
//! ```no_run
//! use huffzip::{CodecConfig, HuffmanCodec};
//! use std::path::Path;
//!
//! let codec = HuffmanCodec::new(CodecConfig::default());
//!
//! // Compress a file
//! codec.compress_file(Path::new("input.txt"), Path::new("input.txt.huff"))?;
//!
//! // Decompress it next to the original, under the name stored in the header
//! let (restored, _) = codec.decompress_file(
//!     Path::new("input.txt.huff"),
//!     Some(Path::new("restored.txt")),
//!     Path::new("."),
//! )?;
//! # let _ = restored;
//! # Ok::<(), huffzip::HuffmanError>(())
//! ```
//!
//! Encoding builds a [`FrequencyTable`], merges leaves into a [`HuffmanTree`]
//! through a stable min-heap, derives a prefix-free [`CodeTable`] and packs
//! each input byte's code with a [`BitPacker`]. See [`container`] for the
//! output layout.

pub mod bit_packer;
pub mod code_table;
pub mod config;
pub mod container;
pub mod error;
pub mod frequency;
pub mod huffman_codec;
pub mod hufftree;
pub mod min_heap;

// Re-export main types for convenience
pub use bit_packer::BitPacker;
pub use code_table::{Code, CodeTable};
pub use config::CodecConfig;
pub use error::{HuffmanError, Result};
pub use frequency::FrequencyTable;
pub use huffman_codec::{DecodeSummary, EncodeSummary, HuffmanCodec};
pub use hufftree::{HuffNode, HuffmanTree};
