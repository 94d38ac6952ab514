/// Tunables shared by the encoder, the decoder and the file helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Capacity of the buffered reader and writer wrapped around each stream.
    pub buffer_size: usize,
    /// Finalized bytes the bit packer may accumulate before they are written out.
    pub flush_threshold: usize,
    /// Whether the file helpers may replace an existing destination.
    pub overwrite: bool,
    /// Extension used when deriving a compressed file name.
    pub extension: String,
}

impl CodecConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            buffer_size: 64 * 1024,
            flush_threshold: 4096,
            overwrite: false,
            extension: "huff".to_string(),
        }
    }
}
