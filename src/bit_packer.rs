use crate::code_table::Code;

/// Packs variable-length codes into bytes, most significant bit first.
///
/// `buffer` always ends with exactly one in-progress byte; everything before
/// it is finalized and can be taken with [`BitPacker::take_completed_bytes`].
/// `sub_index` counts the bits already written into the in-progress byte.
#[derive(Debug)]
pub struct BitPacker {
    buffer: Vec<u8>,
    sub_index: u8,
    total_bits: u64,
}

impl BitPacker {
    /// `symbol_count` sizes the working buffer so one code rarely needs to grow it.
    pub fn new(symbol_count: usize) -> Self {
        let mut buffer = Vec::with_capacity(symbol_count / 8 + 2);
        buffer.push(0);
        BitPacker {
            buffer,
            sub_index: 0,
            total_bits: 0,
        }
    }

    /// Appends `code` and returns how many finalized bytes are now waiting.
    pub fn push_code(&mut self, code: &Code) -> usize {
        for (chunk, len) in code.chunks() {
            self.push_chunk(chunk, len);
        }
        self.total_bits += code.len() as u64;
        self.completed()
    }

    /// Writes the low `len` bits of `chunk` (1..=8) at the cursor.
    fn push_chunk(&mut self, chunk: u8, len: u8) {
        debug_assert!((1..=8).contains(&len));
        let right_len = 8 - self.sub_index;
        let current = self.buffer.len() - 1;

        if len <= right_len {
            self.buffer[current] |= chunk << (right_len - len);
            if len == right_len {
                self.buffer.push(0);
            }
        } else {
            // high bits finish this byte, the rest open the next one
            let spill = len - right_len;
            self.buffer[current] |= chunk >> spill;
            self.buffer.push(chunk << (8 - spill));
        }

        self.sub_index = (self.sub_index + len) % 8;
    }

    /// Number of fully written bytes not yet taken.
    pub fn completed(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Bits sitting in the in-progress byte.
    pub fn pending_bits(&self) -> u8 {
        self.sub_index
    }

    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Hands over every finalized byte, keeping only the in-progress byte.
    pub fn take_completed_bytes(&mut self) -> Vec<u8> {
        let partial = self.buffer.split_off(self.completed());
        std::mem::replace(&mut self.buffer, partial)
    }

    /// Flushes the packer, returning the remaining bytes and the padding bit count.
    ///
    /// The in-progress byte is included whenever it holds any bits, even if
    /// all of them are zero.
    pub fn finish(mut self) -> (Vec<u8>, u8) {
        if self.sub_index == 0 {
            self.buffer.pop();
        }
        (self.buffer, padding_bits(self.total_bits))
    }
}

/// Low-order bits of the final byte that carry no data.
pub fn padding_bits(total_bits: u64) -> u8 {
    ((8 - total_bits % 8) % 8) as u8
}
