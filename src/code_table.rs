use std::collections::BTreeMap;
use std::fmt;

/// A variable-length bit-string, most significant bit first.
///
/// Bits are packed left-aligned into bytes so codes of any depth fit; a
/// 256-symbol alphabet can produce codes up to 255 bits long.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: Vec<u8>,
    len: usize,
}

impl Code {
    pub fn new() -> Self {
        Code {
            bits: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        let byte_index = self.len / 8;
        let bit_offset = self.len % 8;

        if byte_index >= self.bits.len() {
            self.bits.push(0);
        }
        if bit {
            self.bits[byte_index] |= 1 << (7 - bit_offset);
        }
        self.len += 1;
    }

    /// Returns a copy of this code with `bit` appended.
    pub fn extended(&self, bit: bool) -> Self {
        let mut code = self.clone();
        code.push(bit);
        code
    }

    pub fn bit(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bits[index / 8] & (1 << (7 - index % 8)) != 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).filter_map(move |i| self.bit(i))
    }

    /// Splits the code into right-aligned chunks of at most eight bits.
    ///
    /// Yields `(chunk, chunk_len)`; every chunk but the last is a full byte.
    pub fn chunks(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.bits.iter().enumerate().map(move |(i, &byte)| {
            let chunk_len = (self.len - i * 8).min(8) as u8;
            (byte >> (8 - chunk_len), chunk_len)
        })
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (0..self.len).all(|i| self.bit(i) == other.bit(i))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Code {
    type Err = char;

    /// Parses a string of `'0'` and `'1'`, returning the first offending character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut code = Code::new();
        for c in s.chars() {
            match c {
                '0' => code.push(false),
                '1' => code.push(true),
                other => return Err(other),
            }
        }
        Ok(code)
    }
}

/// Maps each symbol to its root-to-leaf path in the Huffman tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        CodeTable {
            codes: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, symbol: u8, code: Code) {
        self.codes.insert(symbol, code);
    }

    pub fn get(&self, symbol: u8) -> Option<&Code> {
        self.codes.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> {
        self.codes.iter().map(|(&symbol, code)| (symbol, code))
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(Code::len).max().unwrap_or(0)
    }

    /// True when no code is a prefix of a different symbol's code.
    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(a, code_a)| {
            self.codes
                .iter()
                .all(|(b, code_b)| a == b || !code_a.is_prefix_of(code_b))
        })
    }
}
