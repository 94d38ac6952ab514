use std::collections::BTreeMap;
use std::io::BufRead;

use crate::error::{HuffmanError, Result};

/// Occurrence count of every byte value seen in a source.
///
/// Keys are exactly the distinct bytes present and no count is ever zero.
/// Iteration is in ascending byte order, which fixes the order leaves enter
/// the priority queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<u8, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        FrequencyTable {
            counts: BTreeMap::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let table = bytes.iter().copied().fold(Self::new(), |mut acc, byte| {
            acc.increment(byte);
            acc
        });
        table.non_empty()
    }

    /// Single pass over `reader`, failing with `EmptyInput` if it yields nothing.
    pub fn from_reader<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut table = Self::new();
        for_each_byte(reader, |byte| {
            table.increment(byte);
            Ok(())
        })?;
        table.non_empty()
    }

    pub fn increment(&mut self, symbol: u8) {
        *self.counts.entry(symbol).or_insert(0) += 1;
    }

    pub fn get(&self, symbol: u8) -> Option<u64> {
        self.counts.get(&symbol).copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of bytes read.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts.iter().map(|(&byte, &count)| (byte, count))
    }

    fn non_empty(self) -> Result<Self> {
        if self.is_empty() {
            Err(HuffmanError::EmptyInput)
        } else {
            Ok(self)
        }
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    /// Builds a table from explicit counts; zero counts are dropped.
    fn from_iter<I: IntoIterator<Item = (u8, u64)>>(iter: I) -> Self {
        let counts = iter.into_iter().filter(|&(_, count)| count > 0).collect();
        FrequencyTable { counts }
    }
}

/// Feeds every byte of `reader` to `f` and returns how many were read.
pub(crate) fn for_each_byte<R, F>(reader: &mut R, mut f: F) -> Result<u64>
where
    R: BufRead,
    F: FnMut(u8) -> Result<()>,
{
    let mut read = 0u64;
    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            return Ok(read);
        }
        for &byte in chunk {
            f(byte)?;
        }
        let n = chunk.len();
        reader.consume(n);
        read += n as u64;
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn counts_each_byte() {
        let table = FrequencyTable::from_bytes(b"aaab").unwrap();
        assert_eq!(table.get(b'a'), Some(3));
        assert_eq!(table.get(b'b'), Some(1));
        assert_eq!(table.get(b'c'), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            FrequencyTable::from_bytes(b""),
            Err(HuffmanError::EmptyInput)
        ));
        let mut reader = Cursor::new(Vec::<u8>::new());
        assert!(matches!(
            FrequencyTable::from_reader(&mut reader),
            Err(HuffmanError::EmptyInput)
        ));
    }

    #[test]
    fn reader_and_slice_agree() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut reader = std::io::BufReader::with_capacity(64, Cursor::new(&data));
        let from_reader = FrequencyTable::from_reader(&mut reader).unwrap();
        assert_eq!(from_reader, FrequencyTable::from_bytes(&data).unwrap());
        assert_eq!(from_reader.total(), data.len() as u64);
    }

    #[test]
    fn iterates_in_byte_order() {
        let table = FrequencyTable::from_bytes(b"zyxzz").unwrap();
        let keys: Vec<u8> = table.iter().map(|(b, _)| b).collect();
        assert_eq!(keys, vec![b'x', b'y', b'z']);
    }

    #[test]
    fn collecting_drops_zero_counts() {
        let table: FrequencyTable = vec![(1, 0), (2, 5)].into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(2), Some(5));
    }
}
