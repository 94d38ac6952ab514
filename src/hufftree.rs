use crate::code_table::{Code, CodeTable};
use crate::error::{HuffmanError, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

// A byte alphabet never needs more nesting than this; anything deeper is hostile input.
const MAX_TREE_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    pub root: HuffNode,
}

impl HuffmanTree {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let frequencies = FrequencyTable::from_bytes(bytes)?;
        HuffmanTree::from_frequencies(&frequencies)
    }

    /// Builds the tree by repeatedly merging the two lightest subtrees.
    ///
    /// Leaves enter the queue in ascending byte order and equal weights leave
    /// it first-in first-out, so a given table always yields the same tree.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        let mut heap = MinHeap::with_capacity(frequencies.len());
        for (byte, count) in frequencies.iter() {
            heap.insert(count, HuffNode::new(byte, count));
        }
        HuffmanTree::build_from_heap(heap)
    }

    fn build_from_heap(mut heap: MinHeap<u64, HuffNode>) -> Result<Self> {
        loop {
            let Some((_, x)) = heap.extract_min() else {
                return Err(HuffmanError::EmptyInput);
            };
            let Some((_, y)) = heap.extract_min() else {
                return Ok(HuffmanTree { root: x });
            };

            let z = HuffNode::merge(x, y);
            heap.insert(z.weight(), z);
        }
    }

    /// Derives every symbol's code; a lone leaf gets the one-bit code `0`.
    pub fn generate_table(&self) -> CodeTable {
        let mut table = CodeTable::new();
        match &self.root {
            HuffNode::Leaf { byte, .. } => table.insert(*byte, Code::new().extended(false)),
            root => root.generate_table(&mut table, Code::new()),
        }
        table
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn internal_count(&self) -> usize {
        self.root.internal_count()
    }

    /// Renders the tree shape in the parenthesized header grammar.
    ///
    /// An internal node is `(left right)`. Leaves are their raw byte, with
    /// `(`, `)`, space and `\` escaped by a backslash and a newline written
    /// as `\n`. A tree that is a single leaf is written `(x)`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match &self.root {
            leaf @ HuffNode::Leaf { .. } => {
                out.push(b'(');
                leaf.write_to(&mut out);
                out.push(b')');
            }
            root => root.write_to(&mut out),
        }
        out
    }

    /// Rebuilds a tree from the output of [`HuffmanTree::serialize`].
    ///
    /// Frequencies are not transmitted, so every node of the result has weight 0.
    pub fn parse(input: &[u8]) -> Result<Self> {
        let mut parser = TreeParser::new(input);
        let root = parser.parse_root()?;
        if parser.pos != input.len() {
            return Err(parser.error("unexpected bytes after the root"));
        }
        Ok(HuffmanTree { root })
    }

    pub fn walker(&self) -> TreeWalker<'_> {
        TreeWalker {
            root: &self.root,
            current: &self.root,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Box<HuffNode>,
    },
}

impl HuffNode {
    pub fn new(b: u8, f: u64) -> Self {
        HuffNode::Leaf { weight: f, byte: b }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    pub fn merge(a: Self, b: Self) -> Self {
        // a was dequeued first and becomes the 0 branch
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Box::new(b),
        }
    }

    /// Leaf symbols under this node, left to right.
    pub fn symbols(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut Vec<u8>) {
        match self {
            HuffNode::Leaf { byte, .. } => out.push(*byte),
            HuffNode::Internal { left, right, .. } => {
                left.collect_symbols(out);
                right.collect_symbols(out);
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            HuffNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn internal_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            HuffNode::Internal { left, right, .. } => {
                1 + left.internal_count() + right.internal_count()
            }
        }
    }

    pub fn generate_table(&self, code_table: &mut CodeTable, code: Code) {
        match self {
            HuffNode::Leaf { byte, .. } => {
                code_table.insert(*byte, code);
            }
            HuffNode::Internal { left, right, .. } => {
                // Left = 0, Right = 1
                left.generate_table(code_table, code.extended(false));
                right.generate_table(code_table, code.extended(true));
            }
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            HuffNode::Leaf { byte, .. } => match *byte {
                b'(' | b')' | b' ' | b'\\' => out.extend_from_slice(&[b'\\', *byte]),
                b'\n' => out.extend_from_slice(b"\\n"),
                other => out.push(other),
            },
            HuffNode::Internal { left, right, .. } => {
                out.push(b'(');
                left.write_to(out);
                out.push(b' ');
                right.write_to(out);
                out.push(b')');
            }
        }
    }
}

struct TreeParser<'a> {
    input: &'a [u8],
    pos: usize,
    seen: [bool; 256],
}

impl<'a> TreeParser<'a> {
    fn new(input: &'a [u8]) -> Self {
        TreeParser {
            input,
            pos: 0,
            seen: [false; 256],
        }
    }

    fn error(&self, reason: &'static str) -> HuffmanError {
        HuffmanError::MalformedTree {
            offset: self.pos,
            reason,
        }
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.input.get(self.pos).copied()?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, want: u8, reason: &'static str) -> Result<()> {
        match self.input.get(self.pos) {
            Some(&byte) if byte == want => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(reason)),
        }
    }

    fn parse_root(&mut self) -> Result<HuffNode> {
        if self.input.is_empty() {
            return Err(self.error("empty tree"));
        }
        self.expect(b'(', "root must be parenthesized")?;
        let left = self.parse_node(1)?;
        if self.input.get(self.pos) == Some(&b')') && left.is_leaf() {
            self.pos += 1;
            return Ok(left);
        }
        self.finish_internal(left, 1)
    }

    fn parse_node(&mut self, depth: usize) -> Result<HuffNode> {
        if depth > MAX_TREE_DEPTH {
            return Err(self.error("tree nested too deeply"));
        }
        if self.input.get(self.pos) == Some(&b'(') {
            self.pos += 1;
            let left = self.parse_node(depth + 1)?;
            self.finish_internal(left, depth + 1)
        } else {
            self.parse_leaf()
        }
    }

    fn finish_internal(&mut self, left: HuffNode, depth: usize) -> Result<HuffNode> {
        self.expect(b' ', "expected a space between siblings")?;
        let right = self.parse_node(depth)?;
        self.expect(b')', "expected a closing parenthesis")?;
        Ok(HuffNode::merge(left, right))
    }

    fn parse_leaf(&mut self) -> Result<HuffNode> {
        let start = self.pos;
        let byte = match self.next() {
            None => return Err(self.error("tree ends early")),
            Some(b'\\') => match self.next() {
                Some(b'n') => b'\n',
                Some(escaped @ (b'(' | b')' | b' ' | b'\\')) => escaped,
                _ => return Err(self.error("bad escape sequence")),
            },
            Some(b'(' | b')' | b' ' | b'\n') => {
                self.pos = start;
                return Err(self.error("expected a symbol"));
            }
            Some(other) => other,
        };
        if std::mem::replace(&mut self.seen[byte as usize], true) {
            self.pos = start;
            return Err(self.error("symbol appears twice"));
        }
        Ok(HuffNode::new(byte, 0))
    }
}

/// Decoding cursor that follows payload bits down a tree.
#[derive(Debug, Clone)]
pub struct TreeWalker<'a> {
    root: &'a HuffNode,
    current: &'a HuffNode,
}

impl<'a> TreeWalker<'a> {
    /// Follows one bit. Returns the symbol when a leaf is reached and rewinds to the root.
    ///
    /// A tree that is a single leaf emits its symbol for every bit.
    pub fn step(&mut self, bit: bool) -> Option<u8> {
        let current: &'a HuffNode = self.current;
        match current {
            HuffNode::Leaf { byte, .. } => Some(*byte),
            HuffNode::Internal { left, right, .. } => {
                let next: &'a HuffNode = if bit { &**right } else { &**left };
                match next {
                    HuffNode::Leaf { byte, .. } => {
                        self.current = self.root;
                        Some(*byte)
                    }
                    internal => {
                        self.current = internal;
                        None
                    }
                }
            }
        }
    }

    /// True when no code is partially consumed.
    pub fn at_root(&self) -> bool {
        std::ptr::eq(self.current, self.root)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn codes_of(tree: &HuffmanTree) -> Vec<(u8, String)> {
        tree.generate_table()
            .iter()
            .map(|(b, c)| (b, c.to_string()))
            .collect()
    }

    #[test]
    fn two_symbol_tree() {
        let tree = HuffmanTree::from_bytes(b"aaab").unwrap();
        assert_eq!(tree.root.weight(), 4);
        assert_eq!(tree.root.symbols(), b"ba".to_vec());
        assert_eq!(
            codes_of(&tree),
            vec![(b'a', "1".to_string()), (b'b', "0".to_string())]
        );
        assert_eq!(tree.serialize(), b"(b a)".to_vec());
    }

    #[test]
    fn single_symbol_tree() {
        let tree = HuffmanTree::from_bytes(b"zzzz").unwrap();
        assert!(tree.root.is_leaf());
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.internal_count(), 0);
        assert_eq!(codes_of(&tree), vec![(b'z', "0".to_string())]);
        assert_eq!(tree.serialize(), b"(z)".to_vec());
        assert_eq!(HuffmanTree::parse(b"(z)").unwrap().root, HuffNode::new(b'z', 0));
    }

    #[test]
    fn empty_frequencies_fail() {
        let table = FrequencyTable::new();
        assert!(matches!(
            HuffmanTree::from_frequencies(&table),
            Err(HuffmanError::EmptyInput)
        ));
    }

    #[test]
    fn nested_serialization() {
        // weights: a=1 b=1 c=2 d=5
        // merge a+b=2, then c(2) before the new (a b)(2), then 4 with d
        let tree = HuffmanTree::from_bytes(b"abccddddd").unwrap();
        assert_eq!(tree.serialize(), b"((c (a b)) d)".to_vec());
        let codes = codes_of(&tree);
        assert_eq!(
            codes,
            vec![
                (b'a', "010".to_string()),
                (b'b', "011".to_string()),
                (b'c', "00".to_string()),
                (b'd', "1".to_string()),
            ]
        );
    }

    #[test]
    fn weights_are_conserved() {
        fn check(node: &HuffNode) {
            if let HuffNode::Internal { weight, left, right } = node {
                assert_eq!(*weight, left.weight() + right.weight());
                check(left);
                check(right);
            }
        }
        let data = b"the quick brown fox jumps over the lazy dog";
        let tree = HuffmanTree::from_bytes(data).unwrap();
        assert_eq!(tree.root.weight(), data.len() as u64);
        check(&tree.root);
    }

    #[test]
    fn full_alphabet_is_balanced_when_uniform() {
        let data: Vec<u8> = (0..=255u8).collect();
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        assert_eq!(tree.leaf_count(), 256);
        assert_eq!(tree.internal_count(), 255);
        let table = tree.generate_table();
        assert_eq!(table.len(), 256);
        assert!(table.iter().all(|(_, code)| code.len() == 8));
        assert!(table.is_prefix_free());
    }

    #[test]
    fn doubling_weights_build_a_chain() {
        let table: FrequencyTable = (0..60u8).map(|b| (b, 1u64 << b)).collect();
        let tree = HuffmanTree::from_frequencies(&table).unwrap();
        assert_eq!(tree.internal_count(), 59);
        let codes = tree.generate_table();
        assert_eq!(codes.max_code_len(), 59);
        assert_eq!(codes.get(0).map(Code::len), Some(59));
        assert_eq!(codes.get(1).map(Code::len), Some(59));
        assert_eq!(codes.get(59).map(|c| c.to_string()), Some("1".to_string()));
        assert!(codes.is_prefix_free());
    }

    #[test]
    fn escaped_symbols_round_trip() {
        let data = b"(( ))\\\\\n\n\nxy\xff";
        let tree = HuffmanTree::from_bytes(data).unwrap();
        let text = tree.serialize();
        assert!(!text.contains(&b'\n'));
        let parsed = HuffmanTree::parse(&text).unwrap();
        assert_eq!(parsed.serialize(), text);
        assert_eq!(parsed.root.symbols(), tree.root.symbols());
    }

    #[test]
    fn parse_rejects_malformed_input() {
        let bad: [&[u8]; 9] = [
            b"",
            b"a",
            b"(a b",
            b"(a  b)",
            b"(a b) ",
            b"(a a)",
            b"(a \\q)",
            b"((a b))",
            b"()",
        ];
        for input in bad {
            assert!(
                matches!(
                    HuffmanTree::parse(input),
                    Err(HuffmanError::MalformedTree { .. })
                ),
                "accepted {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn parse_reports_offset() {
        match HuffmanTree::parse(b"(a (b a))") {
            Err(HuffmanError::MalformedTree { offset, reason }) => {
                assert_eq!(offset, 6);
                assert_eq!(reason, "symbol appears twice");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn walker_decodes_codes() {
        let tree = HuffmanTree::from_bytes(b"abccddddd").unwrap();
        let mut walker = tree.walker();
        let mut out = vec![];
        // c=00 a=010 d=1 b=011
        for bit in [0, 0, 0, 1, 0, 1, 0, 1, 1] {
            if let Some(b) = walker.step(bit == 1) {
                out.push(b);
            }
        }
        assert_eq!(out, b"cadb".to_vec());
        assert!(walker.at_root());
        walker.step(false);
        assert!(!walker.at_root());
    }
}
