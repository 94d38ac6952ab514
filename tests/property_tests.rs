use std::io::Cursor;

use huffzip::{FrequencyTable, HuffNode, HuffmanCodec, HuffmanTree};
use proptest::prelude::*;

fn encode(data: &[u8]) -> (Vec<u8>, huffzip::EncodeSummary) {
    let mut out = Vec::new();
    let summary = HuffmanCodec::default()
        .encode(b"prop.bin", Cursor::new(data), &mut out)
        .unwrap();
    (out, summary)
}

fn leaf_weight_sum(node: &HuffNode) -> u64 {
    match node {
        HuffNode::Leaf { weight, .. } => *weight,
        HuffNode::Internal { left, right, .. } => leaf_weight_sum(left) + leaf_weight_sum(right),
    }
}

proptest! {
    #[test]
    fn codes_are_prefix_free(data in prop::collection::vec(any::<u8>(), 1..500)) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let codes = tree.generate_table();
        let frequencies = FrequencyTable::from_bytes(&data).unwrap();

        prop_assert_eq!(codes.len(), frequencies.len());
        prop_assert!(codes.iter().all(|(_, code)| !code.is_empty()));
        prop_assert!(codes.is_prefix_free());
    }

    #[test]
    fn round_trip(data in prop::collection::vec(any::<u8>(), 1..2000)) {
        let (container, _) = encode(&data);
        let mut decoded = Vec::new();
        let summary = HuffmanCodec::default().decode(container.as_slice(), &mut decoded).unwrap();

        prop_assert_eq!(summary.name, b"prop.bin".to_vec());
        prop_assert_eq!(summary.output_bytes, data.len() as u64);
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_small_alphabet(data in prop::collection::vec(0u8..3, 1..300)) {
        let (container, _) = encode(&data);
        let mut decoded = Vec::new();
        HuffmanCodec::default().decode(container.as_slice(), &mut decoded).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn frequencies_are_conserved(data in prop::collection::vec(any::<u8>(), 1..1000)) {
        let frequencies = FrequencyTable::from_bytes(&data).unwrap();
        prop_assert_eq!(frequencies.total(), data.len() as u64);
        prop_assert!(frequencies.iter().all(|(_, count)| count > 0));

        let tree = HuffmanTree::from_frequencies(&frequencies).unwrap();
        prop_assert_eq!(tree.root.weight(), data.len() as u64);
        prop_assert_eq!(leaf_weight_sum(&tree.root), tree.root.weight());
        prop_assert_eq!(tree.leaf_count(), frequencies.len());
        prop_assert_eq!(tree.internal_count(), frequencies.len() - 1);
    }

    #[test]
    fn heavier_symbols_never_get_longer_codes(
        counts in prop::collection::vec(1u64..10_000, 2..120),
    ) {
        let frequencies: FrequencyTable = counts.iter().enumerate().map(|(i, &c)| (i as u8, c)).collect();
        let codes = HuffmanTree::from_frequencies(&frequencies).unwrap().generate_table();

        for (x, fx) in frequencies.iter() {
            for (y, fy) in frequencies.iter() {
                if fx > fy {
                    let (lx, ly) = (codes.get(x).unwrap().len(), codes.get(y).unwrap().len());
                    prop_assert!(lx <= ly, "symbol {} (count {}) has code length {} > {} of symbol {} (count {})", x, fx, lx, ly, y, fy);
                }
            }
        }
    }

    #[test]
    fn codes_fill_the_tree(counts in prop::collection::vec(1u64..1_000_000, 2..100)) {
        // every internal node has two children, so the Kraft sum is exactly one
        let frequencies: FrequencyTable = counts.iter().enumerate().map(|(i, &c)| (i as u8, c)).collect();
        let codes = HuffmanTree::from_frequencies(&frequencies).unwrap().generate_table();
        let max = codes.max_code_len() as u32;
        prop_assert!(max < 100);
        let kraft: u128 = codes.iter().map(|(_, code)| 1u128 << (max - code.len() as u32)).sum();
        prop_assert_eq!(kraft, 1u128 << max);
    }

    #[test]
    fn padding_aligns_the_payload(data in prop::collection::vec(any::<u8>(), 1..1000)) {
        let (_, summary) = encode(&data);
        prop_assert!(summary.padding_bits <= 7);
        prop_assert_eq!((summary.total_bits + summary.padding_bits as u64) % 8, 0);
        prop_assert_eq!(summary.payload_bytes * 8, summary.total_bits + summary.padding_bits as u64);
    }

    #[test]
    fn serialized_tree_parses_back(data in prop::collection::vec(any::<u8>(), 1..600)) {
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let text = tree.serialize();
        prop_assert!(!text.contains(&b'\n'));
        let parsed = HuffmanTree::parse(&text).unwrap();
        prop_assert_eq!(parsed.generate_table(), tree.generate_table());
    }
}
