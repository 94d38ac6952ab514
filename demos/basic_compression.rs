use std::path::Path;

use huffzip::{CodecConfig, HuffmanCodec};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sample_text = "Hello, world! This is a sample text for Huffman compression. \
                      The quick brown fox jumps over the lazy dog. \
                      Huffman encoding is a greedy algorithm that builds optimal prefix codes.";

    std::fs::write("sample.txt", sample_text)?;
    println!("Created sample file: {} bytes", sample_text.len());

    let codec = HuffmanCodec::new(CodecConfig::default().with_overwrite(true));

    let summary = codec.compress_file(Path::new("sample.txt"), Path::new("sample.huff"))?;
    let compressed_size = std::fs::metadata("sample.huff")?.len();
    println!(
        "Compressed to: {} bytes ({} payload, {} padding bits, {:.1}% of original)",
        compressed_size,
        summary.payload_bytes,
        summary.padding_bits,
        compressed_size as f64 / sample_text.len() as f64 * 100.0
    );

    let (restored, _) = codec.decompress_file(
        Path::new("sample.huff"),
        Some(Path::new("decompressed.txt")),
        Path::new("."),
    )?;

    let decompressed_text = std::fs::read_to_string(&restored)?;
    if sample_text != decompressed_text {
        return Err("Decompression verification failed".into());
    }
    println!("Decompression successful, data matches exactly.");

    std::fs::remove_file("sample.txt")?;
    std::fs::remove_file("sample.huff")?;
    std::fs::remove_file("decompressed.txt")?;
    Ok(())
}
