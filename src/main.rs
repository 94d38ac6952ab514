use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use huffzip::{CodecConfig, HuffmanCodec};

#[derive(Parser)]
#[command(name = "huffzip", version)]
#[command(about = "Compress and decompress files with Huffman coding.", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into a .huff container
    Compress {
        input: PathBuf,
        /// Destination (defaults to INPUT.huff)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Restore the original file from a container
    Decompress {
        input: PathBuf,
        /// Destination (defaults to the stored name, next to INPUT)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Args)]
struct IoArgs {
    /// Replace the destination if it already exists
    #[arg(short, long)]
    force: bool,
    /// Read and write buffer size in bytes
    #[arg(long, default_value_t = CodecConfig::default().buffer_size)]
    buffer_size: usize,
}

impl IoArgs {
    fn config(&self) -> CodecConfig {
        CodecConfig::default()
            .with_buffer_size(self.buffer_size)
            .with_overwrite(self.force)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a global logger was already installed");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compress { input, output, io } => {
            let codec = HuffmanCodec::new(io.config());
            let output = output.unwrap_or_else(|| codec.default_output_path(&input));
            let summary = codec
                .compress_file(&input, &output)
                .with_context(|| format!("compressing {}", input.display()))?;
            println!(
                "{} -> {} ({} -> {} payload bytes)",
                input.display(),
                output.display(),
                summary.input_bytes,
                summary.payload_bytes
            );
        }
        Commands::Decompress { input, output, io } => {
            let codec = HuffmanCodec::new(io.config());
            let default_dir = input.parent().unwrap_or(Path::new("."));
            let (written, summary) = codec
                .decompress_file(&input, output.as_deref(), default_dir)
                .with_context(|| format!("decompressing {}", input.display()))?;
            println!(
                "{} -> {} ({} bytes)",
                input.display(),
                written.display(),
                summary.output_bytes
            );
        }
    }
    Ok(())
}
