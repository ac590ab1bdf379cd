use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ressaf::{BitDepth, EncodeOptions};
use std::fs;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "ssaf")]
#[command(version)]
#[command(about = "SSAF lossless audio converter", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode audio file to SSAF
    Encode {
        /// Input audio file (mp3, wav, flac, ogg, etc.)
        input: PathBuf,
        /// Output SSAF file
        output: PathBuf,
        /// Bit depth (8, 16, 24 or 32; default: source depth or 16)
        #[arg(short, long, value_parser = parse_bits)]
        bits: Option<BitDepth>,
        /// Skip the dither filter
        #[arg(long)]
        no_dither: bool,
    },
    /// Decode SSAF file to WAV
    Decode {
        /// Input SSAF file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
    },
    /// Show information about an SSAF file
    Info {
        /// Input SSAF file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate an SSAF file
    Validate {
        /// Input SSAF file
        input: PathBuf,
    },
    /// Encode and decode an audio file, then compare the results
    Verify {
        /// Input audio file
        input: PathBuf,
        /// Bit depth to verify at
        #[arg(short, long, value_parser = parse_bits)]
        bits: Option<BitDepth>,
        /// Skip the dither filter
        #[arg(long)]
        no_dither: bool,
    },
}

fn parse_bits(s: &str) -> Result<BitDepth, String> {
    let code: u8 = s.parse().map_err(|_| format!("not a number: {}", s))?;
    BitDepth::from_code(code).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Encode {
            input,
            output,
            bits,
            no_dither,
        } => {
            encode(&input, &output, options(bits, no_dither))?;
        }
        Commands::Decode { input, output } => {
            decode(&input, &output)?;
        }
        Commands::Info { input, json } => {
            info(&input, json)?;
        }
        Commands::Validate { input } => {
            validate(&input)?;
        }
        Commands::Verify {
            input,
            bits,
            no_dither,
        } => {
            verify(&input, options(bits, no_dither))?;
        }
    }

    Ok(())
}

fn options(bits: Option<BitDepth>, no_dither: bool) -> EncodeOptions {
    let mut options = EncodeOptions::default();
    if let Some(bits) = bits {
        options = options.with_bits(bits);
    }
    if no_dither {
        options = options.without_dither();
    }
    options
}

fn encode(input: &PathBuf, output: &PathBuf, options: EncodeOptions) -> Result<()> {
    println!("Reading {}...", input.display());

    let audio = ressaf::read_audio_file(input).context("Failed to read audio file")?;
    let depth = options.bits.unwrap_or_else(|| audio.native_depth());

    println!("  Sample rate: {} Hz", audio.sample_rate);
    println!("  Channels: {}", audio.channels);
    println!("  Duration: {:.2}s", audio.duration_secs());
    if let Some(format) = &audio.source_format {
        println!("  Source: {}", format);
    }

    println!("Encoding to SSAF ({}-bit)...", depth.bits());

    let mut buffer = audio.to_buffer(depth)?;
    let pcm_size = buffer.data().len();
    let ssaf_data = ressaf::encode_buffer(&mut buffer, &options).context("Failed to encode audio")?;

    fs::write(output, &ssaf_data).context("Failed to write output file")?;

    let ratio = if ssaf_data.is_empty() {
        0.0
    } else {
        pcm_size as f64 / ssaf_data.len() as f64
    };

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Size: {} bytes ({:.2}x compression)", ssaf_data.len(), ratio);

    Ok(())
}

fn decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());

    let ssaf_data = fs::read(input).context("Failed to read SSAF file")?;

    // Get info first
    let file_info = ressaf::get_ssaf_info(&ssaf_data).context("Invalid SSAF file")?;

    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Channels: {}", file_info.channels);
    println!("  Bit depth: {}", file_info.bit_depth);
    println!("  Duration: {:.2}s", file_info.duration_secs);

    println!("Decoding...");

    let buffer = ressaf::decode_to_buffer(&ssaf_data).context("Failed to decode SSAF file")?;

    println!("Writing WAV...");

    ressaf::write_wav(output, &buffer)?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn info(input: &PathBuf, json: bool) -> Result<()> {
    let ssaf_data = fs::read(input).context("Failed to read SSAF file")?;

    let file_info = ressaf::get_ssaf_info(&ssaf_data).context("Invalid SSAF file")?;

    if json {
        let json_str = serde_json::to_string_pretty(&file_info).context("Failed to serialize info")?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("SSAF Audio File");
    println!("───────────────────────────────");
    println!("  Sample rate: {} Hz", file_info.sample_rate);
    println!("  Channels:    {}", file_info.channels);
    println!("  Bit depth:   {}", file_info.bit_depth);
    println!("  Duration:    {:.2}s", file_info.duration_secs);
    println!("  Samples:     {}", file_info.samples);
    println!("  File size:   {} bytes", file_info.file_size);
    println!("  Compression: {:.2}x", file_info.compression_ratio);
    println!("  Decodes:     {}", if file_info.valid { "yes" } else { "no" });

    for (i, ch) in file_info.channel_info.iter().enumerate() {
        println!();
        println!("Channel {}", i);
        println!("───────────────────────────────");
        println!("  Encoded:     {} residuals", ch.encoded_samples);
        println!(
            "  Zero runs:   {} ({} samples)",
            ch.zero_runs, ch.zero_run_samples
        );
        println!("  Rice blocks: {}", ch.rice_blocks);
        println!("  Data:        {} bytes", ch.data_bytes);
    }

    Ok(())
}

fn validate(input: &PathBuf) -> Result<()> {
    let ssaf_data = fs::read(input).context("Failed to read SSAF file")?;

    let is_valid = ressaf::validate_ssaf(&ssaf_data).context("Validation failed")?;

    if is_valid {
        println!("✓ {} is a valid SSAF file", input.display());
        Ok(())
    } else {
        bail!("✗ {} is not a valid SSAF file", input.display())
    }
}

fn verify(input: &PathBuf, options: EncodeOptions) -> Result<()> {
    println!("Verifying {}...", input.display());

    let audio_bytes = fs::read(input).context("Failed to read input file")?;
    let report = ressaf::verify_round_trip(&audio_bytes, options).context("Round trip failed")?;

    println!("  Bit depth:   {}", report.bit_depth);
    println!("  PCM size:    {} bytes", report.pcm_size);
    println!("  SSAF size:   {} bytes", report.encoded_size);
    println!("  Compression: {:.2}x", report.compression_ratio());
    println!("  Input:       {}", report.input_fingerprint);
    println!("  Decoded:     {}", report.decoded_fingerprint);

    if report.is_lossless() {
        println!("✓ round trip is lossless");
        Ok(())
    } else {
        bail!("✗ decoded audio differs from the encoded input")
    }
}
