mod config;
mod export;

use crate::config::DisassemblerConfig;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use z80_dasm::{Architecture, ListingOptions, ListingStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Address, raw bytes and instruction columns
    Listing,
    /// Assembly source without address or byte columns
    Source,
    Json,
    /// Re-export the input image as Intel HEX
    Ihex,
}

impl From<ListingStyle> for OutputFormat {
    fn from(style: ListingStyle) -> Self {
        match style {
            ListingStyle::Listing => Self::Listing,
            ListingStyle::Source => Self::Source,
        }
    }
}

#[derive(Debug, Parser)]
#[command(version, about = "Disassembler for flat Z80 / 8080 / 8085 binary images")]
struct Args {
    /// Binary image file path
    #[arg(short = 'f', long)]
    file_path: PathBuf,

    /// Target architecture (z80 / 8080 / 8085) [default: config value or z80]
    #[arg(short = 'a', long)]
    arch: Option<Architecture>,

    /// Address of the first byte of the image: $1234, 0x1234, 1234h, or decimal [default: config
    /// value or 0]
    #[arg(short = 'o', long, value_parser = parse_origin)]
    origin: Option<u16>,

    /// Output format [default: config listing style]
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Write output to this path instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// TOML config file; command-line options take precedence over its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Omit instruction comments and warnings
    #[arg(long, default_value_t)]
    no_comments: bool,

    /// Omit "referenced from" lines above labels
    #[arg(long, default_value_t)]
    no_references: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settings {
    architecture: Architecture,
    origin: u16,
    format: OutputFormat,
    listing: ListingOptions,
}

impl Args {
    fn settings(&self, config: DisassemblerConfig) -> Settings {
        let format = self.format.unwrap_or(config.listing.style.into());

        let mut listing = config.listing;
        match format {
            OutputFormat::Listing => listing.style = ListingStyle::Listing,
            OutputFormat::Source => listing.style = ListingStyle::Source,
            OutputFormat::Json | OutputFormat::Ihex => {}
        }
        if self.no_comments {
            listing.comments = false;
        }
        if self.no_references {
            listing.references = false;
        }

        Settings {
            architecture: self.arch.unwrap_or(config.architecture),
            origin: self.origin.unwrap_or(config.origin),
            format,
            listing,
        }
    }
}

fn parse_origin(s: &str) -> Result<u16, String> {
    let s = s.trim();

    let hex_digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
        .or_else(|| s.strip_suffix('h'))
        .or_else(|| s.strip_suffix('H'));
    let (digits, radix) = match hex_digits {
        Some(digits) => (digits, 16),
        None => (s, 10),
    };

    let value = u32::from_str_radix(digits, radix)
        .map_err(|err| format!("invalid address '{s}': {err}"))?;
    u16::try_from(value).map_err(|_| format!("address '{s}' is outside the 16-bit address space"))
}

fn render(binary: &[u8], settings: &Settings) -> anyhow::Result<String> {
    if settings.format == OutputFormat::Ihex {
        let text = intel_hex::encode(binary, settings.origin)?;

        let decoded = intel_hex::decode(&text)?;
        anyhow::ensure!(
            decoded.base_address == settings.origin && decoded.data == binary,
            "Intel HEX output does not reproduce the input image"
        );

        return Ok(text);
    }

    let disassembly = z80_dasm::disassemble(binary, settings.origin, settings.architecture)?;

    log::info!(
        "Decoded {} instructions with {} labels",
        disassembly.entries().len(),
        disassembly.labels().len()
    );

    match settings.format {
        OutputFormat::Json => {
            export::to_json(&disassembly).context("Unable to serialize disassembly to JSON")
        }
        OutputFormat::Listing | OutputFormat::Source | OutputFormat::Ihex => {
            Ok(z80_dasm::listing::render(&disassembly, settings.listing))
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DisassemblerConfig::from_file(path)?,
        None => DisassemblerConfig::default(),
    };
    let settings = args.settings(config);

    let binary = fs::read(&args.file_path)
        .with_context(|| format!("Unable to read '{}'", args.file_path.display()))?;

    log::info!(
        "Disassembling {} bytes from '{}' at ${:04X} for {}",
        binary.len(),
        args.file_path.display(),
        settings.origin,
        settings.architecture
    );

    let output = render(&binary, &settings)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output)
                .with_context(|| format!("Unable to write output to '{}'", path.display()))?;
            log::info!("Wrote output to '{}'", path.display());
        }
        None => {
            io::stdout()
                .lock()
                .write_all(output.as_bytes())
                .context("Unable to write to stdout")?;
        }
    }

    Ok(())
}
