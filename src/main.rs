//! CLI entry point for `mhtunpack`.

use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use mhtunpack::error::MhtError;
use mhtunpack::export::{files, inline};
use mhtunpack::parser::multipart::MhtmlParser;
use mhtunpack::trace::Trace;

#[derive(Parser)]
#[command(
    name = "mhtunpack",
    version,
    about = "Convert an MHTML (.mht) web archive into standalone HTML"
)]
struct Cli {
    /// MHT archive to convert
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Produce a single self-contained HTML file with resources inlined
    /// as data: URIs, instead of extracting them to an images/ directory
    #[arg(short, long)]
    inline: bool,

    /// Output HTML path (defaults to the input path with an .html extension)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the decode trace to stderr after conversion
    #[arg(long)]
    trace: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.input.exists() {
        return Err(MhtError::FileNotFound(cli.input.clone()).into());
    }

    let raw = std::fs::read(&cli.input).map_err(|e| MhtError::io(&cli.input, e))?;
    let archive = decode_archive_bytes(&raw);

    let parser = MhtmlParser::new();
    let mut trace = Trace::new();
    let parts = parser.decompress_traced(&archive, &mut trace)?;

    if cli.trace {
        for event in trace.events() {
            eprintln!("{event}");
        }
    }

    if parts.is_empty() {
        println!("  No sections found in archive.");
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("html"));

    if cli.inline {
        cmd_inline(&parts, &output)
    } else {
        cmd_extract(&parts, &output)
    }
}

/// Set up tracing to stderr, with `-v` count driving the default level.
fn setup_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Decode the archive bytes leniently: strip a UTF-8 BOM, try UTF-8, fall
/// back to Windows-1252 (which accepts every byte).
fn decode_archive_bytes(bytes: &[u8]) -> String {
    let bytes = if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &bytes[3..]
    } else {
        bytes
    };

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Write a single self-contained HTML document.
fn cmd_inline(parts: &[mhtunpack::model::part::Part], output: &Path) -> anyhow::Result<()> {
    let html = inline::reassemble(parts, false)?;
    std::fs::write(output, &html).map_err(|e| MhtError::io(output, e))?;

    println!("  Wrote inline HTML to {}", output.display());
    Ok(())
}

/// Write the HTML document plus an images/ directory of resources.
fn cmd_extract(parts: &[mhtunpack::model::part::Part], output: &Path) -> anyhow::Result<()> {
    let resource_count = parts.len().saturating_sub(1);
    if resource_count > 0 {
        println!("  {resource_count} resource(s) found.");
    }

    let pb = ProgressBar::new(resource_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Extracting [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let summary = files::export_resources(
        parts,
        output,
        Some(&|current, total| {
            pb.set_length(total as u64);
            pb.set_position(current as u64);
        }),
    )?;

    pb.finish_and_clear();

    println!(
        "  Wrote {} and {} resource file(s).",
        summary.html_path.display(),
        summary.resources.len()
    );
    Ok(())
}
