//! CLI tool for synthesizing slide decks that follow a template's look.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::content::blocks_from_response;
use deck_core::{
    build_deck, fallback_blocks, BuiltManifest, ContentBlock, ManifestBuilder, MemoryDeck,
    RawTemplateData, SynthesisPolicy,
};
use deck_pptx::TemplateExtractor;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build a slide deck from content, styled and laid out by a PowerPoint template.
#[derive(Parser, Debug)]
#[command(name = "deck-synth")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Template file (.pptx or .potx)
    template: PathBuf,

    /// Content plan: JSON `{presentation_title, slides}` or a bare slide array
    #[arg(short, long, required_unless_present = "text")]
    content: Option<PathBuf>,

    /// Plain text to chunk into slides when no usable content plan is given
    #[arg(short, long)]
    text: Option<PathBuf>,

    /// Normalized manifest JSON to use instead of the built-in fallback
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output file (default: <template stem>.deck.json next to the template)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the deck to stdout instead of writing to file
    #[arg(short, long)]
    print: bool,

    /// Body length (characters) above which a two-content layout is preferred
    #[arg(long, default_value_t = deck_core::config::TWO_CONTENT_MIN_CHARS)]
    two_content_threshold: usize,

    /// Leave speaker notes off the slides
    #[arg(long)]
    no_notes: bool,

    /// Also write the manifest that drove synthesis
    #[arg(long)]
    emit_manifest: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.verbose {
        eprintln!("Template: {}", args.template.display());
    }

    let raw = TemplateExtractor::new()
        .extract_file(&args.template)
        .with_context(|| format!("Failed to read template {}", args.template.display()))?;

    let built = load_manifest(&raw, args.manifest.as_deref())?;
    let blocks = load_blocks(&args)?;

    let policy = SynthesisPolicy::new()
        .with_two_content_min_chars(args.two_content_threshold)
        .with_speaker_notes(!args.no_notes);

    let mut deck = MemoryDeck::from_template(&raw);
    let build =
        build_deck(&mut deck, &built, blocks, policy).context("Deck synthesis failed")?;

    if args.verbose {
        let summary = &build.manifest;
        eprintln!(
            "  Manifest: {:?}, {} colors, {} fonts, {} layouts, {} assets",
            summary.source, summary.colors, summary.fonts, summary.layouts, summary.assets
        );
        for slide in &build.report.slides {
            eprintln!(
                "  Slide {}: '{}' -> layout {}{}",
                slide.index + 1,
                slide.title,
                slide.layout_index,
                if slide.substituted { " (substituted)" } else { "" }
            );
        }
    }
    if !build.report.events.is_empty() {
        eprintln!(
            "{} slides built with {} degraded step(s)",
            build.report.slides.len(),
            build.report.events.len()
        );
    }

    let output_path = get_output_path(&args.template, args.output.as_deref());

    if args.emit_manifest {
        let manifest_path = output_path.with_extension("manifest.json");
        let json = serde_json::to_vec_pretty(&built.manifest).context("Failed to encode manifest")?;
        write_output(&manifest_path, &json)?;
        if args.verbose {
            eprintln!("Manifest written to: {}", manifest_path.display());
        }
    }

    if args.print {
        std::io::stdout()
            .write_all(&build.bytes)
            .context("Failed to write to stdout")?;
    } else {
        write_output(&output_path, &build.bytes)?;
        if args.verbose {
            eprintln!("Written to: {}", output_path.display());
        }
    }

    Ok(())
}

/// Validate a manifest file if one was given; otherwise use the fallback.
fn load_manifest(raw: &RawTemplateData, path: Option<&Path>) -> Result<BuiltManifest> {
    let candidate = path
        .map(|p| fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display())))
        .transpose()?;
    Ok(ManifestBuilder::new().build(raw, candidate.as_deref()))
}

/// Content blocks from a content plan, falling back to chunked text.
fn load_blocks(args: &Args) -> Result<Vec<ContentBlock>> {
    let text = args
        .text
        .as_deref()
        .map(|p| fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display())))
        .transpose()?;

    let blocks = match &args.content {
        Some(path) => {
            let response = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let source = text.as_deref().unwrap_or(&response);
            blocks_from_response(&response, source)
        }
        None => fallback_blocks(text.as_deref().unwrap_or_default()),
    };

    log::debug!("Loaded {} content blocks", blocks.len());
    Ok(blocks)
}

/// Determine the output path for the synthesized deck.
fn get_output_path(template: &Path, output: Option<&Path>) -> PathBuf {
    if let Some(path) = output {
        return path.to_path_buf();
    }

    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_filename = format!("{}.deck.json", stem);

    match template.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

/// Write output to a file, creating its directory if needed.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
