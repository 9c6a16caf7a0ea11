//! diglot - parallel alignment of classical text editions
//!
//! A CLI tool for aligning TEI editions of a classical text with their
//! translations into parallel passages.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use diglot::corpus_config::{CorpusConfig, CONFIG_FILE_NAME};
use diglot::patch::{ChangeKind, PatchEntry, PatchSet};
use diglot::pipeline::{self, export};
use diglot::{walker, EditionAligner};
use std::path::{Path, PathBuf};

/// Main entry point for the diglot CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            path,
            source_language,
            target_language,
            force,
        } => {
            handle_init_command(path, &source_language, &target_language, force)?;
        }

        Commands::Align {
            input,
            output,
            verbose,
        } => {
            handle_align_command(&input, &output, verbose)?;
        }

        Commands::Keys {
            file,
            config,
            language,
        } => {
            handle_keys_command(&file, config, language)?;
        }

        Commands::CheckPatches { file } => {
            handle_check_patches_command(&file)?;
        }
    }

    Ok(())
}

/// Handle the init command
fn handle_init_command(
    path: Option<PathBuf>,
    source_language: &str,
    target_language: &str,
    force: bool,
) -> Result<()> {
    let target_path = path.unwrap_or_else(|| PathBuf::from("."));

    // Create the target directory if it doesn't exist
    if !target_path.exists() {
        std::fs::create_dir_all(&target_path)
            .with_context(|| format!("Failed to create directory {}", target_path.display()))?;
    }

    let config_path = target_path.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it",
            config_path.display()
        );
    }

    CorpusConfig::new(source_language, target_language)
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("✓ Wrote {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Place <textgroup>.<work>.<edition>-<lang><version>.xml editions next to it");
    println!("  2. Optionally set 'patch_file' in {}", CONFIG_FILE_NAME);
    println!("  3. Run 'diglot align' to generate the aligned output");

    Ok(())
}

/// Handle the align command
fn handle_align_command(input: &Path, output: &Path, verbose: bool) -> Result<()> {
    // Initialize logging if verbose
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    println!("Aligning corpus...");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());

    // Stage 1: Discover editions
    println!("\n[Stage 1/3] Discovering editions...");
    let corpus = pipeline::discover(input)
        .with_context(|| format!("Failed to discover corpus in {}", input.display()))?;

    println!(
        "✓ Found {} document pairs ({} -> {}), {} patch entries",
        corpus.listing.pairs.len(),
        corpus.config.source_language,
        corpus.config.target_language,
        corpus.patches.len()
    );
    for document_id in &corpus.listing.unpaired {
        println!("  - skipped {}: source or target edition missing", document_id);
    }

    // Stage 2: Align document pairs
    println!("\n[Stage 2/3] Aligning documents...");
    let report = pipeline::align_corpus(&corpus).context("Failed to align corpus")?;

    for document in &report.aligned {
        println!(
            "✓ {}: {} passages ({} untranslated), {} warnings",
            document.document_id,
            document.passages.len(),
            document.untranslated(),
            document.warnings.len()
        );
        if verbose {
            for warning in &document.warnings {
                println!("    warning: {}", warning);
            }
        }
    }

    // Stage 3: Export
    println!("\n[Stage 3/3] Exporting to JSON...");
    for document in &report.aligned {
        let path = export::to_json(document, output)
            .with_context(|| format!("Failed to export {}", document.document_id))?;
        println!("✓ Successfully wrote: {}", path.display());
    }

    if report.has_failures() {
        eprintln!("\n{} documents failed:", report.failures.len());
        for (document_id, error) in &report.failures {
            eprintln!("  ✗ {}: {}", document_id, error);
        }
        anyhow::bail!(
            "{} of {} documents failed to align",
            report.failures.len(),
            report.failures.len() + report.aligned.len()
        );
    }

    println!("\n✓ Alignment completed successfully!");

    Ok(())
}

/// Handle the keys command
fn handle_keys_command(file: &Path, config: Option<PathBuf>, language: Option<String>) -> Result<()> {
    let config = match config {
        Some(path) => CorpusConfig::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CorpusConfig::new("lat", "eng"),
    };

    let language = language
        .or_else(|| walker::classify(file).map(|edition| edition.language))
        .unwrap_or_else(|| config.source_language.clone());

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let aligner = EditionAligner::new(&config).context("Invalid configuration patterns")?;
    let edition = aligner
        .index_edition(file, &content, &language)
        .with_context(|| format!("Failed to index {}", file.display()))?;

    println!("{} ({})", edition.metadata.title, language);
    if let Some(author) = &edition.metadata.author {
        println!("by {}", author);
    }
    println!();
    for key in edition.index.keys_in_order() {
        println!("  {} ({} paragraphs)", key, edition.index.content(key).len());
    }

    Ok(())
}

/// Handle the check-patches command
fn handle_check_patches_command(file: &Path) -> Result<()> {
    let patches = PatchSet::load(file).with_context(|| format!("Invalid patch file {}", file.display()))?;

    println!("✓ {} entries in {}", patches.len(), file.display());
    for document in patches.documents() {
        let entries = patches.entries(document);
        let count = |change: ChangeKind| {
            entries
                .iter()
                .filter(|e| matches!(e, PatchEntry::Structural(p) if p.change == change))
                .count()
        };
        let text = entries
            .iter()
            .filter(|e| matches!(e, PatchEntry::Text(_)))
            .count();
        println!(
            "  {}: {} adds, {} removes, {} text patches",
            document,
            count(ChangeKind::Add),
            count(ChangeKind::Remove),
            text
        );
    }

    Ok(())
}
