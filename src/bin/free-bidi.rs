//! free-bidi CLI
//!
//! Turn legacy RTL code page sources into marked UTF-8 shadow files and write
//! them back (similar to what an editor integration does on open and save).

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use free_bidi::shadow::{
    from_shadow_bytes, is_shadow_path, is_supported_source, original_path, shadow_path, to_shadow_bytes,
    SHADOW_DIR,
};
use free_bidi::{
    reverse_transform, BidiConfig, Decoder, Diagnostic, DiagnosticSink, Document, DocumentError, EncodingProfile,
    NullSink, ScriptRange, TracingSink,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "free-bidi")]
#[command(version)]
#[command(about = "Edit legacy RTL code page sources as marked UTF-8")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Encoding of the source files (default: ISO-8859-8)
    #[arg(short = 'e', long, env = "FREEBIDI_RTL_ENCODING", global = true)]
    encoding: Option<String>,

    /// Encoding to try when the primary one does not fit (repeatable)
    #[arg(long = "fallback", global = true)]
    fallbacks: Vec<String>,

    /// RTL script range such as 0590-05FF (repeatable, replaces the defaults)
    #[arg(long = "script-range", global = true)]
    script_ranges: Vec<ScriptRange>,
}

impl ConfigArgs {
    fn to_config(&self) -> BidiConfig {
        BidiConfig {
            encoding: self.encoding.clone(),
            fallback_encodings: self.fallbacks.clone(),
            script_ranges: self.script_ranges.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode source files and write marked UTF-8 shadow files
    Open {
        /// Source files and directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Regenerate shadow files that already exist
        #[arg(short, long)]
        force: bool,

        /// Accept any file extension, not only COBOL sources
        #[arg(long)]
        any_extension: bool,
    },

    /// Write shadow files back over their originals in the legacy encoding
    Save {
        /// Shadow files (or the originals they shadow)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Delete each shadow file after a successful save
        #[arg(long)]
        remove_shadow: bool,
    },

    /// Mark legacy bytes from stdin, writing UTF-8 to stdout
    Mark {
        /// Prefix the output with a UTF-8 byte-order mark
        #[arg(long)]
        bom: bool,
    },

    /// Strip marks from UTF-8 on stdin, writing legacy bytes to stdout
    Strip,

    /// Report which encoding fits each file
    Probe {
        /// Files to inspect
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.to_config();
    let decoder = Decoder::from_config(&config, &mut TracingSink);

    match cli.command {
        Commands::Open { inputs, force, any_extension } => {
            open_sources(&decoder, &inputs, force, any_extension)?;
        }
        Commands::Save { inputs, remove_shadow } => {
            save_shadows(&decoder, &inputs, remove_shadow)?;
        }
        Commands::Mark { bom } => {
            mark_stdin(&decoder, bom)?;
        }
        Commands::Strip => {
            strip_stdin(&decoder)?;
        }
        Commands::Probe { inputs } => {
            probe_files(&decoder, &inputs)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn collect_sources(inputs: &[PathBuf], any_extension: bool) -> Vec<PathBuf> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let entries = walkdir::WalkDir::new(input)
                .into_iter()
                .filter_entry(|e| e.file_name() != SHADOW_DIR)
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file());
            for entry in entries {
                if any_extension || is_supported_source(entry.path()) {
                    sources.push(entry.into_path());
                }
            }
        } else if is_shadow_path(input) {
            tracing::info!("Skipping shadow file: {}", input.display());
        } else if any_extension || is_supported_source(input) {
            sources.push(input.clone());
        } else {
            tracing::info!("Skipping unsupported file: {}", input.display());
        }
    }

    sources
}

fn open_sources(decoder: &Decoder, inputs: &[PathBuf], force: bool, any_extension: bool) -> Result<()> {
    for path in collect_sources(inputs, any_extension) {
        let shadow = shadow_path(&path)
            .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", path.display()))?;

        if shadow.exists() && !force {
            tracing::info!("Found existing shadow: {}", shadow.display());
            println!("{}", shadow.display());
            continue;
        }

        let bytes = fs::read(&path).with_context(|| format!("Failed to read file: {}", path.display()))?;

        let document = match Document::open(&path, &bytes, decoder, &mut TracingSink) {
            Ok(document) => document,
            Err(DocumentError::Decode { .. }) => {
                tracing::info!("Left untouched: {}", path.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(dir) = shadow.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Failed to create: {}", dir.display()))?;
        }
        fs::write(&shadow, document.shadow_bytes())
            .with_context(|| format!("Failed to write: {}", shadow.display()))?;

        tracing::info!(
            "Saved UTF-8 file with BOM: {} (encoding: {})",
            shadow.display(),
            document.profile()
        );
        println!("{}", shadow.display());
    }

    Ok(())
}

/// Profile the original was opened with: the first candidate that fits it
fn profile_for_original(decoder: &Decoder, original: &Path) -> EncodingProfile {
    fs::read(original)
        .ok()
        .and_then(|bytes| decoder.decode(&bytes, &mut NullSink).ok())
        .map(|decoded| decoded.profile)
        .unwrap_or_else(|| decoder.primary().clone())
}

fn save_shadows(decoder: &Decoder, inputs: &[PathBuf], remove_shadow: bool) -> Result<()> {
    let mut failures = Vec::new();

    for input in inputs {
        let (shadow, original) = match original_path(input) {
            Some(original) => (input.clone(), original),
            None => {
                let shadow = shadow_path(input)
                    .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", input.display()))?;
                (shadow, input.clone())
            }
        };

        let bytes = fs::read(&shadow).with_context(|| format!("Failed to read: {}", shadow.display()))?;
        let profile = profile_for_original(decoder, &original);
        let mut document = Document::from_shadow(&original, &bytes, profile)?;

        match document.save(&mut TracingSink) {
            Ok(encoded) => {
                fs::write(&original, encoded)
                    .with_context(|| format!("Failed to write: {}", original.display()))?;
                tracing::info!(
                    "Saved original file: {} (encoding: {})",
                    original.display(),
                    document.profile()
                );
                if remove_shadow {
                    fs::remove_file(&shadow)
                        .with_context(|| format!("Failed to delete: {}", shadow.display()))?;
                }
            }
            Err(e) => failures.push(e.to_string()),
        }
    }

    if !failures.is_empty() {
        bail!("{} file(s) not saved:\n  {}", failures.len(), failures.join("\n  "));
    }

    Ok(())
}

fn mark_stdin(decoder: &Decoder, bom: bool) -> Result<()> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes)?;

    let decoded = decoder
        .decode(&bytes, &mut TracingSink)
        .context("Input was not transformed")?;

    let output = if bom {
        to_shadow_bytes(&decoded.text)
    } else {
        decoded.text.into_string().into_bytes()
    };
    io::stdout().write_all(&output)?;

    Ok(())
}

fn strip_stdin(decoder: &Decoder) -> Result<()> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes)?;

    let text = from_shadow_bytes(&bytes)?;
    let encoded = match reverse_transform(&text, decoder.primary()) {
        Ok(encoded) => encoded,
        Err(reason) => {
            TracingSink.report(Diagnostic::EncodeFailed {
                document: "<stdin>".to_string(),
                reason: reason.clone(),
            });
            return Err(reason.into());
        }
    };
    io::stdout().write_all(&encoded)?;

    Ok(())
}

fn probe_files(decoder: &Decoder, inputs: &[PathBuf]) -> Result<()> {
    for path in inputs {
        let bytes = fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;

        match decoder.decode(&bytes, &mut NullSink) {
            Ok(decoded) => println!(
                "{}\t{}\t{} run(s)",
                path.display(),
                decoded.profile,
                decoded.text.mark_count()
            ),
            Err(reason) => println!("{}\t-\t{}", path.display(), reason),
        }
    }

    Ok(())
}
