//! Offline `ADDON` archive builder (spec §4.3, component C3). Mirrors
//! `original_source/src/create_addon.c`: walks a staging directory's
//! `include/` and `lib/` subtrees and emits a framed `ADDON` blob carrying
//! a user-visible name and description.
//!
//! One of two predicate families selects which files are retained —
//! exactly the pair spec §4.3 allows an addon builder to use (never
//! mixed):
//!
//! - `--exclude-core-basenames FILE`: read an already-built `CORE`
//!   archive and retain only files whose basename is absent from it, so
//!   the addon never ships a file the core already ships.
//! - `--pattern SUBSTR` (repeatable): retain only files whose basename
//!   contains one of the given substrings.
//!
//! Files over 2 MiB are skipped with a warning (the addon ceiling; core
//! archives have none).

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use sscc::archive::writer::{core_basenames, stage_tree, write_addon, Predicate, ADDON_SIZE_CEILING};

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds an ADDON archive from a staging directory", long_about = None)]
struct Args {
    /// Staging directory containing `include/` and/or `lib/` subtrees.
    #[arg(long)]
    root: PathBuf,

    /// Path to write the resulting ADDON archive to.
    #[arg(short, long)]
    output: PathBuf,

    /// User-visible addon name.
    #[arg(long)]
    name: String,

    /// User-visible addon description.
    #[arg(long)]
    description: String,

    /// An already-built CORE archive; files whose basename appears in it
    /// are excluded from this addon. Mutually exclusive with `--pattern`.
    #[arg(long, conflicts_with = "pattern")]
    exclude_core_basenames: Option<PathBuf>,

    /// Retain only files whose basename contains this substring
    /// (repeatable). Mutually exclusive with `--exclude-core-basenames`.
    #[arg(long, conflicts_with = "exclude_core_basenames")]
    pattern: Vec<String>,
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let excluded: HashSet<String>;
    let predicate = if let Some(core_path) = &args.exclude_core_basenames {
        let core_bytes = match std::fs::read(core_path) {
            Ok(b) => b,
            Err(err) => {
                eprintln!("Error: failed to read '{}': {err}", core_path.display());
                return std::process::ExitCode::FAILURE;
            }
        };
        excluded = match core_basenames(&core_bytes) {
            Ok(set) => set,
            Err(err) => {
                eprintln!("Error: failed to parse '{}': {err}", core_path.display());
                return std::process::ExitCode::FAILURE;
            }
        };
        Predicate::ExcludeBasenames(&excluded)
    } else if !args.pattern.is_empty() {
        Predicate::PatternMatch(&args.pattern)
    } else {
        Predicate::IncludeAll
    };

    let staged = match stage_tree(&args.root, &predicate, Some(ADDON_SIZE_CEILING)) {
        Ok(staged) => staged,
        Err(err) => {
            eprintln!("Error: failed to walk '{}': {err}", args.root.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    let bytes = match write_addon(&args.name, &args.description, &staged) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Error: failed to compress staged files: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    if let Err(err) = std::fs::write(&args.output, &bytes) {
        eprintln!("Error: failed to write '{}': {err}", args.output.display());
        return std::process::ExitCode::FAILURE;
    }

    println!(
        "Wrote addon '{}' ({} files, {} bytes) to {}",
        args.name,
        staged.len(),
        bytes.len(),
        args.output.display()
    );
    std::process::ExitCode::SUCCESS
}
