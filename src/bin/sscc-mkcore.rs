//! Offline `CORE` archive builder (spec §4.3, component C3). Walks a
//! staging directory's `include/` and `lib/` subtrees, retains every
//! regular file (core archives have no size ceiling), compresses each at
//! the highest LZMA preset, and writes a framed `CORE` blob. This is the
//! same staging logic `build.rs` runs at compile time for the embedded
//! core; this binary exists so a distributor can also produce a
//! stand-alone `CORE` archive (e.g. to ship as an `--addon`-compatible
//! base, or to rebuild the embedded one outside of `cargo build`).

use std::path::PathBuf;

use clap::Parser;
use sscc::archive::writer::{stage_tree, write_core, Predicate};

#[derive(Parser, Debug)]
#[command(author, version, about = "Builds a CORE archive from a staging directory", long_about = None)]
struct Args {
    /// Staging directory containing `include/` and/or `lib/` subtrees.
    #[arg(long)]
    root: PathBuf,

    /// Path to write the resulting CORE archive to.
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let staged = match stage_tree(&args.root, &Predicate::IncludeAll, None) {
        Ok(staged) => staged,
        Err(err) => {
            eprintln!("Error: failed to walk '{}': {err}", args.root.display());
            return std::process::ExitCode::FAILURE;
        }
    };

    if staged.is_empty() {
        eprintln!(
            "Warning: no files found under '{}'/include or /lib",
            args.root.display()
        );
    }

    let bytes = match write_core(&staged) {
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
        "Wrote {} ({} files, {} bytes) to {}",
        "CORE archive",
        staged.len(),
        bytes.len(),
        args.output.display()
    );
    std::process::ExitCode::SUCCESS
}
