//! The `sscc` launcher executable. Thin wrapper over `sscc::launcher`: all
//! of the actual pipeline (argument partitioning, workspace materialise,
//! addon application, spawn, cleanup) lives in the library so it can be
//! exercised directly from integration tests.

use sscc::{addon, error::SsccError, launcher};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let argv: Vec<String> = std::env::args().collect();
    let exit_code = run(&argv);
    std::process::exit(exit_code);
}

fn run(argv: &[String]) -> i32 {
    let action = match launcher::partition(argv) {
        Ok(action) => action,
        Err(SsccError::UsageError(msg)) => {
            eprintln!("Error: {msg}");
            eprintln!("Usage: sscc [options] file...");
            return 2;
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return err.exit_code();
        }
    };

    match action {
        launcher::Action::PrintAndExit(text) => {
            print!("{text}");
            0
        }
        launcher::Action::ListAddons => {
            print_addon_candidates();
            0
        }
        launcher::Action::Launch(plan) => match launcher::launch(&plan) {
            Ok(outcome) => outcome.code(),
            Err(err) => {
                eprintln!("Error: {err}");
                err.exit_code()
            }
        },
    }
}

fn print_addon_candidates() {
    println!("Available addon files:");
    match addon::discover_candidates() {
        Ok(found) if !found.is_empty() => {
            for (path, size) in found {
                println!("  {:<20} ({size} bytes)", path.display());
            }
        }
        Ok(_) => println!("  No addon files found in current directory"),
        Err(err) => eprintln!("Warning: could not scan current directory: {err}"),
    }
}
