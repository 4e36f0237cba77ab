//! # Launcher pipeline (C7)
//!
//! Argument partitioning, workspace setup, core/addon materialisation,
//! child spawn, exit-status propagation, and unconditional cleanup (spec
//! §4.7). This module contains no `main`; `src/bin/sscc.rs` is the thin
//! wrapper that calls [`run`] and maps its [`ExitOutcome`] onto
//! `std::process::exit`.

use std::path::PathBuf;
use std::process::Command;

use crate::addon;
use crate::blobs;
use crate::error::SsccError;
use crate::store;
use crate::workspace;

/// The help banner printed for `-h`/`--help`. Kept verbatim close to the
/// original tool's documented surface (SPEC_FULL.md §C.2): the back-end
/// flags it enumerates are pure text here, never parsed by this launcher.
pub const HELP_BANNER: &str = "\
SSCC - Self Sufficient C Compiler
A portable, modular C compiler with addon support

Usage: sscc [options] file...

Modular options:
  --addon FILE    Load addon file (.addon)
  --list-addons   List candidate addon files in the current directory

Common options (passed through to the back-end compiler):
  -o FILE         Output to FILE
  -g              Include debug information
  -O              Optimize code
  -Wall           Enable warnings
  -I DIR          Add include directory
  -L DIR          Add library directory
  -l LIB          Link with library

Core features (always available):
  - Essential C standard library headers
  - Basic libc and libm
  - Back-end compiler runtime library
";

/// Printed for `-v`/`--version`. Stable across releases per spec §7.
pub fn version_banner() -> String {
    format!("sscc {}\n", env!("CARGO_PKG_VERSION"))
}

/// The result of CLI parsing (spec §3, `LaunchPlan`). Immutable once built.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    /// Addon archive paths, in command-line order.
    pub addons: Vec<PathBuf>,
    /// Arguments passed through to the back-end, program name dropped.
    pub pass_through: Vec<String>,
}

/// What the pipeline decided to do after partitioning `argv`.
pub enum Action {
    /// Print this text to stdout and exit 0.
    PrintAndExit(String),
    /// List addon candidates and exit 0 (SPEC_FULL.md §C.1).
    ListAddons,
    /// Proceed with a full launch.
    Launch(LaunchPlan),
}

/// Partitions the original argument vector (spec §4.7): `argv[0]` is the
/// caller's program name, used only for banners; never forwarded to the
/// back-end.
pub fn partition(argv: &[String]) -> Result<Action, SsccError> {
    let mut addons = Vec::new();
    let mut pass_through = Vec::new();

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => return Ok(Action::PrintAndExit(HELP_BANNER.to_string())),
            "-v" | "--version" => return Ok(Action::PrintAndExit(version_banner())),
            "--list-addons" => return Ok(Action::ListAddons),
            "--addon" => {
                let file = argv.get(i + 1).ok_or_else(|| {
                    SsccError::UsageError("--addon requires a FILE argument".to_string())
                })?;
                addons.push(PathBuf::from(file));
                i += 2;
                continue;
            }
            other => pass_through.push(other.to_string()),
        }
        i += 1;
    }

    Ok(Action::Launch(LaunchPlan { addons, pass_through }))
}

/// Exit status to propagate to the OS once the child has run (or never
/// needed to), per spec §6.
pub enum ExitOutcome {
    Code(i32),
    Signalled(i32),
}

impl ExitOutcome {
    pub fn code(&self) -> i32 {
        match self {
            ExitOutcome::Code(c) => *c,
            ExitOutcome::Signalled(sig) => 128 + sig,
        }
    }
}

/// Runs the full launch sequence of spec §4.7 steps 2-9 for an already
/// partitioned [`LaunchPlan`]. Workspace destruction happens on every
/// return path, success or failure.
pub fn launch(plan: &LaunchPlan) -> Result<ExitOutcome, SsccError> {
    let mut ws = store::select()?;
    tracing::info!(kind = ?ws.kind(), root = %ws.root().display(), "workspace created");

    let result = launch_in_workspace(&mut ws, plan);

    let root = ws.root().to_path_buf();
    ws.destroy();
    tracing::info!(root = %root.display(), "workspace destroyed");

    result
}

fn launch_in_workspace(
    ws: &mut store::Workspace,
    plan: &LaunchPlan,
) -> Result<ExitOutcome, SsccError> {
    let core_entries: Vec<_> = blobs::core_archive_entries()?.collect();
    let core_path = std::path::Path::new("<embedded-core>");
    let (files, bytes) = workspace::materialise(ws, core_path, core_entries.into_iter())?;
    println!("Core: {files} files, {bytes} bytes");

    let backend_path = workspace::write_backend(ws, blobs::backend_executable())?;

    addon::apply_all(ws, &plan.addons)?;

    let mut command = Command::new(&backend_path);
    command.arg(format!("-I{}/include", ws.root().display()));
    command.arg(format!("-L{}/lib", ws.root().display()));
    command.arg(format!("-B{}/lib", ws.root().display()));
    command.arg("-static");
    command.args(&plan.pass_through);

    println!("Starting compilation...");
    let mut child = command.spawn().map_err(|source| SsccError::SpawnFailed { source })?;
    let status = child.wait().map_err(|source| SsccError::SpawnFailed { source })?;

    Ok(exit_outcome_of(status))
}

#[cfg(unix)]
fn exit_outcome_of(status: std::process::ExitStatus) -> ExitOutcome {
    use std::os::unix::process::ExitStatusExt;
    if let Some(code) = status.code() {
        ExitOutcome::Code(code)
    } else if let Some(sig) = status.signal() {
        ExitOutcome::Signalled(sig)
    } else {
        ExitOutcome::Code(1)
    }
}

#[cfg(not(unix))]
fn exit_outcome_of(status: std::process::ExitStatus) -> ExitOutcome {
    ExitOutcome::Code(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("sscc".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect()
    }

    #[test]
    fn help_flags_short_circuit() {
        assert!(matches!(partition(&argv(&["-h"])).unwrap(), Action::PrintAndExit(_)));
        assert!(matches!(partition(&argv(&["--help"])).unwrap(), Action::PrintAndExit(_)));
        assert!(matches!(partition(&argv(&["-v"])).unwrap(), Action::PrintAndExit(_)));
    }

    #[test]
    fn list_addons_short_circuits() {
        assert!(matches!(partition(&argv(&["--list-addons"])).unwrap(), Action::ListAddons));
    }

    #[test]
    fn addon_without_argument_is_a_usage_error() {
        let err = partition(&argv(&["--addon"])).unwrap_err();
        assert!(matches!(err, SsccError::UsageError(_)));
    }

    #[test]
    fn collects_addons_in_order_and_leaves_the_rest_pass_through() {
        let plan = match partition(&argv(&[
            "--addon", "a.addon", "hello.c", "--addon", "b.addon", "-o", "hello",
        ]))
        .unwrap()
        {
            Action::Launch(plan) => plan,
            _ => panic!("expected Action::Launch"),
        };
        assert_eq!(plan.addons, vec![PathBuf::from("a.addon"), PathBuf::from("b.addon")]);
        assert_eq!(plan.pass_through, vec!["hello.c", "-o", "hello"]);
    }

    #[test]
    fn exit_outcome_maps_signal_to_128_plus_signal() {
        assert_eq!(ExitOutcome::Code(42).code(), 42);
        assert_eq!(ExitOutcome::Signalled(15).code(), 143);
    }
}
