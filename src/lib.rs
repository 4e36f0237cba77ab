//! # sscc — a self-contained, relocatable C compiler launcher
//!
//! This crate implements the archive format, transient-workspace
//! subsystem, and launcher pipeline described in `spec.md`: a single
//! executable that materialises a complete C toolchain (headers, static
//! libraries, and a back-end compiler executable) into a transient
//! workspace, optionally augments it with user-selected addon archives,
//! and hands off to the back-end compiler with paths rewritten to point
//! at the workspace.
//!
//! ## Key modules
//!
//! - [`codec`]: the compress/decompress façade (C1) over an LZMA-family
//!   codec.
//! - [`archive`]: the `CORE`/`ADDON` wire format — [`archive::reader`] (C2)
//!   and [`archive::writer`] (C3, the offline archive builders).
//! - [`store`]: the backing-store selector (C4) and the [`store::Workspace`]
//!   value it produces.
//! - [`workspace`]: the materialiser (C5) that writes archive entries and
//!   the back-end executable into a `Workspace`.
//! - [`addon`]: the addon loader (C6).
//! - [`launcher`]: argument partitioning, the launch sequence, and exit
//!   status propagation (C7).
//! - [`blobs`]: the embedded `CORE` archive and back-end executable byte
//!   spans produced by `build.rs` (C8).
//! - [`error`]: the [`error::SsccError`] taxonomy shared by every fallible
//!   operation in the crate.

pub mod addon;
pub mod archive;
pub mod blobs;
pub mod codec;
pub mod error;
pub mod fsx;
pub mod launcher;
pub mod store;
pub mod workspace;

pub use error::SsccError;
pub use store::Workspace;
