//! # Archive format
//!
//! Implements the `CORE` / `ADDON` wire format of spec §4.2 and §4.3: a
//! shared little-endian framing layer (`wire`), a lazy, non-decompressing
//! reader (`reader`, component C2), and an offline-tool writer (`writer`,
//! component C3).

pub mod reader;
pub mod wire;
pub mod writer;

pub use reader::{read_addon, read_core, AddonMeta, EntryStream, RawEntry};
pub use writer::{stage_tree, write_addon, write_core, Predicate, Staged};
