//! Library crate for mdu
//!
//! `mdu` sums the allocated blocks of one or more files or directory trees,
//! spreading the directory traversal over a fixed pool of worker threads.
//!
//! # Features
//!
//! - **Per-root work stacks**: each input path is drained depth-first from its own stack
//! - **Blocking termination detection**: idle workers park on a wake signal and are
//!   released by new work or by the root becoming provably exhausted
//! - **Partial-failure tolerance**: unreadable paths are reported and skipped; the first
//!   OS error code is kept for the exit status
//!
//! # Modules
//!
//! - [`engine`]: Worker pool and the [`Engine`] facade
//! - [`root`]: Per-root shared state and termination detection
//! - [`expand`]: The directory expander
//! - [`stack`]: The per-root LIFO work stack
//! - [`data`]: Core data structures (`WorkItem`, `RootTotal`, `ScanReport`)
//! - [`error`]: Error types and the first-error slot
//! - [`metrics`]: Scan counters and profiling helpers
//! - [`cli`]: Command-line interface definitions
//! - [`output`]: Terminal and CSV renderers
//! - [`utils`]: `lstat`, block conversion, exit status

pub mod cli;
pub mod data;
pub mod engine;
pub mod error;
pub mod expand;
pub mod metrics;
pub mod output;
pub mod root;
pub mod stack;
pub mod utils;

pub use cli::Args;
pub use data::{RootTotal, ScanReport};
pub use engine::Engine;
pub use error::{EngineError, ScanError};
