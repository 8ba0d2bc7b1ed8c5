//! Command Line Interface (CLI) layer for SIFTILE.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for the single-tile, sub-tile and
//! dataset-build flows. It wires user-provided options to the underlying
//! library functionality exposed via `siftile::api`.
//!
//! If you are embedding SIFTILE into another application, prefer using
//! the high-level `siftile::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
