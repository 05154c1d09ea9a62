//! # Crash Report Assembler
//!
//! Turns a crash-year selection into a [`CrashReport`]: slices the index and
//! every sector to the crash window, runs the analytics over them, and bundles
//! the results for presentation. It owns no arithmetic of its own.

pub mod error;
pub mod report;

pub use error::ReportError;
pub use report::{CrashReport, ReportAssembler, SectorPerformance};
