#![cfg_attr(docsrs, feature(doc_cfg))]
//! Data model and verdict engine shared by the rollgate driver and runtime.
//!
//! Everything in this crate is pure: outcomes come in, a [`PerformanceReport`] with a
//! [`Verdict`] comes out.

mod config;
mod constants;
mod outcome;
mod report;
mod stats;
mod thresholds;

pub use config::*;
pub use constants::*;
pub use outcome::*;
pub use report::*;
pub use stats::*;
pub use thresholds::*;
