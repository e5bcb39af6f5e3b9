#![cfg_attr(docsrs, feature(doc_cfg))]
//! Wave-paced load driver for post-deployment performance gates.
//!
//! A [`LoadTest`] sends one request per logical client per wave against a target, paces waves
//! on a fixed cadence for a fixed duration, and hands back every [`RequestOutcome`] it
//! recorded. Reduce those with [`PerformanceReport::reduce`] to get a verdict.
//!
//! [`RequestOutcome`]: rollgate_core::RequestOutcome
//! [`PerformanceReport::reduce`]: rollgate_core::PerformanceReport::reduce

pub mod error;
pub mod probe;
#[doc(hidden)]
pub mod transaction;

pub(crate) mod timer;
pub(crate) mod wave;

pub use error::{DriverError, ProbeError};
pub use load_test::{ConfigurableLoadTest, LoadRun, LoadTest};
pub use probe::{HttpProbe, Probe};

pub mod prelude {
    pub use crate::error::{DriverError, ProbeError};
    pub use crate::load_test::{ConfigurableLoadTest, LoadRun, LoadTest};
    pub use crate::probe::{HttpProbe, Probe};

    pub use rollgate_core::{
        PerformanceReport, RequestOutcome, RunConfig, Thresholds, Verdict,
    };
    pub use tokio_util::sync::CancellationToken;
}
