//! Climate-risk scoring for loan underwriting.
//!
//! The [`scoring`] module holds the risk engines and their data contracts; [`assessment`]
//! is the HTTP boundary that validates requests and hands normalized features to whichever
//! engine was installed at startup.

pub mod assessment;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
