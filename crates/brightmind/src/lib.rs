//! Core of the BrightMind self-assessment service.
//!
//! [`assessment`] walks the questionnaire and scores it, [`contact`] posts the
//! contact form to the intake API, and [`intake`] is that API.

pub mod assessment;
pub mod config;
pub mod contact;
pub mod error;
pub mod intake;
pub mod telemetry;
