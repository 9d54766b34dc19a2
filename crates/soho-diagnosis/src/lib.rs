//! SOHO diagnosis: credit grading, loan-limit estimation and policy-fund matching for
//! small-business loan applicants.
//!
//! The engine in [`diagnosis`] is pure and synchronous. Everything else in the crate
//! (configuration, telemetry, the HTTP router) is the thin shell the API service wires
//! around it.

pub mod config;
pub mod diagnosis;
pub mod error;
pub mod telemetry;
pub mod verification;
