//! Reporting-compliance engine for Wikimedia movement affiliates.
//!
//! The crate decodes the portal's table-literal documents, evaluates every
//! affiliate against the out-of-compliance ladder, rewrites the portal
//! documents, and drives talk-page and email outreach. Binaries live in
//! `services/sweep`; everything here is runtime-agnostic except the axum
//! router.

pub mod codec;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use error::AppError;
