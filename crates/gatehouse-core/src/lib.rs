//! # gatehouse-core
//!
//! Core types shared by the Gatehouse access decision engine:
//!
//! - [`AccessRequest`] / [`MutatedRequest`] - the inbound request descriptor
//!   and its post-mutation counterpart
//! - [`Subject`] - the authenticated identity produced by an authenticator
//! - [`Decision`] / [`RejectionStatus`] - the pipeline's final verdict
//! - [`RequestContext`] - per-request state threaded through the pipeline
//! - [`GatehouseError`] - the error taxonomy used across all crates
//!
//! This crate deliberately contains no handler or matching logic; it is the
//! shared vocabulary between the rule layer and the pipeline executor.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod decision;
pub mod error;
pub mod request;
pub mod subject;
pub mod upstream;

pub use context::RequestContext;
pub use decision::{Decision, RejectionStatus};
pub use error::{ErrorCategory, GatehouseError, GatehouseResult};
pub use request::{AccessRequest, MutatedRequest};
pub use subject::Subject;
pub use upstream::Upstream;
