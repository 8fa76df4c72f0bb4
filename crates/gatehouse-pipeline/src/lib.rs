//! # gatehouse-pipeline
//!
//! The execution half of Gatehouse: polymorphic handler traits
//! ([`Authenticator`], [`Authorizer`], [`Mutator`]), the
//! [`HandlerRegistry`] that maps rule handler kinds to implementations, the
//! built-in handler roster, and the [`PipelineExecutor`] that drives one
//! request through match, authentication, authorization, and mutation.
//!
//! The executor is a strictly forward state machine; every exit produces a
//! [`Decision`](gatehouse_core::Decision) and the pipeline fails closed at
//! every stage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authn;
pub mod authz;
pub mod executor;
pub mod handler;
pub mod mutate;
pub mod registry;

pub use executor::{PipelineExecutor, PipelineStage};
pub use handler::{
    AuthnOutcome, AuthzOutcome, Authenticator, Authorizer, BoxFuture, Mutator,
};
pub use registry::HandlerRegistry;
