//! Command handlers.
//!
//! One function per command, each taking the shared [`Primitives`] and
//! returning an [`Output`](crate::Output).
//!
//! [`Primitives`]: crate::bridge::Primitives

pub mod entity;
pub mod lifecycle;
pub mod query;
