//! Client-side coordination of asynchronous plate recognition.
//!
//! A unit of work is submitted to the backend ([`submit`]), then a single
//! poll loop ([`poll`]) probes for its outcome by correlation id
//! ([`correlate`]) and hands the result to a [`sink::ResultSink`].
//! [`client::GateClient`] owns the "at most one active poll" rule.

pub mod api;
pub mod auth;
pub mod client;
pub mod conf;
pub mod correlate;
pub mod error;
pub mod event;
pub mod poll;
pub mod session;
pub mod sink;
pub mod submit;

pub use client::GateClient;
pub use error::{GateError, Result};
pub use poll::{PollBudget, PollReport};
pub use session::CorrelationId;
pub use sink::{Outcome, ResultSink};
