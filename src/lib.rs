//! Find open ports on the local host and the processes that own them.
//!
//! The flow is one-shot: a [`system::ConnectionSource`] captures a
//! [`model::Snapshot`], [`pipeline`] filters and enriches it through a
//! [`process::ProcessResolver`], and [`action`] optionally terminates the
//! owner of a matched port.

pub mod action;
pub mod cli;
pub mod commands;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod system;
