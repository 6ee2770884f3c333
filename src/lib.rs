//! Derive a battery of robustness probes from one example curl command, run
//! them against the live endpoint and judge every response.
//!
//! The pipeline is `engine::command` (curl text to [`domain::RequestDescriptor`]),
//! `engine::rules` (descriptor to ordered [`domain::TestCase`]s),
//! `engine::runner` (dispatch and judge) and `report` (render a
//! [`domain::RunOutput`]).

pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod report;
