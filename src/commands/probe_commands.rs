use crate::config::RunConfig;
use crate::domain::{RunOutput, TestCase};
use crate::engine::command::parse_command;
use crate::engine::http::Transport;
use crate::engine::rules::generate_test_cases;
use crate::engine::runner::run_descriptor;
use crate::error::ProbeError;

/// Parse a curl command, run the whole battery and aggregate the results.
///
/// Fails only when the command itself cannot be parsed; nothing is dispatched
/// in that case.
pub async fn run_probe(
    command: &str,
    config: &RunConfig,
    transport: &dyn Transport,
) -> Result<RunOutput, ProbeError> {
    let descriptor = parse_command(command)?;
    Ok(run_descriptor(descriptor, config, transport).await)
}

/// The cases a run would dispatch, without sending anything.
pub fn plan_probe(command: &str) -> Result<Vec<TestCase>, ProbeError> {
    let descriptor = parse_command(command)?;
    Ok(generate_test_cases(&descriptor))
}
