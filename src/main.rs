use clap::{ArgGroup, Parser};
use curlprobe::commands::probe_commands::{plan_probe, run_probe};
use curlprobe::config::{DEFAULT_TIMEOUT_SECS, RunConfig};
use curlprobe::engine::http::ReqwestTransport;
use curlprobe::report::write_reports;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "curlprobe",
    version,
    about = "Derive robustness probes from a curl command and run them"
)]
#[command(group(ArgGroup::new("source").required(true).args(["curl", "curl_file"])))]
struct Cli {
    /// Full curl command; `@path` reads it from a file
    #[arg(long)]
    curl: Option<String>,

    /// File containing the curl command
    #[arg(long)]
    curl_file: Option<PathBuf>,

    /// Prefix for the .json/.md/.html reports
    #[arg(long, default_value = "report")]
    out: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "CURLPROBE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Print the generated cases without sending anything
    #[arg(long)]
    plan: bool,

    /// Exit with status 1 when any case fails
    #[arg(long)]
    strict: bool,
}

fn read_command(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let command = match (&cli.curl, &cli.curl_file) {
        (Some(inline), _) => match inline.strip_prefix('@') {
            Some(path) => fs::read_to_string(path)
                .map_err(|err| format!("Failed to read curl file `{path}`: {err}"))?,
            None => inline.clone(),
        },
        (None, Some(path)) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read curl file `{}`: {err}", path.display()))?,
        (None, None) => return Err("one of --curl or --curl-file is required".into()),
    };
    Ok(command)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let command = read_command(&cli)?;

    if cli.plan {
        for case in plan_probe(&command)? {
            println!(
                "{:<22} {:<6} {}  [{}]",
                case.name,
                case.method,
                case.url,
                case.expectation.label()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = RunConfig::with_timeout(cli.timeout);
    let output = run_probe(&command, &config, &ReqwestTransport::new()).await?;
    let written = write_reports(&output, &cli.out)?;

    let summary = &output.summary;
    println!(
        "Total: {} · PASS: {} · FAIL: {} · Duration: {} ms",
        summary.total, summary.passed, summary.failed, summary.duration_ms
    );
    let paths: Vec<String> = written.iter().map(|path| path.display().to_string()).collect();
    println!("Reports written: {}", paths.join(", "));

    if cli.strict && summary.failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
