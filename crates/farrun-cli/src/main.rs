//! farrun CLI
//!
//! Runs one command on a remote host over SSH and reports the lifecycle
//! status.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

use farrun_exec::{CommandRunner, ConnectionParams, ElevatedHooks};

/// Run a single command on a remote host
#[derive(Parser, Debug)]
#[command(name = "farrun", version, about)]
struct Args {
    /// Remote host address
    host: String,

    /// Command to execute (words are joined with spaces)
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,

    /// SSH port
    #[arg(short, long, default_value_t = 22)]
    port: u16,

    /// SSH user
    #[arg(short, long, default_value = "root")]
    user: String,

    /// Environment variable holding the password
    #[arg(long, default_value = "FARRUN_PASSWORD")]
    password_env: String,

    /// Connect timeout in milliseconds
    #[arg(long, default_value_t = farrun_exec::DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Detach the command with a no-hang-up wrapper
    #[arg(long)]
    detach: bool,

    /// Run the command elevated (implies --detach)
    #[arg(long)]
    sudo: bool,

    /// Remote path of the elevation binary
    #[arg(long)]
    sudo_path: Option<String>,

    /// Remote path of the no-hang-up binary
    #[arg(long)]
    nohup_path: Option<String>,

    /// Print the final status as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let password = std::env::var(&args.password_env)
        .map_err(|_| eyre!("environment variable {} is not set", args.password_env))?;

    let mut params = ConnectionParams::new(args.host, args.user, password)
        .with_port(args.port)
        .with_timeout_ms(args.timeout_ms);
    params.sudo = args.sudo;
    params.sudo_path = args.sudo_path;
    params.nohup_path = args.nohup_path;

    let mut runner = CommandRunner::new(params);
    if args.detach || args.sudo {
        runner = runner.with_hooks(Arc::new(ElevatedHooks));
    }

    let status = runner.run(&args.command.join(" ")).await;

    if args.json {
        println!("{}", serde_json::to_string(&status)?);
    } else {
        println!("{status}");
    }

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
