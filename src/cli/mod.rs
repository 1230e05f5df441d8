//! Command-line surface for jenky
//!
//! Subcommands:
//! - `list`: All jobs on the server
//! - `info`: Details for one job
//! - `build`: Trigger a job or configured alias, optionally following it
//! - `init-config`: Write a starter config file
//! - `completions`: Generate shell completions
//!
//! Exit-code contract: missing credentials or a failed liveness check exit
//! nonzero; a remote failure inside a subcommand is printed and swallowed.

pub mod completions;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use jenky::config::ConfigStore;
use jenky::jenkins::JenkinsClient;
use jenky::orchestrator::{BuildRequest, run_build};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Server used when `JENKINS_URL` is not set.
const DEFAULT_JENKINS_URL: &str = "http://localhost:8080";

/// CLI arguments for jenky
#[derive(Parser, Debug)]
#[command(name = "jenky")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jenkins username (or set JENKINS_USERNAME)
    #[arg(long, global = true)]
    username: Option<String>,

    /// Jenkins API token (or set JENKINS_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all Jenkins jobs
    List,

    /// Show details for one job
    Info {
        /// Name of the job
        job_name: String,
    },

    /// Trigger a build for a job or configured alias
    Build {
        /// Job name, or an alias from the config file
        job_name: String,
        /// JSON object of build parameters, merged over alias defaults
        #[arg(long)]
        parameters: Option<String>,
        /// Stream console output while the build runs
        #[arg(long)]
        stream: bool,
        /// Render a progress bar while the build runs
        #[arg(long)]
        progress: bool,
    },

    /// Write a starter config file with an example alias
    InitConfig,

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    // Local commands work without credentials or a reachable server.
    match &args.command {
        Command::InitConfig => {
            let mut store = ConfigStore::load();
            if let Err(e) = store.generate_default() {
                eprintln!("Error generating config: {e}");
            }
            return Ok(());
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let generated = completions::generate_completions(shell_enum)?;
            if let Some(output_path) = output {
                completions::save_completions(&generated, output_path)?;
            } else {
                println!("{generated}");
            }
            return Ok(());
        }
        _ => {}
    }

    let username = args
        .username
        .clone()
        .or_else(|| std::env::var("JENKINS_USERNAME").ok());
    let token = args
        .token
        .clone()
        .or_else(|| std::env::var("JENKINS_TOKEN").ok());
    let (Some(username), Some(token)) = (username, token) else {
        bail!(
            "Jenkins username and token must be provided either as arguments or environment variables"
        );
    };
    let url = std::env::var("JENKINS_URL").unwrap_or_else(|_| DEFAULT_JENKINS_URL.to_string());

    let client = JenkinsClient::connect(&url, username, token)
        .with_context(|| format!("Error connecting to Jenkins at {url}"))?;

    match args.command {
        Command::List => cmd_list(&client),
        Command::Info { job_name } => cmd_info(&client, &job_name),
        Command::Build {
            job_name,
            parameters,
            stream,
            progress,
        } => {
            let store = ConfigStore::load();
            cmd_build(
                &client,
                &store,
                &job_name,
                parameters.as_deref(),
                stream,
                progress,
            );
        }
        // Handled before the connection was made.
        Command::InitConfig | Command::Completions { .. } => {}
    }

    Ok(())
}

/// `jenky list` - formatted table of jobs with their status color.
fn cmd_list(client: &JenkinsClient) {
    match client.list_jobs() {
        Ok(jobs) => {
            println!("\nAvailable Jenkins Jobs:");
            println!("{}", "-".repeat(50));
            for job in jobs {
                println!("Name: {}", job.name);
                println!("URL: {}", job.url);
                println!("Color (Status): {}", job.color.as_deref().unwrap_or("N/A"));
                println!("{}", "-".repeat(50));
            }
        }
        Err(e) => eprintln!("Error listing jobs: {e}"),
    }
}

/// `jenky info` - job details, with absent fields rendered as N/A.
fn cmd_info(client: &JenkinsClient, job_name: &str) {
    match client.job_info(job_name) {
        Ok(info) => {
            println!("\nJob Details for {job_name}:");
            println!("{}", "-".repeat(50));
            println!(
                "Description: {}",
                info.description
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or("N/A")
            );
            println!("URL: {}", info.url.as_deref().unwrap_or("N/A"));
            println!("Buildable: {}", info.buildable);
            match info.last_build {
                Some(build) => println!("Last Build: {}", build.number),
                None => println!("Last Build: N/A"),
            }
            println!("In Queue: {}", info.in_queue);
            println!("{}", "-".repeat(50));
        }
        Err(e) => eprintln!("Error getting job info: {e}"),
    }
}

/// `jenky build` - resolve the alias, merge parameters, trigger and
/// optionally follow the build.
fn cmd_build(
    client: &JenkinsClient,
    store: &ConfigStore,
    job_name: &str,
    parameters_json: Option<&str>,
    stream: bool,
    progress: bool,
) {
    let cli_parameters = match parameters_json {
        Some(raw) => match serde_json::from_str::<BTreeMap<String, String>>(raw) {
            Ok(parameters) => parameters,
            Err(e) => {
                eprintln!("Error parsing --parameters: {e}");
                return;
            }
        },
        None => BTreeMap::new(),
    };

    let alias = store.get_job_config(job_name);
    if let Some(alias) = alias {
        tracing::debug!(alias = job_name, job = %alias.job_name, "resolved alias");
    }
    let request = BuildRequest::resolve(job_name, cli_parameters, stream, progress, alias);

    if let Err(e) = run_build(client, &request) {
        eprintln!("Error triggering build: {e}");
    }
}
