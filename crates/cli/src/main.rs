//! `jamespot-chat`: talk to a Jamespot platform through an LLM that can call
//! its API.
//!
//! Modes:
//! - default     interactive chat
//! - `--stream`  interactive chat with live tool activity and text
//! - `-p QUERY`  answer one query and exit

use anyhow::Context;
use clap::Parser;
use jamespot_cli::{Driver, Mode, Session};
use jamespot_config::AppConfig;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "jamespot-chat",
    about = "Chat with a Jamespot platform through an LLM agent",
    version
)]
struct Cli {
    /// Verbose tool and provider output (also DEBUG=true)
    #[arg(long)]
    debug: bool,

    /// Show tool calls and answer text as they happen
    #[arg(long)]
    stream: bool,

    /// Answer a single query and exit
    #[arg(short, long, value_name = "QUERY", num_args = 0..=1)]
    print: Option<Option<String>>,

    /// Maximum LLM roundtrips per turn
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_roundtrips: Option<u32>,
}

impl Cli {
    fn mode(&self) -> Mode {
        match (&self.print, self.stream) {
            (Some(query), _) => Mode::Print(query.clone().unwrap_or_default()),
            (None, true) => Mode::StreamInteractive,
            (None, false) => Mode::Interactive,
        }
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        "warn,jamespot=debug"
    } else {
        "warn,jamespot=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let mode = cli.mode();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error initializing agent: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    config.agent.debug |= cli.debug;
    if let Some(limit) = cli.max_roundtrips {
        config.agent.max_roundtrips = limit;
    }
    init_tracing(config.agent.debug);

    let interactive = !matches!(mode, Mode::Print(_));
    if interactive {
        println!("Starting Jamespot AI Agent...\n");
        if config.agent.debug {
            println!("DEBUG MODE ENABLED\n");
        }
        println!("--- Connecting to platform ---");
    }

    let session = match Session::start(&config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error initializing agent: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let user = format!("{} (id {})", session.user.display_name(), session.user.id);
    let tool_count = session.agent.tools().len();
    let llm_summary = session.llm_summary.clone();

    let mut driver = Driver::from_session(session, std::io::stdout(), std::io::stderr());
    if interactive {
        driver
            .banner(&user, tool_count, &llm_summary)
            .context("failed to write to the terminal")?;
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let status = driver
        .run(mode, stdin)
        .await
        .context("terminal I/O failed")?;
    Ok(ExitCode::from(status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_roundtrips_is_rejected() {
        assert!(Cli::try_parse_from(["jamespot-chat", "--max-roundtrips", "0"]).is_err());
        let cli = Cli::try_parse_from(["jamespot-chat", "--max-roundtrips", "3"]).unwrap();
        assert_eq!(cli.max_roundtrips, Some(3));
    }

    #[test]
    fn print_flag_selects_the_mode() {
        let cli = Cli::try_parse_from(["jamespot-chat", "-p", "list my groups"]).unwrap();
        assert_eq!(cli.mode(), Mode::Print("list my groups".into()));
        let cli = Cli::try_parse_from(["jamespot-chat", "--print"]).unwrap();
        assert_eq!(cli.mode(), Mode::Print(String::new()));
        let cli = Cli::try_parse_from(["jamespot-chat", "--stream"]).unwrap();
        assert_eq!(cli.mode(), Mode::StreamInteractive);
    }
}
