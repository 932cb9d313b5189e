use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playtrack::config::Config;
use playtrack::credentials::{ServiceAccountKey, PUBLISHER_SCOPE};
use playtrack::publisher::PlayClient;
use playtrack::workflow;

const DEFAULT_TRACK: &str = "internal";

#[derive(Parser)]
#[command(name = "playtrack")]
#[command(about = "Promote app releases through publishing edits and tracks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit the edit if bundles were uploaded and the track holds a draft
    Publish {
        /// Path to the service account key file
        credentials: PathBuf,
        /// Application (package) identifier
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        app_id: String,
        /// Track to check for drafts
        #[arg(default_value = DEFAULT_TRACK, value_parser = NonEmptyStringValueParser::new())]
        track: String,
    },
    /// List completed releases on a track
    Completed {
        /// Path to the service account key file
        credentials: PathBuf,
        /// Application (package) identifier
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        app_id: String,
        /// Track to inspect
        #[arg(default_value = DEFAULT_TRACK, value_parser = NonEmptyStringValueParser::new())]
        track: String,
    },
    /// Move the latest draft on a track to completed and commit
    Promote {
        /// Path to the service account key file
        credentials: PathBuf,
        /// Application (package) identifier
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        app_id: String,
        /// Track holding the draft
        #[arg(value_parser = NonEmptyStringValueParser::new())]
        track: String,
    },
}

/// Initialize tracing on stderr so stdout carries only the status report
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "playtrack=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Build the HTTP client, preferring a token from the environment over the key file.
async fn connect(config: &Config, credentials: &Path) -> anyhow::Result<PlayClient> {
    let token = match &config.access_token {
        Some(token) => token.clone(),
        None => {
            let key = ServiceAccountKey::from_file(credentials)?;
            key.fetch_access_token(PUBLISHER_SCOPE)
                .await
                .context("Failed to obtain an access token")?
        }
    };
    Ok(PlayClient::new(config.api_url.clone(), Some(token)))
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env();

    let failed = match cli.command {
        Commands::Publish {
            credentials,
            app_id,
            track,
        } => {
            let client = connect(&config, &credentials).await?;
            let outcome = workflow::publish_if_staged(&client, &app_id, &track).await;
            println!("{}", outcome);
            outcome.is_failed()
        }
        Commands::Completed {
            credentials,
            app_id,
            track,
        } => {
            let client = connect(&config, &credentials).await?;
            let outcome = workflow::inspect_completed(&client, &app_id, &track).await;
            println!("{}", outcome);
            outcome.is_failed()
        }
        Commands::Promote {
            credentials,
            app_id,
            track,
        } => {
            let client = connect(&config, &credentials).await?;
            let outcome = workflow::promote_latest_draft(&client, &app_id, &track).await;
            println!("{}", outcome);
            outcome.is_failed()
        }
    };

    Ok(exit_code(failed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("playtrack").chain(args.iter().copied()))
    }

    #[test]
    fn empty_app_id_is_a_usage_error() {
        for command in ["publish", "completed", "promote"] {
            let err = match parse(&[command, "key.json", "", "beta"]) {
                Ok(_) => panic!("{} accepted an empty app id", command),
                Err(err) => err,
            };
            assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn empty_track_is_a_usage_error() {
        for command in ["publish", "completed", "promote"] {
            let err = match parse(&[command, "key.json", "com.example.app", ""]) {
                Ok(_) => panic!("{} accepted an empty track", command),
                Err(err) => err,
            };
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn publish_defaults_to_internal_track() {
        let cli = parse(&["publish", "key.json", "com.example.app"]).unwrap();
        match cli.command {
            Commands::Publish { track, .. } => assert_eq!(track, DEFAULT_TRACK),
            _ => panic!("expected publish"),
        }
    }

    #[test]
    fn promote_requires_a_track() {
        let err = match parse(&["promote", "key.json", "com.example.app"]) {
            Ok(_) => panic!("promote accepted a missing track"),
            Err(err) => err,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
