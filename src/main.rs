//! Command-line entry point for revision deploys over SFTP.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use oxidedeploy_lib::config::{deploy_config_file, load_config};
use oxidedeploy_lib::deploy::{
    execute, Command, ConsoleUi, DeployError, FixedTagger, GitShaTagger, TagProvider,
    TimestampTagger,
};
use oxidedeploy_lib::sftp::SftpGateway;

#[derive(Parser)]
#[command(name = "oxidedeploy", version, about = "Upload, list and activate revisions over SFTP")]
struct Cli {
    /// Deploy config (JSON); defaults to <config_dir>/oxidedeploy/deploy.json
    #[arg(long, short, global = true, env = "OXIDEDEPLOY_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// List uploaded revisions, newest first
    List,
    /// Upload a file as a new revision
    Upload {
        /// Local file to upload
        file: PathBuf,
        /// Activate the revision after uploading it
        #[arg(long)]
        activate: bool,
        /// Use this tag instead of generating one
        #[arg(long)]
        tag: Option<String>,
        /// How to generate the tag when --tag is not given
        #[arg(long, value_enum, default_value_t = TaggerKind::Git)]
        tagger: TaggerKind,
        /// Git working tree used by the git tagger
        #[arg(long, default_value = ".")]
        repo: PathBuf,
        /// Abbreviated commit hash length used by the git tagger
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(4..=40))]
        sha_length: u8,
    },
    /// Point index.html at an uploaded revision
    Activate {
        /// Revision id as shown by `list`
        revision: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TaggerKind {
    Git,
    Timestamp,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", error_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// The message shown for a failed command.
///
/// Wrapped errors already embed their cause in the top-level message.
fn error_report(err: &DeployError) -> String {
    if err.is_user_facing() {
        err.to_string()
    } else {
        format!("error: {}", err)
    }
}

async fn run(cli: Cli) -> Result<(), DeployError> {
    let config_path = match cli.config {
        Some(path) => path,
        None => deploy_config_file()?,
    };
    let config = load_config(&config_path)?;

    let (command, tagger): (Command, Box<dyn TagProvider>) = match cli.command {
        CliCommand::List => (Command::List, Box::new(TimestampTagger)),
        CliCommand::Upload {
            file,
            activate,
            tag,
            tagger,
            repo,
            sha_length,
        } => {
            let content = tokio::fs::read(&file)
                .await
                .map_err(|e| DeployError::LocalIo(format!("{}: {}", file.display(), e)))?;
            debug!("[deploy] Read {} bytes from {}", content.len(), file.display());

            let tagger: Box<dyn TagProvider> = match (tag, tagger) {
                (Some(tag), _) => Box::new(FixedTagger::new(tag)),
                (None, TaggerKind::Git) => {
                    Box::new(GitShaTagger::new(repo).with_length(usize::from(sha_length)))
                }
                (None, TaggerKind::Timestamp) => Box::new(TimestampTagger),
            };
            (Command::Upload { content, activate }, tagger)
        }
        CliCommand::Activate { revision } => (
            Command::Activate {
                revision_id: revision,
            },
            Box::new(TimestampTagger),
        ),
    };

    let gateway = SftpGateway::connect(&config).await?;
    execute(
        command,
        &gateway,
        tagger.as_ref(),
        &ConsoleUi,
        &config.remote_dir,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use oxidedeploy_lib::sftp::{ConnectError, SftpError};

    use super::*;

    #[test]
    fn test_user_facing_errors_are_bare() {
        let err = DeployError::RevisionNotFound("000001".into());
        assert_eq!(error_report(&err), "Revision doesn't exist");
    }

    #[test]
    fn test_wrapped_cause_appears_once() {
        let err: DeployError = ConnectError::AuthRejected("deploy@host".into()).into();
        let report = error_report(&err);
        assert_eq!(
            report,
            "error: Connection failed: Authentication rejected for deploy@host"
        );
        assert_eq!(report.matches("Authentication rejected").count(), 1);

        let err: DeployError = SftpError::FileNotFound("site/a.html".into()).into();
        assert_eq!(error_report(&err).matches("site/a.html").count(), 1);
    }

    #[test]
    fn test_sha_length_flag() {
        let cli = Cli::try_parse_from(["oxidedeploy", "upload", "dist/index.html", "--sha-length", "12"])
            .unwrap();
        match cli.command {
            CliCommand::Upload { sha_length, .. } => assert_eq!(sha_length, 12),
            _ => panic!("expected upload"),
        }

        assert!(Cli::try_parse_from(["oxidedeploy", "upload", "f", "--sha-length", "2"]).is_err());
    }
}
