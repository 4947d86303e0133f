use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

use git_promote::cli::PromotionOrchestrator;
use git_promote::config;
use git_promote::credentials::CredentialChain;
use git_promote::domain::{PromotionOutcome, PromotionRequest, ReleaseKind};
use git_promote::git::Git2Repository;
use git_promote::github::GitHubClient;
use git_promote::{logging, ui};

#[derive(clap::Parser)]
#[command(
    name = "git-promote",
    version,
    about = "Promote a branch to the next deployment stage and draft its release"
)]
struct Args {
    #[arg(help = "Stage to release, as named in release_map")]
    stage: String,

    #[arg(
        short,
        long,
        value_enum,
        help = "Version component to bump [default: prerelease]"
    )]
    release: Option<ReleaseKind>,

    #[arg(short, long, help = "Discard commits that only exist on the destination")]
    force: bool,

    #[arg(long, value_name = "PATH", help = "Also write the release notes to this file")]
    release_notes: Option<PathBuf>,

    #[arg(short, long, help = "Compute notes and version without pushing or releasing")]
    dry_run: bool,

    #[arg(short, long, default_value = ".", help = "Local checkout to operate on")]
    path: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity")]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(args) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "promotion finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<PromotionOutcome> {
    let checkout = args.path;
    let config = config::load_config(args.config.as_deref(), &checkout)
        .context("Failed to load release configuration")?;

    let release_notes = args.release_notes.map(|notes| {
        if notes.is_relative() {
            checkout.join(notes)
        } else {
            notes
        }
    });
    let request = PromotionRequest {
        release: args.release,
        force: args.force,
        dry_run: args.dry_run,
        release_notes,
        ..PromotionRequest::new(args.stage)
    };

    let token = CredentialChain::from_config(&config.credentials, &checkout).resolve()?;
    let repo = Git2Repository::open(&checkout)
        .with_context(|| format!("Failed to open git repository at {}", checkout.display()))?
        .with_token(SecretString::from(token.expose_secret().to_string()));
    let api = GitHubClient::new(config.api_url.clone(), token)?;

    let outcome = PromotionOrchestrator::new(&config, &repo, &api).run(&request)?;
    Ok(outcome)
}
