use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use civicsync::backend::{IssueBackend, RestBackend};
use civicsync::cli::{Cli, Commands, ConfigAction, ProfileAction};
use civicsync::commands::{
    BrowseOptions, IssueInput, MapOptions, OutputOptions, cmd_analytics, cmd_browse,
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_delete, cmd_edit, cmd_geocode, cmd_map,
    cmd_mine, cmd_profile_set, cmd_profile_show, cmd_report, cmd_show, cmd_vote, cmd_voted,
};
use civicsync::config::Config;
use civicsync::demo::demo_backend;
use civicsync::error::{CivicError, Result};
use civicsync::types::ProfileUpdate;

const LOG_ENV: &str = "CIVICSYNC_LOG";

const REQUEST_FAILED_HINT: &str =
    "The request did not complete. Check backend.url and your connection, or pass --offline.";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn rest_backend(config: &Config) -> Result<RestBackend> {
    let url = config.backend_url().ok_or_else(|| {
        CivicError::Config(
            "no backend configured; set CIVICSYNC_BACKEND_URL, run: civicsync config set backend.url <url>, or pass --offline"
                .to_string(),
        )
    })?;
    let api_key = config.api_key().ok_or_else(|| {
        CivicError::Config(
            "no API key configured; set CIVICSYNC_API_KEY or run: civicsync config set backend.api_key <key>"
                .to_string(),
        )
    })?;
    RestBackend::new(&url, api_key, config.session(), config.request_timeout())
}

/// Run a backend-bound command.
async fn run<B: IssueBackend>(
    backend: &B,
    config: &Config,
    command: Commands,
    output: OutputOptions,
) -> Result<()> {
    match command {
        Commands::Browse {
            category,
            status,
            search,
            sort,
            page,
        } => {
            let options = BrowseOptions {
                category,
                status,
                search,
                sort,
                page,
                page_size: config.browse.page_size,
            };
            cmd_browse(backend, options, output).await
        }
        Commands::Show { id } => cmd_show(backend, &id, output).await,
        Commands::Report {
            title,
            description,
            category,
            location,
            lat,
            lng,
            image,
        } => {
            let input = IssueInput {
                title: Some(title),
                description: Some(description),
                category: Some(category),
                location: Some(location),
                latitude: lat,
                longitude: lng,
                image,
                ..Default::default()
            };
            cmd_report(backend, input, output).await
        }
        Commands::Edit {
            id,
            title,
            description,
            category,
            location,
            status,
            lat,
            lng,
            image,
            remove_image,
        } => {
            let input = IssueInput {
                title,
                description,
                category,
                location,
                status,
                latitude: lat,
                longitude: lng,
                image,
                remove_image,
            };
            cmd_edit(backend, &id, input, output).await
        }
        Commands::Delete { id } => cmd_delete(backend, &id, output).await,
        Commands::Vote { id } => cmd_vote(backend, &id, output).await,
        Commands::Mine { status } => cmd_mine(backend, status, output).await,
        Commands::Voted => cmd_voted(backend, output).await,
        Commands::Profile { action } => match action {
            ProfileAction::Show { user_id } => {
                cmd_profile_show(backend, user_id.as_deref(), output).await
            }
            ProfileAction::Set { name, bio } => {
                cmd_profile_set(backend, ProfileUpdate { name, bio }, output).await
            }
        },
        Commands::Analytics { days, top } => cmd_analytics(backend, days, top, output).await,
        Commands::Map {
            categories,
            statuses,
            search,
            select,
        } => {
            let options = MapOptions {
                categories,
                statuses,
                search,
                select,
                fallback: config.fallback_position(),
                page_size: config.browse.page_size,
            };
            cmd_map(backend, options, output).await
        }
        Commands::Geocode { .. } | Commands::Config { .. } => Err(CivicError::Other(
            "command does not use the backend".to_string(),
        )),
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    let output = OutputOptions { json: cli.json };

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(output),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
            ConfigAction::Get { key } => cmd_config_get(&key, output),
        },
        Commands::Geocode { text } => cmd_geocode(&text, output).await,
        command => {
            let config = Config::load()?;
            if cli.offline {
                run(&demo_backend(), &config, command, output).await
            } else {
                run(&rest_backend(&config)?, &config, command, output).await
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    if !atty::is(atty::Stream::Stdout) {
        owo_colors::set_override(false);
    }

    let cli = Cli::parse();

    match dispatch(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("{}", e);
            if e.is_network_or_backend() {
                eprintln!("{}", REQUEST_FAILED_HINT.dimmed());
            }
            ExitCode::FAILURE
        }
    }
}
