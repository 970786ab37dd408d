//! Scribble CLI - notes, categories and images from the terminal.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::{run_login, run_logout, run_register, run_status};
use crate::commands::categories::run_categories;
use crate::commands::common::ApiContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::images::run_images;
use crate::commands::notes::{
    run_add, run_attach, run_delete, run_edit, run_favorite, run_list, run_show, EditFields,
};
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "scribble=info,scribble_core=warn";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        if let Some(hint) = error.hint() {
            eprintln!("{hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Config { command } => run_config(command, profile),
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        command => run_api_command(command, profile).await,
    }
}

async fn run_api_command(command: Commands, profile: Option<&str>) -> Result<(), CliError> {
    let context = ApiContext::load(profile)?;
    match command {
        Commands::Login { username, password } => {
            run_login(&context, &username, password).await
        }
        Commands::Register {
            username,
            email,
            password,
        } => run_register(&context, &username, &email, password).await,
        Commands::Logout => run_logout(&context),
        Commands::Status => run_status(&context).await,
        Commands::List {
            search,
            favorites,
            category,
            json,
        } => run_list(&context, search, favorites, category, json).await,
        Commands::Show { id, json } => run_show(&context, id, json).await,
        Commands::Add {
            title,
            body,
            category,
            favorite,
            visibility,
        } => run_add(&context, title, body, category, favorite, visibility).await,
        Commands::Edit {
            id,
            title,
            body,
            category,
            visibility,
            favorite,
        } => {
            let fields = EditFields {
                title,
                body,
                category,
                visibility,
                favorite,
            };
            run_edit(&context, id, fields).await
        }
        Commands::Favorite { id } => run_favorite(&context, id).await,
        Commands::Delete { id } => run_delete(&context, id).await,
        Commands::Attach { id, path } => run_attach(&context, id, &path).await,
        Commands::Images { command } => run_images(&context, command).await,
        Commands::Categories { command } => run_categories(&context, command).await,
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
