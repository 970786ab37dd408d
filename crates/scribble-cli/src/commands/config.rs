use scribble_core::ApiConfig;

use crate::cli::{ConfigCommands, FavoritePolicyArg};
use crate::commands::common::ApiContext;
use crate::config_profiles::{default_config_path, CliProfilesConfig};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_url,
            favorite_on_failure,
            no_activate,
        } => run_config_init(global_profile, api_url, favorite_on_failure, no_activate),
        ConfigCommands::Show => run_config_show(global_profile),
    }
}

pub fn run_config_init(
    profile_name: Option<&str>,
    api_url: Option<String>,
    favorite_on_failure: Option<FavoritePolicyArg>,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);

    apply_profile_init(&mut config, &profile_name, api_url, favorite_on_failure, no_activate)?;

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );
    println!("Run `scribble login -u <username>` to sign in.");
    Ok(())
}

/// Merges init flags into `config` without touching the filesystem.
pub fn apply_profile_init(
    config: &mut CliProfilesConfig,
    profile_name: &str,
    api_url: Option<String>,
    favorite_on_failure: Option<FavoritePolicyArg>,
    no_activate: bool,
) -> Result<(), CliError> {
    let profile = config.profile_mut_or_default(profile_name);
    if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
        profile.set_api_base_url(&url).map_err(CliError::Config)?;
    }
    if let Some(policy) = favorite_on_failure {
        profile.favorite_failure_policy = policy.into();
    }

    if !no_activate {
        config.active_profile = Some(profile_name.to_string());
    }
    Ok(())
}

pub fn run_config_show(global_profile: Option<&str>) -> Result<(), CliError> {
    let context = ApiContext::load(global_profile)?;
    let path = default_config_path().map_err(CliError::Config)?;
    let configured = CliProfilesConfig::load()
        .map_err(CliError::Config)?
        .profile(&context.profile_name)
        .is_some();

    println!("Config file: {}", path.display());
    println!(
        "Profile:     {}{}",
        context.profile_name,
        if configured { "" } else { " (not configured)" }
    );
    println!("API:         {}", context.transport().config().base_url());
    println!(
        "Timeout:     {}s",
        context.transport().config().timeout().as_secs()
    );
    println!(
        "Favorites:   {}",
        match context.profile.favorite_failure_policy {
            scribble_core::FavoriteFailurePolicy::KeepOptimistic => "keep on failure",
            scribble_core::FavoriteFailurePolicy::Revert => "revert on failure",
        }
    );
    println!(
        "Signed in:   {}",
        if context.transport().session().is_authenticated() {
            "yes"
        } else {
            "no"
        }
    );
    if context.profile.api_base_url().is_none() {
        println!("(API address from environment or default {})", ApiConfig::default().base_url());
    }
    Ok(())
}
