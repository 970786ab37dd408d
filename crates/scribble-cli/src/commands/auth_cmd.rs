use scribble_core::SignUpOutcome;

use super::common::{resolve_password, ApiContext};
use crate::error::CliError;

pub async fn run_login(
    context: &ApiContext,
    username: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = resolve_password(password)?;
    context.auth().login(username, &password).await?;
    println!(
        "Signed in profile '{}' as {}",
        context.profile_name,
        username.trim()
    );
    Ok(())
}

pub async fn run_register(
    context: &ApiContext,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = resolve_password(password)?;
    let username = username.trim();
    match context.auth().register(username, email, &password).await? {
        SignUpOutcome::SignedIn => {
            println!(
                "Registered and signed in profile '{}' as {username}",
                context.profile_name
            );
        }
        SignUpOutcome::Registered { user_id } => {
            match user_id {
                Some(id) => println!("Registered {username} (user {id})"),
                None => println!("Registered {username}"),
            }
            println!("Run `scribble login -u {username}` to sign in.");
        }
    }
    Ok(())
}

pub fn run_logout(context: &ApiContext) -> Result<(), CliError> {
    context.auth().logout()?;
    println!("Signed out profile '{}'", context.profile_name);
    Ok(())
}

pub async fn run_status(context: &ApiContext) -> Result<(), CliError> {
    let transport = context.transport();
    println!("Profile: {}", context.profile_name);
    println!("API:     {}", transport.config().base_url());

    match transport.health().await {
        Ok(status) => println!("Server:  {status}"),
        Err(error) => println!("Server:  unreachable ({error})"),
    }

    if transport.session().is_authenticated() {
        println!("Session: signed in");
    } else {
        println!("Session: not signed in");
    }
    Ok(())
}
