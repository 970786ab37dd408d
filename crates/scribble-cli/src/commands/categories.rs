use scribble_core::models::CategoryId;

use super::common::{format_category_lines, print_json, ApiContext};
use crate::cli::CategoryCommands;
use crate::error::CliError;

pub async fn run_categories(
    context: &ApiContext,
    command: CategoryCommands,
) -> Result<(), CliError> {
    context.require_session()?;
    match command {
        CategoryCommands::List { json } => run_list(context, json).await,
        CategoryCommands::Add { name } => run_add(context, &name).await,
        CategoryCommands::Delete { id } => run_delete(context, id).await,
    }
}

async fn run_list(context: &ApiContext, json: bool) -> Result<(), CliError> {
    let categories = context.coordinator().categories().list().await?;
    if json {
        return print_json(&categories);
    }

    if categories.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }
    for line in format_category_lines(&categories) {
        println!("{line}");
    }
    Ok(())
}

async fn run_add(context: &ApiContext, name: &str) -> Result<(), CliError> {
    let category = context.coordinator().create_category(name).await?;
    println!("Created category {} ({})", category.id, category.name);
    Ok(())
}

async fn run_delete(context: &ApiContext, id: CategoryId) -> Result<(), CliError> {
    context.coordinator().delete_category(id).await?;
    println!("Deleted category {id}; its notes are now uncategorized");
    Ok(())
}
