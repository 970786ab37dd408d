use scribble_core::models::{ImageId, NoteId};

use super::common::{format_image_lines, print_json, ApiContext};
use crate::cli::ImageCommands;
use crate::error::CliError;

pub async fn run_images(context: &ApiContext, command: ImageCommands) -> Result<(), CliError> {
    context.require_session()?;
    match command {
        ImageCommands::List { id, json } => run_list(context, id, json).await,
        ImageCommands::Delete { id, image_id } => run_delete(context, id, image_id).await,
    }
}

async fn run_list(context: &ApiContext, id: NoteId, json: bool) -> Result<(), CliError> {
    let images = context.coordinator().notes().list_images(id).await?;
    if json {
        return print_json(&images);
    }

    if images.is_empty() {
        println!("Note {id} has no images.");
        return Ok(());
    }
    for line in format_image_lines(&images) {
        println!("{line}");
    }
    Ok(())
}

async fn run_delete(context: &ApiContext, id: NoteId, image_id: ImageId) -> Result<(), CliError> {
    context
        .coordinator()
        .notes()
        .delete_image(id, image_id)
        .await?;
    println!("Deleted image {image_id} from note {id}");
    Ok(())
}
