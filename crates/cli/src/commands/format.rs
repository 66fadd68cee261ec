//! `promptweave format` — transcript to prompt.

use super::{build_formatter, read_input};
use crate::TemplateArgs;
use std::path::Path;

pub fn run(
    transcript: &Path,
    memory: Option<&Path>,
    json: bool,
    template: &TemplateArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = build_formatter(template)?;
    let transcript = read_input(transcript)?;
    let memory = match memory {
        Some(path) => read_input(path)?,
        None => String::new(),
    };

    let prompt = formatter.format(&transcript, &memory)?;
    tracing::debug!(
        template = %formatter.tags().selector,
        blocks = prompt.blocks,
        "Formatted transcript"
    );

    if json {
        let value = serde_json::json!({
            "template": formatter.tags().selector,
            "text": prompt.text,
            "continuation": prompt.continuation,
            "truncated": prompt.truncated,
            "blocks": prompt.blocks,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        // No trailing newline: an open block must end exactly where the model continues
        print!("{}", prompt.text);
    }
    Ok(())
}
