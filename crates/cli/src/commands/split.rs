//! `promptweave split` — re-label generated text.

use super::{build_formatter, read_input};
use crate::TemplateArgs;
use std::path::Path;

pub fn run(input: &Path, template: &TemplateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let formatter = build_formatter(template)?;
    let generated = read_input(input)?;
    println!("{}", formatter.split_generated(&generated));
    Ok(())
}
