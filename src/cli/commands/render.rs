//! `pkpass render`: print the canonical `pass.json` of a definition.

use crate::{
    cli::{RenderArgs, RuntimeConfig},
    error::Result,
    metadata::PassDefinition,
};

pub fn render(args: &RenderArgs, config: &RuntimeConfig) -> Result<i32> {
    let document = PassDefinition::load(&args.definition)?.into_document()?;
    let json = document.to_json_bytes()?;
    config.output().data(&json)?;
    Ok(0)
}
