//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Stanza;

/// Remove the public directory
pub fn run(stanza: &Stanza) -> Result<()> {
    if stanza.public_dir.exists() {
        fs::remove_dir_all(&stanza.public_dir)?;
        tracing::info!("Deleted: {:?}", stanza.public_dir);
    }

    Ok(())
}
