//! Build the site

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::generator::Generator;
use crate::Stanza;

/// Build the site, returning the number of post pages written
pub fn run(stanza: &Stanza) -> Result<usize> {
    let start = std::time::Instant::now();

    let loader = ContentLoader::new(stanza);
    let posts = loader.load_posts()?;

    let public_count = posts.iter().filter(|p| p.public).count();
    tracing::info!("Loaded {} posts ({} public)", posts.len(), public_count);

    let generator = Generator::new(stanza)?;
    let count = generator.generate(&posts)?;

    let duration = start.elapsed();
    tracing::info!("Generated {} pages in {:.2}s", count, duration.as_secs_f64());

    Ok(count)
}
