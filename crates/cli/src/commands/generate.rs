use anyhow::{Context, Result};
use mvw_generator::Generator;
use std::path::PathBuf;

use super::load_wiki;

/// Generate the static site into the configured output directory
pub async fn run(start: PathBuf) -> Result<()> {
    let config = load_wiki(&start)?;

    println!("🔨 Generating site...");
    println!("   Source: {}", config.source_dir.display());
    println!("   Output: {}", config.output_dir.display());
    if config.site_root != "/" {
        println!("   Site root: {}", config.site_root);
    }
    println!();

    let generator = Generator::new(config).context("Failed to load theme")?;
    let report = generator.generate().context("Failed to generate site")?;

    println!("✓ Generated {}", report);
    println!("\nOpen {}", generator.output_dir().join("index.html").display());
    Ok(())
}
