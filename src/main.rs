//! CLI entry point: a thin presentation layer over `ScrapePipeline::run`.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use indiamart_scraper::infrastructure::{init_logging, HttpPageRenderer, UnavailableUploader};
use indiamart_scraper::{AppConfig, ScrapePipeline};

#[derive(Parser)]
#[command(name = "indiamart-scraper")]
#[command(about = "Extract structured product listings from an IndiaMART category page")]
#[command(version)]
struct Cli {
    /// Category URL, e.g. https://dir.indiamart.com/impcat/pipe-fittings.html
    category_url: String,

    /// Number of products to scrape from the category
    #[arg(short, long, default_value_t = 3)]
    products: usize,

    /// Directory that keeps the archive when upload is unavailable
    #[arg(short, long)]
    retain_dir: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    if !cli.category_url.contains("indiamart.com") {
        anyhow::bail!("please provide a valid IndiaMART category URL");
    }

    let mut config = AppConfig::default();
    if let Some(retain_dir) = cli.retain_dir {
        config.pipeline.retain_dir = retain_dir;
    }

    let renderer = Arc::new(HttpPageRenderer::new(&config.http)?);
    let uploader = Arc::new(UnavailableUploader::from_config(&config.uploader));
    let pipeline = ScrapePipeline::new(renderer, uploader, config)?;

    let result = pipeline.run(&cli.category_url, cli.products).await?;

    println!();
    println!(
        "Scraped {} product(s) ({:.0}% of requested)",
        result.records.len(),
        result.stats.success_rate(cli.products as u32) * 100.0
    );
    for (i, record) in result.records.iter().enumerate() {
        println!("  {}. {} - ₹{}", i + 1, record.product_name, record.price);
    }

    match (&result.archive_path, &result.remote_id) {
        (Some(_), Some(id)) => {
            println!("Uploaded: https://drive.google.com/file/d/{id}");
            println!("Local artifacts removed");
        }
        (Some(path), None) => {
            println!("Upload unavailable or failed; archive retained at {}", path.display());
        }
        (None, _) => println!("Nothing archived"),
    }

    Ok(())
}
