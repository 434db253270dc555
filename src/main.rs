use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use itembrowser::data::DataSet;
use itembrowser::{Browser, BrowserConfig, Category, Host, MajorGroup, Row};

#[derive(Parser, Debug)]
#[command(author, version, about = "Build an item catalog from a JSON dataset and print the browser list", long_about = None)]
struct Cli {
    /// Dataset file, or a directory of dataset files
    #[arg(value_name = "DATASET")]
    dataset: Utf8PathBuf,

    /// Search text
    #[arg(short, long, default_value = "")]
    query: String,

    /// Top-level tab: food or equipment
    #[arg(short, long, default_value = "food")]
    group: String,

    /// Sub-category (e.g. mushroom, "Mystical Item")
    #[arg(short, long)]
    category: Option<String>,

    /// Browser configuration (JSON)
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 100_000)]
    max_ticks: usize,
}

fn parse_group(text: &str) -> Result<MajorGroup> {
    match text.trim().to_ascii_lowercase().as_str() {
        "food" => Ok(MajorGroup::Food),
        "equipment" | "equip" => Ok(MajorGroup::Equipment),
        other => bail!("Unknown group '{}' (expected food or equipment)", other),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to install log subscriber")?;

    let mut config = match &cli.config {
        Some(path) => BrowserConfig::load(path)?,
        None => BrowserConfig::default(),
    };
    if cli.verbose > 0 {
        config.verbose = true;
    }

    let dataset = DataSet::load_path(&cli.dataset)?;
    info!(path = %cli.dataset, records = dataset.len(), "dataset loaded");
    let host = Host {
        source: &dataset,
        text: &dataset,
        assets: &dataset,
    };

    let mut browser = Browser::new(config);
    browser.set_group(parse_group(&cli.group)?);
    if let Some(name) = &cli.category {
        let category = Category::parse(name).with_context(|| format!("Unknown category '{}'", name))?;
        browser.set_category(Some(category));
    }
    browser.set_query(&cli.query);
    browser.open();

    let mut ticks = 0;
    while !browser.is_settled() {
        if ticks >= cli.max_ticks {
            bail!("Catalog did not settle after {} ticks", ticks);
        }
        browser.tick(&host);
        ticks += 1;
    }
    info!(ticks, entries = browser.state().entries().len(), "catalog settled");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(browser.rows())?);
        return Ok(());
    }
    for row in browser.rows() {
        match row {
            Row::Header { .. } => {
                let label = browser.status_text(&dataset, row).unwrap_or_default();
                println!("== {} ==", label);
            }
            Row::Entry(entry) => {
                let icon = entry.icon.as_ref().map(|i| i.name.as_str()).unwrap_or("-");
                println!("  {:<40} [{}]", entry.label(), icon);
            }
            Row::NoResults | Row::Loading => {
                println!("{}", browser.status_text(&dataset, row).unwrap_or_default());
            }
        }
    }
    Ok(())
}
