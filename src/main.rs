mod db;
mod details;
mod model;
mod parser;
mod pdf;
mod session;

use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use crate::model::RecordKind;

#[derive(Parser)]
#[command(name = "gu_scraper", about = "Guam Legislature bill & resolution scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Resolutions,
    Bills,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Resolutions => RecordKind::Resolution,
            KindArg::Bills => RecordKind::Bill,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape one session's index into the local database
    Scrape {
        /// Legislative session, e.g. "37"
        session: String,
        /// Which index to walk; the bill pathway is opt-in
        #[arg(short, long, value_enum, default_value = "resolutions")]
        kind: KindArg,
    },
    /// Stored records overview table
    Overview {
        /// Filter by session
        #[arg(short, long)]
        session: Option<String>,
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Dump stored records as JSON lines
    Export {
        /// Filter by session
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Show extraction statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scrape { session, kind } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;

            let client = reqwest::Client::new();
            let converter = pdf::PdftohtmlConverter;
            let scraper = session::SessionScraper {
                fetcher: &client,
                converter: &converter,
            };

            let records = scraper.scrape(&session, kind.into()).await?;
            if records.is_empty() {
                println!("No records found for session {}.", session);
                return Ok(());
            }
            let saved = db::save_records(&conn, &records)?;
            println!("Done: {} records extracted, {} saved.", records.len(), saved);
            Ok(())
        }
        Commands::Overview { session, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let rows = db::fetch_overview(&conn, session.as_deref(), limit)?;
            if rows.is_empty() {
                println!("No records stored. Run 'scrape' first.");
                return Ok(());
            }

            println!(
                "{:>3} | {:<10} | {:<4} | {:<10} | {:<44} | {:>8} | {:>7}",
                "#", "Identifier", "Sess", "Kind", "Title", "Sponsors", "Actions"
            );
            println!("{}", "-".repeat(104));
            for (i, r) in rows.iter().enumerate() {
                let title = if r.withdrawn {
                    format!("{} [WITHDRAWN]", truncate(&r.title, 32))
                } else {
                    truncate(&r.title, 44)
                };
                println!(
                    "{:>3} | {:<10} | {:<4} | {:<10} | {:<44} | {:>8} | {:>7}",
                    i + 1,
                    r.identifier,
                    r.session,
                    r.kind,
                    title,
                    r.sponsor_count,
                    r.action_count
                );
            }
            println!("\n{} records", rows.len());
            Ok(())
        }
        Commands::Export { session } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let records = db::fetch_records(&conn, session.as_deref())?;
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Records:        {}", s.records);
            println!("  Bills:        {}", s.bills);
            println!("  Resolutions:  {}", s.resolutions);
            println!("  Withdrawn:    {}", s.withdrawn);
            println!("Actions:        {}", s.actions);
            println!("Sponsorships:   {}", s.sponsorships);
            println!("Document links: {}", s.document_links);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
