use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use nexus_common::{Config, ResearchInput};
use nexus_research::events::{calendar_url_for_company, placeholder_events};
use nexus_research::sources::lookup_profiles;
use nexus_research::{DeepResearcher, Researcher};

#[derive(Parser)]
#[command(name = "nexus-research", about = "Company and topic research from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Research one company across every configured source
    Company {
        name: String,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        twitter: Option<String>,
        /// Skip enrichment lookups
        #[arg(long)]
        no_enrich: bool,
    },
    /// Multi-round search and analysis for a free-text query
    Deep {
        query: String,
        #[arg(long)]
        max_rounds: Option<u8>,
    },
    /// Social profiles for several handles at once
    Profiles { handles: Vec<String> },
    /// Events for a company, from explicit URLs or its guessed calendar
    Events {
        company: String,
        /// Calendar or event URLs; defaults to the guessed calendar URL
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Find events by web search instead of scraping URLs
        #[arg(long)]
        search: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nexus=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Company {
            name,
            website,
            twitter,
            no_enrich,
        } => {
            let input = ResearchInput {
                name,
                website,
                twitter_handle: twitter,
                enrich: no_enrich.then_some(false),
            };
            input.validate()?;
            let result = Researcher::from_config(&config).research_company(&input).await;
            print_json(&result)?;
        }
        Command::Deep { query, max_rounds } => {
            anyhow::ensure!(!query.trim().is_empty(), "query is required");
            let result = DeepResearcher::from_config(&config)
                .deep_research(&query, max_rounds)
                .await;
            print_json(&result)?;
        }
        Command::Profiles { handles } => {
            let researcher = Researcher::from_config(&config);
            let profiles = lookup_profiles(researcher.sources().profiles.as_ref(), &handles).await;
            print_json(&profiles)?;
        }
        Command::Events {
            company,
            urls,
            search,
        } => {
            let researcher = Researcher::from_config(&config);
            let events = if search {
                researcher.events().events_for_company(&company).await?
            } else {
                let urls = if urls.is_empty() {
                    calendar_url_for_company(&company).into_iter().collect()
                } else {
                    urls
                };
                let events = researcher.events().events_from_urls(&company, &urls).await;
                if events.is_empty() {
                    placeholder_events(&urls)
                } else {
                    events
                }
            };
            print_json(&events)?;
        }
    }

    Ok(())
}
