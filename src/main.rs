//! ladle is a CLI tool that extracts structured recipes from recipe web pages
//! and keeps them in a local recipe book.
//!
//! The tool has these commands:
//! 1. `extract` - Extracts recipes from pages, prints them as JSON and optionally saves them
//! 2. `list`, `show`, `delete` - Browse and edit the recipe book
//! 3. `compose` - Writes the recipe book to a Markdown file

use std::fs;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use llm::LLMProvider;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatProvider;
use log::{LevelFilter, error, info};
use url::Url;

use ladle::{
    ExtractContext, ExtractError, ExtractionConfig, FetchConfig, PageFetcher,
    compose::compose,
    constants::{
        COMMENTS_MAX_TOKENS, DEFAULT_MODEL_URL, EXTRACTION_MAX_TOKENS, FETCH_TIMEOUT_SECS,
        MODEL_API_KEY_ENV_NAME, MODEL_TIMEOUT_SECS,
    },
    extract_recipe,
    generate::build_rate_limiter,
    storage::Storage,
};

/// A CLI tool to extract structured recipes from recipe web pages
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Extract recipes from pages and print them as JSON
    Extract(ExtractArgs),
    /// List recipes saved in the recipe book
    List {
        /// Path to the recipe book database
        db: String,
    },
    /// Print a saved recipe as JSON
    Show {
        /// Path to the recipe book database
        db: String,
        /// Source URL of the recipe
        url: String,
    },
    /// Delete a saved recipe
    Delete {
        /// Path to the recipe book database
        db: String,
        /// Source URL of the recipe
        url: String,
    },
    /// Write the recipe book to a Markdown file
    Compose {
        /// Path to the recipe book database
        db: String,
        /// Path to output file to compose recipes to
        output_file: String,
    },
}

#[derive(Args)]
struct ExtractArgs {
    /// Recipe page URLs
    #[arg(required = true)]
    urls: Vec<String>,
    /// Save extracted recipes to this recipe book database
    #[arg(long)]
    db: Option<String>,
    /// URL of the LLM model used as the last-resort extractor (backend://model)
    #[arg(long, short, default_value = DEFAULT_MODEL_URL)]
    model: String,
    /// Never call a language model; pages without structured data fail
    #[arg(long)]
    no_model: bool,
    /// Path to a file with an extraction prompt template ({url}, {html})
    #[arg(long, short = 'p')]
    prompt_file: Option<String>,
    /// Rate limit: model requests per minute (default: no limit)
    #[arg(long, short = 'r')]
    rpm: Option<u32>,
    /// Page fetch timeout in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECS)]
    timeout: u64,
    /// Model request timeout in seconds
    #[arg(long, default_value_t = MODEL_TIMEOUT_SECS)]
    model_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Command::Extract(args) => handle_extract_command(args).await,
        Command::List { db } => handle_list_command(&db),
        Command::Show { db, url } => handle_show_command(&db, &url),
        Command::Delete { db, url } => handle_delete_command(&db, &url),
        Command::Compose { db, output_file } => compose(&db, &output_file).map(|_| ()),
    }
}

fn build_model(model: &str, max_tokens: u32) -> Result<Box<dyn LLMProvider>> {
    let model_url = Url::parse(model).map_err(|e| anyhow::anyhow!("Invalid model URL: {}", e))?;
    let llm_builder = LLMBuilder::new()
        .backend(
            LLMBackend::from_str(model_url.scheme())
                .map_err(|e| anyhow::anyhow!("Invalid LLM backend: {}", e))?,
        )
        .model(
            [
                model_url
                    .host_str()
                    .context("Specify model name as host URL.")?,
                model_url.username(),
            ]
            .iter()
            .filter(|x| !x.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(":"),
        )
        .max_tokens(max_tokens);

    let llm_builder = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(model_key) => llm_builder.api_key(model_key),
        Err(err) => {
            info!("{err} while reading {MODEL_API_KEY_ENV_NAME}");
            llm_builder
        }
    };

    llm_builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build LLM model: {}", e))
}

fn as_chat(model: &dyn LLMProvider) -> &dyn ChatProvider {
    model
}

async fn handle_extract_command(args: ExtractArgs) -> Result<()> {
    let models = if args.no_model {
        None
    } else {
        Some((
            build_model(&args.model, EXTRACTION_MAX_TOKENS)?,
            build_model(&args.model, COMMENTS_MAX_TOKENS)?,
        ))
    };

    let prompt_template = args
        .prompt_file
        .as_deref()
        .map(|file| {
            fs::read_to_string(file).with_context(|| format!("Failed to read prompt file: {file}"))
        })
        .transpose()?;

    let rate_limiter = args.rpm.and_then(build_rate_limiter);
    let storage = args.db.as_deref().map(Storage::new).transpose()?;
    let fetcher = PageFetcher::new(&FetchConfig {
        timeout: Duration::from_secs(args.timeout),
        ..FetchConfig::default()
    })?;

    let ctx = ExtractContext {
        model: models.as_ref().map(|(model, _)| as_chat(model.as_ref())),
        summary_model: models.as_ref().map(|(_, model)| as_chat(model.as_ref())),
        prompt_template: prompt_template.as_deref(),
        rate_limiter: rate_limiter.as_ref(),
        config: ExtractionConfig {
            model_timeout: Duration::from_secs(args.model_timeout),
            ..ExtractionConfig::default()
        },
    };

    let mut failures = 0;
    for url in &args.urls {
        match extract_recipe(url, &fetcher, &ctx).await {
            Ok(recipe) => {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
                if let Some(storage) = &storage {
                    storage.upsert_recipe(&recipe, Utc::now())?;
                    info!("Saved {url} to the recipe book");
                }
            }
            Err(err) if err.is_fetch_failure() => {
                error!("{url}: {err}. {}", ExtractError::USER_MESSAGE);
                failures += 1;
            }
            Err(err) => {
                error!("{url}: {err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} URLs failed", args.urls.len());
    }
    Ok(())
}

fn handle_list_command(db: &str) -> Result<()> {
    let storage = Storage::new(db)?;
    let recipes = storage.list_recipes()?;

    if recipes.is_empty() {
        info!("The recipe book {db} is empty.");
    }
    for summary in recipes {
        println!(
            "{}\t{}\t{} ingredients, {} steps\t{}",
            summary.saved_at.format("%Y-%m-%d %H:%M"),
            summary.title,
            summary.ingredient_count,
            summary.step_count,
            summary.source_url
        );
    }

    Ok(())
}

fn handle_show_command(db: &str, url: &str) -> Result<()> {
    let storage = Storage::new(db)?;
    let stored = storage
        .get_recipe(url)?
        .with_context(|| format!("Recipe {url} not found in {db}"))?;

    println!("{}", serde_json::to_string_pretty(&stored.recipe)?);
    Ok(())
}

fn handle_delete_command(db: &str, url: &str) -> Result<()> {
    let storage = Storage::new(db)?;
    if storage.delete_recipe(url)? {
        info!("Deleted {url}");
    } else {
        info!("Recipe {url} not found in {db}");
    }
    Ok(())
}
