//! # Company Enricher CLI
//!
//! Command-line front end for the enrichment pipeline.
//!
//! ## Subcommands
//!
//! - `add`: register a company and enrich it with a summary and products
//! - `show`: print a stored company with its products
//! - `parse`: run the response interpreter on a file or stdin (offline)
//! - `serve`: run the HTTP endpoint
//!
//! Companies go to Supabase by default; `--database <path>` switches to a
//! local libsql file. Settings come from the environment or a `.env` file.

mod telemetry;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, CommandFactory, Parser, Subcommand};
use company_enricher::config::{EnrichOptions, OpenAiSettings};
use company_enricher::enrich::{self, Enricher, Enrichment};
use company_enricher::interpreter::{ParseResult, interpret_with_strategy};
use company_enricher::model::Client;
use company_enricher::server;
use company_enricher::store::{CompanyId, CompanyRecord, CompanyStore, LocalStore, SupabaseStore};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Enrich companies with LLM-generated summaries and product lists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a company and enrich it
    Add(AddArgs),

    /// Show a stored company and its products
    Show(ShowArgs),

    /// Interpret a model reply read from a file or stdin
    Parse(ParseArgs),

    /// Run the HTTP server
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    /// Company name
    #[arg(required = true)]
    name: String,

    /// Company website
    #[arg(required = true)]
    website: String,

    /// Local database path (defaults to Supabase)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Chat model to use (overrides OPENAI_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Mention the website in the prompt
    #[arg(long)]
    include_website: bool,

    /// Only prompt and parse, without storing anything
    #[arg(long)]
    dry_run: bool,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Company id
    #[arg(required = true)]
    id: String,

    /// Local database path (defaults to Supabase)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// File holding the model reply (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Local database path (defaults to Supabase)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Also write logs to daily files in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Some(Commands::Serve(args)) => args.log_dir.as_deref(),
        _ => None,
    };
    let _otel = telemetry::init_tracing_subscriber(log_dir)?;

    // Execute the appropriate command
    match cli.command {
        Some(Commands::Add(args)) => {
            add_command(args).await?;
        }
        Some(Commands::Show(args)) => {
            show_command(args).await?;
        }
        Some(Commands::Parse(args)) => {
            parse_command(args).await?;
        }
        Some(Commands::Serve(args)) => {
            serve_command(args).await?;
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

async fn open_local(path: &Path) -> anyhow::Result<LocalStore> {
    Ok(LocalStore::open(&path.to_string_lossy()).await?)
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message);
    spinner
}

#[instrument]
async fn add_command(args: AddArgs) -> anyhow::Result<()> {
    let mut settings = OpenAiSettings::from_env()?;
    if let Some(model) = &args.model {
        settings = settings.with_model(model);
    }
    let client = Client::new_openai(&settings);
    let options = EnrichOptions::builder()
        .include_website(args.include_website)
        .build();

    if args.dry_run {
        let progress = spinner(format!("Asking {} about {}...", client.model_name(), args.name));
        let parsed = enrich::preview(&client, &args.name, &args.website, &options).await;
        progress.finish_and_clear();

        tracing::info!("Dry run, nothing stored");
        return print_parse_result(&parsed?, &args.format);
    }

    let enrichment = match &args.database {
        Some(path) => {
            let enricher = Enricher::with_options(client, open_local(path).await?, options);
            enrich_company(&enricher, &args).await?
        }
        None => {
            let enricher = Enricher::with_options(client, SupabaseStore::from_env()?, options);
            enrich_company(&enricher, &args).await?
        }
    };

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&enrichment)?);
        }
        _ => {
            println!("Company ID: {}", enrichment.company_id);
            println!("Summary: {}", enrichment.summary);
            print_products(&enrichment.products);
        }
    }

    Ok(())
}

async fn enrich_company<C, S>(enricher: &Enricher<C, S>, args: &AddArgs) -> anyhow::Result<Enrichment>
where
    C: rig::completion::CompletionModel,
    S: CompanyStore,
{
    let progress = spinner(format!("Enriching {}...", args.name));
    let result = enricher.add_company(&args.name, &args.website).await;
    match &result {
        Ok(enrichment) => progress.finish_with_message(format!(
            "Enriched {} with {} products",
            args.name,
            enrichment.products.len()
        )),
        Err(_) => progress.abandon_with_message(format!("Failed to enrich {}", args.name)),
    }
    Ok(result?)
}

#[instrument]
async fn show_command(args: ShowArgs) -> anyhow::Result<()> {
    let id: CompanyId = args.id.parse()?;

    let record = match &args.database {
        Some(path) => open_local(path).await?.fetch_company(&id).await?,
        None => SupabaseStore::from_env()?.fetch_company(&id).await?,
    };
    let record = record.ok_or_else(|| anyhow!("Company {} not found", id))?;

    print_company(&record, &args.format)
}

fn print_company(record: &CompanyRecord, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        _ => {
            println!("Company ID: {}", record.id);
            println!("Name: {}", record.name);
            println!("Website: {}", record.website);
            println!(
                "Description: {}",
                record.description.as_deref().unwrap_or("(none)")
            );
            print_products(&record.products);
        }
    }
    Ok(())
}

#[instrument]
async fn parse_command(args: ParseArgs) -> anyhow::Result<()> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };

    let (strategy, parsed) = interpret_with_strategy(&text);
    tracing::debug!(%strategy, "Interpreted reply");

    print_parse_result(&parsed, &args.format)
}

fn print_parse_result(parsed: &ParseResult, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(parsed)?);
        }
        _ => {
            println!("Summary: {}", parsed.summary);
            print_products(&parsed.products);
        }
    }
    Ok(())
}

fn print_products(products: &[String]) {
    if products.is_empty() {
        println!("Products: (none)");
        return;
    }
    println!("Products:");
    for (i, product) in products.iter().enumerate() {
        println!("{}. {}", i + 1, product);
    }
}

#[instrument]
async fn serve_command(args: ServeArgs) -> anyhow::Result<()> {
    let client = Client::new_openai_from_env()?;

    let router = match &args.database {
        Some(path) => server::create_router(Arc::new(Enricher::new(client, open_local(path).await?))),
        None => server::create_router(Arc::new(Enricher::new(client, SupabaseStore::from_env()?))),
    };

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    server::run(listener, router).await?;

    Ok(())
}
