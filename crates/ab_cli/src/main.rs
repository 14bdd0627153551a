use std::sync::Arc;

use ab_pipeline::{
    create_oracle, init_logging, start_scheduler, BlogJob, GenerateOptions, Scheduler,
};
use ab_web::AppState;
use anyhow::Result;
use clap::{Args, Parser};
use tracing::info;

mod settings;

use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "autoblog", author, version, about = "Generate, deduplicate and publish blog posts")]
pub struct Cli {
    /// Storage backend: memory (default) or sqlite
    #[arg(long, global = true)]
    storage: Option<String>,
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Model to use for inference. Available models: ollama (default), deepseek, dummy
    #[arg(long, global = true)]
    model: Option<String>,
    #[arg(long, global = true)]
    model_url: Option<String>,
    /// Duplicate detection strategy: lexical (default) or embedding
    #[arg(long, global = true)]
    oracle: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate one post and print the result
    Generate(GenerateArgs),
    /// Generate several posts one after another
    Batch {
        #[arg(long, default_value_t = 3)]
        count: usize,
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Serve the HTTP API and run the scheduler when enabled
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    Slugs {
        #[command(subcommand)]
        command: SlugCommands,
    },
}

#[derive(clap::Subcommand, Debug)]
enum SlugCommands {
    /// Re-derive every post's slug from its title
    Backfill,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    subcategory: Option<String>,
    /// May be repeated
    #[arg(long = "keyword")]
    keywords: Vec<String>,
    #[arg(long)]
    min_words: Option<u32>,
    #[arg(long)]
    max_words: Option<u32>,
    #[arg(long)]
    tone: Option<String>,
    /// Publish immediately instead of saving a draft
    #[arg(long)]
    publish: bool,
}

impl From<GenerateArgs> for GenerateOptions {
    fn from(args: GenerateArgs) -> Self {
        GenerateOptions {
            category: args.category,
            subcategory: args.subcategory,
            keywords: args.keywords,
            min_words: args.min_words,
            max_words: args.max_words,
            tone: args.tone,
            auto_publish: args.publish,
        }
    }
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(storage) = &cli.storage {
        settings.storage = storage.clone();
    }
    if cli.database_url.is_some() {
        settings.database_url = cli.database_url.clone();
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if cli.model_url.is_some() {
        settings.model_url = cli.model_url.clone();
    }
    if let Some(oracle) = &cli.oracle {
        settings.oracle = oracle.clone();
    }
    settings
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = apply_overrides(Settings::from_env()?, &cli);

    let storage = ab_storage::create_storage(&settings.storage, settings.database_url.as_deref()).await?;
    let model = ab_inference::create_model(&settings.model, &settings.inference_config())?;
    let config = settings.pipeline_config();
    let oracle = create_oracle(&settings.oracle, storage.clone(), model.clone(), &config)?;
    let job = Arc::new(BlogJob::new(model, storage, oracle, config));

    match cli.command {
        Commands::Generate(args) => {
            let outcome = job.generate_and_publish(&args.into()).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.success {
                std::process::exit(1);
            }
        }
        Commands::Batch { count, args } => {
            let outcomes = job.generate_batch(count, &args.into()).await;
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            let counts = job.publisher().status_counts().await?;
            let summary: Vec<String> = counts.iter().map(|(status, n)| format!("{}={}", status, n)).collect();
            info!("Posts by status: {}", summary.join(", "));
        }
        Commands::Serve { port } => {
            let scheduler = Arc::new(Scheduler::new());
            if start_scheduler(&scheduler, job.clone(), &settings.schedule_config()) {
                info!("⏰ Scheduler started ({})", settings.schedule_interval);
            }
            ab_web::serve(AppState::new(job, scheduler), port.unwrap_or(settings.port)).await?;
        }
        Commands::Slugs {
            command: SlugCommands::Backfill,
        } => {
            let updated = job.publisher().backfill_slugs().await?;
            for post in &updated {
                println!("{} -> {}", post.title, post.slug);
            }
            info!("Updated {} slugs", updated.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::parse_from([
            "autoblog", "--model", "dummy", "generate", "--category", "Tech", "--keyword", "rust",
            "--keyword", "async", "--publish",
        ]);
        let settings = apply_overrides(Settings::default(), &cli);
        assert_eq!(settings.model, "dummy");
        assert_eq!(settings.storage, "memory");

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let options: GenerateOptions = args.into();
        assert_eq!(options.category.as_deref(), Some("Tech"));
        assert_eq!(options.keywords, vec!["rust", "async"]);
        assert!(options.auto_publish);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["autoblog", "batch", "--count", "5", "--storage", "sqlite"]);
        assert_eq!(cli.storage.as_deref(), Some("sqlite"));
        assert!(matches!(cli.command, Commands::Batch { count: 5, .. }));
    }
}
