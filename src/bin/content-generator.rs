use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use portfolio_content::{generate_all, projects, watch, Generator, PipelineConfig, PipelineError, Step};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "content-generator")]
#[command(about = "Generate the static JSON content consumed by the portfolio pages")]
struct Args {
    /// Root holding exercises/, utilities/ and projects/
    #[arg(short, long, default_value = "content", global = true)]
    content: PathBuf,

    /// Directory the JSON artifacts are written to
    #[arg(short, long, default_value = "data", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write exercises.json
    Exercises,
    /// Write utilities.json
    Utilities,
    /// Write projects.json and projects-index.json
    Projects {
        #[command(subcommand)]
        action: Option<ProjectAction>,
    },
    /// Run every step in order; any failure exits non-zero
    All,
    /// Regenerate everything whenever the content root changes
    Watch,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create content/projects/<slug>.json from the starter template
    New {
        slug: String,
        #[arg(long, default_value = "web")]
        category: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("portfolio_content=info".parse()?)
                .add_directive("content_generator=info".parse()?),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = PipelineConfig::new(args.content, args.output);

    match args.command {
        Command::All => {
            let reports = generate_all(config).await?;
            let artifacts: usize = reports.iter().map(|r| r.artifacts.len()).sum();
            info!("✅ All steps finished, {} artifacts written", artifacts);
        }
        Command::Exercises => run_standalone(config, Step::Exercises).await?,
        Command::Utilities => run_standalone(config, Step::Utilities).await?,
        Command::Projects { action: None } => run_standalone(config, Step::Projects).await?,
        Command::Projects {
            action: Some(ProjectAction::New { slug, category }),
        } => {
            projects::create_project_template(&config.projects_dir(), &slug, &category)?;
        }
        Command::Watch => {
            let generator = Generator::new(config);
            tokio::task::spawn_blocking(move || watch::watch(&generator)).await??;
        }
    }

    Ok(())
}

// A single step tolerates a missing source directory: it logs and writes
// nothing. Every other failure still exits non-zero.
async fn run_standalone(config: PipelineConfig, step: Step) -> Result<()> {
    let generator = Generator::new(config);
    let outcome = tokio::task::spawn_blocking(move || generator.run(step)).await?;
    match outcome {
        Ok(_) => Ok(()),
        Err(PipelineError::MissingSourceDir(dir)) => {
            error!("❌ {}: source directory not found: {}", step, dir.display());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
