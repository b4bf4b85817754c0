//! Forma CLI - Run the design pipeline on JSON files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, render, validate};

#[derive(Parser)]
#[command(name = "forma")]
#[command(about = "Turn design-intent trees into renderable node trees", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an intent tree against an inventory
    Validate {
        /// Path to the intent tree (JSON)
        tree: String,

        /// Path to the inventory (JSON)
        #[arg(long)]
        inventory: Option<String>,

        /// Show the fixes that would be applied
        #[arg(long)]
        dry_run: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run the full pipeline and print the render tree
    Render {
        /// Path to the intent tree (JSON)
        tree: String,

        /// Path to the inventory (JSON)
        #[arg(long)]
        inventory: Option<String>,

        /// The request the tree was generated from
        #[arg(long, default_value = "")]
        intent: String,

        /// Generator's own confidence in (0, 1]
        #[arg(long)]
        self_assessment: Option<f64>,

        /// Apply previewed results without asking
        #[arg(long)]
        approve: bool,

        /// Write the full run report here instead of stdout
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the resolved configuration
    Config,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            tree,
            inventory,
            dry_run,
            format,
        } => validate::run(validate::ValidateArgs {
            tree,
            inventory,
            dry_run,
            format,
        }),
        Commands::Render {
            tree,
            inventory,
            intent,
            self_assessment,
            approve,
            output,
        } => {
            render::run(render::RenderArgs {
                tree,
                inventory,
                intent,
                self_assessment,
                approve,
                output,
            })
            .await
        }
        Commands::Config => config::run(),
    }
}
