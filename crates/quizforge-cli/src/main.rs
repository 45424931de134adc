//! quizforge CLI — generate assessments from request files.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizforge", version, about = "LLM-backed assessment generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an assessment from a request file
    Generate {
        /// Path to a .toml or .json assessment request
        #[arg(long)]
        request: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the assessment JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate a request file or a generated assessment
    Validate {
        /// Path to a .toml or .json assessment request
        #[arg(long, conflicts_with = "result", required_unless_present = "result")]
        request: Option<PathBuf>,

        /// Path to a generated assessment JSON file
        #[arg(long)]
        result: Option<PathBuf>,
    },

    /// Print the JSON Schema generated assessments must follow
    Schema,

    /// Create starter config, prompt template and example request
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizforge=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            request,
            config,
            output,
            model,
        } => commands::generate::execute(request, config, output, model).await,
        Commands::Validate { request, result } => commands::validate::execute(request, result),
        Commands::Schema => commands::schema::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
