//! pipecheck CLI - pipeline DAG checking service

use clap::{Parser, Subcommand};
use colored::Colorize;

use pipecheck::schema::parse_pipeline;
use pipecheck::variables::extract_variables;
use pipecheck::{
    CycleChecker, FixSuggestion, ParseResponse, PipecheckError, ServeArgs,
    ServerConfig, Traversal,
};

#[derive(Parser)]
#[command(name = "pipecheck")]
#[command(about = "pipecheck - node/edge counts and DAG checks for pipeline graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(ServeArgs),

    /// Check a pipeline JSON file (same validation as POST /pipelines/parse)
    Check {
        /// Path to pipeline .json file
        file: String,

        /// Print the endpoint's JSON response instead of a summary
        #[arg(long)]
        json: bool,

        /// DFS flavour: iterative (explicit stack) or recursive
        #[arg(long, default_value_t = Traversal::Iterative)]
        traversal: Traversal,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipecheck=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => pipecheck::serve(ServerConfig::from(args)).await,
        Commands::Check {
            file,
            json,
            traversal,
        } => check_file(&file, json, traversal).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn check_file(file: &str, json: bool, traversal: Traversal) -> Result<(), PipecheckError> {
    let body = tokio::fs::read(file)
        .await
        .map_err(|source| PipecheckError::Io {
            path: file.to_string(),
            source,
        })?;
    let pipeline = parse_pipeline(&body)?;

    let checker = CycleChecker::new(traversal);
    let (result, cycle) = checker.analyze(&pipeline.nodes, &pipeline.edges);
    let variables = extract_variables(&pipeline.nodes);

    if json {
        let response = ParseResponse { result, variables };
        let out = serde_json::to_string_pretty(&response).map_err(|e| {
            PipecheckError::Deserialize {
                details: e.to_string(),
            }
        })?;
        println!("{}", out);
        return Ok(());
    }

    println!("{} Pipeline '{}'", "→".cyan(), file);
    println!("  Nodes: {}", result.num_nodes);
    println!("  Edges: {}", result.num_edges);
    match cycle {
        None => println!("  {} is a DAG", "✓".green()),
        Some(path) => {
            println!("  {} not a DAG", "✗".red());
            println!("  Cycle: {}", path.join(" → ").yellow());
        }
    }
    if !variables.is_empty() {
        println!("  Variables: {}", variables.join(", "));
    }

    Ok(())
}
