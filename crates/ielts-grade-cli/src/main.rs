//! ielts-grade CLI — quiz authoring checks and batch grading.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "ielts-grade", version, about = "IELTS answer grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Grade learner attempts against a quiz
    Grade {
        /// Path to a .toml or .json quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to an attempt file or a directory of them
        #[arg(long)]
        attempts: PathBuf,

        /// Max attempts graded at once
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format: text, json, markdown
        #[arg(long)]
        format: Option<String>,

        /// Directory the JSON report is saved to
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check one answer against an accepted-answer string
    Check {
        /// Pipe-delimited accepted answers, e.g. "his daughter|daughter"
        #[arg(long)]
        accepted: String,

        /// The learner's answer
        #[arg(long)]
        answer: String,
    },

    /// Convert a raw score to an IELTS band
    Band {
        /// Raw score (number of correct answers)
        #[arg(long)]
        score: u32,

        /// Scoring table: academic_reading, general_reading, listening
        #[arg(long)]
        scoring: String,
    },

    /// Render a saved grading report
    Report {
        /// Report JSON written by `grade`
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config, quiz and attempt files
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ielts_grade=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Grade {
            quiz,
            attempts,
            parallelism,
            format,
            output,
            config,
        } => commands::grade::execute(quiz, attempts, parallelism, format, output, config).await,
        Commands::Check { accepted, answer } => commands::check::execute(accepted, answer),
        Commands::Band { score, scoring } => commands::band::execute(score, scoring),
        Commands::Report { input, format } => commands::report::execute(input, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
