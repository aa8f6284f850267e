//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use stagegate_domain::{Complexity, ProjectType, QualityContext, Stage, UserExperience};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// CLI arguments for stagegate
#[derive(Parser, Debug)]
#[command(name = "stagegate")]
#[command(author, version, about = "Quality gates and multi-model consensus for a staged product pipeline")]
#[command(long_about = r#"
Stagegate scores the output of each pipeline stage, decides whether the
pipeline may proceed, and checks that consecutive stages agree.

Stages run in order:
  idea_refinement -> prd_generation -> ux_requirements
    -> technical_analysis -> implementation_playbook

Configuration files are loaded from (in priority order):
1. STAGEGATE_* environment variables (sections split on "__")
2. --config <path>     Explicit config file
3. ./stagegate.toml    Project-level config
4. ~/.config/stagegate/config.toml   Global config

Example:
  stagegate score idea_refinement idea.json --project-type mvp
  stagegate evaluate context.json -b gpt -b claude -b gemini --escalate
  stagegate gate proj-1 prd_generation --content prd.json
  stagegate advance proj-1 ux_requirements
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format (defaults to the configured format, then text)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write diagnostic logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a stage's content file and decide the quality gate
    Score {
        /// Stage identifier (e.g. idea_refinement)
        stage: Stage,

        /// JSON file with the stage content
        #[arg(value_name = "FILE")]
        content: PathBuf,

        /// JSON file with a technical evaluation to fold into the score
        #[arg(long, value_name = "FILE")]
        evaluation: Option<PathBuf>,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show the context-adjusted thresholds for a stage
    Thresholds {
        stage: Stage,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Ask several backends to evaluate an architecture and merge their answers
    Evaluate {
        /// JSON file with the project context to evaluate
        #[arg(value_name = "FILE")]
        content: PathBuf,

        /// Backends to query (can be specified multiple times; defaults to config)
        #[arg(short, long = "backend", value_name = "ID")]
        backends: Vec<String>,

        /// Retry once with the configured escalation backend when quality is low
        #[arg(long)]
        escalate: bool,

        #[command(flatten)]
        context: ContextArgs,
    },

    /// Check whether a stored project is ready to enter a stage
    Readiness {
        /// Project id in the store
        project: String,
        stage: Stage,
    },

    /// Compare two stages of a stored project for consistency
    Consistency {
        project: String,
        source: Stage,
        target: Stage,
    },

    /// Preview the context handed from one stage to another
    Handoff {
        project: String,
        source: Stage,
        target: Stage,
    },

    /// Score a stored stage, record the result and update its status
    Gate {
        project: String,
        stage: Stage,

        /// Replace the stored content with this JSON file first
        #[arg(long, value_name = "FILE")]
        content: Option<PathBuf>,

        /// Run a multi-backend architecture evaluation and fold it in
        #[arg(long)]
        evaluate: bool,
    },

    /// Move a stored project into a stage when its prerequisites are met
    Advance { project: String, stage: Stage },

    /// Show configuration file locations and the effective configuration
    ShowConfig,
}

/// Project context factors shared by the scoring commands
#[derive(Args, Debug, Clone, Default)]
pub struct ContextArgs {
    /// simple | medium | complex | enterprise
    #[arg(long, value_name = "LEVEL")]
    pub complexity: Option<Complexity>,

    /// novice | intermediate | expert
    #[arg(long, value_name = "LEVEL")]
    pub user_experience: Option<UserExperience>,

    /// prototype | mvp | production
    #[arg(long, value_name = "TYPE")]
    pub project_type: Option<ProjectType>,
}

impl ContextArgs {
    pub fn to_context(&self) -> QualityContext {
        QualityContext {
            complexity: self.complexity,
            user_experience: self.user_experience,
            project_type: self.project_type,
        }
    }
}
