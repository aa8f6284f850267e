//! CLI entrypoint for stagegate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde_json::Value;
use stagegate_application::{
    AdvanceStageUseCase, EvaluateArchitectureInput, EvaluateArchitectureUseCase, EvaluationLogger,
    GateStageInput, GateStageUseCase, NoEvaluationLog, NoProgress, ProgressNotifier, ProjectStore,
};
use stagegate_domain::{
    ContentRecord, CrossStageValidator, QualityContext, QualityGateEngine, TechnicalEvaluation,
};
use stagegate_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, JsonFileProjectStore, JsonlEvaluationLogger,
    ReplayModelInvoker,
};
use stagegate_presentation::{Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _guard = init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting stagegate");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    let format = cli.output.unwrap_or(match config.output.format {
        Some(FileOutputFormat::Json) => OutputFormat::Json,
        Some(FileOutputFormat::Text) | None => OutputFormat::Text,
    });
    ConsoleFormatter::set_color(config.output.color);

    let app = App::new(config, format, cli.quiet);
    app.run(cli.command, cli.config.as_ref()).await
}

fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "stagegate.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

/// Configured adapters shared by every command
struct App {
    config: FileConfig,
    format: OutputFormat,
    quiet: bool,
    store: Arc<JsonFileProjectStore>,
    logger: Arc<dyn EvaluationLogger>,
}

impl App {
    fn new(config: FileConfig, format: OutputFormat, quiet: bool) -> Self {
        // === Dependency Injection ===
        let store = Arc::new(JsonFileProjectStore::new(config.store.directory.clone()));
        let logger: Arc<dyn EvaluationLogger> = match &config.logging.evaluation_log {
            Some(path) => match JsonlEvaluationLogger::new(path) {
                Some(logger) => {
                    info!("Evaluation log: {}", logger.path().display());
                    Arc::new(logger)
                }
                None => Arc::new(NoEvaluationLog),
            },
            None => Arc::new(NoEvaluationLog),
        };

        Self {
            config,
            format,
            quiet,
            store,
            logger,
        }
    }

    async fn run(&self, command: Command, explicit_config: Option<&PathBuf>) -> Result<()> {
        match command {
            Command::Score {
                stage,
                content,
                evaluation,
                context,
            } => {
                let content = ContentRecord::new(read_json(&content)?);
                let evaluation = match evaluation {
                    Some(path) => Some(
                        serde_json::from_value::<TechnicalEvaluation>(read_json(&path)?)
                            .with_context(|| {
                                format!("{} is not a technical evaluation", path.display())
                            })?,
                    ),
                    None => None,
                };
                let result = QualityGateEngine::default().score_with_evaluation(
                    &stage,
                    &content,
                    &context.to_context(),
                    evaluation.as_ref(),
                );
                self.print(&result, || ConsoleFormatter::format_quality(&result));
            }

            Command::Thresholds { stage, context } => {
                let thresholds =
                    QualityGateEngine::default().get_thresholds(&stage, &context.to_context());
                self.print(&thresholds, || ConsoleFormatter::format_thresholds(&thresholds));
            }

            Command::Evaluate {
                content,
                backends,
                escalate,
                context,
            } => {
                let content = ContentRecord::new(read_json(&content)?);
                let evaluation = self
                    .evaluate(content, context.to_context(), backends, escalate)
                    .await?;
                self.print(&evaluation, || ConsoleFormatter::format_evaluation(&evaluation));
            }

            Command::Readiness { project, stage } => {
                let project = self.store.load(&project).await?;
                let result = CrossStageValidator::default().check_readiness(&stage, &project);
                self.print(&result, || ConsoleFormatter::format_validation(&result));
            }

            Command::Consistency {
                project,
                source,
                target,
            } => {
                let project = self.store.load(&project).await?;
                let result =
                    CrossStageValidator::default().check_consistency(&source, &target, &project);
                self.print(&result, || ConsoleFormatter::format_validation(&result));
            }

            Command::Handoff {
                project,
                source,
                target,
            } => {
                let project = self.store.load(&project).await?;
                let handoff =
                    CrossStageValidator::default().prepare_handoff(&source, &target, &project);
                self.print(&handoff, || ConsoleFormatter::format_handoff(&handoff));
            }

            Command::Gate {
                project,
                stage,
                content,
                evaluate,
            } => {
                let content = match content {
                    Some(path) => Some(ContentRecord::new(read_json(&path)?)),
                    None => None,
                };

                let mut input = GateStageInput::new(project.clone(), stage);
                if evaluate {
                    let snapshot = self.store.load(&project).await?;
                    let subject = content.clone().unwrap_or_else(|| {
                        ContentRecord::new(Value::Object(snapshot.available_context()))
                    });
                    let evaluation = self
                        .evaluate(subject, snapshot.context, Vec::new(), true)
                        .await?;
                    input = input.with_evaluation(evaluation);
                }
                if let Some(content) = content {
                    input = input.with_content(content);
                }

                let output = GateStageUseCase::new(self.store.clone())
                    .with_logger(self.logger.clone())
                    .execute(input)
                    .await?;
                self.print(&output, || {
                    ConsoleFormatter::format_gate(&output.result, output.status)
                });
            }

            Command::Advance { project, stage } => {
                let output = AdvanceStageUseCase::new(self.store.clone())
                    .with_logger(self.logger.clone())
                    .execute(&project, &stage)
                    .await?;
                self.print(&output, || {
                    let mut text = ConsoleFormatter::format_validation(&output.readiness);
                    if let Some(handoff) = &output.handoff {
                        text.push('\n');
                        text.push_str(&ConsoleFormatter::format_handoff(handoff));
                    }
                    text
                });
            }

            Command::ShowConfig => {
                let sources = ConfigLoader::config_sources(explicit_config);
                match self.format {
                    OutputFormat::Json => {
                        println!("{}", ConsoleFormatter::format_json(&self.config));
                    }
                    OutputFormat::Text => {
                        println!(
                            "{}",
                            ConsoleFormatter::format_config_sources(
                                sources
                                    .iter()
                                    .map(|s| (s.label, s.location.as_str(), s.found))
                            )
                        );
                        println!("Effective configuration:\n");
                        println!("{}", toml::to_string_pretty(&self.config)?);
                    }
                }
            }
        }

        Ok(())
    }

    /// Run the multi-backend evaluation against the replay invoker
    async fn evaluate(
        &self,
        content: ContentRecord,
        context: QualityContext,
        backends: Vec<String>,
        escalate: bool,
    ) -> Result<TechnicalEvaluation> {
        let Some(path) = &self.config.replay.path else {
            bail!("No model backends available: set [replay] path in the configuration");
        };
        let invoker = Arc::new(ReplayModelInvoker::from_path(path)?);

        let backends = if !backends.is_empty() {
            backends
        } else if !self.config.evaluation.backends.is_empty() {
            self.config.evaluation.backends.clone()
        } else {
            invoker.backend_ids()
        };
        if backends.is_empty() {
            bail!("No backends to evaluate with. Use --backend or set [evaluation] backends.");
        }

        let extra = if escalate {
            let extra = self.config.evaluation.escalation_backend.as_deref();
            if extra.is_none() {
                warn!("Escalation requested but no escalation_backend is configured");
            }
            extra
        } else {
            None
        };

        // Ctrl-C cancels the whole fan-out
        let token = CancellationToken::new();
        let watcher = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watcher.cancel();
            }
        });

        let use_case = EvaluateArchitectureUseCase::new(invoker)
            .with_logger(self.logger.clone())
            .with_cancellation(token);
        let input = EvaluateArchitectureInput::new(content, backends)
            .with_quality_context(context)
            .with_params(self.config.evaluation_params());

        let show_progress = !self.quiet && self.format == OutputFormat::Text;
        let progress: Box<dyn ProgressNotifier> = if show_progress {
            Box::new(ProgressReporter::new())
        } else {
            Box::new(NoProgress)
        };

        Ok(use_case
            .execute_with_escalation(input, extra, progress.as_ref())
            .await?)
    }

    fn print<T: serde::Serialize>(&self, value: &T, text: impl FnOnce() -> String) {
        let output = match self.format {
            OutputFormat::Json => ConsoleFormatter::format_json(value),
            OutputFormat::Text => text(),
        };
        println!("{}", output);
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
