// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use srtlingo::app_config::{self, Config, TranslationProvider};
use srtlingo::file_utils::FileManager;
use srtlingo::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for srtlingo
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// srtlingo - SRT subtitle translator
///
/// Translates the text of SRT subtitle files while keeping indices, timings
/// and line layout intact.
#[derive(Parser, Debug)]
#[command(name = "srtlingo")]
#[command(version)]
#[command(about = "Translate SRT subtitle files while preserving their structure")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "srtlingo translates SRT subtitle files block by block, writing <name>_<lang>.srt next to each input.

EXAMPLES:
    srtlingo movie.srt                          # Translate using default config
    srtlingo -f movie.srt                       # Force overwrite existing output
    srtlingo -t de a.srt b.srt                  # Translate two files to German
    srtlingo -p ollama -m llama3.2:3b movie.srt # Use a local Ollama model
    srtlingo --log-level debug /movies/         # Process entire directory with debug logging
    srtlingo completions bash > srtlingo.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google - Google web translation endpoint (default, no key required)
    ollama - Local Ollama server (default: llama3.2:3b)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Subtitle files or directories to process
    #[arg(value_name = "INPUTS")]
    inputs: Vec<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use with the Ollama provider
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr') or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'fa', 'de', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Number of blocks sent per batch call
    #[arg(short, long)]
    window_size: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍", "1;36"),
            Level::Trace => ("📋", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config tells us otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "srtlingo", &mut std::io::stdout());
        return Ok(());
    }

    run_translate(cli).await
}

// @applies: CLI overrides on top of the file configuration
fn apply_overrides(config: &mut Config, options: &CommandLineOptions) {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.ollama.model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(window_size) = options.window_size {
        config.batch.window_size = window_size;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_translate(options: CommandLineOptions) -> Result<()> {
    if options.inputs.is_empty() {
        return Err(anyhow!("At least one input file or directory is required (see --help)"));
    }

    // Apply a CLI log level before the config is read
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config.clone())?;

    let inputs = FileManager::expand_inputs(&options.inputs, &config.target_language)?;
    if inputs.is_empty() {
        return Err(anyhow!("No subtitle files found in the given inputs"));
    }
    info!("Found {} subtitle file(s)", inputs.len());

    tokio::spawn(watch_interrupts(
        controller.cancel_flag(),
        tokio::signal::ctrl_c,
        || std::process::exit(130),
    ));

    let summary = controller.run(&inputs, options.force_overwrite).await;

    if summary.cancelled {
        return Err(anyhow!("Translation interrupted"));
    }
    if summary.failed > 0 {
        return Err(anyhow!("{} document(s) failed to translate", summary.failed));
    }

    Ok(())
}

/// First interrupt raises the cancel flag; a second one calls `force_exit`
async fn watch_interrupts<S, Fut>(
    cancel_flag: Arc<AtomicBool>,
    mut next_signal: S,
    force_exit: impl FnOnce(),
) where
    S: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return;
    }
    warn!("Interrupted, finishing the current window (press Ctrl-C again to quit now)");
    cancel_flag.store(true, Ordering::SeqCst);

    if next_signal().await.is_ok() {
        warn!("Interrupted again, exiting");
        force_exit();
    }
}
