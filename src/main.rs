// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use sqlwai::app_config::{Config, GenerationProvider, LogLevel};
use sqlwai::translation::{SchemaStore, SqlTranslator};
use sqlwai::rpc;

/// CLI Wrapper for GenerationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenerationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliGenerationProvider> for GenerationProvider {
    fn from(cli_provider: CliGenerationProvider) -> Self {
        match cli_provider {
            CliGenerationProvider::Ollama => GenerationProvider::Ollama,
            CliGenerationProvider::OpenAI => GenerationProvider::OpenAI,
            CliGenerationProvider::Anthropic => GenerationProvider::Anthropic,
            CliGenerationProvider::LMStudio => GenerationProvider::LMStudio,
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

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the JSON-RPC server (default command)
    Serve,

    /// Translate a single question and print the reply
    Translate {
        /// Natural-language question
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Generate shell completions for sqlwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that touches the configuration
#[derive(Args, Debug, Clone)]
struct SharedOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Generation provider to use
    #[arg(short, long, value_enum, global = true)]
    provider: Option<CliGenerationProvider>,

    /// Model name to use for generation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for the selected provider
    #[arg(long, env = "SQLWAI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Address to bind the RPC server to
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to bind the RPC server to
    #[arg(long, global = true)]
    port: Option<u16>,

    /// JSON schema document loaded at startup
    #[arg(short, long, global = true)]
    schema_file: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

/// SQLwAI - Natural-language SQL with AI
///
/// Translates questions into read-only SQL queries over a caller-supplied
/// database schema using various AI providers (Ollama, OpenAI, Anthropic).
#[derive(Parser, Debug)]
#[command(name = "sqlwai")]
#[command(author = "SQLwAI Team")]
#[command(version)]
#[command(about = "AI-powered natural-language to SQL server")]
#[command(long_about = "SQLwAI serves a JSON-RPC endpoint that turns natural-language questions into SELECT statements.

EXAMPLES:
    sqlwai                                      # Serve using default config
    sqlwai serve --port 8080                    # Serve on another port
    sqlwai -p openai -m gpt-4o serve            # Use specific provider and model
    sqlwai -s tables.json translate \"how many users?\"
    sqlwai --log-level debug                    # Serve with debug logging
    sqlwai completions bash > sqlwai.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.1)
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    shared: SharedOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_colour_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies (hyper, reqwest) stay quiet below warn
        metadata.level() <= self.level
            && (metadata.target().starts_with("sqlwai") || metadata.level() <= Level::Warn)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_colour_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts every level; log::max_level is narrowed once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "sqlwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate { query }) => run_translate(&cli.shared, &query).await,
        Some(Commands::Serve) | None => run_serve(&cli.shared).await,
    }
}

/// Load the config file, apply CLI overrides and validate the result
fn load_config(options: &SharedOptions) -> Result<Config> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    if !options.config_path.exists() {
        warn!("Config file not found at '{}', creating default config.", options.config_path.display());
    }
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.generation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.generation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.generation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(host) = &options.host {
        config.server.host = host.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    if let Some(schema_file) = &options.schema_file {
        config.schema_file = schema_file.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

/// Build the schema store from the configured schema file
fn bootstrap_schema(config: &Config) -> Arc<SchemaStore> {
    let store = Arc::new(SchemaStore::new());
    let path = Path::new(&config.schema_file);
    match store.load_from_file(path) {
        Ok(true) => info!("Loaded schema from {}", path.display()),
        Ok(false) => warn!("Schema file {} not found; waiting for updateContext", path.display()),
        Err(e) => warn!("Ignoring schema file {}: {}", path.display(), e),
    }
    store
}

async fn run_serve(options: &SharedOptions) -> Result<()> {
    let config = load_config(options)?;
    let schema = bootstrap_schema(&config);
    let translator = SqlTranslator::from_config(&config.generation, schema)
        .context("Failed to create generation provider")?;

    if let Err(e) = translator.provider().test_connection().await {
        warn!(
            "{} backend is not reachable yet ({}); requests will fail until it is",
            translator.provider().name(),
            e
        );
    }

    rpc::serve(Arc::new(translator), &config.server).await?;
    Ok(())
}

async fn run_translate(options: &SharedOptions, query: &str) -> Result<()> {
    let config = load_config(options)?;
    let schema = bootstrap_schema(&config);
    let translator = SqlTranslator::from_config(&config.generation, schema)
        .context("Failed to create generation provider")?;

    println!("{}", translator.translate_reply(query).await);
    Ok(())
}
