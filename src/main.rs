// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use briefgen::app_config::{self, Config, LlmProvider};
use briefgen::app_controller::{Controller, GenerateRequest};
use briefgen::language_utils::Language;

/// CLI Wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    Gemini,
    Anthropic,
    Ollama,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::Gemini => LlmProvider::Gemini,
            CliProvider::Anthropic => LlmProvider::Anthropic,
            CliProvider::Ollama => LlmProvider::Ollama,
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
    /// Generate a brief for a document
    Generate(GenerateArgs),

    /// List stored briefs, newest first
    List {
        /// Maximum number of briefs to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Print a stored brief as JSON
    Show {
        /// Brief ID
        id: String,
    },

    /// Delete a stored brief
    Delete {
        /// Brief ID
        id: String,
    },

    /// Generate shell completions for briefgen
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Directory of .txt pages, JSON array of pages, or form-feed separated text
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output language ('ka', 'en', 'georgian', ...); follows the document if omitted
    #[arg(short, long)]
    language: Option<String>,

    /// LLM provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not read from or write to the brief store
    #[arg(long)]
    no_store: bool,

    /// Regenerate even if the output or a stored brief exists
    #[arg(short, long)]
    force: bool,
}

/// briefgen - Lecture briefs with AI
///
/// Summarizes every page of a lecture document in Georgian or English
/// using an LLM provider (Gemini, Anthropic, Ollama).
#[derive(Parser, Debug)]
#[command(name = "briefgen")]
#[command(version)]
#[command(about = "AI-generated study briefs for lecture documents")]
#[command(long_about = "briefgen summarizes each page of a lecture document with an LLM.

EXAMPLES:
    briefgen generate slides/                    # Directory of page .txt files
    briefgen generate lecture.txt -l ka          # Form-feed separated pages, Georgian brief
    briefgen generate pages.json -p anthropic    # JSON array of pages, Anthropic provider
    briefgen list                                # Stored briefs
    briefgen show <ID>                           # Print a stored brief
    briefgen delete <ID>                         # Remove a stored brief
    briefgen completions bash > briefgen.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. API keys can also be given with the
    GEMINI_API_KEY and ANTHROPIC_API_KEY environment variables.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
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

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌", "1;31"),
            Level::Warn => ("🚧", "1;33"),
            Level::Info => (" ", "1;32"),
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
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the logger's ceiling; the effective level comes from set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "briefgen", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    let mut config = load_or_create_config(&cli.config_path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Generate(args) => run_generate(config, args).await,
        Commands::List { limit } => {
            let controller = Controller::with_config(config)?;
            let records = controller.list(limit).await?;
            if records.is_empty() {
                info!("No stored briefs");
            }
            for record in records {
                println!("{}", record);
            }
            info!("Store: {}", controller.store_stats()?);
            Ok(())
        }
        Commands::Show { id } => {
            let controller = Controller::with_config(config)?;
            let brief = controller.show(&id).await?;
            println!("{}", serde_json::to_string_pretty(&brief)?);
            Ok(())
        }
        Commands::Delete { id } => {
            let controller = Controller::with_config(config)?;
            if controller.delete(&id).await? {
                info!("Deleted brief {}", id);
            } else {
                warn!("No brief with id {}", id);
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load the configuration file, writing a default one if missing
fn load_or_create_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path).context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config =
            serde_json::from_reader(reader).context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    let config_json = serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;
    Ok(config)
}

async fn run_generate(mut config: Config, args: GenerateArgs) -> Result<()> {
    if let Some(provider) = args.provider {
        config.llm.provider = provider.into();
    }

    if let Some(model) = &args.model {
        let provider_str = config.llm.provider.to_lowercase_string();
        match config
            .llm
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(config.llm.provider);
                provider_config.model = model.clone();
                config.llm.available_providers.push(provider_config);
            }
        }
    }

    let language = args
        .language
        .as_deref()
        .filter(|l| !l.eq_ignore_ascii_case("auto"))
        .map(str::parse::<Language>)
        .transpose()
        .context("Invalid --language")?;

    let controller = Controller::with_config(config)?;
    let request = GenerateRequest {
        input: args.input,
        output: args.output,
        language,
        store: !args.no_store,
        force: args.force,
    };

    controller.generate(request).await?;
    Ok(())
}
