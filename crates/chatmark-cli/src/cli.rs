use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages, including recovered malformed syntax
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "chatmark")]
#[command(about = "chatmark - lex, interpret and render conversational AI output")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Config file path; defaults apply when omitted
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the token stream as JSON
    Lex {
        /// Input file, or `-` for stdin
        input: PathBuf,

        /// Include recovered malformed-syntax diagnostics
        #[arg(long)]
        diagnostics: bool,
    },

    /// Render a message to HTML
    Render {
        /// Input file, or `-` for stdin
        input: PathBuf,

        /// Open every non-forced section regardless of config
        #[arg(long)]
        open: bool,
    },

    /// Print the decoded result of every tool call as JSON
    Interpret {
        /// Input file, or `-` for stdin
        input: PathBuf,
    },

    /// List directives embedded in HTML comments
    Directives {
        /// Input file, or `-` for stdin
        input: PathBuf,
    },

    /// List the composed extensions in the order they are tried
    Extensions,
}
