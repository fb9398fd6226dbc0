use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::content::{extract_code_snippets, guess_language, parse_content_with};
use crate::context::session_context;
use crate::discovery::{discover_projects, list_sessions};
use crate::export::render_snippets_markdown;
use crate::filters::{apply_filters, parse_filter};
use crate::models::Segment;
use crate::parsers::parse_session_file_with_limit;
use crate::search::{SearchOptions, search_messages_with};
use crate::stats::dashboard_stats;
use crate::utils::{format_path_with_tilde, resolve_claude_dir, strip_ansi_codes};

#[derive(Debug, Parser)]
#[command(name = "transcript-lens", version)]
#[command(
    about = "Inspect AI coding assistant session logs: prose, code, and snippets",
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a config file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split text into prose and code segments
    Segments {
        /// Text file to read; stdin when absent or `-`
        file: Option<PathBuf>,
        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },
    /// Guess the programming language of a code sample
    Detect {
        /// File to read; stdin when absent or `-`
        file: Option<PathBuf>,
    },
    /// Extract fenced code blocks from a session file
    Snippets {
        session_file: PathBuf,
        /// Filter expression, e.g. `lang:rust role:assistant since:2024-01-01`
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = SnippetFormat::Text)]
        format: SnippetFormat,
    },
    /// List projects with session logs
    Projects {
        #[arg(long)]
        json: bool,
    },
    /// List the sessions of a project directory, newest first
    Sessions {
        project_dir: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Search message text across all projects
    Search {
        query: String,
        /// Maximum number of results (defaults to the configured search limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List the files written or edited by tool calls in a session file
    Changes {
        session_file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Summarize token usage and activity across all projects
    Stats {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnippetFormat {
    Text,
    Json,
    Markdown,
}

pub fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    match command {
        Commands::Segments { file, json } => show_segments(&config, file.as_deref(), json),
        Commands::Detect { file } => show_detection(&config, file.as_deref()),
        Commands::Snippets { session_file, filter, format } => {
            show_snippets(&config, &session_file, filter.as_deref(), format)
        }
        Commands::Projects { json } => show_projects(&config, json),
        Commands::Sessions { project_dir, json } => show_sessions(&config, &project_dir, json),
        Commands::Search { query, limit, json } => show_search(&config, &query, limit, json),
        Commands::Changes { session_file, json } => show_changes(&config, &session_file, json),
        Commands::Stats { json } => show_stats(&config, json),
    }
}

/// Read a file, or stdin when the path is absent or `-`
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).context("Failed to read stdin")?;
            Ok(input)
        }
    }
}

fn show_segments(config: &Config, file: Option<&Path>, json: bool) -> Result<()> {
    let text = read_input(file)?;
    let segments = parse_content_with(&text, &config.detection);

    if json {
        println!("{}", serde_json::to_string_pretty(&segments)?);
        return Ok(());
    }

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            println!();
        }
        match segment {
            Segment::Prose { text } => {
                println!("--- prose ---");
                println!("{}", strip_ansi_codes(text));
            }
            Segment::Code { language, source, auto_detected } => {
                let origin = if *auto_detected { "detected" } else { "fenced" };
                println!("--- code: {} ({}) ---", strip_ansi_codes(language), origin);
                println!("{}", strip_ansi_codes(source));
            }
        }
    }

    Ok(())
}

fn show_detection(config: &Config, file: Option<&Path>) -> Result<()> {
    let code = read_input(file)?;
    let guess = match guess_language(&code, config.detection.max_detect_bytes) {
        Ok(guess) => guess,
        Err(e) => {
            tracing::debug!(error = %e, "Language detection declined input");
            None
        }
    };

    match guess {
        Some(guess) if guess.relevance > config.detection.min_relevance => {
            println!("{} (relevance {})", guess.language, guess.relevance);
        }
        Some(guess) => {
            println!(
                "unknown (best guess {} at relevance {}, needs more than {})",
                guess.language, guess.relevance, config.detection.min_relevance
            );
        }
        None => println!("unknown"),
    }

    Ok(())
}

fn show_snippets(
    config: &Config,
    session_file: &Path,
    filter: Option<&str>,
    format: SnippetFormat,
) -> Result<()> {
    let filter = parse_filter(filter.unwrap_or_default()).context("Invalid filter expression")?;
    let messages = parse_session_file_with_limit(session_file, config.max_file_bytes)?;
    let snippets = apply_filters(extract_code_snippets(&messages), &filter);

    match format {
        SnippetFormat::Json => println!("{}", serde_json::to_string_pretty(&snippets)?),
        SnippetFormat::Markdown => print!("{}", render_snippets_markdown(&snippets)),
        SnippetFormat::Text => {
            for (i, snippet) in snippets.iter().enumerate() {
                println!(
                    "[{}] {} from {} at {}",
                    i + 1,
                    strip_ansi_codes(&snippet.language),
                    or_dash(&strip_ansi_codes(&snippet.role)),
                    or_dash(&strip_ansi_codes(&snippet.timestamp))
                );
                println!("{}", strip_ansi_codes(&snippet.code));
                println!();
            }
            println!("{} snippet(s)", snippets.len());
        }
    }

    Ok(())
}

fn show_projects(config: &Config, json: bool) -> Result<()> {
    let claude_dir = resolve_claude_dir(config)?;
    let projects = discover_projects(&claude_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    println!("Projects in {}", format_path_with_tilde(&claude_dir));
    for project in &projects {
        println!(
            "{:>5}  {}  ({})",
            project.session_count(),
            strip_ansi_codes(&project.name),
            format_path_with_tilde(&project.project_dir)
        );
    }
    println!("{} project(s)", projects.len());

    Ok(())
}

fn show_sessions(config: &Config, project_dir: &Path, json: bool) -> Result<()> {
    let sessions = list_sessions(project_dir, config.max_file_bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    for session in &sessions {
        let modified = i64::try_from(session.modified)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {} msgs  {} in / {} out tokens",
            modified,
            strip_ansi_codes(&session.id),
            session.message_count,
            session.input_tokens,
            session.output_tokens
        );
    }
    println!("{} session(s)", sessions.len());

    Ok(())
}

fn show_search(config: &Config, query: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let claude_dir = resolve_claude_dir(config)?;
    let options = SearchOptions {
        limit: limit.unwrap_or(config.search_limit),
        max_file_bytes: config.max_file_bytes,
    };
    let results = search_messages_with(&claude_dir, query, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        println!(
            "{}  {} / {}  [{}]",
            or_dash(&strip_ansi_codes(&result.timestamp)),
            strip_ansi_codes(&result.project_name),
            strip_ansi_codes(&result.session_id),
            or_dash(&strip_ansi_codes(&result.role))
        );
        println!("    {}", strip_ansi_codes(&result.content_preview));
    }
    println!("{} result(s)", results.len());

    Ok(())
}

fn show_changes(config: &Config, session_file: &Path, json: bool) -> Result<()> {
    let context = session_context(session_file, config.max_file_bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    if let (Some(start), Some(end)) = (&context.started_at, &context.ended_at) {
        println!("Session from {} to {}", strip_ansi_codes(start), strip_ansi_codes(end));
    }
    for change in &context.file_changes {
        println!(
            "{}  {:<9}  {}",
            or_dash(&strip_ansi_codes(&change.timestamp)),
            strip_ansi_codes(&change.action),
            strip_ansi_codes(&change.file_path)
        );
    }
    println!("{} change(s)", context.file_changes.len());

    Ok(())
}

fn show_stats(config: &Config, json: bool) -> Result<()> {
    let claude_dir = resolve_claude_dir(config)?;
    let stats = dashboard_stats(&claude_dir, config.max_file_bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Usage in {}", format_path_with_tilde(&claude_dir));
    println!(
        "{} session(s), {} message(s), {} in / {} out tokens",
        stats.total_sessions,
        stats.total_messages,
        stats.total_input_tokens,
        stats.total_output_tokens
    );
    println!("Estimated cost: ${:.2}", stats.estimated_cost);
    println!("Average session: {:.1} min", stats.avg_session_minutes);

    if !stats.project_stats.is_empty() {
        println!();
        println!("By project:");
        for project in &stats.project_stats {
            println!(
                "{:>12}  {:>4} session(s)  {}",
                project.total_tokens(),
                project.session_count,
                strip_ansi_codes(&project.name)
            );
        }
    }

    if !stats.daily_stats.is_empty() {
        println!();
        println!("By day:");
        for day in &stats.daily_stats {
            println!(
                "{}  {:>5} msgs  {:>4} session(s)  {} in / {} out tokens",
                strip_ansi_codes(&day.date),
                day.message_count,
                day.session_count,
                day.input_tokens,
                day.output_tokens
            );
        }
    }

    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
