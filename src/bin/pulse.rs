//! Pulse CLI - Command-line interface for the PulseCheck engine
//!
//! Commands:
//! - questions: Print the daily question selection for a user
//! - score: Score one day's check-in input from a JSON file or stdin
//! - calendar: Render calendar-month tiles from a record history
//! - heatmap: Render weekly heatmap rows from a record history

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{NaiveDate, Utc};
use pulsecheck::history::{HistoryAggregator, WeekWindow};
use pulsecheck::{
    encode_record_json, BehaviorSignal, Category, DailyResponse, DailyRiskRecord, EngineError,
    RiskScorer, SignalKind, UserContext, WellnessEngine, ENGINE_VERSION,
};
use serde::Deserialize;

/// Pulse - score burnout check-ins and render wellness calendars
#[derive(Parser)]
#[command(name = "pulse")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score burnout check-ins and render wellness calendars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the daily question selection for a user
    Questions {
        /// Username the selection is attributed to
        #[arg(short, long)]
        user: String,

        /// Date of the selection (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Score one day's check-in input (JSON on stdin or from a file)
    Score {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Username attributed in the output payload
        #[arg(short, long, default_value = "local")]
        user: String,

        /// Rolling-average smoothing window in days (off when omitted)
        #[arg(long)]
        smoothing: Option<usize>,
    },

    /// Render calendar-month tiles from a record history (NDJSON)
    Calendar {
        /// Record history file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long)]
        month: u32,
    },

    /// Render weekly heatmap rows from a record history (NDJSON)
    Heatmap {
        /// Record history file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Number of weeks ending at the week containing `today`
        #[arg(long, default_value = "12")]
        weeks: usize,

        /// Reference date (YYYY-MM-DD, default today)
        #[arg(long)]
        today: Option<String>,
    },
}

/// One day's check-in input for the `score` command
#[derive(Deserialize)]
struct CheckinInput {
    date: String,
    #[serde(default)]
    responses: Vec<ResponseInput>,
    #[serde(default)]
    signals: Vec<SignalInput>,
}

#[derive(Deserialize)]
struct ResponseInput {
    question_id: String,
    category: Category,
    answer_value: u8,
}

#[derive(Deserialize)]
struct SignalInput {
    #[serde(rename = "type")]
    kind: SignalKind,
    value: f64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    match cli.command {
        Commands::Questions { user, date } => cmd_questions(&user, date.as_deref()),
        Commands::Score {
            input,
            user,
            smoothing,
        } => cmd_score(&input, &user, smoothing),
        Commands::Calendar { input, year, month } => cmd_calendar(&input, year, month),
        Commands::Heatmap {
            input,
            weeks,
            today,
        } => cmd_heatmap(&input, weeks, today.as_deref()),
    }
}

fn parse_date(text: Option<&str>) -> Result<NaiveDate, EngineError> {
    match text {
        Some(t) => NaiveDate::parse_from_str(t, "%Y-%m-%d")
            .map_err(|e| EngineError::DateParseError(format!("'{t}': {e}"))),
        None => Ok(Utc::now().date_naive()),
    }
}

fn read_input(path: &PathBuf) -> Result<String, EngineError> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| EngineError::Transport(format!("stdin: {e}")))?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
            .map_err(|e| EngineError::Transport(format!("{}: {e}", path.display())))
    }
}

fn read_records(path: &PathBuf) -> Result<Vec<DailyRiskRecord>, EngineError> {
    let text = read_input(path)?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(EngineError::from))
        .collect()
}

fn emit_json<T: serde::Serialize>(value: &T) -> Result<(), EngineError> {
    let json = if atty::is(atty::Stream::Stdout) {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_questions(user: &str, date: Option<&str>) -> Result<(), EngineError> {
    let date = parse_date(date)?;
    let engine = WellnessEngine::new(UserContext::new(user));
    let questions = engine.daily_questions(date)?;
    emit_json(&questions)
}

fn cmd_score(input: &PathBuf, user: &str, smoothing: Option<usize>) -> Result<(), EngineError> {
    let text = read_input(input)?;
    let parsed: CheckinInput = serde_json::from_str(&text)?;
    let date = parse_date(Some(&parsed.date))?;

    let now = Utc::now();
    let responses: Vec<DailyResponse> = parsed
        .responses
        .into_iter()
        .map(|r| DailyResponse {
            question_id: r.question_id,
            category: r.category,
            answer_value: r.answer_value,
            recorded_at: now,
        })
        .collect();
    let signals: Vec<BehaviorSignal> = parsed
        .signals
        .into_iter()
        .map(|s| BehaviorSignal {
            kind: s.kind,
            value: s.value,
            recorded_at: now,
        })
        .collect();

    let scorer = match smoothing {
        Some(window) => RiskScorer::with_smoothing(window),
        None => RiskScorer::new(),
    };
    let record = scorer.score_day(date, &responses, &signals, &[])?;

    let user = UserContext::new(user);
    println!("{}", encode_record_json(&user, &record)?);
    Ok(())
}

fn cmd_calendar(input: &PathBuf, year: i32, month: u32) -> Result<(), EngineError> {
    let records = read_records(input)?;
    let tiles = HistoryAggregator::month_tiles(&records, year, month)?;
    emit_json(&tiles)
}

fn cmd_heatmap(input: &PathBuf, weeks: usize, today: Option<&str>) -> Result<(), EngineError> {
    let records = read_records(input)?;
    let window = WeekWindow::ending_at(parse_date(today)?, weeks);
    let rows = HistoryAggregator::week_rows(&records, &window);
    emit_json(&rows)
}
