//! Sidetrack CLI - replay and diagnostics for recorded editor sessions
//!
//! Commands:
//! - replay: Feed a recorded NDJSON signal stream through a fresh engine
//! - doctor: Diagnose session-file health and configuration
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sidetrack::schema::SignalError;
use sidetrack::{
    parse_ndjson, FileStore, ManualClock, MemoryStore, SessionSnapshot, SnapshotStore,
    TrackerEngine, PRODUCER_NAME, SCHEMA_VERSION, SIDETRACK_VERSION,
};

/// Sidetrack - behavioral telemetry engine for editor sessions
#[derive(Parser)]
#[command(name = "sidetrack")]
#[command(version = SIDETRACK_VERSION)]
#[command(about = "Replay and inspect recorded editor sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a recorded NDJSON signal stream through a fresh engine
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format for the final snapshot
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Print admitted banners as NDJSON on stdout while replaying
        #[arg(long)]
        banners: bool,

        /// Persist the session to this file (and restore from it first)
        #[arg(long)]
        session_file: Option<PathBuf>,
    },

    /// Diagnose session-file health and configuration
    Doctor {
        /// Session file to check
        #[arg(long)]
        session_file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (sidetrack.signal.v1)
    Input,
    /// Output schema (the tracker snapshot)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SidetrackCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output_format,
            banners,
            session_file,
        } => cmd_replay(&input, output_format, banners, session_file.as_deref()),

        Commands::Doctor { session_file, json } => cmd_doctor(session_file.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn cmd_replay(
    input: &Path,
    output_format: OutputFormat,
    banners: bool,
    session_file: Option<&Path>,
) -> Result<(), SidetrackCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("reading signals from terminal; pipe an NDJSON stream or pass --input FILE");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let signals = parse_ndjson(&input_data)?;
    if signals.is_empty() {
        return Err(SidetrackCliError::NoSignals);
    }

    let clock = ManualClock::new(signals[0].timestamp);
    let store: Box<dyn SnapshotStore> = match session_file {
        Some(path) => Box::new(FileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    };

    let mut engine = TrackerEngine::new(Box::new(clock.clone()), store);
    if banners {
        engine.on_banner(|message, pattern| {
            let line = serde_json::json!({ "pattern": pattern, "message": message });
            println!("{line}");
        });
    }

    for signal in &signals {
        clock.set(signal.timestamp);
        signal.apply(&mut engine);
    }

    engine.save_session();
    let snapshot = engine.snapshot();
    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&snapshot)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&snapshot)?,
    };
    println!("{output}");

    Ok(())
}

fn cmd_doctor(session_file: Option<&Path>, json: bool) -> Result<(), SidetrackCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("sidetrack {}", SIDETRACK_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(path) = session_file {
        checks.push(check_session_file(path));
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SIDETRACK_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Sidetrack Doctor Report");
        println!("=======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SidetrackCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn check_session_file(path: &Path) -> DoctorCheck {
    if !path.exists() {
        return DoctorCheck {
            name: "session_file".to_string(),
            status: CheckStatus::Warning,
            message: "Session file does not exist".to_string(),
        };
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            return DoctorCheck {
                name: "session_file".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read session file: {}", e),
            }
        }
    };

    match SessionSnapshot::decode(&contents) {
        Ok(snapshot) => {
            let now = chrono::Utc::now();
            if snapshot.is_fresh(now) {
                DoctorCheck {
                    name: "session_file".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Session snapshot valid ({} events, {} quips, {}s old)",
                        snapshot.events.len(),
                        snapshot.recent_quips.len(),
                        snapshot.age_ms(now) / 1000
                    ),
                }
            } else {
                DoctorCheck {
                    name: "session_file".to_string(),
                    status: CheckStatus::Warning,
                    message: "Session snapshot is stale and will be discarded on load".to_string(),
                }
            }
        }
        Err(e) => DoctorCheck {
            name: "session_file".to_string(),
            status: CheckStatus::Error,
            message: format!("Invalid session snapshot: {}", e),
        },
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), SidetrackCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: {}", SCHEMA_VERSION);
            println!();
            println!("Newline-delimited JSON, one signal per line. Each line carries a");
            println!("timestamp plus a tagged body:");
            println!();
            println!("1. editor-ready - the editor widget finished mounting");
            println!("2. activity - a raw activity signal (keystroke, pointer, focus)");
            println!("3. visibility - a page visibility transition");
            println!("   - visible: bool");
            println!("4. content-change - one content edit with its structured delta");
            println!("   - content, replaced_len, inserted, native_undo, native_redo");
            println!("5. ui-fiddle - a cosmetic UI action");
            println!("   - kind: free-form action identifier (theme, font, ...)");
            println!("6. tick - one idle/active cadence step");
        }
        SchemaType::Output => {
            println!("Output Schema: tracker snapshot");
            println!();
            println!("- metrics: {{ active_ms, hidden_ms, idle_ms, interruptions,");
            println!("    first_edit_delay_ms, undo_count, redo_count, net_zero_edit_loops,");
            println!("    ui_fiddle_count, ui_fiddle_time_ms, currently_idle }}");
            println!("- recent_quips: newest-first, at most 20 entries of");
            println!("    {{ message, pattern, timestamp }}");
            println!("- events: oldest-first, at most 100 entries of");
            println!("    {{ kind, timestamp, payload? }}");
        }
    }

    Ok(())
}

// Doctor report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

// Error types

#[derive(Debug)]
enum SidetrackCliError {
    Io(io::Error),
    Signal(SignalError),
    Json(serde_json::Error),
    NoSignals,
    DoctorFailed,
}

impl From<io::Error> for SidetrackCliError {
    fn from(e: io::Error) -> Self {
        SidetrackCliError::Io(e)
    }
}

impl From<SignalError> for SidetrackCliError {
    fn from(e: SignalError) -> Self {
        SidetrackCliError::Signal(e)
    }
}

impl From<serde_json::Error> for SidetrackCliError {
    fn from(e: serde_json::Error) -> Self {
        SidetrackCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SidetrackCliError> for CliError {
    fn from(e: SidetrackCliError) -> Self {
        match e {
            SidetrackCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SidetrackCliError::Signal(e) => CliError {
                code: "SIGNAL_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            SidetrackCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SidetrackCliError::NoSignals => CliError {
                code: "NO_SIGNALS".to_string(),
                message: "No signals found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SidetrackCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}
