use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use hearing_check::audio::{write_tone_wav, RecordingPlayer, TonePlayer};
use hearing_check::audiometry::{classify, Ear, Frequency, Response, ThresholdGrid, ToneParameters};
use hearing_check::config::AppConfig;
use hearing_check::error::HearingTestError;
use hearing_check::report::ResultsReport;
use hearing_check::session::HearingTestSession;
use hearing_check::testing::{run_session, SimulatedListener};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "hearing_cli",
    about = "Pure-tone hearing self-assessment and threshold tooling"
)]
struct Cli {
    /// Configuration file (defaults to assets/hearing_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the test interactively, answering y / n / r (replay) on stdin
    Run {
        /// Play tones through the default output device
        #[arg(long)]
        play: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run the test against a simulated listener with known thresholds
    Simulate {
        #[arg(long, allow_hyphen_values = true)]
        left_db: i32,
        #[arg(long, allow_hyphen_values = true)]
        right_db: i32,
        /// Fraction of answers flipped at random
        #[arg(long, default_value_t = 0.0)]
        lapse_rate: f64,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Classify a recorded threshold grid (JSON)
    Classify {
        #[arg(long)]
        input: PathBuf,
    },
    /// Write a single trial tone to a WAV file
    RenderTone {
        #[arg(long, value_enum)]
        ear: EarArg,
        #[arg(long, value_parser = parse_frequency)]
        frequency: Frequency,
        #[arg(long, allow_hyphen_values = true)]
        level: i32,
        #[arg(long)]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print the plain-text summary instead of JSON
    #[arg(long)]
    text: bool,
    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum EarArg {
    Left,
    Right,
}

impl From<EarArg> for Ear {
    fn from(value: EarArg) -> Self {
        match value {
            EarArg::Left => Ear::Left,
            EarArg::Right => Ear::Right,
        }
    }
}

fn parse_frequency(raw: &str) -> std::result::Result<Frequency, String> {
    let hz: u32 = raw
        .trim_end_matches("Hz")
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a frequency in Hz"))?;
    Frequency::try_from(hz)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    hearing_check::init_logging(cli.verbose);
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Run { play, output } => run_interactive(&config, play, &output),
        Commands::Simulate {
            left_db,
            right_db,
            lapse_rate,
            seed,
            output,
        } => run_simulate(&config, left_db, right_db, lapse_rate, seed, &output),
        Commands::Classify { input } => run_classify(&input),
        Commands::RenderTone {
            ear,
            frequency,
            level,
            output,
        } => run_render_tone(&config, ear.into(), frequency, level, &output),
    }
}

fn open_player(config: &AppConfig, play: bool) -> Result<Box<dyn TonePlayer>> {
    if !play {
        return Ok(Box::new(RecordingPlayer::new()));
    }

    #[cfg(feature = "playback")]
    {
        let player = hearing_check::audio::CpalPlayer::new(config.playback.clone())
            .context("opening audio output")?;
        return Ok(Box::new(player));
    }

    #[cfg(not(feature = "playback"))]
    {
        let _ = config;
        Err(hearing_check::error::AudioError::PlaybackUnavailable)
            .context("hearing_cli run --play requires the playback feature")
    }
}

fn run_interactive(config: &AppConfig, play: bool, output: &OutputArgs) -> Result<ExitCode> {
    let player = open_player(config, play)?;
    let mut session = HearingTestSession::new(player, config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    session.start()?;
    while !session.is_complete() {
        let progress = session.progress();
        print!("{} - heard it? [y/n/r] ", progress.status_line());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            bail!(
                "input ended after {}/{} cells",
                progress.completed_cells,
                progress.total_cells
            );
        };
        let response = match line?.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Response::Heard,
            "n" | "no" => Response::NotHeard,
            "r" | "replay" => {
                session.replay()?;
                continue;
            }
            other => {
                eprintln!("Unrecognized answer '{other}', expected y, n or r");
                continue;
            }
        };
        session.respond(response)?;
    }
    println!();

    let report = session.report()?;
    emit_report(&report, config, output)?;
    Ok(ExitCode::from(0))
}

fn run_simulate(
    config: &AppConfig,
    left_db: i32,
    right_db: i32,
    lapse_rate: f64,
    seed: u64,
    output: &OutputArgs,
) -> Result<ExitCode> {
    let mut listener = SimulatedListener::per_ear(left_db, right_db).with_lapses(lapse_rate, seed);
    let mut session = HearingTestSession::new(RecordingPlayer::new(), config);
    let report = run_session(&mut session, &mut listener).context("simulating session")?;

    emit_report(&report, config, output)?;
    Ok(ExitCode::from(0))
}

fn run_classify(input: &Path) -> Result<ExitCode> {
    let json =
        fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let grid = ThresholdGrid::from_json(&json)
        .with_context(|| format!("parsing grid {}", input.display()))?;

    match classify(&grid) {
        Ok(interpretation) => {
            println!("{}", serde_json::to_string_pretty(&interpretation)?);
            Ok(ExitCode::from(0))
        }
        Err(err @ HearingTestError::InsufficientData { .. }) => {
            eprintln!("{err}");
            Ok(ExitCode::from(2))
        }
        Err(err) => Err(err.into()),
    }
}

fn run_render_tone(
    config: &AppConfig,
    ear: Ear,
    frequency: Frequency,
    level_db: i32,
    output: &Path,
) -> Result<ExitCode> {
    let tone = ToneParameters {
        duration_ms: config.playback.tone_duration_ms,
        ..ToneParameters::new(ear, frequency, level_db)
    };
    let frames = write_tone_wav(output, &tone, &config.playback)
        .with_context(|| format!("writing {}", output.display()))?;

    let payload = RenderPayload {
        path: output,
        frames,
        sample_rate: config.playback.sample_rate,
        tone: &tone,
        gain: tone.gain(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(ExitCode::from(0))
}

fn emit_report(report: &ResultsReport, config: &AppConfig, output: &OutputArgs) -> Result<()> {
    let rendered = if output.text {
        report.to_text(&config.report)
    } else {
        serde_json::to_string_pretty(report)?
    };

    if let Some(path) = &output.output {
        fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{rendered}");
    }
    Ok(())
}

#[derive(Serialize)]
struct RenderPayload<'a> {
    path: &'a Path,
    frames: usize,
    sample_rate: u32,
    tone: &'a ToneParameters,
    gain: f32,
}
