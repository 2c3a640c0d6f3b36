use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;

use gs_drivetrain::{
    Drivetrain, DrivetrainConfig, DrivetrainError, GaugeReading, IdleInput, InputSource,
    Presenter, RpmRange, ScriptedInput, SimOptions, SimRecord, Snapshot, config, run_sim,
};

#[derive(Parser)]
#[command(name = "gs-cli")]
#[command(about = "GearSim CLI - headless drivetrain RPM simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a headless simulation
    Run {
        /// Drivetrain config (YAML or JSON); reference config if omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Input script (YAML list of segments); idle input if omitted
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Number of ticks (defaults to the script length, or 600)
        #[arg(long)]
        ticks: Option<u64>,
        /// Tick rate in Hz
        #[arg(long, default_value_t = 60.0)]
        hz: f64,
        /// Print every N-th tick
        #[arg(long, default_value_t = 6)]
        record_every: u64,
        /// Write the recorded snapshots as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a drivetrain config file
    Validate {
        /// Path to the config file
        config_path: PathBuf,
    },
    /// Print the reference config as YAML
    ShowConfig,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Drivetrain(#[from] DrivetrainError),

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(String),
}

type CliResult<T> = Result<T, CliError>;

/// Announces gear changes as they happen.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present(&mut self, _snapshot: &Snapshot) {}

    fn on_gear_change(&mut self, gear: usize) {
        println!("  >> gear {}", gear);
    }
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            script,
            ticks,
            hz,
            record_every,
            output,
        } => cmd_run(
            config.as_deref(),
            script.as_deref(),
            ticks,
            hz,
            record_every,
            output.as_deref(),
        ),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::ShowConfig => cmd_show_config(),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<DrivetrainConfig> {
    match path {
        Some(path) => {
            println!("Loading config: {}", path.display());
            Ok(config::load(path)?)
        }
        None => Ok(DrivetrainConfig::default()),
    }
}

fn cmd_run(
    config_path: Option<&Path>,
    script_path: Option<&Path>,
    ticks: Option<u64>,
    hz: f64,
    record_every: u64,
    output: Option<&Path>,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let range = config.rpm_range();

    let script = match script_path {
        Some(path) => {
            let script = ScriptedInput::load_yaml(path)?;
            script.validate()?;
            Some(script)
        }
        None => None,
    };
    let ticks = ticks
        .or_else(|| script.as_ref().map(ScriptedInput::total_ticks))
        .unwrap_or(600);
    let mut source: Box<dyn InputSource> = match script {
        Some(script) => Box::new(script),
        None => Box::new(IdleInput),
    };

    let mut opts = SimOptions::at_rate(hz, ticks)?;
    opts.record_every = record_every;
    tracing::debug!(?opts, "sim options");

    println!(
        "Running {} ticks at {:.1} Hz ({} gears, {:.0}-{:.0} rpm)",
        opts.ticks,
        hz,
        config.top_gear(),
        range.min,
        range.max
    );

    let mut drivetrain = Drivetrain::new(config)?;
    let started = Instant::now();
    let record = run_sim(&mut drivetrain, source.as_mut(), &mut ConsolePresenter, &opts)?;
    let wall_s = started.elapsed().as_secs_f64();

    for snapshot in &record.snapshots {
        println!("{}", render_gauge_line(snapshot, range));
    }
    print_summary(&record, wall_s);

    if let Some(path) = output {
        write_record(path, &record)?;
        println!("✓ Record written to {}", path.display());
    }
    Ok(())
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = config::load(config_path)?;
    println!(
        "✓ Config is valid ({} gears, {:.0}-{:.0} rpm)",
        config.top_gear(),
        config.min_rpm,
        config.max_rpm
    );
    Ok(())
}

fn cmd_show_config() -> CliResult<()> {
    let yaml = serde_yaml::to_string(&DrivetrainConfig::default())
        .map_err(|e| CliError::Serialize(e.to_string()))?;
    print!("{}", yaml);
    Ok(())
}

fn render_gauge_line(snapshot: &Snapshot, range: RpmRange) -> String {
    let reading = GaugeReading::from_snapshot(snapshot, range);
    let width = 28usize;
    let filled = ((reading.needle_fraction * width as f64).round() as usize).min(width);
    let bar = format!(
        "{}{}",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled))
    );
    let mut line = format!(
        "t={:>6.2}s  gear {}  [{}] {:>5} rpm  sound x{:.2}",
        snapshot.time_s, reading.gear, bar, reading.rpm_readout, reading.playback_rate
    );
    if let Some(note) = reading.notification() {
        line.push_str("  ");
        line.push_str(note);
    }
    line
}

fn print_summary(record: &SimRecord, wall_s: f64) {
    if let Some(last) = record.last() {
        println!("✓ Simulation completed");
        println!("  Ticks: {}", last.tick);
        println!("  Simulated time: {:.2} s", last.time_s);
        println!("  Final gear: {}", last.gear);
        println!("  Final rpm: {:.0}", last.rpm);
        println!("  Shifts: {}", record.gear_changes.len());
        println!("  Wall time: {:.3} s", wall_s);
    }
}

fn write_record(path: &Path, record: &SimRecord) -> CliResult<()> {
    let content =
        serde_json::to_string_pretty(record).map_err(|e| CliError::Serialize(e.to_string()))?;
    std::fs::write(path, content).map_err(|source| CliError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
