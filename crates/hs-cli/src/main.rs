mod scenario;

use std::f64::consts::TAU;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hs_core::{BucketIndex, IndexConfig, Mode, OscillatorState};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::scenario::{Scenario, TickReport};

#[derive(Parser)]
#[command(name = "hs", about = "Phase-bucket memory index driver")]
struct Cli {
    /// Index configuration file (TOML); falls back to HS_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file tick by tick
    Run {
        /// Scenario file (TOML)
        path: PathBuf,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a seeded random simulation
    Demo {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = 20)]
        ticks: usize,

        /// Oscillators inserted per tick
        #[arg(long, default_value_t = 16)]
        per_tick: usize,

        /// Simulated time per tick
        #[arg(long, default_value_t = 0.5)]
        dt: f64,
    },

    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<IndexConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("HS_CONFIG").ok().map(PathBuf::from));

    let Some(path) = path else {
        return Ok(IndexConfig::default());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: IndexConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn open_index(cli: &Cli) -> Result<BucketIndex> {
    let config = load_config(cli)?;
    BucketIndex::with_config(config).context("failed to build index")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run { path, json } => cmd_run(&cli, path, *json),
        Commands::Demo {
            seed,
            ticks,
            per_tick,
            dt,
        } => cmd_demo(&cli, *seed, *ticks, *per_tick, *dt),
        Commands::Config => cmd_config(&cli),
    }
}

fn cmd_run(cli: &Cli, path: &Path, json: bool) -> Result<()> {
    let mut index = open_index(cli)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let scenario = Scenario::parse(&content)
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;

    let reports = scenario
        .replay(&mut index)
        .context("scenario replay failed")?;

    if json {
        let out = serde_json::to_string_pretty(&reports).context("failed to serialize reports")?;
        println!("{out}");
    } else {
        for report in &reports {
            print_tick(report);
        }
    }

    println!(
        "done. ticks={}, population={}, evicted={}",
        reports.len(),
        index.population(),
        index.evicted()
    );
    Ok(())
}

fn print_tick(report: &TickReport) {
    println!(
        "tick {}: inserted={} overwritten={} evicted={} population={}",
        report.tick,
        report.inserted,
        report.overwritten,
        report.sweep.evicted,
        report.population
    );
    for query in &report.queries {
        if query.matches.is_empty() {
            println!("  {} {}: (void)", query.mode, query.probe);
            continue;
        }
        let found: Vec<String> = query.matches.iter().map(describe).collect();
        println!("  {} {}: {}", query.mode, query.probe, found.join(", "));
    }
}

fn describe(trace: &OscillatorState) -> String {
    format!(
        "{} ({:.2}Hz, phase={:.3}, w={:.3})",
        trace.tag(),
        trace.frequency(),
        trace.normalized_phase(),
        trace.weight()
    )
}

fn cmd_demo(cli: &Cli, seed: u64, ticks: usize, per_tick: usize, dt: f64) -> Result<()> {
    let mut index = open_index(cli)?;
    let mut rng = SmallRng::seed_from_u64(seed);

    for tick in 0..ticks {
        let mut overwritten = 0;
        for i in 0..per_tick {
            let record = OscillatorState::new(
                format!("osc-{tick}-{i}"),
                rng.random_range(20.0..1000.0),
                rng.random_range(0.0..TAU),
                rng.random_range(0.2..3.0),
            )
            .context("generated invalid oscillator")?;
            if index.insert(&record).is_some() {
                overwritten += 1;
            }
        }

        let sweep = index.decay_sweep(dt).context("decay sweep failed")?;

        let probe = OscillatorState::probe(
            "demo-probe",
            rng.random_range(20.0..1000.0),
            rng.random_range(0.0..TAU),
        )
        .context("generated invalid probe")?;
        let point = index
            .resonate_scored(&probe)
            .map(|r| format!("{} (score={:.3})", r.trace.tag(), r.score))
            .unwrap_or_else(|| "(void)".to_string());
        let plane = index.operate(&probe, Mode::Plane).len();

        println!(
            "tick {tick}: population={} evicted={} overwritten={overwritten} point={point} plane={plane}",
            index.population(),
            sweep.evicted,
        );
    }

    println!(
        "done. population={}, evicted={}",
        index.population(),
        index.evicted()
    );
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let out = toml::to_string(&config).context("failed to serialize config")?;
    print!("{out}");
    Ok(())
}
