use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use jump_tempo::analysis::{
    JobStatus, SpectralPeakConfig, SpectralPeakEstimator, StratumEstimator, TempoEstimator, TempoWorker,
    TimeBase,
};
use jump_tempo::catalog::{DirectoryCatalog, TrackCatalog};
use jump_tempo::metadata::MetadataResolver;
use jump_tempo::motion::{SpanSource, WindowMode};
use jump_tempo::{LiveService, RequestHandler, ServiceConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "jump-tempo")]
#[command(about = "Match music tempo to jumping measured from accelerometer data", long_about = None)]
struct Args {
    /// JSON configuration file (flags below override it)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Catalog root with one folder per bpm
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read newline-delimited requests on stdin, answer on stdout
    Serve {
        /// Window retention mode
        #[arg(long, value_enum)]
        window_mode: Option<WindowMode>,

        /// Window duration in seconds
        #[arg(long)]
        window_seconds: Option<f64>,

        /// Span used for rate normalization
        #[arg(long, value_enum)]
        span_source: Option<SpanSource>,

        /// Assumed batch duration in seconds (fixed span source)
        #[arg(long)]
        packet_seconds: Option<f64>,

        /// z value a jump must rise to
        #[arg(long)]
        threshold: Option<f64>,

        /// Minimum spacing between jumps, in samples
        #[arg(long)]
        min_interval: Option<usize>,

        /// Supported tempos, comma separated, in tie-break order
        #[arg(long, value_delimiter = ',')]
        buckets: Option<Vec<u32>>,

        /// Seed for track selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Estimate the tempo of audio files on the analysis pool
    Analyze {
        /// Audio files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Estimation engine
        #[arg(long, value_enum, default_value = "spectral")]
        engine: Engine,

        /// Frame index time base for the spectral engine
        #[arg(long, value_enum, default_value = "samples")]
        time_base: TimeBase,

        /// Analysis threads
        #[arg(long)]
        threads: Option<usize>,
    },

    /// List buckets and tracks in the catalog
    Catalog,

    /// Copy a file into a bucket folder of the catalog
    Upload {
        /// Target bucket (bpm)
        #[arg(long)]
        bucket: u32,

        /// File to upload
        file: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Engine {
    Spectral,
    Stratum,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut config = match args.config {
        Some(ref path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(ref root) = args.catalog {
        config.catalog_root = root.clone();
    }

    match args.command {
        Command::Serve {
            window_mode,
            window_seconds,
            span_source,
            packet_seconds,
            threshold,
            min_interval,
            buckets,
            seed,
        } => {
            if let Some(mode) = window_mode {
                config.window_mode = mode;
            }
            if let Some(seconds) = window_seconds {
                config.window_duration_seconds = seconds;
            }
            if let Some(source) = span_source {
                config.span_source = source;
            }
            if let Some(seconds) = packet_seconds {
                config.packet_span_seconds = seconds;
            }
            if let Some(t) = threshold {
                config.jump_threshold = t;
            }
            if let Some(n) = min_interval {
                config.jump_min_interval = n;
            }
            if let Some(b) = buckets {
                config.tempo_buckets = b;
            }
            if seed.is_some() {
                config.rng_seed = seed;
            }
            serve(config.expand_paths())
        }
        Command::Analyze {
            files,
            engine,
            time_base,
            threads,
        } => analyze(files, engine, time_base, threads.or(config.analysis_threads)),
        Command::Catalog => list_catalog(config.expand_paths()),
        Command::Upload { bucket, file } => upload(config.expand_paths(), bucket, file),
    }
}

fn serve(config: ServiceConfig) -> Result<()> {
    let catalog = DirectoryCatalog::new(config.catalog_root.clone());
    let metadata = MetadataResolver::new(config.catalog_root.clone(), config.cover_dir());

    log::info!("Serving catalog at {:?}", config.catalog_root);
    let service = LiveService::new(config, catalog).context("Invalid configuration")?;
    let handler = RequestHandler::new(service, metadata);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read request")?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = handler.handle_text(&line);
        log::debug!("Reply status {}", reply.status().code());
        writeln!(stdout, "{}", reply.to_json()).context("Failed to write response")?;
        stdout.flush()?;
    }

    log::info!("Input closed, shutting down");
    Ok(())
}

fn analyze(files: Vec<PathBuf>, engine: Engine, time_base: TimeBase, threads: Option<usize>) -> Result<()> {
    let estimator: Arc<dyn TempoEstimator> = match engine {
        Engine::Spectral => Arc::new(SpectralPeakEstimator::new(SpectralPeakConfig {
            time_base,
            ..SpectralPeakConfig::default()
        })),
        Engine::Stratum => Arc::new(StratumEstimator::new()),
    };

    let (worker, events) = TempoWorker::new(estimator, threads)?;

    let total = files.len();
    for file in files {
        worker.submit_file(file);
    }

    let mut failed = 0;
    for (i, event) in events.iter().take(total).enumerate() {
        let name = event
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        worker.forget(event.id);
        match event.status {
            JobStatus::Done { bpm } => println!("{:.1}\t{}", bpm, name),
            JobStatus::Failed { ref reason } => {
                failed += 1;
                log::error!("[{}/{}] {}: {}", i + 1, total, name, reason);
            }
            JobStatus::Pending => {}
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be analyzed", failed, total);
    }
    Ok(())
}

fn list_catalog(config: ServiceConfig) -> Result<()> {
    let catalog = DirectoryCatalog::new(config.catalog_root.clone());
    let buckets = config.validate()?;

    for bpm in catalog.buckets_on_disk()? {
        let marker = if buckets.as_slice().contains(&bpm) { "" } else { " (not configured)" };
        let tracks = catalog.tracks(bpm)?;
        println!("{} bpm: {} track(s){}", bpm, tracks.len(), marker);
        for track in tracks {
            println!("  {}", track.id);
        }
    }
    Ok(())
}

fn upload(config: ServiceConfig, bucket: u32, file: PathBuf) -> Result<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Upload needs a UTF-8 file name")?;
    let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;

    let catalog = DirectoryCatalog::new(config.catalog_root.clone());
    let dest = catalog.store_upload(bucket, name, &bytes)?;
    log::info!("Uploaded to {:?}", dest);
    Ok(())
}
