//! sts-mux: run the 3:1 multiplexer over files and write the recovered streams.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sts_mux_core::config::MuxConfig;
use sts_mux_core::stream::{Multiplexer, OutputSink, SourceInput};
use sts_mux_core::utils::{format_decimal, format_hex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dump {
    /// Don't print the combined sequence.
    None,
    /// Bracketed decimal byte list.
    Decimal,
    /// Hex, one group per round.
    Hex,
}

#[derive(Debug, Parser)]
#[command(name = "sts-mux", version, about = "STS-1 x3 -> STS-3 byte-interleaving multiplexer simulation")]
struct Args {
    /// Input file per source, in source order (default: <data-dir>/fileN.in).
    #[arg(short, long = "input", value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// Output file per source, in source order (default: <data-dir>/fileN.out).
    #[arg(short, long = "output", value_name = "PATH")]
    outputs: Vec<PathBuf>,

    /// Directory used for default input/output names.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// JSON config file; flags below override it.
    #[arg(long, value_name = "JSON")]
    config: Option<PathBuf>,

    /// Frame size in bytes.
    #[arg(long)]
    frame_size: Option<usize>,

    /// Per-fetch deadline in milliseconds.
    #[arg(long, conflicts_with = "no_timeout")]
    round_timeout_ms: Option<u64>,

    /// Block indefinitely on a stalled source.
    #[arg(long)]
    no_timeout: bool,

    /// How to print the combined sequence.
    #[arg(long, value_enum, default_value_t = Dump::Decimal)]
    dump: Dump,

    /// Print the telemetry snapshot as JSON.
    #[arg(long)]
    telemetry: bool,
}

impl Args {
    fn mux_config(&self) -> Result<MuxConfig> {
        let (mut config, capacity_set) = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                let fields: serde_json::Value = serde_json::from_str(&json)
                    .with_context(|| format!("parsing config {}", path.display()))?;
                let capacity_set = fields.get("channel_capacity").is_some();
                (MuxConfig::from_json_str(&json)?, capacity_set)
            }
            None => (MuxConfig::default(), false),
        };
        if let Some(frame_size) = self.frame_size {
            config = config.with_frame_size(frame_size);
            // One frame of backlog per source unless the config file chose otherwise.
            if !capacity_set {
                config = config.with_channel_capacity(frame_size);
            }
        }
        if let Some(ms) = self.round_timeout_ms {
            config = config.with_round_timeout(Some(Duration::from_millis(ms)));
        }
        if self.no_timeout {
            config = config.with_round_timeout(None);
        }
        if !self.inputs.is_empty() {
            if self.config.is_some() && self.inputs.len() != config.source_count {
                bail!(
                    "config expects {} sources, got {} --input paths",
                    config.source_count,
                    self.inputs.len()
                );
            }
            config = config.with_source_count(self.inputs.len());
        }
        config.validate()?;
        Ok(config)
    }

    fn paths(&self, given: &[PathBuf], count: usize, ext: &str) -> Result<Vec<PathBuf>> {
        if given.is_empty() {
            return Ok((1..=count)
                .map(|n| self.data_dir.join(format!("file{n}.{ext}")))
                .collect());
        }
        if given.len() != count {
            bail!("expected {count} .{ext} paths, got {}", given.len());
        }
        Ok(given.to_vec())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.mux_config()?;
    let inputs = args.paths(&args.inputs, config.source_count, "in")?;
    let outputs = args.paths(&args.outputs, config.source_count, "out")?;

    let mux = Multiplexer::new(config.clone())?;
    let mut run = mux
        .run(inputs.iter().cloned().map(SourceInput::File).collect())
        .context("multiplexer run failed")?;

    match args.dump {
        Dump::None => {}
        Dump::Decimal => println!("{}", format_decimal(&run.combined.to_wire_bytes())),
        Dump::Hex => println!("{}", format_hex(&run.combined.to_wire_bytes(), config.source_count)),
    }

    info!("returning data back");
    run.persist(outputs.iter().cloned().map(OutputSink::File).collect())
        .context("writing recovered streams")?;

    if args.telemetry {
        println!("{}", run.telemetry.to_json()?);
    }

    if !run.report.is_ok() {
        for c in run.report.mismatches() {
            warn!(id = %c.id, expected_len = c.expected_len, actual_len = c.actual_len, "mismatch");
        }
        bail!("recovered streams do not match their sources");
    }

    info!(
        rounds = run.combined.rounds(),
        outputs = ?outputs,
        "data successfully recovered"
    );
    Ok(())
}
