//! Orchestrator: wires N sources and the interleaver, waits on the single
//! completion signal, then reconstructs and verifies.

use std::thread;
use std::time::Instant;

use chrono::Utc;
use crossbeam::channel::{bounded, Receiver, Sender};
use tracing::{debug, info, warn};

use crate::config::MuxConfig;
use crate::stream::combined::CombinedSequence;
use crate::stream::interleaver::Interleaver;
use crate::stream::io::{OutputSink, SourceInput};
use crate::stream::reconstruct::{self, RecoveredStreams};
use crate::stream::source::{SourceStats, StreamSource};
use crate::stream::verify::{self, VerifyReport};
use crate::telemetry::{MuxCounters, Stage, TelemetrySnapshot, TelemetryTimer};
use crate::types::{MuxError, SourceId, StreamItem};

type Completion = Result<(CombinedSequence, MuxCounters), MuxError>;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct MuxRun {
    pub combined: CombinedSequence,
    pub recovered: RecoveredStreams,
    pub sources: Vec<SourceStats>,
    pub report: VerifyReport,
    pub telemetry: TelemetrySnapshot,
}

impl MuxRun {
    /// Write the recovered streams; the time spent is charged to `Stage::Persist`.
    pub fn persist(&mut self, sinks: Vec<OutputSink>) -> Result<(), MuxError> {
        let start = Instant::now();
        let res = self.recovered.persist(sinks);
        self.telemetry.stage_times.add(Stage::Persist, start.elapsed());
        res
    }
}

#[derive(Debug, Clone)]
pub struct Multiplexer {
    config: MuxConfig,
}

impl Multiplexer {
    pub fn new(config: MuxConfig) -> Result<Self, MuxError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// Multiplex `inputs[j]` as source `j + 1`, then de-multiplex.
    ///
    /// Any source failure aborts the whole run.
    pub fn run(&self, inputs: Vec<SourceInput>) -> Result<MuxRun, MuxError> {
        let width = self.config.source_count;
        if inputs.len() != width {
            return Err(MuxError::Config(format!(
                "expected {width} source inputs, got {}",
                inputs.len()
            )));
        }

        let started_at = Utc::now();
        let mut timer = TelemetryTimer::new();
        info!(width, frame_size = self.config.frame_size, "starting multiplexer run");

        // ---- Open all sources (fail fast) ----
        let frame_size = self.config.frame_size;
        let sources = timer.time(Stage::Open, || {
            inputs
                .into_iter()
                .enumerate()
                .map(|(i, input)| StreamSource::open(SourceId::from_index(i), input, frame_size))
                .collect::<Result<Vec<_>, _>>()
        })?;

        // ---- Channels ----
        let (txs, rxs): (Vec<Sender<StreamItem>>, Vec<Receiver<StreamItem>>) = (0..width)
            .map(|_| bounded::<StreamItem>(self.config.channel_capacity))
            .unzip();
        let (done_tx, done_rx) = bounded::<Completion>(1);
        let interleaver = Interleaver::new(rxs, self.config.round_timeout());

        let interleave_start = Instant::now();
        let (source_results, completion) = thread::scope(|scope| {
            // ---- Source workers ----
            let handles: Vec<_> = sources
                .into_iter()
                .zip(txs)
                .map(|(source, tx)| {
                    let id = source.id();
                    scope.spawn(move || {
                        debug!(%id, "source worker starting");
                        let res = source.run(tx);
                        if let Err(e) = &res {
                            warn!(%id, error = %e, "source worker failed");
                        }
                        res
                    })
                })
                .collect();

            // ---- Interleaver worker ----
            let mux = scope.spawn(move || {
                let res = interleaver.run();
                if done_tx.send(res).is_err() {
                    warn!("completion receiver gone");
                }
            });

            // ---- Single completion signal ----
            let completion = done_rx
                .recv()
                .map_err(|_| MuxError::Pipeline("interleaver exited without completion signal"))
                .and_then(|res| res);
            if mux.join().is_err() {
                warn!("interleaver worker panicked");
            }

            let source_results: Vec<Result<SourceStats, MuxError>> = handles
                .into_iter()
                .map(|h| {
                    h.join()
                        .unwrap_or_else(|_| Err(MuxError::Pipeline("source worker panicked")))
                })
                .collect();

            (source_results, completion)
        });
        timer.add_stage_time(Stage::Interleave, interleave_start.elapsed());

        let sources = resolve(source_results, completion.as_ref().err())?;
        let (combined, mux_counters) = completion?;

        let mut counters = MuxCounters::default();
        for s in &sources {
            counters.merge(&s.counters);
            timer.add_stage_time(Stage::Read, s.read_time);
        }
        counters.merge(&mux_counters);

        // ---- De-multiplex ----
        let recovered = timer.time(Stage::Reconstruct, || reconstruct::reconstruct(&combined))?;
        counters.add_recovered(recovered.total_bytes());

        let report = timer.time(Stage::Verify, || verify::verify(&sources, &recovered));
        if report.is_ok() {
            info!(rounds = combined.rounds(), "data successfully recovered");
        } else {
            for c in report.mismatches() {
                warn!(id = %c.id, expected = c.expected_len, actual = c.actual_len, "recovered stream mismatch");
            }
        }

        timer.finish();
        let telemetry = TelemetrySnapshot::from(&counters, &timer, started_at, width);
        debug!(stages = %telemetry.stage_times.summary(), "run finished");

        Ok(MuxRun {
            combined,
            recovered,
            sources,
            report,
            telemetry,
        })
    }
}

/// Pick the error that explains the run.
///
/// A source's own failure wins over the interleaver's `SourceAbandoned`. A
/// closed-channel error from a source only means the interleaver stopped
/// first, so it is skipped when the interleaver has an error of its own.
fn resolve(
    results: Vec<Result<SourceStats, MuxError>>,
    interleaver_err: Option<&MuxError>,
) -> Result<Vec<SourceStats>, MuxError> {
    let mut stats = Vec::with_capacity(results.len());
    for res in results {
        match res {
            Ok(s) => stats.push(s),
            Err(MuxError::Pipeline(_)) if interleaver_err.is_some() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(stats)
}
