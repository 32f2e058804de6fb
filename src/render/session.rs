use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;

use rayon::prelude::*;

use crate::composition::build::{Timeline, build};
use crate::composition::descriptor::Registry;
use crate::composition::inputs::CompositionInputs;
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::eval::{Evaluator, FrameState};
use crate::render::sink::{FrameSink, JsonlSink, SinkConfig};

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames handed to the pool per batch.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between evaluation workers and the sink thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames delivered to the sink.
    pub frames_total: u64,
    /// Delivered frames that were clamped into the composition.
    pub boundary_warnings: u64,
}

/// One render invocation: which composition, with what inputs, written where.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderRequest {
    pub composition_id: String,
    /// Falls back to the descriptor's default inputs.
    #[serde(default)]
    pub inputs: Option<CompositionInputs>,
    pub output_path: PathBuf,
    #[serde(default)]
    pub overwrite: bool,
}

/// Holds a built timeline and evaluates frames of it, singly or as streamed ranges.
pub struct RenderSession {
    timeline: Timeline,
    opts: RenderSessionOpts,
}

impl RenderSession {
    pub fn new(timeline: Timeline, opts: RenderSessionOpts) -> Self {
        Self { timeline, opts }
    }

    /// Look up `composition_id` and build its timeline for `inputs` (or the defaults).
    pub fn from_registry(
        registry: &Registry,
        composition_id: &str,
        inputs: Option<&CompositionInputs>,
        opts: RenderSessionOpts,
    ) -> ReelResult<Self> {
        let descriptor = registry.get(composition_id)?;
        let inputs = inputs.unwrap_or(&descriptor.default_inputs);
        let timeline = build(descriptor, inputs)?;
        Ok(Self::new(timeline, opts))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn total_frames(&self) -> u64 {
        self.timeline.total_frames
    }

    pub fn eval_frame(&self, frame: FrameIndex) -> FrameState {
        Evaluator::eval_frame(&self.timeline, frame)
    }

    /// Stream every frame of the composition into `sink`.
    pub fn render_all(&self, sink: &mut dyn FrameSink) -> ReelResult<RenderStats> {
        self.render_range(self.timeline.range(), sink)
    }

    /// Evaluate a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order. When `parallel` is
    /// enabled, out-of-order worker completion is reordered at the sink boundary. Frames past the
    /// end of the composition are clamped and counted in [`RenderStats::boundary_warnings`].
    #[tracing::instrument(skip(self, sink), fields(id = %self.timeline.id))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> ReelResult<RenderStats> {
        if range.is_empty() {
            return Err(ReelError::evaluation(
                "render_range range must be non-empty",
            ));
        }
        if range.start.0 >= self.timeline.total_frames {
            return Err(ReelError::evaluation(format!(
                "render_range start {} is outside the composition ({} frames)",
                range.start.0, self.timeline.total_frames
            )));
        }

        let cfg = SinkConfig {
            composition_id: self.timeline.id.clone(),
            canvas: self.timeline.canvas,
            fps: self.timeline.fps,
            total_frames: self.timeline.total_frames,
            range,
        };

        let cap = self.opts.channel_capacity.max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size).min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        // Sink thread: enforce in-order delivery regardless of evaluation completion order.
        let stats = std::thread::scope(|scope| -> ReelResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);
            let range_start = range.start.0;
            let range_end = range.end.0;
            let sink_ref: &mut dyn FrameSink = sink;

            let enc = scope.spawn(move || -> ReelResult<RenderStats> {
                sink_ref.begin(cfg)?;

                let mut stats = RenderStats::default();
                let mut deliver = |idx: u64, frame: &FrameState| -> ReelResult<()> {
                    if frame.warning.is_some() {
                        stats.boundary_warnings += 1;
                    }
                    stats.frames_total += 1;
                    sink_ref.push_frame(FrameIndex(idx), frame)
                };

                let mut next = range_start;
                let mut pending = HashMap::<u64, FrameState>::new();
                while next < range_end {
                    if let Some(frame) = pending.remove(&next) {
                        deliver(next, &frame)?;
                        next += 1;
                        continue;
                    }

                    let msg = rx.recv().map_err(|_| {
                        ReelError::evaluation("sink channel disconnected unexpectedly")
                    })?;
                    pending.insert(msg.idx.0, msg.frame);

                    while let Some(frame) = pending.remove(&next) {
                        deliver(next, &frame)?;
                        next += 1;
                        if next >= range_end {
                            break;
                        }
                    }
                }

                sink_ref.end()?;
                Ok(stats)
            });

            let timeline = &self.timeline;
            let produce_res = {
                let mut chunk_start = range_start;
                let mut res = Ok(());
                while chunk_start < range_end && res.is_ok() {
                    let chunk_end = (chunk_start + chunk_size).min(range_end);
                    res = match pool.as_ref() {
                        Some(pool) => eval_chunk_parallel(pool, timeline, &tx, chunk_start, chunk_end),
                        None => (chunk_start..chunk_end).try_for_each(|f| send(timeline, &tx, f)),
                    };
                    chunk_start = chunk_end;
                }
                res
            };

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| ReelError::evaluation("sink thread panicked"))?;

            // A failed sink closes the channel, which surfaces on the producer side as a send
            // error; report the sink's own error in that case.
            match (produce_res, enc_res) {
                (_, Err(e)) => Err(e),
                (Err(e), Ok(_)) => Err(e),
                (Ok(()), Ok(stats)) => Ok(stats),
            }
        })?;

        tracing::info!(
            frames = stats.frames_total,
            boundary_warnings = stats.boundary_warnings,
            parallel = self.opts.parallel,
            "range rendered"
        );
        Ok(stats)
    }
}

/// Build the requested composition and write its frame plan to `request.output_path`.
#[tracing::instrument(skip_all, fields(id = %request.composition_id))]
pub fn render(
    registry: &Registry,
    request: &RenderRequest,
    opts: RenderSessionOpts,
) -> ReelResult<RenderStats> {
    let session = RenderSession::from_registry(
        registry,
        &request.composition_id,
        request.inputs.as_ref(),
        opts,
    )?;
    let mut sink = JsonlSink::new(&request.output_path, request.overwrite);
    session.render_all(&mut sink)
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameState,
}

fn send(timeline: &Timeline, tx: &mpsc::SyncSender<FrameMsg>, f: u64) -> ReelResult<()> {
    let frame = Evaluator::eval_frame(timeline, FrameIndex(f));
    tx.send(FrameMsg {
        idx: FrameIndex(f),
        frame,
    })
    .map_err(|_| ReelError::evaluation("sink thread is not accepting frames"))
}

fn eval_chunk_parallel(
    pool: &rayon::ThreadPool,
    timeline: &Timeline,
    tx: &mpsc::SyncSender<FrameMsg>,
    start: u64,
    end: u64,
) -> ReelResult<()> {
    let tx = tx.clone();
    pool.install(|| {
        (start..end)
            .into_par_iter()
            .try_for_each(move |f| send(timeline, &tx, f))
    })
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> ReelResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ReelError::config("threads", "must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ReelError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/session.rs"]
mod tests;
