use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::eval::FrameState;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SinkConfig {
    pub composition_id: String,
    pub canvas: Canvas,
    pub fps: Fps,
    pub total_frames: u64,
    pub range: FrameRange,
}

/// Sink contract for consuming evaluated frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested render range.
pub trait FrameSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameState) -> ReelResult<()>;
    fn end(&mut self) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    /// Frames in timeline order.
    pub frames: Vec<(FrameIndex, FrameState)>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameState) -> ReelResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[derive(serde::Serialize)]
struct JsonlHeader<'a> {
    reelcast: &'static str,
    #[serde(flatten)]
    cfg: &'a SinkConfig,
}

/// Writes a header line followed by one JSON object per frame.
///
/// The output is the frame plan a host renderer replays; it carries no pixels.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    overwrite: bool,
    out: Option<BufWriter<File>>,
    frames_written: u64,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            path: path.into(),
            overwrite,
            out: None,
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn writer(&mut self) -> ReelResult<&mut BufWriter<File>> {
        self.out
            .as_mut()
            .ok_or_else(|| ReelError::encode("jsonl sink used before begin()"))
    }

    fn write_line(&mut self, value: &impl serde::Serialize) -> ReelResult<()> {
        let path = self.path.display().to_string();
        let out = self.writer()?;
        serde_json::to_writer(&mut *out, value)?;
        out.write_all(b"\n")
            .map_err(|e| ReelError::encode(format!("write '{path}': {e}")))
    }
}

impl FrameSink for JsonlSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if self.path.exists() && !self.overwrite {
            return Err(ReelError::encode(format!(
                "output '{}' already exists (pass overwrite to replace it)",
                self.path.display()
            )));
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReelError::encode(format!("create '{}': {e}", parent.display()))
            })?;
        }
        let file = File::create(&self.path)
            .map_err(|e| ReelError::encode(format!("create '{}': {e}", self.path.display())))?;
        self.out = Some(BufWriter::new(file));
        self.frames_written = 0;

        self.write_line(&JsonlHeader {
            reelcast: env!("CARGO_PKG_VERSION"),
            cfg: &cfg,
        })
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameState) -> ReelResult<()> {
        self.write_line(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        let mut out = self
            .out
            .take()
            .ok_or_else(|| ReelError::encode("jsonl sink ended before begin()"))?;
        out.flush()
            .map_err(|e| ReelError::encode(format!("flush '{}': {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), frames = self.frames_written, "jsonl sink closed");
        Ok(())
    }
}
