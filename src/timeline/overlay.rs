//! Overlay Timeline Composer: places captions, calls to action and flashes over a schedule.
//!
//! Overlays never move segment boundaries. Each placement is checked against the timeline end;
//! anything that would spill past it is rejected with the overlay's declaration index.

use crate::{
    foundation::core::{FrameIndex, FrameRange},
    foundation::error::{ReelError, ReelResult},
    timeline::schedule::{Schedule, Segment},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    Caption,
    CallToAction,
    /// A pointer graphic that draws attention to the caption.
    Cue,
    Flash,
}

/// Part of each segment a per-segment overlay covers.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentSpan {
    /// The segment's own span.
    #[default]
    Match,
    /// The segment's span plus its outgoing transition.
    Active,
    /// `[start + floor(from * len), start + floor(to * len))`.
    Fraction { from: f64, to: f64 },
    /// The first `frames` frames, cut short by the segment end.
    Head { frames: u64 },
}

impl SegmentSpan {
    fn range_in(&self, seg: &Segment) -> Option<FrameRange> {
        let start = seg.start.0;
        let len = seg.duration_frames;
        match *self {
            Self::Match => Some(seg.range()),
            Self::Active => Some(seg.active_range()),
            Self::Fraction { from, to } => {
                if !(from.is_finite() && to.is_finite() && 0.0 <= from && from < to && to <= 1.0) {
                    return None;
                }
                let a = (len as f64 * from).floor() as u64;
                let b = (len as f64 * to).floor() as u64;
                Some(FrameRange::from_len(start + a, b.saturating_sub(a)))
            }
            Self::Head { frames } => Some(FrameRange::from_len(start, frames.min(len))),
        }
    }
}

/// Placement rule of one overlay.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Placement {
    Absolute {
        start_frame: u64,
        duration_frames: u64,
    },
    /// Ends `offset_from_end` frames before the timeline end.
    RelativeToEnd {
        offset_from_end: u64,
        duration_frames: u64,
    },
    /// One placement per segment.
    PerSegment {
        #[serde(default)]
        span: SegmentSpan,
    },
    /// Starts `delay_frames` after the last segment ends.
    AfterContent {
        delay_frames: u64,
        duration_frames: u64,
    },
    /// Starts every `every_frames` (rounded to the nearest frame) for as long as it fits.
    Periodic {
        every_frames: f64,
        duration_frames: u64,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySpec {
    pub kind: OverlayKind,
    pub placement: Placement,
}

impl OverlaySpec {
    pub fn new(kind: OverlayKind, placement: Placement) -> Self {
        Self { kind, placement }
    }
}

/// A concrete overlay window on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct OverlayPlacement {
    pub kind: OverlayKind,
    /// Index of the spec this came from; also the z-order (later draws on top).
    pub spec_index: usize,
    /// Segment this placement was derived from, for per-segment rules.
    pub segment: Option<usize>,
    pub start: FrameIndex,
    pub duration_frames: u64,
}

impl OverlayPlacement {
    pub fn range(&self) -> FrameRange {
        FrameRange::from_len(self.start.0, self.duration_frames)
    }

    pub fn z(&self) -> usize {
        self.spec_index
    }
}

/// Resolve every spec against `schedule`, in declaration order.
#[tracing::instrument(skip_all, fields(specs = specs.len()))]
pub fn place_overlays(
    schedule: &Schedule,
    specs: &[OverlaySpec],
) -> ReelResult<Vec<OverlayPlacement>> {
    let total = schedule.total_frames();
    let mut out = Vec::new();

    for (i, spec) in specs.iter().enumerate() {
        let field = format!("overlays[{i}]");
        let placed = |segment: Option<usize>, range: FrameRange| OverlayPlacement {
            kind: spec.kind,
            spec_index: i,
            segment,
            start: range.start,
            duration_frames: range.len_frames(),
        };
        let check = |start: u64, duration: u64| -> ReelResult<FrameRange> {
            if duration == 0 {
                return Err(ReelError::config(field.clone(), "duration_frames must be > 0"));
            }
            let end = start.checked_add(duration).filter(|&end| end <= total);
            match end {
                Some(_) => Ok(FrameRange::from_len(start, duration)),
                None => Err(ReelError::config(
                    field.clone(),
                    format!(
                        "placement [{start}, {}) ends past the timeline end {total}",
                        start.saturating_add(duration)
                    ),
                )),
            }
        };

        match spec.placement {
            Placement::Absolute {
                start_frame,
                duration_frames,
            } => out.push(placed(None, check(start_frame, duration_frames)?)),
            Placement::RelativeToEnd {
                offset_from_end,
                duration_frames,
            } => {
                let start = total
                    .checked_sub(offset_from_end)
                    .and_then(|v| v.checked_sub(duration_frames))
                    .ok_or_else(|| {
                        ReelError::config(
                            field.clone(),
                            format!(
                                "offset_from_end {offset_from_end} + duration {duration_frames} \
                                 exceeds timeline length {total}"
                            ),
                        )
                    })?;
                out.push(placed(None, check(start, duration_frames)?));
            }
            Placement::PerSegment { span } => {
                for seg in schedule.segments() {
                    let range = span.range_in(seg).ok_or_else(|| {
                        ReelError::config(
                            field.clone(),
                            "fraction span needs 0 <= from < to <= 1",
                        )
                    })?;
                    if range.is_empty() {
                        continue;
                    }
                    out.push(placed(
                        Some(seg.index),
                        check(range.start.0, range.len_frames())?,
                    ));
                }
            }
            Placement::AfterContent {
                delay_frames,
                duration_frames,
            } => {
                let start = schedule.content_frames().saturating_add(delay_frames);
                out.push(placed(None, check(start, duration_frames)?));
            }
            Placement::Periodic {
                every_frames,
                duration_frames,
            } => {
                if !(every_frames.is_finite() && every_frames >= 1.0) {
                    return Err(ReelError::config(field, "every_frames must be >= 1"));
                }
                if duration_frames == 0 {
                    return Err(ReelError::config(field, "duration_frames must be > 0"));
                }
                let mut k = 0u64;
                loop {
                    let start = (k as f64 * every_frames).round() as u64;
                    if start.saturating_add(duration_frames) > total {
                        break;
                    }
                    out.push(placed(None, FrameRange::from_len(start, duration_frames)));
                    k += 1;
                }
            }
        }
    }

    tracing::debug!(placements = out.len(), "overlays placed");
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/overlay.rs"]
mod tests;
