//! Segment Scheduler: partitions a composition's frame budget into one segment per item.

use crate::foundation::{
    core::{FrameIndex, FrameRange, Fps},
    error::{ReelError, ReelResult},
};

/// How long each item's segment lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DurationPolicy {
    /// `floor(budget / n)` per segment, the last absorbing the remainder.
    #[default]
    EqualDivision,
    /// A fixed length per item. When the items do not fill the budget exactly, the budget is
    /// divided equally instead, so segments always tile the content span.
    FixedSeconds { seconds: f64 },
}

/// How many frames each segment overlaps into its successor.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TransitionPolicy {
    #[default]
    None,
    Frames { frames: u64 },
    /// `floor(fraction * segment length)` clamped to `[min_frames, max_frames]`.
    Fraction {
        fraction: f64,
        min_frames: u64,
        max_frames: u64,
    },
}

impl TransitionPolicy {
    pub fn validate(&self) -> ReelResult<()> {
        if let Self::Fraction {
            fraction,
            min_frames,
            max_frames,
        } = *self
        {
            if !(fraction.is_finite() && (0.0..=1.0).contains(&fraction)) {
                return Err(ReelError::config(
                    "transition.fraction",
                    "must be within [0, 1]",
                ));
            }
            if min_frames > max_frames {
                return Err(ReelError::config(
                    "transition.min_frames",
                    "must be <= max_frames",
                ));
            }
        }
        Ok(())
    }

    /// Requested overlap for a segment of `len` frames, before bounding by the neighbour.
    pub fn frames_for(&self, len: u64) -> u64 {
        match *self {
            Self::None => 0,
            Self::Frames { frames } => frames,
            Self::Fraction {
                fraction,
                min_frames,
                max_frames,
            } => ((len as f64 * fraction).floor() as u64).clamp(min_frames, max_frames),
        }
    }
}

/// Composition-level timing configuration, expressed in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub duration: DurationPolicy,
    pub transition: TransitionPolicy,
    /// Seconds kept free of segments at the end of the timeline (e.g. for an outro).
    pub tail_secs: f64,
}

impl ScheduleConfig {
    pub fn validate(&self) -> ReelResult<()> {
        if let DurationPolicy::FixedSeconds { seconds } = self.duration
            && !(seconds.is_finite() && seconds > 0.0)
        {
            return Err(ReelError::config(
                "duration.seconds",
                "must be finite and > 0",
            ));
        }
        self.transition.validate()?;
        if !(self.tail_secs.is_finite() && self.tail_secs >= 0.0) {
            return Err(ReelError::config("tail_secs", "must be finite and >= 0"));
        }
        Ok(())
    }

    /// Resolve to frame counts at `fps`.
    pub fn opts(&self, fps: Fps) -> ReelResult<ScheduleOpts> {
        self.validate()?;
        let duration = match self.duration {
            DurationPolicy::EqualDivision => SegmentLength::Equal,
            DurationPolicy::FixedSeconds { seconds } => {
                SegmentLength::Fixed(fps.secs_to_frames_round(seconds))
            }
        };
        Ok(ScheduleOpts {
            duration,
            transition: self.transition,
            reserved_tail_frames: fps.secs_to_frames_round(self.tail_secs),
        })
    }

    /// Frames needed to show `item_count` items under a fixed policy, tail included.
    ///
    /// `None` for equal division, which always fills whatever total it is given.
    pub fn natural_total_frames(&self, item_count: usize, fps: Fps) -> Option<u64> {
        match self.duration {
            DurationPolicy::EqualDivision => None,
            DurationPolicy::FixedSeconds { seconds } => Some(
                fps.secs_to_frames_round(seconds) * item_count as u64
                    + fps.secs_to_frames_round(self.tail_secs),
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentLength {
    Equal,
    Fixed(u64),
}

/// Frame-resolved scheduling options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleOpts {
    pub duration: SegmentLength,
    pub transition: TransitionPolicy,
    pub reserved_tail_frames: u64,
}

impl Default for ScheduleOpts {
    fn default() -> Self {
        Self {
            duration: SegmentLength::Equal,
            transition: TransitionPolicy::None,
            reserved_tail_frames: 0,
        }
    }
}

/// One item's span on the timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Segment {
    pub index: usize,
    pub start: FrameIndex,
    pub duration_frames: u64,
    /// Frames this segment stays active into the next one.
    pub transition_frames: u64,
}

impl Segment {
    /// The span this segment owns, `[start, start + duration)`.
    pub fn range(&self) -> FrameRange {
        FrameRange::from_len(self.start.0, self.duration_frames)
    }

    /// Owned span plus the outgoing transition window.
    pub fn active_range(&self) -> FrameRange {
        FrameRange::from_len(
            self.start.0,
            self.duration_frames + self.transition_frames,
        )
    }

    pub fn end(&self) -> FrameIndex {
        self.range().end
    }
}

/// Ordered segments tiling `[0, content_frames)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Schedule {
    segments: Vec<Segment>,
    total_frames: u64,
    content_frames: u64,
}

impl Schedule {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Frames covered by segments; the rest of the timeline is the reserved tail.
    pub fn content_frames(&self) -> u64 {
        self.content_frames
    }

    /// Segment owning `frame`, ignoring transition overlap.
    pub fn owner_of(&self, frame: FrameIndex) -> Option<&Segment> {
        let idx = self.segments.partition_point(|s| s.start.0 <= frame.0);
        let seg = self.segments.get(idx.checked_sub(1)?)?;
        seg.range().contains(frame).then_some(seg)
    }

    /// Every segment active at `frame`, outgoing segments first.
    pub fn active_at(&self, frame: FrameIndex) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(move |s| s.active_range().contains(frame))
    }
}

/// Partition `total_frames` into `item_count` segments.
#[tracing::instrument(skip(opts))]
pub fn schedule(item_count: usize, total_frames: u64, opts: &ScheduleOpts) -> ReelResult<Schedule> {
    if item_count == 0 {
        return Err(ReelError::config(
            "item_count",
            "must be >= 1 (nothing to schedule)",
        ));
    }
    if total_frames == 0 {
        return Err(ReelError::config("total_duration_frames", "must be > 0"));
    }
    opts.transition.validate()?;
    if opts.reserved_tail_frames >= total_frames {
        return Err(ReelError::config(
            "reserved_tail_frames",
            format!(
                "tail of {} frames leaves no room in {total_frames} frames",
                opts.reserved_tail_frames
            ),
        ));
    }

    let budget = total_frames - opts.reserved_tail_frames;
    let n = item_count as u64;
    if budget < n {
        return Err(ReelError::config(
            "total_duration_frames",
            format!("{budget} frames cannot hold {item_count} segments of at least one frame"),
        ));
    }

    let lengths: Vec<u64> = match opts.duration {
        SegmentLength::Equal => equal_lengths(budget, n),
        SegmentLength::Fixed(0) => {
            return Err(ReelError::config("duration.seconds", "rounds to zero frames"));
        }
        SegmentLength::Fixed(len) if len.saturating_mul(n) > budget => {
            let clamped = budget / n;
            tracing::warn!(
                requested_frames = len,
                clamped_frames = clamped,
                item_count,
                budget,
                "fixed segment duration does not fit, clamping"
            );
            equal_lengths(budget, n)
        }
        SegmentLength::Fixed(len) if len * n < budget => {
            tracing::info!(
                requested_frames = len,
                stretched_frames = budget / n,
                item_count,
                budget,
                "fixed segment duration underfills the budget, stretching"
            );
            equal_lengths(budget, n)
        }
        SegmentLength::Fixed(len) => vec![len; item_count],
    };

    let mut segments = Vec::with_capacity(item_count);
    let mut start = 0u64;
    for (index, &len) in lengths.iter().enumerate() {
        let transition_frames = match lengths.get(index + 1) {
            Some(&next) => opts.transition.frames_for(len).min(next),
            None => 0,
        };
        segments.push(Segment {
            index,
            start: FrameIndex(start),
            duration_frames: len,
            transition_frames,
        });
        start += len;
    }

    tracing::debug!(segments = segments.len(), content_frames = start, "scheduled");
    Ok(Schedule {
        segments,
        total_frames,
        content_frames: start,
    })
}

fn equal_lengths(budget: u64, n: u64) -> Vec<u64> {
    let base = budget / n;
    let mut lengths = vec![base; n as usize];
    if let Some(last) = lengths.last_mut() {
        *last = budget - base * (n - 1);
    }
    lengths
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/schedule.rs"]
mod tests;
