use crate::{
    animation::profile::VisualState,
    composition::build::{ElementKind, Timeline},
    foundation::core::{Affine, FrameIndex, Rgba8, Vec2},
};

/// A frame outside `[0, total)` was requested and clamped to the nearest valid one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BoundaryWarning {
    pub requested: FrameIndex,
    pub clamped_to: FrameIndex,
}

/// Everything a host renderer needs to draw one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameState {
    pub frame: FrameIndex,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<BoundaryWarning>,
    /// Active elements, back to front.
    pub nodes: Vec<ElementNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossfade: Option<Crossfade>,
    pub audio: Vec<AudioNode>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ElementNode {
    pub id: String,
    pub kind: ElementKind,
    pub z: i32,
    pub local_frame: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgba8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_px: Option<u32>,
    pub state: VisualState,
    /// Canvas-space transform about the canvas center.
    pub transform: Affine,
}

/// Two segments overlapping in their transition window.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Crossfade {
    pub outgoing: usize,
    pub incoming: usize,
    pub progress: f64, // 0..1
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioNode {
    pub id: String,
    pub source: String,
    pub volume: f64,
    pub local_frame: u64,
}

pub struct Evaluator;

impl Evaluator {
    /// Evaluate `frame` from scratch.
    ///
    /// Frames past either end are clamped to the nearest valid frame and reported in
    /// [`FrameState::warning`]; this never fails.
    #[tracing::instrument(level = "trace", skip(timeline))]
    pub fn eval_frame(timeline: &Timeline, frame: FrameIndex) -> FrameState {
        let range = timeline.range();
        let clamped = range.clamp(frame);
        let warning = (clamped != frame).then(|| {
            tracing::warn!(
                requested = frame.0,
                clamped_to = clamped.0,
                total = timeline.total_frames,
                "frame outside composition, clamping"
            );
            BoundaryWarning {
                requested: frame,
                clamped_to: clamped,
            }
        });

        let anchor = Vec2::new(
            f64::from(timeline.canvas.width) / 2.0,
            f64::from(timeline.canvas.height) / 2.0,
        );

        let mut nodes: Vec<((i32, u64, &str), ElementNode)> = timeline
            .elements
            .iter()
            .filter(|e| e.range.contains(clamped))
            .map(|e| {
                let state = e.sample(clamped);
                let node = ElementNode {
                    id: e.id.clone(),
                    kind: e.kind,
                    z: e.z,
                    local_frame: clamped.0 - e.range.start.0,
                    source: e.source.clone(),
                    text: e.text.clone(),
                    subtext: e.subtext.clone(),
                    fill: e.fill,
                    font_px: e.font_px,
                    transform: state.transform(anchor),
                    state,
                };
                ((e.z, e.range.start.0, e.id.as_str()), node)
            })
            .collect();
        nodes.sort_by(|a, b| a.0.cmp(&b.0));

        let audio = timeline
            .audio
            .iter()
            .filter(|a| a.range.contains(clamped))
            .map(|a| AudioNode {
                id: a.id.clone(),
                source: a.source.clone(),
                volume: a.volume,
                local_frame: clamped.0 - a.range.start.0,
            })
            .collect();

        FrameState {
            frame: clamped,
            warning,
            nodes: nodes.into_iter().map(|(_, n)| n).collect(),
            crossfade: resolve_crossfade(timeline, clamped),
            audio,
        }
    }
}

fn resolve_crossfade(timeline: &Timeline, frame: FrameIndex) -> Option<Crossfade> {
    let segments = timeline.schedule.segments();
    segments.windows(2).find_map(|pair| {
        let (out, inc) = (&pair[0], &pair[1]);
        let dur = out.transition_frames;
        if dur == 0 {
            return None;
        }
        let window_start = inc.start.0;
        if !(window_start <= frame.0 && frame.0 < window_start + dur) {
            return None;
        }
        let denom = dur.saturating_sub(1);
        let progress = if denom == 0 {
            1.0
        } else {
            (frame.0 - window_start) as f64 / denom as f64
        };
        Some(Crossfade {
            outgoing: out.index,
            incoming: inc.index,
            progress,
        })
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/eval.rs"]
mod tests;
