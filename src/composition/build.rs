//! Turns a descriptor plus validated inputs into an immutable [`Timeline`].
//!
//! All scheduling, overlay placement and profile resolution happens here, so any configuration
//! error surfaces before the first frame is evaluated.

use crate::{
    animation::{
        profile::{Profile, ProfileSpec, SampleCtx, VisualState, sample_stack},
        typewriter::fitted_typing_speed,
    },
    composition::{
        descriptor::CompositionDescriptor,
        inputs::{CompositionInputs, MessageInputs, ReelInputs, SlideshowInputs},
    },
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8},
    foundation::error::ReelResult,
    timeline::{
        overlay::{OverlayKind, OverlayPlacement, OverlaySpec, Placement, SegmentSpan, place_overlays},
        schedule::{Schedule, schedule},
    },
};
use serde_json::json;

const OVERLAY_Z_BASE: i32 = 10;
const WHOOSH_SOURCE: &str = "audio/whoosh.wav";
const ACCENT: Rgba8 = Rgba8::rgb(0xFF, 0x6B, 0x6B);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Image,
    Video,
    Caption,
    Quote,
    CallToAction,
    Cue,
    Flash,
}

/// One visual element with its resolved animation profiles.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub source: Option<String>,
    pub text: Option<String>,
    pub subtext: Option<String>,
    pub fill: Option<Rgba8>,
    pub font_px: Option<u32>,
    /// Frames during which the element is drawn.
    pub range: FrameRange,
    pub z: i32,
    profiles: Vec<Profile>,
}

impl Element {
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    /// Visual state at an absolute `frame`, in element-local time.
    pub fn sample(&self, frame: FrameIndex) -> VisualState {
        sample_stack(&self.profiles, SampleCtx::new(frame.0, self.range.start.0))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct AudioClip {
    pub id: String,
    pub source: String,
    pub range: FrameRange,
    pub volume: f64,
}

/// Fully resolved composition for one render invocation. Read-only after [`build`].
#[derive(Clone, Debug)]
pub struct Timeline {
    pub id: String,
    pub fps: Fps,
    pub canvas: Canvas,
    pub total_frames: u64,
    pub schedule: Schedule,
    pub overlays: Vec<OverlayPlacement>,
    pub elements: Vec<Element>,
    pub audio: Vec<AudioClip>,
}

impl Timeline {
    pub fn range(&self) -> FrameRange {
        FrameRange::from_len(0, self.total_frames)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }
}

/// Motion accent for a reel clip, cycling by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReelVariant {
    Zoom,
    Shake,
    Rotate,
    Scale,
    Strobe,
}

impl ReelVariant {
    const CYCLE: [ReelVariant; 5] = [
        ReelVariant::Zoom,
        ReelVariant::Shake,
        ReelVariant::Rotate,
        ReelVariant::Scale,
        ReelVariant::Strobe,
    ];

    /// Every third clip is a spring "scale" rhythm breaker.
    pub fn for_index(index: usize) -> Self {
        if is_rhythm_breaker(index) {
            Self::Scale
        } else {
            Self::CYCLE[index % Self::CYCLE.len()]
        }
    }

    /// Extra profile for a clip; `entrance_frames` bounds the spring window.
    fn profile(self, entrance_frames: u64) -> Option<ProfileSpec> {
        match self {
            // The base zoom already runs on every clip.
            Self::Zoom => None,
            Self::Shake => Some(ProfileSpec::tag("shake")),
            Self::Rotate => Some(ProfileSpec::tag("rotate")),
            Self::Scale => Some(ProfileSpec::new(
                "spring_entrance",
                json!({
                    "spring": { "mass": 0.5, "damping": 12.0, "stiffness": 150.0 },
                    "window_frames": entrance_frames as f64,
                }),
            )),
            Self::Strobe => Some(ProfileSpec::tag("strobe")),
        }
    }
}

fn is_rhythm_breaker(index: usize) -> bool {
    index % 3 == 2
}

/// Scale entry/exit windows down proportionally until both fit in `len` frames.
fn fit_fade(entry: u64, exit: u64, len: u64) -> (u64, u64) {
    let sum = entry + exit;
    if sum <= len || sum == 0 {
        return (entry, exit);
    }
    (entry * len / sum, exit * len / sum)
}

fn fade(entry: u64, exit: u64, len: u64) -> ProfileSpec {
    let (entry, exit) = fit_fade(entry, exit, len);
    ProfileSpec::new(
        "fade_in_out",
        json!({ "entry_frames": entry, "exit_frames": exit }),
    )
}

#[derive(Clone, Debug, Default)]
struct Draft {
    source: Option<String>,
    text: Option<String>,
    subtext: Option<String>,
    fill: Option<Rgba8>,
    font_px: Option<u32>,
    profiles: Vec<ProfileSpec>,
    cue: Option<AudioCue>,
}

/// Sound started a fixed offset into an element.
#[derive(Clone, Debug)]
struct AudioCue {
    source: &'static str,
    offset_frames: u64,
    duration_frames: u64,
    volume: f64,
}

struct OverlayDecl<'a> {
    name: &'static str,
    kind: ElementKind,
    spec: OverlaySpec,
    draft: Box<dyn Fn(&OverlayPlacement) -> Draft + 'a>,
}

struct Builder<'a> {
    descriptor: &'a CompositionDescriptor,
    total: u64,
    schedule: Schedule,
    elements: Vec<Element>,
    audio: Vec<AudioClip>,
    overlays: Vec<OverlayDecl<'a>>,
}

impl<'a> Builder<'a> {
    fn fps(&self) -> Fps {
        self.descriptor.fps
    }

    fn secs(&self, secs: f64) -> u64 {
        self.descriptor.fps.secs_to_frames_round(secs)
    }

    fn push(
        &mut self,
        id: String,
        kind: ElementKind,
        range: FrameRange,
        z: i32,
        draft: Draft,
    ) -> ReelResult<()> {
        let len = range.len_frames();
        let profiles = draft
            .profiles
            .iter()
            .enumerate()
            .map(|(j, spec)| {
                Profile::resolve(spec, self.fps(), len)
                    .map_err(|e| e.within(&format!("elements.{id}.profiles[{j}]")))
            })
            .collect::<ReelResult<Vec<_>>>()?;

        if let Some(cue) = draft.cue {
            let start = range.start.0 + cue.offset_frames;
            if start < self.total {
                let len = cue.duration_frames.min(self.total - start);
                self.audio.push(AudioClip {
                    id: format!("{id}-sfx"),
                    source: cue.source.to_string(),
                    range: FrameRange::from_len(start, len),
                    volume: cue.volume,
                });
            }
        }

        self.elements.push(Element {
            id,
            kind,
            source: draft.source,
            text: draft.text,
            subtext: draft.subtext,
            fill: draft.fill,
            font_px: draft.font_px,
            range,
            z,
            profiles,
        });
        Ok(())
    }

    fn overlay(
        &mut self,
        name: &'static str,
        kind: ElementKind,
        spec: OverlaySpec,
        draft: impl Fn(&OverlayPlacement) -> Draft + 'a,
    ) {
        self.overlays.push(OverlayDecl {
            name,
            kind,
            spec,
            draft: Box::new(draft),
        });
    }

    fn track(&mut self, source: &str, volume: f64) {
        self.audio.push(AudioClip {
            id: "track".to_string(),
            source: source.to_string(),
            range: FrameRange::from_len(0, self.total),
            volume,
        });
    }

    fn whoosh(&self) -> AudioCue {
        AudioCue {
            source: WHOOSH_SOURCE,
            offset_frames: self.secs(1.5),
            duration_frames: self.secs(1.0),
            volume: 0.5,
        }
    }

    fn finish(mut self) -> ReelResult<Timeline> {
        let specs: Vec<OverlaySpec> = self.overlays.iter().map(|o| o.spec.clone()).collect();
        let placements = place_overlays(&self.schedule, &specs)?;
        let decls = std::mem::take(&mut self.overlays);

        let mut ordinal = vec![0usize; decls.len()];
        for p in &placements {
            let decl = &decls[p.spec_index];
            let n = p.segment.unwrap_or(ordinal[p.spec_index]);
            ordinal[p.spec_index] += 1;
            let id = format!("{}-{n}", decl.name);
            let draft = (decl.draft)(p);
            self.push(id, decl.kind, p.range(), OVERLAY_Z_BASE + p.z() as i32, draft)?;
        }

        Ok(Timeline {
            id: self.descriptor.id.clone(),
            fps: self.descriptor.fps,
            canvas: self.descriptor.canvas,
            total_frames: self.total,
            schedule: self.schedule,
            overlays: placements,
            elements: self.elements,
            audio: self.audio,
        })
    }
}

/// Resolve `inputs` against `descriptor` into a timeline.
#[tracing::instrument(skip_all, fields(id = %descriptor.id))]
pub fn build(descriptor: &CompositionDescriptor, inputs: &CompositionInputs) -> ReelResult<Timeline> {
    descriptor
        .check_inputs(inputs)
        .map_err(|e| e.within("inputs"))?;

    let total = descriptor.duration_for(inputs);
    let opts = descriptor
        .schedule
        .opts(descriptor.fps)
        .map_err(|e| e.within("schedule"))?;
    let schedule = schedule(inputs.item_count(), total, &opts)?;

    let mut b = Builder {
        descriptor,
        total,
        schedule,
        elements: Vec::new(),
        audio: Vec::new(),
        overlays: Vec::new(),
    };
    match inputs {
        CompositionInputs::Slideshow(i) => slideshow(&mut b, i)?,
        CompositionInputs::Message(i) => message(&mut b, i)?,
        CompositionInputs::Reel(i) => reel(&mut b, i)?,
    }

    let timeline = b.finish()?;
    tracing::info!(
        total_frames = timeline.total_frames,
        elements = timeline.elements.len(),
        audio = timeline.audio.len(),
        "timeline built"
    );
    Ok(timeline)
}

fn slideshow<'a>(b: &mut Builder<'a>, i: &'a SlideshowInputs) -> ReelResult<()> {
    let fps_frames = b.secs(1.0);
    let segments = b.schedule.segments().to_vec();
    for seg in &segments {
        let range = seg.active_range();
        let len = range.len_frames();
        b.push(
            format!("image-{}", seg.index),
            ElementKind::Image,
            range,
            0,
            Draft {
                source: Some(i.images[seg.index].clone()),
                profiles: vec![
                    fade(15, 15, len),
                    ProfileSpec::new("zoom", json!({ "target_scale": 1.05 })),
                    ProfileSpec::new(
                        "spring_entrance",
                        json!({
                            "spring": { "mass": 1.0, "damping": 200.0 },
                            "window_frames": len.min(fps_frames) as f64,
                            "from_scale": 0.95,
                        }),
                    ),
                ],
                ..Draft::default()
            },
        )?;
    }

    let caption = |text: &str, len: u64| Draft {
        text: Some(text.to_string()),
        fill: Some(Rgba8::WHITE),
        font_px: Some(36),
        profiles: vec![fade(10, 10, len)],
        ..Draft::default()
    };

    if !i.captions.is_empty() {
        b.overlay(
            "caption",
            ElementKind::Caption,
            OverlaySpec::new(
                OverlayKind::Caption,
                Placement::PerSegment {
                    span: SegmentSpan::Match,
                },
            ),
            move |p| caption(&i.captions[p.segment.unwrap_or(0)], p.duration_frames),
        );
    } else if let Some(title) = &i.title {
        let duration_frames = b.secs(3.0).min(b.total).max(1);
        b.overlay(
            "title",
            ElementKind::Caption,
            OverlaySpec::new(
                OverlayKind::Caption,
                Placement::Absolute {
                    start_frame: 0,
                    duration_frames,
                },
            ),
            move |p| caption(title, p.duration_frames),
        );
    }

    b.track(&i.song, 1.0);
    Ok(())
}

fn message<'a>(b: &mut Builder<'a>, i: &'a MessageInputs) -> ReelResult<()> {
    let seg = b.schedule.segments()[0];
    let content = seg.range();
    let len = content.len_frames();
    let blur_frames = b.secs(2.0).min(len).max(1);

    b.push(
        "image-0".to_string(),
        ElementKind::Image,
        content,
        0,
        Draft {
            source: Some(i.images[0].clone()),
            profiles: vec![
                fade(100, 30, len),
                ProfileSpec::new(
                    "blur_in",
                    json!({ "from_px": 20.0, "frames": blur_frames as f64 }),
                ),
            ],
            ..Draft::default()
        },
    )?;

    b.overlay(
        "quote",
        ElementKind::Quote,
        OverlaySpec::new(
            OverlayKind::Caption,
            Placement::Absolute {
                start_frame: 0,
                duration_frames: len,
            },
        ),
        move |p| Draft {
            text: Some(i.message.clone()),
            subtext: i.author.clone(),
            fill: Some(Rgba8::WHITE),
            font_px: Some(48),
            profiles: vec![fade(100, 30, p.duration_frames)],
            ..Draft::default()
        },
    );

    let whoosh = b.whoosh();
    let cta_frames = b.secs(3.0).min(b.total);
    b.overlay(
        "cta-subscribe",
        ElementKind::CallToAction,
        OverlaySpec::new(
            OverlayKind::CallToAction,
            Placement::RelativeToEnd {
                offset_from_end: 0,
                duration_frames: cta_frames,
            },
        ),
        move |_| Draft {
            text: Some("Subscribe".to_string()),
            fill: Some(ACCENT),
            profiles: vec![ProfileSpec::new(
                "call_to_action",
                json!({ "from_x": 0.0, "from_y": 200.0 }),
            )],
            cue: Some(whoosh.clone()),
            ..Draft::default()
        },
    );

    b.track(&i.song, 0.7);
    Ok(())
}

fn reel<'a>(b: &mut Builder<'a>, i: &'a ReelInputs) -> ReelResult<()> {
    let fps = b.fps();
    let one_second = b.secs(1.0);
    let segments = b.schedule.segments().to_vec();

    for seg in &segments {
        let range = seg.active_range();
        let len = range.len_frames();
        let fade_frames = (seg.duration_frames / 10).clamp(6, 12);

        let mut profiles = vec![
            fade(fade_frames, fade_frames, len),
            ProfileSpec::new("zoom", json!({ "target_scale": 1.15 })),
            ProfileSpec::tag("lighting"),
        ];
        profiles.extend(ReelVariant::for_index(seg.index).profile(len.min(one_second)));

        b.push(
            format!("clip-{}", seg.index),
            ElementKind::Video,
            range,
            0,
            Draft {
                source: Some(i.clips[seg.index].clone()),
                profiles,
                ..Draft::default()
            },
        )?;
    }

    // Typing finishes within 80% of each clip's own length.
    let speeds: Vec<f64> = segments
        .iter()
        .map(|seg| {
            fitted_typing_speed(
                i.texts[seg.index].chars().count(),
                fps.frames_to_secs(seg.duration_frames as f64),
            )
        })
        .collect();

    b.overlay(
        "caption",
        ElementKind::Caption,
        OverlaySpec::new(
            OverlayKind::Caption,
            Placement::PerSegment {
                span: SegmentSpan::Active,
            },
        ),
        move |p| {
            let index = p.segment.unwrap_or(0);
            let breaker = is_rhythm_breaker(index);
            let base = if breaker { ACCENT } else { Rgba8::WHITE };
            Draft {
                text: Some(i.texts[index].clone()),
                fill: Some(base),
                font_px: Some(if breaker { 36 } else { 32 }),
                profiles: vec![ProfileSpec::new(
                    "typewriter",
                    json!({
                        "text": i.texts[index],
                        "chars_per_second": speeds[index],
                        "base_color": base,
                    }),
                )],
                ..Draft::default()
            }
        },
    );

    b.overlay(
        "arrow",
        ElementKind::Cue,
        OverlaySpec::new(
            OverlayKind::Cue,
            Placement::PerSegment {
                span: SegmentSpan::Fraction {
                    from: 0.8,
                    to: 0.95,
                },
            },
        ),
        |_| Draft {
            text: Some("→".to_string()),
            fill: Some(ACCENT),
            font_px: Some(40),
            profiles: vec![ProfileSpec::new(
                "pulse",
                json!({ "period_frames": 21.0, "min_scale": 0.9, "max_scale": 1.1 }),
            )],
            ..Draft::default()
        },
    );

    let cta_frames = b.secs(3.0);
    let whoosh = b.whoosh();
    let instagram_cue = whoosh.clone();
    b.overlay(
        "cta-instagram",
        ElementKind::CallToAction,
        OverlaySpec::new(
            OverlayKind::CallToAction,
            Placement::AfterContent {
                delay_frames: 0,
                duration_frames: cta_frames,
            },
        ),
        move |_| Draft {
            text: Some("Follow on Instagram".to_string()),
            fill: Some(ACCENT),
            profiles: vec![ProfileSpec::tag("call_to_action")],
            cue: Some(instagram_cue.clone()),
            ..Draft::default()
        },
    );
    b.overlay(
        "cta-subscribe",
        ElementKind::CallToAction,
        OverlaySpec::new(
            OverlayKind::CallToAction,
            Placement::AfterContent {
                delay_frames: cta_frames,
                duration_frames: cta_frames,
            },
        ),
        move |_| Draft {
            text: Some("Subscribe".to_string()),
            fill: Some(ACCENT),
            profiles: vec![ProfileSpec::new(
                "call_to_action",
                json!({ "from_x": 0.0, "from_y": 200.0 }),
            )],
            cue: Some(whoosh.clone()),
            ..Draft::default()
        },
    );

    b.overlay(
        "flash",
        ElementKind::Flash,
        OverlaySpec::new(
            OverlayKind::Flash,
            Placement::Periodic {
                every_frames: fps.as_f64() * 0.5,
                duration_frames: 2,
            },
        ),
        |_| Draft {
            fill: Some(Rgba8::rgba(255, 255, 255, 26)),
            ..Draft::default()
        },
    );

    b.track(&i.song, 0.8);
    Ok(())
}
