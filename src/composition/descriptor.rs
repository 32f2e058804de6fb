//! Composition descriptors and the registry a host renderer looks them up in.

use std::collections::BTreeMap;

use crate::{
    composition::inputs::{
        CompositionInputs, InputKind, MessageInputs, ReelInputs, SlideshowInputs,
    },
    foundation::core::{Canvas, Fps},
    foundation::error::{ReelError, ReelResult},
    timeline::schedule::{DurationPolicy, ScheduleConfig, TransitionPolicy},
};

pub const VIDEO_FPS: u32 = 24;
pub const VIDEO_CANVAS: Canvas = Canvas {
    width: 1080,
    height: 1920,
};

/// A named, parameterized video template. Immutable once registered.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositionDescriptor {
    pub id: String,
    pub fps: Fps,
    pub canvas: Canvas,
    /// Nominal length, used unless the inputs or a fixed schedule say otherwise.
    pub duration_frames: u64,
    pub input_kind: InputKind,
    pub default_inputs: CompositionInputs,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl CompositionDescriptor {
    pub fn validate(&self) -> ReelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelError::config("id", "must be non-empty"));
        }
        self.fps.validate()?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReelError::config("canvas", "width and height must be > 0"));
        }
        if self.duration_frames == 0 {
            return Err(ReelError::config("duration_frames", "must be > 0"));
        }
        self.schedule.validate().map_err(|e| e.within("schedule"))?;
        self.check_inputs(&self.default_inputs)
            .map_err(|e| e.within("default_inputs"))
    }

    /// Validate `inputs` against this composition's input schema.
    pub fn check_inputs(&self, inputs: &CompositionInputs) -> ReelResult<()> {
        if inputs.kind() != self.input_kind {
            return Err(ReelError::config(
                "kind",
                format!(
                    "composition '{}' expects {:?} inputs, got {:?}",
                    self.id,
                    self.input_kind,
                    inputs.kind()
                ),
            ));
        }
        inputs.validate()
    }

    /// Total frames for one invocation.
    ///
    /// An explicit `duration_secs` wins, then the length a fixed schedule needs for the items,
    /// then the nominal duration.
    pub fn duration_for(&self, inputs: &CompositionInputs) -> u64 {
        if let Some(secs) = inputs.duration_secs() {
            return self.fps.secs_to_frames_round(secs).max(1);
        }
        self.schedule
            .natural_total_frames(inputs.item_count(), self.fps)
            .unwrap_or(self.duration_frames)
    }
}

/// Registered compositions, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, CompositionDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with [`builtin_catalog`].
    pub fn with_builtin_catalog() -> ReelResult<Self> {
        let mut registry = Self::new();
        for descriptor in builtin_catalog() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: CompositionDescriptor) -> ReelResult<()> {
        descriptor.validate()?;
        if self.entries.contains_key(&descriptor.id) {
            return Err(ReelError::config(
                "id",
                format!("composition '{}' is already registered", descriptor.id),
            ));
        }
        tracing::debug!(id = %descriptor.id, "registered composition");
        self.entries.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> ReelResult<&CompositionDescriptor> {
        self.entries.get(id).ok_or_else(|| {
            ReelError::config("composition_id", format!("unknown composition '{id}'"))
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositionDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const SAMPLE_SONG: &str = "https://github.com/rafaelreis-hotmart/Audio-Sample-files/raw/master/sample.mp3";

fn fps() -> Fps {
    Fps {
        num: VIDEO_FPS,
        den: 1,
    }
}

/// Image slideshow: equal-division segments, one caption per image.
pub fn image_slideshow() -> CompositionDescriptor {
    CompositionDescriptor {
        id: "ImageSlideshow".to_string(),
        fps: fps(),
        canvas: VIDEO_CANVAS,
        duration_frames: 150,
        input_kind: InputKind::Slideshow,
        default_inputs: CompositionInputs::Slideshow(SlideshowInputs {
            images: vec!["https://via.placeholder.com/1920x1080.png?text=Default+Image".to_string()],
            captions: Vec::new(),
            title: Some("Image Slideshow".to_string()),
            song: "audio/default-background-music.mp3".to_string(),
            duration_secs: None,
        }),
        schedule: ScheduleConfig::default(),
    }
}

/// Quote card: one image, a quote, a subscribe prompt, and one silent second at the end.
pub fn just_message() -> CompositionDescriptor {
    CompositionDescriptor {
        id: "JustMessage".to_string(),
        fps: fps(),
        canvas: VIDEO_CANVAS,
        duration_frames: 10 * u64::from(VIDEO_FPS),
        input_kind: InputKind::Message,
        default_inputs: CompositionInputs::Message(MessageInputs {
            images: vec![
                "https://upload.wikimedia.org/wikipedia/en/thumb/e/e5/Magritte_TheSonOfMan.jpg/250px-Magritte_TheSonOfMan.jpg"
                    .to_string(),
            ],
            message: "O homem é o filho do homem, e com ele se deve falar de homem.".to_string(),
            author: Some("Bob Dylan".to_string()),
            song: SAMPLE_SONG.to_string(),
            duration_secs: None,
        }),
        schedule: ScheduleConfig {
            duration: DurationPolicy::EqualDivision,
            transition: TransitionPolicy::None,
            tail_secs: 1.0,
        },
    }
}

/// Multi-clip reel: five seconds per clip with short overlaps, then two calls to action.
pub fn slides() -> CompositionDescriptor {
    CompositionDescriptor {
        id: "Slides".to_string(),
        fps: fps(),
        canvas: VIDEO_CANVAS,
        duration_frames: 20 * u64::from(VIDEO_FPS),
        input_kind: InputKind::Reel,
        default_inputs: CompositionInputs::Reel(ReelInputs {
            clips: vec![
                "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4"
                    .to_string(),
                "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/ElephantsDream.mp4"
                    .to_string(),
            ],
            texts: vec![
                "Big Buck Bunny - A short film".to_string(),
                "Elephants Dream - Animation masterpiece".to_string(),
            ],
            song: SAMPLE_SONG.to_string(),
            duration_secs: None,
        }),
        schedule: ScheduleConfig {
            duration: DurationPolicy::FixedSeconds { seconds: 5.0 },
            transition: TransitionPolicy::Fraction {
                fraction: 0.1,
                min_frames: 3,
                max_frames: 6,
            },
            tail_secs: 6.0,
        },
    }
}

pub fn builtin_catalog() -> Vec<CompositionDescriptor> {
    vec![image_slideshow(), just_message(), slides()]
}
