use crate::foundation::error::{ReelError, ReelResult};

/// Which input shape a composition accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Slideshow,
    Message,
    Reel,
}

/// Per-invocation input parameters, one variant per composition kind.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompositionInputs {
    Slideshow(SlideshowInputs),
    Message(MessageInputs),
    Reel(ReelInputs),
}

/// Images shown one after another with optional captions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideshowInputs {
    pub images: Vec<String>,
    /// Empty, or one caption per image.
    #[serde(default)]
    pub captions: Vec<String>,
    /// Shown as a single opening caption when `captions` is empty.
    #[serde(default)]
    pub title: Option<String>,
    pub song: String,
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// A quote card over a single image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageInputs {
    /// Only the first image is shown.
    pub images: Vec<String>,
    pub message: String,
    #[serde(default)]
    pub author: Option<String>,
    pub song: String,
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

/// Video clips with one typed caption each.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReelInputs {
    #[serde(alias = "images")]
    pub clips: Vec<String>,
    pub texts: Vec<String>,
    pub song: String,
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

fn check_sources(field: &str, sources: &[String]) -> ReelResult<()> {
    if sources.is_empty() {
        return Err(ReelError::config(field, "at least one entry is required"));
    }
    check_non_empty(field, sources)
}

fn check_non_empty(field: &str, values: &[String]) -> ReelResult<()> {
    match values.iter().position(|s| s.trim().is_empty()) {
        Some(i) => Err(ReelError::config(format!("{field}[{i}]"), "must be non-empty")),
        None => Ok(()),
    }
}

fn check_song(song: &str) -> ReelResult<()> {
    if song.trim().is_empty() {
        return Err(ReelError::config("song", "must be non-empty"));
    }
    Ok(())
}

fn check_duration(duration_secs: Option<f64>) -> ReelResult<()> {
    match duration_secs {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(ReelError::config(
            "duration_secs",
            "must be finite and > 0",
        )),
        _ => Ok(()),
    }
}

fn check_lengths(field: &str, len: usize, expected_field: &str, expected: usize) -> ReelResult<()> {
    if len != expected {
        return Err(ReelError::config(
            field,
            format!("has {len} entries but {expected_field} has {expected}"),
        ));
    }
    Ok(())
}

impl CompositionInputs {
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Slideshow(_) => InputKind::Slideshow,
            Self::Message(_) => InputKind::Message,
            Self::Reel(_) => InputKind::Reel,
        }
    }

    /// Check every per-kind invariant; the first violation is reported with its field path.
    pub fn validate(&self) -> ReelResult<()> {
        match self {
            Self::Slideshow(i) => {
                check_sources("images", &i.images)?;
                if !i.captions.is_empty() {
                    check_lengths("captions", i.captions.len(), "images", i.images.len())?;
                }
                check_song(&i.song)?;
                check_duration(i.duration_secs)
            }
            Self::Message(i) => {
                check_sources("images", &i.images)?;
                if i.message.trim().is_empty() {
                    return Err(ReelError::config("message", "must be non-empty"));
                }
                check_song(&i.song)?;
                check_duration(i.duration_secs)
            }
            Self::Reel(i) => {
                check_sources("clips", &i.clips)?;
                check_lengths("texts", i.texts.len(), "clips", i.clips.len())?;
                check_non_empty("texts", &i.texts)?;
                check_song(&i.song)?;
                check_duration(i.duration_secs)
            }
        }
    }

    /// Number of primary items to schedule.
    pub fn item_count(&self) -> usize {
        match self {
            Self::Slideshow(i) => i.images.len(),
            Self::Message(_) => 1,
            Self::Reel(i) => i.clips.len(),
        }
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            Self::Slideshow(i) => i.duration_secs,
            Self::Message(i) => i.duration_secs,
            Self::Reel(i) => i.duration_secs,
        }
    }

    pub fn song(&self) -> &str {
        match self {
            Self::Slideshow(i) => &i.song,
            Self::Message(i) => &i.song,
            Self::Reel(i) => &i.song,
        }
    }

    /// Parse and validate JSON inputs.
    pub fn from_json(json: &str) -> ReelResult<Self> {
        let inputs: Self = serde_json::from_str(json)?;
        inputs.validate()?;
        Ok(inputs)
    }
}
