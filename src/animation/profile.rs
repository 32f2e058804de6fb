//! Named per-element animation behaviors.
//!
//! A [`ProfileSpec`] is the static configuration attached to an element: a kind string plus JSON
//! params. It is resolved once, at composition time, into a [`Profile`] whose curves are prebuilt,
//! so per-frame sampling is infallible and depends only on the sample context.

use crate::{
    animation::{
        ease::Ease,
        interp::{InterpOpts, KeyframeTable},
        spring::{Spring, SpringParams},
        typewriter::{Typewriter, color_for, fitted_typing_speed},
    },
    foundation::core::{Affine, Fps, Rgba8, Vec2},
    foundation::error::{ReelError, ReelResult},
};

/// Static profile configuration: a kind tag plus kind-specific params.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProfileSpec {
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ProfileSpec {
    pub fn new(kind: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            params,
        }
    }

    /// Profile with default params.
    pub fn tag(kind: impl Into<String>) -> Self {
        Self::new(kind, serde_json::Value::Null)
    }
}

/// Where a sample is taken.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleCtx {
    /// Absolute composition frame.
    pub frame: u64,
    /// Frame relative to the owning element's start.
    pub local: f64,
}

impl SampleCtx {
    pub fn new(frame: u64, start: u64) -> Self {
        Self {
            frame,
            local: frame as f64 - start as f64,
        }
    }
}

/// Character reveal state for text elements.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextReveal {
    pub visible_chars: usize,
    pub total_chars: usize,
    pub caret_opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveChar>,
}

/// The character currently being typed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ActiveChar {
    pub index: usize,
    pub color: Rgba8,
    /// Entrance spring times the typing bounce.
    pub scale: f64,
    /// Glow strength in `[0.5, 1]`.
    pub glow: f64,
    /// Font size relative to the rest of the text.
    pub size_multiplier: f64,
}

const ACTIVE_CHAR_SIZE: f64 = 1.4;

/// Map `sin(x)` from `[-1, 1]` onto `[lo, hi]`.
fn sin_band(x: f64, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * (x.sin() + 1.0) / 2.0
}

/// Per-frame property values of one element.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VisualState {
    pub opacity: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    pub rotation_deg: f64,
    pub blur_px: f64,
    /// Brightness multiplier, 1 is unchanged.
    pub brightness: f64,
    pub hue_rotate_deg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextReveal>,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scale_x: 1.0,
            scale_y: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            rotation_deg: 0.0,
            blur_px: 0.0,
            brightness: 1.0,
            hue_rotate_deg: 0.0,
            color: None,
            text: None,
        }
    }
}

impl VisualState {
    fn with_opacity(opacity: f64) -> Self {
        Self {
            opacity,
            ..Self::default()
        }
    }

    fn with_scale(scale: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            ..Self::default()
        }
    }

    fn with_translate(v: Vec2) -> Self {
        Self {
            translate_x: v.x,
            translate_y: v.y,
            ..Self::default()
        }
    }

    /// Layer `other` on top of `self`.
    ///
    /// Opacity, scale and brightness multiply, offsets, blur and hue add, and `other`'s color
    /// and text win.
    pub fn compose(mut self, other: &VisualState) -> Self {
        self.opacity = (self.opacity * other.opacity).clamp(0.0, 1.0);
        self.scale_x *= other.scale_x;
        self.scale_y *= other.scale_y;
        self.translate_x += other.translate_x;
        self.translate_y += other.translate_y;
        self.rotation_deg += other.rotation_deg;
        self.blur_px = (self.blur_px + other.blur_px).max(0.0);
        self.brightness = (self.brightness * other.brightness).max(0.0);
        self.hue_rotate_deg += other.hue_rotate_deg;
        if other.color.is_some() {
            self.color = other.color;
        }
        if other.text.is_some() {
            self.text = other.text.clone();
        }
        self
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// Element transform around `anchor` (scale and rotate about the anchor, then translate).
    pub fn transform(&self, anchor: Vec2) -> Affine {
        Affine::translate(anchor + Vec2::new(self.translate_x, self.translate_y))
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate(-anchor)
    }
}

/// A resolved profile: prebuilt curves over one element's local time.
#[derive(Clone, Debug, PartialEq)]
pub enum Profile {
    FadeInOut {
        opacity: KeyframeTable,
    },
    Zoom {
        scale: KeyframeTable,
        opts: InterpOpts,
    },
    Shake {
        amplitude: Vec2,
        frequency: Vec2,
        envelope: ShakeEnvelope,
    },
    Rotate {
        degrees: KeyframeTable,
    },
    SpringEntrance {
        spring: Spring,
        from: f64,
        to: f64,
        delay: f64,
    },
    Typewriter(TypewriterProfile),
    Pulse {
        scale: KeyframeTable,
        period: f64,
        opts: InterpOpts,
    },
    Strobe {
        period: u64,
        dim_frames: u64,
        dim_opacity: f64,
    },
    BlurIn {
        blur: KeyframeTable,
    },
    SlideIn {
        offset: KeyframeTable<Vec2>,
        opts: InterpOpts,
    },
    CallToAction(CallToActionProfile),
    Tint {
        color: KeyframeTable<Rgba8>,
    },
    /// Slow brightness flicker plus a steady hue drift.
    Lighting {
        min_brightness: f64,
        max_brightness: f64,
        frequency: f64,
        hue_deg_per_frame: f64,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShakeEnvelope {
    /// Full amplitude before the frame, none after.
    Cut(f64),
    /// Full amplitude, then a linear ramp to zero.
    Decay(KeyframeTable),
}

impl ShakeEnvelope {
    fn gain(&self, local: f64) -> f64 {
        match self {
            Self::Cut(until) => {
                if local < *until {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Decay(table) => table.sample(local, InterpOpts::clamp()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypewriterProfile {
    chars: Vec<char>,
    typewriter: Typewriter,
    base_color: Rgba8,
    highlight: bool,
    char_spring: Spring,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallToActionProfile {
    swipe: KeyframeTable<Vec2>,
    click: KeyframeTable,
    exit: KeyframeTable<Vec2>,
    opacity: KeyframeTable,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FadeParams {
    entry_frames: f64,
    exit_frames: f64,
    peak: f64,
}

impl Default for FadeParams {
    fn default() -> Self {
        Self {
            entry_frames: 15.0,
            exit_frames: 15.0,
            peak: 1.0,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ZoomParams {
    from_scale: f64,
    target_scale: f64,
    ease: Ease,
}

impl Default for ZoomParams {
    fn default() -> Self {
        Self {
            from_scale: 1.0,
            target_scale: 1.05,
            ease: Ease::Linear,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ShakeParams {
    amp_x: f64,
    amp_y: f64,
    freq_x: f64,
    freq_y: f64,
    /// Defaults to the first 20% of the element.
    active_frames: Option<f64>,
    decay_frames: f64,
}

impl Default for ShakeParams {
    fn default() -> Self {
        Self {
            amp_x: 3.0,
            amp_y: 2.0,
            freq_x: 0.5,
            freq_y: 0.7,
            active_frames: None,
            decay_frames: 0.0,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RotateParams {
    peak_deg: f64,
}

impl Default for RotateParams {
    fn default() -> Self {
        Self { peak_deg: 1.0 }
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpringEntranceParams {
    spring: SpringParams,
    window_frames: Option<f64>,
    from_scale: f64,
    to_scale: Option<f64>,
    delay_frames: f64,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TypewriterParams {
    text: String,
    /// Defaults to a speed that finishes in 80% of the element.
    chars_per_second: Option<f64>,
    base_color: Rgba8,
    highlight: bool,
}

impl Default for TypewriterParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            chars_per_second: None,
            base_color: Rgba8::WHITE,
            highlight: true,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PulseParams {
    period_frames: f64,
    min_scale: f64,
    max_scale: f64,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            period_frames: 21.0,
            min_scale: 0.95,
            max_scale: 1.05,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct StrobeParams {
    period_frames: u64,
    dim_frames: u64,
    dim_opacity: f64,
}

impl Default for StrobeParams {
    fn default() -> Self {
        Self {
            period_frames: 6,
            dim_frames: 3,
            dim_opacity: 0.8,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BlurInParams {
    from_px: f64,
    frames: Option<f64>,
}

impl Default for BlurInParams {
    fn default() -> Self {
        Self {
            from_px: 20.0,
            frames: None,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SlideInParams {
    from_x: f64,
    from_y: f64,
    frames: f64,
    ease: Ease,
}

impl Default for SlideInParams {
    fn default() -> Self {
        Self {
            from_x: 0.0,
            from_y: 100.0,
            frames: 15.0,
            ease: Ease::OutCubic,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CallToActionParams {
    from_x: f64,
    from_y: f64,
    swipe_secs: f64,
    click_at_secs: f64,
    click_secs: f64,
    exit_at_secs: f64,
    exit_secs: f64,
    exit_to_x: f64,
}

impl Default for CallToActionParams {
    fn default() -> Self {
        Self {
            from_x: -300.0,
            from_y: 0.0,
            swipe_secs: 0.8,
            click_at_secs: 0.5,
            click_secs: 0.3,
            exit_at_secs: 1.5,
            exit_secs: 0.4,
            exit_to_x: 800.0,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TintParams {
    from: Rgba8,
    to: Rgba8,
}

impl Default for TintParams {
    fn default() -> Self {
        Self {
            from: Rgba8::WHITE,
            to: Rgba8::WHITE,
        }
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LightingParams {
    min_brightness: f64,
    max_brightness: f64,
    frequency: f64,
    hue_deg_per_frame: f64,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            min_brightness: 0.9,
            max_brightness: 1.1,
            frequency: 0.1,
            hue_deg_per_frame: 0.1,
        }
    }
}

fn parse_params<T>(kind: &str, params: &serde_json::Value) -> ReelResult<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    if !params.is_object() {
        return Err(ReelError::config(
            "params",
            format!("{kind} params must be an object"),
        ));
    }
    serde_json::from_value(params.clone()).map_err(|e| ReelError::config("params", e.to_string()))
}

fn non_negative(field: &str, v: f64) -> ReelResult<f64> {
    if v.is_finite() && v >= 0.0 {
        Ok(v)
    } else {
        Err(ReelError::config(
            format!("params.{field}"),
            "must be finite and >= 0",
        ))
    }
}

fn positive(field: &str, v: f64) -> ReelResult<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(ReelError::config(
            format!("params.{field}"),
            "must be finite and > 0",
        ))
    }
}

/// Build a scalar table from points, dropping any point that does not advance the input.
fn ramp_table(points: &[(f64, f64)]) -> ReelResult<KeyframeTable> {
    let mut kept: Vec<(f64, f64)> = Vec::with_capacity(points.len());
    for &(x, y) in points {
        match kept.last() {
            Some(&(px, _)) if x <= px => {}
            _ => kept.push((x, y)),
        }
    }
    KeyframeTable::from_pairs(kept)
}

impl Profile {
    /// Resolve `spec` for an element lasting `duration_frames` at `fps`.
    pub fn resolve(spec: &ProfileSpec, fps: Fps, duration_frames: u64) -> ReelResult<Self> {
        fps.validate()?;
        if duration_frames == 0 {
            return Err(ReelError::config("duration_frames", "must be > 0"));
        }
        let kind = spec.kind.trim().to_ascii_lowercase().replace('-', "_");
        if kind.is_empty() {
            return Err(ReelError::config("kind", "profile kind must be non-empty"));
        }
        let dur = duration_frames as f64;
        let params = &spec.params;

        match kind.as_str() {
            "fade_in_out" | "fade" => {
                let p: FadeParams = parse_params(&kind, params)?;
                let entry = non_negative("entry_frames", p.entry_frames)?;
                let exit = non_negative("exit_frames", p.exit_frames)?;
                if !(0.0..=1.0).contains(&p.peak) {
                    return Err(ReelError::config("params.peak", "must be within [0, 1]"));
                }
                if entry + exit > dur {
                    return Err(ReelError::config(
                        "params",
                        format!(
                            "entry_frames + exit_frames ({}) exceeds duration {duration_frames}",
                            entry + exit
                        ),
                    ));
                }
                let start = if entry > 0.0 { 0.0 } else { p.peak };
                let end = if exit > 0.0 { 0.0 } else { p.peak };
                let opacity = ramp_table(&[
                    (0.0, start),
                    (entry, p.peak),
                    (dur - exit, p.peak),
                    (dur, end),
                ])?;
                Ok(Self::FadeInOut { opacity })
            }
            "zoom" => {
                let p: ZoomParams = parse_params(&kind, params)?;
                positive("from_scale", p.from_scale)?;
                positive("target_scale", p.target_scale)?;
                let scale = KeyframeTable::new(vec![0.0, dur], vec![p.from_scale, p.target_scale])?;
                Ok(Self::Zoom {
                    scale,
                    opts: InterpOpts::clamp().with_ease(p.ease),
                })
            }
            "shake" => {
                let p: ShakeParams = parse_params(&kind, params)?;
                for (field, v) in [
                    ("amp_x", p.amp_x),
                    ("amp_y", p.amp_y),
                    ("freq_x", p.freq_x),
                    ("freq_y", p.freq_y),
                ] {
                    if !v.is_finite() {
                        return Err(ReelError::config(format!("params.{field}"), "must be finite"));
                    }
                }
                let active = non_negative("active_frames", p.active_frames.unwrap_or(dur * 0.2))?;
                let decay = non_negative("decay_frames", p.decay_frames)?;
                let envelope = if decay > 0.0 {
                    ShakeEnvelope::Decay(KeyframeTable::new(
                        vec![active, active + decay],
                        vec![1.0, 0.0],
                    )?)
                } else {
                    ShakeEnvelope::Cut(active)
                };
                Ok(Self::Shake {
                    amplitude: Vec2::new(p.amp_x, p.amp_y),
                    frequency: Vec2::new(p.freq_x, p.freq_y),
                    envelope,
                })
            }
            "rotate" => {
                let p: RotateParams = parse_params(&kind, params)?;
                if !(p.peak_deg.is_finite() && p.peak_deg.abs() < 2.0) {
                    return Err(ReelError::config(
                        "params.peak_deg",
                        "magnitude must be < 2 degrees",
                    ));
                }
                let degrees = KeyframeTable::new(vec![0.0, dur / 2.0, dur], vec![0.0, p.peak_deg, 0.0])?;
                Ok(Self::Rotate { degrees })
            }
            "spring_entrance" | "spring" | "bounce" | "scale" => {
                let p: SpringEntranceParams = parse_params(&kind, params)?;
                let spring =
                    Spring::new(p.spring, fps, p.window_frames).map_err(|e| e.within("params"))?;
                let to = p.to_scale.unwrap_or(1.0);
                if !(p.from_scale.is_finite() && to.is_finite()) {
                    return Err(ReelError::config("params", "scales must be finite"));
                }
                Ok(Self::SpringEntrance {
                    spring,
                    from: p.from_scale,
                    to,
                    delay: non_negative("delay_frames", p.delay_frames)?,
                })
            }
            "typewriter" => {
                let p: TypewriterParams = parse_params(&kind, params)?;
                let chars: Vec<char> = p.text.chars().collect();
                let cps = match p.chars_per_second {
                    Some(v) => positive("chars_per_second", v)?,
                    None => fitted_typing_speed(chars.len(), fps.frames_to_secs(dur)),
                };
                let typewriter =
                    Typewriter::new(chars.len(), fps, cps).map_err(|e| e.within("params"))?;
                let char_spring = Spring::new(
                    SpringParams::new(0.2, 10.0, 200.0),
                    fps,
                    Some(typewriter.frames_per_char()),
                )?;
                Ok(Self::Typewriter(TypewriterProfile {
                    chars,
                    typewriter,
                    base_color: p.base_color,
                    highlight: p.highlight,
                    char_spring,
                }))
            }
            "pulse" => {
                let p: PulseParams = parse_params(&kind, params)?;
                let period = positive("period_frames", p.period_frames)?;
                positive("min_scale", p.min_scale)?;
                positive("max_scale", p.max_scale)?;
                let scale = KeyframeTable::new(
                    vec![0.0, period / 2.0, period],
                    vec![p.min_scale, p.max_scale, p.min_scale],
                )?;
                Ok(Self::Pulse {
                    scale,
                    period,
                    opts: InterpOpts::clamp().with_ease(Ease::InOutQuad),
                })
            }
            "strobe" => {
                let p: StrobeParams = parse_params(&kind, params)?;
                if p.period_frames == 0 {
                    return Err(ReelError::config("params.period_frames", "must be > 0"));
                }
                if p.dim_frames > p.period_frames {
                    return Err(ReelError::config(
                        "params.dim_frames",
                        "must be <= period_frames",
                    ));
                }
                if !(0.0..=1.0).contains(&p.dim_opacity) {
                    return Err(ReelError::config(
                        "params.dim_opacity",
                        "must be within [0, 1]",
                    ));
                }
                Ok(Self::Strobe {
                    period: p.period_frames,
                    dim_frames: p.dim_frames,
                    dim_opacity: p.dim_opacity,
                })
            }
            "blur_in" => {
                let p: BlurInParams = parse_params(&kind, params)?;
                let from = non_negative("from_px", p.from_px)?;
                let frames = positive("frames", p.frames.unwrap_or(dur))?;
                let blur = KeyframeTable::new(vec![0.0, frames], vec![from, 0.0])?;
                Ok(Self::BlurIn { blur })
            }
            "slide_in" => {
                let p: SlideInParams = parse_params(&kind, params)?;
                let frames = positive("frames", p.frames)?;
                let offset = KeyframeTable::new(
                    vec![0.0, frames],
                    vec![Vec2::new(p.from_x, p.from_y), Vec2::ZERO],
                )?;
                Ok(Self::SlideIn {
                    offset,
                    opts: InterpOpts::clamp().with_ease(p.ease),
                })
            }
            "call_to_action" | "cta" => {
                let p: CallToActionParams = parse_params(&kind, params)?;
                Ok(Self::CallToAction(CallToActionProfile::new(&p, fps)?))
            }
            "tint" => {
                let p: TintParams = parse_params(&kind, params)?;
                let color = KeyframeTable::new(vec![0.0, dur], vec![p.from, p.to])?;
                Ok(Self::Tint { color })
            }
            "lighting" => {
                let p: LightingParams = parse_params(&kind, params)?;
                let min_brightness = non_negative("params.min_brightness", p.min_brightness)?;
                let max_brightness = non_negative("params.max_brightness", p.max_brightness)?;
                if max_brightness < min_brightness {
                    return Err(ReelError::config(
                        "params.max_brightness",
                        "must not be below min_brightness",
                    ));
                }
                if !p.hue_deg_per_frame.is_finite() {
                    return Err(ReelError::config(
                        "params.hue_deg_per_frame",
                        "must be finite",
                    ));
                }
                Ok(Self::Lighting {
                    min_brightness,
                    max_brightness,
                    frequency: non_negative("params.frequency", p.frequency)?,
                    hue_deg_per_frame: p.hue_deg_per_frame,
                })
            }
            _ => Err(ReelError::config(
                "kind",
                format!("unknown animation profile '{kind}'"),
            )),
        }
    }

    /// Values this profile contributes at `ctx`. Properties it does not drive stay at identity.
    pub fn sample(&self, ctx: SampleCtx) -> VisualState {
        let local = ctx.local;
        match self {
            Self::FadeInOut { opacity } => {
                VisualState::with_opacity(opacity.sample(local, InterpOpts::clamp()).clamp(0.0, 1.0))
            }
            Self::Zoom { scale, opts } => VisualState::with_scale(scale.sample(local, *opts)),
            Self::Shake {
                amplitude,
                frequency,
                envelope,
            } => {
                let gain = envelope.gain(local);
                VisualState::with_translate(Vec2::new(
                    (local * frequency.x).sin() * amplitude.x * gain,
                    (local * frequency.y).cos() * amplitude.y * gain,
                ))
            }
            Self::Rotate { degrees } => VisualState {
                rotation_deg: degrees.sample(local, InterpOpts::clamp()),
                ..VisualState::default()
            },
            Self::SpringEntrance {
                spring,
                from,
                to,
                delay,
            } => {
                let p = spring.sample(local - delay);
                VisualState::with_scale(from + (to - from) * p)
            }
            Self::Typewriter(tw) => tw.sample(local),
            Self::Pulse {
                scale,
                period,
                opts,
            } => VisualState::with_scale(scale.sample(local.rem_euclid(*period), *opts)),
            Self::Strobe {
                period,
                dim_frames,
                dim_opacity,
            } => {
                let step = local.floor() as i64;
                let phase = step.rem_euclid(*period as i64) as u64;
                if phase < *dim_frames {
                    VisualState::with_opacity(*dim_opacity)
                } else {
                    VisualState::default()
                }
            }
            Self::BlurIn { blur } => VisualState {
                blur_px: blur.sample(local, InterpOpts::clamp()),
                ..VisualState::default()
            },
            Self::SlideIn { offset, opts } => VisualState::with_translate(offset.sample(local, *opts)),
            Self::CallToAction(cta) => cta.sample(local),
            Self::Tint { color } => VisualState {
                color: Some(color.sample(local, InterpOpts::clamp())),
                ..VisualState::default()
            },
            Self::Lighting {
                min_brightness,
                max_brightness,
                frequency,
                hue_deg_per_frame,
            } => VisualState {
                brightness: sin_band(local * frequency, *min_brightness, *max_brightness),
                hue_rotate_deg: local * hue_deg_per_frame,
                ..VisualState::default()
            },
        }
    }
}

impl TypewriterProfile {
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    fn sample(&self, local: f64) -> VisualState {
        let visible = self.typewriter.visible_chars(local);
        let total = self.chars.len();
        let complete = visible == total;

        // Solid while typing, then blinking once the text is fully revealed.
        let caret_opacity = if !complete || (local * 0.3).sin() > 0.0 {
            1.0
        } else {
            0.3
        };

        // The newest character stays highlighted, also after the text is complete.
        let active = match (self.highlight, visible.checked_sub(1)) {
            (true, Some(index)) => {
                let char_frame = self.typewriter.char_local_frame(index, local);
                Some(ActiveChar {
                    index,
                    color: color_for(self.chars[index], index),
                    scale: self.char_spring.sample(char_frame)
                        * sin_band(char_frame * 0.8, 0.9, 1.3),
                    glow: sin_band(char_frame * 0.5, 0.5, 1.0),
                    size_multiplier: ACTIVE_CHAR_SIZE,
                })
            }
            _ => None,
        };

        VisualState {
            color: Some(self.base_color),
            text: Some(TextReveal {
                visible_chars: visible,
                total_chars: total,
                caret_opacity,
                active,
            }),
            ..VisualState::default()
        }
    }
}

impl CallToActionProfile {
    fn new(p: &CallToActionParams, fps: Fps) -> ReelResult<Self> {
        let f = |field: &str, secs: f64| -> ReelResult<f64> {
            Ok(non_negative(field, secs)? * fps.as_f64())
        };
        let swipe = f("swipe_secs", p.swipe_secs)?;
        let click_at = f("click_at_secs", p.click_at_secs)?;
        let click = f("click_secs", p.click_secs)?;
        let exit_at = f("exit_at_secs", p.exit_at_secs)?;
        let exit = f("exit_secs", p.exit_secs)?;
        if swipe <= 0.0 || click <= 0.0 || exit <= 0.0 {
            return Err(ReelError::config(
                "params",
                "swipe, click and exit durations must be > 0",
            ));
        }
        if exit_at <= swipe * 0.5 {
            return Err(ReelError::config(
                "params.exit_at_secs",
                "must come after the swipe fade-in",
            ));
        }

        let within = |e: ReelError| e.within("params");
        Ok(Self {
            swipe: KeyframeTable::new(
                vec![0.0, swipe],
                vec![Vec2::new(p.from_x, p.from_y), Vec2::ZERO],
            )
            .map_err(within)?,
            click: KeyframeTable::new(
                vec![
                    click_at,
                    click_at + click * 0.3,
                    click_at + click * 0.7,
                    click_at + click,
                ],
                vec![1.0, 0.95, 1.05, 1.0],
            )
            .map_err(within)?,
            exit: KeyframeTable::new(
                vec![exit_at, exit_at + exit],
                vec![Vec2::ZERO, Vec2::new(p.exit_to_x, 0.0)],
            )
            .map_err(within)?,
            opacity: KeyframeTable::new(
                vec![0.0, swipe * 0.5, exit_at, exit_at + exit * 0.3],
                vec![0.0, 1.0, 1.0, 0.0],
            )
            .map_err(within)?,
        })
    }

    /// Local frame at which the exit motion starts.
    pub fn exit_start(&self) -> f64 {
        self.exit.input()[0]
    }

    fn sample(&self, local: f64) -> VisualState {
        let swipe = self
            .swipe
            .sample(local, InterpOpts::clamp().with_ease(Ease::OutCubic));
        let exit = self
            .exit
            .sample(local, InterpOpts::clamp().with_ease(Ease::InCubic));
        let scale = self
            .click
            .sample(local, InterpOpts::clamp().with_ease(Ease::InOutQuad));
        VisualState {
            opacity: self.opacity.sample(local, InterpOpts::clamp()),
            ..VisualState::with_scale(scale)
        }
        .compose(&VisualState::with_translate(swipe + exit))
    }
}

/// One-shot: resolve `spec` and sample it.
///
/// Prefer [`Profile::resolve`] once per element when sampling many frames.
pub fn evaluate(
    spec: &ProfileSpec,
    fps: Fps,
    duration_frames: u64,
    ctx: SampleCtx,
) -> ReelResult<VisualState> {
    Ok(Profile::resolve(spec, fps, duration_frames)?.sample(ctx))
}

/// Fold a stack of profiles, later entries layered on top.
pub fn sample_stack(profiles: &[Profile], ctx: SampleCtx) -> VisualState {
    profiles
        .iter()
        .fold(VisualState::default(), |acc, p| acc.compose(&p.sample(ctx)))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/profile.rs"]
mod tests;
