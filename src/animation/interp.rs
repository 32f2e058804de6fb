//! Piecewise-linear keyframe interpolation with explicit extrapolation policy.
//!
//! Tables are validated once at construction (strictly increasing inputs, matching lengths) so
//! sampling is infallible and allocation-free.

use crate::{
    animation::ease::Ease,
    foundation::core::{Rgba8, Vec2},
    foundation::error::{ReelError, ReelResult},
};

pub trait Lerp: Sized {
    /// Blend `a` toward `b`. `t` may leave `[0, 1]` when a table extends past its ends.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Rgba8 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

/// Behavior for inputs outside the table's input range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolate {
    /// Hold the nearest boundary value.
    #[default]
    Clamp,
    /// Continue the slope of the nearest segment.
    Extend,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InterpOpts {
    #[serde(default)]
    pub left: Extrapolate,
    #[serde(default)]
    pub right: Extrapolate,
    /// Applied to the normalized progress inside each segment.
    #[serde(default)]
    pub ease: Ease,
}

impl InterpOpts {
    pub fn clamp() -> Self {
        Self::default()
    }

    pub fn extend() -> Self {
        Self {
            left: Extrapolate::Extend,
            right: Extrapolate::Extend,
            ease: Ease::Linear,
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Ordered `(input, output)` control points of a piecewise-linear curve.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct KeyframeTable<T = f64> {
    input: Vec<f64>,
    output: Vec<T>,
}

impl<T> KeyframeTable<T>
where
    T: Lerp + Clone,
{
    pub fn new(input: Vec<f64>, output: Vec<T>) -> ReelResult<Self> {
        validate_ranges(&input, output.len())?;
        Ok(Self { input, output })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, T)>) -> ReelResult<Self> {
        let (input, output): (Vec<f64>, Vec<T>) = pairs.into_iter().unzip();
        Self::new(input, output)
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn output(&self) -> &[T] {
        &self.output
    }

    /// Sample the curve at `x`.
    ///
    /// Exact breakpoints return the stored value untouched.
    pub fn sample(&self, x: f64, opts: InterpOpts) -> T {
        let n = self.input.len();
        let first = self.input[0];
        let last = self.input[n - 1];

        if x.is_nan() {
            return self.output[0].clone();
        }
        if x < first {
            return match opts.left {
                Extrapolate::Clamp => self.output[0].clone(),
                Extrapolate::Extend => self.segment(0, x, opts.ease),
            };
        }
        if x > last {
            return match opts.right {
                Extrapolate::Clamp => self.output[n - 1].clone(),
                Extrapolate::Extend => self.segment(n - 2, x, opts.ease),
            };
        }

        // At least one key is <= x here.
        let idx = self.input.partition_point(|&k| k <= x);
        if self.input[idx - 1] == x {
            return self.output[idx - 1].clone();
        }
        self.segment(idx - 1, x, opts.ease)
    }

    fn segment(&self, i: usize, x: f64, ease: Ease) -> T {
        let a = self.input[i];
        let b = self.input[i + 1];
        let t = (x - a) / (b - a);
        // Easing is defined on [0, 1]; extension past the ends stays linear.
        let te = if (0.0..=1.0).contains(&t) {
            ease.apply(t)
        } else {
            t
        };
        T::lerp(&self.output[i], &self.output[i + 1], te)
    }
}

impl<'de, T> serde::Deserialize<'de> for KeyframeTable<T>
where
    T: Lerp + Clone + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Repr<T> {
            input: Vec<f64>,
            output: Vec<T>,
        }

        let repr = Repr::<T>::deserialize(deserializer)?;
        Self::new(repr.input, repr.output).map_err(serde::de::Error::custom)
    }
}

/// Check that `input` is a usable breakpoint list for an output of `output_len` values.
pub fn validate_ranges(input: &[f64], output_len: usize) -> ReelResult<()> {
    if input.len() < 2 {
        return Err(ReelError::config(
            "input_range",
            format!("needs at least 2 breakpoints, got {}", input.len()),
        ));
    }
    if input.len() != output_len {
        return Err(ReelError::config(
            "output_range",
            format!(
                "length {} must match input_range length {}",
                output_len,
                input.len()
            ),
        ));
    }
    if let Some(i) = input.iter().position(|v| !v.is_finite()) {
        return Err(ReelError::config(
            format!("input_range[{i}]"),
            "must be finite",
        ));
    }
    if let Some(i) = input.windows(2).position(|w| w[0] >= w[1]) {
        return Err(ReelError::config(
            format!("input_range[{}]", i + 1),
            format!(
                "must be strictly increasing ({} follows {})",
                input[i + 1],
                input[i]
            ),
        ));
    }
    Ok(())
}

/// One-shot interpolation over scalar ranges.
///
/// Prefer building a [`KeyframeTable`] once when the same curve is sampled every frame.
pub fn interpolate(x: f64, input: &[f64], output: &[f64], opts: InterpOpts) -> ReelResult<f64> {
    let table = KeyframeTable::new(input.to_vec(), output.to_vec())?;
    Ok(table.sample(x, opts))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/interp.rs"]
mod tests;
