//! Damped harmonic oscillator progress curves.
//!
//! The curve is the analytic step response of `m x'' + c x' + k x = k`, starting at `x = 0`
//! with velocity `v0` and settling at `x = 1`. Every sample is O(1) and independent of any
//! previously sampled frame.

use crate::{
    foundation::core::Fps,
    foundation::error::{ReelError, ReelResult},
};

/// Distance from rest under which a spring counts as settled.
pub const REST_THRESHOLD: f64 = 0.005;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub mass: f64,
    pub damping: f64,
    pub stiffness: f64,
    /// Initial velocity in progress units per second.
    pub initial_velocity: f64,
    /// Cap the curve at 1 instead of letting it bounce past the target.
    pub overshoot_clamping: bool,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 10.0,
            stiffness: 100.0,
            initial_velocity: 0.0,
            overshoot_clamping: false,
        }
    }
}

impl SpringParams {
    pub fn new(mass: f64, damping: f64, stiffness: f64) -> Self {
        Self {
            mass,
            damping,
            stiffness,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(ReelError::config("spring.mass", "must be finite and > 0"));
        }
        if !(self.stiffness.is_finite() && self.stiffness > 0.0) {
            return Err(ReelError::config(
                "spring.stiffness",
                "must be finite and > 0",
            ));
        }
        if !(self.damping.is_finite() && self.damping >= 0.0) {
            return Err(ReelError::config("spring.damping", "must be finite and >= 0"));
        }
        if !(self.initial_velocity.is_finite() && self.initial_velocity >= 0.0) {
            return Err(ReelError::config(
                "spring.initial_velocity",
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Damping ratio `c / (2 * sqrt(k * m))`.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    pub fn natural_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Regime {
    /// Oscillates around the target.
    Under { wd: f64, a: f64, b: f64 },
    Critical { a: f64, b: f64 },
    /// Two real roots `r1 > r2`, both negative.
    Over { r1: f64, r2: f64, c1: f64, c2: f64 },
}

/// A validated spring bound to a frame rate and an optional duration window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spring {
    params: SpringParams,
    fps: Fps,
    zeta_w0: f64,
    w0: f64,
    regime: Regime,
    /// Multiplier from caller frames to natural frames.
    time_scale: f64,
}

impl Spring {
    /// Build a spring. With `window_frames`, the time axis is rescaled so the spring settles
    /// (within [`REST_THRESHOLD`]) exactly at the end of the window.
    pub fn new(params: SpringParams, fps: Fps, window_frames: Option<f64>) -> ReelResult<Self> {
        params.validate()?;
        fps.validate()?;

        let w0 = params.natural_frequency();
        let zeta = params.damping_ratio();
        // Displacement from rest: y = x - 1, y(0) = -1, y'(0) = v0.
        let v0 = params.initial_velocity;
        let regime = if (zeta - 1.0).abs() < 1e-9 {
            Regime::Critical {
                a: -1.0,
                b: v0 - w0,
            }
        } else if zeta < 1.0 {
            let wd = w0 * (1.0 - zeta * zeta).sqrt();
            Regime::Under {
                wd,
                a: -1.0,
                b: (v0 - zeta * w0) / wd,
            }
        } else {
            let z2 = (zeta * zeta - 1.0).sqrt();
            let r1 = -w0 * (zeta - z2);
            let r2 = -w0 * (zeta + z2);
            let c1 = (v0 + r2) / (r1 - r2);
            Regime::Over {
                r1,
                r2,
                c1,
                c2: -1.0 - c1,
            }
        };

        let mut spring = Self {
            params,
            fps,
            zeta_w0: zeta * w0,
            w0,
            regime,
            time_scale: 1.0,
        };

        if let Some(window) = window_frames {
            if !(window.is_finite() && window > 0.0) {
                return Err(ReelError::config(
                    "spring.duration_window_frames",
                    "must be finite and > 0",
                ));
            }
            let natural = spring.settle_frames().ok_or_else(|| {
                ReelError::config(
                    "spring.damping",
                    "must be > 0 when a duration window is requested (undamped springs never settle)",
                )
            })?;
            spring.time_scale = natural / window;
        }

        Ok(spring)
    }

    pub fn params(&self) -> SpringParams {
        self.params
    }

    /// Progress at `frame` (caller time). Negative frames sit at the start value.
    pub fn sample(&self, frame: f64) -> f64 {
        if frame.is_nan() || frame <= 0.0 {
            return 0.0;
        }
        let t = self.fps.frames_to_secs(frame * self.time_scale);
        let x = 1.0 + self.displacement(t);
        if self.params.overshoot_clamping {
            x.min(1.0)
        } else {
            x
        }
    }

    fn displacement(&self, t: f64) -> f64 {
        match self.regime {
            Regime::Under { wd, a, b } => {
                (-self.zeta_w0 * t).exp() * (a * (wd * t).cos() + b * (wd * t).sin())
            }
            Regime::Critical { a, b } => (-self.w0 * t).exp() * (a + b * t),
            Regime::Over { r1, r2, c1, c2 } => c1 * (r1 * t).exp() + c2 * (r2 * t).exp(),
        }
    }

    /// Natural (unscaled) frames until the displacement envelope drops under [`REST_THRESHOLD`].
    ///
    /// `None` for undamped springs.
    pub fn settle_frames(&self) -> Option<f64> {
        let secs = match self.regime {
            Regime::Under { a, b, .. } => {
                if self.zeta_w0 <= 0.0 {
                    return None;
                }
                let amp = (a * a + b * b).sqrt();
                (amp / REST_THRESHOLD).ln().max(0.0) / self.zeta_w0
            }
            Regime::Critical { a, b } => {
                // Solve (|a| + |b| t) e^{-w0 t} = threshold by fixed-point iteration.
                let mut t = (a.abs() / REST_THRESHOLD).ln().max(0.0) / self.w0;
                for _ in 0..32 {
                    t = ((a.abs() + b.abs() * t) / REST_THRESHOLD).ln().max(0.0) / self.w0;
                }
                t
            }
            Regime::Over { r1, c1, c2, .. } => {
                let amp = c1.abs() + c2.abs();
                (amp / REST_THRESHOLD).ln().max(0.0) / -r1
            }
        };
        Some(secs * self.fps.as_f64())
    }
}

/// One-shot spring evaluation.
pub fn spring_value(
    frame: f64,
    fps: Fps,
    params: SpringParams,
    window_frames: Option<f64>,
) -> ReelResult<f64> {
    Ok(Spring::new(params, fps, window_frames)?.sample(frame))
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
