use crate::{
    foundation::core::{Fps, Rgba8},
    foundation::error::{ReelError, ReelResult},
};

/// Highlight palette for the character currently being typed.
pub const VIBRANT_PALETTE: [Rgba8; 15] = [
    Rgba8::rgb(0xFF, 0x6B, 0x6B),
    Rgba8::rgb(0x4E, 0xCD, 0xC4),
    Rgba8::rgb(0x45, 0xB7, 0xD1),
    Rgba8::rgb(0x96, 0xCE, 0xB4),
    Rgba8::rgb(0xFF, 0xEA, 0xA7),
    Rgba8::rgb(0xDD, 0xA0, 0xDD),
    Rgba8::rgb(0x98, 0xD8, 0xC8),
    Rgba8::rgb(0xF7, 0xDC, 0x6F),
    Rgba8::rgb(0xBB, 0x8F, 0xCE),
    Rgba8::rgb(0x85, 0xC1, 0xE9),
    Rgba8::rgb(0xF8, 0xC4, 0x71),
    Rgba8::rgb(0x82, 0xE0, 0xAA),
    Rgba8::rgb(0xF1, 0x94, 0x8A),
    Rgba8::rgb(0x85, 0xC1, 0xE9),
    Rgba8::rgb(0xD7, 0xBD, 0xE2),
];

/// Palette color for character `ch` at position `index`. Pure: same inputs, same color.
pub fn color_for(ch: char, index: usize) -> Rgba8 {
    let slot = (ch as usize).wrapping_add(index) % VIBRANT_PALETTE.len();
    VIBRANT_PALETTE[slot]
}

/// Typing speed in characters per second that finishes `char_count` characters within 80% of
/// `seconds`, bounded to a readable `[4, 12]` range.
pub fn fitted_typing_speed(char_count: usize, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 12.0;
    }
    (char_count as f64 / (seconds * 0.8)).clamp(4.0, 12.0)
}

/// Character reveal timing for one string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Typewriter {
    char_count: usize,
    chars_per_frame: f64,
}

impl Typewriter {
    pub fn new(char_count: usize, fps: Fps, chars_per_second: f64) -> ReelResult<Self> {
        fps.validate()?;
        if !(chars_per_second.is_finite() && chars_per_second > 0.0) {
            return Err(ReelError::config(
                "chars_per_second",
                "must be finite and > 0",
            ));
        }
        Ok(Self {
            char_count,
            chars_per_frame: chars_per_second / fps.as_f64(),
        })
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn frames_per_char(&self) -> f64 {
        1.0 / self.chars_per_frame
    }

    /// `floor(local / frames_per_char)`, capped at the character count.
    pub fn visible_chars(&self, local: f64) -> usize {
        if local.is_nan() || local <= 0.0 {
            return 0;
        }
        // Nudge so `local == n * frames_per_char` never lands one short from rounding.
        let n = (local * self.chars_per_frame + 1e-9).floor();
        (n as usize).min(self.char_count)
    }

    /// First local frame at which every character is visible.
    pub fn completion_frame(&self) -> f64 {
        self.char_count as f64 * self.frames_per_char()
    }

    pub fn is_complete(&self, local: f64) -> bool {
        self.visible_chars(local) == self.char_count
    }

    /// Local time since character `index` appeared (negative before it appears).
    pub fn char_local_frame(&self, index: usize, local: f64) -> f64 {
        local - index as f64 * self.frames_per_char()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/typewriter.rs"]
mod tests;
