//! Keyframed property values.
//!
//! Keyframe-capable properties store their animation as a string of
//! `frame=value` pairs separated by `;`. The separator before `=` selects
//! how the segment starting at that keyframe is interpolated:
//! `=` linear, `|=` hold, `~=` smooth. Values are kept as text so that
//! geometry values ("x y w h") survive untouched; numeric evaluation is
//! only offered for single-number values.

use std::fmt;
use std::str::FromStr;

use crate::error::{FxStackError, Result};

// ── Easing curves ───────────────────────────────────────────────

/// Cubic Bézier control points for easing (x1, y1, x2, y2).
/// The curve goes from (0,0) to (1,1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample(t: f64, p1: f64, p2: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * self.x1 + 6.0 * mt * t * (self.x2 - self.x1) + 3.0 * t * t * (1.0 - self.x2)
    }

    /// Solve for the parameter t given an x value using Newton-Raphson.
    /// Returns the y value at that x.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        let mut t = x;
        for _ in 0..8 {
            let x_est = Self::sample(t, self.x1, self.x2) - x;
            let dx = self.sample_dx(t);
            if dx.abs() < 1e-12 {
                break;
            }
            t = (t - x_est / dx).clamp(0.0, 1.0);
            if x_est.abs() < 1e-10 {
                break;
            }
        }

        Self::sample(t, self.y1, self.y2)
    }

    pub const EASE_IN_OUT: Self = Self::new(0.42, 0.0, 0.58, 1.0);
}

/// How to interpolate from a keyframe to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyframeType {
    /// Keep the value until the next keyframe.
    Discrete,
    #[default]
    Linear,
    /// Ease in and out.
    Smooth,
}

impl KeyframeType {
    fn separator(self) -> &'static str {
        match self {
            Self::Discrete => "|=",
            Self::Linear => "=",
            Self::Smooth => "~=",
        }
    }
}

// ── Keyframe ────────────────────────────────────────────────────

/// A single keyframe at a frame position.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub frame: i64,
    pub value: String,
    pub kind: KeyframeType,
}

impl Keyframe {
    pub fn new(frame: i64, value: impl Into<String>, kind: KeyframeType) -> Self {
        Self {
            frame,
            value: value.into(),
            kind,
        }
    }
}

// ── Keyframe track ──────────────────────────────────────────────

/// Keyframes of one property, kept sorted by frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyframeTrack {
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `value` looks like a keyframe string rather than a plain value.
    pub fn is_keyframe_string(value: &str) -> bool {
        value.contains('=')
    }

    /// Parse a `frame=value;frame=value` string.
    pub fn parse(text: &str) -> Result<Self> {
        let mut track = Self::new();
        for token in text.split(';').map(str::trim).filter(|t| !t.is_empty()) {
            let (head, value) = token.split_once('=').ok_or_else(|| {
                FxStackError::Serialization(format!("Keyframe without '=': {token}"))
            })?;
            let (frame, kind) = if let Some(f) = head.strip_suffix('|') {
                (f, KeyframeType::Discrete)
            } else if let Some(f) = head.strip_suffix('~') {
                (f, KeyframeType::Smooth)
            } else {
                (head, KeyframeType::Linear)
            };
            let frame = frame.trim().parse::<i64>().map_err(|e| {
                FxStackError::Serialization(format!("Bad keyframe frame '{frame}': {e}"))
            })?;
            track.set(frame, value.trim(), kind);
        }
        Ok(track)
    }

    /// Insert or update a keyframe. Maintains sorted order.
    pub fn set(&mut self, frame: i64, value: impl Into<String>, kind: KeyframeType) {
        let value = value.into();
        match self.keyframes.binary_search_by(|kf| kf.frame.cmp(&frame)) {
            Ok(pos) => {
                self.keyframes[pos].value = value;
                self.keyframes[pos].kind = kind;
            }
            Err(pos) => self.keyframes.insert(pos, Keyframe::new(frame, value, kind)),
        }
    }

    /// Remove the keyframe at `frame`.
    pub fn remove(&mut self, frame: i64) -> bool {
        if let Ok(pos) = self.keyframes.binary_search_by(|kf| kf.frame.cmp(&frame)) {
            self.keyframes.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Numeric value at `frame`, or `None` when a bracketing value is not a number.
    pub fn value_at(&self, frame: i64) -> Option<f64> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if frame <= first.frame {
            return first.value.parse().ok();
        }
        if frame >= last.frame {
            return last.value.parse().ok();
        }

        let idx = self
            .keyframes
            .partition_point(|kf| kf.frame <= frame)
            .saturating_sub(1);
        let a = &self.keyframes[idx];
        let b = &self.keyframes[idx + 1];
        let va: f64 = a.value.parse().ok()?;
        if a.kind == KeyframeType::Discrete {
            return Some(va);
        }
        let vb: f64 = b.value.parse().ok()?;

        // Frames can span the whole i64 range; subtract in f64.
        let t = (frame as f64 - a.frame as f64) / (b.frame as f64 - a.frame as f64);
        let t = match a.kind {
            KeyframeType::Smooth => CubicBezier::EASE_IN_OUT.evaluate(t),
            _ => t,
        };
        Some(va + (vb - va) * t)
    }

    /// Index of the last keyframe at or before `frame`.
    pub fn active_index(&self, frame: i64) -> Option<usize> {
        self.keyframes
            .partition_point(|kf| kf.frame <= frame)
            .checked_sub(1)
    }
}

impl FromStr for KeyframeTrack {
    type Err = FxStackError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyframeTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kf) in self.keyframes.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}{}{}", kf.frame, kf.kind.separator(), kf.value)?;
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let track: KeyframeTrack = "0=0;50|=1;100~=0.5".parse().unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track.keyframes()[1].kind, KeyframeType::Discrete);
        assert_eq!(track.keyframes()[2].kind, KeyframeType::Smooth);
        assert_eq!(track.to_string(), "0=0;50|=1;100~=0.5");
    }

    #[test]
    fn test_value_at_extreme_frames() {
        let track = KeyframeTrack::parse("-9223372036854775808=0;9223372036854775807=1").unwrap();
        let v = track.value_at(0).unwrap();
        assert!((v - 0.5).abs() < 1e-9);
        assert_eq!(track.value_at(i64::MIN), Some(0.0));
        assert_eq!(track.value_at(i64::MAX), Some(1.0));
    }

    #[test]
    fn test_parse_sorts_frames() {
        let track = KeyframeTrack::parse("20=2;10=1").unwrap();
        assert_eq!(track.to_string(), "10=1;20=2");
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        assert!(KeyframeTrack::parse("10").is_err());
        assert!(KeyframeTrack::parse("x=1").is_err());
    }

    #[test]
    fn test_linear_interpolation() {
        let track = KeyframeTrack::parse("0=0;100=1").unwrap();
        assert!((track.value_at(50).unwrap() - 0.5).abs() < 0.001);
        assert!((track.value_at(-5).unwrap() - 0.0).abs() < 0.001);
        assert!((track.value_at(500).unwrap() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_discrete_holds_value() {
        let track = KeyframeTrack::parse("0|=0;100=1").unwrap();
        assert!((track.value_at(99).unwrap() - 0.0).abs() < 0.001);
        assert!((track.value_at(100).unwrap() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_smooth_is_symmetric() {
        let track = KeyframeTrack::parse("0~=0;100=100").unwrap();
        let mid = track.value_at(50).unwrap();
        assert!((mid - 50.0).abs() < 5.0);
        assert!(track.value_at(10).unwrap() < 10.0);
    }

    #[test]
    fn test_geometry_values_are_not_numeric() {
        let track = KeyframeTrack::parse("0=0 0 1920 1080;10=10 10 100 100").unwrap();
        assert_eq!(track.value_at(5), None);
        assert_eq!(track.active_index(5), Some(0));
        assert_eq!(track.active_index(-1), None);
    }

    #[test]
    fn test_set_overwrites_and_remove() {
        let mut track = KeyframeTrack::parse("0=1").unwrap();
        track.set(0, "5", KeyframeType::Discrete);
        assert_eq!(track.len(), 1);
        assert!(track.remove(0));
        assert!(!track.remove(0));
        assert_eq!(track.value_at(0), None);
    }

    #[test]
    fn test_cubic_bezier_endpoints() {
        let bezier = CubicBezier::EASE_IN_OUT;
        assert!((bezier.evaluate(0.0) - 0.0).abs() < 0.001);
        assert!((bezier.evaluate(1.0) - 1.0).abs() < 0.001);
    }
}
