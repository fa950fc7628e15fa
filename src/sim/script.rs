//! Scripted hand performances
//!
//! A script is a list of keyframes. The pose switches at each keyframe;
//! the pinch distance is interpolated linearly between neighbouring
//! keyframes. Scripts are JSON:
//!
//! ```json
//! { "aspect_ratio": 1.3333,
//!   "keyframes": [ { "at_ms": 0, "pose": "pinch", "pinch": 0.30 },
//!                  { "at_ms": 1500, "pose": "pinch", "pinch": 0.05 } ] }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pose;
use crate::control::source::{LandmarkSource, VideoFrame, VideoSource};
use crate::error::{PinchError, Result};
use crate::gesture::landmarks::HandLandmarks;

/// Hand shape held from a keyframe until the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    Pinch,
    Open,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub at_ms: u64,
    pub pose: Pose,
    /// Thumb-to-index distance in frame-diagonal units
    #[serde(default)]
    pub pinch: f32,
}

impl Keyframe {
    pub fn new(at_ms: u64, pose: Pose, pinch: f32) -> Self {
        Self { at_ms, pose, pinch }
    }
}

fn default_aspect_ratio() -> f32 {
    4.0 / 3.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: f32,
    pub keyframes: Vec<Keyframe>,
}

impl GestureScript {
    pub fn new(aspect_ratio: f32, keyframes: Vec<Keyframe>) -> Result<Self> {
        let script = Self {
            aspect_ratio,
            keyframes,
        };
        script.validate()?;
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let script: GestureScript = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.keyframes.is_empty() {
            return Err(PinchError::InvalidScript {
                reason: "script has no keyframes".to_string(),
            });
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(PinchError::InvalidScript {
                reason: format!("aspect_ratio {} must be positive", self.aspect_ratio),
            });
        }
        if self.keyframes.windows(2).any(|w| w[1].at_ms < w[0].at_ms) {
            return Err(PinchError::InvalidScript {
                reason: "keyframes must be in time order".to_string(),
            });
        }
        if let Some(k) = self
            .keyframes
            .iter()
            .find(|k| !(k.pinch.is_finite() && k.pinch >= 0.0))
        {
            return Err(PinchError::InvalidScript {
                reason: format!("pinch {} at {} ms must be finite and >= 0", k.pinch, k.at_ms),
            });
        }
        Ok(())
    }

    /// Time of the last keyframe
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.keyframes.last().map(|k| k.at_ms).unwrap_or(0))
    }

    /// Hand landmarks at time `t`, or `None` while the hand is absent
    pub fn sample(&self, t: Duration) -> Option<HandLandmarks> {
        let t_ms = t.as_secs_f64() * 1000.0;
        let idx = self
            .keyframes
            .iter()
            .rposition(|k| k.at_ms as f64 <= t_ms)
            .unwrap_or(0);
        let current = &self.keyframes[idx];

        let pinch = match self.keyframes.get(idx + 1) {
            Some(next) if next.at_ms > current.at_ms && t_ms >= current.at_ms as f64 => {
                let frac = (t_ms - current.at_ms as f64) / (next.at_ms - current.at_ms) as f64;
                current.pinch + (next.pinch - current.pinch) * frac.clamp(0.0, 1.0) as f32
            }
            _ => current.pinch,
        };

        match current.pose {
            Pose::Pinch => Some(pose::pinch(pinch, self.aspect_ratio)),
            Pose::Open => Some(pose::open_hand()),
            Pose::Absent => None,
        }
    }

    /// A short performance touching every feature
    ///
    /// Calibrates over a wide-to-closed sweep, bends pitch, toggles to
    /// volume, drops the hand for a moment, then toggles to reverb.
    pub fn demo() -> Self {
        use Pose::*;
        let keyframes = vec![
            Keyframe::new(0, Pinch, 0.40),
            Keyframe::new(1500, Pinch, 0.04),
            Keyframe::new(2500, Pinch, 0.22),
            Keyframe::new(3500, Pinch, 0.40),
            Keyframe::new(4000, Open, 0.0),
            Keyframe::new(4400, Pinch, 0.10),
            Keyframe::new(5400, Pinch, 0.35),
            Keyframe::new(5600, Absent, 0.0),
            Keyframe::new(6200, Pinch, 0.35),
            Keyframe::new(6600, Open, 0.0),
            Keyframe::new(7000, Pinch, 0.05),
            Keyframe::new(8000, Pinch, 0.40),
            Keyframe::new(9000, Pinch, 0.40),
        ];
        Self {
            aspect_ratio: default_aspect_ratio(),
            keyframes,
        }
    }
}

/// Build a scripted camera and landmark detector sharing one script
pub fn scripted_hand(script: GestureScript) -> (ScriptedCamera, ScriptedLandmarks) {
    let script = Arc::new(script);
    (
        ScriptedCamera::new(Arc::clone(&script)),
        ScriptedLandmarks { script },
    )
}

/// Camera that emits 640-pixel-wide frames until the script ends
#[derive(Debug)]
pub struct ScriptedCamera {
    script: Arc<GestureScript>,
    width: u32,
    height: u32,
    open: bool,
}

impl ScriptedCamera {
    fn new(script: Arc<GestureScript>) -> Self {
        let width = 640;
        let height = (width as f32 / script.aspect_ratio).round().max(1.0) as u32;
        Self {
            script,
            width,
            height,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl VideoSource for ScriptedCamera {
    fn open(&mut self) -> Result<()> {
        self.open = true;
        Ok(())
    }

    fn grab(&mut self, now: Duration) -> Option<VideoFrame> {
        if !self.open || now > self.script.duration() {
            return None;
        }
        Some(VideoFrame {
            width: self.width,
            height: self.height,
            timestamp: now,
        })
    }

    fn release(&mut self) {
        self.open = false;
    }
}

/// Landmark detector that reads poses from the script
#[derive(Debug)]
pub struct ScriptedLandmarks {
    script: Arc<GestureScript>,
}

impl LandmarkSource for ScriptedLandmarks {
    fn detect(&mut self, _frame: &VideoFrame, timestamp: Duration) -> Option<HandLandmarks> {
        self.script.sample(timestamp)
    }

    fn close(&mut self) {}
}
