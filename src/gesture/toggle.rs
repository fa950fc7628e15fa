//! Debounced mode-toggle detection
//!
//! An open hand held for `hold_threshold` consecutive frames advances the
//! mode once. Any negative frame clears the hold count and re-arms the
//! detector; a toggle disarms it, so a gesture that is simply kept up
//! cannot fire a second time.

use std::time::Duration;

use log::debug;

use super::landmarks::{diagonal_distance, HandLandmarks, FINGERS, PINKY_TIP, THUMB_TIP};
use super::mode::ControlMode;

/// Thresholds for open-hand detection and debouncing
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleRules {
    pub hold_threshold: u32,
    pub cooldown: Duration,
    pub open_hand_spread: f32,
    pub min_extended_fingers: usize,
}

/// Count index/middle/ring/pinky fingers whose tip is above PIP and MCP
pub fn extended_fingers(hand: &HandLandmarks) -> usize {
    FINGERS
        .iter()
        .filter(|f| {
            let tip = hand.point(f.tip).y;
            tip < hand.point(f.pip).y && tip < hand.point(f.mcp).y
        })
        .count()
}

/// Whether the hand shows the open-palm toggle gesture
pub fn is_open_hand(hand: &HandLandmarks, aspect_ratio: f32, rules: &ToggleRules) -> bool {
    if extended_fingers(hand) < rules.min_extended_fingers {
        return false;
    }
    let spread = diagonal_distance(hand.point(THUMB_TIP), hand.point(PINKY_TIP), aspect_ratio);
    spread > rules.open_hand_spread
}

/// Mode and debounce state for one control session
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    mode: ControlMode,
    armed: bool,
    hold_frame_count: u32,
    last_toggle_time: Option<Duration>,
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new(ControlMode::default())
    }
}

impl GestureState {
    pub fn new(mode: ControlMode) -> Self {
        Self {
            mode,
            armed: true,
            hold_frame_count: 0,
            last_toggle_time: None,
        }
    }

    /// Feed one classified frame; returns true when the mode advanced
    pub fn register(&mut self, positive: bool, now: Duration, rules: &ToggleRules) -> bool {
        if !positive {
            self.release();
            return false;
        }

        self.hold_frame_count = self.hold_frame_count.saturating_add(1);

        let cooled_down = match self.last_toggle_time {
            None => true,
            Some(last) => now.saturating_sub(last) > rules.cooldown,
        };

        if self.armed && self.hold_frame_count >= rules.hold_threshold && cooled_down {
            let previous = self.mode;
            self.mode = self.mode.next();
            self.hold_frame_count = 0;
            self.last_toggle_time = Some(now);
            self.armed = false;
            debug!("Mode toggled: {} -> {}", previous, self.mode);
            return true;
        }
        false
    }

    /// Clear the hold count after a negative frame
    pub fn release(&mut self) {
        self.hold_frame_count = 0;
        self.armed = true;
    }

    /// Clear the hold count without re-arming (hand lost from view)
    pub fn interrupt(&mut self) {
        self.hold_frame_count = 0;
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn hold_frame_count(&self) -> u32 {
        self.hold_frame_count
    }

    pub fn last_toggle_time(&self) -> Option<Duration> {
        self.last_toggle_time
    }
}
