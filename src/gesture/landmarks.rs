//! Hand landmark frames
//!
//! Landmarks follow the common 21-point hand topology: wrist at 0, then
//! four joints per finger from the base outwards (thumb 1-4, index 5-8,
//! middle 9-12, ring 13-16, pinky 17-20). Coordinates are normalized to
//! [0, 1] in both axes, with y growing downwards.

use std::time::Duration;

/// Number of points in a hand landmark set
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_TIP: usize = 20;

/// Joint indices of a non-thumb finger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerJoints {
    pub mcp: usize,
    pub pip: usize,
    pub tip: usize,
}

/// Index, middle, ring and pinky, in that order
pub const FINGERS: [FingerJoints; 4] = [
    FingerJoints { mcp: INDEX_MCP, pip: INDEX_PIP, tip: INDEX_TIP },
    FingerJoints { mcp: MIDDLE_MCP, pip: MIDDLE_PIP, tip: MIDDLE_TIP },
    FingerJoints { mcp: RING_MCP, pip: RING_PIP, tip: RING_TIP },
    FingerJoints { mcp: PINKY_MCP, pip: PINKY_PIP, tip: PINKY_TIP },
];

/// A single normalized landmark
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One hand's 21 landmarks
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Point; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice, returning `None` unless it has exactly 21 points
    pub fn from_slice(points: &[Point]) -> Option<Self> {
        let points: [Point; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { points })
    }

    #[inline]
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    pub fn points(&self) -> &[Point; LANDMARK_COUNT] {
        &self.points
    }
}

/// One video frame's worth of landmark data
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Time since the control session started
    pub timestamp: Duration,
    /// Width divided by height of the source video
    pub aspect_ratio: f32,
    /// The detected hand, if any
    pub hand: Option<HandLandmarks>,
}

impl Frame {
    pub fn new(timestamp: Duration, aspect_ratio: f32, hand: Option<HandLandmarks>) -> Self {
        Self {
            timestamp,
            aspect_ratio,
            hand,
        }
    }

    /// A frame in which no hand was detected
    pub fn empty(timestamp: Duration, aspect_ratio: f32) -> Self {
        Self::new(timestamp, aspect_ratio, None)
    }

    /// Distance between two landmarks in frame-diagonal units
    ///
    /// Normalized coordinates are first mapped back to pixel proportions
    /// using the aspect ratio, so a 1.0 distance always spans the diagonal
    /// regardless of resolution. Returns `None` when there is no hand.
    pub fn diagonal_distance(&self, a: usize, b: usize) -> Option<f32> {
        let hand = self.hand.as_ref()?;
        Some(diagonal_distance(hand.point(a), hand.point(b), self.aspect_ratio))
    }
}

/// Distance between two normalized points, divided by the frame diagonal
pub fn diagonal_distance(a: Point, b: Point, aspect_ratio: f32) -> f32 {
    let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };
    // Height is the unit: width = aspect, diagonal = sqrt(aspect^2 + 1)
    let dx = (a.x - b.x) * aspect;
    let dy = a.y - b.y;
    dx.hypot(dy) / aspect.hypot(1.0)
}
