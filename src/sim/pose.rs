//! Synthetic hand poses
//!
//! Enough geometry to exercise the interpreter: a loose fist whose thumb
//! and index tips sit a chosen distance apart, and a flat open palm.

use crate::gesture::landmarks::{HandLandmarks, Point, LANDMARK_COUNT};

/// Horizontal centre of the pinch
const PINCH_CENTER_X: f32 = 0.45;

/// Height of the thumb and index tips in the pinch pose
const PINCH_Y: f32 = 0.62;

/// Curled hand with thumb and index tips `dist` apart (frame-diagonal units)
pub fn pinch(dist: f32, aspect_ratio: f32) -> HandLandmarks {
    let aspect = if aspect_ratio > 0.0 { aspect_ratio } else { 1.0 };
    // Horizontal offset in normalized x that spans `dist` of the diagonal
    let half = dist.max(0.0) * aspect.hypot(1.0) / aspect / 2.0;

    let mut points = [Point::default(); LANDMARK_COUNT];
    points[0] = Point::new(0.50, 0.85);
    // Thumb
    points[1] = Point::new(0.42, 0.78);
    points[2] = Point::new(0.38, 0.72);
    points[3] = Point::new(0.36, 0.66);
    points[4] = Point::new((PINCH_CENTER_X - half).clamp(0.0, 1.0), PINCH_Y);
    // Index: the tip folds back towards the thumb
    points[5] = Point::new(0.45, 0.60);
    points[6] = Point::new(0.45, 0.52);
    points[7] = Point::new(0.46, 0.56);
    points[8] = Point::new((PINCH_CENTER_X + half).clamp(0.0, 1.0), PINCH_Y);
    // Middle, ring and pinky curled: tips below their PIP and MCP joints
    for (finger, x) in [(2usize, 0.50_f32), (3, 0.55), (4, 0.60)] {
        let base = 1 + finger * 4;
        points[base] = Point::new(x, 0.60);
        points[base + 1] = Point::new(x, 0.52);
        points[base + 2] = Point::new(x, 0.58);
        points[base + 3] = Point::new(x, 0.64);
    }
    HandLandmarks::new(points)
}

/// Flat palm with all four fingers extended and the thumb spread wide
pub fn open_hand() -> HandLandmarks {
    let mut points = [Point::default(); LANDMARK_COUNT];
    points[0] = Point::new(0.50, 0.85);
    points[1] = Point::new(0.40, 0.78);
    points[2] = Point::new(0.32, 0.70);
    points[3] = Point::new(0.26, 0.62);
    points[4] = Point::new(0.20, 0.55);
    for (finger, x) in [(1usize, 0.40_f32), (2, 0.50), (3, 0.60), (4, 0.72)] {
        let base = 1 + finger * 4;
        points[base] = Point::new(x, 0.55);
        points[base + 1] = Point::new(x, 0.42);
        points[base + 2] = Point::new(x, 0.32);
        points[base + 3] = Point::new(x, 0.22);
    }
    HandLandmarks::new(points)
}
