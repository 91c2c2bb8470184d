//! Swipe gesture math
//!
//! All distances are in pixels. A terminal cell is treated as
//! [`CELL_WIDTH_PX`] by [`CELL_HEIGHT_PX`], so mouse positions and card
//! offsets convert to cells with a single division.

pub mod card;
pub mod spring;

pub use card::{CardCommand, CardEvent, CardHandle, CardPhase, SwipeCard};
pub use spring::{Spring, SpringConfig};

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Degrees at full horizontal drag
pub const MAX_ROTATION: f32 = 15.0;
/// Upward translation (negative) past which a release opens details
pub const VERTICAL_SWIPE_THRESHOLD: f32 = -50.0;
pub const MIN_DRAG_SCALE: f32 = 0.95;
pub const COMMIT_SCALE: f32 = 0.8;
pub const OVERLAY_MIN_SCALE: f32 = 0.8;

/// Longest a commit animation may run before the card resets
pub const RESET_DELAY: Duration = Duration::from_millis(250);
/// Pointer samples older than this are ignored for release velocity
pub const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

/// Distances derived from the screen width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    pub screen_width: f32,
}

impl SwipeConfig {
    pub fn new(screen_width: f32) -> Self {
        Self {
            screen_width: screen_width.max(1.0),
        }
    }

    /// Config for a terminal `columns` cells wide
    pub fn for_terminal(columns: u16) -> Self {
        Self::new(columns as f32 * CELL_WIDTH_PX)
    }

    pub fn swipe_threshold(&self) -> f32 {
        self.screen_width * 3.0 / 10.0
    }

    pub fn max_drag_distance(&self) -> f32 {
        self.screen_width * 0.5
    }

    pub fn fly_off_distance(&self) -> f32 {
        self.screen_width * 1.5
    }

    /// Offset at which overlays reach full opacity
    pub fn overlay_distance(&self) -> f32 {
        self.screen_width / 4.0
    }
}

/// Linear interpolation of `value` from `input` to `output`, clamped at both ends.
pub fn interpolate(value: f32, input: [f32; 2], output: [f32; 2]) -> f32 {
    let [in_start, in_end] = input;
    let [out_start, out_end] = output;

    if (in_end - in_start).abs() < f32::EPSILON {
        return out_start;
    }

    let t = ((value - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
    out_start + t * (out_end - out_start)
}

/// Visual state of the card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub x: f32,
    pub y: f32,
    /// Degrees, positive is clockwise
    pub rotation: f32,
    pub scale: f32,
}

impl Default for CardTransform {
    fn default() -> Self {
        Self::REST
    }
}

impl CardTransform {
    pub const REST: CardTransform = CardTransform {
        x: 0.0,
        y: 0.0,
        rotation: 0.0,
        scale: 1.0,
    };

    pub fn is_rest(&self) -> bool {
        self.x.abs() < 0.5
            && self.y.abs() < 0.5
            && self.rotation.abs() < 0.01
            && (self.scale - 1.0).abs() < 0.001
    }

    /// Transform for a drag of `(dx, dy)` that started at `origin`.
    pub fn dragged(origin: &CardTransform, dx: f32, dy: f32, config: &SwipeConfig) -> Self {
        let max_drag = config.max_drag_distance();
        let x = (origin.x + dx).clamp(-max_drag, max_drag);
        let y = (origin.y + dy).min(0.0);

        Self {
            x,
            y,
            rotation: rotation_for(x, config),
            scale: drag_scale_for(x, config),
        }
    }
}

pub fn rotation_for(x: f32, config: &SwipeConfig) -> f32 {
    let max_drag = config.max_drag_distance();
    interpolate(x, [-max_drag, max_drag], [-MAX_ROTATION, MAX_ROTATION])
}

pub fn drag_scale_for(x: f32, config: &SwipeConfig) -> f32 {
    interpolate(
        x.abs(),
        [0.0, config.max_drag_distance()],
        [1.0, MIN_DRAG_SCALE],
    )
}

/// Label fade state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub opacity: f32,
    pub scale: f32,
}

impl Overlay {
    fn from_opacity(opacity: f32) -> Self {
        Self {
            opacity,
            scale: interpolate(opacity, [0.0, 1.0], [OVERLAY_MIN_SCALE, 1.0]),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// "KEEP" label, fading in as the card moves right
pub fn keep_overlay(x: f32, config: &SwipeConfig) -> Overlay {
    Overlay::from_opacity(interpolate(x, [0.0, config.overlay_distance()], [0.0, 1.0]))
}

/// "YEET" label, fading in as the card moves left
pub fn yeet_overlay(x: f32, config: &SwipeConfig) -> Overlay {
    Overlay::from_opacity(interpolate(
        x,
        [-config.overlay_distance(), 0.0],
        [1.0, 0.0],
    ))
}

/// What a released drag turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    SwipeUp,
    Commit(SwipeDirection),
    Cancel,
}

/// Decides a release. `translation_y` is the raw vertical movement since the
/// drag began, `offset_x` the clamped horizontal card offset.
pub fn classify_release(translation_y: f32, offset_x: f32, config: &SwipeConfig) -> ReleaseOutcome {
    if translation_y < VERTICAL_SWIPE_THRESHOLD {
        ReleaseOutcome::SwipeUp
    } else if offset_x.abs() > config.swipe_threshold() {
        if offset_x > 0.0 {
            ReleaseOutcome::Commit(SwipeDirection::Right)
        } else {
            ReleaseOutcome::Commit(SwipeDirection::Left)
        }
    } else {
        ReleaseOutcome::Cancel
    }
}

/// Recent pointer positions, for release velocity
#[derive(Debug, Default)]
pub struct GestureTracker {
    samples: VecDeque<(Instant, f32, f32)>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn push(&mut self, at: Instant, x: f32, y: f32) {
        self.samples.push_back((at, x, y));
        while let Some(&(first, _, _)) = self.samples.front() {
            if at.duration_since(first) > VELOCITY_WINDOW && self.samples.len() > 2 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Pixels per second over the samples inside the window ending at `now`.
    pub fn velocity(&self, now: Instant) -> (f32, f32) {
        let recent: Vec<_> = self
            .samples
            .iter()
            .filter(|(at, _, _)| now.saturating_duration_since(*at) <= VELOCITY_WINDOW)
            .collect();

        match (recent.first(), recent.last()) {
            (Some(&&(t0, x0, y0)), Some(&&(t1, x1, y1))) => {
                let dt = t1.duration_since(t0).as_secs_f32();
                if dt <= f32::EPSILON {
                    (0.0, 0.0)
                } else {
                    ((x1 - x0) / dt, (y1 - y0) / dt)
                }
            }
            _ => (0.0, 0.0),
        }
    }
}
