//! Swipe card state machine
//!
//! ```text
//! Idle ──begin_drag──▶ Dragging ──release──▶ Committing ──tick──▶ Idle
//!   ▲                     │                      ▲
//!   │                     └──release─▶ Resetting ┘ (trigger)
//!   └──────────tick (settled)─────────────┘
//! ```
//!
//! Gesture input arrives through [`SwipeCard::begin_drag`],
//! [`SwipeCard::drag`] and [`SwipeCard::release`]. Controls that are not
//! gestures hold a [`CardHandle`] and send the same three commits through
//! it; commands are applied on the next [`SwipeCard::tick`], so both paths
//! play the same animation.

use super::spring::{Spring, SpringConfig};
use super::{
    classify_release, rotation_for, CardTransform, GestureTracker, ReleaseOutcome, SwipeConfig,
    SwipeDirection, COMMIT_SCALE, RESET_DELAY,
};
use crate::error::{Result, YeetError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

/// Frames longer than this are simulated as this long
const MAX_FRAME: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardPhase {
    Idle,
    Dragging,
    Committing(SwipeDirection),
    Resetting,
}

/// Notification that a commit finished or details were requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    SwipedLeft,
    SwipedRight,
    SwipedUp,
}

impl From<SwipeDirection> for CardEvent {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => CardEvent::SwipedLeft,
            SwipeDirection::Right => CardEvent::SwipedRight,
            SwipeDirection::Up => CardEvent::SwipedUp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCommand {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
}

impl CardCommand {
    fn direction(self) -> SwipeDirection {
        match self {
            CardCommand::SwipeLeft => SwipeDirection::Left,
            CardCommand::SwipeRight => SwipeDirection::Right,
            CardCommand::SwipeUp => SwipeDirection::Up,
        }
    }
}

/// Trigger capability for a mounted card.
///
/// Sending fails with [`YeetError::CardUnmounted`] once the card is dropped.
#[derive(Debug, Clone)]
pub struct CardHandle {
    commands: mpsc::UnboundedSender<CardCommand>,
}

impl CardHandle {
    pub fn swipe_left(&self) -> Result<()> {
        self.send(CardCommand::SwipeLeft)
    }

    pub fn swipe_right(&self) -> Result<()> {
        self.send(CardCommand::SwipeRight)
    }

    pub fn swipe_up(&self) -> Result<()> {
        self.send(CardCommand::SwipeUp)
    }

    pub fn send(&self, command: CardCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| YeetError::CardUnmounted)
    }

    pub fn is_mounted(&self) -> bool {
        !self.commands.is_closed()
    }
}

pub struct SwipeCard {
    config: SwipeConfig,
    phase: CardPhase,
    x: Spring,
    y: Spring,
    scale: Spring,
    /// Transform when the current drag began
    origin: CardTransform,
    tracker: GestureTracker,
    commit_started: Option<Instant>,
    last_tick: Option<Instant>,
    commands: mpsc::UnboundedReceiver<CardCommand>,
    handle: CardHandle,
}

impl SwipeCard {
    pub fn new(config: SwipeConfig) -> Self {
        let (sender, commands) = mpsc::unbounded_channel();
        Self {
            config,
            phase: CardPhase::Idle,
            x: Spring::at(0.0, SpringConfig::RESET),
            y: Spring::at(0.0, SpringConfig::RESET),
            scale: Spring::at(1.0, SpringConfig::RESET.fine()),
            origin: CardTransform::REST,
            tracker: GestureTracker::new(),
            commit_started: None,
            last_tick: None,
            commands,
            handle: CardHandle { commands: sender },
        }
    }

    /// A new handle to this card's triggers
    pub fn handle(&self) -> CardHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// Updates distances after a terminal resize.
    pub fn set_config(&mut self, config: SwipeConfig) {
        self.config = config;
    }

    pub fn phase(&self) -> CardPhase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        !matches!(self.phase, CardPhase::Idle)
    }

    pub fn transform(&self) -> CardTransform {
        CardTransform {
            x: self.x.value,
            y: self.y.value,
            rotation: rotation_for(self.x.value, &self.config),
            scale: self.scale.value,
        }
    }

    /// Where the springs are heading
    pub fn target(&self) -> CardTransform {
        CardTransform {
            x: self.x.target,
            y: self.y.target,
            rotation: rotation_for(self.x.target, &self.config),
            scale: self.scale.target,
        }
    }

    fn set_transform(&mut self, transform: CardTransform) {
        self.x.snap(transform.x);
        self.y.snap(transform.y);
        self.scale.snap(transform.scale);
    }

    /// Starts a drag. Refused while a commit is in flight.
    pub fn begin_drag(&mut self, now: Instant) -> bool {
        if matches!(self.phase, CardPhase::Committing(_)) {
            return false;
        }

        self.origin = self.transform();
        self.set_transform(self.origin);
        self.tracker.clear();
        self.tracker.push(now, 0.0, 0.0);
        self.phase = CardPhase::Dragging;
        true
    }

    /// Applies the translation since the drag began.
    pub fn drag(&mut self, dx: f32, dy: f32, now: Instant) {
        if self.phase != CardPhase::Dragging {
            return;
        }
        let transform = CardTransform::dragged(&self.origin, dx, dy, &self.config);
        self.set_transform(transform);
        self.tracker.push(now, dx, dy);
    }

    /// Ends the drag with the final translation.
    ///
    /// An upward swipe reports [`CardEvent::SwipedUp`] right away and
    /// springs back; a horizontal commit reports its event from `tick` once
    /// the fly-off completes.
    pub fn release(&mut self, dx: f32, dy: f32, now: Instant) -> Option<CardEvent> {
        if self.phase != CardPhase::Dragging {
            return None;
        }

        self.drag(dx, dy, now);
        let (velocity_x, _) = self.tracker.velocity(now);
        self.tracker.clear();

        match classify_release(dy, self.x.value, &self.config) {
            ReleaseOutcome::SwipeUp => {
                debug!("Card released upward");
                self.spring_to_rest(SpringConfig::FLY_OFF);
                Some(CardEvent::SwipedUp)
            }
            ReleaseOutcome::Commit(direction) => {
                self.start_commit(direction, velocity_x, now);
                None
            }
            ReleaseOutcome::Cancel => {
                self.spring_to_rest(SpringConfig::FLY_OFF);
                None
            }
        }
    }

    /// Abandons a drag without committing.
    pub fn cancel_drag(&mut self) {
        if self.phase == CardPhase::Dragging {
            self.tracker.clear();
            self.spring_to_rest(SpringConfig::RESET);
        }
    }

    /// Plays a commit without a gesture. Refused while a commit is in flight.
    pub fn trigger(&mut self, direction: SwipeDirection, now: Instant) -> bool {
        if matches!(self.phase, CardPhase::Committing(_)) {
            debug!("Ignoring {:?} trigger during commit", direction);
            return false;
        }
        self.tracker.clear();
        self.start_commit(direction, 0.0, now);
        true
    }

    fn start_commit(&mut self, direction: SwipeDirection, velocity_x: f32, now: Instant) {
        let fly_off = self.config.fly_off_distance();
        match direction {
            SwipeDirection::Left | SwipeDirection::Right => {
                let sign = if direction == SwipeDirection::Left { -1.0 } else { 1.0 };
                self.x
                    .animate_to(sign * fly_off, velocity_x, SpringConfig::FLY_OFF);
                self.y.animate_to(0.0, 0.0, SpringConfig::FLY_OFF);
            }
            SwipeDirection::Up => {
                self.x.animate_to(0.0, 0.0, SpringConfig::FLY_OFF);
                self.y
                    .animate_to(-self.config.screen_width, 0.0, SpringConfig::FLY_OFF);
            }
        }
        self.scale
            .animate_to(COMMIT_SCALE, 0.0, SpringConfig::FLY_OFF.fine());

        debug!("Card committing {:?}", direction);
        self.phase = CardPhase::Committing(direction);
        self.commit_started = Some(now);
    }

    /// Released gestures spring back with the fly-off dynamics.
    fn spring_to_rest(&mut self, config: SpringConfig) {
        self.x.animate_to(0.0, self.x.velocity, config);
        self.y.animate_to(0.0, self.y.velocity, config);
        self.scale.animate_to(1.0, 0.0, config.fine());
        self.phase = CardPhase::Resetting;
    }

    fn springs_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled() && self.scale.is_settled()
    }

    fn is_offscreen(&self, direction: SwipeDirection) -> bool {
        let width = self.config.screen_width;
        match direction {
            SwipeDirection::Left | SwipeDirection::Right => self.x.value.abs() >= width,
            SwipeDirection::Up => self.y.value <= -width,
        }
    }

    /// Applies queued commands and advances animations to `now`.
    ///
    /// Returns the event of a commit that completed during this frame.
    pub fn tick(&mut self, now: Instant) -> Option<CardEvent> {
        while let Ok(command) = self.commands.try_recv() {
            self.trigger(command.direction(), now);
        }

        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).min(MAX_FRAME))
            .unwrap_or_default();
        self.last_tick = Some(now);

        match self.phase {
            CardPhase::Idle | CardPhase::Dragging => None,
            CardPhase::Resetting => {
                self.step_springs(elapsed);
                if self.springs_settled() {
                    self.set_transform(CardTransform::REST);
                    self.phase = CardPhase::Idle;
                }
                None
            }
            CardPhase::Committing(direction) => {
                self.step_springs(elapsed);

                let timed_out = self
                    .commit_started
                    .map(|started| now.saturating_duration_since(started) >= RESET_DELAY)
                    .unwrap_or(true);

                if self.is_offscreen(direction) || self.springs_settled() || timed_out {
                    // The next photo takes the card's place at rest
                    self.set_transform(CardTransform::REST);
                    self.phase = CardPhase::Idle;
                    self.commit_started = None;
                    debug!("Card commit {:?} complete", direction);
                    Some(direction.into())
                } else {
                    None
                }
            }
        }
    }

    fn step_springs(&mut self, elapsed: Duration) {
        self.x.step(elapsed);
        self.y.step(elapsed);
        self.scale.step(elapsed);
    }
}
