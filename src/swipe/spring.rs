// Damped spring used for card fly-off and snap-back animations

use std::time::Duration;

/// Integration step; longer frames are split into steps of this size
const STEP: f32 = 1.0 / 240.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub damping: f32,
    pub stiffness: f32,
    pub mass: f32,
    /// Distance from target below which the spring may settle
    pub rest_displacement: f32,
    /// Speed below which the spring may settle
    pub rest_speed: f32,
}

impl SpringConfig {
    /// Card leaving the screen
    pub const FLY_OFF: SpringConfig = SpringConfig {
        damping: 20.0,
        stiffness: 80.0,
        mass: 1.0,
        rest_displacement: 0.5,
        rest_speed: 2.0,
    };

    /// Card returning to rest
    pub const RESET: SpringConfig = SpringConfig {
        damping: 15.0,
        stiffness: 100.0,
        mass: 1.0,
        rest_displacement: 0.5,
        rest_speed: 2.0,
    };

    /// Same dynamics with thresholds suited to unit-scale values
    pub const fn fine(self) -> Self {
        Self {
            rest_displacement: 0.001,
            rest_speed: 0.01,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub value: f32,
    pub velocity: f32,
    pub target: f32,
    config: SpringConfig,
}

impl Spring {
    /// A spring resting at `value`
    pub fn at(value: f32, config: SpringConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config,
        }
    }

    /// Starts moving toward `target` from the current value.
    pub fn animate_to(&mut self, target: f32, velocity: f32, config: SpringConfig) {
        self.target = target;
        self.velocity = velocity;
        self.config = config;
    }

    /// Jumps to `value` with no motion.
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn is_settled(&self) -> bool {
        (self.value - self.target).abs() <= self.config.rest_displacement
            && self.velocity.abs() <= self.config.rest_speed
    }

    /// Advances the simulation; snaps to the target once settled.
    pub fn step(&mut self, elapsed: Duration) {
        if self.is_settled() {
            self.snap(self.target);
            return;
        }

        let mut remaining = elapsed.as_secs_f32();
        while remaining > 0.0 {
            let dt = remaining.min(STEP);
            let displacement = self.value - self.target;
            let force = -self.config.stiffness * displacement - self.config.damping * self.velocity;
            self.velocity += force / self.config.mass * dt;
            self.value += self.velocity * dt;
            remaining -= dt;
        }

        if self.is_settled() {
            self.snap(self.target);
        }
    }
}
