//! # Physics Integrator
//!
//! Semi-implicit Euler, one step per particle per frame:
//!
//! 1. Gravity (and optional swirl) into velocity, then drag
//! 2. Occasional random horizontal kick
//! 3. Clamp each velocity component to `max_speed`
//! 4. Position from the new velocity
//! 5. Boundary response: floor bounce, or removal outside the margin

use spectra_core::{SimRng, Vec2};

use crate::particle::Particle;
use crate::policy::{BoundaryMode, EffectPhysicsPolicy};

/// Frame rectangle grown by a margin on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    /// Frame width (px).
    pub width: f32,
    /// Frame height (px). Also the floor.
    pub height: f32,
    /// Allowed drift outside the frame (px).
    pub margin: f32,
}

impl Region {
    /// True if `p` lies inside the margin-expanded rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= -self.margin
            && p.x <= self.width + self.margin
            && p.y >= -self.margin
            && p.y <= self.height + self.margin
    }

    /// Center of the frame.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Where a step left the particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Within the region.
    Inside,
    /// Left the region; remove it.
    Escaped,
}

/// Integrator configured from an effect policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsIntegrator {
    gravity: f32,
    drag: f32,
    max_speed: f32,
    turbulence_chance: f32,
    turbulence_impulse: f32,
    swirl: f32,
    boundary: BoundaryMode,
    margin: f32,
}

impl PhysicsIntegrator {
    /// Builds the integrator for `policy`.
    #[must_use]
    pub fn new(policy: &EffectPhysicsPolicy) -> Self {
        Self {
            gravity: policy.gravity,
            drag: policy.drag,
            max_speed: policy.max_speed.abs(),
            turbulence_chance: policy.turbulence_chance,
            turbulence_impulse: policy.turbulence_impulse,
            swirl: policy.swirl,
            boundary: policy.boundary,
            margin: policy.margin.max(0.0),
        }
    }

    /// Region particles must stay in for a frame of the given size.
    #[inline]
    #[must_use]
    pub fn region(&self, width: f32, height: f32) -> Region {
        Region {
            width,
            height,
            margin: self.margin,
        }
    }

    /// Advances one particle by `dt`.
    pub fn step(
        &self,
        particle: &mut Particle,
        region: &Region,
        dt: f32,
        rng: &mut SimRng,
    ) -> StepOutcome {
        let mut velocity = particle.velocity;
        velocity.y += self.gravity * dt;

        if self.swirl != 0.0 {
            let offset = particle.position - region.center();
            let distance = offset.length();
            if distance > 1.0 {
                velocity += offset.perp() * (self.swirl * dt / distance);
            }
        }

        velocity *= self.drag;

        if self.turbulence_chance > 0.0 && rng.chance(self.turbulence_chance) {
            velocity.x += rng.signed(self.turbulence_impulse);
        }

        velocity = velocity.finite_or_zero().clamp_components(self.max_speed);
        let mut position = (particle.position + velocity * dt).finite_or_zero();

        if let BoundaryMode::FloorBounce {
            rebound,
            settle_speed,
        } = self.boundary
        {
            if position.y > region.height {
                position.y = region.height;
                if velocity.y > 0.0 {
                    velocity.y = -velocity.y * rebound;
                    if velocity.y.abs() < settle_speed {
                        velocity.y = 0.0;
                    }
                }
            }
        }

        particle.velocity = velocity;
        particle.position = position;

        if region.contains(position) {
            StepOutcome::Inside
        } else {
            StepOutcome::Escaped
        }
    }
}
