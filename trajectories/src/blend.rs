//! Motion blending for remote shadow objects.
//!
//! DESIGN
//! ======
//! Remote values arrive at the heartbeat rate with jitter. Snapping to each
//! value makes autonomous motion stutter; a single slow factor makes remote
//! seeks feel sluggish. Position therefore uses two regimes:
//!
//! - animating locally and the jump is small: slow correction
//! - idle, or a large jump (wraparound, seek): fast correction
//!
//! Speed always uses a fixed small factor. Discrete fields are copied as-is.

#[cfg(test)]
#[path = "blend_test.rs"]
mod blend_test;

use crate::codec::ObjectSnapshot;
use crate::consts::{
    DEFAULT_JUMP_THRESHOLD, DEFAULT_POSITION_ALPHA_FAST, DEFAULT_POSITION_ALPHA_SLOW, DEFAULT_SPEED_ALPHA,
};
use crate::model::{AnimatedObject, wrap_unit};

/// Smoothing parameters. All factors are clamped to `[0, 1]` when used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendConfig {
    pub speed_alpha: f64,
    pub position_alpha_slow: f64,
    pub position_alpha_fast: f64,
    /// Normalized jump at or above which the fast factor applies.
    pub jump_threshold: f64,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            speed_alpha: DEFAULT_SPEED_ALPHA,
            position_alpha_slow: DEFAULT_POSITION_ALPHA_SLOW,
            position_alpha_fast: DEFAULT_POSITION_ALPHA_FAST,
            jump_threshold: DEFAULT_JUMP_THRESHOLD,
        }
    }
}

/// Applies incoming remote values to shadow objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionBlender {
    config: BlendConfig,
}

impl MotionBlender {
    #[must_use]
    pub fn new(config: BlendConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &BlendConfig {
        &self.config
    }

    /// Move `shadow` toward `incoming`. Absent fields are left untouched.
    pub fn blend(&self, shadow: &mut AnimatedObject, incoming: &ObjectSnapshot) {
        // Regime is decided on the shadow's own animate flag before it is overwritten.
        let was_animating = shadow.animate;

        if let Some(speed) = incoming.speed {
            shadow.speed = lerp(shadow.speed, speed, unit(self.config.speed_alpha));
        }
        if let Some(target) = incoming.position {
            let target = wrap_unit(target);
            let alpha = self.position_alpha(was_animating, shadow.position, target);
            shadow.position = wrap_unit(lerp(shadow.position, target, alpha));
        }

        incoming.apply_discrete(shadow);
    }

    /// Factor used to correct `current` toward `target`.
    #[must_use]
    pub fn position_alpha(&self, animating: bool, current: f64, target: f64) -> f64 {
        let jump = (target - current).abs();
        if animating && jump < self.config.jump_threshold {
            unit(self.config.position_alpha_slow)
        } else {
            unit(self.config.position_alpha_fast)
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn unit(alpha: f64) -> f64 {
    if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 1.0 }
}
