//! Environment-driven tuning.
//!
//! Every knob has a compiled default; a missing or unparsable variable falls
//! back to it silently.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

use crate::blend::BlendConfig;
use crate::consts::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_HEARTBEAT_MS, DEFAULT_JUMP_THRESHOLD, DEFAULT_POSITION_ALPHA_FAST,
    DEFAULT_POSITION_ALPHA_SLOW, DEFAULT_SPEED_ALPHA,
};
use crate::publisher::PublishConfig;

pub const ENV_DEBOUNCE_MS: &str = "SYNC_DEBOUNCE_MS";
pub const ENV_HEARTBEAT_MS: &str = "SYNC_HEARTBEAT_MS";
pub const ENV_SPEED_ALPHA: &str = "BLEND_SPEED_ALPHA";
pub const ENV_POSITION_ALPHA_SLOW: &str = "BLEND_POSITION_ALPHA_SLOW";
pub const ENV_POSITION_ALPHA_FAST: &str = "BLEND_POSITION_ALPHA_FAST";
pub const ENV_JUMP_THRESHOLD: &str = "BLEND_JUMP_THRESHOLD";

/// All tuning for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SyncConfig {
    pub blend: BlendConfig,
    pub publish: PublishConfig,
}

impl SyncConfig {
    /// Load from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(|raw| raw.to_string_lossy().into_owned()))
    }

    /// Load through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let debounce_ms = parse_or(&lookup, ENV_DEBOUNCE_MS, DEFAULT_DEBOUNCE_MS);
        // A zero period would spin the heartbeat on every tick.
        let heartbeat_ms = parse_or(&lookup, ENV_HEARTBEAT_MS, DEFAULT_HEARTBEAT_MS).max(1);

        Self {
            blend: BlendConfig {
                speed_alpha: parse_or(&lookup, ENV_SPEED_ALPHA, DEFAULT_SPEED_ALPHA),
                position_alpha_slow: parse_or(&lookup, ENV_POSITION_ALPHA_SLOW, DEFAULT_POSITION_ALPHA_SLOW),
                position_alpha_fast: parse_or(&lookup, ENV_POSITION_ALPHA_FAST, DEFAULT_POSITION_ALPHA_FAST),
                jump_threshold: parse_or(&lookup, ENV_JUMP_THRESHOLD, DEFAULT_JUMP_THRESHOLD),
            },
            publish: PublishConfig {
                debounce: Duration::from_millis(debounce_ms),
                heartbeat: Duration::from_millis(heartbeat_ms),
            },
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match lookup(key).map(|raw| raw.trim().parse::<T>()) {
        Some(Ok(value)) => value,
        _ => default,
    }
}
