//! Display colors handed to peers on connect.

#[cfg(test)]
#[path = "palette_test.rs"]
mod palette_test;

use rand::Rng;

/// Distinct, readable marker colors.
pub const PALETTE: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#bfef45", "#fabed4",
    "#469990", "#dcbeff",
];

/// Pick a random palette color, preferring ones nobody holds yet. Once every
/// color is taken, any color may repeat.
pub fn pick_color<R: Rng + ?Sized>(in_use: &[&str], rng: &mut R) -> &'static str {
    let free: Vec<&'static str> = PALETTE.iter().copied().filter(|c| !in_use.contains(c)).collect();
    let pool: &[&'static str] = if free.is_empty() { PALETTE } else { &free };
    pool[rng.random_range(0..pool.len())]
}
