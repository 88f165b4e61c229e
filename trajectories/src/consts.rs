//! Shared numeric defaults for the sync core.

// ── Publishing ──────────────────────────────────────────────────

/// Trailing debounce window for structural snapshots, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Heartbeat period for local object values, in milliseconds.
pub const DEFAULT_HEARTBEAT_MS: u64 = 100;

// ── Blending ────────────────────────────────────────────────────

/// Exponential smoothing factor applied to remote speed.
pub const DEFAULT_SPEED_ALPHA: f64 = 0.1;

/// Position smoothing factor while a remote object animates smoothly.
pub const DEFAULT_POSITION_ALPHA_SLOW: f64 = 0.1;

/// Position smoothing factor for seeks, wraparounds and idle objects.
pub const DEFAULT_POSITION_ALPHA_FAST: f64 = 0.9;

/// Normalized position jump above which the fast factor is used.
pub const DEFAULT_JUMP_THRESHOLD: f64 = 0.5;

// ── Model ───────────────────────────────────────────────────────

/// Spline tension given to trajectories that arrive without one.
pub const DEFAULT_TENSION: f64 = 0.5;

/// Fallback display color for trajectories, objects and peers.
pub const DEFAULT_COLOR: &str = "#888888";

/// Minimum control points a trajectory keeps under local point removal.
pub const MIN_TRAJECTORY_POINTS: usize = 2;

/// Largest representable position strictly below 1.0.
pub const POSITION_MAX: f64 = 1.0 - f64::EPSILON;
