//! Collaborative synchronization core for trajectory authoring sessions.
//!
//! Every connected peer keeps its own copy of the shared trajectories and a
//! shadow copy of each remote peer's animated objects. The relay only fans
//! named frames out to other peers, so all agreement is reached here: incoming
//! snapshots are reconciled into local state, remote motion is blended rather
//! than snapped, and local edits are published as debounced snapshots plus a
//! fixed-rate heartbeat.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Trajectory, animated object and slot-array types |
//! | [`codec`] | Snapshot encode/decode with per-field fallbacks |
//! | [`reconcile`] | Applies trajectory snapshots to the local collection |
//! | [`lifecycle`] | Creates/destroys/blends shadow objects per remote slot |
//! | [`blend`] | Two-regime exponential smoothing of remote motion |
//! | [`animate`] | Local per-tick advance along a trajectory |
//! | [`registry`] | Known remote peers, their colors and shadow arrays |
//! | [`publisher`] | Debounced structural publish, heartbeat, echo guard |
//! | [`command`] | Tagged local edit commands |
//! | [`session`] | Owned [`session::SessionState`] wiring it all together |
//! | [`scene`] | Seam to the renderer's visual handles |
//! | [`config`] | Environment-driven tuning parameters |
//! | [`consts`] | Shared numeric defaults |

pub mod animate;
pub mod blend;
pub mod codec;
pub mod command;
pub mod config;
pub mod consts;
pub mod lifecycle;
pub mod model;
pub mod publisher;
pub mod reconcile;
pub mod registry;
pub mod scene;
pub mod session;

pub use config::SyncConfig;
pub use model::{AnimatedObject, Direction, Point3, Slots, Trajectory};
pub use scene::{HeadlessScene, Scene};
pub use session::SessionState;
