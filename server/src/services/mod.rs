//! Relay services used by the websocket route.
//!
//! Route handlers stay focused on socket plumbing and frame encoding; client
//! bookkeeping and fan-out live here.

pub mod palette;
pub mod relay;
