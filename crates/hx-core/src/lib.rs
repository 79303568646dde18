//! `hx-core` — foundational types for the heat-exposure event engine.
//!
//! This crate is a dependency of every other `hx-*` crate.  It has no `hx-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde` and `rustc-hash`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `VehicleId`, `LinkId`, `NodeId`, `ProfileId`, `Interner`, `Sequence` |
//! | [`geo`]         | `Point` (planar, projected metres)                        |
//! | [`time`]        | day constants, bucket arithmetic, `Hms` display           |
//! | [`mode`]        | `ModeRules` — virtual modes, interactions, main mode      |
//! | [`config`]      | `EngineConfig`                                            |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `serde`   | Adds `Serialize`/`Deserialize` to all public types.      |
//! | `fx-hash` | Uses FxHash for the string interners.                    |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod mode;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::EngineConfig;
pub use error::{CoreError, CoreResult};
pub use geo::Point;
pub use ids::{AgentId, Interner, LinkId, NodeId, ProfileId, Sequence, VehicleId};
pub use mode::ModeRules;
pub use time::{DAY_SECS, Hms};
