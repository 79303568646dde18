//! `hx-spatial` — temperature profiles, the link network, and routes.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`profile`] | `TemperatureProfile` (step-function integral)               |
//! | [`network`] | `NetworkIndex` (links + R-tree profile assignment), builder |
//! | [`route`]   | `RouteTable`, `Route`, `LinkSpan`                           |
//! | [`loader`]  | CSV loaders for nodes, links, profiles, routes              |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Forwards to `hx-core/serde`.                                 |

pub mod error;
pub mod loader;
pub mod network;
pub mod profile;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use loader::{NetworkFiles, load_network_csv, load_network_reader, load_routes_csv, load_routes_reader};
pub use network::{NetworkIndex, NetworkIndexBuilder};
pub use profile::TemperatureProfile;
pub use route::{LinkSpan, Route, RouteTable};
