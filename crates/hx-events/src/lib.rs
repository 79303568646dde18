//! `hx-events` — the simulator event log.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`event`]  | `Event` — one variant per interpreted event type           |
//! | [`reader`] | `EventReader` — streaming CSV decoder (`Iterator<Item = EventResult<Event>>`) |
//! | [`error`]  | `EventError`, `EventResult<T>`                             |
//!
//! The reader only decodes rows.  Ordering, link resolution, and every
//! state transition are the engine's job.

pub mod error;
pub mod event;
pub mod reader;

#[cfg(test)]
mod tests;

pub use error::{EventError, EventResult};
pub use event::Event;
pub use reader::EventReader;
