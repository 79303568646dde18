//! `hx-engine` — single-pass event-stream processor of the heat-exposure
//! engine.
//!
//! # Event loop
//!
//! ```text
//! for event in log:
//!   ① Order     — timestamps must be non-decreasing.
//!   ② Resolve   — link names through NetworkIndex (unknown is fatal);
//!                 agents and vehicles through the registries (lazy).
//!   ③ Dispatch  — activity / leg events     → AgentRegistry
//!                 vehicle occupancy + links → VehicleRegistry, credits
//!                                             forwarded to every occupant
//!                 stuckAndAbort             → abort, leave vehicle
//!   ④ Flush     — every flush_interval events, drain closed records
//!                 into an ExportBatch and hand it to the RecordSink.
//! end of log:
//!   close out every itinerary at the final time, emit agent rows, flush.
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`processor`] | `EventProcessor`, `RunSummary`                        |
//! | [`builder`]   | `ProcessorBuilder`                                    |
//! | [`sink`]      | `RecordSink` trait, `MemorySink`                      |
//! | [`observer`]  | `ProcessObserver` trait, `NoopObserver`, `LogObserver`|
//! | [`error`]     | `EngineError`, `EngineResult<T>`                      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use hx_engine::{MemorySink, NoopObserver, ProcessorBuilder};
//! use hx_events::EventReader;
//!
//! let processor = ProcessorBuilder::new(config, &network).routes(&routes).build()?;
//! let mut sink = MemorySink::new();
//! let summary = processor.run(EventReader::from_path(log)?, &mut sink, &mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod processor;
pub mod sink;


pub use builder::ProcessorBuilder;
pub use error::{EngineError, EngineResult};
pub use observer::{LogObserver, NoopObserver, ProcessObserver};
pub use processor::{EventProcessor, RunSummary};
pub use sink::{MemorySink, RecordSink};
