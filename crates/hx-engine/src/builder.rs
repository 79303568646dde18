//! Fluent builder for constructing an [`EventProcessor`].

use hx_core::EngineConfig;
use hx_spatial::{NetworkIndex, RouteTable};

use crate::{EngineResult, EventProcessor};

/// Fluent builder for [`EventProcessor`].
///
/// # Required inputs
///
/// - [`EngineConfig`] — run start/end, flush interval, mode rules, cabin
///   temperatures
/// - [`NetworkIndex`] — links and their temperature profiles, borrowed for
///   the whole run
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                        |
/// |-----------------|------------------------------------------------|
/// | `.routes(t)`    | Empty table: every routed sub-leg falls back   |
///
/// # Example
///
/// ```rust,ignore
/// let processor = ProcessorBuilder::new(config, &network)
///     .routes(&routes)
///     .build()?;
/// let summary = processor.run(EventReader::from_path(path)?, &mut sink, &mut NoopObserver)?;
/// ```
pub struct ProcessorBuilder<'a> {
    config:  EngineConfig,
    network: &'a NetworkIndex,
    routes:  Option<&'a RouteTable>,
}

impl<'a> ProcessorBuilder<'a> {
    pub fn new(config: EngineConfig, network: &'a NetworkIndex) -> Self {
        Self { config, network, routes: None }
    }

    /// Supply the pre-computed routes used to apportion un-simulated legs.
    pub fn routes(mut self, routes: &'a RouteTable) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Validate the configuration and return a ready-to-run processor.
    pub fn build(self) -> EngineResult<EventProcessor<'a>> {
        self.config.validate()?;
        Ok(EventProcessor::new(self.config, self.network, self.routes))
    }
}
