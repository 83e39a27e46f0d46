//! A configured replay, from config file to finished run

use tracing::info;

use crate::event::Revision;
use crate::rewrite::{build_chain, BuildContext, EventRewriter};
use crate::schema::{SchemaLoader, SchemaRegistry, TypeRegistry};
use crate::store::{DestinationStore, JsonlStore, MemoryStore, SourceStore};

use super::config::ReplayConfig;
use super::driver::{ReplayDriver, ReplayOptions, ReplayStats};
use super::errors::ReplayResult;
use super::translate::IdentityTranslator;

/// Configuration plus the schemas it references, loaded once.
pub struct ReplaySession {
    config: ReplayConfig,
    source_registry: Option<SchemaRegistry>,
    destination_registry: SchemaRegistry,
}

impl ReplaySession {
    /// Loads the schemas named by `config`.
    pub fn prepare(config: ReplayConfig) -> ReplayResult<Self> {
        let source_registry = match &config.source_schema {
            Some(path) => Some(SchemaLoader::load_file(path)?),
            None => None,
        };
        let destination_registry = SchemaLoader::load_file(&config.destination_schema)?;
        Ok(Self::with_registries(config, source_registry, destination_registry))
    }

    pub fn with_registries(
        config: ReplayConfig,
        source_registry: Option<SchemaRegistry>,
        destination_registry: SchemaRegistry,
    ) -> Self {
        Self {
            config,
            source_registry,
            destination_registry,
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Revision the first written change-set will carry, given the
    /// destination's last revision.
    pub fn first_output_revision(&self, destination_last: Revision) -> Revision {
        if self.config.adopt_destination {
            destination_last + 1
        } else {
            self.config.start_revision
        }
    }

    /// Builds the configured rewriter chain. Fails on any configuration error.
    pub fn build_pipeline(&self, first_output_revision: Revision) -> ReplayResult<Box<dyn EventRewriter>> {
        let registry = self.source_registry.as_ref().map(|r| r as &dyn TypeRegistry);
        let ctx = BuildContext::new(registry).with_revisions(self.config.start_revision, first_output_revision);
        Ok(build_chain(&self.config.rewriters, &ctx)?)
    }

    pub fn translator(&self) -> IdentityTranslator {
        IdentityTranslator::new(&self.destination_registry, self.config.unknown_types)
    }

    fn options(&self) -> ReplayOptions {
        ReplayOptions {
            start_revision: self.config.start_revision,
            stop_revision: self.config.stop_revision,
            large_change_set_threshold: self.config.large_change_set_threshold,
            progress_interval: self.config.progress_interval,
        }
    }

    /// Replays between arbitrary stores.
    pub fn run_with(
        &self,
        source: &dyn SourceStore,
        destination: &mut dyn DestinationStore,
        destination_last: Revision,
    ) -> ReplayResult<ReplayStats> {
        let mut pipeline = self.build_pipeline(self.first_output_revision(destination_last))?;
        let mut translator = self.translator();
        ReplayDriver::new(self.options()).run(source, destination, pipeline.as_mut(), &mut translator)
    }

    /// Replays between the configured file stores. A dry run writes into
    /// memory and leaves the destination file untouched.
    pub fn execute(&self, dry_run: bool) -> ReplayResult<ReplayStats> {
        let source = JsonlStore::open_existing(&self.config.source)?;
        if dry_run {
            let destination_last = if self.config.destination.is_file() {
                JsonlStore::open_existing(&self.config.destination)?.last_revision()?
            } else {
                0
            };
            info!(destination_last, "Dry run, nothing is written");
            let mut destination = MemoryStore::new();
            return self.run_with(&source, &mut destination, destination_last);
        }

        let mut destination = JsonlStore::open(&self.config.destination)?;
        let destination_last = destination.last_revision()?;
        self.run_with(&source, &mut destination, destination_last)
    }
}
