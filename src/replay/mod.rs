//! Replay of a source history into a destination store
//!
//! - [`ReplayConfig`]: the JSON description of a run
//! - [`ReplaySession`]: config plus loaded schemas; builds the pipeline
//! - [`ReplayDriver`]: the read → rewrite → write loop
//! - [`IdentityTranslator`]: the mandatory last stage checking every type
//!   against the destination schema

mod config;
mod driver;
mod errors;
mod session;
mod translate;

pub use config::ReplayConfig;
pub use driver::{ReplayDriver, ReplayOptions, ReplayStats};
pub use errors::{ReplayError, ReplayResult};
pub use session::ReplaySession;
pub use translate::{IdentityTranslator, UnknownTypePolicy};
