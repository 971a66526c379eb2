mod errors;
mod export_engine;

pub use errors::ExportError;
pub use export_engine::{ExportEngine, DEFAULT_ACCOUNT_PREFIX};
