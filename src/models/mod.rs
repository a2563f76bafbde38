pub mod chunk;
pub mod document;
pub mod loaders;
pub mod qa;
pub mod run_config;

pub use chunk::Chunk;
pub use document::SourceDocument;
pub use loaders::{DocumentLoader, LoaderRegistry};
pub use qa::{QaRecord, RawQaResponse};
pub use run_config::{PromptTemplates, RunConfiguration, StageSettings};
