pub mod chunker;
pub mod diagnostics_writer;
pub mod exporter;
pub mod extractor;
pub mod qa_generator;
pub mod qa_structurer;
pub mod stats;

pub use chunker::TextChunker;
pub use diagnostics_writer::DiagnosticsWriter;
pub use extractor::{extract_records, Extraction};
pub use qa_generator::QaGenerator;
pub use qa_structurer::QaStructurer;
pub use stats::{QuestionType, RunStats};
