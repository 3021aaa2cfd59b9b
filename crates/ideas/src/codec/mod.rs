//! CSV and JSON import/export

pub mod export;
pub mod tokenizer;
pub mod upload;

pub use export::{export_ideas, template_csv};
pub use upload::{parse_upload, NewIdea, UploadFormat};
