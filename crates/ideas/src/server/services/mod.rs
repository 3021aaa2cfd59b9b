pub mod analyst;
pub mod gemini;
pub mod prompts;

pub use analyst::{AnalystError, ExistingCluster, IdeaAnalyst, IdeaBrief, PromptAnalyst, TextModel};
pub use gemini::GeminiModel;
