pub mod cluster;
pub mod criteria;
pub mod idea;

pub use cluster::{ClusterConfig, IdeaCluster, SingleClusterSuggestion, SuggestionType};
pub use criteria::EvaluationCriteria;
pub use idea::{AiActivity, CriterionScore, Idea, IdeaEvaluation, IdeaStatus};
