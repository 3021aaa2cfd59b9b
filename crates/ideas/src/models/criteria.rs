use serde::{Deserialize, Serialize};

const DEFAULT_DESIRABILITY: &str = "Does this idea solve a real, significant problem for a clear \
  target audience? Is it something people would genuinely want or need?";
const DEFAULT_FEASIBILITY: &str = "Can this idea be built with current technology within a \
  reasonable timeframe and budget? What are the primary technical hurdles?";
const DEFAULT_VIABILITY: &str = "Is there a clear path to creating a sustainable business around \
  this idea? How would it generate revenue, and what is the potential market size?";

/// Wording handed to the AI evaluator for each criterion
///
/// There is exactly one live set of criteria; saving overwrites it in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCriteria {
  pub desirability: String,
  pub feasibility: String,
  pub viability: String,
}

impl Default for EvaluationCriteria {
  fn default() -> Self {
    Self {
      desirability: DEFAULT_DESIRABILITY.to_string(),
      feasibility: DEFAULT_FEASIBILITY.to_string(),
      viability: DEFAULT_VIABILITY.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_questions() {
    let criteria = EvaluationCriteria::default();
    for text in [&criteria.desirability, &criteria.feasibility, &criteria.viability] {
      assert!(text.ends_with('?'));
      assert!(!text.contains("  "));
    }
  }
}
