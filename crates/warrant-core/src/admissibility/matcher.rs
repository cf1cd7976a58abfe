//! Ground matching: which grounds a statement may draw on.

use crate::types::{Ground, GroundSet, Modality, Scope, Statement};

/// Selects relevant grounds by modality scope.
///
/// Descriptive claims only see factual grounds. Assertive and conditional
/// claims see factual and contextual grounds. Refusals make no claim, so
/// nothing is relevant to them, and a statement without a detected
/// modality matches nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct GroundMatcher;

impl GroundMatcher {
    pub fn relevant(&self, statement: &Statement, grounds: &[Ground]) -> GroundSet {
        let relevant = grounds
            .iter()
            .filter(|ground| self.is_relevant(statement, ground))
            .cloned()
            .collect();
        GroundSet { grounds: relevant }
    }

    fn is_relevant(&self, statement: &Statement, ground: &Ground) -> bool {
        match statement.modality {
            Some(Modality::Descriptive) => ground.scope == Scope::Factual,
            Some(Modality::Assertive) | Some(Modality::Conditional) => {
                matches!(ground.scope, Scope::Factual | Scope::Contextual)
            }
            Some(Modality::Refusal) | None => false,
        }
    }
}
