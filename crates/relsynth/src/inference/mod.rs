//! Column type inference for entity variables.

mod statistical;
mod variable;

pub use statistical::{StatisticalAnalysis, StatisticalAnalyzer};
pub use variable::VariableTyper;
