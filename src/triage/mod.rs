pub mod confidence;
pub mod engine;
pub mod ensemble;
pub mod features;
pub mod learned;
pub mod predictors;
pub mod recommendations;
pub mod registry;
pub mod risks;
pub mod trees;
pub mod types;
pub mod urgency;

pub use engine::TriageEngine;
pub use ensemble::{agreement, EnsembleReport};
pub use features::{extract, FeatureSet};
pub use learned::{
    ConfidenceValidator, HttpConfidenceValidator, HttpModelPredictor, LearnedModels,
    MockConfidenceValidator, MockLearnedPredictor,
};
pub use predictors::{class_table, rule_predictor, SpecialistClass};
pub use registry::RiskModifierRegistry;
pub use trees::{
    ChestPainBucket, DecisionTree, MentalHealthBucket, RespiratoryBucket, TreeEvaluation,
    TreeOutcome, GENERAL_EVALUATION,
};
pub use types::*;
