//! # Reasoner Configuration
//!
//! Every tunable of the memory in one serde structure. Field names follow
//! the camelCase option names (`conceptCapacity`, `randomSeed`, ...); any
//! field missing from a config file takes its default.

use crate::MindError;
use crate::bag::Sampling;
use crate::primitives::{
    DEFAULT_CONCEPT_CAPACITY, DEFAULT_CONCEPT_LEVELS, DEFAULT_DURATION, DEFAULT_SUBCONCEPT_CAPACITY,
    DEFAULT_TASK_LINK_CAPACITY, DEFAULT_TASK_LINK_LEVELS, DEFAULT_TERM_LINK_CAPACITY,
    DEFAULT_TERM_LINK_LEVELS, FORGET_QUALITY_RELATIVE, MAX_REASONING_LEVEL,
};
use serde::{Deserialize, Serialize};

/// Forgetting rates, in durations, per kind of container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForgetDurations {
    pub concept: f32,
    pub task_link: f32,
    pub term_link: f32,
}

impl Default for ForgetDurations {
    fn default() -> Self {
        Self {
            concept: 2.0,
            task_link: 4.0,
            term_link: 10.0,
        }
    }
}

/// Configuration of a [`Reasoner`](crate::reasoner::Reasoner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReasonerConfig {
    pub concept_capacity: usize,
    pub concept_levels: usize,
    /// Displaced-concept cache size; 0 discards displaced concepts.
    pub subconcept_capacity: usize,
    pub task_link_capacity: usize,
    pub task_link_levels: usize,
    pub term_link_capacity: usize,
    pub term_link_levels: usize,

    pub min_task_links_fired: usize,
    pub max_task_links_fired: usize,
    pub min_term_links_fired: usize,
    pub max_term_links_fired: usize,
    pub concepts_fired_per_cycle: usize,
    /// External inputs ingested at the start of each cycle.
    pub inputs_per_cycle: usize,

    /// Cycles per duration.
    pub duration: u32,
    pub forget_durations: ForgetDurations,
    /// Fraction of quality below which forgetting stops.
    pub forget_quality_relative: f32,

    /// Tasks whose budget summary falls below this are rejected.
    pub activation_budget_threshold: f32,
    /// Tasks whose terms need a higher level are rejected.
    pub reasoning_level: u8,

    pub concept_beliefs_max: usize,
    pub concept_questions_max: usize,
    pub concept_goals_max: usize,

    pub sampling: Sampling,
    pub random_seed: u64,
    /// Background threads for fire-and-forget jobs; 0 runs none.
    pub worker_threads: usize,
    /// Return derivation errors from `cycle()` instead of reporting them.
    pub escalate_derivation_errors: bool,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            concept_capacity: DEFAULT_CONCEPT_CAPACITY,
            concept_levels: DEFAULT_CONCEPT_LEVELS,
            subconcept_capacity: DEFAULT_SUBCONCEPT_CAPACITY,
            task_link_capacity: DEFAULT_TASK_LINK_CAPACITY,
            task_link_levels: DEFAULT_TASK_LINK_LEVELS,
            term_link_capacity: DEFAULT_TERM_LINK_CAPACITY,
            term_link_levels: DEFAULT_TERM_LINK_LEVELS,
            min_task_links_fired: 1,
            max_task_links_fired: 2,
            min_term_links_fired: 1,
            max_term_links_fired: 4,
            concepts_fired_per_cycle: 1,
            inputs_per_cycle: 1,
            duration: DEFAULT_DURATION,
            forget_durations: ForgetDurations::default(),
            forget_quality_relative: FORGET_QUALITY_RELATIVE,
            activation_budget_threshold: 0.01,
            reasoning_level: MAX_REASONING_LEVEL,
            concept_beliefs_max: 15,
            concept_questions_max: 7,
            concept_goals_max: 9,
            sampling: Sampling::MassWeighted,
            random_seed: 1,
            worker_threads: 1,
            escalate_derivation_errors: false,
        }
    }
}

impl ReasonerConfig {
    /// Small preset for tests and demos.
    #[must_use]
    pub fn micro() -> Self {
        Self {
            concept_capacity: 128,
            concept_levels: 8,
            subconcept_capacity: 16,
            task_link_capacity: 16,
            task_link_levels: 4,
            term_link_capacity: 16,
            term_link_levels: 4,
            concept_beliefs_max: 5,
            concept_questions_max: 2,
            concept_goals_max: 3,
            ..Self::default()
        }
    }

    /// Cycles over which a container kind halves its excess priority.
    #[must_use]
    pub fn forget_cycles(&self, durations: f32) -> f32 {
        durations * self.duration as f32
    }

    /// Check that the configuration can build a working memory.
    pub fn validate(&self) -> Result<(), MindError> {
        let positive = [
            ("conceptCapacity", self.concept_capacity),
            ("conceptLevels", self.concept_levels),
            ("taskLinkCapacity", self.task_link_capacity),
            ("taskLinkLevels", self.task_link_levels),
            ("termLinkCapacity", self.term_link_capacity),
            ("termLinkLevels", self.term_link_levels),
            ("conceptBeliefsMax", self.concept_beliefs_max),
            ("conceptQuestionsMax", self.concept_questions_max),
            ("conceptGoalsMax", self.concept_goals_max),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(MindError::Config(format!("{name} must be positive")));
            }
        }

        if self.min_task_links_fired > self.max_task_links_fired {
            return Err(MindError::Config(
                "minTaskLinksFired exceeds maxTaskLinksFired".into(),
            ));
        }
        if self.min_term_links_fired > self.max_term_links_fired {
            return Err(MindError::Config(
                "minTermLinksFired exceeds maxTermLinksFired".into(),
            ));
        }

        let unit = [
            ("activationBudgetThreshold", self.activation_budget_threshold),
            ("forgetQualityRelative", self.forget_quality_relative),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(MindError::Config(format!("{name} must be within [0, 1]")));
            }
        }

        let ForgetDurations {
            concept,
            task_link,
            term_link,
        } = self.forget_durations;
        if [concept, task_link, term_link]
            .iter()
            .any(|d| !d.is_finite() || *d < 0.0)
        {
            return Err(MindError::Config(
                "forgetDurations must be finite and non-negative".into(),
            ));
        }

        if self.reasoning_level == 0 || self.reasoning_level > MAX_REASONING_LEVEL {
            return Err(MindError::Config(format!(
                "reasoningLevel must be within 1..={MAX_REASONING_LEVEL}"
            )));
        }
        Ok(())
    }
}
