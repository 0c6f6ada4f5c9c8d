//! # Planner
//!
//! The planner bundles everything a search needs that stays fixed between
//! attempts: the compiled rules, the goal, the heuristic and the search
//! configuration. Each call to [`Planner::plan`] runs one independent,
//! time-bounded attempt from the given inventory.
//!
//! ```
//! use std::time::Duration;
//! use craft_planner::{compile_goal, compile_rules, Planner, RuleSpec, SearchConfig, State, Vocabulary};
//!
//! let vocab = Vocabulary::new(["wood", "plank", "bench"]).unwrap();
//! let rules = compile_rules(
//!     &vocab,
//!     [
//!         RuleSpec::new("punch for wood").produce("wood", 1).with_cost(4),
//!         RuleSpec::new("craft plank").consume("wood", 1).produce("plank", 4).with_cost(1),
//!         RuleSpec::new("craft bench").consume("plank", 4).produce("bench", 1).with_cost(1),
//!     ],
//! )
//! .unwrap();
//! let goal = compile_goal(&vocab, [("bench", 1)]).unwrap();
//!
//! let planner = Planner::new(rules, goal)
//!     .with_config(SearchConfig::default().with_time_limit(Duration::from_secs(2)));
//! let plan = planner.plan(&State::zeroed(&vocab)).into_plan().unwrap();
//!
//! assert_eq!(
//!     plan.actions().collect::<Vec<_>>(),
//!     vec!["punch for wood", "craft plank", "craft bench"]
//! );
//! assert_eq!(plan.total_cost(), 6);
//! ```

use crate::goal::Goal;
use crate::heuristic::{Heuristic, ZeroHeuristic};
use crate::rule::RuleSet;
use crate::search::{SearchConfig, SearchEngine, SearchOutcome};
use crate::state::State;

/// Finds cheapest rule sequences from an inventory to a goal.
///
/// Uses [`ZeroHeuristic`] unless another heuristic is configured, so out of
/// the box it performs uniform-cost search and returns optimal plans.
pub struct Planner {
    rules: RuleSet,
    goal: Goal,
    heuristic: Box<dyn Heuristic>,
    config: SearchConfig,
}

impl Planner {
    pub fn new(rules: RuleSet, goal: Goal) -> Self {
        Self {
            rules,
            goal,
            heuristic: Box::new(ZeroHeuristic),
            config: SearchConfig::default(),
        }
    }

    /// Replaces the heuristic used to order the frontier.
    ///
    /// Admissibility is up to the caller: an overestimating heuristic can
    /// speed the search up at the price of optimality.
    pub fn with_heuristic(mut self, heuristic: Box<dyn Heuristic>) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs one search attempt from `initial`.
    ///
    /// Never fails: a search that does not reach the goal in time returns
    /// [`SearchOutcome::TimedOut`], and the caller may retry with a larger
    /// budget.
    pub fn plan(&self, initial: &State) -> SearchOutcome {
        SearchEngine::new(
            &self.rules,
            &self.goal,
            self.heuristic.as_ref(),
            self.config.time_limit,
        )
        .run(initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::compile_goal;
    use crate::heuristic::GoalDeficitHeuristic;
    use crate::rule::{compile_rules, RuleSpec};
    use crate::state::Vocabulary;
    use std::time::Duration;

    fn planner() -> (Planner, State) {
        let vocab = Vocabulary::new(["start", "middle", "goal"]).unwrap();
        let rules = compile_rules(
            &vocab,
            [
                RuleSpec::new("action1")
                    .require("start", 1)
                    .produce("middle", 1)
                    .with_cost(1),
                RuleSpec::new("action2")
                    .consume("middle", 1)
                    .produce("goal", 1)
                    .with_cost(1),
            ],
        )
        .unwrap();
        let goal = compile_goal(&vocab, [("goal", 1)]).unwrap();
        let initial = State::from_quantities(&vocab, [("start", 1)]).unwrap();
        (Planner::new(rules, goal), initial)
    }

    #[test]
    fn test_default_config() {
        let (planner, _) = planner();
        assert_eq!(planner.config().time_limit, SearchConfig::DEFAULT_TIME_LIMIT);
        assert_eq!(planner.rules().len(), 2);
    }

    #[test]
    fn test_multi_step_plan() {
        let (planner, initial) = planner();
        let plan = planner.plan(&initial).into_plan().unwrap();
        assert_eq!(plan.actions().collect::<Vec<_>>(), vec!["action1", "action2"]);
        assert_eq!(plan.total_cost(), 2);
    }

    #[test]
    fn test_plan_with_custom_heuristic() {
        let (planner, initial) = planner();
        let heuristic = GoalDeficitHeuristic::new(planner.goal(), planner.rules());
        let planner = planner.with_heuristic(Box::new(heuristic));
        let plan = planner.plan(&initial).into_plan().unwrap();
        assert_eq!(plan.total_cost(), 2);
    }

    #[test]
    fn test_plans_are_independent() {
        let (planner, initial) = planner();
        let planner = planner.with_config(SearchConfig::default().with_time_limit(Duration::from_secs(1)));
        let blocked = State::zeroed(initial.vocabulary());

        assert!(!planner.plan(&blocked).is_found());
        assert!(planner.plan(&initial).is_found());
    }
}
