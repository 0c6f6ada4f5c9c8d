//! # Heuristics
//!
//! A heuristic estimates the cost still needed to reach the goal from a state.
//! The search adds it to the accumulated cost to rank the frontier, nothing
//! more: an estimate that overshoots makes the returned plan possibly
//! suboptimal, never invalid.
//!
//! Every heuristic must return 0 for states that already satisfy the goal.
//! Dead ends are reported with [`UNREACHABLE`], which sorts such states
//! behind everything else.
//!
//! Closures with the right shape are heuristics too:
//!
//! ```
//! use craft_planner::{Heuristic, State, Vocabulary};
//!
//! let vocab = Vocabulary::new(["plank"]).unwrap();
//! let planks_short = |state: &State, _last: Option<&str>| 4u64.saturating_sub(state.get("plank").into());
//!
//! assert_eq!(planks_short.estimate(&State::zeroed(&vocab), None), 4);
//! ```

use crate::goal::Goal;
use crate::rule::{Cost, RuleSet};
use crate::state::{ItemId, Quantity, State, Vocabulary};
use crate::Result;

/// Estimate meaning "the goal cannot be reached from here".
pub const UNREACHABLE: Cost = Cost::MAX;

/// Cost-to-go estimator used to order the search frontier.
pub trait Heuristic: Send + Sync {
    /// Estimates the remaining cost from `state`, which was reached by firing
    /// `last_action` (`None` for the initial state).
    fn estimate(&self, state: &State, last_action: Option<&str>) -> Cost;
}

impl<F> Heuristic for F
where
    F: Fn(&State, Option<&str>) -> Cost + Send + Sync,
{
    fn estimate(&self, state: &State, last_action: Option<&str>) -> Cost {
        self(state, last_action)
    }
}

/// Always 0: turns best-first search into uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate(&self, _state: &State, _last_action: Option<&str>) -> Cost {
        0
    }
}

/// Largest "cheapest producer" cost among the goal items still missing.
///
/// Every missing item needs at least one firing of a rule that produces it,
/// so the estimate never exceeds the true remaining cost. An item no rule
/// produces makes the state a dead end.
#[derive(Debug, Clone)]
pub struct GoalDeficitHeuristic {
    goal: Goal,
    cheapest_producer: Vec<Option<Cost>>,
}

impl GoalDeficitHeuristic {
    pub fn new(goal: &Goal, rules: &RuleSet) -> Self {
        let mut cheapest_producer = vec![None; rules.vocabulary().len()];
        for rule in rules {
            for &(id, amount) in rule.produces() {
                let nets_positive = amount
                    > rule
                        .consumes()
                        .iter()
                        .find(|(consumed, _)| *consumed == id)
                        .map_or(0, |&(_, q)| q);
                if !nets_positive {
                    continue;
                }
                let slot: &mut Option<Cost> = &mut cheapest_producer[id.index()];
                *slot = Some(slot.map_or(rule.cost(), |c| c.min(rule.cost())));
            }
        }
        Self {
            goal: goal.clone(),
            cheapest_producer,
        }
    }
}

impl Heuristic for GoalDeficitHeuristic {
    fn estimate(&self, state: &State, _last_action: Option<&str>) -> Cost {
        self.goal
            .missing(state)
            .into_iter()
            .map(|(id, _)| self.cheapest_producer[id.index()].unwrap_or(UNREACHABLE))
            .max()
            .unwrap_or(0)
    }
}

/// Prunes states that hold more of an item than can ever be useful.
///
/// Crafting rule sets often have tools that are required but never consumed;
/// holding a second one is wasted effort. States above any configured cap are
/// treated as dead ends, everything else is estimated by the wrapped
/// heuristic. Goal states always estimate 0, caps or not.
pub struct ItemCapHeuristic<H> {
    inner: H,
    goal: Goal,
    caps: Vec<(ItemId, Quantity)>,
}

impl<H: Heuristic> ItemCapHeuristic<H> {
    /// Wraps `inner` with per-item caps.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::UnknownItem` if a capped item is not in the
    /// vocabulary.
    pub fn new<'a, I>(vocab: &Vocabulary, goal: &Goal, caps: I, inner: H) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Quantity)>,
    {
        let caps = caps
            .into_iter()
            .map(|(item, cap)| -> Result<(ItemId, Quantity)> {
                Ok((vocab.resolve(item, || "item caps".to_string())?, cap))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            inner,
            goal: goal.clone(),
            caps,
        })
    }

    fn exceeds_cap(&self, state: &State) -> bool {
        self.caps.iter().any(|&(id, cap)| state.quantity(id) > cap)
    }
}

impl<H: Heuristic> Heuristic for ItemCapHeuristic<H> {
    fn estimate(&self, state: &State, last_action: Option<&str>) -> Cost {
        if self.goal.is_satisfied(state) {
            return 0;
        }
        if self.exceeds_cap(state) {
            return UNREACHABLE;
        }
        self.inner.estimate(state, last_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::compile_goal;
    use crate::rule::{compile_rules, RuleSpec};
    use std::sync::Arc;

    fn setup() -> (Arc<Vocabulary>, RuleSet, Goal) {
        let vocab = Vocabulary::new(["wood", "plank", "bench", "wooden_pickaxe", "cobble"]).unwrap();
        let rules = compile_rules(
            &vocab,
            [
                RuleSpec::new("punch wood").produce("wood", 1).with_cost(4),
                RuleSpec::new("craft plank")
                    .consume("wood", 1)
                    .produce("plank", 4)
                    .with_cost(1),
                RuleSpec::new("craft bench")
                    .consume("plank", 4)
                    .produce("bench", 1)
                    .with_cost(1),
                RuleSpec::new("craft wooden_pickaxe at bench")
                    .require("bench", 1)
                    .consume("plank", 3)
                    .produce("wooden_pickaxe", 1)
                    .with_cost(1),
                RuleSpec::new("wooden_pickaxe for cobble")
                    .require("wooden_pickaxe", 1)
                    .produce("cobble", 1)
                    .with_cost(4),
            ],
        )
        .unwrap();
        let goal = compile_goal(&vocab, [("cobble", 1), ("plank", 1)]).unwrap();
        (vocab, rules, goal)
    }

    #[test]
    fn test_zero_heuristic() {
        let (vocab, _, _) = setup();
        assert_eq!(ZeroHeuristic.estimate(&State::zeroed(&vocab), None), 0);
    }

    #[test]
    fn test_goal_deficit_takes_largest_cheapest_producer() {
        let (vocab, rules, goal) = setup();
        let heuristic = GoalDeficitHeuristic::new(&goal, &rules);

        assert_eq!(heuristic.estimate(&State::zeroed(&vocab), None), 4);
        let has_cobble = State::from_quantities(&vocab, [("cobble", 1)]).unwrap();
        assert_eq!(heuristic.estimate(&has_cobble, Some("wooden_pickaxe for cobble")), 1);
        let done = State::from_quantities(&vocab, [("cobble", 1), ("plank", 2)]).unwrap();
        assert_eq!(heuristic.estimate(&done, None), 0);
    }

    #[test]
    fn test_goal_deficit_unproducible_item_is_dead_end() {
        let vocab = Vocabulary::new(["wood", "diamond"]).unwrap();
        let rules = compile_rules(
            &vocab,
            [RuleSpec::new("punch wood").produce("wood", 1).with_cost(4)],
        )
        .unwrap();
        let goal = compile_goal(&vocab, [("diamond", 1)]).unwrap();
        let heuristic = GoalDeficitHeuristic::new(&goal, &rules);
        assert_eq!(heuristic.estimate(&State::zeroed(&vocab), None), UNREACHABLE);
    }

    #[test]
    fn test_item_cap_marks_redundant_tools_as_dead_end() {
        let (vocab, _, goal) = setup();
        let heuristic =
            ItemCapHeuristic::new(&vocab, &goal, [("bench", 1), ("wooden_pickaxe", 1)], ZeroHeuristic)
                .unwrap();

        let one_bench = State::from_quantities(&vocab, [("bench", 1)]).unwrap();
        assert_eq!(heuristic.estimate(&one_bench, Some("craft bench")), 0);
        let two_benches = State::from_quantities(&vocab, [("bench", 2)]).unwrap();
        assert_eq!(heuristic.estimate(&two_benches, Some("craft bench")), UNREACHABLE);
    }

    #[test]
    fn test_item_cap_never_prunes_goal_states() {
        let (vocab, _, goal) = setup();
        let heuristic = ItemCapHeuristic::new(&vocab, &goal, [("plank", 0)], ZeroHeuristic).unwrap();
        let goal_state = State::from_quantities(&vocab, [("cobble", 1), ("plank", 8)]).unwrap();
        assert_eq!(heuristic.estimate(&goal_state, None), 0);
    }

    #[test]
    fn test_item_cap_unknown_item() {
        let (vocab, _, goal) = setup();
        let result = ItemCapHeuristic::new(&vocab, &goal, [("iron_axe", 1)], ZeroHeuristic);
        assert!(result.is_err());
    }

    #[test]
    fn test_closure_heuristic_sees_last_action() {
        let (vocab, _, _) = setup();
        let penalise_punching = |_: &State, last: Option<&str>| -> Cost {
            match last {
                Some("punch wood") => 10,
                _ => 0,
            }
        };
        let state = State::zeroed(&vocab);
        assert_eq!(penalise_punching.estimate(&state, Some("punch wood")), 10);
        assert_eq!(penalise_punching.estimate(&state, None), 0);
    }
}
