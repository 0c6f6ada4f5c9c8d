//! # Goals
//!
//! A goal is a lower bound on some items: a state satisfies it when it holds
//! at least the required amount of every listed item. Items the goal does not
//! mention are unconstrained, so holding more of anything never un-satisfies
//! a goal.

use crate::state::{ItemId, Quantity, State, Vocabulary};
use crate::Result;

/// Compiled goal predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    requirements: Vec<(ItemId, Quantity)>,
}

impl Goal {
    /// The `(item, minimum)` pairs the goal checks, in the order given.
    pub fn requirements(&self) -> &[(ItemId, Quantity)] {
        &self.requirements
    }

    /// True iff `state` holds at least the required amount of every item.
    pub fn is_satisfied(&self, state: &State) -> bool {
        self.requirements
            .iter()
            .all(|&(id, needed)| state.quantity(id) >= needed)
    }

    /// Items still short of the goal, with how many more units each needs.
    pub fn missing(&self, state: &State) -> Vec<(ItemId, Quantity)> {
        self.requirements
            .iter()
            .filter_map(|&(id, needed)| {
                let shortfall = needed.saturating_sub(state.quantity(id));
                (shortfall > 0).then_some((id, shortfall))
            })
            .collect()
    }
}

/// Compiles a goal mapping of `(item, minimum quantity)` pairs.
///
/// Repeated items keep the largest minimum.
///
/// # Errors
///
/// Returns `PlannerError::UnknownItem` for an item outside the vocabulary.
pub fn compile_goal<'a, I>(vocab: &Vocabulary, goal: I) -> Result<Goal>
where
    I: IntoIterator<Item = (&'a str, Quantity)>,
{
    let mut requirements: Vec<(ItemId, Quantity)> = Vec::new();
    for (item, needed) in goal {
        let id = vocab.resolve(item, || "goal".to_string())?;
        match requirements.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, held)) => *held = (*held).max(needed),
            None => requirements.push((id, needed)),
        }
    }
    log::debug!("Compiled goal with {} requirements", requirements.len());
    Ok(Goal { requirements })
}
