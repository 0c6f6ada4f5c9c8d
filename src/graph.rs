//! Lazy successor generation over the implicit `State × Rules` graph.

use crate::rule::{Cost, Rule, RuleSet};
use crate::state::State;

/// One edge out of a state: the rule fired, where it leads, and what it costs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<'r> {
    pub rule: &'r Rule,
    pub state: State,
    pub cost: Cost,
}

impl Transition<'_> {
    pub fn action(&self) -> &str {
        self.rule.name()
    }
}

/// Yields a transition for every rule applicable in `state`, in rule
/// declaration order.
///
/// Effects are only applied to rules whose precondition holds, so the
/// resulting states never carry a negative quantity. Firings that would push
/// a quantity past `Quantity::MAX` are skipped. Each call starts over;
/// calling it twice on the same state yields the same sequence.
pub fn expand<'r, 's>(rules: &'r RuleSet, state: &'s State) -> impl Iterator<Item = Transition<'r>> + 's
where
    'r: 's,
{
    rules
        .iter()
        .filter(move |rule| rule.is_applicable(state))
        .filter_map(move |rule| match rule.try_apply(state) {
            Some(next) => Some(Transition {
                rule,
                state: next,
                cost: rule.cost(),
            }),
            None => {
                log::trace!("Skipping '{}' from {}: quantity overflow", rule.name(), state);
                None
            }
        })
}
