//! # Rules
//!
//! A rule is a named transformation over inventories: it is applicable when
//! the state holds enough of every required and consumed item, it subtracts
//! what it consumes, adds what it produces, and always takes the same time.
//!
//! Rules start life as a declarative [`RuleSpec`] and are compiled once,
//! against a [`Vocabulary`], into an immutable [`Rule`]. Compilation resolves
//! item names to ids and folds consumption and production into a single delta
//! so the checks that run during search never touch strings.
//!
//! ```
//! use craft_planner::{compile_rules, RuleSpec, State, Vocabulary};
//!
//! let vocab = Vocabulary::new(["bench", "wood", "plank"]).unwrap();
//! let rules = compile_rules(
//!     &vocab,
//!     [RuleSpec::new("craft plank at bench")
//!         .require("bench", 1)
//!         .consume("wood", 1)
//!         .produce("plank", 4)
//!         .with_cost(1)],
//! )
//! .unwrap();
//!
//! let rule = rules.get("craft plank at bench").unwrap();
//! let state = State::from_quantities(&vocab, [("bench", 1), ("wood", 1)]).unwrap();
//! assert!(rule.is_applicable(&state));
//!
//! let next = rule.apply(&state);
//! assert_eq!(next.get("bench"), 1);
//! assert_eq!(next.get("wood"), 0);
//! assert_eq!(next.get("plank"), 4);
//! ```

use crate::state::{ItemId, Quantity, State, Vocabulary};
use crate::{PlannerError, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// Time units spent by a rule or a whole plan.
pub type Cost = u64;

/// Declarative description of a rule, as read from a rules file.
///
/// `produces` and `cost` are mandatory; compiling a spec without them fails
/// with `PlannerError::MissingField`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSpec {
    pub name: String,
    /// Items that must be held but are not used up (tools, stations)
    pub requires: Vec<(String, Quantity)>,
    /// Items that must be held and are used up
    pub consumes: Vec<(String, Quantity)>,
    pub produces: Option<Vec<(String, Quantity)>>,
    pub cost: Option<Cost>,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn require(mut self, item: impl Into<String>, quantity: Quantity) -> Self {
        self.requires.push((item.into(), quantity));
        self
    }

    pub fn consume(mut self, item: impl Into<String>, quantity: Quantity) -> Self {
        self.consumes.push((item.into(), quantity));
        self
    }

    pub fn produce(mut self, item: impl Into<String>, quantity: Quantity) -> Self {
        self.produces
            .get_or_insert_with(Vec::new)
            .push((item.into(), quantity));
        self
    }

    pub fn with_cost(mut self, cost: Cost) -> Self {
        self.cost = Some(cost);
        self
    }
}

/// A compiled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: Arc<str>,
    precondition: Vec<(ItemId, Quantity)>,
    consumes: Vec<(ItemId, Quantity)>,
    produces: Vec<(ItemId, Quantity)>,
    delta: Vec<(ItemId, i64)>,
    cost: Cost,
}

impl Rule {
    /// Compiles a single rule spec against a vocabulary.
    ///
    /// The precondition covers every item in `requires` and `consumes`; an
    /// item listed in both must be held in the larger of the two amounts.
    ///
    /// # Errors
    ///
    /// * `PlannerError::MissingField` if `produces` or `cost` is absent
    /// * `PlannerError::UnknownItem` if an item is not in the vocabulary
    pub fn compile(vocab: &Vocabulary, spec: &RuleSpec) -> Result<Self> {
        let produces = spec.produces.as_deref().ok_or_else(|| PlannerError::MissingField {
            rule: spec.name.clone(),
            field: "Produces",
        })?;
        let cost = spec.cost.ok_or_else(|| PlannerError::MissingField {
            rule: spec.name.clone(),
            field: "Time",
        })?;

        let resolve = |entries: &[(String, Quantity)]| -> Result<Vec<(ItemId, Quantity)>> {
            entries
                .iter()
                .map(|(item, quantity)| -> Result<(ItemId, Quantity)> {
                    let id = vocab.resolve(item, || format!("rule '{}'", spec.name))?;
                    Ok((id, *quantity))
                })
                .collect()
        };
        let requires = resolve(spec.requires.as_slice())?;
        let consumes = resolve(spec.consumes.as_slice())?;
        let produces = resolve(produces)?;

        Ok(Self {
            name: Arc::from(spec.name.as_str()),
            precondition: merge_max(requires.iter().chain(consumes.iter())),
            delta: net_delta(&consumes, &produces),
            consumes,
            produces,
            cost,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the rule name, cheap to store per search node.
    pub fn name_handle(&self) -> &Arc<str> {
        &self.name
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Minimum holdings needed before the rule can fire.
    pub fn precondition(&self) -> &[(ItemId, Quantity)] {
        &self.precondition
    }

    pub fn consumes(&self) -> &[(ItemId, Quantity)] {
        &self.consumes
    }

    pub fn produces(&self) -> &[(ItemId, Quantity)] {
        &self.produces
    }

    /// True iff `state` holds at least the needed amount of every
    /// precondition item. Rules with no precondition always apply.
    pub fn is_applicable(&self, state: &State) -> bool {
        self.precondition
            .iter()
            .all(|&(id, needed)| state.quantity(id) >= needed)
    }

    /// Returns the state after firing this rule on `state`.
    ///
    /// Only valid when [`is_applicable`](Self::is_applicable) holds.
    ///
    /// # Panics
    ///
    /// Panics if consuming would drive a quantity below zero, or producing
    /// would push one past [`Quantity::MAX`].
    pub fn apply(&self, state: &State) -> State {
        debug_assert!(
            self.is_applicable(state),
            "rule '{}' applied to a state failing its precondition: {}",
            self.name,
            state
        );
        state.with_delta(&self.delta)
    }

    /// Like [`apply`](Self::apply), but returns `None` when the result would
    /// leave a quantity out of range.
    pub fn try_apply(&self, state: &State) -> Option<State> {
        state.checked_with_delta(&self.delta)
    }
}

/// Per-item maximum over the entries, keeping first-seen order.
fn merge_max<'a>(entries: impl Iterator<Item = &'a (ItemId, Quantity)>) -> Vec<(ItemId, Quantity)> {
    let mut merged: Vec<(ItemId, Quantity)> = Vec::new();
    for &(id, quantity) in entries {
        match merged.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, held)) => *held = (*held).max(quantity),
            None => merged.push((id, quantity)),
        }
    }
    merged
}

/// Production minus consumption per item, dropping items that net to zero.
fn net_delta(consumes: &[(ItemId, Quantity)], produces: &[(ItemId, Quantity)]) -> Vec<(ItemId, i64)> {
    let mut delta: Vec<(ItemId, i64)> = Vec::new();
    let signed = consumes
        .iter()
        .map(|&(id, q)| (id, -i64::from(q)))
        .chain(produces.iter().map(|&(id, q)| (id, i64::from(q))));
    for (id, change) in signed {
        match delta.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, total)) => *total += change,
            None => delta.push((id, change)),
        }
    }
    delta.retain(|&(_, change)| change != 0);
    delta
}

/// The compiled rules of one problem, in declaration order.
///
/// Cloning is cheap; the rules themselves are shared.
#[derive(Debug, Clone)]
pub struct RuleSet {
    vocab: Arc<Vocabulary>,
    rules: Arc<[Rule]>,
}

impl RuleSet {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compiles every rule spec into a [`RuleSet`], keeping declaration order.
///
/// # Errors
///
/// Fails on the first malformed rule, and with `PlannerError::DuplicateRule`
/// if two specs share a name.
pub fn compile_rules<I>(vocab: &Arc<Vocabulary>, specs: I) -> Result<RuleSet>
where
    I: IntoIterator<Item = RuleSpec>,
{
    let mut seen = HashSet::new();
    let mut rules = Vec::new();
    for spec in specs {
        if !seen.insert(spec.name.clone()) {
            return Err(PlannerError::DuplicateRule(spec.name));
        }
        rules.push(Rule::compile(vocab, &spec)?);
    }
    log::debug!("Compiled {} rules over {} items", rules.len(), vocab.len());
    Ok(RuleSet {
        vocab: Arc::clone(vocab),
        rules: rules.into(),
    })
}
