//! # Inventory State
//!
//! A [`State`] is one complete snapshot of item quantities during a plan. The
//! search keys its bookkeeping maps on states, so equality, ordering and
//! hashing are all defined over the same canonical sequence of
//! `(item, quantity)` pairs, in the order the items were declared in the
//! [`Vocabulary`].
//!
//! States are values: every transition builds a new one with
//! [`State::with_delta`] and nothing mutates a state once it exists.
//!
//! ```
//! use craft_planner::{State, Vocabulary};
//!
//! let vocab = Vocabulary::new(["wood", "plank"]).unwrap();
//! let state = State::from_quantities(&vocab, [("wood", 2)]).unwrap();
//!
//! let wood = vocab.id("wood").unwrap();
//! let plank = vocab.id("plank").unwrap();
//! let next = state.with_delta(&[(wood, -1), (plank, 4)]);
//!
//! assert_eq!(state.get("wood"), 2);
//! assert_eq!(next.get("wood"), 1);
//! assert_eq!(next.get("plank"), 4);
//! assert_eq!(next.to_string(), "{wood: 1, plank: 4}");
//! ```

use crate::{PlannerError, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Number of units of one item held in a state.
pub type Quantity = u32;

/// Position of an item in its [`Vocabulary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The ordered set of item names every state carries.
///
/// Declaration order is the canonical order used for comparing, hashing and
/// printing states.
#[derive(Debug, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
    index: HashMap<String, ItemId>,
}

impl Vocabulary {
    /// Builds a vocabulary from item names in declaration order.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::DuplicateItem` if a name appears twice.
    pub fn new<I, S>(items: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut index = HashMap::new();
        for item in items {
            let name = item.into();
            if index.contains_key(&name) {
                return Err(PlannerError::DuplicateItem(name));
            }
            index.insert(name.clone(), ItemId(names.len()));
            names.push(name);
        }
        Ok(Arc::new(Self { names, index }))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Looks up the id of an item name.
    pub fn id(&self, item: &str) -> Option<ItemId> {
        self.index.get(item).copied()
    }

    /// Name of the item with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different vocabulary and is out of range.
    pub fn name(&self, id: ItemId) -> &str {
        &self.names[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    /// Resolves an item name, naming `context` in the error if it is unknown.
    pub(crate) fn resolve(&self, item: &str, context: impl FnOnce() -> String) -> Result<ItemId> {
        self.id(item).ok_or_else(|| PlannerError::UnknownItem {
            context: context(),
            item: item.to_string(),
        })
    }
}

/// Snapshot of the quantity of every item in a vocabulary.
#[derive(Clone, Debug)]
pub struct State {
    vocab: Arc<Vocabulary>,
    quantities: Box<[Quantity]>,
}

impl State {
    /// A state holding zero of every item.
    pub fn zeroed(vocab: &Arc<Vocabulary>) -> Self {
        Self {
            vocab: Arc::clone(vocab),
            quantities: vec![0; vocab.len()].into_boxed_slice(),
        }
    }

    /// Builds a state from `(item, quantity)` pairs; unlisted items are zero.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::UnknownItem` for a name outside the vocabulary.
    pub fn from_quantities<'a, I>(vocab: &Arc<Vocabulary>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Quantity)>,
    {
        let mut quantities = vec![0; vocab.len()];
        for (item, quantity) in pairs {
            let id = vocab.resolve(item, || "initial inventory".to_string())?;
            quantities[id.0] = quantity;
        }
        Ok(Self {
            vocab: Arc::clone(vocab),
            quantities: quantities.into_boxed_slice(),
        })
    }

    /// Quantity of a named item; items outside the vocabulary count as zero.
    pub fn get(&self, item: &str) -> Quantity {
        self.vocab.id(item).map_or(0, |id| self.quantity(id))
    }

    /// Quantity of an item by id.
    pub fn quantity(&self, id: ItemId) -> Quantity {
        self.quantities[id.0]
    }

    /// Returns a new state with each `(item, delta)` added to its quantity.
    ///
    /// # Panics
    ///
    /// Panics if a delta would drive a quantity below zero or past
    /// [`Quantity::MAX`]. Callers check rule preconditions before applying
    /// effects, so reaching this is a bug in the caller.
    pub fn with_delta(&self, deltas: &[(ItemId, i64)]) -> Self {
        match self.checked_with_delta(deltas) {
            Some(next) => next,
            None => panic!(
                "delta {} would leave a quantity out of range in {}",
                DeltaDisplay(&self.vocab, deltas),
                self
            ),
        }
    }

    /// Like [`with_delta`](Self::with_delta) but returns `None` instead of
    /// panicking when a quantity would go out of range.
    pub fn checked_with_delta(&self, deltas: &[(ItemId, i64)]) -> Option<Self> {
        let mut quantities = self.quantities.clone();
        for &(id, delta) in deltas {
            let slot = &mut quantities[id.0];
            *slot = Quantity::try_from(i64::from(*slot).checked_add(delta)?).ok()?;
        }
        Some(Self {
            vocab: Arc::clone(&self.vocab),
            quantities,
        })
    }

    /// Canonical `(item, quantity)` pairs in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> + '_ {
        self.vocab.iter().zip(self.quantities.iter().copied())
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.vocab, &other.vocab) {
            return self.quantities == other.quantities;
        }
        self.iter().eq(other.iter())
    }
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.vocab, &other.vocab) {
            return self.quantities.cmp(&other.quantities);
        }
        self.iter().cmp(other.iter())
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equal states always have equal quantity sequences, so hashing the
// quantities alone stays consistent with `Eq`.
impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.quantities.hash(state);
    }
}

/// Prints only the items with a non-zero quantity.
impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (item, quantity) in self.iter().filter(|&(_, q)| q > 0) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", item, quantity)?;
            first = false;
        }
        write!(f, "}}")
    }
}

struct DeltaDisplay<'a>(&'a Vocabulary, &'a [(ItemId, i64)]);

impl fmt::Display for DeltaDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, &(id, delta)) in self.1.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:+}", self.0.name(id), delta)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn vocab() -> Arc<Vocabulary> {
        Vocabulary::new(["wood", "plank", "stick"]).unwrap()
    }

    fn hash_of(state: &State) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_zeroed_state_carries_full_vocabulary() {
        let state = State::zeroed(&vocab());
        assert_eq!(state.iter().count(), 3);
        assert!(state.iter().all(|(_, q)| q == 0));
    }

    #[test]
    fn test_get_defaults_to_zero() {
        let state = State::from_quantities(&vocab(), [("wood", 3)]).unwrap();
        assert_eq!(state.get("wood"), 3);
        assert_eq!(state.get("plank"), 0);
        assert_eq!(state.get("diamond"), 0);
    }

    #[test]
    fn test_from_quantities_rejects_unknown_item() {
        let result = State::from_quantities(&vocab(), [("diamond", 1)]);
        assert!(matches!(result, Err(PlannerError::UnknownItem { .. })));
    }

    #[test]
    fn test_duplicate_vocabulary_item() {
        let result = Vocabulary::new(["wood", "wood"]);
        assert!(matches!(result, Err(PlannerError::DuplicateItem(name)) if name == "wood"));
    }

    #[test]
    fn test_with_delta_leaves_original_untouched() {
        let vocab = vocab();
        let state = State::from_quantities(&vocab, [("wood", 1)]).unwrap();
        let wood = vocab.id("wood").unwrap();
        let plank = vocab.id("plank").unwrap();

        let next = state.with_delta(&[(wood, -1), (plank, 4)]);
        assert_eq!(state.get("wood"), 1);
        assert_eq!(state.get("plank"), 0);
        assert_eq!(next.get("wood"), 0);
        assert_eq!(next.get("plank"), 4);
    }

    #[test]
    fn test_checked_with_delta_refuses_negative() {
        let vocab = vocab();
        let state = State::zeroed(&vocab);
        let wood = vocab.id("wood").unwrap();
        assert!(state.checked_with_delta(&[(wood, -1)]).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_with_delta_panics_on_negative() {
        let vocab = vocab();
        let state = State::zeroed(&vocab);
        let stick = vocab.id("stick").unwrap();
        state.with_delta(&[(stick, -2)]);
    }

    #[test]
    fn test_equality_and_hash_across_vocabulary_handles() {
        let a = State::from_quantities(&vocab(), [("plank", 2)]).unwrap();
        let b = State::from_quantities(&vocab(), [("plank", 2)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_order_is_lexicographic_in_declaration_order() {
        let vocab = vocab();
        let more_wood = State::from_quantities(&vocab, [("wood", 2)]).unwrap();
        let more_planks = State::from_quantities(&vocab, [("wood", 1), ("plank", 9)]).unwrap();
        assert!(more_planks < more_wood);
    }

    #[test]
    fn test_display_skips_zero_quantities() {
        let state = State::from_quantities(&vocab(), [("stick", 4)]).unwrap();
        assert_eq!(state.to_string(), "{stick: 4}");
        assert_eq!(State::zeroed(&vocab()).to_string(), "{}");
    }
}
