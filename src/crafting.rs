//! Loading crafting problems from JSON.
//!
//! The format has four top-level keys:
//!
//! ```json
//! {
//!   "Items": ["bench", "plank", "wood"],
//!   "Initial": {"wood": 1},
//!   "Goal": {"bench": 1},
//!   "Recipes": {
//!     "craft plank": {"Consumes": {"wood": 1}, "Produces": {"plank": 4}, "Time": 1},
//!     "craft bench": {"Consumes": {"plank": 4}, "Produces": {"bench": 1}, "Time": 1}
//!   }
//! }
//! ```
//!
//! `Items` fixes the vocabulary and its order, recipes keep the order they
//! are written in, and `Requires` entries may use `true` in place of `1` for
//! tools and stations.

use crate::goal::{compile_goal, Goal};
use crate::rule::{compile_rules, Cost, RuleSet, RuleSpec};
use crate::state::{Quantity, State, Vocabulary};
use crate::{PlannerError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// A crafting problem as written in a rules file, before compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct CraftingProblem {
    #[serde(rename = "Items")]
    pub items: Vec<String>,
    #[serde(rename = "Initial", default)]
    pub initial: Map<String, Value>,
    #[serde(rename = "Goal")]
    pub goal: Map<String, Value>,
    #[serde(rename = "Recipes")]
    pub recipes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RecipeRecord {
    #[serde(rename = "Requires", default)]
    requires: Map<String, Value>,
    #[serde(rename = "Consumes", default)]
    consumes: Map<String, Value>,
    #[serde(rename = "Produces")]
    produces: Option<Map<String, Value>>,
    #[serde(rename = "Time")]
    time: Option<Cost>,
}

/// Everything a search needs, compiled from a [`CraftingProblem`].
#[derive(Debug, Clone)]
pub struct CompiledProblem {
    pub vocabulary: Arc<Vocabulary>,
    pub initial: State,
    pub goal: Goal,
    pub rules: RuleSet,
}

impl CraftingProblem {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Converts every recipe into a [`RuleSpec`], in file order.
    ///
    /// # Errors
    ///
    /// * `PlannerError::Json` if a recipe is not an object of the expected shape
    /// * `PlannerError::InvalidQuantity` for a quantity that is not a
    ///   non-negative integer or boolean
    pub fn rule_specs(&self) -> Result<Vec<RuleSpec>> {
        self.recipes
            .iter()
            .map(|(name, value)| -> Result<RuleSpec> {
                let record: RecipeRecord = serde_json::from_value(value.clone())?;
                let context = || format!("rule '{}'", name);
                Ok(RuleSpec {
                    name: name.clone(),
                    requires: quantities(&record.requires, context)?,
                    consumes: quantities(&record.consumes, context)?,
                    produces: record
                        .produces
                        .as_ref()
                        .map(|produces| quantities(produces, context))
                        .transpose()?,
                    cost: record.time,
                })
            })
            .collect()
    }

    /// Builds the vocabulary, initial state, goal and rule set.
    ///
    /// The initial state holds zero of every item except those listed under
    /// `Initial`.
    pub fn compile(&self) -> Result<CompiledProblem> {
        let vocabulary = Vocabulary::new(self.items.iter().cloned())?;

        let initial = quantities(&self.initial, || "initial inventory".to_string())?;
        let initial = State::from_quantities(
            &vocabulary,
            initial.iter().map(|(item, q)| (item.as_str(), *q)),
        )?;

        let goal = quantities(&self.goal, || "goal".to_string())?;
        let goal = compile_goal(&vocabulary, goal.iter().map(|(item, q)| (item.as_str(), *q)))?;

        let rules = compile_rules(&vocabulary, self.rule_specs()?)?;
        log::debug!(
            "Loaded crafting problem: {} items, {} rules, goal {:?}",
            vocabulary.len(),
            rules.len(),
            self.goal.keys().collect::<Vec<_>>()
        );

        Ok(CompiledProblem {
            vocabulary,
            initial,
            goal,
            rules,
        })
    }
}

impl FromStr for CraftingProblem {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

fn quantities(
    map: &Map<String, Value>,
    context: impl Fn() -> String,
) -> Result<Vec<(String, Quantity)>> {
    map.iter()
        .map(|(item, value)| -> Result<(String, Quantity)> {
            Ok((item.clone(), quantity(item, value, &context)?))
        })
        .collect()
}

fn quantity(item: &str, value: &Value, context: impl Fn() -> String) -> Result<Quantity> {
    let parsed = match value {
        Value::Bool(flag) => Some(Quantity::from(*flag)),
        Value::Number(n) => n.as_u64().and_then(|n| Quantity::try_from(n).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| PlannerError::InvalidQuantity {
        context: context(),
        item: item.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "Items": ["bench", "plank", "wood"],
        "Initial": {"wood": 1},
        "Goal": {"bench": 1},
        "Recipes": {
            "punch for wood": {"Produces": {"wood": 1}, "Time": 4},
            "craft plank": {"Consumes": {"wood": 1}, "Produces": {"plank": 4}, "Time": 1},
            "craft bench": {"Consumes": {"plank": 4}, "Produces": {"bench": 1}, "Time": 1}
        }
    }"#;

    #[test]
    fn test_parse_and_compile() {
        let problem: CraftingProblem = SMALL.parse().unwrap();
        let compiled = problem.compile().unwrap();

        assert_eq!(compiled.vocabulary.iter().collect::<Vec<_>>(), vec!["bench", "plank", "wood"]);
        assert_eq!(compiled.initial.get("wood"), 1);
        assert_eq!(compiled.initial.get("bench"), 0);
        assert_eq!(compiled.rules.len(), 3);
        assert!(!compiled.goal.is_satisfied(&compiled.initial));
    }

    #[test]
    fn test_recipe_order_is_preserved() {
        let problem: CraftingProblem = SMALL.parse().unwrap();
        let names: Vec<_> = problem.rule_specs().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["punch for wood", "craft plank", "craft bench"]);
    }

    #[test]
    fn test_boolean_requirement_counts_as_one() {
        let json = r#"{
            "Items": ["bench", "plank", "stick"],
            "Goal": {"stick": 1},
            "Recipes": {
                "craft stick at bench": {
                    "Requires": {"bench": true},
                    "Consumes": {"plank": 2},
                    "Produces": {"stick": 4},
                    "Time": 1
                }
            }
        }"#;
        let problem: CraftingProblem = json.parse().unwrap();
        let specs = problem.rule_specs().unwrap();
        assert_eq!(specs[0].requires, vec![("bench".to_string(), 1)]);
        assert!(problem.compile().unwrap().initial.iter().all(|(_, q)| q == 0));
    }

    #[test]
    fn test_missing_produces_is_rejected() {
        let json = r#"{
            "Items": ["wood"],
            "Goal": {"wood": 1},
            "Recipes": {"idle": {"Time": 1}}
        }"#;
        let problem: CraftingProblem = json.parse().unwrap();
        assert!(matches!(
            problem.compile(),
            Err(PlannerError::MissingField { field: "Produces", .. })
        ));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let json = r#"{
            "Items": ["wood"],
            "Goal": {"wood": -1},
            "Recipes": {}
        }"#;
        let problem: CraftingProblem = json.parse().unwrap();
        assert!(matches!(
            problem.compile(),
            Err(PlannerError::InvalidQuantity { context, .. }) if context == "goal"
        ));
    }

    #[test]
    fn test_unknown_initial_item_is_rejected() {
        let json = r#"{
            "Items": ["wood"],
            "Initial": {"diamond": 1},
            "Goal": {"wood": 1},
            "Recipes": {}
        }"#;
        let problem: CraftingProblem = json.parse().unwrap();
        assert!(matches!(problem.compile(), Err(PlannerError::UnknownItem { .. })));
    }

    #[test]
    fn test_malformed_json() {
        let result = "{\"Items\": [".parse::<CraftingProblem>();
        assert!(matches!(result, Err(PlannerError::Json(_))));
    }
}
