mod crafting;
mod error;
mod goal;
mod graph;
mod heuristic;
mod planner;
mod rule;
mod search;
mod state;
mod visualizer;

pub use crafting::{CompiledProblem, CraftingProblem};
pub use error::{PlannerError, Result};
pub use goal::{compile_goal, Goal};
pub use graph::{expand, Transition};
pub use heuristic::{GoalDeficitHeuristic, Heuristic, ItemCapHeuristic, ZeroHeuristic, UNREACHABLE};
pub use planner::Planner;
pub use rule::{compile_rules, Cost, Rule, RuleSet, RuleSpec};
pub use search::{
    search, Plan, PlanStep, SearchConfig, SearchEngine, SearchOutcome, SearchPhase, SearchReport,
};
pub use state::{ItemId, Quantity, State, Vocabulary};
pub use visualizer::PlanVisualizer;
