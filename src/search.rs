//! # Time-bounded best-first search
//!
//! The engine explores the implicit graph whose nodes are [`State`]s and
//! whose edges are applicable rules, always expanding the frontier state with
//! the lowest `accumulated cost + heuristic estimate`. With an admissible,
//! consistent heuristic (or [`ZeroHeuristic`](crate::ZeroHeuristic)) the
//! first goal state popped is reached by a cheapest plan.
//!
//! A search runs until it pops a goal state, runs out of frontier, or uses up
//! its time budget. Running out of time is a normal outcome, not an error:
//! crafting graphs are usually infinite because rules can repeat, so the
//! search cannot tell "unreachable" apart from "needs more time".
//!
//! ```
//! use std::time::Duration;
//! use craft_planner::{compile_goal, compile_rules, search, RuleSpec, SearchOutcome, State, Vocabulary, ZeroHeuristic};
//!
//! let vocab = Vocabulary::new(["wood", "plank"]).unwrap();
//! let rules = compile_rules(
//!     &vocab,
//!     [RuleSpec::new("make_plank").require("wood", 1).consume("wood", 1).produce("plank", 1).with_cost(1)],
//! )
//! .unwrap();
//! let goal = compile_goal(&vocab, [("plank", 1)]).unwrap();
//! let initial = State::from_quantities(&vocab, [("wood", 1)]).unwrap();
//!
//! match search(&initial, &goal, &rules, &ZeroHeuristic, Duration::from_secs(1)) {
//!     SearchOutcome::Found(plan) => {
//!         assert_eq!(plan.total_cost(), 1);
//!         assert_eq!(plan.actions().collect::<Vec<_>>(), vec!["make_plank"]);
//!     }
//!     SearchOutcome::TimedOut(report) => panic!("no plan after {:?}", report.elapsed),
//! }
//! ```

use crate::goal::Goal;
use crate::graph::{expand, Transition};
use crate::heuristic::Heuristic;
use crate::rule::{Cost, RuleSet};
use crate::state::State;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Knobs for one search attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Wall-clock budget for the attempt
    pub time_limit: Duration,
}

impl SearchConfig {
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: Self::DEFAULT_TIME_LIMIT,
        }
    }
}

/// Lifecycle of a [`SearchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Running,
    Succeeded,
    TimedOut,
}

/// Counters describing how a search attempt went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub elapsed: Duration,
    /// States popped from the frontier and expanded
    pub states_expanded: usize,
    /// The frontier emptied before the time limit; every reachable state was
    /// explored
    pub frontier_exhausted: bool,
}

/// One step of a plan: the state reached and the rule that reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub state: State,
    /// `None` for the initial state
    pub action: Option<Arc<str>>,
}

/// A sequence of steps from the initial state to a goal state.
#[derive(Debug, Clone)]
pub struct Plan {
    steps: Vec<PlanStep>,
    total_cost: Cost,
    report: SearchReport,
}

impl Plan {
    /// All steps, starting with the initial state.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Number of rule firings in the plan.
    pub fn len(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_cost(&self) -> Cost {
        self.total_cost
    }

    /// Names of the rules fired, in order.
    pub fn actions(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter_map(|step| step.action.as_deref())
    }

    pub fn initial_state(&self) -> &State {
        &self.steps[0].state
    }

    pub fn final_state(&self) -> &State {
        &self.steps[self.steps.len() - 1].state
    }

    pub fn report(&self) -> &SearchReport {
        &self.report
    }
}

/// Prints each state on its own tab-indented line, followed by the action
/// fired from it.
impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "\t{}", step.state)?;
            if let Some(action) = self.steps.get(i + 1).and_then(|next| next.action.as_deref()) {
                writeln!(f, "{}", action)?;
            }
        }
        write!(f, "total cost: {}", self.total_cost)
    }
}

/// Result of one search attempt.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(Plan),
    /// No goal state was reached within the budget (or at all, when
    /// `frontier_exhausted` is set)
    TimedOut(SearchReport),
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn plan(&self) -> Option<&Plan> {
        match self {
            SearchOutcome::Found(plan) => Some(plan),
            SearchOutcome::TimedOut(_) => None,
        }
    }

    pub fn into_plan(self) -> Option<Plan> {
        match self {
            SearchOutcome::Found(plan) => Some(plan),
            SearchOutcome::TimedOut(_) => None,
        }
    }

    pub fn report(&self) -> &SearchReport {
        match self {
            SearchOutcome::Found(plan) => plan.report(),
            SearchOutcome::TimedOut(report) => report,
        }
    }
}

/// A state reached during search, with the best known way of reaching it.
#[derive(Debug)]
struct Node {
    state: State,
    parent: Option<usize>,
    action: Option<Arc<str>>,
    g_cost: Cost,
}

/// Frontier entry. Ordered by priority, then by insertion sequence so equal
/// priorities pop first-in first-out.
#[derive(Debug)]
struct QueueEntry {
    priority: Cost,
    seq: u64,
    /// Cost of the node when this entry was pushed
    g_cost: Cost,
    idx: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Bookkeeping for a single attempt: best-known costs and predecessors, keyed
/// by state, plus the frontier.
struct SearchContext {
    nodes: Vec<Node>,
    index: HashMap<State, usize>,
    open_set: BinaryHeap<Reverse<QueueEntry>>,
    next_seq: u64,
}

impl SearchContext {
    fn new(initial: &State, heuristic: &dyn Heuristic) -> Self {
        let mut context = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            open_set: BinaryHeap::new(),
            next_seq: 0,
        };
        context.nodes.push(Node {
            state: initial.clone(),
            parent: None,
            action: None,
            g_cost: 0,
        });
        context.index.insert(initial.clone(), 0);
        context.push(0, 0, heuristic.estimate(initial, None));
        context
    }

    fn push(&mut self, idx: usize, g_cost: Cost, estimate: Cost) {
        self.open_set.push(Reverse(QueueEntry {
            priority: g_cost.saturating_add(estimate),
            seq: self.next_seq,
            g_cost,
            idx,
        }));
        self.next_seq += 1;
    }

    /// Pops the best frontier node, skipping entries made stale by a cheaper
    /// path found after they were pushed.
    fn next_node(&mut self) -> Option<usize> {
        while let Some(Reverse(entry)) = self.open_set.pop() {
            if entry.g_cost <= self.nodes[entry.idx].g_cost {
                return Some(entry.idx);
            }
        }
        None
    }

    /// Records `transition` out of `parent` if it reaches its state more
    /// cheaply than anything seen so far.
    fn relax(&mut self, parent: usize, transition: Transition<'_>, heuristic: &dyn Heuristic) {
        let tentative = self.nodes[parent].g_cost.saturating_add(transition.cost);
        let idx = match self.index.get(&transition.state) {
            Some(&idx) if tentative >= self.nodes[idx].g_cost => return,
            Some(&idx) => {
                let node = &mut self.nodes[idx];
                node.parent = Some(parent);
                node.action = Some(Arc::clone(transition.rule.name_handle()));
                node.g_cost = tentative;
                idx
            }
            None => {
                let idx = self.nodes.len();
                self.index.insert(transition.state.clone(), idx);
                self.nodes.push(Node {
                    state: transition.state,
                    parent: Some(parent),
                    action: Some(Arc::clone(transition.rule.name_handle())),
                    g_cost: tentative,
                });
                idx
            }
        };
        let estimate = heuristic.estimate(&self.nodes[idx].state, Some(transition.rule.name()));
        self.push(idx, tentative, estimate);
    }

    /// Follows predecessor links from `idx` back to the initial state.
    fn reconstruct_path(&self, idx: usize) -> Vec<PlanStep> {
        let mut path = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            let node = &self.nodes[i];
            path.push(PlanStep {
                state: node.state.clone(),
                action: node.action.clone(),
            });
            current = node.parent;
        }
        path.reverse();
        path
    }
}

/// Runs best-first searches over one rule set towards one goal.
///
/// Each call to [`run`](Self::run) is an independent attempt with fresh
/// bookkeeping; the engine only remembers the phase its last attempt ended in.
pub struct SearchEngine<'a> {
    rules: &'a RuleSet,
    goal: &'a Goal,
    heuristic: &'a dyn Heuristic,
    time_limit: Duration,
    phase: SearchPhase,
}

impl<'a> SearchEngine<'a> {
    pub fn new(
        rules: &'a RuleSet,
        goal: &'a Goal,
        heuristic: &'a dyn Heuristic,
        time_limit: Duration,
    ) -> Self {
        Self {
            rules,
            goal,
            heuristic,
            time_limit,
            phase: SearchPhase::Idle,
        }
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Searches from `initial` until a goal state is popped, the frontier
    /// empties, or the time limit passes.
    ///
    /// The clock is checked once per popped state, never in the middle of
    /// expanding one.
    pub fn run(&mut self, initial: &State) -> SearchOutcome {
        self.phase = SearchPhase::Running;
        let start = Instant::now();
        log::debug!(
            "Searching from {} with {} rules, time limit {:?}",
            initial,
            self.rules.len(),
            self.time_limit
        );

        let mut context = SearchContext::new(initial, self.heuristic);
        let mut states_expanded = 0;

        loop {
            if start.elapsed() >= self.time_limit {
                return self.time_out(start, states_expanded, false);
            }
            let Some(current) = context.next_node() else {
                return self.time_out(start, states_expanded, true);
            };

            if self.goal.is_satisfied(&context.nodes[current].state) {
                let report = SearchReport {
                    elapsed: start.elapsed(),
                    states_expanded,
                    frontier_exhausted: false,
                };
                let plan = Plan {
                    steps: context.reconstruct_path(current),
                    total_cost: context.nodes[current].g_cost,
                    report,
                };
                log::info!(
                    "Found plan: {} steps, cost {}, {} states expanded in {:?}",
                    plan.len(),
                    plan.total_cost,
                    states_expanded,
                    report.elapsed
                );
                self.phase = SearchPhase::Succeeded;
                return SearchOutcome::Found(plan);
            }

            states_expanded += 1;
            log::trace!(
                "Expanding {} at cost {}",
                context.nodes[current].state,
                context.nodes[current].g_cost
            );
            let transitions: Vec<_> = expand(self.rules, &context.nodes[current].state).collect();
            for transition in transitions {
                context.relax(current, transition, self.heuristic);
            }
        }
    }

    fn time_out(&mut self, start: Instant, states_expanded: usize, frontier_exhausted: bool) -> SearchOutcome {
        let report = SearchReport {
            elapsed: start.elapsed(),
            states_expanded,
            frontier_exhausted,
        };
        if frontier_exhausted {
            log::warn!(
                "No plan: frontier exhausted after {} states in {:?}",
                states_expanded,
                report.elapsed
            );
        } else {
            log::warn!(
                "No plan within {:?}: {} states expanded",
                self.time_limit,
                states_expanded
            );
        }
        self.phase = SearchPhase::TimedOut;
        SearchOutcome::TimedOut(report)
    }
}

/// Runs a single bounded search attempt.
///
/// Shorthand for building a [`SearchEngine`] and calling
/// [`run`](SearchEngine::run) once.
pub fn search(
    initial: &State,
    goal: &Goal,
    rules: &RuleSet,
    heuristic: &dyn Heuristic,
    time_limit: Duration,
) -> SearchOutcome {
    SearchEngine::new(rules, goal, heuristic, time_limit).run(initial)
}
