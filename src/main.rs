//! craft-planner command line driver.
//!
//! Loads a crafting problem from JSON, searches for a cheapest plan and
//! prints the trace. Set `RUST_LOG=debug` for search diagnostics.

use clap::{Parser, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use craft_planner::{
    CraftingProblem, Goal, GoalDeficitHeuristic, Heuristic, ItemCapHeuristic, PlanVisualizer,
    Planner, Quantity, SearchConfig, SearchOutcome, State, Vocabulary, ZeroHeuristic,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HeuristicKind {
    /// Uniform-cost search
    Zero,
    /// Cheapest producer of the costliest missing goal item
    Deficit,
}

#[derive(Parser, Debug)]
#[command(name = "craft-planner")]
#[command(author, version, about = "Find a cheapest crafting plan for a goal inventory", long_about = None)]
struct Args {
    /// Crafting problem file (JSON with Items, Initial, Goal and Recipes)
    rules: PathBuf,

    /// Search time budget in seconds
    #[arg(short, long, default_value = "5", value_parser = parse_seconds)]
    time_limit: Duration,

    /// Heuristic used to order the search
    #[arg(long, value_enum, default_value = "zero")]
    heuristic: HeuristicKind,

    /// Treat states holding more than N of ITEM as dead ends (ITEM=N, repeatable)
    #[arg(long = "cap", value_parser = parse_cap)]
    caps: Vec<(String, Quantity)>,

    /// Also write the plan as a Graphviz DOT file
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid number '{}': {}", s, e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid time limit '{}': {}", s, e))
}

fn parse_cap(s: &str) -> Result<(String, Quantity), String> {
    let (item, cap) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM=N, got '{}'", s))?;
    let cap = cap
        .trim()
        .parse()
        .map_err(|e| format!("invalid cap '{}': {}", cap, e))?;
    Ok((item.trim().to_string(), cap))
}

/// Formats goal minimums the way `State` prints inventories.
fn describe_goal(goal: &Goal, vocab: &Vocabulary) -> String {
    let entries: Vec<_> = goal
        .requirements()
        .iter()
        .map(|&(id, needed)| format!("{}: {}", vocab.name(id), needed))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let problem = CraftingProblem::from_path(&args.rules)?;
    let compiled = problem.compile()?;

    println!("All items: {:?}", compiled.vocabulary.iter().collect::<Vec<_>>());
    println!("Initial inventory: {}", compiled.initial);
    println!("Goal: {}", describe_goal(&compiled.goal, &compiled.vocabulary));

    let base: Box<dyn Heuristic> = match args.heuristic {
        HeuristicKind::Zero => Box::new(ZeroHeuristic),
        HeuristicKind::Deficit => Box::new(GoalDeficitHeuristic::new(&compiled.goal, &compiled.rules)),
    };
    let heuristic: Box<dyn Heuristic> = if args.caps.is_empty() {
        base
    } else {
        let inner = move |state: &State, last: Option<&str>| base.estimate(state, last);
        Box::new(ItemCapHeuristic::new(
            &compiled.vocabulary,
            &compiled.goal,
            args.caps.iter().map(|(item, cap)| (item.as_str(), *cap)),
            inner,
        )?)
    };

    let planner = Planner::new(compiled.rules, compiled.goal)
        .with_heuristic(heuristic)
        .with_config(SearchConfig::default().with_time_limit(args.time_limit));

    match planner.plan(&compiled.initial) {
        SearchOutcome::Found(plan) => {
            println!("{}", plan);
            println!(
                "{} steps, {} states expanded in {:.3} seconds",
                plan.len(),
                plan.report().states_expanded,
                plan.report().elapsed.as_secs_f64()
            );
            if let Some(path) = &args.dot {
                PlanVisualizer::new().write_dot_file(&plan, path)?;
                println!("Wrote plan graph to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        SearchOutcome::TimedOut(report) => {
            eprintln!("{:.3} seconds.", report.elapsed.as_secs_f64());
            if report.frontier_exhausted {
                eprintln!(
                    "No path from {} exists: all {} reachable states explored.",
                    compiled.initial, report.states_expanded
                );
            } else {
                eprintln!(
                    "Failed to find a path from {} within time limit ({} states expanded).",
                    compiled.initial, report.states_expanded
                );
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
