use crate::search::Plan;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Renders plans as Graphviz DOT graphs: one node per state along the plan,
/// one edge per rule fired, labelled with its name.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanVisualizer;

impl PlanVisualizer {
    pub fn new() -> Self {
        Self
    }

    /// Writes the DOT description of `plan` to `out`.
    pub fn write_dot<W: Write>(&self, plan: &Plan, out: &mut W) -> Result<()> {
        writeln!(out, "digraph plan {{")?;
        writeln!(out, "    rankdir=LR;")?;
        writeln!(out, "    node [shape=box, style=filled, fillcolor=lightblue];")?;
        writeln!(out, "    edge [fontsize=10];")?;

        let last = plan.steps().len() - 1;
        for (i, step) in plan.steps().iter().enumerate() {
            let color = match i {
                0 => ", fillcolor=lightgreen",
                _ if i == last => ", fillcolor=lightpink",
                _ => "",
            };
            writeln!(
                out,
                "    state_{} [label=\"{}\"{}];",
                i,
                escape(&step.state.to_string()),
                color
            )?;
        }

        for (i, step) in plan.steps().iter().enumerate().skip(1) {
            if let Some(action) = &step.action {
                writeln!(
                    out,
                    "    state_{} -> state_{} [label=\"{}\"];",
                    i - 1,
                    i,
                    escape(action)
                )?;
            }
        }

        writeln!(
            out,
            "    label=\"total cost: {}\";",
            plan.total_cost()
        )?;
        writeln!(out, "}}")?;
        Ok(())
    }

    /// Writes the DOT description of `plan` to a file, replacing it if present.
    pub fn write_dot_file(&self, plan: &Plan, path: impl AsRef<Path>) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        self.write_dot(plan, &mut file)?;
        file.flush()?;
        Ok(())
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goal::compile_goal;
    use crate::heuristic::ZeroHeuristic;
    use crate::rule::{compile_rules, RuleSpec};
    use crate::search::search;
    use crate::state::{State, Vocabulary};
    use std::time::Duration;

    fn plan() -> Plan {
        let vocab = Vocabulary::new(["wood", "plank"]).unwrap();
        let rules = compile_rules(
            &vocab,
            [
                RuleSpec::new("punch for wood").produce("wood", 1).with_cost(4),
                RuleSpec::new("craft plank")
                    .consume("wood", 1)
                    .produce("plank", 4)
                    .with_cost(1),
            ],
        )
        .unwrap();
        let goal = compile_goal(&vocab, [("plank", 1)]).unwrap();
        search(
            &State::zeroed(&vocab),
            &goal,
            &rules,
            &ZeroHeuristic,
            Duration::from_secs(5),
        )
        .into_plan()
        .unwrap()
    }

    #[test]
    fn test_write_dot() {
        let mut out = Vec::new();
        PlanVisualizer::new().write_dot(&plan(), &mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("digraph plan {"));
        assert!(dot.contains("state_0 [label=\"{}\", fillcolor=lightgreen];"));
        assert!(dot.contains("state_2 [label=\"{plank: 4}\", fillcolor=lightpink];"));
        assert!(dot.contains("state_0 -> state_1 [label=\"punch for wood\"];"));
        assert!(dot.contains("state_1 -> state_2 [label=\"craft plank\"];"));
        assert!(dot.contains("label=\"total cost: 5\";"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_escape_quotes() {
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
    }
}
