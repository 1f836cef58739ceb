//! Linear programming capability.
//!
//! Shape: `lp_solver(objective: String, constraints: List<String>,
//! variables: Mapping<String, Mapping>, sense: String)` where each
//! variable mapping carries `low_bound`, `up_bound` and `cat`. The
//! built-in backend enumerates integer grids within the declared bounds;
//! continuous variables need an external solver and are reported as
//! unsupported. `sense` defaults to maximize when omitted.

use super::{expect_strings, Capability, SolverLimits};
use mathdesk_common::{Expr, Literal, ToolName, ToolResult, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sense {
    Maximize,
    Minimize,
}

pub struct LpSolver {
    limits: SolverLimits,
}

impl LpSolver {
    pub fn new(limits: SolverLimits) -> Self {
        Self { limits }
    }
}

impl Capability for LpSolver {
    fn name(&self) -> ToolName {
        ToolName::LpSolver
    }

    fn execute(&self, arguments: &[Literal]) -> ToolResult {
        if arguments.len() != 3 && arguments.len() != 4 {
            return ToolResult::fail(format!(
                "lp_solver expects (objective, constraints, variables, sense), got {} argument(s)",
                arguments.len()
            ));
        }
        let objective_text = match arguments[0].as_str() {
            Some(o) => o,
            None => {
                return ToolResult::fail(format!(
                    "objective must be a string, got {}",
                    arguments[0].type_name()
                ))
            }
        };
        let constraints = match expect_strings(&arguments[1]) {
            Ok(constraints) => constraints,
            Err(e) => return ToolResult::fail(e),
        };
        let var_pairs = match arguments[2].as_mapping() {
            Some(pairs) => pairs,
            None => {
                return ToolResult::fail(format!(
                    "variables must be a mapping, got {}",
                    arguments[2].type_name()
                ))
            }
        };
        let sense = match arguments.get(3) {
            None => Sense::Maximize,
            Some(literal) => match literal.as_str().map(str::to_lowercase).as_deref() {
                Some("maximize") => Sense::Maximize,
                Some("minimize") => Sense::Minimize,
                _ => {
                    return ToolResult::fail("sense must be 'maximize' or 'minimize'");
                }
            },
        };
        if var_pairs.is_empty() {
            return ToolResult::fail("no variables specified");
        }

        let mut names = Vec::with_capacity(var_pairs.len());
        let mut bounds: Vec<(i64, i64)> = Vec::with_capacity(var_pairs.len());
        for (name, props) in var_pairs {
            let category = props
                .get("cat")
                .and_then(|c| c.as_str())
                .unwrap_or("Continuous");
            if !category.eq_ignore_ascii_case("integer") {
                return ToolResult::fail(format!(
                    "variable '{}' has cat '{}'; the built-in backend only enumerates \
                     Integer variables with finite bounds",
                    name, category
                ));
            }
            let low = props.get("low_bound").and_then(|b| b.as_number());
            let up = props.get("up_bound").and_then(|b| b.as_number());
            let (low, up) = match (low, up) {
                (Some(low), Some(up)) => (low.floor() as i64, up.floor() as i64),
                _ => {
                    return ToolResult::fail(format!(
                        "variable '{}' needs numeric low_bound and up_bound",
                        name
                    ))
                }
            };
            if low > up {
                return ToolResult::fail(format!(
                    "variable '{}' has low_bound above up_bound",
                    name
                ));
            }
            names.push(name.clone());
            bounds.push((low, up));
        }

        let objective = match Expr::parse(objective_text, &names) {
            Ok(expr) => expr,
            Err(e) => {
                return ToolResult::fail(format!(
                    "failed to parse objective '{}': {}",
                    objective_text, e.message
                ))
            }
        };
        let mut parsed_constraints = Vec::with_capacity(constraints.len());
        for text in &constraints {
            match Expr::parse(text, &names) {
                Ok(expr) => parsed_constraints.push(expr),
                Err(e) => {
                    return ToolResult::fail(format!(
                        "failed to parse constraint '{}': {}",
                        text, e.message
                    ))
                }
            }
        }

        let mut space: u128 = 1;
        for &(low, up) in &bounds {
            space = space.saturating_mul((up - low + 1) as u128);
            if space > self.limits.max_search_space {
                return ToolResult::fail(format!(
                    "search space exceeds the {} assignment cap",
                    self.limits.max_search_space
                ));
            }
        }

        match enumerate(&objective, &parsed_constraints, &names, &bounds, sense) {
            Some((assignment, best)) => {
                ToolResult::ok(Literal::Mapping(assignment))
                    .with_metadata("status", "Optimal")
                    .with_metadata("objective_value", format!("{}", best))
            }
            None => ToolResult::fail("no feasible solution satisfies all constraints"),
        }
    }
}

/// Exhaustive integer enumeration within bounds, keeping the best
/// feasible objective value. Ties keep the first assignment found.
fn enumerate(
    objective: &Expr,
    constraints: &[Expr],
    names: &[String],
    bounds: &[(i64, i64)],
    sense: Sense,
) -> Option<(Vec<(String, Literal)>, f64)> {
    let mut current: Vec<i64> = bounds.iter().map(|&(low, _)| low).collect();
    let mut best: Option<(Vec<i64>, f64)> = None;

    loop {
        let bindings: HashMap<String, Value> = names
            .iter()
            .zip(&current)
            .map(|(name, &v)| (name.clone(), Value::Num(v as f64)))
            .collect();

        let feasible = constraints
            .iter()
            .all(|c| matches!(c.eval(&bindings), Ok(Value::Bool(true))));
        if feasible {
            if let Ok(Value::Num(value)) = objective.eval(&bindings) {
                let better = match &best {
                    None => true,
                    Some((_, incumbent)) => match sense {
                        Sense::Maximize => value > *incumbent,
                        Sense::Minimize => value < *incumbent,
                    },
                };
                if better {
                    best = Some((current.clone(), value));
                }
            }
        }

        let mut position = 0;
        loop {
            if position == current.len() {
                return best.map(|(assignment, value)| {
                    (
                        names
                            .iter()
                            .zip(assignment)
                            .map(|(name, v)| (name.clone(), Literal::Number(v as f64)))
                            .collect(),
                        value,
                    )
                });
            }
            current[position] += 1;
            if current[position] <= bounds[position].1 {
                break;
            }
            current[position] = bounds[position].0;
            position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var_props(low: f64, up: f64) -> Literal {
        Literal::Mapping(vec![
            ("low_bound".to_string(), Literal::Number(low)),
            ("up_bound".to_string(), Literal::Number(up)),
            ("cat".to_string(), Literal::Str("Integer".to_string())),
        ])
    }

    fn run(objective: &str, constraints: &[&str], vars: &[(&str, f64, f64)], sense: &str) -> ToolResult {
        LpSolver::new(SolverLimits::default()).execute(&[
            Literal::Str(objective.to_string()),
            Literal::List(
                constraints
                    .iter()
                    .map(|s| Literal::Str(s.to_string()))
                    .collect(),
            ),
            Literal::Mapping(
                vars.iter()
                    .map(|(name, low, up)| (name.to_string(), var_props(*low, *up)))
                    .collect(),
            ),
            Literal::Str(sense.to_string()),
        ])
    }

    #[test]
    fn maximizes_linear_objective() {
        let result = run(
            "3*x + 5*y",
            &["x + y <= 10", "2*x + y <= 15"],
            &[("x", 0.0, 10.0), ("y", 0.0, 10.0)],
            "maximize",
        );
        assert!(result.success);
        let value = result.value.unwrap();
        // Optimum at x = 0, y = 10 with objective 50.
        assert_eq!(value.get("x"), Some(&Literal::Number(0.0)));
        assert_eq!(value.get("y"), Some(&Literal::Number(10.0)));
        assert_eq!(result.metadata.get("objective_value").map(String::as_str), Some("50"));
    }

    #[test]
    fn minimizes_when_asked() {
        let result = run(
            "x + y",
            &["x + y >= 3"],
            &[("x", 0.0, 5.0), ("y", 0.0, 5.0)],
            "minimize",
        );
        assert!(result.success);
        assert_eq!(result.metadata.get("objective_value").map(String::as_str), Some("3"));
    }

    #[test]
    fn sense_defaults_to_maximize() {
        let result = LpSolver::new(SolverLimits::default()).execute(&[
            Literal::Str("x".to_string()),
            Literal::List(vec![Literal::Str("x <= 4".to_string())]),
            Literal::Mapping(vec![("x".to_string(), var_props(0.0, 10.0))]),
        ]);
        assert!(result.success);
        assert_eq!(result.value.unwrap().get("x"), Some(&Literal::Number(4.0)));
    }

    #[test]
    fn infeasible_program_fails() {
        let result = run(
            "x",
            &["x >= 5", "x <= 2"],
            &[("x", 0.0, 10.0)],
            "maximize",
        );
        assert!(!result.success);
        assert!(result.error.unwrap().contains("no feasible solution"));
    }

    #[test]
    fn continuous_variables_are_unsupported() {
        let result = LpSolver::new(SolverLimits::default()).execute(&[
            Literal::Str("x".to_string()),
            Literal::List(vec![]),
            Literal::Mapping(vec![(
                "x".to_string(),
                Literal::Mapping(vec![("low_bound".to_string(), Literal::Number(0.0))]),
            )]),
            Literal::Str("maximize".to_string()),
        ]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Integer"));
    }

    #[test]
    fn missing_bounds_are_rejected() {
        let result = LpSolver::new(SolverLimits::default()).execute(&[
            Literal::Str("x".to_string()),
            Literal::List(vec![]),
            Literal::Mapping(vec![(
                "x".to_string(),
                Literal::Mapping(vec![("cat".to_string(), Literal::Str("Integer".to_string()))]),
            )]),
        ]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("low_bound"));
    }
}
