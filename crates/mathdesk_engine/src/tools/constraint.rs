//! Constraint satisfaction capability.
//!
//! Shape: `constraint_solver(constraints: List<String>, variable_types:
//! Mapping<String, String>)` with types `int` and `bool`. Constraint text
//! is parsed with the restricted grammar against the declared variable
//! set and must be a boolean expression. The built-in backend does a
//! bounded exhaustive search over the integer domain; `real` variables
//! have no backend here and are reported as unsupported.

use super::{expect_strings, Capability, SolverLimits};
use mathdesk_common::{Expr, Literal, ToolName, ToolResult, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
enum VarDomain {
    Int,
    Bool,
}

pub struct ConstraintSolver {
    limits: SolverLimits,
}

impl ConstraintSolver {
    pub fn new(limits: SolverLimits) -> Self {
        Self { limits }
    }
}

impl Capability for ConstraintSolver {
    fn name(&self) -> ToolName {
        ToolName::ConstraintSolver
    }

    fn execute(&self, arguments: &[Literal]) -> ToolResult {
        if arguments.len() != 2 {
            return ToolResult::fail(format!(
                "constraint_solver expects (constraints, variable_types), got {} argument(s)",
                arguments.len()
            ));
        }
        let constraints = match expect_strings(&arguments[0]) {
            Ok(constraints) => constraints,
            Err(e) => return ToolResult::fail(e),
        };
        let type_pairs = match arguments[1].as_mapping() {
            Some(pairs) => pairs,
            None => {
                return ToolResult::fail(format!(
                    "variable_types must be a mapping, got {}",
                    arguments[1].type_name()
                ))
            }
        };
        if constraints.is_empty() {
            return ToolResult::fail("no constraints provided");
        }
        if type_pairs.is_empty() {
            return ToolResult::fail("no variables specified");
        }

        let mut names = Vec::with_capacity(type_pairs.len());
        let mut domains = Vec::with_capacity(type_pairs.len());
        for (name, type_literal) in type_pairs {
            let type_name = match type_literal.as_str() {
                Some(t) => t,
                None => {
                    return ToolResult::fail(format!(
                        "type of variable '{}' must be a string",
                        name
                    ))
                }
            };
            let domain = match type_name {
                "int" => VarDomain::Int,
                "bool" => VarDomain::Bool,
                "real" => {
                    return ToolResult::fail(
                        "variable type 'real' is not supported by the built-in backend",
                    )
                }
                other => return ToolResult::fail(format!("unknown variable type: {}", other)),
            };
            names.push(name.clone());
            domains.push(domain);
        }

        let mut parsed = Vec::with_capacity(constraints.len());
        for text in &constraints {
            let expr = match Expr::parse(text, &names) {
                Ok(expr) => expr,
                Err(e) => {
                    return ToolResult::fail(format!(
                        "failed to parse constraint '{}': {}",
                        text, e.message
                    ))
                }
            };
            if !is_boolean_shaped(&expr) {
                return ToolResult::fail(format!(
                    "constraint '{}' is not a boolean expression",
                    text
                ));
            }
            parsed.push(expr);
        }

        let int_domain_size = (self.limits.domain_max - self.limits.domain_min + 1).max(0) as u128;
        if int_domain_size == 0 && domains.iter().any(|d| matches!(d, VarDomain::Int)) {
            return ToolResult::fail(format!(
                "integer domain [{}, {}] is empty",
                self.limits.domain_min, self.limits.domain_max
            ));
        }
        let mut space: u128 = 1;
        for domain in &domains {
            let size = match domain {
                VarDomain::Int => int_domain_size,
                VarDomain::Bool => 2,
            };
            space = space.saturating_mul(size);
            if space > self.limits.max_search_space {
                return ToolResult::fail(format!(
                    "search space exceeds the {} assignment cap",
                    self.limits.max_search_space
                ));
            }
        }

        match self.search(&parsed, &names, &domains) {
            Some(assignment) => {
                ToolResult::ok(Literal::Mapping(assignment)).with_metadata("method", "bounded_search")
            }
            None => ToolResult::fail("no solution satisfies all constraints"),
        }
    }
}

impl ConstraintSolver {
    /// Odometer walk over the cartesian product of all variable domains,
    /// returning the first satisfying assignment in domain order.
    fn search(
        &self,
        constraints: &[Expr],
        names: &[String],
        domains: &[VarDomain],
    ) -> Option<Vec<(String, Literal)>> {
        let sizes: Vec<i64> = domains
            .iter()
            .map(|d| match d {
                VarDomain::Int => self.limits.domain_max - self.limits.domain_min + 1,
                VarDomain::Bool => 2,
            })
            .collect();
        let mut indices = vec![0i64; domains.len()];

        loop {
            let mut bindings = HashMap::with_capacity(names.len());
            for ((name, domain), &index) in names.iter().zip(domains).zip(&indices) {
                let value = match domain {
                    VarDomain::Int => Value::Num((self.limits.domain_min + index) as f64),
                    VarDomain::Bool => Value::Bool(index == 1),
                };
                bindings.insert(name.clone(), value);
            }

            // Evaluation errors (e.g. division by zero under this
            // assignment) fail closed: the assignment does not satisfy.
            let satisfied = constraints
                .iter()
                .all(|c| matches!(c.eval(&bindings), Ok(Value::Bool(true))));
            if satisfied {
                return Some(
                    names
                        .iter()
                        .zip(domains)
                        .zip(&indices)
                        .map(|((name, domain), &index)| {
                            let literal = match domain {
                                VarDomain::Int => {
                                    Literal::Number((self.limits.domain_min + index) as f64)
                                }
                                VarDomain::Bool => Literal::Bool(index == 1),
                            };
                            (name.clone(), literal)
                        })
                        .collect(),
                );
            }

            // Advance the odometer; done when it wraps.
            let mut position = 0;
            loop {
                if position == indices.len() {
                    return None;
                }
                indices[position] += 1;
                if indices[position] < sizes[position] {
                    break;
                }
                indices[position] = 0;
                position += 1;
            }
        }
    }
}

/// Structural check that an expression can yield a boolean.
fn is_boolean_shaped(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Cmp(..) | Expr::Logic(..) | Expr::Not(_) | Expr::Bool(_) | Expr::Var(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> ConstraintSolver {
        ConstraintSolver::new(SolverLimits::default())
    }

    fn run(constraints: &[&str], types: &[(&str, &str)]) -> ToolResult {
        solver().execute(&[
            Literal::List(
                constraints
                    .iter()
                    .map(|s| Literal::Str(s.to_string()))
                    .collect(),
            ),
            Literal::Mapping(
                types
                    .iter()
                    .map(|(k, v)| (k.to_string(), Literal::Str(v.to_string())))
                    .collect(),
            ),
        ])
    }

    #[test]
    fn solves_integer_constraints() {
        let result = run(&["x + y == 10", "x > 3"], &[("x", "int"), ("y", "int")]);
        assert!(result.success);
        let value = result.value.unwrap();
        let x = value.get("x").unwrap().as_number().unwrap();
        let y = value.get("y").unwrap().as_number().unwrap();
        assert_eq!(x + y, 10.0);
        assert!(x > 3.0);
    }

    #[test]
    fn solves_boolean_logic() {
        let result = run(
            &["a or b", "not (a and b)"],
            &[("a", "bool"), ("b", "bool")],
        );
        assert!(result.success);
        let value = result.value.unwrap();
        let a = value.get("a").unwrap().as_bool().unwrap();
        let b = value.get("b").unwrap().as_bool().unwrap();
        assert!(a || b);
        assert!(!(a && b));
    }

    #[test]
    fn infeasible_constraints_report_no_solution() {
        let result = run(&["x > 5", "x < 3"], &[("x", "int")]);
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("no solution satisfies all constraints")
        );
    }

    #[test]
    fn real_variables_are_unsupported() {
        let result = run(&["x > 0"], &[("x", "real")]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("'real'"));
    }

    #[test]
    fn non_boolean_constraint_is_rejected() {
        let result = run(&["x + 1"], &[("x", "int")]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not a boolean expression"));
    }

    #[test]
    fn inverted_domain_bounds_never_yield_an_assignment() {
        let solver = ConstraintSolver::new(SolverLimits {
            domain_min: 5,
            domain_max: -5,
            max_search_space: 1000,
        });
        let result = solver.execute(&[
            Literal::List(vec![Literal::Str("x == x".to_string())]),
            Literal::Mapping(vec![("x".to_string(), Literal::Str("int".to_string()))]),
        ]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("empty"));
    }

    #[test]
    fn oversized_search_space_is_capped() {
        // Five integer variables over a 101-value domain blow the cap.
        let result = run(
            &["a + b + c + d + e == 0"],
            &[
                ("a", "int"),
                ("b", "int"),
                ("c", "int"),
                ("d", "int"),
                ("e", "int"),
            ],
        );
        assert!(!result.success);
        assert!(result.error.unwrap().contains("search space"));
    }
}
