//! Algebraic equation capability.
//!
//! Shape: `algebra_solver(equations: List<String>, variables:
//! List<String>)`. Equation text goes through the restricted expression
//! grammar only — `lhs = rhs` or a bare expression taken as `= 0`. The
//! built-in backend covers linear systems (Gaussian elimination) and
//! single-variable polynomials up to degree two; anything past that is
//! reported as a capability error rather than pulled in as a dependency.

use super::{expect_strings, Capability};
use mathdesk_common::expr::{BinOp, CmpOp};
use mathdesk_common::{Expr, Literal, ToolName, ToolResult};

const PIVOT_EPSILON: f64 = 1e-12;

pub struct AlgebraSolver;

impl Capability for AlgebraSolver {
    fn name(&self) -> ToolName {
        ToolName::AlgebraSolver
    }

    fn execute(&self, arguments: &[Literal]) -> ToolResult {
        if arguments.len() != 2 {
            return ToolResult::fail(format!(
                "algebra_solver expects (equations, variables), got {} argument(s)",
                arguments.len()
            ));
        }
        let equations = match expect_strings(&arguments[0]) {
            Ok(equations) => equations,
            Err(e) => return ToolResult::fail(e),
        };
        let variables = match expect_strings(&arguments[1]) {
            Ok(variables) => variables,
            Err(e) => return ToolResult::fail(e),
        };
        if equations.is_empty() {
            return ToolResult::fail("no equations provided");
        }
        if variables.is_empty() {
            return ToolResult::fail("no variables specified");
        }

        // Each equation becomes a single expression equal to zero.
        let mut zero_forms = Vec::with_capacity(equations.len());
        for text in &equations {
            match to_zero_form(text, &variables) {
                Ok(expr) => zero_forms.push(expr),
                Err(e) => {
                    return ToolResult::fail(format!("failed to parse equation '{}': {}", text, e))
                }
            }
        }

        if let Some(result) = solve_linear_system(&zero_forms, &variables) {
            return match result {
                Ok(assignment) => ToolResult::ok(Literal::Mapping(assignment))
                    .with_metadata("method", "gaussian_elimination"),
                Err(e) => ToolResult::fail(e),
            };
        }

        if zero_forms.len() == 1 && variables.len() == 1 {
            return match solve_univariate(&zero_forms[0], &variables[0]) {
                Ok(roots) => {
                    ToolResult::ok(Literal::List(roots.into_iter().map(Literal::Number).collect()))
                        .with_metadata("method", "polynomial")
                }
                Err(e) => ToolResult::fail(e),
            };
        }

        ToolResult::fail(
            "only linear systems and single-variable polynomials up to degree 2 are supported",
        )
    }
}

/// Rewrite `lhs = rhs` as `lhs - rhs`; a bare expression is already a
/// zero form. Inequalities are not equations.
fn to_zero_form(text: &str, variables: &[String]) -> Result<Expr, String> {
    let expr = Expr::parse(text, variables).map_err(|e| e.message)?;
    match expr {
        Expr::Cmp(CmpOp::Eq, lhs, rhs) => Ok(Expr::Bin(BinOp::Sub, lhs, rhs)),
        Expr::Cmp(..) | Expr::Logic(..) | Expr::Not(_) | Expr::Bool(_) => {
            Err("an equation must use '=', not inequalities or connectives".to_string())
        }
        other => Ok(other),
    }
}

/// Attempt the linear path. Returns `None` when any equation is
/// nonlinear, deferring to the polynomial path.
fn solve_linear_system(
    zero_forms: &[Expr],
    variables: &[String],
) -> Option<Result<Vec<(String, Literal)>, String>> {
    let mut rows = Vec::with_capacity(zero_forms.len());
    for expr in zero_forms {
        let (coeffs, constant) = expr.linear_coefficients()?;
        let mut row: Vec<f64> = variables
            .iter()
            .map(|v| coeffs.get(v).copied().unwrap_or(0.0))
            .collect();
        // a·x + c = 0  =>  a·x = -c
        row.push(-constant);
        rows.push(row);
    }

    if zero_forms.len() != variables.len() {
        return Some(Err(format!(
            "linear solving needs as many equations as variables ({} equations, {} variables)",
            zero_forms.len(),
            variables.len()
        )));
    }

    Some(gaussian_elimination(rows, variables))
}

fn gaussian_elimination(
    mut rows: Vec<Vec<f64>>,
    variables: &[String],
) -> Result<Vec<(String, Literal)>, String> {
    let n = variables.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| {
                rows[a][col]
                    .abs()
                    .partial_cmp(&rows[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if rows[pivot_row][col].abs() < PIVOT_EPSILON {
            return Err("system has no unique solution".to_string());
        }
        rows.swap(col, pivot_row);
        let pivot = rows[col][col];
        for k in col..=n {
            rows[col][k] /= pivot;
        }
        for r in 0..n {
            if r != col {
                let factor = rows[r][col];
                for k in col..=n {
                    rows[r][k] -= factor * rows[col][k];
                }
            }
        }
    }

    Ok(variables
        .iter()
        .enumerate()
        .map(|(i, v)| (v.clone(), Literal::Number(clean(rows[i][n]))))
        .collect())
}

fn solve_univariate(zero_form: &Expr, variable: &str) -> Result<Vec<f64>, String> {
    let mut poly = zero_form.univariate_poly(variable).ok_or_else(|| {
        "only linear systems and single-variable polynomials up to degree 2 are supported"
            .to_string()
    })?;
    while poly.len() > 1 && poly.last().is_some_and(|c| c.abs() < PIVOT_EPSILON) {
        poly.pop();
    }
    match poly.len() {
        0 | 1 => Err("the equation does not involve the variable".to_string()),
        2 => Ok(vec![clean(-poly[0] / poly[1])]),
        3 => {
            let (c, b, a) = (poly[0], poly[1], poly[2]);
            let discriminant = b * b - 4.0 * a * c;
            if discriminant < 0.0 {
                return Err("no real solution".to_string());
            }
            let sqrt_d = discriminant.sqrt();
            let mut roots = vec![(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)];
            roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            roots.dedup_by(|a, b| (*a - *b).abs() < PIVOT_EPSILON);
            Ok(roots.into_iter().map(clean).collect())
        }
        _ => Err("polynomials above degree 2 are not supported".to_string()),
    }
}

/// Snap values that are within float noise of an integer.
fn clean(x: f64) -> f64 {
    let rounded = x.round();
    if (x - rounded).abs() < 1e-9 {
        rounded
    } else {
        x
    }
}
