//! Basic arithmetic capability.
//!
//! Shape: `calculator(operation: String, operands: List<Number>)` with
//! operations add, subtract, multiply, divide, percentage and ratio.

use super::{expect_numbers, Capability};
use mathdesk_common::{Literal, ToolName, ToolResult};

pub struct Calculator;

impl Capability for Calculator {
    fn name(&self) -> ToolName {
        ToolName::Calculator
    }

    fn execute(&self, arguments: &[Literal]) -> ToolResult {
        if arguments.len() != 2 {
            return ToolResult::fail(format!(
                "calculator expects (operation, operands), got {} argument(s)",
                arguments.len()
            ));
        }
        let operation = match arguments[0].as_str() {
            Some(op) => op,
            None => {
                return ToolResult::fail(format!(
                    "operation must be a string, got {}",
                    arguments[0].type_name()
                ))
            }
        };
        let operands = match expect_numbers(&arguments[1]) {
            Ok(operands) => operands,
            Err(e) => return ToolResult::fail(e),
        };
        if operands.is_empty() {
            return ToolResult::fail("no operands provided");
        }

        match apply(operation, &operands) {
            Ok(value) => ToolResult::ok(value).with_metadata("operation", operation),
            Err(e) => ToolResult::fail(e),
        }
    }
}

fn apply(operation: &str, operands: &[f64]) -> Result<Literal, String> {
    match operation {
        "add" => Ok(Literal::Number(operands.iter().sum())),
        "subtract" => {
            if operands.len() < 2 {
                return Err("subtract requires at least 2 operands".to_string());
            }
            Ok(Literal::Number(
                operands[1..].iter().fold(operands[0], |acc, x| acc - x),
            ))
        }
        "multiply" => Ok(Literal::Number(operands.iter().product())),
        "divide" => {
            if operands.len() < 2 {
                return Err("divide requires at least 2 operands".to_string());
            }
            if operands[1..].iter().any(|&x| x == 0.0) {
                return Err("division by zero".to_string());
            }
            Ok(Literal::Number(
                operands[1..].iter().fold(operands[0], |acc, x| acc / x),
            ))
        }
        "percentage" => {
            if operands.len() != 2 {
                return Err("percentage requires exactly 2 operands".to_string());
            }
            Ok(Literal::Number((operands[0] / 100.0) * operands[1]))
        }
        "ratio" => {
            if operands.len() < 2 {
                return Err("ratio requires at least 2 operands".to_string());
            }
            let ints: Vec<i64> = operands.iter().map(|&x| x as i64).collect();
            let common = ints.iter().fold(0i64, |acc, &x| gcd(acc, x.abs()));
            if common == 0 {
                return Err("ratio of all-zero operands is undefined".to_string());
            }
            let simplified: Vec<String> = ints.iter().map(|&x| (x / common).to_string()).collect();
            Ok(Literal::Str(simplified.join(":")))
        }
        other => Err(format!("unknown operation: {}", other)),
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(operation: &str, operands: &[f64]) -> ToolResult {
        Calculator.execute(&[
            Literal::Str(operation.to_string()),
            Literal::List(operands.iter().map(|&n| Literal::Number(n)).collect()),
        ])
    }

    #[test]
    fn arithmetic_operations() {
        assert_eq!(
            run("add", &[1.0, 2.0, 3.0]).value,
            Some(Literal::Number(6.0))
        );
        assert_eq!(
            run("subtract", &[10.0, 3.0]).value,
            Some(Literal::Number(7.0))
        );
        assert_eq!(
            run("multiply", &[2.0, 3.0, 4.0]).value,
            Some(Literal::Number(24.0))
        );
        assert_eq!(
            run("divide", &[100.0, 5.0, 2.0]).value,
            Some(Literal::Number(10.0))
        );
    }

    #[test]
    fn percentage_and_ratio() {
        let pct = run("percentage", &[25.0, 200.0]);
        assert_relative_eq!(pct.value.unwrap().as_number().unwrap(), 50.0);
        assert_eq!(
            run("ratio", &[12.0, 8.0]).value,
            Some(Literal::Str("3:2".to_string()))
        );
    }

    #[test]
    fn division_by_zero_fails() {
        let result = run("divide", &[1.0, 0.0]);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("division by zero"));
    }

    #[test]
    fn unknown_operation_fails() {
        let result = run("modulo", &[1.0, 2.0]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("unknown operation"));
    }

    #[test]
    fn empty_operands_fail() {
        let result = run("add", &[]);
        assert!(!result.success);
    }

    #[test]
    fn wrong_arity_fails() {
        let result = Calculator.execute(&[Literal::Str("add".to_string())]);
        assert!(!result.success);
        assert!(result.error.unwrap().contains("calculator expects"));
    }
}
