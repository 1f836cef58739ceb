//! Restricted expression grammar for equation, constraint and objective
//! text.
//!
//! This is the closed replacement for evaluating solver input strings as
//! code: a tokenizer plus recursive-descent parser over arithmetic
//! (`+ - * / **`), comparisons (`== != < <= > >=`, with a single `=`
//! accepted as equality in equation text), boolean connectives
//! (`and`/`or`/`not`, also `&& || !`) and parentheses. Identifiers must
//! come from the declared variable set; anything else is a parse error.
//! There is no function-call syntax and no way to reach code from here.

use crate::error::ExprError;
use std::collections::HashMap;

/// A value produced by evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Num(f64),
    Bool(bool),
}

impl Value {
    fn num(self) -> Result<f64, ExprError> {
        match self {
            Value::Num(n) => Ok(n),
            Value::Bool(_) => Err(ExprError::new("expected a number, found a boolean")),
        }
    }

    fn boolean(self) -> Result<bool, ExprError> {
        match self {
            Value::Bool(b) => Ok(b),
            Value::Num(_) => Err(ExprError::new("expected a boolean, found a number")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Bool(bool),
    Var(String),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    Logic(BoolOp, Box<Expr>, Box<Expr>),
}

/// Comparison tolerance for `==`/`!=` over floats.
const EQ_EPSILON: f64 = 1e-9;

impl Expr {
    /// Parse `text` against the declared variable set.
    pub fn parse(text: &str, variables: &[String]) -> Result<Expr, ExprError> {
        let tokens = tokenize(text)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            variables,
        };
        let expr = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(ExprError::new(format!(
                "unexpected trailing input in expression '{}'",
                text
            )));
        }
        Ok(expr)
    }

    /// Evaluate under the given variable bindings.
    pub fn eval(&self, bindings: &HashMap<String, Value>) -> Result<Value, ExprError> {
        match self {
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Var(name) => bindings
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::new(format!("unbound variable '{}'", name))),
            Expr::Neg(inner) => Ok(Value::Num(-inner.eval(bindings)?.num()?)),
            Expr::Not(inner) => Ok(Value::Bool(!inner.eval(bindings)?.boolean()?)),
            Expr::Bin(op, lhs, rhs) => {
                let l = lhs.eval(bindings)?.num()?;
                let r = rhs.eval(bindings)?.num()?;
                let result = match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(ExprError::new("division by zero"));
                        }
                        l / r
                    }
                    BinOp::Pow => l.powf(r),
                };
                Ok(Value::Num(result))
            }
            Expr::Cmp(op, lhs, rhs) => {
                let l = lhs.eval(bindings)?;
                let r = rhs.eval(bindings)?;
                match (l, r) {
                    (Value::Bool(a), Value::Bool(b)) => match op {
                        CmpOp::Eq => Ok(Value::Bool(a == b)),
                        CmpOp::Ne => Ok(Value::Bool(a != b)),
                        _ => Err(ExprError::new("booleans only support == and !=")),
                    },
                    (l, r) => {
                        let a = l.num()?;
                        let b = r.num()?;
                        let result = match op {
                            CmpOp::Eq => (a - b).abs() <= EQ_EPSILON,
                            CmpOp::Ne => (a - b).abs() > EQ_EPSILON,
                            CmpOp::Lt => a < b,
                            CmpOp::Le => a <= b,
                            CmpOp::Gt => a > b,
                            CmpOp::Ge => a >= b,
                        };
                        Ok(Value::Bool(result))
                    }
                }
            }
            Expr::Logic(op, lhs, rhs) => {
                let l = lhs.eval(bindings)?.boolean()?;
                // Both sides are evaluated; short-circuiting would hide
                // type errors in the right operand.
                let r = rhs.eval(bindings)?.boolean()?;
                Ok(Value::Bool(match op {
                    BoolOp::And => l && r,
                    BoolOp::Or => l || r,
                }))
            }
        }
    }

    /// Extract linear form `sum(coeff_i * var_i) + constant`, or `None`
    /// if the expression is not linear in its variables.
    pub fn linear_coefficients(&self) -> Option<(HashMap<String, f64>, f64)> {
        match self {
            Expr::Num(n) => Some((HashMap::new(), *n)),
            Expr::Var(name) => {
                let mut coeffs = HashMap::new();
                coeffs.insert(name.clone(), 1.0);
                Some((coeffs, 0.0))
            }
            Expr::Neg(inner) => {
                let (mut coeffs, constant) = inner.linear_coefficients()?;
                for v in coeffs.values_mut() {
                    *v = -*v;
                }
                Some((coeffs, -constant))
            }
            Expr::Bin(BinOp::Add, lhs, rhs) | Expr::Bin(BinOp::Sub, lhs, rhs) => {
                let sign = if matches!(self, Expr::Bin(BinOp::Sub, _, _)) {
                    -1.0
                } else {
                    1.0
                };
                let (mut coeffs, mut constant) = lhs.linear_coefficients()?;
                let (rhs_coeffs, rhs_constant) = rhs.linear_coefficients()?;
                for (name, c) in rhs_coeffs {
                    *coeffs.entry(name).or_insert(0.0) += sign * c;
                }
                constant += sign * rhs_constant;
                Some((coeffs, constant))
            }
            Expr::Bin(BinOp::Mul, lhs, rhs) => {
                let (l_coeffs, l_constant) = lhs.linear_coefficients()?;
                let (r_coeffs, r_constant) = rhs.linear_coefficients()?;
                if l_coeffs.is_empty() {
                    let mut coeffs = r_coeffs;
                    for v in coeffs.values_mut() {
                        *v *= l_constant;
                    }
                    Some((coeffs, l_constant * r_constant))
                } else if r_coeffs.is_empty() {
                    let mut coeffs = l_coeffs;
                    for v in coeffs.values_mut() {
                        *v *= r_constant;
                    }
                    Some((coeffs, l_constant * r_constant))
                } else {
                    None
                }
            }
            Expr::Bin(BinOp::Div, lhs, rhs) => {
                let (coeffs, constant) = lhs.linear_coefficients()?;
                let (r_coeffs, r_constant) = rhs.linear_coefficients()?;
                if !r_coeffs.is_empty() || r_constant == 0.0 {
                    return None;
                }
                let mut coeffs = coeffs;
                for v in coeffs.values_mut() {
                    *v /= r_constant;
                }
                Some((coeffs, constant / r_constant))
            }
            Expr::Bin(BinOp::Pow, lhs, rhs) => {
                let (l_coeffs, l_constant) = lhs.linear_coefficients()?;
                let (r_coeffs, r_constant) = rhs.linear_coefficients()?;
                if l_coeffs.is_empty() && r_coeffs.is_empty() {
                    Some((HashMap::new(), l_constant.powf(r_constant)))
                } else {
                    None
                }
            }
            Expr::Bool(_) | Expr::Not(_) | Expr::Cmp(..) | Expr::Logic(..) => None,
        }
    }

    /// Dense polynomial coefficients (ascending degree) in a single
    /// variable, or `None` if the expression mentions another variable or
    /// is not polynomial. Degree is capped at 8.
    pub fn univariate_poly(&self, var: &str) -> Option<Vec<f64>> {
        const MAX_DEGREE: usize = 8;
        match self {
            Expr::Num(n) => Some(vec![*n]),
            Expr::Var(name) => {
                if name == var {
                    Some(vec![0.0, 1.0])
                } else {
                    None
                }
            }
            Expr::Neg(inner) => {
                let mut poly = inner.univariate_poly(var)?;
                for c in &mut poly {
                    *c = -*c;
                }
                Some(poly)
            }
            Expr::Bin(BinOp::Add, lhs, rhs) | Expr::Bin(BinOp::Sub, lhs, rhs) => {
                let sign = if matches!(self, Expr::Bin(BinOp::Sub, _, _)) {
                    -1.0
                } else {
                    1.0
                };
                let mut l = lhs.univariate_poly(var)?;
                let r = rhs.univariate_poly(var)?;
                if r.len() > l.len() {
                    l.resize(r.len(), 0.0);
                }
                for (i, c) in r.into_iter().enumerate() {
                    l[i] += sign * c;
                }
                Some(l)
            }
            Expr::Bin(BinOp::Mul, lhs, rhs) => {
                let l = lhs.univariate_poly(var)?;
                let r = rhs.univariate_poly(var)?;
                convolve(&l, &r, MAX_DEGREE)
            }
            Expr::Bin(BinOp::Div, lhs, rhs) => {
                let l = lhs.univariate_poly(var)?;
                let r = rhs.univariate_poly(var)?;
                if r.len() != 1 || r[0] == 0.0 {
                    return None;
                }
                Some(l.into_iter().map(|c| c / r[0]).collect())
            }
            Expr::Bin(BinOp::Pow, lhs, rhs) => {
                let base = lhs.univariate_poly(var)?;
                let exponent = rhs.univariate_poly(var)?;
                if exponent.len() != 1 {
                    return None;
                }
                let e = exponent[0];
                if e < 0.0 || e.fract() != 0.0 || e > MAX_DEGREE as f64 {
                    return None;
                }
                let mut result = vec![1.0];
                for _ in 0..(e as usize) {
                    result = convolve(&result, &base, MAX_DEGREE)?;
                }
                Some(result)
            }
            Expr::Bool(_) | Expr::Not(_) | Expr::Cmp(..) | Expr::Logic(..) => None,
        }
    }
}

fn convolve(a: &[f64], b: &[f64], max_degree: usize) -> Option<Vec<f64>> {
    if a.len() + b.len() > max_degree + 2 {
        return None;
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    Some(out)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Pow,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    True,
    False,
}

fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Pow);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Pow);
                i += 1;
            }
            '=' => {
                // '==' and a lone '=' both mean equality; equation text
                // routinely uses the single form.
                if chars.get(i + 1) == Some(&'=') {
                    i += 2;
                } else {
                    i += 1;
                }
                tokens.push(Token::Eq);
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ne);
                    i += 2;
                } else {
                    tokens.push(Token::Not);
                    i += 1;
                }
            }
            '<' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Le);
                    i += 2;
                } else {
                    tokens.push(Token::Lt);
                    i += 1;
                }
            }
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Ge);
                    i += 2;
                } else {
                    tokens.push(Token::Gt);
                    i += 1;
                }
            }
            '&' => {
                if chars.get(i + 1) == Some(&'&') {
                    tokens.push(Token::And);
                    i += 2;
                } else {
                    return Err(ExprError::new("single '&' is not a valid operator"));
                }
            }
            '|' => {
                if chars.get(i + 1) == Some(&'|') {
                    tokens.push(Token::Or);
                    i += 2;
                } else {
                    return Err(ExprError::new("single '|' is not a valid operator"));
                }
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                let n = token
                    .parse::<f64>()
                    .map_err(|_| ExprError::new(format!("malformed number '{}'", token)))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.as_str() {
                    "and" | "And" => Token::And,
                    "or" | "Or" => Token::Or,
                    "not" | "Not" => Token::Not,
                    "true" | "True" => Token::True,
                    "false" | "False" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            c => {
                return Err(ExprError::new(format!(
                    "unexpected character '{}' in expression",
                    c
                )));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    variables: &'a [String],
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Logic(BoolOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_not()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not()?;
            lhs = Expr::Logic(BoolOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Not) {
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let lhs = self.parse_additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::Ne) => CmpOp::Ne,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_additive()?;
        Ok(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)))
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            if self.eat(&Token::Plus) {
                let rhs = self.parse_multiplicative()?;
                lhs = Expr::Bin(BinOp::Add, Box::new(lhs), Box::new(rhs));
            } else if self.eat(&Token::Minus) {
                let rhs = self.parse_multiplicative()?;
                lhs = Expr::Bin(BinOp::Sub, Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            if self.eat(&Token::Star) {
                let rhs = self.parse_unary()?;
                lhs = Expr::Bin(BinOp::Mul, Box::new(lhs), Box::new(rhs));
            } else if self.eat(&Token::Slash) {
                let rhs = self.parse_unary()?;
                lhs = Expr::Bin(BinOp::Div, Box::new(lhs), Box::new(rhs));
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Minus) {
            let inner = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        if self.eat(&Token::Plus) {
            return self.parse_unary();
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_atom()?;
        if self.eat(&Token::Pow) {
            // Right associative, and unary minus binds below power as in
            // the usual mathematical convention.
            let exponent = self.parse_unary()?;
            return Ok(Expr::Bin(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Expr, ExprError> {
        match self.peek().cloned() {
            Some(Token::Num(n)) => {
                self.pos += 1;
                Ok(Expr::Num(n))
            }
            Some(Token::True) => {
                self.pos += 1;
                Ok(Expr::Bool(true))
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Expr::Bool(false))
            }
            Some(Token::Ident(name)) => {
                if !self.variables.iter().any(|v| v == &name) {
                    return Err(ExprError::new(format!(
                        "identifier '{}' is not a declared variable",
                        name
                    )));
                }
                self.pos += 1;
                Ok(Expr::Var(name))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                if !self.eat(&Token::RParen) {
                    return Err(ExprError::new("expected closing parenthesis"));
                }
                Ok(inner)
            }
            Some(token) => Err(ExprError::new(format!(
                "unexpected token {:?} in expression",
                token
            ))),
            None => Err(ExprError::new("unexpected end of expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn num_bindings(pairs: &[(&str, f64)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Num(*v)))
            .collect()
    }

    #[test]
    fn evaluates_arithmetic() {
        let expr = Expr::parse("2*x + 3*y - 12", &vars(&["x", "y"])).unwrap();
        let result = expr.eval(&num_bindings(&[("x", 3.0), ("y", 2.0)])).unwrap();
        assert_eq!(result, Value::Num(0.0));
    }

    #[test]
    fn evaluates_comparisons_and_connectives() {
        let expr = Expr::parse("x + y >= 10 and x < 7", &vars(&["x", "y"])).unwrap();
        assert_eq!(
            expr.eval(&num_bindings(&[("x", 4.0), ("y", 8.0)])).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            expr.eval(&num_bindings(&[("x", 9.0), ("y", 8.0)])).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn evaluates_boolean_variables() {
        let expr = Expr::parse("a or b", &vars(&["a", "b"])).unwrap();
        let mut bindings = HashMap::new();
        bindings.insert("a".to_string(), Value::Bool(false));
        bindings.insert("b".to_string(), Value::Bool(true));
        assert_eq!(expr.eval(&bindings).unwrap(), Value::Bool(true));

        let negated = Expr::parse("not (a and b)", &vars(&["a", "b"])).unwrap();
        assert_eq!(negated.eval(&bindings).unwrap(), Value::Bool(true));
    }

    #[test]
    fn rejects_undeclared_identifiers() {
        let err = Expr::parse("x + os", &vars(&["x"])).unwrap_err();
        assert!(err.message.contains("not a declared variable"));
    }

    #[test]
    fn rejects_call_syntax() {
        assert!(Expr::parse("x(1)", &vars(&["x"])).is_err());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let expr = Expr::parse("1 / x", &vars(&["x"])).unwrap();
        assert!(expr.eval(&num_bindings(&[("x", 0.0)])).is_err());
    }

    #[test]
    fn linear_extraction() {
        let expr = Expr::parse("2*x + 3*y - 12", &vars(&["x", "y"])).unwrap();
        let (coeffs, constant) = expr.linear_coefficients().unwrap();
        assert_eq!(coeffs.get("x"), Some(&2.0));
        assert_eq!(coeffs.get("y"), Some(&3.0));
        assert_eq!(constant, -12.0);
    }

    #[test]
    fn nonlinear_is_not_linear() {
        let expr = Expr::parse("x * y", &vars(&["x", "y"])).unwrap();
        assert!(expr.linear_coefficients().is_none());
    }

    #[test]
    fn quadratic_poly_extraction() {
        let expr = Expr::parse("x**2 - 4", &vars(&["x"])).unwrap();
        let poly = expr.univariate_poly("x").unwrap();
        assert_eq!(poly, vec![-4.0, 0.0, 1.0]);
    }

    #[test]
    fn single_equals_means_equality() {
        let expr = Expr::parse("x + 5 = 10", &vars(&["x"])).unwrap();
        assert!(matches!(expr, Expr::Cmp(CmpOp::Eq, _, _)));
    }
}
