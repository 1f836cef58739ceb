//! Typed literal values.
//!
//! A `Literal` is the only value shape that crosses the boundary between
//! generated text and tool capabilities. Literals are produced exclusively
//! by the safe argument parser; there is no constructor that evaluates
//! text as code.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::fmt;

/// A parsed literal value: number, string, boolean, null, list or mapping.
///
/// Mappings preserve insertion order (they are pair vectors, not hash
/// maps) so that canonical rendering is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    List(Vec<Literal>),
    Mapping(Vec<(String, Literal)>),
}

impl Literal {
    /// Short type label used in capability error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Number(_) => "number",
            Literal::Str(_) => "string",
            Literal::Bool(_) => "boolean",
            Literal::Null => "null",
            Literal::List(_) => "list",
            Literal::Mapping(_) => "mapping",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Literal::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, Literal)]> {
        match self {
            Literal::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Look up a key in a mapping literal.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.as_mapping()
            .and_then(|pairs| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    // Integral values render without a trailing ".0" so that parse/render
    // round-trips the common integer case.
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for Literal {
    /// Canonical literal rendering: the output is itself valid input for
    /// the argument parser.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write_number(f, *n),
            Literal::Str(s) => write_escaped(f, s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Literal::Mapping(pairs) => {
                f.write_str("{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_escaped(f, k)?;
                    f.write_str(": ")?;
                    write!(f, "{}", v)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Serialize for Literal {
    /// Serializes to the natural JSON shape (mappings become objects),
    /// used when traces are exported or logged.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Literal::Number(n) => serializer.serialize_f64(*n),
            Literal::Str(s) => serializer.serialize_str(s),
            Literal::Bool(b) => serializer.serialize_bool(*b),
            Literal::Null => serializer.serialize_none(),
            Literal::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Literal::Mapping(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_integral_number_has_no_fraction() {
        assert_eq!(Literal::Number(6.0).to_string(), "6");
        assert_eq!(Literal::Number(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn display_escapes_strings() {
        let lit = Literal::Str("a \"b\"\nc".to_string());
        assert_eq!(lit.to_string(), "\"a \\\"b\\\"\\nc\"");
    }

    #[test]
    fn display_nested_collections() {
        let lit = Literal::List(vec![
            Literal::Str("add".to_string()),
            Literal::List(vec![Literal::Number(1.0), Literal::Number(2.0)]),
            Literal::Mapping(vec![("x".to_string(), Literal::Bool(true))]),
        ]);
        assert_eq!(lit.to_string(), "[\"add\", [1, 2], {\"x\": true}]");
    }

    #[test]
    fn serializes_to_natural_json() {
        let lit = Literal::Mapping(vec![
            ("op".to_string(), Literal::Str("add".to_string())),
            (
                "operands".to_string(),
                Literal::List(vec![Literal::Number(1.0), Literal::Number(2.5)]),
            ),
            ("exact".to_string(), Literal::Null),
        ]);
        assert_eq!(
            serde_json::to_string(&lit).unwrap(),
            "{\"op\":\"add\",\"operands\":[1.0,2.5],\"exact\":null}"
        );
    }

    #[test]
    fn mapping_lookup() {
        let lit = Literal::Mapping(vec![
            ("x".to_string(), Literal::Number(1.0)),
            ("y".to_string(), Literal::Number(2.0)),
        ]);
        assert_eq!(lit.get("y"), Some(&Literal::Number(2.0)));
        assert_eq!(lit.get("z"), None);
    }
}
