//! Relational operators of dependency expressions

use std::fmt;
use thiserror::Error;

/// Comparison operators for versioned dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Less than (<)
    Less,
    /// Less than or equal (<=)
    LessEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Greater than (>)
    Greater,
}

#[derive(Error, Debug)]
#[error("Invalid operator: {0}")]
pub struct InvalidOperatorError(pub String);

impl Operator {
    /// Parse operator from string
    pub fn parse(s: &str) -> Result<Self, InvalidOperatorError> {
        match s {
            "<" => Ok(Operator::Less),
            "<=" | "=<" => Ok(Operator::LessEqual),
            "=" | "==" => Ok(Operator::Equal),
            ">=" | "=>" => Ok(Operator::GreaterEqual),
            ">" => Ok(Operator::Greater),
            _ => Err(InvalidOperatorError(s.to_string())),
        }
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::GreaterEqual => ">=",
            Operator::Greater => ">",
        }
    }

    pub fn has_less(&self) -> bool {
        matches!(self, Operator::Less | Operator::LessEqual)
    }

    pub fn has_equal(&self) -> bool {
        matches!(self, Operator::LessEqual | Operator::Equal | Operator::GreaterEqual)
    }

    pub fn has_greater(&self) -> bool {
        matches!(self, Operator::Greater | Operator::GreaterEqual)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operator() {
        assert_eq!(Operator::parse(">=").unwrap(), Operator::GreaterEqual);
        assert_eq!(Operator::parse("==").unwrap(), Operator::Equal);
        assert!(Operator::parse("!=").is_err());
    }

    #[test]
    fn test_operator_flags() {
        assert!(Operator::LessEqual.has_less() && Operator::LessEqual.has_equal());
        assert!(!Operator::Greater.has_equal());
        assert!(Operator::GreaterEqual.has_greater());
    }
}
