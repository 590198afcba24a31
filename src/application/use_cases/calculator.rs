use crate::domain::DomainError;

const ALLOWED: &str = "0123456789.+-*/() ";

/// Parentheses and unary signs deeper than this are rejected.
const MAX_DEPTH: usize = 64;

/// Evaluates a plain arithmetic expression and rounds the result to two
/// decimals, the precision the `calculate` tool reports.
pub fn calculate(expression: &str) -> Result<f64, DomainError> {
    let value = evaluate(expression)?;
    Ok((value * 100.0).round() / 100.0)
}

/// Evaluates `+ - * /` with parentheses, unary signs and decimal literals.
pub fn evaluate(expression: &str) -> Result<f64, DomainError> {
    if let Some(c) = expression.chars().find(|c| !ALLOWED.contains(*c)) {
        return Err(DomainError::invalid_input(format!(
            "Invalid character '{}' in expression",
            c
        )));
    }

    let tokens: Vec<u8> = expression.bytes().filter(|b| *b != b' ').collect();
    if tokens.is_empty() {
        return Err(DomainError::invalid_input("Empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(DomainError::invalid_input(format!(
            "Unexpected '{}' at position {}",
            parser.tokens[parser.pos] as char, parser.pos
        )));
    }
    if !value.is_finite() {
        return Err(DomainError::invalid_input("Result is not a finite number"));
    }
    Ok(value)
}

struct Parser {
    tokens: Vec<u8>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<u8> {
        self.tokens.get(self.pos).copied()
    }

    fn expr(&mut self) -> Result<f64, DomainError> {
        let mut value = self.term()?;
        while let Some(op @ (b'+' | b'-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            if op == b'+' {
                value += rhs;
            } else {
                value -= rhs;
            }
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, DomainError> {
        let mut value = self.factor()?;
        while let Some(op @ (b'*' | b'/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor()?;
            if op == b'*' {
                value *= rhs;
            } else if rhs == 0.0 {
                return Err(DomainError::invalid_input("Division by zero"));
            } else {
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, DomainError> {
        if self.depth >= MAX_DEPTH {
            return Err(DomainError::invalid_input("Expression nested too deeply"));
        }
        self.depth += 1;
        let value = self.nested_factor();
        self.depth -= 1;
        value
    }

    fn nested_factor(&mut self) -> Result<f64, DomainError> {
        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(b'(') => {
                self.pos += 1;
                let value = self.expr()?;
                if self.peek() != Some(b')') {
                    return Err(DomainError::invalid_input("Missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(b) if b.is_ascii_digit() || b == b'.' => self.number(),
            Some(b) => Err(DomainError::invalid_input(format!(
                "Unexpected '{}' at position {}",
                b as char, self.pos
            ))),
            None => Err(DomainError::invalid_input("Unexpected end of expression")),
        }
    }

    fn number(&mut self) -> Result<f64, DomainError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit() || b == b'.') {
            self.pos += 1;
        }
        let literal = String::from_utf8_lossy(&self.tokens[start..self.pos]);
        literal
            .parse::<f64>()
            .map_err(|_| DomainError::invalid_input(format!("Invalid number '{}'", literal)))
    }
}
