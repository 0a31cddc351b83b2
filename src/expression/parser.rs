//! Precedence-climbing parser producing the formula tree.

use super::functions::Function;
use super::lexer::{Spanned, Symbol, Token};
use super::{CONSTANTS, MAX_NESTING};
use crate::error::ExpressionError;

const PREC_AND: u32 = 120;
const PREC_OR: u32 = 125;
const PREC_NOT: u32 = 200;
const PREC_COMPARE: u32 = 250;
const PREC_ADD: u32 = 500;
const PREC_MUL: u32 = 1000;
const PREC_NEGATE: u32 = 5000;
const PREC_POW: u32 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

impl BinaryOp {
    fn from_symbol(symbol: Symbol) -> Option<BinaryOp> {
        let op = match symbol {
            Symbol::Plus => BinaryOp::Add,
            Symbol::Minus => BinaryOp::Sub,
            Symbol::Star => BinaryOp::Mul,
            Symbol::Slash => BinaryOp::Div,
            Symbol::Percent => BinaryOp::Rem,
            Symbol::Caret => BinaryOp::Pow,
            Symbol::Greater => BinaryOp::Greater,
            Symbol::GreaterEqual => BinaryOp::GreaterEqual,
            Symbol::Less => BinaryOp::Less,
            Symbol::LessEqual => BinaryOp::LessEqual,
            Symbol::EqualEqual => BinaryOp::Equal,
            Symbol::NotEqual => BinaryOp::NotEqual,
            Symbol::Ampersand => BinaryOp::And,
            Symbol::Pipe => BinaryOp::Or,
            Symbol::Tilde => return None,
        };
        Some(op)
    }

    fn precedence(self) -> u32 {
        match self {
            BinaryOp::And => PREC_AND,
            BinaryOp::Or => PREC_OR,
            BinaryOp::Greater
            | BinaryOp::GreaterEqual
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Equal
            | BinaryOp::NotEqual => PREC_COMPARE,
            BinaryOp::Add | BinaryOp::Sub => PREC_ADD,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => PREC_MUL,
            BinaryOp::Pow => PREC_POW,
        }
    }

    fn is_right_associative(self) -> bool {
        self == BinaryOp::Pow
    }
}

/// A node of the parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Variable(String),
    Unary(UnaryOp, Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

/// Parse a token stream into a formula tree.
///
/// Fails with `TooDeep` when the tree, or the parser's own recursion,
/// would nest more than [`MAX_NESTING`] levels.
pub(crate) fn parse(tokens: Vec<Spanned>) -> Result<Node, ExpressionError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        nesting: 0,
    };
    let (node, _) = parser.parse_binary(0)?;
    match parser.tokens.get(parser.pos) {
        None => Ok(node),
        Some(spanned) => Err(unexpected(spanned)),
    }
}

fn unexpected(spanned: &Spanned) -> ExpressionError {
    ExpressionError::UnexpectedToken {
        token: spanned.token.to_string(),
        offset: spanned.offset,
    }
}

fn too_deep() -> ExpressionError {
    ExpressionError::TooDeep { limit: MAX_NESTING }
}

/// Depth of a node whose deepest child has depth `child`.
fn deeper(child: usize) -> Result<usize, ExpressionError> {
    if child >= MAX_NESTING {
        return Err(too_deep());
    }
    Ok(child + 1)
}

/// Every `parse_*` step returns the node with its tree depth.
type Parsed = (Node, usize);

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Active `parse_binary` frames.
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|spanned| &spanned.token)
    }

    fn next(&mut self) -> Result<Spanned, ExpressionError> {
        let spanned = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(spanned)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ExpressionError> {
        let spanned = self.next()?;
        if spanned.token == expected {
            Ok(())
        } else {
            Err(unexpected(&spanned))
        }
    }

    fn parse_binary(&mut self, min_prec: u32) -> Result<Parsed, ExpressionError> {
        if self.nesting >= MAX_NESTING {
            return Err(too_deep());
        }
        self.nesting += 1;
        let (mut lhs, mut depth) = self.parse_prefix()?;

        while let Some(Token::Symbol(symbol)) = self.peek() {
            let Some(op) = BinaryOp::from_symbol(*symbol) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.pos += 1;
            let next_min = if op.is_right_associative() { prec } else { prec + 1 };
            let (rhs, rhs_depth) = self.parse_binary(next_min)?;
            depth = deeper(depth.max(rhs_depth))?;
            lhs = Node::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        self.nesting -= 1;
        Ok((lhs, depth))
    }

    fn parse_prefix(&mut self) -> Result<Parsed, ExpressionError> {
        let unary = match self.peek() {
            Some(Token::Symbol(Symbol::Minus)) => Some((UnaryOp::Negate, PREC_NEGATE)),
            Some(Token::Symbol(Symbol::Plus)) => Some((UnaryOp::Plus, PREC_NEGATE)),
            Some(Token::Symbol(Symbol::Tilde)) => Some((UnaryOp::Not, PREC_NOT)),
            _ => None,
        };
        if let Some((op, prec)) = unary {
            self.pos += 1;
            let (operand, depth) = self.parse_binary(prec)?;
            return Ok((Node::Unary(op, Box::new(operand)), deeper(depth)?));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Parsed, ExpressionError> {
        let spanned = self.next()?;
        match spanned.token {
            Token::Number(value) => Ok((Node::Number(value), 1)),
            Token::LeftParen => {
                let inner = self.parse_binary(0)?;
                self.expect(Token::RightParen)?;
                Ok(inner)
            }
            Token::Ident(name) => self.parse_identifier(name),
            _ => Err(unexpected(&spanned)),
        }
    }

    fn parse_identifier(&mut self, name: String) -> Result<Parsed, ExpressionError> {
        if self.peek() == Some(&Token::LeftParen) {
            let function =
                Function::lookup(&name).ok_or_else(|| ExpressionError::UnknownFunction(name.clone()))?;
            self.pos += 1;
            let (args, depth) = self.parse_arguments()?;
            if args.len() != function.arity() {
                return Err(ExpressionError::WrongArgumentCount {
                    name,
                    expected: function.arity(),
                    found: args.len(),
                });
            }
            return Ok((Node::Call(function, args), deeper(depth)?));
        }

        match Function::lookup(&name) {
            Some(function) if function.arity() == 0 => return Ok((Node::Call(function, Vec::new()), 1)),
            Some(function) => {
                return Err(ExpressionError::WrongArgumentCount {
                    name,
                    expected: function.arity(),
                    found: 0,
                })
            }
            None => {}
        }

        match CONSTANTS.iter().find(|(constant, _)| *constant == name) {
            Some(&(_, value)) => Ok((Node::Number(value), 1)),
            None => Ok((Node::Variable(name), 1)),
        }
    }

    /// Parse `arg (, arg)* )` after the opening parenthesis, returning the
    /// arguments and the depth of the deepest one.
    fn parse_arguments(&mut self) -> Result<(Vec<Node>, usize), ExpressionError> {
        let mut args = Vec::new();
        let mut depth = 0;
        if self.peek() == Some(&Token::RightParen) {
            self.pos += 1;
            return Ok((args, depth));
        }
        loop {
            let (arg, arg_depth) = self.parse_binary(0)?;
            args.push(arg);
            depth = depth.max(arg_depth);
            let spanned = self.next()?;
            match spanned.token {
                Token::Comma => continue,
                Token::RightParen => return Ok((args, depth)),
                _ => return Err(unexpected(&spanned)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn tree(source: &str) -> Node {
        parse(tokenize(source).unwrap()).unwrap()
    }

    fn num(value: f64) -> Box<Node> {
        Box::new(Node::Number(value))
    }

    #[test]
    fn test_multiplication_binds_tighter() {
        assert_eq!(
            tree("1+2*3"),
            Node::Binary(
                BinaryOp::Add,
                num(1.0),
                Box::new(Node::Binary(BinaryOp::Mul, num(2.0), num(3.0)))
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(
            tree("2^3^2"),
            Node::Binary(
                BinaryOp::Pow,
                num(2.0),
                Box::new(Node::Binary(BinaryOp::Pow, num(3.0), num(2.0)))
            )
        );
    }

    #[test]
    fn test_negation_binds_looser_than_power() {
        assert_eq!(
            tree("-2^2"),
            Node::Unary(
                UnaryOp::Negate,
                Box::new(Node::Binary(BinaryOp::Pow, num(2.0), num(2.0)))
            )
        );
    }

    #[test]
    fn test_not_binds_looser_than_comparison() {
        assert_eq!(
            tree("~1>2"),
            Node::Unary(
                UnaryOp::Not,
                Box::new(Node::Binary(BinaryOp::Greater, num(1.0), num(2.0)))
            )
        );
    }

    #[test]
    fn test_zero_argument_function_without_parentheses() {
        assert_eq!(tree("random"), Node::Call(Function::Random, Vec::new()));
        assert_eq!(tree("random()"), Node::Call(Function::Random, Vec::new()));
    }

    #[test]
    fn test_constants() {
        assert_eq!(tree("pi"), Node::Number(std::f64::consts::PI));
    }

    #[test]
    fn test_wrong_argument_count() {
        let err = parse(tokenize("min(1)").unwrap()).unwrap_err();
        assert_eq!(
            err,
            ExpressionError::WrongArgumentCount {
                name: "min".into(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_unknown_function() {
        let err = parse(tokenize("frobnicate(1)").unwrap()).unwrap_err();
        assert_eq!(err, ExpressionError::UnknownFunction("frobnicate".into()));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            parse(tokenize("(1+2").unwrap()).unwrap_err(),
            ExpressionError::UnexpectedEnd
        );
        assert!(matches!(
            parse(tokenize("1+2)").unwrap()).unwrap_err(),
            ExpressionError::UnexpectedToken { offset: 3, .. }
        ));
    }

    fn parse_str(source: &str) -> Result<Node, ExpressionError> {
        parse(tokenize(source)?)
    }

    #[test]
    fn test_deep_parentheses_rejected() {
        let source = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
        assert_eq!(
            parse_str(&source).unwrap_err(),
            ExpressionError::TooDeep { limit: MAX_NESTING }
        );
    }

    #[test]
    fn test_long_prefix_chains_rejected() {
        for op in ["-", "~", "+"] {
            let source = format!("{}1", op.repeat(100_000));
            assert!(matches!(parse_str(&source), Err(ExpressionError::TooDeep { .. })));
        }
    }

    #[test]
    fn test_long_operator_chains_rejected() {
        let sum = vec!["1"; 10_000].join("+");
        assert!(matches!(parse_str(&sum), Err(ExpressionError::TooDeep { .. })));
        let tower = vec!["2"; 10_000].join("^");
        assert!(matches!(parse_str(&tower), Err(ExpressionError::TooDeep { .. })));
    }

    #[test]
    fn test_nesting_within_limit_accepted() {
        let source = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_str(&source).unwrap(), Node::Variable("x".into()));
        let sum = vec!["1"; 100].join("+");
        assert!(parse_str(&sum).is_ok());
        let calls = format!("{}1{}", "abs(".repeat(100), ")".repeat(100));
        assert!(parse_str(&calls).is_ok());
    }
}
