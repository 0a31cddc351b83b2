//! Tokenizer for formula sources.

use crate::error::ExpressionError;

/// Operator symbols recognised in formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    EqualEqual,
    NotEqual,
    Ampersand,
    Pipe,
    Tilde,
}

impl Symbol {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Star => "*",
            Symbol::Slash => "/",
            Symbol::Percent => "%",
            Symbol::Caret => "^",
            Symbol::Greater => ">",
            Symbol::GreaterEqual => ">=",
            Symbol::Less => "<",
            Symbol::LessEqual => "<=",
            Symbol::EqualEqual => "==",
            Symbol::NotEqual => "!=",
            Symbol::Ampersand => "&",
            Symbol::Pipe => "|",
            Symbol::Tilde => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Ident(String),
    Symbol(Symbol),
    LeftParen,
    RightParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Ident(name) => write!(f, "{}", name),
            Token::Symbol(symbol) => write!(f, "{}", symbol.as_str()),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

/// A token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Split a formula into tokens.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == b'.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit)) {
            pos = scan_number(bytes, pos);
            let text = &source[start..pos];
            let value = text
                .parse::<f64>()
                .map_err(|_| ExpressionError::InvalidNumber(text.to_string()))?;
            tokens.push(Spanned {
                token: Token::Number(value),
                offset: start,
            });
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Ident(source[start..pos].to_string()),
                offset: start,
            });
            continue;
        }

        let next = bytes.get(pos + 1).copied();
        let (token, width) = match (c, next) {
            (b'>', Some(b'=')) => (Token::Symbol(Symbol::GreaterEqual), 2),
            (b'<', Some(b'=')) => (Token::Symbol(Symbol::LessEqual), 2),
            (b'=', Some(b'=')) => (Token::Symbol(Symbol::EqualEqual), 2),
            (b'!', Some(b'=')) => (Token::Symbol(Symbol::NotEqual), 2),
            (b'>', _) => (Token::Symbol(Symbol::Greater), 1),
            (b'<', _) => (Token::Symbol(Symbol::Less), 1),
            (b'+', _) => (Token::Symbol(Symbol::Plus), 1),
            (b'-', _) => (Token::Symbol(Symbol::Minus), 1),
            (b'*', _) => (Token::Symbol(Symbol::Star), 1),
            (b'/', _) => (Token::Symbol(Symbol::Slash), 1),
            (b'%', _) => (Token::Symbol(Symbol::Percent), 1),
            (b'^', _) => (Token::Symbol(Symbol::Caret), 1),
            (b'&', _) => (Token::Symbol(Symbol::Ampersand), 1),
            (b'|', _) => (Token::Symbol(Symbol::Pipe), 1),
            (b'~', _) => (Token::Symbol(Symbol::Tilde), 1),
            (b'(', _) => (Token::LeftParen, 1),
            (b')', _) => (Token::RightParen, 1),
            (b',', _) => (Token::Comma, 1),
            _ => {
                let character = source[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(ExpressionError::UnexpectedCharacter {
                    character,
                    offset: start,
                });
            }
        };
        tokens.push(Spanned {
            token,
            offset: start,
        });
        pos += width;
    }

    Ok(tokens)
}

/// Advance past `digits [. digits] [(e|E) [+|-] digits]`.
fn scan_number(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'.' {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp = pos + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        // only an exponent if digits follow; `2e` is a number and an identifier
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}
