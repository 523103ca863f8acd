//! Tokenizer for expression text

use super::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Ident(String),
    Int(i64),
    Real(f64),
    Str(String),
    LParen,
    RParen,
    Dot,
    Question,
    Colon,
    OrOr,
    AndAnd,
    Bang,
    EqEq,
    NotEq,
    MetaEq,
    MetaNe,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl Token {
    pub(super) fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Int(i) => format!("integer {}", i),
            Token::Real(r) => format!("real {}", r),
            Token::Str(_) => "string literal".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Dot => ".",
            Token::Question => "?",
            Token::Colon => ":",
            Token::OrOr => "||",
            Token::AndAnd => "&&",
            Token::Bang => "!",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::MetaEq => "=?=",
            Token::MetaNe => "=!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Ident(_) | Token::Int(_) | Token::Real(_) | Token::Str(_) => "",
        }
    }
}

/// Split expression text into `(position, token)` pairs
pub(super) fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_alphabetic() || c == '_' {
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push((start, Token::Ident(chars[start..i].iter().collect())));
            continue;
        }

        if c.is_ascii_digit() {
            let (token, end) = lex_number(&chars, start)?;
            tokens.push((start, token));
            i = end;
            continue;
        }

        if c == '"' {
            let (text, end) = lex_string(&chars, start)?;
            tokens.push((start, Token::Str(text)));
            i = end;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let after = chars.get(i + 2).copied();
        let (token, width) = match (c, next, after) {
            ('|', Some('|'), _) => (Token::OrOr, 2),
            ('&', Some('&'), _) => (Token::AndAnd, 2),
            ('=', Some('?'), Some('=')) => (Token::MetaEq, 3),
            ('=', Some('!'), Some('=')) => (Token::MetaNe, 3),
            ('=', Some('='), _) => (Token::EqEq, 2),
            ('!', Some('='), _) => (Token::NotEq, 2),
            ('!', _, _) => (Token::Bang, 1),
            ('<', Some('='), _) => (Token::Le, 2),
            ('<', _, _) => (Token::Lt, 1),
            ('>', Some('='), _) => (Token::Ge, 2),
            ('>', _, _) => (Token::Gt, 1),
            ('(', _, _) => (Token::LParen, 1),
            (')', _, _) => (Token::RParen, 1),
            ('.', _, _) => (Token::Dot, 1),
            ('?', _, _) => (Token::Question, 1),
            (':', _, _) => (Token::Colon, 1),
            ('+', _, _) => (Token::Plus, 1),
            ('-', _, _) => (Token::Minus, 1),
            ('*', _, _) => (Token::Star, 1),
            ('/', _, _) => (Token::Slash, 1),
            ('%', _, _) => (Token::Percent, 1),
            _ => return Err(ParseError::UnexpectedChar(c, start)),
        };
        tokens.push((start, token));
        i += width;
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> Result<(Token, usize), ParseError> {
    let mut i = start;
    let mut is_real = false;

    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    // A dot only belongs to the number when a digit follows it
    if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
        is_real = true;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            is_real = true;
            i = j;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
    }

    let text: String = chars[start..i].iter().collect();
    let token = if is_real {
        text.parse::<f64>()
            .map(Token::Real)
            .map_err(|_| ParseError::InvalidNumber(text.clone(), start))?
    } else {
        text.parse::<i64>()
            .map(Token::Int)
            .map_err(|_| ParseError::InvalidNumber(text.clone(), start))?
    };
    Ok((token, i))
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ParseError> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' => return Ok((text, i + 1)),
            '\\' => {
                let escaped = chars
                    .get(i + 1)
                    .copied()
                    .ok_or(ParseError::UnterminatedString(start))?;
                text.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(ParseError::UnterminatedString(start))
}
