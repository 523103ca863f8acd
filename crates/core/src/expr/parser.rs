//! Recursive-descent parser producing [`Expr`] trees

use super::lexer::Token;
use super::{BinaryOp, EvalValue, Expr, ParseError, Scope, UnaryOp, MAX_PARSE_DEPTH};

pub(super) struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub(super) fn new(tokens: Vec<(usize, Token)>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    pub(super) fn parse(mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_cond()?;
        match self.tokens.get(self.pos) {
            None => Ok(expr),
            Some((at, token)) => Err(ParseError::UnexpectedToken(token.describe(), *at)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn advance(&mut self) -> Option<(usize, Token)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn expect(&mut self, wanted: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some((_, ref token)) if *token == wanted => Ok(()),
            Some((at, token)) => Err(ParseError::UnexpectedToken(token.describe(), at)),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(ParseError::TooDeep(MAX_PARSE_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_cond(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let cond = self.parse_or()?;
        let result = if self.peek() == Some(&Token::Question) {
            self.advance();
            let then = self.parse_cond()?;
            self.expect(Token::Colon)?;
            let otherwise = self.parse_cond()?;
            Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise))
        } else {
            cond
        };
        self.leave();
        Ok(result)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::OrOr) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_equality()?;
        while self.peek() == Some(&Token::AndAnd) {
            self.advance();
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn equality_op(&self) -> Option<BinaryOp> {
        match self.peek()? {
            Token::EqEq => Some(BinaryOp::Eq),
            Token::NotEq => Some(BinaryOp::Ne),
            Token::MetaEq => Some(BinaryOp::Is),
            Token::MetaNe => Some(BinaryOp::Isnt),
            Token::Ident(word) if word.eq_ignore_ascii_case("is") => Some(BinaryOp::Is),
            Token::Ident(word) if word.eq_ignore_ascii_case("isnt") => Some(BinaryOp::Isnt),
            _ => None,
        }
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_relational()?;
        while let Some(op) = self.equality_op() {
            self.advance();
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            _ => return self.parse_primary(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let (at, token) = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match token {
            Token::Int(i) => Ok(Expr::Literal(EvalValue::Int(i))),
            Token::Real(r) => Ok(Expr::Literal(EvalValue::Real(r))),
            Token::Str(s) => Ok(Expr::Literal(EvalValue::String(s))),
            Token::LParen => {
                let inner = self.parse_cond()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(word) => self.parse_identifier(word, at),
            other => Err(ParseError::UnexpectedToken(other.describe(), at)),
        }
    }

    fn parse_identifier(&mut self, word: String, at: usize) -> Result<Expr, ParseError> {
        if self.peek() == Some(&Token::Dot) {
            let scope = if word.eq_ignore_ascii_case("my") {
                Scope::My
            } else if word.eq_ignore_ascii_case("target") {
                Scope::Target
            } else {
                return Err(ParseError::UnexpectedToken(
                    format!("scope '{}'", word),
                    at,
                ));
            };
            self.advance();
            return match self.advance() {
                Some((_, Token::Ident(name))) => Ok(Expr::Attr { scope, name }),
                Some((at, token)) => Err(ParseError::UnexpectedToken(token.describe(), at)),
                None => Err(ParseError::UnexpectedEnd),
            };
        }

        let literal = match word.to_ascii_lowercase().as_str() {
            "true" => Some(EvalValue::Bool(true)),
            "false" => Some(EvalValue::Bool(false)),
            "undefined" => Some(EvalValue::Undefined),
            "error" => Some(EvalValue::Error),
            _ => None,
        };
        Ok(match literal {
            Some(value) => Expr::Literal(value),
            None => Expr::Attr {
                scope: Scope::Unscoped,
                name: word,
            },
        })
    }
}
