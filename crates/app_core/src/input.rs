//! Batch option parsing
//!
//! Numeric fields accept small integer expressions such as `10*1024` or
//! `(100-20)`, evaluated left to right with the usual precedence.

use crate::error::{AppError, Result};

pub const DEFAULT_COMPRESS_QUALITY: u8 = 80;
pub const DEFAULT_CONVERT_QUALITY: u8 = 90;
pub const DEFAULT_MIN_SIZE_KB: u64 = 10;

/// Worker count offered by default: 70% of the server's cores, at least one
pub fn default_workers(cpu_count: usize) -> usize {
    let cpu_count = cpu_count.max(1);
    ((cpu_count as f64 * 0.7).floor() as usize).clamp(1, cpu_count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Num(i64),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(d)))
                        .ok_or_else(|| AppError::InvalidInput(format!("number too large: {}", input)))?;
                    chars.next();
                }
                tokens.push(Token::Num(value));
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '(' => Token::Open,
                    _ => Token::Close,
                });
                chars.next();
            }
            other => {
                return Err(AppError::InvalidInput(format!(
                    "unexpected '{}' in {}",
                    other, input
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.peek();
        self.pos += 1;
        t
    }

    fn invalid(&self) -> AppError {
        AppError::InvalidInput(format!("not a valid expression: {}", self.source))
    }

    fn overflow(&self) -> AppError {
        AppError::InvalidInput(format!("value out of range: {}", self.source))
    }

    fn expr(&mut self) -> Result<i64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.bump();
            let rhs = self.term()?;
            value = match op {
                Token::Plus => value.checked_add(rhs),
                _ => value.checked_sub(rhs),
            }
            .ok_or_else(|| self.overflow())?;
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<i64> {
        let mut value = self.factor()?;
        while let Some(op @ (Token::Star | Token::Slash)) = self.peek() {
            self.bump();
            let rhs = self.factor()?;
            value = match op {
                Token::Star => value.checked_mul(rhs).ok_or_else(|| self.overflow())?,
                _ if rhs == 0 => {
                    return Err(AppError::InvalidInput(format!("division by zero: {}", self.source)))
                }
                _ => value.checked_div(rhs).ok_or_else(|| self.overflow())?,
            };
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<i64> {
        match self.bump() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Minus) => self.factor()?.checked_neg().ok_or_else(|| self.overflow()),
            Some(Token::Open) => {
                let value = self.expr()?;
                match self.bump() {
                    Some(Token::Close) => Ok(value),
                    _ => Err(self.invalid()),
                }
            }
            _ => Err(self.invalid()),
        }
    }
}

/// Evaluate an integer expression with `+ - * /` and parentheses
pub fn eval_expression(input: &str) -> Result<i64> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        source: input,
    };

    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(parser.invalid());
    }
    Ok(value)
}

/// Quality in `1..=100`
pub fn parse_quality(input: &str) -> Result<u8> {
    let value = eval_expression(input)?;
    if !(1..=100).contains(&value) {
        return Err(AppError::InvalidInput(format!(
            "quality must be between 1 and 100, got {}",
            value
        )));
    }
    Ok(value as u8)
}

/// Minimum size in KB, returned in bytes
pub fn parse_min_size_kb(input: &str) -> Result<u64> {
    let value = eval_expression(input)?;
    if value < 0 {
        return Err(AppError::InvalidInput(format!(
            "minimum size cannot be negative, got {}",
            value
        )));
    }
    (value as u64)
        .checked_mul(1024)
        .ok_or_else(|| AppError::InvalidInput(format!("minimum size too large: {}", input)))
}

/// Worker count, at least one and at most `cpu_count`
pub fn parse_workers(input: &str, cpu_count: usize) -> Result<usize> {
    let value = eval_expression(input)?;
    if value < 1 {
        return Err(AppError::InvalidInput(format!(
            "worker count must be at least 1, got {}",
            value
        )));
    }
    Ok((value as usize).min(cpu_count.max(1)))
}

/// Options of a compress batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressOptions {
    pub quality: u8,
    pub min_size: u64,
    pub max_workers: usize,
}

impl CompressOptions {
    pub fn defaults(cpu_count: usize) -> Self {
        Self {
            quality: DEFAULT_COMPRESS_QUALITY,
            min_size: DEFAULT_MIN_SIZE_KB * 1024,
            max_workers: default_workers(cpu_count),
        }
    }

    /// `[quality] [min_kb] [workers]`; missing fields keep their defaults
    pub fn parse(args: &[&str], cpu_count: usize) -> Result<Self> {
        let mut options = Self::defaults(cpu_count);
        if let Some(q) = args.first() {
            options.quality = parse_quality(q)?;
        }
        if let Some(kb) = args.get(1) {
            options.min_size = parse_min_size_kb(kb)?;
        }
        if let Some(w) = args.get(2) {
            options.max_workers = parse_workers(w, cpu_count)?;
        }
        Ok(options)
    }
}

/// Options of a convert batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub target_format: String,
    pub quality: u8,
    pub max_workers: usize,
    pub skip_pdf: bool,
}

impl ConvertOptions {
    /// `<format> [quality] [workers] [--keep-pdf]`
    pub fn parse(args: &[&str], cpu_count: usize, supported: &[String]) -> Result<Self> {
        let keep_pdf = args.iter().any(|a| *a == "--keep-pdf");
        let positional: Vec<&str> = args.iter().copied().filter(|a| !a.starts_with("--")).collect();

        let target_format = positional
            .first()
            .map(|f| f.to_lowercase())
            .ok_or_else(|| AppError::InvalidInput("target format is required".into()))?;

        if !supported.is_empty() && !supported.iter().any(|f| f.eq_ignore_ascii_case(&target_format)) {
            return Err(AppError::InvalidInput(format!(
                "unsupported target format: {}",
                target_format
            )));
        }

        let quality = match positional.get(1) {
            Some(q) => parse_quality(q)?,
            None => DEFAULT_CONVERT_QUALITY,
        };
        let max_workers = match positional.get(2) {
            Some(w) => parse_workers(w, cpu_count)?,
            None => default_workers(cpu_count),
        };

        Ok(Self {
            target_format,
            quality,
            max_workers,
            skip_pdf: !keep_pdf,
        })
    }
}
