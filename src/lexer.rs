//! Tokenizer for a single formula line.
//!
//! Grounded on the teacher's `syntax::lexer`: small `lazy_static!`-compiled
//! `Regex` patterns drive the dialect-invariant lexemes (numbers,
//! identifiers), every token carries its own byte offset, and the input is
//! NFKC-normalized up front exactly as the teacher's `Lexer` normalizes
//! each buffered line before scanning it.
//!
//! Bracket, delimiter, and assignment tokens are dialect-specific
//! spellings rather than fixed patterns, so they can't be precompiled into
//! a single static regex; they are matched as literal prefixes against the
//! `Dialect`'s fields instead, longest spelling first (so e.g. the
//! symbolic dialect's `[[` array bracket wins over its `[` function
//! bracket when both are possible at a position).

use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::dialect::Dialect;
use crate::error::ParseError;

lazy_static! {
    static ref REAL_RE: Regex =
        Regex::new(r"^[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?|^[0-9]+[eE][+-]?[0-9]+|^\.[0-9]+([eE][+-]?[0-9]+)?").unwrap();
    static ref INT_RE: Regex = Regex::new(r"^[0-9]+").unwrap();
    static ref IDENT_RE: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(usize, String),
    Real(usize, String),
    Ident(usize, String),
    Const(usize, String),
    /// A generic open bracket; `text` is the exact spelling matched. The
    /// parser, not the lexer, decides whether it is a grouping paren, a
    /// function-call paren, or an array-index bracket.
    Open(usize, String),
    Close(usize, String),
    Comma(usize),
    Assign(usize, String),
    EqEq(usize),
    Plus(usize),
    Minus(usize),
    Star(usize),
    Slash(usize),
    Caret(usize),
    Eof(usize),
}

impl Token {
    pub fn offset(&self) -> usize {
        match self {
            Token::Int(o, _)
            | Token::Real(o, _)
            | Token::Ident(o, _)
            | Token::Const(o, _)
            | Token::Open(o, _)
            | Token::Close(o, _)
            | Token::Comma(o)
            | Token::Assign(o, _)
            | Token::EqEq(o)
            | Token::Plus(o)
            | Token::Minus(o)
            | Token::Star(o)
            | Token::Slash(o)
            | Token::Caret(o)
            | Token::Eof(o) => *o,
        }
    }
}

pub fn tokenize(dialect: &Dialect, line: &str) -> Result<Vec<Token>, ParseError> {
    let normalized: String = line.nfkc().collect();
    let mut toks = Vec::new();
    let mut pos = 0usize;
    let bytes = normalized.as_bytes();

    // Longest literal spelling first so e.g. "[[" beats "[".
    let mut brackets: Vec<(&str, bool)> = vec![
        (dialect.lpar.as_str(), true),
        (dialect.func_lpar.as_str(), true),
        (dialect.array_lpar.as_str(), true),
        (dialect.rpar.as_str(), false),
        (dialect.func_rpar.as_str(), false),
        (dialect.array_rpar.as_str(), false),
    ];
    brackets.sort_by_key(|(s, _)| std::cmp::Reverse(s.len()));

    let mut assigns: Vec<&str> = dialect
        .assign
        .iter()
        .map(String::as_str)
        .filter(|s| *s != "==")
        .collect();
    assigns.sort_by_key(|s| std::cmp::Reverse(s.len()));

    let exp_tok = dialect.exp_token();

    // Dotted const spellings (e.g. the numeric dialect's "np.pi") contain a
    // '.' the identifier regex doesn't allow, so they're matched as literal,
    // case-insensitive, word-bounded prefixes before the identifier regex
    // ever gets a chance to consume a partial prefix of one.
    let mut dotted_consts: Vec<(&str, &str)> = dialect
        .consts
        .iter()
        .filter(|(s, _)| s.contains('.'))
        .map(|(s, c)| (s.as_str(), c.as_str()))
        .collect();
    dotted_consts.sort_by_key(|(s, _)| std::cmp::Reverse(s.len()));

    while pos < normalized.len() {
        let rest = &normalized[pos..];
        let ch = bytes[pos] as char;

        if ch.is_whitespace() {
            pos += ch.len_utf8();
            continue;
        }

        // "==" is always its own lexeme, checked first so a single-char
        // assign spelling like "=" can't swallow half of it as a prefix
        // match; whether it's *accepted* as an assignment is a parser,
        // not a lexer, decision (`Dialect::accepts_assign`).
        if rest.starts_with("==") {
            toks.push(Token::EqEq(pos));
            pos += 2;
            continue;
        }

        // Assignment spellings (excluding the always-special "==").
        if let Some(spelling) = assigns.iter().find(|s| rest.starts_with(**s)) {
            toks.push(Token::Assign(pos, (*spelling).to_string()));
            pos += spelling.len();
            continue;
        }

        if rest.starts_with(exp_tok) {
            toks.push(Token::Caret(pos));
            pos += exp_tok.len();
            continue;
        }

        if let Some((spelling, is_open)) = brackets.iter().find(|(s, _)| !s.is_empty() && rest.starts_with(*s)) {
            if *is_open {
                toks.push(Token::Open(pos, (*spelling).to_string()));
            } else {
                toks.push(Token::Close(pos, (*spelling).to_string()));
            }
            pos += spelling.len();
            continue;
        }

        if ch == ',' {
            toks.push(Token::Comma(pos));
            pos += 1;
            continue;
        }

        match ch {
            '+' => {
                toks.push(Token::Plus(pos));
                pos += 1;
                continue;
            }
            '-' => {
                toks.push(Token::Minus(pos));
                pos += 1;
                continue;
            }
            '*' => {
                toks.push(Token::Star(pos));
                pos += 1;
                continue;
            }
            '/' => {
                toks.push(Token::Slash(pos));
                pos += 1;
                continue;
            }
            _ => {}
        }

        if let Some(m) = REAL_RE.find(rest) {
            toks.push(Token::Real(pos, m.as_str().to_string()));
            pos += m.end();
            continue;
        }

        if let Some(&(spelling, canon)) = dotted_consts.iter().find(|(s, _)| match rest.get(..s.len()) {
            Some(candidate) if candidate.eq_ignore_ascii_case(s) => match rest[s.len()..].chars().next() {
                Some(c) => !(c.is_alphanumeric() || c == '_'),
                None => true,
            },
            _ => false,
        }) {
            toks.push(Token::Const(pos, canon.to_string()));
            pos += spelling.len();
            continue;
        }

        if let Some(m) = IDENT_RE.find(rest) {
            let word = m.as_str();
            if let Some(canon) = dialect.const_canonical(word) {
                toks.push(Token::Const(pos, canon.to_string()));
            } else {
                toks.push(Token::Ident(pos, word.to_string()));
            }
            pos += m.end();
            continue;
        }

        if let Some(m) = INT_RE.find(rest) {
            toks.push(Token::Int(pos, m.as_str().to_string()));
            pos += m.end();
            continue;
        }

        return Err(ParseError::new(pos, format!("unexpected character '{}'", ch)));
    }

    toks.push(Token::Eof(normalized.len()));
    Ok(toks)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_arithmetic() {
        let d = Dialect::mathematica();
        let toks = tokenize(&d, "a + 1").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident(0, "a".to_string()),
                Token::Plus(2),
                Token::Int(4, "1".to_string()),
                Token::Eof(5),
            ]
        );
    }

    #[test]
    fn array_brackets_beat_func_brackets() {
        let d = Dialect::mathematica();
        let toks = tokenize(&d, "C[[1]]").unwrap();
        assert_eq!(toks[0], Token::Ident(0, "C".to_string()));
        assert_eq!(toks[1], Token::Open(1, "[[".to_string()));
        assert_eq!(toks[3], Token::Close(4, "]]".to_string()));
    }

    #[test]
    fn python_exponent_is_doublestar() {
        let d = Dialect::python(false);
        let toks = tokenize(&d, "a**2").unwrap();
        assert_eq!(toks[1], Token::Caret(1));
    }

    #[test]
    fn recognizes_constants() {
        let d = Dialect::mathematica();
        let toks = tokenize(&d, "Pi").unwrap();
        assert_eq!(toks[0], Token::Const(0, "PI".to_string()));
    }

    #[test]
    fn dotted_const_lexes_as_a_single_token() {
        let d = Dialect::python(false);
        let toks = tokenize(&d, "np.pi").unwrap();
        assert_eq!(toks, vec![Token::Const(0, "PI".to_string()), Token::Eof(5)]);
    }

    #[test]
    fn dotted_const_respects_trailing_word_boundary() {
        let d = Dialect::python(false);
        assert!(tokenize(&d, "np.pie").is_err());
    }

    #[test]
    fn double_equals_is_one_token_even_when_single_equals_is_an_assign_spelling() {
        let d = Dialect::python(false);
        let toks = tokenize(&d, "a == 9").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Ident(0, "a".to_string()),
                Token::EqEq(2),
                Token::Int(5, "9".to_string()),
                Token::Eof(6),
            ]
        );
    }
}
