//! A recursive-descent recognizer for a single formula line.
//!
//! Grounded on the teacher's `syntax::parser`: recognition builds a
//! postfix buffer (`self.buf.push(Symbol::Funct(..))` there, `self.buf`
//! here) as a side effect of descending through the grammar, and a
//! function name's children are only known to be a call once the
//! argument list has been matched — compare `read_primary`'s lookahead on
//! `Token::ParenOpen` to decide compound-vs-atom with this module's
//! lookahead on `dialect.func_lpar`/`dialect.array_lpar`. The grammar
//! itself (`equation`/`comparison`/`expr`/`term`/`factor`/`atom`) and the
//! backward-scan reassembly of the postfix buffer into a tree are grounded
//! on `examples/original_source/src/parser_line.py`.

use crate::dialect::Dialect;
use crate::error::ParseError;
use crate::lexer::{self, Token};
use crate::tree::{Atom, AtomKind, Pos, Tree};

type PResult<T> = Result<T, ParseError>;

/// An element of the scratch postfix buffer built while recognizing a
/// line. Not a public type: per the design notes this is a transient
/// parsing artifact, not the tree's permanent representation.
#[derive(Debug, Clone)]
enum StackTok {
    Atom(Atom),
    UnaryMinus,
    Binary(String),
    FuncOpen,
    FuncClose,
    ArrayOpen,
    ArrayClose,
    /// A function or array callee name, always immediately preceded on
    /// the buffer by a matching `FuncClose`/`ArrayClose`.
    Name(String),
}

struct Parser<'d> {
    dialect: &'d Dialect,
    toks: Vec<Token>,
    pos: usize,
    buf: Vec<StackTok>,
}

/// Parses a single formula line into a tree. Blank or whitespace-only
/// input, and input that is only operators with no operands, both
/// produce a `ParseError`.
pub fn parse_string(dialect: &Dialect, line: &str) -> PResult<Tree> {
    let line = dialect.pre_process(line);
    let toks = lexer::tokenize(dialect, &line)?;
    if toks.len() == 1 {
        // Only the Eof sentinel: blank or whitespace-only input.
        return Err(ParseError::new(0, "nothing to parse"));
    }

    let mut parser = Parser {
        dialect,
        toks,
        pos: 0,
        buf: Vec::new(),
    };
    parser.parse_equation()?;
    match parser.peek().clone() {
        Token::Eof(_) => {}
        other => {
            return Err(ParseError::new(
                other.offset(),
                format!("unexpected trailing input at {:?}", other),
            ))
        }
    }
    reassemble(&mut parser.buf).ok_or_else(|| ParseError::new(0, "malformed expression"))
}

impl<'d> Parser<'d> {
    fn peek(&self) -> &Token {
        &self.toks[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    /// `lvalue ASSIGN comparison | comparison`. The assignment form is
    /// attempted first and rolled back (token position *and* any partial
    /// postfix pushes) on failure, since a dialect's `assign` set may
    /// include `==`, which also starts a plain comparison.
    fn parse_equation(&mut self) -> PResult<()> {
        let saved_pos = self.pos;
        let saved_len = self.buf.len();
        if self.try_parse_assignment().is_ok() {
            return Ok(());
        }
        self.pos = saved_pos;
        self.buf.truncate(saved_len);
        self.parse_comparison()
    }

    fn try_parse_assignment(&mut self) -> PResult<()> {
        let name = match self.peek().clone() {
            Token::Ident(off, name) => {
                self.advance();
                let _ = off;
                name
            }
            other => return Err(ParseError::new(other.offset(), "not an lvalue")),
        };

        if matches!(self.peek(), Token::Open(_, s) if *s == self.dialect.array_lpar) {
            self.parse_array_tail(name)?;
        } else {
            self.buf.push(StackTok::Atom(Atom::ident(name)));
        }

        match self.peek().clone() {
            Token::Assign(_, _) => {
                self.advance();
            }
            Token::EqEq(_) if self.dialect.accepts_assign("==") => {
                self.advance();
            }
            other => return Err(ParseError::new(other.offset(), "not an assignment")),
        }

        self.parse_comparison()?;
        self.buf.push(StackTok::Binary("=".to_string()));
        Ok(())
    }

    /// `expr ['==' expr]`
    fn parse_comparison(&mut self) -> PResult<()> {
        self.parse_expr()?;
        if matches!(self.peek(), Token::EqEq(_)) {
            self.advance();
            self.parse_expr()?;
            self.buf.push(StackTok::Binary("==".to_string()));
        }
        Ok(())
    }

    /// `term {('+' | '-') term}`
    fn parse_expr(&mut self) -> PResult<()> {
        self.parse_term()?;
        loop {
            match self.peek().clone() {
                Token::Plus(_) => {
                    self.advance();
                    self.parse_term()?;
                    self.buf.push(StackTok::Binary("+".to_string()));
                }
                Token::Minus(_) => {
                    self.advance();
                    self.parse_term()?;
                    self.buf.push(StackTok::Binary("-".to_string()));
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// `factor {('*' | '/') factor}`
    fn parse_term(&mut self) -> PResult<()> {
        self.parse_factor()?;
        loop {
            match self.peek().clone() {
                Token::Star(_) => {
                    self.advance();
                    self.parse_factor()?;
                    self.buf.push(StackTok::Binary("*".to_string()));
                }
                Token::Slash(_) => {
                    self.advance();
                    self.parse_factor()?;
                    self.buf.push(StackTok::Binary("/".to_string()));
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// `atom ['^' factor]` — recursing into `factor` rather than `atom`
    /// is what makes `^` right-associative.
    fn parse_factor(&mut self) -> PResult<()> {
        self.parse_atom()?;
        if matches!(self.peek(), Token::Caret(_)) {
            self.advance();
            self.parse_factor()?;
            self.buf.push(StackTok::Binary("^".to_string()));
        }
        Ok(())
    }

    /// `'-' atom | ( constant | number | array | call | identifier | '(' expr ')' )`
    ///
    /// Implemented recursively (rather than a single optional leading
    /// `-`) so chained unary minus, `--x`, produces two nested `UNARY-`
    /// nodes instead of silently folding into the literal's sign.
    fn parse_atom(&mut self) -> PResult<()> {
        if matches!(self.peek(), Token::Minus(_)) {
            self.advance();
            self.parse_atom()?;
            self.buf.push(StackTok::UnaryMinus);
            return Ok(());
        }

        match self.peek().clone() {
            Token::Int(_, text) => {
                self.advance();
                self.buf.push(StackTok::Atom(Atom::int(text)));
                Ok(())
            }
            Token::Real(_, text) => {
                self.advance();
                self.buf.push(StackTok::Atom(Atom::real(text)));
                Ok(())
            }
            Token::Const(_, canonical) => {
                self.advance();
                self.buf.push(StackTok::Atom(Atom::constant(canonical)));
                Ok(())
            }
            Token::Ident(_, name) => {
                self.advance();
                if matches!(self.peek(), Token::Open(_, s) if *s == self.dialect.func_lpar) {
                    self.parse_func_tail(name)
                } else if matches!(self.peek(), Token::Open(_, s) if *s == self.dialect.array_lpar) {
                    self.parse_array_tail(name)
                } else {
                    self.buf.push(StackTok::Atom(Atom::ident(name)));
                    Ok(())
                }
            }
            Token::Open(_, s) if s == self.dialect.lpar => {
                self.advance();
                self.parse_expr()?;
                match self.peek().clone() {
                    Token::Close(_, rs) if rs == self.dialect.rpar => {
                        self.advance();
                        Ok(())
                    }
                    other => Err(ParseError::new(other.offset(), "expected closing ')'")),
                }
            }
            other => Err(ParseError::new(other.offset(), format!("unexpected token {:?}", other))),
        }
    }

    /// Callee names are canonicalized to lower case.
    fn parse_func_tail(&mut self, name: String) -> PResult<()> {
        self.advance(); // func_lpar
        self.buf.push(StackTok::FuncOpen);
        self.parse_expr()?;
        loop {
            match self.peek().clone() {
                Token::Comma(_) => {
                    self.advance();
                    self.parse_expr()?;
                }
                _ => break,
            }
        }
        match self.peek().clone() {
            Token::Close(_, s) if s == self.dialect.func_rpar => {
                self.advance();
            }
            other => return Err(ParseError::new(other.offset(), "expected closing function paren")),
        }
        self.buf.push(StackTok::FuncClose);
        self.buf.push(StackTok::Name(name.to_lowercase()));
        Ok(())
    }

    fn parse_array_tail(&mut self, name: String) -> PResult<()> {
        self.advance(); // array_lpar
        self.buf.push(StackTok::ArrayOpen);
        self.parse_array_index()?;
        loop {
            match self.peek().clone() {
                Token::Comma(_) => {
                    self.advance();
                    self.parse_array_index()?;
                }
                _ => break,
            }
        }
        match self.peek().clone() {
            Token::Close(_, s) if s == self.dialect.array_rpar => {
                self.advance();
            }
            other => return Err(ParseError::new(other.offset(), "expected closing array bracket")),
        }
        self.buf.push(StackTok::ArrayClose);
        self.buf.push(StackTok::Name(name));
        Ok(())
    }

    /// Array index arguments are integer-literal atoms; a leading `-` is
    /// folded directly into the atom's text rather than wrapped in a
    /// `UNARY-` node, since the array invariant forbids operator-node args.
    fn parse_array_index(&mut self) -> PResult<()> {
        let negative = matches!(self.peek(), Token::Minus(_));
        if negative {
            self.advance();
        }
        match self.peek().clone() {
            Token::Int(_, text) => {
                self.advance();
                let text = if negative { format!("-{}", text) } else { text };
                self.buf.push(StackTok::Atom(Atom::int(text)));
                Ok(())
            }
            other => Err(ParseError::new(other.offset(), "expected integer array index")),
        }
    }
}

/// A single backward scan of the postfix buffer into a tree, mirroring
/// `parser_line.py`'s `_get_nested_structure_rec`.
fn reassemble(buf: &mut Vec<StackTok>) -> Option<Tree> {
    match buf.pop()? {
        StackTok::Atom(a) => Some(Tree::Atom(a)),

        StackTok::UnaryMinus => {
            let arg = reassemble(buf)?;
            Some(Tree::prefix("UNARY-", arg))
        }

        StackTok::Binary(op) => {
            let rhs = reassemble(buf)?;
            let lhs = reassemble(buf)?;
            if op == "^" {
                if let Tree::Atom(Atom { kind: AtomKind::Const, text }) = &lhs {
                    if text == "E" {
                        return Some(Tree::prefix("exp", rhs));
                    }
                }
            }
            Some(Tree::infix(op, lhs, rhs))
        }

        StackTok::Name(name) => match buf.last() {
            Some(StackTok::FuncClose) => {
                buf.pop();
                let mut args = Vec::new();
                loop {
                    match buf.last() {
                        Some(StackTok::FuncOpen) => {
                            buf.pop();
                            break;
                        }
                        _ => args.push(reassemble(buf)?),
                    }
                }
                args.reverse();
                Some(Tree::op(name, Pos::Function, args))
            }
            Some(StackTok::ArrayClose) => {
                buf.pop();
                let mut args = Vec::new();
                loop {
                    match buf.last() {
                        Some(StackTok::ArrayOpen) => {
                            buf.pop();
                            break;
                        }
                        _ => args.push(reassemble(buf)?),
                    }
                }
                args.reverse();
                Some(Tree::op(name, Pos::Array, args))
            }
            _ => None,
        },

        StackTok::FuncOpen | StackTok::FuncClose | StackTok::ArrayOpen | StackTok::ArrayClose => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn render_shape(t: &Tree) -> String {
        match t {
            Tree::Atom(a) => a.text.clone(),
            Tree::Op(n) => {
                let args: Vec<String> = n.args.iter().map(render_shape).collect();
                format!("{}({})", n.op, args.join(","))
            }
        }
    }

    #[test]
    fn basic_infix() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "a + 1").unwrap();
        assert_eq!(render_shape(&t), "+(a,1)");
    }

    #[test]
    fn precedence_and_right_assoc_power() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "2+3*2^3^2").unwrap();
        assert_eq!(render_shape(&t), "+(2,*(3,^(2,^(3,2))))");
    }

    #[test]
    fn double_unary_minus_nests() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "--x").unwrap();
        assert_eq!(render_shape(&t), "UNARY-(UNARY-(x))");
    }

    #[test]
    fn function_call_lowercases_callee() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "Sin[x]").unwrap();
        assert_eq!(render_shape(&t), "sin(x)");
    }

    #[test]
    fn e_caret_collapses_to_exp() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "E^x").unwrap();
        assert_eq!(render_shape(&t), "exp(x)");
    }

    #[test]
    fn array_index_assignment() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "C[[1]] = r + 4").unwrap();
        assert_eq!(render_shape(&t), "=(C(1),+(r,4))");
    }

    #[test]
    fn negative_array_index_folds_sign_into_atom() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "C[[-1]]").unwrap();
        match &t {
            Tree::Op(n) => {
                assert_eq!(n.op, "C");
                assert_eq!(n.pos, Pos::Array);
                assert!(matches!(&n.args[0], Tree::Atom(a) if a.text == "-1"));
            }
            _ => panic!("expected array node"),
        }
    }

    #[test]
    fn mathematica_accepts_eqeq_as_assignment() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, "a == 9").unwrap();
        assert_eq!(render_shape(&t), "=(a,9)");
    }

    #[test]
    fn python_does_not_accept_eqeq_as_assignment() {
        let d = Dialect::python(false);
        let t = parse_string(&d, "a == 9").unwrap();
        assert_eq!(render_shape(&t), "==(a,9)");
    }

    #[test]
    fn blank_line_is_a_parse_error() {
        let d = Dialect::mathematica();
        assert!(parse_string(&d, "   ").is_err());
    }

    #[test]
    fn named_character_escapes_are_unwrapped_before_parsing() {
        let d = Dialect::mathematica();
        let t = parse_string(&d, r"\[CapitalAlpha] + \[beta]").unwrap();
        assert_eq!(render_shape(&t), "+(Alpha,beta)");
    }
}
