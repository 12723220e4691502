//! Translates algebraic formulas between a Mathematica-style surface
//! dialect and a Python/numpy-style surface dialect.
//!
//! The pipeline mirrors the teacher crate's own `syntax` module at the
//! architectural level: a `Dialect` parameterizes lexing and rendering, a
//! recursive-descent `parser` builds a postfix buffer and reassembles it
//! into a [`tree::Tree`] by a single backward scan, and a [`formatter`]
//! walks that tree back out into the target dialect's surface syntax. A
//! multi-line program additionally passes through the [`optimizer`]'s
//! common-subexpression elimination before formatting.

pub mod dialect;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod text_parser;
pub mod tree;

pub use dialect::Dialect;
pub use error::{DialectError, InternalError, ParseError, TranslateError};
pub use tree::{Atom, AtomKind, Node, Pos, Program, Tree};

/// Translates a single formula line from `source`'s surface syntax into
/// `target`'s.
pub fn translate_line(input: &str, source: &Dialect, target: &Dialect) -> Result<String, TranslateError> {
    source.validate()?;
    target.validate()?;
    let tree = parser::parse_string(source, input)?;
    Ok(formatter::render(&tree, target)?)
}

/// Translates a multi-line formula program from `source`'s surface syntax
/// into `target`'s, optionally hoisting repeated subexpressions into
/// `t_N` temporaries first.
pub fn translate_text(
    input: &str,
    source: &Dialect,
    target: &Dialect,
    optimize: bool,
) -> Result<String, TranslateError> {
    source.validate()?;
    target.validate()?;
    let program = text_parser::parse_text(source, input)?;
    let program = if optimize { optimizer::optimize(&program) } else { program };
    Ok(formatter::render_program(&program, target)?)
}


#[cfg(test)]
mod proptest_properties {
    use proptest::prelude::*;

    use super::*;
    use crate::parser::parse_string;

    fn shape(t: &Tree) -> String {
        match t {
            Tree::Atom(a) => a.text.clone(),
            Tree::Op(n) => {
                let args: Vec<String> = n.args.iter().map(shape).collect();
                format!("{}({})", n.op, args.join(","))
            }
        }
    }

    /// A small generator for well-formed arithmetic formulas: single-letter
    /// identifiers and small integers combined with `+`, `-`, `*`, always
    /// fully parenthesized so precedence never changes a formula's shape.
    fn arith_expr() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            "[a-e]".prop_map(|s| s),
            (0i32..20).prop_map(|n| n.to_string()),
        ];
        leaf.prop_recursive(4, 64, 4, |inner| {
            prop_oneof![
                (inner.clone(), "[+*-]", inner).prop_map(|(l, op, r)| format!("({} {} {})", l, op, r)),
            ]
        })
    }

    proptest! {
        /// Parsing a formula, formatting it back out under the *same*
        /// dialect, and re-parsing yields a tree with the same shape as
        /// the original — round-tripping never changes meaning.
        #[test]
        fn round_trip_preserves_shape_same_dialect(src in arith_expr()) {
            let d = Dialect::python(false);
            let original = parse_string(&d, &src).unwrap();
            let rendered = translate_line(&src, &d, &d).unwrap();
            let reparsed = parse_string(&d, &rendered).unwrap();
            prop_assert_eq!(shape(&original), shape(&reparsed));
        }

        /// Translating into a different dialect and back recovers the
        /// original tree shape too, since dialect translation only
        /// changes surface spelling, never structure.
        #[test]
        fn round_trip_preserves_shape_cross_dialect(src in arith_expr()) {
            let math = Dialect::mathematica();
            let py = Dialect::python(false);
            let original = parse_string(&math, &src).unwrap();
            let translated = translate_line(&src, &math, &py).unwrap();
            let back = translate_line(&translated, &py, &math).unwrap();
            let reparsed = parse_string(&math, &back).unwrap();
            prop_assert_eq!(shape(&original), shape(&reparsed));
        }
    }
}
