//! Renders a tree (or a whole program) back into a dialect's surface
//! syntax.
//!
//! Grounded function-for-function on
//! `examples/original_source/src/formatter.py`'s
//! `_convert_to_string_rec`/`_operator_associative`/`_strip_par`.

use crate::dialect::Dialect;
use crate::error::InternalError;
use crate::tree::{Node, Pos, Program, Tree};

/// True only when `args[side]` is itself a node with the *same* operator
/// as `node` and that operator is `+` or `*` — a strict same-operator
/// check, not general associativity reasoning, matching the original.
fn operand_is_associative(op: &str, side: &Tree) -> bool {
    matches!((op, side.as_node()), ("+", Some(n)) if n.op == "+")
        || matches!((op, side.as_node()), ("*", Some(n)) if n.op == "*")
}

fn strip_par(s: &str, lpar: &str, rpar: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with(lpar) && trimmed.ends_with(rpar) {
        trimmed[lpar.len()..trimmed.len() - rpar.len()].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// A well-formed tree's arity is fixed by its `Pos`: exactly two args for
/// an infix operator, exactly one for a prefix operator, at least one for
/// a function call or array index. Any other shape is a bug upstream
/// (parser or optimizer), not bad input, so it's reported as an
/// `InternalError` rather than panicking on an out-of-bounds `args` index.
fn check_arity(n: &Node) -> Result<(), InternalError> {
    let ok = match n.pos {
        Pos::Infix => n.args.len() == 2,
        Pos::Prefix => n.args.len() == 1,
        Pos::Function | Pos::Array => !n.args.is_empty(),
    };
    if ok {
        Ok(())
    } else {
        Err(InternalError::new(format!(
            "node '{}' ({:?}) has {} args, which its position disallows",
            n.op,
            n.pos,
            n.args.len()
        )))
    }
}

fn render_rec(t: &Tree, dialect: &Dialect) -> Result<String, InternalError> {
    let s = match t {
        Tree::Atom(a) => dialect.format_atom(a),
        Tree::Op(n) => {
            check_arity(n)?;
            match n.pos {
                Pos::Function => {
                    let op = dialect.operator_spelling(&n.op);
                    let mut args = Vec::with_capacity(n.args.len());
                    for a in &n.args {
                        args.push(strip_par(&render_rec(a, dialect)?, &dialect.lpar, &dialect.rpar));
                    }
                    format!("{}{}{}{}", op, dialect.func_lpar, args.join(&dialect.func_delim), dialect.func_rpar)
                }
                Pos::Array => {
                    let mut args = Vec::with_capacity(n.args.len());
                    for a in &n.args {
                        args.push(strip_par(&render_rec(a, dialect)?, &dialect.lpar, &dialect.rpar));
                    }
                    format!("{}{}{}{}", n.op, dialect.array_lpar, args.join(&dialect.array_delim), dialect.array_rpar)
                }
                Pos::Infix => {
                    let op = if n.op == "=" {
                        dialect.canonical_assign()
                    } else {
                        dialect.operator_spelling(&n.op)
                    };
                    let mut lhs = render_rec(&n.args[0], dialect)?;
                    let mut rhs = render_rec(&n.args[1], dialect)?;
                    if operand_is_associative(&n.op, &n.args[0]) {
                        lhs = strip_par(&lhs, &dialect.lpar, &dialect.rpar);
                    }
                    if operand_is_associative(&n.op, &n.args[1]) || n.op == "=" {
                        rhs = strip_par(&rhs, &dialect.lpar, &dialect.rpar);
                    }
                    format!("{}{} {} {}{}", dialect.lpar, lhs, op, rhs, dialect.rpar)
                }
                Pos::Prefix => {
                    let arg = render_rec(&n.args[0], dialect)?;
                    let op = dialect.operator_spelling(&n.op);
                    if n.op == "UNARY-" {
                        format!("{}{} ", op, arg)
                    } else {
                        format!(
                            "{}{}{}{} ",
                            op,
                            dialect.func_lpar,
                            strip_par(&arg, &dialect.lpar, &dialect.rpar),
                            dialect.func_rpar
                        )
                    }
                }
            }
        }
    };
    Ok(s.trim().to_string())
}

/// Renders a single tree, stripping one layer of outermost grouping
/// parens from the result. Fails only when `t` violates its own arity
/// invariants (a malformed tree produced by a bug elsewhere), never on
/// well-formed input.
pub fn render(t: &Tree, dialect: &Dialect) -> Result<String, InternalError> {
    Ok(strip_par(&render_rec(t, dialect)?, &dialect.lpar, &dialect.rpar))
}

/// Renders a whole program, one formula per line, joined by the target
/// dialect's end-of-line spelling.
pub fn render_program(program: &Program, dialect: &Dialect) -> Result<String, InternalError> {
    let mut lines = Vec::with_capacity(program.len());
    for t in program {
        lines.push(render(t, dialect)?);
    }
    Ok(lines.join(&dialect.eol))
}
