//! The tagged-variant expression tree shared by every component.
//!
//! Unlike the teacher's `syntax::repr::Structure`, which keeps a flat
//! postfix slice of `Symbol`s as the permanent representation, a `Tree`
//! here owns its children recursively. The postfix form only exists
//! transiently inside the parser while it reassembles a line.

use ordered_float::OrderedFloat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    Int,
    Real,
    Ident,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub text: String,
    pub kind: AtomKind,
}

impl Atom {
    pub fn new(text: impl Into<String>, kind: AtomKind) -> Atom {
        Atom {
            text: text.into(),
            kind,
        }
    }

    pub fn int(text: impl Into<String>) -> Atom {
        Atom::new(text, AtomKind::Int)
    }

    pub fn real(text: impl Into<String>) -> Atom {
        Atom::new(text, AtomKind::Real)
    }

    pub fn ident(text: impl Into<String>) -> Atom {
        Atom::new(text, AtomKind::Ident)
    }

    pub fn constant(text: impl Into<String>) -> Atom {
        Atom::new(text, AtomKind::Const)
    }

    /// A stable numeric value used as a tie-breaking hash key for reals;
    /// `OrderedFloat` is what makes `f64` atoms usable as structural-hash
    /// building blocks despite NaN not being totally ordered by default.
    pub fn ordered_real(&self) -> Option<OrderedFloat<f64>> {
        if self.kind == AtomKind::Real {
            self.text.parse::<f64>().ok().map(OrderedFloat)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Infix,
    Prefix,
    Function,
    Array,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub op: String,
    pub pos: Pos,
    pub args: Vec<Tree>,
    /// Populated by the optimizer's annotation pass; `None` beforehand.
    pub cost: Option<f64>,
    /// Populated by the optimizer's annotation pass; `None` beforehand.
    pub hash: Option<u64>,
}

impl Node {
    pub fn new(op: impl Into<String>, pos: Pos, args: Vec<Tree>) -> Node {
        Node {
            op: op.into(),
            pos,
            args,
            cost: None,
            hash: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Atom(Atom),
    Op(Box<Node>),
}

impl Tree {
    pub fn op(op: impl Into<String>, pos: Pos, args: Vec<Tree>) -> Tree {
        Tree::Op(Box::new(Node::new(op, pos, args)))
    }

    pub fn infix(op: impl Into<String>, lhs: Tree, rhs: Tree) -> Tree {
        Tree::op(op, Pos::Infix, vec![lhs, rhs])
    }

    pub fn prefix(op: impl Into<String>, arg: Tree) -> Tree {
        Tree::op(op, Pos::Prefix, vec![arg])
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Tree::Op(n) => Some(n),
            Tree::Atom(_) => None,
        }
    }

    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Tree::Op(n) => Some(n),
            Tree::Atom(_) => None,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Tree::Atom(_))
    }
}

/// An ordered sequence of top-level formulas, as produced by the
/// `TextParser` and consumed by the `Optimizer`/`Formatter`.
pub type Program = Vec<Tree>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn infix_shape() {
        let t = Tree::infix("+", Tree::Atom(Atom::int("1")), Tree::Atom(Atom::int("2")));
        let n = t.as_node().unwrap();
        assert_eq!(n.op, "+");
        assert_eq!(n.pos, Pos::Infix);
        assert_eq!(n.args.len(), 2);
    }
}
