//! Common-subexpression elimination.
//!
//! Grounded function-for-function on
//! `examples/original_source/src/parser_text.py`: the same cost table,
//! the same "sum of costs across every occurrence, by structural hash"
//! bookkeeping, the same max-summed-cost selection with its
//! `optimize_threshold` gate, and the same repeat-until-unprofitable outer
//! loop. Supplementary grounding for the *shape* of a Rust CSE pass (an
//! identifier/hash -> occurrence-count accumulator, rewriting into a new
//! program rather than mutating in place) comes from
//! `examples/other_examples`'s DataFusion `common_subexpr_eliminate.rs.rs`.
//!
//! The structural hash must be stable across process runs (so a fixed
//! temp-variable assignment order is reproducible), which rules out
//! `std`'s `RandomState`/`DefaultHasher` — both reseed per process. A
//! small FNV-1a mix is used instead, applied the same way the original
//! builds its hash: stringify the operator's hash, append each child's
//! stringified hash, hash the resulting string once.

use std::collections::HashMap;

use crate::tree::{Atom, Pos, Program, Tree};

const DEFAULT_COST: f64 = 10.0;
const OPTIMIZE_THRESHOLD: f64 = 5.0;
const ASSIGN_COST: f64 = 2.0;

fn op_cost(op: &str, pos: Pos) -> f64 {
    if pos == Pos::Array {
        return 0.0;
    }
    match op {
        "UNARY-" => 0.0,
        "+" | "-" | "*" => 1.0,
        "/" => 2.0,
        "^" => 5.0,
        "=" => ASSIGN_COST,
        "exp" => 3.0,
        _ => DEFAULT_COST,
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn atom_hash(a: &Atom) -> u64 {
    fnv1a(format!("{:?}:{}", a.kind, a.text).as_bytes())
}

/// Annotates every node in the tree with its (additive) cost and its
/// structural hash, returning the tree's own `(cost, hash)`.
fn annotate_rec(t: &mut Tree) -> (f64, u64) {
    match t {
        Tree::Atom(a) => (0.0, atom_hash(a)),
        Tree::Op(n) => {
            let mut cost = op_cost(&n.op, n.pos);
            let mut hash_input = fnv1a(n.op.as_bytes()).to_string();
            for child in n.args.iter_mut() {
                let (child_cost, child_hash) = annotate_rec(child);
                cost += child_cost;
                hash_input.push_str(&child_hash.to_string());
            }
            let hash = fnv1a(hash_input.as_bytes());
            n.cost = Some(cost);
            n.hash = Some(hash);
            (cost, hash)
        }
    }
}

/// Annotates every tree in the program and returns its total cost.
pub fn annotate(program: &mut Program) -> f64 {
    program.iter_mut().map(|t| annotate_rec(t).0).sum()
}

fn collect_costs_rec(t: &Tree, order: &mut Vec<u64>, costs: &mut HashMap<u64, f64>, counts: &mut HashMap<u64, u32>) {
    if let Tree::Op(n) = t {
        let hash = n.hash.expect("annotate must run before collecting costs");
        let cost = n.cost.expect("annotate must run before collecting costs");
        if !costs.contains_key(&hash) {
            order.push(hash);
        }
        *costs.entry(hash).or_insert(0.0) += cost;
        *counts.entry(hash).or_insert(0) += 1;
        for child in &n.args {
            collect_costs_rec(child, order, costs, counts);
        }
    }
}

/// Replaces every occurrence of a node whose hash is `target` with a
/// reference to `temp_name`, capturing the first such node encountered
/// (in tree-preorder, left to right) as the definition to hoist. Does
/// not recurse into a matched subtree, matching the original's halt-on-
/// match behavior.
fn replace_rec(t: Tree, target: u64, temp_name: &str, extracted: &mut Option<Tree>) -> (Tree, bool) {
    if let Tree::Op(ref n) = t {
        if n.hash == Some(target) {
            if extracted.is_none() {
                *extracted = Some(t.clone());
            }
            return (Tree::Atom(Atom::ident(temp_name.to_string())), true);
        }
    }
    match t {
        Tree::Atom(_) => (t, false),
        Tree::Op(mut n) => {
            let mut changed = false;
            let mut new_args = Vec::with_capacity(n.args.len());
            for arg in n.args.drain(..) {
                let (new_arg, arg_changed) = replace_rec(arg, target, temp_name, extracted);
                changed |= arg_changed;
                new_args.push(new_arg);
            }
            n.args = new_args;
            (Tree::Op(n), changed)
        }
    }
}

/// A single rewrite pass: finds the highest summed-cost repeated
/// subexpression (if any clears `OPTIMIZE_THRESHOLD`) and hoists it into
/// a `temp_name = <subexpression>` assignment inserted just before its
/// first use. Returns `None` when no profitable rewrite exists.
fn optimize_once(program: &Program, temp_name: &str) -> Option<(Program, f64)> {
    let mut annotated = program.clone();
    let cost_before = annotate(&mut annotated);
    if cost_before < OPTIMIZE_THRESHOLD {
        return None;
    }

    let mut order = Vec::new();
    let mut costs = HashMap::new();
    let mut counts = HashMap::new();
    for t in &annotated {
        collect_costs_rec(t, &mut order, &mut costs, &mut counts);
    }
    costs.retain(|h, _| counts.get(h).copied().unwrap_or(0) >= 2);
    if costs.is_empty() {
        return None;
    }

    // First-seen-wins tie-break, matching Python's insertion-ordered dict.
    let mut hash_replace = None;
    let mut best = f64::MIN;
    for h in &order {
        if let Some(&c) = costs.get(h) {
            if c > best {
                best = c;
                hash_replace = Some(*h);
            }
        }
    }
    let hash_replace = hash_replace?;
    if best - ASSIGN_COST < OPTIMIZE_THRESHOLD {
        return None;
    }

    let mut extracted: Option<Tree> = None;
    let mut first_line = None;
    let mut rewritten = Vec::with_capacity(annotated.len());
    for (i, t) in annotated.into_iter().enumerate() {
        let (new_t, changed) = replace_rec(t, hash_replace, temp_name, &mut extracted);
        if changed && first_line.is_none() {
            first_line = Some(i);
        }
        rewritten.push(new_t);
    }
    let extracted = extracted?;
    let first_line = first_line?;
    rewritten.insert(
        first_line,
        Tree::infix("=", Tree::Atom(Atom::ident(temp_name.to_string())), extracted),
    );

    let mut final_program = rewritten.clone();
    let cost_after = annotate(&mut final_program);
    Some((final_program, cost_before - cost_after))
}

/// Repeatedly hoists the most valuable repeated subexpression until no
/// rewrite saves more than `OPTIMIZE_THRESHOLD`.
pub fn optimize(program: &Program) -> Program {
    let mut current = program.clone();
    let mut counter = 0usize;
    loop {
        let temp_name = format!("t_{}", counter);
        match optimize_once(&current, &temp_name) {
            Some((next, savings)) if savings > OPTIMIZE_THRESHOLD => {
                current = next;
                counter += 1;
            }
            _ => break,
        }
    }
    current
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dialect::Dialect;
    use crate::text_parser::parse_text;

    fn shape(t: &Tree) -> String {
        match t {
            Tree::Atom(a) => a.text.clone(),
            Tree::Op(n) => {
                let args: Vec<String> = n.args.iter().map(shape).collect();
                format!("{}({})", n.op, args.join(","))
            }
        }
    }

    #[test]
    fn identical_subtrees_hash_equal() {
        let d = Dialect::mathematica();
        let mut program = parse_text(&d, "a=Sin[x]\nb=Sin[x]").unwrap();
        annotate(&mut program);
        let rhs_hash = |t: &Tree| t.as_node().unwrap().args[1].as_node().unwrap().hash;
        assert_eq!(rhs_hash(&program[0]), rhs_hash(&program[1]));
    }

    #[test]
    fn hoists_repeated_call_before_first_use() {
        let d = Dialect::mathematica();
        let program = parse_text(&d, "a=Sin[x]\nb=Sin[x]").unwrap();
        let optimized = optimize(&program);
        assert_eq!(optimized.len(), 3);
        assert_eq!(shape(&optimized[0]), "=(t_0,sin(x))");
        assert_eq!(shape(&optimized[1]), "=(a,t_0)");
        assert_eq!(shape(&optimized[2]), "=(b,t_0)");
    }

    #[test]
    fn leaves_cheap_programs_unoptimized() {
        let d = Dialect::mathematica();
        let program = parse_text(&d, "a = 1\nb = 2").unwrap();
        let optimized = optimize(&program);
        assert_eq!(optimized.len(), 2);
        assert_eq!(shape(&optimized[0]), "=(a,1)");
        assert_eq!(shape(&optimized[1]), "=(b,2)");
    }

    #[test]
    fn monotone_cost_never_increases() {
        let d = Dialect::mathematica();
        let program = parse_text(&d, "a=Sin[x]\nb=Sin[x]+Cos[x]\nc=Sin[x]*Cos[x]").unwrap();
        let mut before = program.clone();
        let cost_before = annotate(&mut before);
        let mut after = optimize(&program);
        let cost_after = annotate(&mut after);
        assert!(cost_after <= cost_before);
    }
}
