//! Parameterizes the lexical, operator, and formatting rules that
//! distinguish one formula surface syntax from another.
//!
//! Grounded on `examples/original_source/src/language.py`'s
//! `LanguageBase`/`LanguagePython`/`LanguageMathematica`: the surface
//! spellings (bracket tokens, assignment tokens, operator names, constant
//! names) are data, not code, so the rest of the crate is written once
//! against this struct instead of once per dialect.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::DialectError;
use crate::tree::{Atom, AtomKind};

lazy_static! {
    static ref CAPITAL_ESCAPE_RE: Regex = Regex::new(r"\\\[Capital(\w+)\]").unwrap();
    static ref NAME_ESCAPE_RE: Regex = Regex::new(r"\\\[(\w+)\]").unwrap();
}

fn identity_pre_process(s: &str) -> String {
    s.to_string()
}

/// Unwraps Mathematica's `\[CapitalXxx]`/`\[name]` named-character escapes:
/// `\[CapitalAlpha]` becomes `Alpha`, and any other `\[name]` becomes
/// `name` lower-cased.
fn mathematica_pre_process(s: &str) -> String {
    let s = CAPITAL_ESCAPE_RE.replace_all(s, "$1").into_owned();
    NAME_ESCAPE_RE.replace_all(&s, |caps: &regex::Captures| caps[1].to_lowercase()).into_owned()
}

#[derive(Debug, Clone)]
pub struct Dialect {
    pub name: String,

    /// Grouping parentheses, e.g. `(` / `)` in both built-in dialects.
    pub lpar: String,
    pub rpar: String,

    /// Function-call brackets and argument delimiter.
    pub func_lpar: String,
    pub func_delim: String,
    pub func_rpar: String,

    /// Array-index brackets and argument delimiter.
    pub array_lpar: String,
    pub array_delim: String,
    pub array_rpar: String,

    /// Every surface spelling this dialect accepts for assignment when
    /// *reading* a formula. The first entry is used when *rendering*.
    pub assign: Vec<String>,

    /// Line terminator used when joining a multi-line rendered program.
    pub eol: String,

    /// Canonical operator id -> surface spelling, consulted by the
    /// formatter for every operator/function, and by the lexer for the
    /// exponentiation operator's input spelling (`^` vs `**`).
    pub operators: HashMap<String, String>,

    /// Canonical constant name (`PI`, `E`) -> surface spelling, consulted
    /// by the formatter when rendering a `Const` atom.
    pub replacements: HashMap<String, String>,

    /// Surface spelling -> canonical constant name, consulted by the
    /// lexer when recognizing a constant on input. Matched case-
    /// insensitively and longest-spelling-first.
    pub consts: Vec<(String, String)>,

    /// When true, integer literals are rendered with a trailing `.` so a
    /// numeric-dialect consumer treats them as floating point.
    pub int2float: bool,

    /// Dialect-specific escape unwrapping applied to a line before it is
    /// tokenized, e.g. the symbolic dialect's `\[CapitalAlpha]`/`\[alpha]`
    /// named-character escapes. A plain identity function for dialects
    /// with no such escapes.
    pub preprocessor: fn(&str) -> String,
}

impl Dialect {
    /// Checks that the dialect's bracket/assignment configuration can
    /// actually be disambiguated by the grammar.
    pub fn validate(&self) -> Result<(), DialectError> {
        if self.lpar == self.rpar {
            return Err(DialectError::new("lpar and rpar must differ"));
        }
        if self.func_lpar == self.func_rpar {
            return Err(DialectError::new("func_lpar and func_rpar must differ"));
        }
        if self.array_lpar == self.array_rpar {
            return Err(DialectError::new("array_lpar and array_rpar must differ"));
        }
        if self.assign.is_empty() {
            return Err(DialectError::new("a dialect must accept at least one assignment spelling"));
        }
        Ok(())
    }

    /// The assignment spelling used when rendering (always the first
    /// accepted spelling, e.g. `=` for both built-in dialects even though
    /// the symbolic dialect also *accepts* `:=` and `==` on input).
    pub fn canonical_assign(&self) -> &str {
        &self.assign[0]
    }

    /// Does this dialect accept `spelling` as an assignment token on input?
    pub fn accepts_assign(&self, spelling: &str) -> bool {
        self.assign.iter().any(|s| s == spelling)
    }

    /// Unwraps this dialect's input escape sequences before tokenizing.
    pub fn pre_process(&self, s: &str) -> String {
        (self.preprocessor)(s)
    }

    /// The input spelling recognized for the exponentiation operator,
    /// falling back to the canonical `^` when a dialect doesn't override
    /// it (only the numeric dialect does, spelling it `**`).
    pub fn exp_token(&self) -> &str {
        self.operators.get("^").map(String::as_str).unwrap_or("^")
    }

    /// Look up the canonical name for a recognized constant's surface
    /// spelling, matching case-insensitively.
    pub fn const_canonical(&self, surface: &str) -> Option<&str> {
        self.consts
            .iter()
            .find(|(s, _)| s.eq_ignore_ascii_case(surface))
            .map(|(_, canon)| canon.as_str())
    }

    /// Render an atom's source text per this dialect's `replacements` map
    /// and `int2float` rule.
    pub fn format_atom(&self, atom: &Atom) -> String {
        match atom.kind {
            AtomKind::Const => self
                .replacements
                .get(&atom.text)
                .cloned()
                .unwrap_or_else(|| atom.text.clone()),
            AtomKind::Int if self.int2float => format!("{}.", atom.text),
            _ => atom.text.clone(),
        }
    }

    /// Surface spelling for a canonical operator/function name, falling
    /// back to the canonical name itself when the dialect doesn't
    /// override it (a function name absent from `operators` is passed
    /// through unchanged, matching the original's `operators.get(op, op)`).
    pub fn operator_spelling(&self, canonical: &str) -> &str {
        self.operators.get(canonical).map(String::as_str).unwrap_or(canonical)
    }

    /// The symbolic (Mathematica-style) built-in dialect.
    pub fn mathematica() -> Dialect {
        let mut operators = HashMap::new();
        for (canon, surface) in [
            ("sign", "Sign"),
            ("sin", "Sin"),
            ("cos", "Cos"),
            ("tan", "Tan"),
            ("arcsin", "ArcSin"),
            ("arccos", "ArcCos"),
            ("arctan", "ArcTan"),
            ("coth", "Coth"),
            ("exp", "Exp"),
            ("ln", "Log"),
            ("sqrt", "Sqrt"),
            ("trunc", "Trunc"),
            ("sphericalharmonic", "SphericalHarmonicY"),
            ("expintegrale", "ExpIntegralE"),
            ("gamma", "Gamma"),
        ] {
            operators.insert(canon.to_string(), surface.to_string());
        }

        let mut replacements = HashMap::new();
        replacements.insert("PI".to_string(), "Pi".to_string());
        replacements.insert("E".to_string(), "E".to_string());

        Dialect {
            name: "mathematica".to_string(),
            lpar: "(".to_string(),
            rpar: ")".to_string(),
            func_lpar: "[".to_string(),
            func_delim: ", ".to_string(),
            func_rpar: "]".to_string(),
            array_lpar: "[[".to_string(),
            array_delim: ",".to_string(),
            array_rpar: "]]".to_string(),
            assign: vec!["=".to_string(), ":=".to_string(), "==".to_string()],
            eol: "\n".to_string(),
            operators,
            replacements,
            consts: vec![
                ("Pi".to_string(), "PI".to_string()),
                ("E".to_string(), "E".to_string()),
            ],
            int2float: false,
            preprocessor: mathematica_pre_process,
        }
    }

    /// The numeric (Python/numpy-style) built-in dialect. `int2float`
    /// matches the original's `LanguagePython(int2float=...)` constructor
    /// argument.
    pub fn python(int2float: bool) -> Dialect {
        let mut operators = HashMap::new();
        for (canon, surface) in [
            ("^", "**"),
            ("UNARY-", "-"),
            ("sign", "np.sign"),
            ("sin", "np.sin"),
            ("cos", "np.cos"),
            ("tan", "np.tan"),
            ("arcsin", "np.asin"),
            ("arccos", "np.acos"),
            ("arctan", "np.atan"),
            ("sinh", "np.sinh"),
            ("cosh", "np.cosh"),
            ("tanh", "np.tanh"),
            ("exp", "np.exp"),
            ("ln", "np.log"),
            ("sqrt", "np.sqrt"),
            ("trunc", "np.trunc"),
            ("sphericalharmonic", "sph_harm"),
            ("expintegrale", "scipy.special.expn"),
            ("gamma", "gamma"),
        ] {
            operators.insert(canon.to_string(), surface.to_string());
        }

        let mut replacements = HashMap::new();
        replacements.insert("PI".to_string(), "np.pi".to_string());
        replacements.insert("E".to_string(), "np.e".to_string());

        Dialect {
            name: "python".to_string(),
            lpar: "(".to_string(),
            rpar: ")".to_string(),
            func_lpar: "(".to_string(),
            func_delim: ",".to_string(),
            func_rpar: ")".to_string(),
            array_lpar: "[".to_string(),
            array_delim: ",".to_string(),
            array_rpar: "]".to_string(),
            assign: vec!["=".to_string()],
            eol: "\n".to_string(),
            operators,
            replacements,
            consts: vec![
                ("np.pi".to_string(), "PI".to_string()),
                ("np.e".to_string(), "E".to_string()),
            ],
            int2float,
            preprocessor: identity_pre_process,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtins_validate() {
        assert!(Dialect::mathematica().validate().is_ok());
        assert!(Dialect::python(false).validate().is_ok());
        assert!(Dialect::python(true).validate().is_ok());
    }

    #[test]
    fn exp_token_differs() {
        assert_eq!(Dialect::mathematica().exp_token(), "^");
        assert_eq!(Dialect::python(false).exp_token(), "**");
    }

    #[test]
    fn int2float_formats_integers() {
        let py = Dialect::python(true);
        assert_eq!(py.format_atom(&Atom::int("4")), "4.");
        assert_eq!(py.format_atom(&Atom::real("4.5")), "4.5");
    }

    #[test]
    fn mathematica_accepts_three_assign_spellings() {
        let math = Dialect::mathematica();
        assert!(math.accepts_assign("="));
        assert!(math.accepts_assign(":="));
        assert!(math.accepts_assign("=="));
        assert!(!Dialect::python(false).accepts_assign("=="));
    }

    #[test]
    fn mathematica_pre_process_unwraps_named_character_escapes() {
        let math = Dialect::mathematica();
        assert_eq!(math.pre_process(r"\[CapitalAlpha]"), "Alpha");
        assert_eq!(math.pre_process(r"\[alpha]"), "alpha");
        assert_eq!(math.pre_process(r"\[CapitalAlpha] + \[beta]"), "Alpha + beta");
    }

    #[test]
    fn python_pre_process_is_identity() {
        let py = Dialect::python(false);
        assert_eq!(py.pre_process(r"\[CapitalAlpha]"), r"\[CapitalAlpha]");
        assert_eq!(py.pre_process("a + b"), "a + b");
    }

    #[test]
    fn mathematica_operators_match_coth_not_sinh_cosh_tanh() {
        let math = Dialect::mathematica();
        assert_eq!(math.operator_spelling("coth"), "Coth");
        assert_eq!(math.operator_spelling("sinh"), "sinh");
        assert_eq!(math.operator_spelling("cosh"), "cosh");
        assert_eq!(math.operator_spelling("tanh"), "tanh");
    }
}
