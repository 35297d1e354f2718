//! Built-in operators.
//!
//! Every built-in function and operator is a [`Keyword`]. An expression `(sin x)` is a list whose
//! head is the node for [`Keyword::Sin`]; the evaluator dispatches on that head with a single
//! `match`.

use once_cell::sync::Lazy;
use std::{collections::HashMap, fmt};

/// Generates the [`Keyword`] enum along with the table of names used to look keywords up.
macro_rules! keywords {
    ($($variant:ident => $name:literal,)*) => {
        /// A built-in operator or constant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            /// Every keyword, in declaration order.
            pub const ALL: &'static [Keyword] = &[$(Keyword::$variant,)*];

            /// Returns the name of the keyword, as written in source code.
            pub fn name(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $name,)*
                }
            }
        }
    };
}

keywords! {
    Abs => "abs",
    Add => "add",
    Adj => "adj",
    And => "and",
    Arccos => "arccos",
    Arccosh => "arccosh",
    Arcsin => "arcsin",
    Arcsinh => "arcsinh",
    Arctan => "arctan",
    Arctanh => "arctanh",
    Arg => "arg",
    Binding => "binding",
    Ceiling => "ceiling",
    Check => "check",
    Choose => "choose",
    Clear => "clear",
    Clock => "clock",
    Coeff => "coeff",
    Cofactor => "cofactor",
    Conj => "conj",
    Contract => "contract",
    Cos => "cos",
    Cosh => "cosh",
    Defint => "defint",
    Deg => "deg",
    Denominator => "denominator",
    Derivative => "d",
    Det => "det",
    Dim => "dim",
    Do => "do",
    Erf => "erf",
    Erfc => "erfc",
    Eval => "eval",
    Exp => "exp",
    Exp1 => "exp1",
    Factorial => "factorial",
    Float => "float",
    Floor => "floor",
    For => "for",
    Gcd => "gcd",
    Hadamard => "hadamard",
    Imag => "imag",
    Index => "index",
    Infixform => "infixform",
    Inner => "inner",
    Integral => "integral",
    Inv => "inv",
    Isprime => "isprime",
    Kronecker => "kronecker",
    Lcm => "lcm",
    Log => "log",
    Mag => "mag",
    Minor => "minor",
    Minormatrix => "minormatrix",
    Mod => "mod",
    Multiply => "multiply",
    Nil => "nil",
    Noexpand => "noexpand",
    Not => "not",
    Nroots => "nroots",
    Number => "number",
    Numerator => "numerator",
    Or => "or",
    Outer => "outer",
    Pi => "pi",
    Polar => "polar",
    Power => "power",
    Prefixform => "prefixform",
    Product => "product",
    Quote => "quote",
    Rank => "rank",
    Real => "real",
    Rect => "rect",
    Roots => "roots",
    Setq => "setq",
    Sin => "sin",
    Sinh => "sinh",
    Sqrt => "sqrt",
    Stop => "stop",
    String => "string",
    Subst => "subst",
    Sum => "sum",
    Tan => "tan",
    Tanh => "tanh",
    Test => "test",
    Testeq => "testeq",
    Testge => "testge",
    Testgt => "testgt",
    Testle => "testle",
    Testlt => "testlt",
    Transpose => "transpose",
    Unit => "unit",
    Zero => "zero",
}

/// Maps source names to keywords. `dot` is an alias of `inner`.
static BY_NAME: Lazy<HashMap<&'static str, Keyword>> = Lazy::new(|| {
    let mut map = Keyword::ALL.iter()
        .map(|&keyword| (keyword.name(), keyword))
        .collect::<HashMap<_, _>>();
    map.insert("dot", Keyword::Inner);
    map
});

impl Keyword {
    /// Returns the keyword with the given source name, if any.
    pub fn from_name(name: &str) -> Option<Keyword> {
        BY_NAME.get(name).copied()
    }

    /// Returns `true` if the keyword is a constant that evaluates to itself.
    pub fn is_constant(self) -> bool {
        matches!(self, Keyword::Nil | Keyword::Pi | Keyword::Exp1)
    }

    /// Returns the index of the keyword in [`Keyword::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_round_trips() {
        for &keyword in Keyword::ALL {
            assert_eq!(Keyword::from_name(keyword.name()), Some(keyword));
        }
    }

    #[test]
    fn aliases_and_unknown_names() {
        assert_eq!(Keyword::from_name("dot"), Some(Keyword::Inner));
        assert_eq!(Keyword::from_name("d"), Some(Keyword::Derivative));
        assert_eq!(Keyword::from_name("x"), None);
    }

    #[test]
    fn index_matches_position() {
        for (i, keyword) in Keyword::ALL.iter().enumerate() {
            assert_eq!(keyword.index(), i);
        }
    }
}
