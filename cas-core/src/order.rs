//! The canonical total order of expressions.
//!
//! Sums and products keep their operands sorted, so two canonical expressions are equal exactly
//! when they are structurally identical.

use crate::{
    interp::Interpreter,
    keyword::Keyword,
    node::{Node, NodeRef},
};
use std::cmp::Ordering;

impl Interpreter {
    /// Compares two expressions structurally.
    ///
    /// `nil` sorts first, then numbers by value, strings, symbols by name, tensors, and finally
    /// lists element by element.
    pub fn compare(&self, p1: NodeRef, p2: NodeRef) -> Ordering {
        if p1 == p2 {
            return Ordering::Equal;
        }
        if self.is_nil(p1) {
            return Ordering::Less;
        }
        if self.is_nil(p2) {
            return Ordering::Greater;
        }

        match (self.node(p1), self.node(p2)) {
            (Node::Rational(a), Node::Rational(b)) => a.cmp(b),
            (a, b) if a.is_num() && b.is_num() => {
                let (a, b) = (self.to_f64(p1).unwrap_or(0.0), self.to_f64(p2).unwrap_or(0.0));
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            },
            (a, _) if a.is_num() => Ordering::Less,
            (_, b) if b.is_num() => Ordering::Greater,

            (Node::Str(a), Node::Str(b)) => a.cmp(b),
            (Node::Str(_), _) => Ordering::Less,
            (_, Node::Str(_)) => Ordering::Greater,

            (Node::Symbol(_) | Node::Keyword(_), Node::Symbol(_) | Node::Keyword(_)) => {
                self.name_of(p1).cmp(&self.name_of(p2))
            },
            (Node::Symbol(_) | Node::Keyword(_), _) => Ordering::Less,
            (_, Node::Symbol(_) | Node::Keyword(_)) => Ordering::Greater,

            (Node::Tensor(a), Node::Tensor(b)) => a.dims.len().cmp(&b.dims.len())
                .then_with(|| a.dims.cmp(&b.dims))
                .then_with(|| {
                    a.elems.iter().zip(&b.elems)
                        .map(|(&x, &y)| self.compare(x, y))
                        .find(|ord| ord.is_ne())
                        .unwrap_or(Ordering::Equal)
                }),
            (Node::Tensor(_), _) => Ordering::Less,
            (_, Node::Tensor(_)) => Ordering::Greater,

            _ => self.compare_lists(p1, p2),
        }
    }

    fn compare_lists(&self, mut p1: NodeRef, mut p2: NodeRef) -> Ordering {
        while self.is_cons(p1) && self.is_cons(p2) {
            let ord = self.compare(self.car(p1), self.car(p2));
            if ord.is_ne() {
                return ord;
            }
            p1 = self.cdr(p1);
            p2 = self.cdr(p2);
        }
        match (self.is_cons(p1), self.is_cons(p2)) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    /// Returns `true` if two expressions are structurally identical.
    pub fn equal(&self, p1: NodeRef, p2: NodeRef) -> bool {
        self.compare(p1, p2).is_eq()
    }

    /// Returns the class of a factor: 1 for numbers, 2 for powers of numbers, 3 for powers of
    /// minus one, 4 for most expressions, 5 for exponentials and 6 for derivatives.
    fn factor_class(&self, p: NodeRef) -> u8 {
        if self.is_num(p) {
            return 1;
        }
        if self.is_keyword(p, Keyword::Exp1) {
            return 5;
        }
        if self.is_head(p, Keyword::Derivative) {
            return 6;
        }
        if self.is_head(p, Keyword::Power) {
            let base = self.cadr(p);
            if self.is_minus_one(base) {
                return 3;
            }
            if self.is_num(base) {
                return 2;
            }
            if self.is_keyword(base, Keyword::Exp1) {
                return 5;
            }
            if self.is_head(base, Keyword::Derivative) {
                return 6;
            }
        }
        4
    }

    /// Splits a factor into its base and exponent.
    pub(crate) fn base_and_exponent(&self, p: NodeRef) -> (NodeRef, NodeRef) {
        if self.is_head(p, Keyword::Power) {
            (self.cadr(p), self.caddr(p))
        } else {
            (p, self.consts.one)
        }
    }

    /// Orders the factors of a product: by class, then by base, then by descending exponent.
    pub(crate) fn compare_factors(&self, p1: NodeRef, p2: NodeRef) -> Ordering {
        let ord = self.factor_class(p1).cmp(&self.factor_class(p2));
        if ord.is_ne() {
            return ord;
        }

        let (base1, expo1) = self.base_and_exponent(p1);
        let (base2, expo2) = self.base_and_exponent(p2);
        self.compare(base1, base2).then_with(|| self.compare(expo2, expo1))
    }

    /// Returns the factors of a term without its numeric coefficient.
    fn term_factors(&self, p: NodeRef) -> Vec<NodeRef> {
        if self.is_head(p, Keyword::Multiply) {
            let mut factors = self.args(p);
            if factors.first().map_or(false, |&f| self.is_num(f)) {
                factors.remove(0);
            }
            factors
        } else {
            vec![p]
        }
    }

    /// Orders the terms of a sum: real terms before imaginary ones, numbers last, and otherwise
    /// by their factors.
    pub(crate) fn compare_terms(&self, p1: NodeRef, p2: NodeRef) -> Ordering {
        match (self.is_imaginary_term(p1), self.is_imaginary_term(p2)) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => (),
        }

        match (self.is_num(p1), self.is_num(p2)) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => (),
        }

        let f1 = self.term_factors(p1);
        let f2 = self.term_factors(p2);
        match (f1.len(), f2.len()) {
            (0, _) | (_, 0) => f1.len().cmp(&f2.len()),
            (1, 1) => self.compare_factors(f1[0], f2[0]),
            (_, 1) => match self.compare_factors(f1[0], f2[0]) {
                Ordering::Equal => Ordering::Greater,
                ord => ord,
            },
            (1, _) => match self.compare_factors(f1[0], f2[0]) {
                Ordering::Equal => Ordering::Less,
                ord => ord,
            },
            _ => f1.iter().zip(&f2)
                .map(|(&a, &b)| self.compare_factors(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| f1.len().cmp(&f2.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Interpreter;
    use std::cmp::Ordering;

    #[test]
    fn numbers_before_symbols() {
        let mut interp = Interpreter::new();
        let two = interp.integer(2).unwrap();
        let x = interp.intern("x").unwrap();
        assert_eq!(interp.compare(two, x), Ordering::Less);
        assert_eq!(interp.compare(x, two), Ordering::Greater);
    }

    #[test]
    fn symbols_by_name() {
        let mut interp = Interpreter::new();
        let a = interp.intern("a").unwrap();
        let b = interp.intern("b").unwrap();
        assert_eq!(interp.compare(a, b), Ordering::Less);
        assert!(interp.equal(a, a));
    }

    #[test]
    fn higher_powers_first() {
        let mut interp = Interpreter::new();
        let x = interp.intern("x").unwrap();
        let two = interp.integer(2).unwrap();
        let square = interp.apply(crate::keyword::Keyword::Power, &[x, two]).unwrap();
        assert_eq!(interp.compare_factors(square, x), Ordering::Less);
        assert_eq!(interp.compare_terms(square, x), Ordering::Less);
    }

    #[test]
    fn numeric_terms_last() {
        let mut interp = Interpreter::new();
        let x = interp.intern("x").unwrap();
        let one = interp.consts.one;
        assert_eq!(interp.compare_terms(one, x), Ordering::Greater);
    }
}
