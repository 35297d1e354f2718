use cas_num::Rational;
use crate::{
    keyword::Keyword,
    node::{Node, NodeRef, Tensor},
    symbol::SymbolId,
};
use super::Interpreter;

impl Interpreter {
    /// Returns the node behind a handle.
    #[inline]
    pub fn node(&self, p: NodeRef) -> &Node {
        self.arena.get(p)
    }

    pub fn is_nil(&self, p: NodeRef) -> bool {
        p == self.consts.nil
    }

    pub fn is_cons(&self, p: NodeRef) -> bool {
        matches!(self.node(p), Node::Cons { .. })
    }

    /// The first element of a pair, or `nil`.
    pub fn car(&self, p: NodeRef) -> NodeRef {
        match self.node(p) {
            Node::Cons { car, .. } => *car,
            _ => self.consts.nil,
        }
    }

    /// The rest of a pair, or `nil`.
    pub fn cdr(&self, p: NodeRef) -> NodeRef {
        match self.node(p) {
            Node::Cons { cdr, .. } => *cdr,
            _ => self.consts.nil,
        }
    }

    pub(crate) fn cadr(&self, p: NodeRef) -> NodeRef {
        self.car(self.cdr(p))
    }

    pub(crate) fn cddr(&self, p: NodeRef) -> NodeRef {
        self.cdr(self.cdr(p))
    }

    pub(crate) fn caddr(&self, p: NodeRef) -> NodeRef {
        self.car(self.cddr(p))
    }

    /// Returns the elements of a list.
    pub fn items(&self, mut p: NodeRef) -> Vec<NodeRef> {
        let mut items = Vec::new();
        while let Node::Cons { car, cdr } = self.node(p) {
            items.push(*car);
            p = *cdr;
        }
        items
    }

    /// Returns the arguments of an application: every element of the list but the head.
    pub fn args(&self, p: NodeRef) -> Vec<NodeRef> {
        self.items(self.cdr(p))
    }

    /// Returns the number of elements of a list.
    pub(crate) fn length(&self, mut p: NodeRef) -> usize {
        let mut n = 0;
        while let Node::Cons { cdr, .. } = self.node(p) {
            n += 1;
            p = *cdr;
        }
        n
    }

    /// Returns the keyword a bare keyword node stands for.
    pub fn keyword_of(&self, p: NodeRef) -> Option<Keyword> {
        match self.node(p) {
            Node::Keyword(keyword) => Some(*keyword),
            _ => None,
        }
    }

    /// Returns the keyword at the head of an application, such as [`Keyword::Add`] for
    /// `(add a b)`.
    pub fn head(&self, p: NodeRef) -> Option<Keyword> {
        match self.node(p) {
            Node::Cons { car, .. } => self.keyword_of(*car),
            _ => None,
        }
    }

    pub(crate) fn is_head(&self, p: NodeRef, keyword: Keyword) -> bool {
        self.head(p) == Some(keyword)
    }

    pub(crate) fn is_keyword(&self, p: NodeRef, keyword: Keyword) -> bool {
        self.keyword_of(p) == Some(keyword)
    }

    pub(crate) fn symbol_id(&self, p: NodeRef) -> Option<SymbolId> {
        match self.node(p) {
            Node::Symbol(id) => Some(*id),
            _ => None,
        }
    }

    /// Returns `true` for user symbols.
    pub(crate) fn is_symbol(&self, p: NodeRef) -> bool {
        matches!(self.node(p), Node::Symbol(_))
    }

    /// Returns the name of a symbol or keyword.
    pub(crate) fn name_of(&self, p: NodeRef) -> Option<&str> {
        match self.node(p) {
            Node::Symbol(id) => Some(self.symbols.name(*id)),
            Node::Keyword(keyword) => Some(keyword.name()),
            _ => None,
        }
    }

    pub(crate) fn rational(&self, p: NodeRef) -> Option<&Rational> {
        match self.node(p) {
            Node::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub(crate) fn double(&self, p: NodeRef) -> Option<f64> {
        match self.node(p) {
            Node::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub(crate) fn tensor(&self, p: NodeRef) -> Option<&Tensor> {
        match self.node(p) {
            Node::Tensor(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn is_tensor(&self, p: NodeRef) -> bool {
        matches!(self.node(p), Node::Tensor(_))
    }

    pub(crate) fn is_num(&self, p: NodeRef) -> bool {
        self.node(p).is_num()
    }

    pub(crate) fn is_rational(&self, p: NodeRef) -> bool {
        matches!(self.node(p), Node::Rational(_))
    }

    pub(crate) fn is_double(&self, p: NodeRef) -> bool {
        matches!(self.node(p), Node::Double(_))
    }

    /// Returns the value of a number as a double.
    pub(crate) fn to_f64(&self, p: NodeRef) -> Option<f64> {
        match self.node(p) {
            Node::Rational(r) => Some(r.to_f64()),
            Node::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns `true` for rational integers.
    pub(crate) fn is_integer(&self, p: NodeRef) -> bool {
        self.rational(p).map_or(false, Rational::is_integer)
    }

    /// Returns the value of a rational integer that fits in an `i64`.
    pub(crate) fn small_integer(&self, p: NodeRef) -> Option<i64> {
        self.rational(p).filter(|r| r.is_integer()).and_then(Rational::to_i64)
    }

    /// Returns `true` for a rational that is not an integer.
    pub(crate) fn is_fraction(&self, p: NodeRef) -> bool {
        self.rational(p).map_or(false, |r| !r.is_integer())
    }

    pub(crate) fn is_zero(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Rational(r) => r.is_zero(),
            Node::Double(d) => *d == 0.0,
            Node::Tensor(t) => t.elems.iter().all(|&e| self.is_zero(e)),
            _ => false,
        }
    }

    pub(crate) fn is_one(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Rational(r) => r.is_one(),
            Node::Double(d) => *d == 1.0,
            _ => false,
        }
    }

    pub(crate) fn is_minus_one(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Rational(r) => r.is_minus_one(),
            Node::Double(d) => *d == -1.0,
            _ => false,
        }
    }

    pub(crate) fn is_negative_number(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Rational(r) => r.is_negative(),
            Node::Double(d) => *d < 0.0,
            _ => false,
        }
    }

    pub(crate) fn is_positive_number(&self, p: NodeRef) -> bool {
        match self.node(p) {
            Node::Rational(r) => r.is_positive(),
            Node::Double(d) => *d > 0.0,
            _ => false,
        }
    }

    /// Returns `true` for rational one half.
    pub(crate) fn is_half(&self, p: NodeRef) -> bool {
        self.rational(p).map_or(false, Rational::is_half)
    }

    /// Returns `true` for a power of minus one, such as `(-1)^(1/2)`.
    pub(crate) fn is_imaginary_factor(&self, p: NodeRef) -> bool {
        self.is_head(p, Keyword::Power) && self.is_minus_one(self.cadr(p))
    }

    /// Returns `true` for the imaginary unit `(-1)^(1/2)`.
    pub(crate) fn is_imaginary_unit(&self, p: NodeRef) -> bool {
        p == self.consts.imaginary_unit
            || (self.is_imaginary_factor(p) && self.is_half(self.caddr(p)))
    }

    /// Returns `true` for a term with an imaginary factor.
    pub(crate) fn is_imaginary_term(&self, p: NodeRef) -> bool {
        if self.is_imaginary_factor(p) {
            return true;
        }
        self.is_head(p, Keyword::Multiply)
            && self.args(p).into_iter().any(|f| self.is_imaginary_factor(f))
    }

    /// Returns `true` for a negative number or a product with a negative coefficient.
    pub(crate) fn is_negative_term(&self, p: NodeRef) -> bool {
        self.is_negative_number(p)
            || (self.is_head(p, Keyword::Multiply) && self.is_negative_number(self.cadr(p)))
    }

    /// Returns `true` for a negative term, or a sum whose leading term is negative.
    pub(crate) fn is_negative(&self, p: NodeRef) -> bool {
        self.is_negative_term(p)
            || (self.is_head(p, Keyword::Add) && self.is_negative_term(self.cadr(p)))
    }

    /// Returns `true` if `q` occurs anywhere inside `p`.
    pub(crate) fn contains(&self, p: NodeRef, q: NodeRef) -> bool {
        if self.equal(p, q) {
            return true;
        }
        match self.node(p) {
            Node::Cons { car, cdr } => self.contains(*car, q) || self.contains(*cdr, q),
            Node::Tensor(t) => t.elems.iter().any(|&e| self.contains(e, q)),
            _ => false,
        }
    }

    /// Returns `true` if `p` has a power of minus one anywhere inside it.
    pub(crate) fn contains_imaginary(&self, p: NodeRef) -> bool {
        if self.is_imaginary_factor(p) {
            return true;
        }
        match self.node(p) {
            Node::Cons { car, cdr } => self.contains_imaginary(*car) || self.contains_imaginary(*cdr),
            Node::Tensor(t) => t.elems.iter().any(|&e| self.contains_imaginary(e)),
            _ => false,
        }
    }
}
