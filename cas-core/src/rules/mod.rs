//! Rewrite rules of the built-in functions.
//!
//! Each rule is a method that takes an evaluated argument and returns `Some(result)` if the rule
//! applies, or `None` if it does not. A function's combinator tries its rules in order, and
//! leaves the application unevaluated when none of them applies.

mod circular;
mod complex;
mod control;
mod explog;
mod hyperbolic;
mod logic;
mod number;

use crate::{
    error::Result,
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// A rewrite rule for the argument of a function.
pub(crate) type Rule = fn(&mut Interpreter, NodeRef) -> Result<Option<NodeRef>>;

impl Interpreter {
    /// Returns the result of the first rule that applies to `p`.
    pub(crate) fn apply_rules(&mut self, p: NodeRef, rules: &[Rule]) -> Result<Option<NodeRef>> {
        for rule in rules {
            if let Some(q) = rule(self, p)? {
                return Ok(Some(q));
            }
        }
        Ok(None)
    }

    /// Pops the argument of a one-argument function and pushes the result of the first rule that
    /// applies to it, or the unevaluated application. Tensors are mapped element by element.
    pub(crate) fn unary_rules(&mut self, keyword: Keyword, rules: &[Rule]) -> Result<()> {
        let p = self.pop()?;

        if let Some(t) = self.tensor(p) {
            let (dims, elems) = (t.dims.clone(), t.elems.clone());
            let mut mapped = Vec::with_capacity(elems.len());
            for elem in elems {
                self.push(elem)?;
                self.unary_rules(keyword, rules)?;
                mapped.push(self.pop()?);
            }
            let p = self.tensor_node(dims, mapped)?;
            return self.push(p);
        }

        let result = match self.apply_rules(p, rules)? {
            Some(q) => q,
            None => self.apply(keyword, &[p])?,
        };
        self.push(result)
    }

    /// Applies the stack combinator `f` to `p` and returns the result.
    pub(crate) fn call1(&mut self, f: fn(&mut Self) -> Result<()>, p: NodeRef) -> Result<NodeRef> {
        self.push(p)?;
        f(self)?;
        self.pop()
    }

    /// Pushes `1` for true and `0` for false.
    pub(crate) fn push_bool(&mut self, value: bool) -> Result<()> {
        let p = if value { self.consts.one } else { self.consts.zero };
        self.push(p)
    }
}
