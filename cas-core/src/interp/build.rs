use cas_num::Rational;
use crate::{
    error::{kind, Error, Result},
    keyword::Keyword,
    node::{Node, NodeRef, Tensor, MAX_RANK},
};
use super::Interpreter;

impl Interpreter {
    /// Allocates a node in the arena.
    pub(crate) fn alloc(&mut self, node: Node) -> Result<NodeRef> {
        self.arena.alloc(node)
    }

    /// Returns the node of a keyword.
    pub fn keyword(&self, keyword: Keyword) -> NodeRef {
        self.keywords[keyword.index()]
    }

    pub(crate) fn cons(&mut self, car: NodeRef, cdr: NodeRef) -> Result<NodeRef> {
        self.alloc(Node::Cons { car, cdr })
    }

    /// Builds a proper list of the given items.
    pub(crate) fn list(&mut self, items: &[NodeRef]) -> Result<NodeRef> {
        let mut list = self.consts.nil;
        for &item in items.iter().rev() {
            list = self.cons(item, list)?;
        }
        Ok(list)
    }

    /// Builds the application `(keyword args...)`.
    pub(crate) fn apply(&mut self, keyword: Keyword, args: &[NodeRef]) -> Result<NodeRef> {
        let args = self.list(args)?;
        let head = self.keyword(keyword);
        self.cons(head, args)
    }

    /// Returns a node holding the rational, reusing the shared nodes of zero, one and minus one.
    pub(crate) fn rational_node(&mut self, r: Rational) -> Result<NodeRef> {
        if r.is_zero() {
            Ok(self.consts.zero)
        } else if r.is_one() {
            Ok(self.consts.one)
        } else if r.is_minus_one() {
            Ok(self.consts.minus_one)
        } else {
            self.alloc(Node::Rational(r))
        }
    }

    pub(crate) fn integer(&mut self, n: i64) -> Result<NodeRef> {
        self.rational_node(Rational::from_i64(n))
    }

    /// Returns the node of `num/den`.
    pub(crate) fn fraction(&mut self, num: i64, den: i64) -> Result<NodeRef> {
        let r = Rational::new_i64(num, den)?;
        self.rational_node(r)
    }

    pub(crate) fn double_node(&mut self, d: f64) -> Result<NodeRef> {
        self.alloc(Node::Double(d))
    }

    pub(crate) fn string_node(&mut self, s: &str) -> Result<NodeRef> {
        self.alloc(Node::Str(s.into()))
    }

    /// Allocates a tensor. Tensors of rank zero collapse to their single element.
    pub(crate) fn tensor_node(&mut self, dims: Vec<usize>, elems: Vec<NodeRef>) -> Result<NodeRef> {
        if dims.len() > MAX_RANK {
            return Err(Error::new(kind::RankTooLarge { rank: dims.len() }));
        }
        if Tensor::size_of(&dims) != elems.len() {
            return Err(Error::new(kind::InternalError { message: "tensor size does not match its dimensions" }));
        }
        if dims.is_empty() {
            return Ok(elems[0]);
        }
        self.alloc(Node::Tensor(Box::new(Tensor { dims, elems })))
    }

    /// Returns the node of the symbol with the given name, creating the symbol if needed. Names
    /// of keywords return the keyword's node.
    pub fn intern(&mut self, name: &str) -> Result<NodeRef> {
        if let Some(keyword) = Keyword::from_name(name) {
            return Ok(self.keyword(keyword));
        }
        if let Some(id) = self.symbols.lookup(name) {
            return Ok(self.symbols.node(id));
        }

        let id = self.symbols.reserve(name)?;
        let node = self.alloc(Node::Symbol(id))?;
        self.symbols.insert(name, node);
        Ok(node)
    }
}
