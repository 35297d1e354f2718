//! The universal value type.
//!
//! Every expression is built from [`Node`]s stored in an [`Arena`]. Nodes refer to each other by
//! [`NodeRef`] handle, so a subexpression may be shared by several parents. Nodes are never
//! mutated after they are published; rewriting always builds new nodes.

pub mod arena;

pub use arena::Arena;

use cas_num::Rational;
use crate::{keyword::Keyword, symbol::SymbolId};

/// The maximum rank of a tensor.
pub const MAX_RANK: usize = 24;

/// A handle to a node in an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub(crate) u32);

impl NodeRef {
    /// Returns the index of the node in its arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A dense, row-major array of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    /// The size of each axis, outermost first.
    pub dims: Vec<usize>,

    /// The elements, in row-major order.
    pub elems: Vec<NodeRef>,
}

impl Tensor {
    /// Returns the number of axes.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the number of elements a tensor with the given dimensions holds.
    pub fn size_of(dims: &[usize]) -> usize {
        dims.iter().product()
    }

    /// Returns `true` if the tensor is a square matrix.
    pub fn is_square(&self) -> bool {
        self.dims.len() == 2 && self.dims[0] == self.dims[1]
    }
}

/// A node of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An unused arena slot.
    Free,

    /// A pair. Expressions are proper lists of pairs terminated by [`Keyword::Nil`].
    Cons { car: NodeRef, cdr: NodeRef },

    /// A built-in operator or constant.
    Keyword(Keyword),

    /// A user symbol.
    Symbol(SymbolId),

    /// An exact number.
    Rational(Rational),

    /// A floating-point number.
    Double(f64),

    /// A string.
    Str(Box<str>),

    /// A tensor.
    Tensor(Box<Tensor>),
}

impl Node {
    /// Returns `true` if the node is a number.
    pub fn is_num(&self) -> bool {
        matches!(self, Node::Rational(_) | Node::Double(_))
    }
}
