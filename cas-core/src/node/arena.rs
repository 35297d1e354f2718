use crate::error::{kind, Error, Result};
use super::{Node, NodeRef};

/// The pool every node is allocated from.
///
/// The arena grows one block of nodes at a time up to a fixed number of blocks. Unreachable
/// nodes are reclaimed by [`Arena::collect`], a mark-and-sweep collector that traces from the
/// roots it is given.
#[derive(Debug)]
pub struct Arena {
    nodes: Vec<Node>,
    marks: Vec<bool>,
    free_list: Vec<u32>,
    blocks: usize,
    block_size: usize,
    max_blocks: usize,

    /// Number of allocations since the last collection.
    allocs_since_gc: usize,
}

impl Arena {
    /// Creates an arena holding a single block.
    pub fn new(block_size: usize, max_blocks: usize) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            marks: Vec::new(),
            free_list: Vec::new(),
            blocks: 0,
            block_size: block_size.max(1),
            max_blocks: max_blocks.max(1),
            allocs_since_gc: 0,
        };
        arena.grow();
        arena
    }

    /// Adds a block of free nodes. Returns `false` if the arena is at its maximum size.
    fn grow(&mut self) -> bool {
        if self.blocks >= self.max_blocks {
            return false;
        }

        let start = self.nodes.len();
        let end = start + self.block_size;
        self.nodes.resize(end, Node::Free);
        self.marks.resize(end, false);

        // lowest index on top, so allocation walks the block in order
        self.free_list.extend((start as u32..end as u32).rev());
        self.blocks += 1;
        log::debug!("node arena grew to {} blocks ({} nodes)", self.blocks, self.nodes.len());
        true
    }

    /// Allocates a node.
    pub fn alloc(&mut self, node: Node) -> Result<NodeRef> {
        if self.free_list.is_empty() && !self.grow() {
            log::error!("node arena exhausted at {} blocks", self.blocks);
            return Err(Error::new(kind::ArenaExhausted));
        }

        let index = self.free_list.pop()
            .ok_or_else(|| Error::new(kind::InternalError { message: "empty free list" }))?;
        self.nodes[index as usize] = node;
        self.allocs_since_gc += 1;
        Ok(NodeRef(index))
    }

    /// Returns the node behind the handle.
    #[inline]
    pub fn get(&self, p: NodeRef) -> &Node {
        &self.nodes[p.index()]
    }

    /// Returns the number of allocations since the last collection.
    pub fn allocs_since_gc(&self) -> usize {
        self.allocs_since_gc
    }

    /// Returns `true` if no node can be allocated without a collection.
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty() && self.blocks >= self.max_blocks
    }

    /// Returns the number of blocks in use.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Returns the number of nodes in use.
    pub fn live(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    /// Reclaims every node not reachable from `roots`. Returns the number of nodes reclaimed.
    ///
    /// Any node held only by a caller (for example on the operand stack) is lost, so the
    /// interpreter only collects between statements.
    pub fn collect(&mut self, roots: impl IntoIterator<Item = NodeRef>) -> usize {
        log::debug!("starting node collection ({} live nodes)", self.live());
        self.mark(roots);
        let collected = self.sweep();
        self.allocs_since_gc = 0;
        log::debug!("node collection completed: {} collected, {} live", collected, self.live());
        collected
    }

    /// Marks every node reachable from the roots.
    fn mark(&mut self, roots: impl IntoIterator<Item = NodeRef>) {
        let mut pending = roots.into_iter().collect::<Vec<_>>();
        while let Some(p) = pending.pop() {
            let i = p.index();
            if self.marks[i] {
                continue;
            }
            self.marks[i] = true;

            match &self.nodes[i] {
                Node::Cons { car, cdr } => {
                    pending.push(*car);
                    pending.push(*cdr);
                },
                Node::Tensor(tensor) => pending.extend(tensor.elems.iter().copied()),
                _ => (),
            }
        }
    }

    /// Frees every unmarked node and clears the marks.
    fn sweep(&mut self) -> usize {
        let mut collected = 0;
        for i in 0..self.nodes.len() {
            if self.marks[i] {
                self.marks[i] = false;
            } else if !matches!(self.nodes[i], Node::Free) {
                // dropping the node releases its digits, elements or text
                self.nodes[i] = Node::Free;
                self.free_list.push(i as u32);
                collected += 1;
            }
        }
        collected
    }
}

#[cfg(test)]
mod tests {
    use crate::keyword::Keyword;
    use super::*;

    #[test]
    fn unreachable_nodes_are_reclaimed() {
        let mut arena = Arena::new(16, 1);
        let nil = arena.alloc(Node::Keyword(Keyword::Nil)).unwrap();
        let kept = arena.alloc(Node::Double(1.0)).unwrap();
        let list = arena.alloc(Node::Cons { car: kept, cdr: nil }).unwrap();
        let dropped = arena.alloc(Node::Double(2.0)).unwrap();

        assert_eq!(arena.live(), 4);
        assert_eq!(arena.collect([nil, list]), 1);
        assert_eq!(arena.live(), 3);
        assert_eq!(arena.get(dropped), &Node::Free);
        assert_eq!(arena.get(kept), &Node::Double(1.0));
        assert_eq!(arena.allocs_since_gc(), 0);
    }

    #[test]
    fn grows_then_exhausts() {
        let mut arena = Arena::new(2, 2);
        for _ in 0..4 {
            arena.alloc(Node::Double(0.0)).unwrap();
        }
        assert_eq!(arena.blocks(), 2);
        assert!(arena.is_full());

        let err = arena.alloc(Node::Double(0.0)).unwrap_err();
        assert!(err.is::<kind::ArenaExhausted>());
        assert!(err.is_fatal());
    }

    #[test]
    fn collection_makes_room() {
        let mut arena = Arena::new(2, 1);
        let a = arena.alloc(Node::Double(1.0)).unwrap();
        arena.alloc(Node::Double(2.0)).unwrap();
        assert!(arena.is_full());

        arena.collect([a]);
        assert!(!arena.is_full());
        assert!(arena.alloc(Node::Double(3.0)).is_ok());
    }

    #[test]
    fn tensor_elements_are_traced() {
        let mut arena = Arena::new(8, 1);
        let x = arena.alloc(Node::Double(1.0)).unwrap();
        let t = arena.alloc(Node::Tensor(Box::new(super::super::Tensor {
            dims: vec![1],
            elems: vec![x],
        }))).unwrap();
        assert_eq!(arena.collect([t]), 0);
        assert_eq!(arena.get(x), &Node::Double(1.0));
    }
}
