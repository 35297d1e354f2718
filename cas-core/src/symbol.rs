//! User symbols and their bindings.
//!
//! The symbol table owns every user symbol ever created, along with two slots per symbol: its
//! binding (the value of `x` after `x = 1`) and its user function (the body of `f` after
//! `f(x) = x^2`). Unset slots hold the `nil` node.
//!
//! Two stacks support scoped changes. The frame stack saves a symbol's slots so that loops and
//! function calls can rebind it temporarily, and the journal records the first change to each
//! symbol since the innermost mark while journaling is on, so that a failed statement (or a
//! failed speculative rewrite) can be rolled back. Later changes to the same symbol need no entry:
//! rolling back only ever returns to the value at the mark.

use crate::{
    config::Config,
    error::{kind, Error, Result},
    node::NodeRef,
};

/// The number of buckets in the symbol table: one per letter plus one for everything else.
pub const BUCKETS: usize = 27;

/// Identifies a user symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// The slots of a symbol at some point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Saved {
    pub symbol: SymbolId,
    pub binding: NodeRef,
    pub usrfunc: NodeRef,
}

#[derive(Debug)]
struct Entry {
    name: Box<str>,
    node: NodeRef,
    binding: NodeRef,
    usrfunc: NodeRef,
    /// Index of the symbol's most recent journal entry.
    journaled: Option<usize>,
}

#[derive(Debug)]
struct JournalEntry {
    saved: Saved,
    /// The symbol's previous journal entry, restored when this one is undone.
    previous: Option<usize>,
}

/// Returns the bucket a name belongs to.
fn bucket_of(name: &str) -> usize {
    match name.bytes().next() {
        Some(c) if c.is_ascii_alphabetic() => (c.to_ascii_lowercase() - b'a') as usize,
        _ => BUCKETS - 1,
    }
}

/// The table of user symbols, together with the frame stack and undo journal.
#[derive(Debug)]
pub struct SymbolTable {
    nil: NodeRef,
    slots_per_bucket: usize,
    buckets: Vec<Vec<SymbolId>>,
    entries: Vec<Entry>,

    frames: Vec<Saved>,
    frame_size: usize,

    journal: Vec<JournalEntry>,
    journal_size: usize,
    journaling: bool,
    /// Journal entries below this index belong to an enclosing mark.
    floor: usize,
}

impl SymbolTable {
    /// Creates an empty symbol table. `nil` is the node stored in unset slots.
    pub fn new(config: &Config, nil: NodeRef) -> Self {
        Self {
            nil,
            slots_per_bucket: config.symbols_per_bucket,
            buckets: vec![Vec::new(); BUCKETS],
            entries: Vec::new(),
            frames: Vec::new(),
            frame_size: config.frame_size,
            journal: Vec::new(),
            journal_size: config.journal_size,
            journaling: false,
            floor: 0,
        }
    }

    /// Returns the symbol with the given name, if it exists.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.buckets[bucket_of(name)]
            .iter()
            .copied()
            .find(|&id| &*self.entries[id.index()].name == name)
    }

    /// Returns the identifier the next call to [`SymbolTable::insert`] with this name will
    /// assign, or an error if the name's bucket is full.
    pub fn reserve(&self, name: &str) -> Result<SymbolId> {
        if self.buckets[bucket_of(name)].len() >= self.slots_per_bucket {
            return Err(Error::new(kind::SymbolTableFull { name: name.to_string() }));
        }
        Ok(SymbolId(self.entries.len() as u32))
    }

    /// Adds a symbol whose node is `node`. Call [`SymbolTable::reserve`] first.
    pub fn insert(&mut self, name: &str, node: NodeRef) -> SymbolId {
        let id = SymbolId(self.entries.len() as u32);
        self.entries.push(Entry {
            name: name.into(),
            node,
            binding: self.nil,
            usrfunc: self.nil,
            journaled: None,
        });
        self.buckets[bucket_of(name)].push(id);
        id
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.entries[id.index()].name
    }

    /// Returns the node representing the symbol.
    pub fn node(&self, id: SymbolId) -> NodeRef {
        self.entries[id.index()].node
    }

    pub fn binding(&self, id: SymbolId) -> NodeRef {
        self.entries[id.index()].binding
    }

    pub fn usrfunc(&self, id: SymbolId) -> NodeRef {
        self.entries[id.index()].usrfunc
    }

    /// Returns every symbol in creation order.
    pub fn ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.entries.len() as u32).map(SymbolId)
    }

    /// Returns every node the table keeps alive.
    pub fn roots(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.entries.iter().flat_map(|entry| [entry.node, entry.binding, entry.usrfunc])
    }

    /// Sets both slots of a symbol. If journaling is on and the symbol has not changed since
    /// the innermost mark, the old values are recorded first.
    pub fn set(&mut self, id: SymbolId, binding: NodeRef, usrfunc: NodeRef) -> Result<()> {
        if self.journaling {
            let entry = &self.entries[id.index()];
            let recorded = entry.journaled.map_or(false, |i| i >= self.floor);
            if !recorded {
                if self.journal.len() >= self.journal_size {
                    return Err(Error::new(kind::JournalOverflow));
                }
                self.journal.push(JournalEntry {
                    saved: Saved { symbol: id, binding: entry.binding, usrfunc: entry.usrfunc },
                    previous: entry.journaled,
                });
                self.entries[id.index()].journaled = Some(self.journal.len() - 1);
            }
        }
        self.set_unjournaled(id, binding, usrfunc);
        Ok(())
    }

    fn set_unjournaled(&mut self, id: SymbolId, binding: NodeRef, usrfunc: NodeRef) {
        let entry = &mut self.entries[id.index()];
        entry.binding = binding;
        entry.usrfunc = usrfunc;
    }

    /// Pushes the current slots of a symbol onto the frame stack.
    pub fn save(&mut self, id: SymbolId) -> Result<()> {
        if self.frames.len() >= self.frame_size {
            return Err(Error::new(kind::FrameOverflow));
        }
        let entry = &self.entries[id.index()];
        self.frames.push(Saved { symbol: id, binding: entry.binding, usrfunc: entry.usrfunc });
        Ok(())
    }

    /// Restores the most recently saved symbol.
    pub fn restore(&mut self) -> Result<()> {
        let saved = self.frames.pop()
            .ok_or_else(|| Error::new(kind::InternalError { message: "frame stack underflow" }))?;
        self.set_unjournaled(saved.symbol, saved.binding, saved.usrfunc);
        Ok(())
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Restores saved symbols until the frame stack is `depth` deep.
    pub fn unwind_frames(&mut self, depth: usize) {
        while self.frames.len() > depth {
            if let Some(saved) = self.frames.pop() {
                self.set_unjournaled(saved.symbol, saved.binding, saved.usrfunc);
            }
        }
    }

    pub fn journal_len(&self) -> usize {
        self.journal.len()
    }

    /// Starts a new mark at the end of the journal and returns the previous one, to be passed
    /// back to [`SymbolTable::release`].
    pub fn mark(&mut self) -> usize {
        std::mem::replace(&mut self.floor, self.journal.len())
    }

    /// Ends the innermost mark. Changes recorded since then now belong to the enclosing mark.
    pub fn release(&mut self, floor: usize) {
        self.floor = floor;
    }

    /// Replays the journal backwards until it is `len` entries long, undoing every change
    /// recorded after that point.
    pub fn undo(&mut self, len: usize) {
        while self.journal.len() > len {
            if let Some(JournalEntry { saved, previous }) = self.journal.pop() {
                self.set_unjournaled(saved.symbol, saved.binding, saved.usrfunc);
                self.entries[saved.symbol.index()].journaled = previous;
            }
        }
    }

    /// Forgets every journal entry, committing the changes.
    pub fn commit(&mut self) {
        for entry in self.journal.drain(..) {
            self.entries[entry.saved.symbol.index()].journaled = None;
        }
        self.floor = 0;
    }

    pub fn journaling(&self) -> bool {
        self.journaling
    }

    pub fn set_journaling(&mut self, journaling: bool) {
        self.journaling = journaling;
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigBuilder;
    use super::*;

    const NIL: NodeRef = NodeRef(0);

    fn table(slots: usize) -> SymbolTable {
        SymbolTable::new(&ConfigBuilder::new().symbols_per_bucket(slots).build(), NIL)
    }

    fn add(table: &mut SymbolTable, name: &str, node: u32) -> SymbolId {
        table.reserve(name).unwrap();
        table.insert(name, NodeRef(node))
    }

    #[test]
    fn lookup_by_name() {
        let mut table = table(4);
        let x = add(&mut table, "x", 1);
        let y = add(&mut table, "y", 2);
        assert_eq!(table.lookup("x"), Some(x));
        assert_eq!(table.lookup("y"), Some(y));
        assert_eq!(table.lookup("z"), None);
        assert_eq!(table.name(y), "y");
        assert_eq!(table.binding(x), NIL);
    }

    #[test]
    fn bucket_capacity() {
        let mut table = table(2);
        add(&mut table, "a1", 1);
        add(&mut table, "A2", 2);
        let err = table.reserve("a3").unwrap_err();
        assert!(err.is::<kind::SymbolTableFull>());
        assert!(!err.is_fatal());

        // other buckets are unaffected
        assert!(table.reserve("b").is_ok());
        assert!(table.reserve("$1").is_ok());
    }

    #[test]
    fn frames_restore_in_reverse() {
        let mut table = table(4);
        let x = add(&mut table, "x", 1);
        table.set(x, NodeRef(10), NIL).unwrap();

        table.save(x).unwrap();
        table.set(x, NodeRef(11), NIL).unwrap();
        table.save(x).unwrap();
        table.set(x, NodeRef(12), NIL).unwrap();

        table.restore().unwrap();
        assert_eq!(table.binding(x), NodeRef(11));
        table.restore().unwrap();
        assert_eq!(table.binding(x), NodeRef(10));
        assert!(table.restore().unwrap_err().is_fatal());
    }

    #[test]
    fn journal_rolls_back() {
        let mut table = table(4);
        let x = add(&mut table, "x", 1);
        let f = add(&mut table, "f", 2);
        table.set(x, NodeRef(5), NIL).unwrap();

        table.set_journaling(true);
        table.set(x, NodeRef(6), NIL).unwrap();
        table.set(f, NIL, NodeRef(7)).unwrap();
        table.set(x, NodeRef(8), NIL).unwrap();
        assert_eq!(table.journal_len(), 2);

        table.undo(0);
        assert_eq!(table.binding(x), NodeRef(5));
        assert_eq!(table.usrfunc(f), NIL);
        assert_eq!(table.journal_len(), 0);
    }

    #[test]
    fn repeated_changes_share_one_entry() {
        let mut table = SymbolTable::new(&ConfigBuilder::new().journal_size(1).build(), NIL);
        let x = add(&mut table, "x", 1);
        table.set_journaling(true);
        for i in 2..1000 {
            table.set(x, NodeRef(i), NIL).unwrap();
        }
        assert_eq!(table.journal_len(), 1);
        table.undo(0);
        assert_eq!(table.binding(x), NIL);
    }

    #[test]
    fn nested_marks_roll_back_separately() {
        let mut table = table(4);
        let x = add(&mut table, "x", 1);
        table.set_journaling(true);
        table.set(x, NodeRef(2), NIL).unwrap();

        let len = table.journal_len();
        let floor = table.mark();
        table.set(x, NodeRef(3), NIL).unwrap();
        table.set(x, NodeRef(4), NIL).unwrap();
        assert_eq!(table.journal_len(), 2);
        table.undo(len);
        table.release(floor);
        assert_eq!(table.binding(x), NodeRef(2));

        // back under the outer mark, x is already recorded
        table.set(x, NodeRef(5), NIL).unwrap();
        assert_eq!(table.journal_len(), 1);
        table.undo(0);
        assert_eq!(table.binding(x), NIL);
    }

    #[test]
    fn journal_overflow_is_fatal() {
        let mut table = SymbolTable::new(&ConfigBuilder::new().journal_size(1).build(), NIL);
        let x = add(&mut table, "x", 1);
        let y = add(&mut table, "y", 2);
        table.set_journaling(true);
        table.set(x, NodeRef(3), NIL).unwrap();
        let err = table.set(y, NodeRef(4), NIL).unwrap_err();
        assert!(err.is::<kind::JournalOverflow>());
        assert!(err.is_fatal());
    }
}
