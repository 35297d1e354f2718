//! The interpreter: the arena, the symbol table and the operand stack, together with the
//! statement loop that ties them to the parser.

mod build;
mod inspect;
mod scan;

use cas_num::Rational;
use cas_parser::parser::{ast::Stmt, Parser};
use crate::{
    config::Config,
    error::{kind, Error, Result},
    keyword::Keyword,
    node::{Arena, Node, NodeRef},
    symbol::{SymbolId, SymbolTable},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Nodes created once per interpreter and referenced everywhere they are needed.
#[derive(Debug, Clone)]
pub(crate) struct Consts {
    pub nil: NodeRef,
    pub zero: NodeRef,
    pub one: NodeRef,
    pub minus_one: NodeRef,
    pub half: NodeRef,
    pub imaginary_unit: NodeRef,

    /// The symbol bound to the result of the last statement.
    pub last: NodeRef,

    /// The default variable of calculus and polynomial functions.
    pub x: NodeRef,

    /// The argument placeholders `$1` to `$9` that user function bodies refer to.
    pub args: [NodeRef; 9],

    /// The pattern variables of the integral table.
    pub pattern_a: NodeRef,
    pub pattern_b: NodeRef,
    pub pattern_x: NodeRef,
}

impl Consts {
    fn roots(&self) -> impl Iterator<Item = NodeRef> + '_ {
        [
            self.nil,
            self.zero,
            self.one,
            self.minus_one,
            self.half,
            self.imaginary_unit,
            self.last,
            self.x,
            self.pattern_a,
            self.pattern_b,
            self.pattern_x,
        ]
        .into_iter()
        .chain(self.args.iter().copied())
    }
}

/// A snapshot of the interpreter's working state, used to roll back after an error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    stack: usize,
    frames: usize,
    journal: usize,
    depth: usize,
    expanding: bool,
    journaling: bool,
}

/// A symbolic algebra interpreter.
///
/// Every expression lives in the interpreter's node arena. Evaluation follows a stack protocol:
/// operands are pushed onto the operand stack, a combinator such as [`Interpreter::add`] pops
/// them and pushes exactly one canonical result.
///
/// ```
/// use cas_core::Interpreter;
///
/// let mut interp = Interpreter::new();
/// assert_eq!(interp.eval_str("(x + 1)^2").unwrap(), "x^2 + 2*x + 1");
/// ```
#[derive(Debug)]
pub struct Interpreter {
    pub(crate) arena: Arena,
    pub(crate) symbols: SymbolTable,
    pub(crate) stack: Vec<NodeRef>,
    pub(crate) config: Config,
    pub(crate) consts: Consts,

    /// The node of each keyword, indexed by [`Keyword::index`].
    keywords: Vec<NodeRef>,

    /// Current nesting of [`Interpreter::eval`].
    pub(crate) depth: usize,

    /// Whether products of sums and powers of sums are multiplied out.
    pub(crate) expanding: bool,

    /// The templates of the integral table, built on first use: `(form, result, condition)`.
    pub(crate) integrals: Vec<[NodeRef; 3]>,

    interrupt: Arc<AtomicBool>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter with the default limits.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an interpreter with the given limits.
    ///
    /// # Panics
    ///
    /// Panics if the limits are too small to hold the built-in nodes.
    pub fn with_config(config: Config) -> Self {
        Self::try_with_config(config).expect("configuration too small for the built-in nodes")
    }

    /// Creates an interpreter with the given limits, failing if they are too small to hold the
    /// built-in nodes.
    pub fn try_with_config(config: Config) -> Result<Self> {
        let mut arena = Arena::new(config.block_size, config.max_blocks);
        let keywords = Keyword::ALL.iter()
            .map(|&keyword| arena.alloc(Node::Keyword(keyword)))
            .collect::<Result<Vec<_>>>()?;
        let nil = keywords[Keyword::Nil.index()];
        let power = keywords[Keyword::Power.index()];

        let zero = arena.alloc(Node::Rational(Rational::zero()))?;
        let one = arena.alloc(Node::Rational(Rational::one()))?;
        let minus_one = arena.alloc(Node::Rational(Rational::minus_one()))?;
        let half = arena.alloc(Node::Rational(Rational::new_i64(1, 2)?))?;

        // (power -1 1/2)
        let tail = arena.alloc(Node::Cons { car: half, cdr: nil })?;
        let tail = arena.alloc(Node::Cons { car: minus_one, cdr: tail })?;
        let imaginary_unit = arena.alloc(Node::Cons { car: power, cdr: tail })?;

        let symbols = SymbolTable::new(&config, nil);
        let mut interp = Self {
            arena,
            symbols,
            stack: Vec::new(),
            config,
            consts: Consts {
                nil,
                zero,
                one,
                minus_one,
                half,
                imaginary_unit,
                last: nil,
                x: nil,
                args: [nil; 9],
                pattern_a: nil,
                pattern_b: nil,
                pattern_x: nil,
            },
            keywords,
            depth: 0,
            expanding: true,
            integrals: Vec::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
        };

        interp.consts.last = interp.intern("last")?;
        interp.consts.x = interp.intern("x")?;
        for i in 0..9 {
            interp.consts.args[i] = interp.intern(&format!("${}", i + 1))?;
        }
        interp.consts.pattern_a = interp.intern("$a")?;
        interp.consts.pattern_b = interp.intern("$b")?;
        interp.consts.pattern_x = interp.intern("$x")?;
        interp.bind_constants()?;
        Ok(interp)
    }

    /// Binds the pre-defined symbols `i` and `e`.
    pub(crate) fn bind_constants(&mut self) -> Result<()> {
        let i = self.intern("i")?;
        let unit = self.consts.imaginary_unit;
        self.set_binding(i, unit)?;

        let e = self.intern("e")?;
        let exp1 = self.keyword(Keyword::Exp1);
        self.set_binding(e, exp1)
    }

    /// Returns the limits this interpreter was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a flag that, when set, interrupts the statement being evaluated.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Fails with [`kind::Interrupted`] if the interrupt flag is set.
    pub(crate) fn check_interrupt(&self) -> Result<()> {
        if self.interrupt.load(Ordering::Relaxed) {
            Err(Error::new(kind::Interrupted))
        } else {
            Ok(())
        }
    }

    /// Pushes a node onto the operand stack.
    pub fn push(&mut self, p: NodeRef) -> Result<()> {
        if self.stack.len() >= self.config.stack_size {
            return Err(Error::new(kind::StackOverflow));
        }
        self.stack.push(p);
        Ok(())
    }

    /// Pops a node from the operand stack.
    pub fn pop(&mut self) -> Result<NodeRef> {
        self.stack.pop().ok_or_else(|| Error::new(kind::StackUnderflow))
    }

    /// Pops the top `n` nodes, returned in the order they were pushed.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<NodeRef>> {
        if n > self.stack.len() {
            return Err(Error::new(kind::StackUnderflow));
        }
        Ok(self.stack.split_off(self.stack.len() - n))
    }

    /// Returns the current depth of the operand stack.
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn push_integer(&mut self, n: i64) -> Result<()> {
        let p = self.integer(n)?;
        self.push(p)
    }

    pub(crate) fn push_rational(&mut self, r: Rational) -> Result<()> {
        let p = self.rational_node(r)?;
        self.push(p)
    }

    pub(crate) fn push_double(&mut self, d: f64) -> Result<()> {
        let p = self.double_node(d)?;
        self.push(p)
    }

    /// Returns the symbol behind a symbol node, or an error naming `function` if the node is not
    /// a user symbol.
    pub(crate) fn expect_symbol(&self, p: NodeRef, function: &'static str) -> Result<SymbolId> {
        self.symbol_id(p)
            .ok_or_else(|| Error::new(kind::InvalidArgument { function, expected: "a symbol" }))
    }

    /// Returns the binding of a symbol node, or `nil` for anything else.
    pub(crate) fn binding(&self, p: NodeRef) -> NodeRef {
        match self.symbol_id(p) {
            Some(id) => self.symbols.binding(id),
            None => self.consts.nil,
        }
    }

    /// Returns the user function body of a symbol node, or `nil` for anything else.
    pub(crate) fn usrfunc(&self, p: NodeRef) -> NodeRef {
        match self.symbol_id(p) {
            Some(id) => self.symbols.usrfunc(id),
            None => self.consts.nil,
        }
    }

    /// Binds a symbol, leaving its user function untouched.
    pub(crate) fn set_binding(&mut self, p: NodeRef, binding: NodeRef) -> Result<()> {
        let id = self.expect_symbol(p, "setq")?;
        let usrfunc = self.symbols.usrfunc(id);
        self.symbols.set(id, binding, usrfunc)
    }

    pub(crate) fn set_symbol(&mut self, p: NodeRef, binding: NodeRef, usrfunc: NodeRef) -> Result<()> {
        let id = self.expect_symbol(p, "setq")?;
        self.symbols.set(id, binding, usrfunc)
    }

    /// Saves a symbol on the frame stack.
    pub(crate) fn save_symbol(&mut self, p: NodeRef) -> Result<()> {
        let id = self.expect_symbol(p, "save")?;
        self.symbols.save(id)
    }

    /// Restores the most recently saved symbol.
    pub(crate) fn restore_symbol(&mut self) -> Result<()> {
        self.symbols.restore()
    }

    /// Runs `f` with the expanding flag set to `expanding`, restoring the flag afterwards.
    pub(crate) fn with_expanding<T>(
        &mut self,
        expanding: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.expanding;
        self.expanding = expanding;
        let result = f(self);
        self.expanding = saved;
        result
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            stack: self.stack.len(),
            frames: self.symbols.frame_depth(),
            journal: self.symbols.journal_len(),
            depth: self.depth,
            expanding: self.expanding,
            journaling: self.symbols.journaling(),
        }
    }

    /// Returns the interpreter to the state recorded in the checkpoint.
    fn rollback(&mut self, checkpoint: Checkpoint) {
        log::debug!(
            "rolling back {} frames and {} journal entries",
            self.symbols.frame_depth().saturating_sub(checkpoint.frames),
            self.symbols.journal_len().saturating_sub(checkpoint.journal),
        );
        self.symbols.unwind_frames(checkpoint.frames);
        self.symbols.undo(checkpoint.journal);
        self.stack.truncate(checkpoint.stack);
        self.depth = checkpoint.depth;
        self.expanding = checkpoint.expanding;
        self.symbols.set_journaling(checkpoint.journaling);
    }

    /// Runs `f` speculatively. If it fails with a recoverable error, every change it made is
    /// rolled back and `None` is returned. Fatal errors and interrupts propagate.
    pub(crate) fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<Option<T>> {
        let checkpoint = self.checkpoint();
        let floor = self.symbols.mark();
        self.symbols.set_journaling(true);
        let result = f(self);
        self.symbols.set_journaling(checkpoint.journaling);
        let result = match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_fatal() || err.is::<kind::Interrupted>() => Err(err),
            Err(_) => {
                self.rollback(checkpoint);
                Ok(None)
            },
        };
        self.symbols.release(floor);
        result
    }

    /// Collects garbage. Only valid between statements, when the operand stack, frame stack and
    /// journal are empty.
    pub fn collect_garbage(&mut self) -> Result<usize> {
        if !self.stack.is_empty() || self.symbols.frame_depth() > 0 || self.symbols.journal_len() > 0 {
            return Err(Error::new(kind::InternalError {
                message: "garbage collection during evaluation",
            }));
        }

        let roots = self.keywords.iter().copied()
            .chain(self.consts.roots())
            .chain(self.integrals.iter().flat_map(|template| template.iter().copied()))
            .chain(self.symbols.roots())
            .collect::<Vec<_>>();
        Ok(self.arena.collect(roots))
    }

    /// Evaluates a single parsed statement.
    ///
    /// If evaluation fails, the symbol table, frame stack and operand stack are returned to
    /// their state before the statement. On success the result is bound to `last`, unless it is
    /// `nil` (the result of an assignment, for example).
    pub fn eval_stmt(&mut self, stmt: &Stmt) -> Result<NodeRef> {
        if self.arena.allocs_since_gc() >= self.config.gc_threshold || self.arena.is_full() {
            self.collect_garbage()?;
        }

        log::trace!("evaluating `{}`", stmt);
        let checkpoint = self.checkpoint();
        self.depth = 0;
        self.expanding = true;
        self.symbols.set_journaling(true);

        let result = self.eval_top(stmt);
        match result {
            Ok(p) => {
                self.symbols.set_journaling(checkpoint.journaling);
                self.symbols.commit();
                Ok(p)
            },
            Err(err) => {
                if err.is_fatal() {
                    log::error!("fatal error while evaluating `{}`: {:?}", stmt, err.kind);
                }
                self.rollback(checkpoint);
                self.symbols.commit();
                self.interrupt.store(false, Ordering::Relaxed);
                Err(err)
            },
        }
    }

    fn eval_top(&mut self, stmt: &Stmt) -> Result<NodeRef> {
        let p = self.scan(&stmt.expr)?;
        self.push(p)?;
        self.eval()?;
        let result = self.pop()?;
        if !self.is_nil(result) {
            let last = self.consts.last;
            self.set_binding(last, result)?;
        }
        Ok(result)
    }

    /// Parses and evaluates every statement of the source. Each entry of the result holds the
    /// printed result of one statement (`None` if the statement printed nothing) or the error it
    /// raised. A parse error, or a fatal error, ends the run.
    pub fn run(&mut self, source: &str) -> Vec<std::result::Result<Option<String>, cas_error::Error>> {
        let stmts = match Parser::new(source).parse_statements() {
            Ok(stmts) => stmts,
            Err(err) => return vec![Err(err)],
        };

        let mut outputs = Vec::with_capacity(stmts.len());
        for stmt in &stmts {
            match self.eval_stmt(stmt) {
                Ok(p) if self.is_nil(p) => outputs.push(Ok(None)),
                Ok(p) => outputs.push(Ok(Some(self.display(p)))),
                Err(err) => {
                    let fatal = err.is_fatal();
                    outputs.push(Err(err.into_spanned(stmt.span())));
                    if fatal {
                        break;
                    }
                },
            }
        }
        outputs
    }

    /// Parses and evaluates every statement of the source, stopping at the first error, and
    /// returns the printed result of the last statement that printed one.
    pub fn eval_str(&mut self, source: &str) -> std::result::Result<String, cas_error::Error> {
        let mut last = String::new();
        for output in self.run(source) {
            if let Some(text) = output? {
                last = text;
            }
        }
        Ok(last)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigBuilder;
    use super::*;

    #[test]
    fn stack_protocol() {
        let mut interp = Interpreter::new();
        let one = interp.consts.one;
        interp.push(one).unwrap();
        interp.push(one).unwrap();
        assert_eq!(interp.pop_n(2).unwrap(), vec![one, one]);
        assert!(interp.pop().unwrap_err().is::<kind::StackUnderflow>());
    }

    #[test]
    fn stack_overflow_is_fatal() {
        let mut interp = Interpreter::with_config(ConfigBuilder::new().stack_size(1).build());
        let one = interp.consts.one;
        interp.push(one).unwrap();
        let err = interp.push(one).unwrap_err();
        assert!(err.is::<kind::StackOverflow>());
        assert!(err.is_fatal());
    }

    #[test]
    fn speculation_rolls_back_bindings() {
        let mut interp = Interpreter::new();
        let y = interp.intern("y").unwrap();
        let one = interp.consts.one;
        let outcome = interp.speculate(|interp| {
            interp.set_binding(y, one)?;
            interp.push(one)?;
            Err::<(), _>(Error::new(kind::DivideByZero))
        }).unwrap();

        assert_eq!(outcome, None);
        assert!(interp.is_nil(interp.binding(y)));
        assert_eq!(interp.stack_len(), 0);
    }

    #[test]
    fn long_loops_fit_a_small_journal() {
        let mut interp = Interpreter::with_config(ConfigBuilder::new().journal_size(16).build());
        assert_eq!(interp.eval_str("sum(k, 1, 1000, k)").unwrap(), "500500");
        interp.eval_str("f(x) = x + 1").unwrap();
        assert_eq!(interp.eval_str("sum(k, 1, 50, f(k))").unwrap(), "1325");
    }

    #[test]
    fn speculation_propagates_fatal_errors() {
        let mut interp = Interpreter::new();
        let err = interp.speculate(|_| Err::<(), _>(Error::new(kind::StackOverflow))).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn collection_keeps_bound_values() {
        let mut interp = Interpreter::new();
        interp.eval_str("y = 123456789123456789").unwrap();
        interp.eval_str("(z + 1)^5").unwrap();
        assert!(interp.collect_garbage().unwrap() > 0);
        assert_eq!(interp.eval_str("y").unwrap(), "123456789123456789");
    }

    #[test]
    fn collection_refused_mid_evaluation() {
        let mut interp = Interpreter::new();
        let one = interp.consts.one;
        interp.push(one).unwrap();
        assert!(interp.collect_garbage().unwrap_err().is_fatal());
    }
}
