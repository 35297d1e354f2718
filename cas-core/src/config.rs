//! Capacity limits of an [`Interpreter`](crate::Interpreter).
//!
//! Every limit here is a hard ceiling. Running past the arena, stack, frame or journal capacity
//! is a fatal error; running past the evaluation depth is reported to the user as a circular
//! definition.

/// Capacity limits of an interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The number of nodes added to the arena each time it grows.
    pub block_size: usize,

    /// The maximum number of blocks the arena may grow to.
    pub max_blocks: usize,

    /// The number of allocations after which a garbage collection is run before the next
    /// statement.
    pub gc_threshold: usize,

    /// The maximum depth of the operand stack.
    pub stack_size: usize,

    /// The maximum number of saved symbols on the frame stack.
    pub frame_size: usize,

    /// The maximum number of entries in the undo journal.
    pub journal_size: usize,

    /// The maximum nesting of evaluation before evaluation fails with a circular definition
    /// error.
    pub max_depth: usize,

    /// The number of symbol slots in each of the 27 buckets of the symbol table.
    pub symbols_per_bucket: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 100_000,
            max_blocks: 100,
            gc_threshold: 400_000,
            stack_size: 100_000,
            frame_size: 10_000,
            journal_size: 100_000,
            max_depth: 200,
            symbols_per_bucket: 100,
        }
    }
}

impl Config {
    /// Wraps the given [`Config`] into a builder for further customization.
    pub fn into_builder(self) -> ConfigBuilder {
        ConfigBuilder(self)
    }
}

/// Helper struct to build a [`Config`] struct.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    /// Creates a new builder with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of nodes added to the arena each time it grows.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.0.block_size = block_size.max(1);
        self
    }

    /// Sets the maximum number of arena blocks.
    pub fn max_blocks(mut self, max_blocks: usize) -> Self {
        self.0.max_blocks = max_blocks.max(1);
        self
    }

    /// Sets the number of allocations between garbage collections.
    pub fn gc_threshold(mut self, gc_threshold: usize) -> Self {
        self.0.gc_threshold = gc_threshold;
        self
    }

    /// Sets the maximum depth of the operand stack.
    pub fn stack_size(mut self, stack_size: usize) -> Self {
        self.0.stack_size = stack_size;
        self
    }

    /// Sets the maximum depth of the frame stack.
    pub fn frame_size(mut self, frame_size: usize) -> Self {
        self.0.frame_size = frame_size;
        self
    }

    /// Sets the maximum number of undo journal entries.
    pub fn journal_size(mut self, journal_size: usize) -> Self {
        self.0.journal_size = journal_size;
        self
    }

    /// Sets the maximum evaluation depth. See [`Config::max_depth`] for more information.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the number of symbol slots per bucket.
    pub fn symbols_per_bucket(mut self, symbols_per_bucket: usize) -> Self {
        self.0.symbols_per_bucket = symbols_per_bucket;
        self
    }

    /// Builds the [`Config`] struct.
    pub fn build(self) -> Config {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ConfigBuilder::new()
            .max_depth(50)
            .stack_size(10)
            .build();
        assert_eq!(config.max_depth, 50);
        assert_eq!(config.stack_size, 10);
        assert_eq!(config.symbols_per_bucket, Config::default().symbols_per_bucket);
    }

    #[test]
    fn block_size_never_zero() {
        assert_eq!(ConfigBuilder::new().block_size(0).build().block_size, 1);
    }
}
