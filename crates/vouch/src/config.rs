/// When a wrapped field validates its result relative to calling the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultOrdering {
    /// Await the handler, then validate what it produced.
    #[default]
    CallThenValidate,
    /// Validate the source object's value for the field first, then call the
    /// handler with the validated value and error list.
    ValidateThenCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Deepest value nesting the walker descends into before reporting an
    /// engine fault.
    pub max_depth: usize,
    pub result_ordering: ResultOrdering,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            result_ordering: ResultOrdering::default(),
        }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_result_ordering(mut self, ordering: ResultOrdering) -> Self {
        self.result_ordering = ordering;
        self
    }
}
