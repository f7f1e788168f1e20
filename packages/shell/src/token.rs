use serde::Serialize;

/// The operator that separates two pipeline stages on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlowControl {
    /// First stage of a line; nothing precedes it.
    #[default]
    None,
    /// |
    Pipe,
    /// > file
    Redirect,
}

/// One pipeline stage produced by the tokenizer.
///
/// `flow` is the operator that introduced this group, so the first group of
/// a line always carries `FlowControl::None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TokenGroup {
    pub tokens: Vec<String>,
    pub flow: FlowControl,
}

impl TokenGroup {
    pub fn new(flow: FlowControl) -> Self {
        TokenGroup {
            tokens: Vec::new(),
            flow,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
