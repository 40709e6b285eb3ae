/// Normalized form of one message, created per prediction call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    /// Lower-cased, whitespace-collapsed text
    pub text: String,
    /// Alphanumeric tokens extracted from `text`
    pub tokens: Vec<String>,
}

impl NormalizedDocument {
    pub fn new(text: String, tokens: Vec<String>) -> Self {
        Self { text, tokens }
    }

    /// True when nothing classifiable is left
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
