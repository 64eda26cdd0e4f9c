use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("lex error at byte {position}: {message}")]
    LexError { position: usize, message: String },
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("semantic error: {0}")]
    SemanticError(String),
}
