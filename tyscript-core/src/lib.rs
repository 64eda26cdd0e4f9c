//! Core compiler pipeline for the Tyscript language.
//!
//! Tyscript is a small typed-script dialect that compiles to plain
//! JavaScript plus declaration files. The pipeline is roughly:
//!
//!   source .tys
//!     -> lexer        (tokens)
//!     -> parser       (syntax tree)
//!     -> emit         (before-transforms -> script codegen,
//!                      after-declarations-transforms -> declaration codegen)
//!
//! Sources live in a virtual file store behind the [`CompilerHost`]
//! capability trait, and each emit phase accepts custom tree-rewrite
//! transforms. Higher-level tools (CLI, editors, etc.) should depend
//! on this crate rather than reimplementing the pipeline.

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Types and configuration
// ---------------------------------------------------------------------

pub mod types;
pub mod options;

// ---------------------------------------------------------------------
// Host abstraction and storage
// ---------------------------------------------------------------------

pub mod host;

// ---------------------------------------------------------------------
// Back-end: transforms, code generation and emit orchestration
// ---------------------------------------------------------------------

pub mod transform;
pub mod codegen_js;
pub mod codegen_decl;
pub mod emit;
pub mod program;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use ast::{Bundle, EmitNode, Node, SourceFile};
pub use emit::EmitResult;
pub use error::CoreError;
pub use host::{CompilerHost, MemoryHost};
pub use options::{CompilerOptions, ModuleKind, ScriptTarget};
pub use program::Program;
pub use transform::{CustomTransforms, EmitTransform, LogTransform, RenameTransform};
