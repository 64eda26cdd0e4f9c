//! Compiler configuration.

/// Language level of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptTarget {
    /// Lower `const` / `let` declarations to `var`.
    Es5,
    /// Keep the source declaration keywords.
    #[default]
    EsNext,
}

/// Module shape of the generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleKind {
    /// Keep `export` prefixes on exported declarations.
    #[default]
    EsModule,
    /// Drop `export` prefixes and append `exports.<name> = <name>;`
    /// assignments instead.
    CommonJs,
}

/// Options recognized by program construction and emit.
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    pub target: ScriptTarget,
    pub module: ModuleKind,
    /// Emit a declaration file per emit target.
    pub declaration: bool,
    /// Emit a source map next to each script and reference it from the
    /// script body.
    pub source_map: bool,
    /// Permit `@ident` decorators on function declarations.
    pub experimental_decorators: bool,
    /// Pass parameter type names to desugared decorator calls.
    pub emit_decorator_metadata: bool,
    /// Report every emit as skipped without producing output.
    pub no_emit: bool,
    /// Aggregate all program units into one bundle written to this path.
    pub out_file: Option<String>,
}
