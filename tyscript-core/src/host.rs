//! Compilation host abstraction and the in-memory file store.
//!
//! The emit pipeline resolves all of its I/O through the
//! [`CompilerHost`] trait: one required operation per capability,
//! backed by whatever storage the host finds convenient. [`MemoryHost`]
//! is the storage-only implementation used by the driver and the
//! tests: three maps (source text, parsed units, outputs) and no
//! logic beyond insert-or-replace.

use std::collections::HashMap;

use crate::ast::SourceFile;
use crate::error::CoreError;
use crate::parser::parse;

/// Capability set the emit pipeline expects from its host.
///
/// None of these methods are permitted to fail: absent-file reads
/// degrade to an empty string, and absent-unit lookups return `None`
/// for the caller to handle.
pub trait CompilerHost {
    /// Parsed unit for a registered path, if any.
    fn source_unit(&self, path: &str) -> Option<&SourceFile>;

    /// Name of the ambient declaration library.
    fn default_lib_name(&self) -> String {
        "lib.d.tys".to_string()
    }

    fn current_directory(&self) -> String {
        "/".to_string()
    }

    /// Directory listing for a path. Virtual hosts have no directories.
    fn directories(&self, path: &str) -> Vec<String>;

    /// Canonical form of a path under this host's case policy.
    fn canonical_path(&self, path: &str) -> String;

    fn use_case_sensitive_paths(&self) -> bool;

    fn newline(&self) -> &'static str;

    fn file_exists(&self, path: &str) -> bool;

    /// Source text for a path; the empty string when absent.
    fn read_file(&self, path: &str) -> String;

    /// Record an emitted output. The only side-effecting capability.
    fn write_file(&mut self, path: &str, contents: &str);
}

/// In-memory mapping from file path to file text, plus the derived
/// mapping from path to parsed unit and the mapping from output path
/// to emitted text.
///
/// Single-threaded, single-pass use: no eviction, no size bound, no
/// concurrency control.
#[derive(Debug, Default)]
pub struct MemoryHost {
    files: HashMap<String, String>,
    units: HashMap<String, SourceFile>,
    outputs: HashMap<String, String>,
}

impl MemoryHost {
    pub fn new() -> MemoryHost {
        MemoryHost::default()
    }

    /// Insert or replace a source record.
    ///
    /// Replacing a path drops any parsed unit previously derived from
    /// it; the next [`MemoryHost::parse_units`] re-derives it from the
    /// new text.
    pub fn put(&mut self, path: impl Into<String>, text: impl Into<String>) {
        let path = path.into();
        self.units.remove(&path);
        self.files.insert(path, text.into());
    }

    /// Parse every registered source record into its unit.
    ///
    /// Records that already have an up-to-date unit are parsed again;
    /// the store keys units purely by path.
    pub fn parse_units(&mut self) -> Result<(), CoreError> {
        for (path, text) in &self.files {
            let unit = parse(path, text)?;
            self.units.insert(path.clone(), unit);
        }
        Ok(())
    }

    /// Emitted text recorded under an output path.
    pub fn output(&self, path: &str) -> Option<&str> {
        self.outputs.get(path).map(String::as_str)
    }

    /// All recorded outputs.
    pub fn outputs(&self) -> &HashMap<String, String> {
        &self.outputs
    }

    /// Registered source paths, sorted for deterministic iteration.
    pub fn source_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl CompilerHost for MemoryHost {
    fn source_unit(&self, path: &str) -> Option<&SourceFile> {
        self.units.get(path)
    }

    fn directories(&self, _path: &str) -> Vec<String> {
        Vec::new()
    }

    fn canonical_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn use_case_sensitive_paths(&self) -> bool {
        true
    }

    fn newline(&self) -> &'static str {
        "\n"
    }

    fn file_exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn read_file(&self, path: &str) -> String {
        self.files.get(path).cloned().unwrap_or_default()
    }

    fn write_file(&mut self, path: &str, contents: &str) {
        self.outputs.insert(path.to_string(), contents.to_string());
    }
}
