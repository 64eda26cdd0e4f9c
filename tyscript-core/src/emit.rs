//! Output-path derivation and emit bookkeeping.

use serde_json::json;

use crate::ast::EmitNode;

/// Result of an emit call.
///
/// `emit_skipped` is the single modeled failure of a run: the pipeline
/// declined to produce output, with no cause taxonomy attached.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EmitResult {
    pub emit_skipped: bool,
    /// Output paths written, in write order.
    pub emitted_files: Vec<String>,
}

impl EmitResult {
    pub fn skipped() -> EmitResult {
        EmitResult {
            emit_skipped: true,
            emitted_files: Vec::new(),
        }
    }
}

/// Path of the generated script for a source path.
pub fn script_output_path(path: &str) -> String {
    replace_extension(path, "js")
}

/// Path of the generated declaration file for a source path.
pub fn declaration_output_path(path: &str) -> String {
    replace_extension(path, "d.tys")
}

/// Path of the source map for a script path.
pub fn source_map_output_path(script_path: &str) -> String {
    format!("{script_path}.map")
}

/// Comment line referencing a script's source map.
pub fn source_map_reference(script_path: &str) -> String {
    format!("//# sourceMappingURL={}.map", file_name(script_path))
}

/// Minimal version-3 source map body for an emit input.
///
/// Mappings are intentionally empty; the map records provenance, not
/// positions.
pub fn source_map_body(input: &EmitNode, script_path: &str) -> String {
    let sources: Vec<&str> = match input {
        EmitNode::Unit(unit) => vec![unit.path.as_str()],
        EmitNode::Bundle(bundle) => bundle.units.iter().map(|unit| unit.path.as_str()).collect(),
    };
    json!({
        "version": 3,
        "file": file_name(script_path),
        "sources": sources,
        "names": [],
        "mappings": "",
    })
    .to_string()
}

/// Swap the extension of the final path component, or append one when
/// the component has none. Dots in directory names are left alone.
fn replace_extension(path: &str, new_ext: &str) -> String {
    let start = path.rfind('/').map_or(0, |slash| slash + 1);
    match path[start..].rfind('.') {
        Some(dot) => format!("{}.{new_ext}", &path[..start + dot]),
        None => format!("{path}.{new_ext}"),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Bundle, EmitNode};
    use crate::parser::parse;

    #[test]
    fn derives_output_paths() {
        assert_eq!(script_output_path("/file.tys"), "/file.js");
        assert_eq!(declaration_output_path("/file.tys"), "/file.d.tys");
        assert_eq!(source_map_output_path("/file.js"), "/file.js.map");
    }

    #[test]
    fn keeps_directory_dots_intact() {
        assert_eq!(script_output_path("/v1.2/mod.tys"), "/v1.2/mod.js");
        assert_eq!(script_output_path("/v1.2/mod"), "/v1.2/mod.js");
    }

    #[test]
    fn source_map_reference_uses_file_name_only() {
        assert_eq!(
            source_map_reference("/deep/dir/file.js"),
            "//# sourceMappingURL=file.js.map"
        );
    }

    #[test]
    fn source_map_body_lists_bundle_sources() {
        let bundle = EmitNode::Bundle(Bundle {
            units: vec![
                parse("/a.tys", "const a = 1;").expect("parse"),
                parse("/b.tys", "const b = 2;").expect("parse"),
            ],
        });
        let body = source_map_body(&bundle, "/bundle.js");
        let value: serde_json::Value = serde_json::from_str(&body).expect("valid json");
        assert_eq!(value["version"], 3);
        assert_eq!(value["file"], "bundle.js");
        assert_eq!(value["sources"][0], "/a.tys");
        assert_eq!(value["sources"][1], "/b.tys");
    }
}
