//! Declaration backend: public-surface description of an emit input.
//!
//! Only exported declarations appear. Annotated types are kept as
//! written; missing annotations fall back to inference over the
//! initializer (or over the first returned value for functions). A
//! unit exporting nothing still declares an empty export so the
//! output is never blank.

use crate::ast::{EmitNode, Node, SourceFile};
use crate::types::{self, Ty};

/// Generate declaration output for a unit or bundle.
pub fn emit_declarations(input: &EmitNode, newline: &str) -> String {
    let mut lines = Vec::new();
    match input {
        EmitNode::Unit(unit) => emit_unit(unit, &mut lines),
        EmitNode::Bundle(bundle) => {
            for unit in &bundle.units {
                lines.push(format!("// {}", unit.path));
                emit_unit(unit, &mut lines);
            }
        }
    }
    let mut out = lines.join(newline);
    out.push_str(newline);
    out
}

fn emit_unit(unit: &SourceFile, lines: &mut Vec<String>) {
    let start = lines.len();
    for statement in &unit.statements {
        match statement {
            Node::VarDecl {
                exported: true,
                keyword,
                name,
                ty,
                init,
            } => {
                let ty = ty.unwrap_or_else(|| types::infer(init));
                lines.push(format!(
                    "export declare {} {}: {ty};",
                    keyword.as_str(),
                    name.ident_text()
                ));
            }
            Node::FnDecl {
                exported: true,
                name,
                params,
                ret,
                body,
                ..
            } => {
                let params = params
                    .iter()
                    .map(signature_param)
                    .collect::<Vec<_>>()
                    .join(", ");
                let ret = ret.unwrap_or_else(|| returned_ty(body));
                lines.push(format!(
                    "export declare function {}({params}): {ret};",
                    name.ident_text()
                ));
            }
            _ => {}
        }
    }
    if lines.len() == start {
        lines.push("export {};".to_string());
    }
}

fn signature_param(param: &Node) -> String {
    match param {
        Node::Param { name, ty } => {
            format!("{}: {}", name.ident_text(), ty.unwrap_or(Ty::Any))
        }
        other => format!("{}: {}", other.ident_text(), Ty::Any),
    }
}

/// Type of the first `return` carrying a value, `void` otherwise.
fn returned_ty(body: &[Node]) -> Ty {
    for statement in body {
        if let Node::Return(Some(value)) = statement {
            return types::infer(value);
        }
    }
    Ty::Void
}
