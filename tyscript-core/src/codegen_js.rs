//! JavaScript backend: turns an emit input into generated code text.
//!
//! Type annotations never reach the output; the target option decides
//! the declaration keyword, the module option decides the export
//! shape, and decorators desugar to plain reassignment calls.

use crate::ast::{EmitNode, Node, SourceFile};
use crate::options::{CompilerOptions, ModuleKind, ScriptTarget};
use crate::types::Ty;

const INDENT: &str = "    ";

/// Generate script output for a unit or bundle.
pub fn emit_script(input: &EmitNode, options: &CompilerOptions, newline: &str) -> String {
    let mut lines = Vec::new();
    match input {
        EmitNode::Unit(unit) => emit_unit(unit, options, &mut lines),
        EmitNode::Bundle(bundle) => {
            for unit in &bundle.units {
                lines.push(format!("// {}", unit.path));
                emit_unit(unit, options, &mut lines);
            }
        }
    }
    let mut out = lines.join(newline);
    out.push_str(newline);
    out
}

fn emit_unit(unit: &SourceFile, options: &CompilerOptions, lines: &mut Vec<String>) {
    for statement in &unit.statements {
        emit_statement(statement, options, lines);
    }
}

fn emit_statement(node: &Node, options: &CompilerOptions, lines: &mut Vec<String>) {
    match node {
        Node::VarDecl {
            exported,
            keyword,
            name,
            ty: _,
            init,
        } => {
            let kw = match options.target {
                ScriptTarget::Es5 => "var",
                ScriptTarget::EsNext => keyword.as_str(),
            };
            let name = name.ident_text();
            let decl = format!("{kw} {name} = {};", emit_expr(init));
            match options.module {
                ModuleKind::EsModule if *exported => lines.push(format!("export {decl}")),
                _ => lines.push(decl),
            }
            if *exported && options.module == ModuleKind::CommonJs {
                lines.push(format!("exports.{name} = {name};"));
            }
        }
        Node::FnDecl {
            exported,
            decorators,
            name,
            params,
            ret: _,
            body,
        } => {
            let name = name.ident_text();
            let param_list = params
                .iter()
                .map(param_name)
                .collect::<Vec<_>>()
                .join(", ");
            let header = format!("function {name}({param_list}) {{");
            match options.module {
                ModuleKind::EsModule if *exported => lines.push(format!("export {header}")),
                _ => lines.push(header),
            }
            for statement in body {
                let mut inner = Vec::new();
                emit_statement(statement, options, &mut inner);
                for line in inner {
                    lines.push(format!("{INDENT}{line}"));
                }
            }
            lines.push("}".to_string());

            // Decorators apply innermost-first, so desugar in reverse
            // source order.
            for decorator in decorators.iter().rev() {
                let decorator = decorator.ident_text();
                if options.emit_decorator_metadata {
                    let metadata = params
                        .iter()
                        .map(|param| format!("\"{}\"", param_ty(param).name()))
                        .collect::<Vec<_>>()
                        .join(", ");
                    lines.push(format!("{name} = {decorator}({name}, [{metadata}]);"));
                } else {
                    lines.push(format!("{name} = {decorator}({name});"));
                }
            }

            if *exported && options.module == ModuleKind::CommonJs {
                lines.push(format!("exports.{name} = {name};"));
            }
        }
        Node::Return(value) => match value {
            Some(value) => lines.push(format!("return {};", emit_expr(value))),
            None => lines.push("return;".to_string()),
        },
        other => lines.push(format!("{};", emit_expr(other))),
    }
}

fn param_name(param: &Node) -> &str {
    match param {
        Node::Param { name, .. } => name.ident_text(),
        other => other.ident_text(),
    }
}

fn param_ty(param: &Node) -> Ty {
    match param {
        Node::Param { ty, .. } => ty.unwrap_or(Ty::Any),
        _ => Ty::Any,
    }
}

fn emit_expr(node: &Node) -> String {
    match node {
        Node::Ident(name) => name.clone(),
        Node::Number(value) => format_number(*value),
        Node::Str(value) => format!("\"{}\"", escape_string(value)),
        Node::Bool(value) => value.to_string(),
        Node::Binary { op, lhs, rhs } => {
            let prec = precedence(node);
            let lhs_text = parenthesize(lhs, precedence(lhs) < prec);
            let rhs_text = parenthesize(rhs, precedence(rhs) <= prec);
            format!("{lhs_text} {} {rhs_text}", op.as_str())
        }
        Node::Call { callee, args } => {
            let args = args.iter().map(emit_expr).collect::<Vec<_>>().join(", ");
            format!("{}({args})", emit_expr(callee))
        }
        _ => String::new(),
    }
}

fn parenthesize(node: &Node, wrap: bool) -> String {
    let text = emit_expr(node);
    if wrap { format!("({text})") } else { text }
}

fn precedence(node: &Node) -> u8 {
    use crate::ast::BinaryOp;
    match node {
        Node::Binary { op, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        },
        _ => 3,
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Bundle;
    use crate::parser::parse;

    fn unit(source: &str) -> EmitNode {
        EmitNode::Unit(parse("/file.tys", source).expect("parse"))
    }

    fn options() -> CompilerOptions {
        CompilerOptions::default()
    }

    #[test]
    fn keeps_const_and_export_by_default() {
        let out = emit_script(&unit("export const value = 42;"), &options(), "\n");
        assert_eq!(out, "export const value = 42;\n");
    }

    #[test]
    fn lowers_declarations_for_es5() {
        let mut options = options();
        options.target = ScriptTarget::Es5;
        let out = emit_script(&unit("export const value = 42;"), &options, "\n");
        assert_eq!(out, "export var value = 42;\n");
    }

    #[test]
    fn lowers_exports_for_commonjs() {
        let mut options = options();
        options.module = ModuleKind::CommonJs;
        let out = emit_script(&unit("export const value = 42;"), &options, "\n");
        assert_eq!(out, "const value = 42;\nexports.value = value;\n");
    }

    #[test]
    fn emits_function_with_body() {
        let out = emit_script(
            &unit("export function add(a: number, b: number): number { return a + b; }"),
            &options(),
            "\n",
        );
        assert_eq!(
            out,
            "export function add(a, b) {\n    return a + b;\n}\n"
        );
    }

    #[test]
    fn desugars_decorators_in_reverse_order() {
        let mut options = options();
        options.experimental_decorators = true;
        let out = emit_script(
            &unit("@outer @inner function f() { return 1; }"),
            &options,
            "\n",
        );
        assert_eq!(
            out,
            "function f() {\n    return 1;\n}\nf = inner(f);\nf = outer(f);\n"
        );
    }

    #[test]
    fn decorator_metadata_lists_parameter_types() {
        let mut options = options();
        options.experimental_decorators = true;
        options.emit_decorator_metadata = true;
        let out = emit_script(
            &unit("@traced function f(a: number, b) { return a; }"),
            &options,
            "\n",
        );
        assert!(out.contains("f = traced(f, [\"number\", \"any\"]);"));
    }

    #[test]
    fn parenthesizes_by_precedence() {
        let out = emit_script(&unit("const x = (1 + 2) * 3;"), &options(), "\n");
        assert_eq!(out, "const x = (1 + 2) * 3;\n");

        let out = emit_script(&unit("const y = 1 + 2 * 3;"), &options(), "\n");
        assert_eq!(out, "const y = 1 + 2 * 3;\n");
    }

    #[test]
    fn escapes_string_literals() {
        let out = emit_script(&unit(r#"const s = "say \"hi\"";"#), &options(), "\n");
        assert_eq!(out, "const s = \"say \\\"hi\\\"\";\n");
    }

    #[test]
    fn bundles_concatenate_units_under_path_headers() {
        let first = parse("/a.tys", "export const a = 1;").expect("parse");
        let second = parse("/b.tys", "export const b = 2;").expect("parse");
        let out = emit_script(
            &EmitNode::Bundle(Bundle {
                units: vec![first, second],
            }),
            &options(),
            "\n",
        );
        assert_eq!(
            out,
            "// /a.tys\nexport const a = 1;\n// /b.tys\nexport const b = 2;\n"
        );
    }
}
