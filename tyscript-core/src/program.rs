//! Program construction and emit orchestration.
//!
//! A [`Program`] snapshots the root units out of a host together with
//! the options, then [`Program::emit`] drives the pipeline: run the
//! `before` transforms, generate script output, write it through the
//! host (or a writer override), then run the `after_declarations`
//! transforms and generate declaration output. The only failure an
//! emit call reports is the skip flag on [`EmitResult`].

use log::debug;

use crate::ast::{Bundle, EmitNode, Node, SourceFile};
use crate::codegen_decl::emit_declarations;
use crate::codegen_js::emit_script;
use crate::emit::{self, EmitResult};
use crate::error::CoreError;
use crate::host::CompilerHost;
use crate::options::CompilerOptions;
use crate::transform::{CustomTransforms, apply_all};

#[derive(Debug)]
pub struct Program {
    options: CompilerOptions,
    units: Vec<SourceFile>,
}

impl Program {
    /// Snapshot the given roots from the host.
    ///
    /// Roots without a parsed unit are left out rather than reported;
    /// emitting such a root later comes back skipped. Decorated
    /// sources are rejected here unless the options permit the
    /// decorator syntax.
    pub fn new(
        roots: &[&str],
        options: CompilerOptions,
        host: &dyn CompilerHost,
    ) -> Result<Program, CoreError> {
        let mut units = Vec::new();
        for root in roots {
            if let Some(unit) = host.source_unit(root) {
                units.push(unit.clone());
            }
        }

        if !options.experimental_decorators {
            for unit in &units {
                if let Some(name) = first_decorator(unit) {
                    return Err(CoreError::SemanticError(format!(
                        "decorator '@{name}' in {} requires experimental decorator support",
                        unit.path
                    )));
                }
            }
        }

        Ok(Program { options, units })
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Resolve a root unit by path.
    pub fn source_file(&self, path: &str) -> Option<&SourceFile> {
        self.units.iter().find(|unit| unit.path == path)
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.units
    }

    /// Run the emit pipeline.
    ///
    /// `root` restricts emit to one unit; `None` emits every unit (or
    /// the single aggregate bundle when `out_file` is set, which takes
    /// precedence over `root`). `writer` overrides the host write
    /// capability. `declarations_only` suppresses script output.
    pub fn emit(
        &self,
        host: &mut dyn CompilerHost,
        root: Option<&str>,
        mut writer: Option<&mut dyn FnMut(&str, &str)>,
        declarations_only: bool,
        transforms: &CustomTransforms,
    ) -> EmitResult {
        if self.options.no_emit {
            return EmitResult::skipped();
        }
        if declarations_only && !self.options.declaration {
            return EmitResult::skipped();
        }

        let targets: Vec<(EmitNode, String)> = if let Some(out_file) = &self.options.out_file {
            let bundle = Bundle {
                units: self.units.clone(),
            };
            vec![(EmitNode::Bundle(bundle), out_file.clone())]
        } else {
            match root {
                Some(path) => match self.source_file(path) {
                    Some(unit) => vec![(
                        EmitNode::Unit(unit.clone()),
                        emit::script_output_path(path),
                    )],
                    None => return EmitResult::skipped(),
                },
                None => self
                    .units
                    .iter()
                    .map(|unit| {
                        (
                            EmitNode::Unit(unit.clone()),
                            emit::script_output_path(&unit.path),
                        )
                    })
                    .collect(),
            }
        };

        let newline = host.newline();
        let mut result = EmitResult::default();

        for (input, script_path) in targets {
            if !declarations_only {
                let transformed = apply_all(&transforms.before, input.clone());
                debug!("emitting script {script_path}");
                let mut script = emit_script(&transformed, &self.options, newline);
                if self.options.source_map {
                    script.push_str(&emit::source_map_reference(&script_path));
                    script.push_str(newline);
                }
                write(host, &mut writer, &mut result, &script_path, &script);

                if self.options.source_map {
                    let map_path = emit::source_map_output_path(&script_path);
                    let map = emit::source_map_body(&transformed, &script_path);
                    write(host, &mut writer, &mut result, &map_path, &map);
                }
            }

            if self.options.declaration {
                let transformed = apply_all(&transforms.after_declarations, input);
                let decl_path = emit::declaration_output_path(&script_path);
                debug!("emitting declarations {decl_path}");
                let declarations = emit_declarations(&transformed, newline);
                write(host, &mut writer, &mut result, &decl_path, &declarations);
            }
        }

        result
    }
}

fn write(
    host: &mut dyn CompilerHost,
    writer: &mut Option<&mut dyn FnMut(&str, &str)>,
    result: &mut EmitResult,
    path: &str,
    contents: &str,
) {
    match writer {
        Some(writer) => writer(path, contents),
        None => host.write_file(path, contents),
    }
    result.emitted_files.push(path.to_string());
}

fn first_decorator(unit: &SourceFile) -> Option<&str> {
    for statement in &unit.statements {
        if let Node::FnDecl { decorators, .. } = statement {
            if let Some(first) = decorators.first() {
                return Some(first.ident_text());
            }
        }
    }
    None
}
