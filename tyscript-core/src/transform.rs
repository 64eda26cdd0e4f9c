//! Emit-phase syntax tree transforms.
//!
//! A transform runs once per emit input (a single unit, or a bundle
//! when emit aggregates units) at the phase it is attached to. Two
//! phases exist: `before` runs ahead of script code generation,
//! `after_declarations` runs ahead of declaration-file generation. A
//! transform attached to neither phase never runs.

use log::info;

use crate::ast::{EmitNode, Node, SourceFile};

/// A tree rewrite invoked during an emit phase.
pub trait EmitTransform {
    fn apply(&self, input: EmitNode) -> EmitNode;
}

/// Transforms keyed by the phase they attach to.
#[derive(Default)]
pub struct CustomTransforms {
    pub before: Vec<Box<dyn EmitTransform>>,
    pub after_declarations: Vec<Box<dyn EmitTransform>>,
}

impl CustomTransforms {
    pub fn new() -> CustomTransforms {
        CustomTransforms::default()
    }

    pub fn with_before(mut self, transform: impl EmitTransform + 'static) -> CustomTransforms {
        self.before.push(Box::new(transform));
        self
    }

    pub fn with_after_declarations(
        mut self,
        transform: impl EmitTransform + 'static,
    ) -> CustomTransforms {
        self.after_declarations.push(Box::new(transform));
        self
    }
}

/// Run every transform of one phase over the input, in attachment order.
pub fn apply_all(transforms: &[Box<dyn EmitTransform>], input: EmitNode) -> EmitNode {
    transforms
        .iter()
        .fold(input, |node, transform| transform.apply(node))
}

/// Pure observer: logs the unit (or bundle) it visits and passes the
/// tree through unchanged.
#[derive(Debug, Default)]
pub struct LogTransform;

impl EmitTransform for LogTransform {
    fn apply(&self, input: EmitNode) -> EmitNode {
        match &input {
            EmitNode::Bundle(bundle) => {
                info!("log transform: visiting bundle of {} units", bundle.units.len());
            }
            EmitNode::Unit(unit) => {
                info!("log transform: visiting source file {}", unit.path);
            }
        }
        input
    }
}

/// Rewrites every identifier in a unit to one fixed replacement name.
///
/// The rewrite is deliberately indiscriminate: declaration names,
/// reference sites, parameter names and decorator names are all
/// replaced alike. Bundles pass through unchanged; the rewrite is not
/// applied inside them.
#[derive(Debug)]
pub struct RenameTransform {
    replacement: String,
}

impl RenameTransform {
    pub fn new(replacement: impl Into<String>) -> RenameTransform {
        RenameTransform {
            replacement: replacement.into(),
        }
    }
}

impl EmitTransform for RenameTransform {
    fn apply(&self, input: EmitNode) -> EmitNode {
        match input {
            EmitNode::Bundle(bundle) => {
                info!(
                    "rename transform: visiting bundle of {} units",
                    bundle.units.len()
                );
                EmitNode::Bundle(bundle)
            }
            EmitNode::Unit(unit) => {
                info!("rename transform: visiting source file {}", unit.path);
                EmitNode::Unit(rename_unit(unit, &self.replacement))
            }
        }
    }
}

fn rename_unit(unit: SourceFile, replacement: &str) -> SourceFile {
    SourceFile {
        path: unit.path,
        statements: unit
            .statements
            .into_iter()
            .map(|statement| rewrite_identifiers(statement, replacement))
            .collect(),
    }
}

/// Depth-first identifier rewrite: identifier nodes become a fresh
/// identifier carrying `replacement`; every other node is rebuilt with
/// rewritten children; non-identifier leaves are returned as-is.
pub fn rewrite_identifiers(node: Node, replacement: &str) -> Node {
    match node {
        Node::Ident(_) => Node::Ident(replacement.to_string()),
        other => other.map_children(&mut |child| rewrite_identifiers(child, replacement)),
    }
}
