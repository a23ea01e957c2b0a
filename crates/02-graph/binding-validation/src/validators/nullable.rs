//! 可空绑定

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_common::{DependencyRequest, DiagnosticKind, RequestKind, Severity};
use binding_graph::BindingGraph;

/// 可空的绑定被直接注入到没有标记可空的位置
#[derive(Debug, Clone, Copy)]
pub struct NullableValidator {
    severity: Severity,
}

impl NullableValidator {
    pub const NAME: &'static str = "nullable";

    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Default for NullableValidator {
    fn default() -> Self {
        Self::new(Severity::Error)
    }
}

fn rejects_null(request: &DependencyRequest) -> bool {
    request.kind == RequestKind::Instance && !request.nullable
}

impl ValidationPlugin for NullableValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        for node in graph.nodes() {
            for edge in &node.edges {
                if !rejects_null(&edge.request) {
                    continue;
                }
                for target in &edge.targets {
                    let binding = graph.binding(*target);
                    if !binding.is_nullable() {
                        continue;
                    }
                    reporter.report(reporter.binding_diagnostic(
                        DiagnosticKind::NullableBinding,
                        self.severity,
                        *target,
                        format!(
                            "{} 可能为 null，但 {} 的依赖 {} 没有标记为可空",
                            binding.key(),
                            node.binding,
                            edge.request
                        ),
                    ));
                }
            }
        }

        let tree = graph.tree();
        for entry in graph.entry_points() {
            if !rejects_null(&entry.request) {
                continue;
            }
            for target in &entry.targets {
                let binding = graph.binding(*target);
                if binding.is_nullable() {
                    reporter.report(reporter.binding_diagnostic(
                        DiagnosticKind::NullableBinding,
                        self.severity,
                        *target,
                        format!(
                            "{} 可能为 null，但入口点 {}.{}() 没有标记为可空",
                            binding.key(),
                            tree.node(entry.component).name(),
                            entry.method
                        ),
                    ));
                }
            }
        }
    }
}
