//! 显式绑定与构造函数注入冲突

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_common::{DiagnosticKind, Severity};
use binding_graph::BindingGraph;

/// 子组件显式绑定了某个 Key，而祖先组件已经通过构造函数注入解析了同一个 Key
///
/// 两个组件中得到的实例来自不同的绑定，通常不是预期的行为。
#[derive(Debug, Clone, Copy)]
pub struct InjectConflictValidator {
    severity: Severity,
}

impl InjectConflictValidator {
    pub const NAME: &'static str = "inject-conflicts";

    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Default for InjectConflictValidator {
    fn default() -> Self {
        Self::new(Severity::Warning)
    }
}

impl ValidationPlugin for InjectConflictValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for (key, component, ids) in graph.resolutions() {
            if !graph.declarations(component).has_explicit_binding(key) {
                continue;
            }
            let Some(ancestor) = tree.ancestry(component).into_iter().skip(1).find(|id| {
                graph
                    .bindings_for(key, *id)
                    .iter()
                    .any(|node| node.binding.is_injection())
            }) else {
                continue;
            };

            let sites = ids
                .iter()
                .filter_map(|id| graph.binding(*id).source().cloned())
                .collect();
            reporter.report(
                reporter
                    .request_diagnostic(
                        DiagnosticKind::ExplicitBindingConflictsWithInject,
                        self.severity,
                        key,
                        component,
                        format!(
                            "{key} 在组件 {} 中被显式绑定，但祖先组件 {} 已经通过构造函数注入解析了它",
                            tree.node(component).name(),
                            tree.node(ancestor).name()
                        ),
                    )
                    .with_sites(sites),
            );
        }
    }
}
