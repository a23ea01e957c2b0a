//! 生产绑定

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_abstractions::BindingKind;
use binding_common::{DiagnosticKind, Severity};
use binding_graph::BindingGraph;

/// 提供绑定依赖生产绑定，以及生产作用域出现在非生产组件中
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionValidator;

impl ProductionValidator {
    pub const NAME: &'static str = "production";

    fn provision_depends_on_producer(
        &self,
        graph: &BindingGraph,
        reporter: &DiagnosticReporter<'_>,
    ) {
        for node in graph.nodes() {
            if !matches!(
                node.binding.kind(),
                BindingKind::Provision | BindingKind::Injection | BindingKind::BoundInstance
            ) {
                continue;
            }
            for edge in &node.edges {
                for target in &edge.targets {
                    let dependency = graph.binding(*target);
                    if !dependency.is_production() {
                        continue;
                    }
                    reporter.report(reporter.binding_diagnostic(
                        DiagnosticKind::ProvisionDependsOnProducer,
                        Severity::Error,
                        node.id,
                        format!(
                            "提供绑定 {} 不能依赖生产绑定 {}",
                            node.binding.key(),
                            dependency.key()
                        ),
                    ));
                }
            }
        }

        let tree = graph.tree();
        for entry in graph.entry_points() {
            let component = tree.node(entry.component);
            if component.is_production() || entry.request.kind.is_production() {
                continue;
            }
            if entry
                .targets
                .iter()
                .any(|target| graph.binding(*target).is_production())
            {
                reporter.report(reporter.request_diagnostic(
                    DiagnosticKind::ProvisionDependsOnProducer,
                    Severity::Error,
                    &entry.request.key,
                    entry.component,
                    format!(
                        "非生产组件 {} 的入口点 {}() 请求了生产绑定 {}",
                        component.name(),
                        entry.method,
                        entry.request.key
                    ),
                ));
            }
        }
    }

    fn production_scope(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for node in graph.nodes() {
            let Some(scope) = node.binding.scope() else {
                continue;
            };
            let owner = tree.node(node.owner);
            if !scope.is_production_scope() || owner.is_production() {
                continue;
            }
            reporter.report(reporter.binding_diagnostic(
                DiagnosticKind::InvalidProductionScope,
                Severity::Error,
                node.id,
                format!(
                    "{} 带有 {scope}，只能由生产组件持有，但持有它的组件 {} 不是生产组件",
                    node.binding.key(),
                    owner.name()
                ),
            ));
        }
    }
}

impl ValidationPlugin for ProductionValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        self.provision_depends_on_producer(graph, reporter);
        self.production_scope(graph, reporter);
    }
}
