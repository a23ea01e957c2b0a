//! 依赖循环

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_common::{DiagnosticKind, Severity};
use binding_graph::BindingGraph;

/// 只由立即实例化的边构成的环
///
/// 每个强连通分量报告一次，消息中给出分量内经过编号最小节点的最短环。
/// 环上只要有一条 Provider / Lazy 等推迟实例化的边就不算循环依赖。
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyCycleValidator;

impl DependencyCycleValidator {
    pub const NAME: &'static str = "dependency-cycle";
}

impl ValidationPlugin for DependencyCycleValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let network = graph.network();
        for component in network.eager_cycles() {
            let Some(cycle) = network.shortest_eager_cycle(&component) else {
                continue;
            };
            let Some(&start) = cycle.first() else {
                continue;
            };

            let mut path: Vec<String> = cycle
                .iter()
                .map(|id| graph.binding(*id).key().to_string())
                .collect();
            path.push(graph.binding(start).key().to_string());

            let sites = cycle
                .iter()
                .filter_map(|id| graph.binding(*id).source().cloned())
                .collect();
            reporter.report(
                reporter
                    .binding_diagnostic(
                        DiagnosticKind::DependencyCycle,
                        Severity::Error,
                        start,
                        format!("发现循环依赖: {}", path.join(" → ")),
                    )
                    .with_sites(sites),
            );
        }
    }
}
