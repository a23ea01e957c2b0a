//! 重复绑定

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_abstractions::Binding;
use binding_common::{DiagnosticKind, Severity};
use binding_graph::BindingGraph;
use std::collections::HashSet;

/// 同一个请求解析到多个绑定
///
/// 同一组绑定在多个组件中重复出现时只报告一次，报告在最先请求它的组件上。
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateBindingValidator;

impl DuplicateBindingValidator {
    pub const NAME: &'static str = "duplicate-bindings";
}

impl ValidationPlugin for DuplicateBindingValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let mut reported: HashSet<Vec<&Binding>> = HashSet::new();
        for (key, component, ids) in graph.resolutions() {
            if ids.len() < 2 {
                continue;
            }
            let bindings: Vec<&Binding> = ids.iter().map(|id| graph.binding(*id)).collect();
            if !reported.insert(bindings.clone()) {
                continue;
            }

            let sites = bindings
                .iter()
                .filter_map(|binding| binding.source().cloned())
                .collect();
            let described: Vec<String> = bindings.iter().map(|b| b.to_string()).collect();
            reporter.report(
                reporter
                    .request_diagnostic(
                        DiagnosticKind::DuplicateBinding,
                        Severity::Error,
                        key,
                        component,
                        format!(
                            "{key} 被绑定了 {} 次: {}",
                            bindings.len(),
                            described.join("; ")
                        ),
                    )
                    .with_sites(sites),
            );
        }
    }
}
