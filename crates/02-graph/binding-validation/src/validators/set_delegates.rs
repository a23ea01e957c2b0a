//! 集合委托重复

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_abstractions::{Binding, BindingKind};
use binding_common::{DiagnosticKind, Key, Severity};
use binding_graph::{BindingGraph, BindingId};
use indexmap::IndexMap;
use std::collections::HashSet;

/// 两个 `@Binds @IntoSet` 委托到同一个实现
#[derive(Debug, Clone, Copy, Default)]
pub struct SetDelegateValidator;

impl SetDelegateValidator {
    pub const NAME: &'static str = "set-delegates";
}

impl ValidationPlugin for SetDelegateValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let mut reported: HashSet<Vec<BindingId>> = HashSet::new();

        for node in graph.nodes() {
            if node.binding.kind() != BindingKind::MultiboundSet {
                continue;
            }

            let mut by_target: IndexMap<&Key, Vec<BindingId>> = IndexMap::new();
            for target in node.edges.iter().flat_map(|edge| edge.targets.iter()) {
                if let Binding::Delegate(delegate) = graph.binding(*target) {
                    let ids = by_target.entry(&delegate.delegate.key).or_default();
                    if !ids.contains(target) {
                        ids.push(*target);
                    }
                }
            }

            for (implementation, ids) in by_target {
                if ids.len() < 2 || !reported.insert(ids.clone()) {
                    continue;
                }
                let sites = ids
                    .iter()
                    .filter_map(|id| graph.binding(*id).source().cloned())
                    .collect();
                reporter.report(
                    reporter
                        .binding_diagnostic(
                            DiagnosticKind::DuplicateSetDelegate,
                            Severity::Error,
                            node.id,
                            format!(
                                "{} 中有 {} 个委托贡献指向同一个实现 {implementation}",
                                node.binding.key(),
                                ids.len()
                            ),
                        )
                        .with_sites(sites),
                );
            }
        }
    }
}
