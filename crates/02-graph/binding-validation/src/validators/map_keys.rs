//! 映射键冲突

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_abstractions::{BindingKind, MapKey};
use binding_common::{DiagnosticKind, Key, Severity};
use binding_graph::{BindingGraph, BindingId};
use indexmap::IndexMap;
use std::collections::HashSet;

/// 同一个映射中两个贡献使用了相同的键
///
/// `Map<K, V>` 与 `Map<K, Provider<V>>` 共享同一组贡献，冲突只报告一次。
#[derive(Debug, Clone, Copy, Default)]
pub struct MapKeyValidator;

impl MapKeyValidator {
    pub const NAME: &'static str = "map-keys";
}

impl ValidationPlugin for MapKeyValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let mut reported: HashSet<(MapKey, Vec<Key>)> = HashSet::new();

        for node in graph.nodes() {
            if node.binding.kind() != BindingKind::MultiboundMap {
                continue;
            }

            let mut by_map_key: IndexMap<MapKey, Vec<BindingId>> = IndexMap::new();
            for target in node.edges.iter().flat_map(|edge| edge.targets.iter()) {
                if let Some(map_key) = graph.binding(*target).contribution_type().map_key() {
                    let ids = by_map_key.entry(map_key.clone()).or_default();
                    if !ids.contains(target) {
                        ids.push(*target);
                    }
                }
            }

            for (map_key, ids) in by_map_key {
                if ids.len() < 2 {
                    continue;
                }
                let contributions: Vec<Key> = ids
                    .iter()
                    .map(|id| graph.binding(*id).key().clone())
                    .collect();
                if !reported.insert((map_key.clone(), contributions)) {
                    continue;
                }

                let sites = ids
                    .iter()
                    .filter_map(|id| graph.binding(*id).source().cloned())
                    .collect();
                reporter.report(
                    reporter
                        .binding_diagnostic(
                            DiagnosticKind::DuplicateMapKey,
                            Severity::Error,
                            node.id,
                            format!(
                                "{} 中的键 {map_key} 有 {} 个贡献",
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
