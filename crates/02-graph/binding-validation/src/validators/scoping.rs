//! 作用域校验
//!
//! - 持有组件没有绑定的作用域
//! - 长生命周期的绑定经由立即实例化的依赖捕获短生命周期的绑定
//! - 子组件重复声明祖先组件的作用域

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_abstractions::{ComponentId, ComponentTree};
use binding_common::{DiagnosticKind, Scope, Severity};
use binding_graph::{BindingGraph, BindingId};
use std::collections::{HashSet, VecDeque};

/// 作用域校验器
#[derive(Debug, Clone, Copy)]
pub struct ScopingValidator {
    scope_cycle: Option<Severity>,
}

impl ScopingValidator {
    pub const NAME: &'static str = "scoping";

    /// `scope_cycle` 为 `None` 时不检查作用域循环
    pub fn new(scope_cycle: Option<Severity>) -> Self {
        Self { scope_cycle }
    }

    fn incompatible_scopes(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for node in graph.nodes() {
            let Some(scope) = node.binding.scope() else {
                continue;
            };
            // 生产作用域由生产绑定校验器负责
            if !node.binding.requires_scope_owner() || scope.is_production_scope() {
                continue;
            }
            let owner = tree.node(node.owner);
            if owner.has_scope(scope) {
                continue;
            }
            let message = if owner.scopes().is_empty() {
                format!(
                    "{} 带有作用域 {scope}，但持有它的组件 {} 没有作用域",
                    node.binding.key(),
                    owner.name()
                )
            } else {
                let declared: Vec<String> = owner.scopes().iter().map(Scope::to_string).collect();
                format!(
                    "{} 带有作用域 {scope}，与组件 {} 的作用域 {} 不兼容",
                    node.binding.key(),
                    owner.name(),
                    declared.join(", ")
                )
            };
            reporter.report(reporter.binding_diagnostic(
                DiagnosticKind::IncompatiblyScopedBinding,
                Severity::Error,
                node.id,
                message,
            ));
        }
    }

    fn containment(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for node in graph.nodes() {
            if !node.binding.requires_scope_owner() {
                continue;
            }
            let Some(scope) = node.binding.scope() else {
                continue;
            };
            let Some(home) = scope_home(tree, scope, node.owner) else {
                continue;
            };

            for (captured, captured_scope, captured_home) in
                captured_dependencies(graph, node.id, home)
            {
                let captured_node = graph.node(captured);
                let mut diagnostic = reporter.binding_diagnostic(
                    DiagnosticKind::ScopeContainment,
                    Severity::Error,
                    node.id,
                    format!(
                        "{} ({scope}) 立即依赖了生命周期更短的 {} ({captured_scope}, 属于 {})",
                        node.binding.key(),
                        captured_node.binding.key(),
                        tree.path(captured_home)
                    ),
                );
                if let Some(source) = captured_node.binding.source() {
                    diagnostic = diagnostic.with_site(source.clone());
                }
                reporter.report(diagnostic);
            }
        }
    }

    fn scope_cycles(
        &self,
        severity: Severity,
        graph: &BindingGraph,
        reporter: &DiagnosticReporter<'_>,
    ) {
        let tree = graph.tree();
        for node in tree.nodes() {
            let ancestors = tree.ancestry(node.id);
            // 生产组件都隐式拥有生产作用域
            for scope in node.scopes().iter().filter(|s| !s.is_production_scope()) {
                let Some(ancestor) = ancestors
                    .iter()
                    .skip(1)
                    .find(|id| tree.node(**id).has_scope(scope))
                else {
                    continue;
                };
                reporter.report(binding_common::Diagnostic::new(
                    DiagnosticKind::ScopeCycle,
                    severity,
                    node.path.clone(),
                    format!(
                        "组件 {} 声明的作用域 {scope} 已经由祖先组件 {} 声明",
                        node.name(),
                        tree.node(*ancestor).name()
                    ),
                ));
            }
        }
    }
}

impl Default for ScopingValidator {
    fn default() -> Self {
        Self::new(Some(Severity::Error))
    }
}

impl ValidationPlugin for ScopingValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        self.incompatible_scopes(graph, reporter);
        self.containment(graph, reporter);
        if let Some(severity) = self.scope_cycle {
            self.scope_cycles(severity, graph, reporter);
        }
    }
}

/// 作用域所属的组件：持有组件祖先链上最近的声明该作用域的组件，
/// 没有时取持有组件的后代中第一个声明该作用域的组件
fn scope_home(tree: &ComponentTree, scope: &Scope, owner: ComponentId) -> Option<ComponentId> {
    tree.ancestry(owner)
        .into_iter()
        .find(|id| tree.node(*id).has_scope(scope))
        .or_else(|| {
            tree.nodes()
                .filter(|node| node.id != owner && tree.is_ancestor_or_self(owner, node.id))
                .find(|node| node.has_scope(scope))
                .map(|node| node.id)
        })
}

/// 经由无作用域的中间绑定立即依赖、且作用域所属组件比 `home` 更深的带作用域绑定
fn captured_dependencies(
    graph: &BindingGraph,
    start: BindingId,
    home: ComponentId,
) -> Vec<(BindingId, Scope, ComponentId)> {
    let tree = graph.tree();
    let mut captured = Vec::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for edge in &graph.node(current).edges {
            if edge.request.is_deferred() {
                continue;
            }
            for target in &edge.targets {
                if !seen.insert(*target) {
                    continue;
                }
                let node = graph.node(*target);
                match node.binding.scope() {
                    Some(scope) if node.binding.requires_scope_owner() => {
                        let Some(target_home) = scope_home(tree, scope, node.owner) else {
                            continue;
                        };
                        if target_home != home && tree.is_ancestor_or_self(home, target_home) {
                            captured.push((*target, scope.clone(), target_home));
                        }
                    }
                    _ => queue.push_back(*target),
                }
            }
        }
    }
    captured
}
