//! 缺失绑定

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_common::{DiagnosticKind, Severity};
use binding_graph::BindingGraph;

/// 请求解析到零个绑定
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingBindingValidator;

impl MissingBindingValidator {
    pub const NAME: &'static str = "missing-binding";
}

impl ValidationPlugin for MissingBindingValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for (key, component, ids) in graph.resolutions() {
            if !ids.is_empty() {
                continue;
            }

            let mut message = format!("{key} 没有可用的绑定");
            // 绑定存在于不可见的组件时给出提示
            let visible = tree.ancestry(component);
            let elsewhere: Vec<&str> = tree
                .nodes()
                .filter(|node| !visible.contains(&node.id))
                .filter(|node| graph.declarations(node.id).has_explicit_binding(key))
                .map(|node| node.path.as_str())
                .collect();
            if !elsewhere.is_empty() {
                message.push_str(&format!(
                    "，但在不可见的组件中存在绑定: {}",
                    elsewhere.join(", ")
                ));
            }

            reporter.report(reporter.request_diagnostic(
                DiagnosticKind::MissingBinding,
                Severity::Error,
                key,
                component,
                message,
            ));
        }
    }
}
