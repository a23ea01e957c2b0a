//! 子组件工厂方法

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use binding_common::{Diagnostic, DiagnosticKind, DeclarationSource};
use binding_graph::BindingGraph;

/// 工厂方法的模块参数与子组件需要的模块实例不一致
///
/// - 子组件安装的需要实例的模块没有作为参数传入
/// - 作为参数传入的模块不是子组件安装的模块
/// - 作为参数传入的模块已经安装在祖先组件上
#[derive(Debug, Clone, Copy, Default)]
pub struct SubcomponentFactoryValidator;

impl SubcomponentFactoryValidator {
    pub const NAME: &'static str = "subcomponent-factory";
}

impl ValidationPlugin for SubcomponentFactoryValidator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>) {
        let tree = graph.tree();
        for node in tree.nodes() {
            let (Some(method), Some(parent)) = (&node.factory_method, node.parent) else {
                continue;
            };
            let parent_node = tree.node(parent);
            let site = DeclarationSource::in_module(parent_node.name(), method.name.clone());

            for module in &node.modules {
                if !module.requires_instance
                    || method.module_parameters.contains(&module.name)
                    || tree
                        .ancestry(parent)
                        .iter()
                        .any(|id| tree.node(*id).installs_module(&module.name))
                {
                    continue;
                }
                reporter.report(
                    Diagnostic::error(
                        DiagnosticKind::SubcomponentFactoryMethod,
                        node.path.clone(),
                        format!(
                            "子组件 {} 需要模块 {} 的实例，但工厂方法 {}() 没有这个参数",
                            node.name(),
                            module.name,
                            method.name
                        ),
                    )
                    .with_site(site.clone()),
                );
            }

            for parameter in &method.module_parameters {
                if !node.installs_module(parameter) {
                    reporter.report(
                        Diagnostic::error(
                            DiagnosticKind::SubcomponentFactoryMethod,
                            node.path.clone(),
                            format!(
                                "工厂方法 {}() 的参数 {} 不是子组件 {} 安装的模块",
                                method.name,
                                parameter,
                                node.name()
                            ),
                        )
                        .with_site(site.clone()),
                    );
                    continue;
                }
                let Some(ancestor) = tree
                    .ancestry(parent)
                    .into_iter()
                    .find(|id| tree.node(*id).installs_module(parameter))
                else {
                    continue;
                };
                reporter.report(
                    Diagnostic::error(
                        DiagnosticKind::SubcomponentFactoryMethod,
                        node.path.clone(),
                        format!(
                            "工厂方法 {}() 的参数 {} 已经安装在祖先组件 {} 上",
                            method.name,
                            parameter,
                            tree.node(ancestor).name()
                        ),
                    )
                    .with_site(site.clone()),
                );
            }
        }
    }
}
