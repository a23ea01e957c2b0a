//! 绑定图解析的端到端测试
mod common;

use binding_abstractions::{
    BindingKind, ComponentBuilder, DeclarationModel, DelegateDeclaration, ModuleBuilder,
};
use common::{compile, compile_root, inject, key, provides, request};
use std::collections::HashSet;

fn set_model(with_root_contribution: bool) -> DeclarationModel {
    let mut root = ComponentBuilder::new("Root")
        .entry_point("bars", request("Set<Bar>"))
        .factory_method("child", "Child", &[]);
    let mut model = DeclarationModel::new().with_module(
        ModuleBuilder::new("ChildModule")
            .binding(provides("ChildModule", "childBar", "Set<Bar>", &[]).into_set())
            .build(),
    );
    if with_root_contribution {
        model = model.with_module(
            ModuleBuilder::new("RootModule")
                .binding(provides("RootModule", "rootBar", "Set<Bar>", &[]).into_set())
                .build(),
        );
        root = root.module("RootModule");
    }
    model.with_component(root.build()).with_component(
        ComponentBuilder::new("Child")
            .module("ChildModule")
            .entry_point("bars", request("Set<Bar>"))
            .build(),
    )
}

fn contribution_keys(graph: &binding_graph::BindingGraph, component: &str) -> HashSet<String> {
    graph
        .bindings_named(&key("Set<Bar>"), component)
        .iter()
        .flat_map(|node| node.binding.dependencies())
        .map(|request| request.key.to_string())
        .collect()
}

/// 测试子组件看到的集合包含祖先贡献，父组件看不到子组件的贡献
#[test]
fn test_set_contributions_across_components() -> anyhow::Result<()> {
    let compiled = compile_root(&set_model(true), "Root")?;
    assert!(!compiled.has_errors());

    let graph = &compiled.graph;
    assert_eq!(contribution_keys(graph, "Root").len(), 1);
    assert_eq!(contribution_keys(graph, "Child").len(), 2);
    Ok(())
}

/// 测试在祖先组件上增加贡献不会移除子组件已有的贡献
#[test]
fn test_adding_ancestor_contribution_is_monotonic() -> anyhow::Result<()> {
    let before = compile_root(&set_model(false), "Root")?;
    let after = compile_root(&set_model(true), "Root")?;

    let before_keys = contribution_keys(&before.graph, "Child");
    let after_keys = contribution_keys(&after.graph, "Child");
    assert_eq!(before_keys.len(), 1);
    assert!(before_keys.is_subset(&after_keys));
    assert!(after_keys.len() > before_keys.len());
    Ok(())
}

/// 测试相同输入得到相同的结果
#[test]
fn test_compilation_is_deterministic() -> anyhow::Result<()> {
    let model = set_model(true);
    let first = compile(&model)?;
    let second = compile(&model)?;

    assert_eq!(first.summary(), second.summary());
    let render = |result: &graph_composition::CompilationResult| -> Vec<String> {
        result
            .graphs
            .iter()
            .flat_map(|validated| {
                let graph = &validated.graph;
                graph.resolutions().map(move |(key, component, ids)| {
                    let bindings: Vec<String> = ids
                        .iter()
                        .map(|id| {
                            let node = graph.node(*id);
                            format!("{} @ {}", node.binding, graph.tree().path(node.owner))
                        })
                        .collect();
                    format!("{key} in {}: {}", graph.tree().path(component), bindings.join(", "))
                })
            })
            .collect()
    };
    assert_eq!(render(&first), render(&second));
    Ok(())
}

/// 测试委托链最终到达具体绑定
#[test]
fn test_delegate_chain() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .delegate(DelegateDeclaration::binds(
                    key("Repository"),
                    key("SqlRepository"),
                    "AppModule",
                    "bindRepository",
                ))
                .delegate(DelegateDeclaration::binds(
                    key("SqlRepository"),
                    key("PooledRepository"),
                    "AppModule",
                    "bindSql",
                ))
                .build(),
        )
        .with_injection_binding(inject("PooledRepository", &[]))
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("repository", request("Repository"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;
    assert!(!compiled.has_errors());

    let graph = &compiled.graph;
    let start = graph.bindings_named(&key("Repository"), "Root")[0].id;
    let chain = graph.resolve_delegate_chain(start);
    assert_eq!(chain.len(), 3);
    let last = chain[chain.len() - 1];
    assert_eq!(graph.binding(last).kind(), BindingKind::Injection);
    assert_eq!(graph.binding(last).key(), &key("PooledRepository"));
    Ok(())
}

/// 测试可选绑定在子组件中看到子组件的底层绑定
#[test]
fn test_optional_binding_follows_component() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("RootModule")
                .optional(key("Tracer"), "optionalTracer")
                .build(),
        )
        .with_module(
            ModuleBuilder::new("ChildModule")
                .binding(provides("ChildModule", "tracer", "Tracer", &[]))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("RootModule")
                .entry_point("tracer", request("Optional<Tracer>"))
                .factory_method("child", "Child", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Child")
                .module("ChildModule")
                .entry_point("tracer", request("Optional<Tracer>"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;
    assert!(!compiled.has_errors());

    let graph = &compiled.graph;
    let at_root = graph.bindings_named(&key("Optional<Tracer>"), "Root");
    assert_eq!(at_root.len(), 1);
    assert_eq!(at_root[0].binding.kind(), BindingKind::Optional);
    assert!(at_root[0].binding.dependencies().is_empty());

    let at_child = graph.bindings_named(&key("Optional<Tracer>"), "Child");
    assert_eq!(at_child.len(), 1);
    assert_eq!(at_child[0].binding.dependencies().len(), 1);
    Ok(())
}

/// 测试 JSON 形式的声明模型与代码构造的模型编译结果一致
#[test]
fn test_model_from_json() -> anyhow::Result<()> {
    let model = set_model(true);
    let json = model.to_json()?;
    let parsed = DeclarationModel::from_json(&json)?;
    assert_eq!(parsed, model);

    assert_eq!(compile(&parsed)?.summary(), compile(&model)?.summary());
    Ok(())
}

/// 测试多个根组件
#[test]
fn test_independent_roots() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Clock", &[]))
        .with_component(
            ComponentBuilder::new("Server")
                .entry_point("clock", request("Clock"))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Worker")
                .entry_point("clock", request("Clock"))
                .build(),
        );
    let result = compile(&model)?;

    let roots: Vec<&str> = result.graphs.iter().map(|g| g.root()).collect();
    assert_eq!(roots, vec!["Server", "Worker"]);
    assert!(!result.has_errors());
    Ok(())
}
