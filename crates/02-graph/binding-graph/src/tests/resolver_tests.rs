//! 绑定图解析器测试

use super::fixtures::{inject, key, provides, request, resolve, resolve_with};
use crate::{resolver_stack_size, MIN_RESOLVER_STACK_SIZE, STACK_PER_DEPTH};
use binding_abstractions::{
    BindingKind, ComponentBuilder, DeclarationModel, DelegateDeclaration, MapKey, ModuleBuilder,
};
use binding_common::{
    GraphError, InternalError, Key, ModelError, MultibindingContributionId, PlacementPolicy,
    RequestKind, ResolverOptions, Scope, TypeName,
};

/// 根组件和子组件各贡献一个 Set<Bar> 元素
fn set_model() -> DeclarationModel {
    DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("RootModule")
                .binding(provides("RootModule", "rootBar", "Set<Bar>", &[]).into_set())
                .build(),
        )
        .with_module(
            ModuleBuilder::new("ChildModule")
                .binding(provides("ChildModule", "childBar", "Set<Bar>", &[]).into_set())
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("RootModule")
                .entry_point("bars", request("Set<Bar>"))
                .factory_method("child", "Child", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Child")
                .module("ChildModule")
                .entry_point("bars", request("Set<Bar>"))
                .build(),
        )
}

/// 测试子组件的集合包含祖先的贡献，父组件看不到子组件的贡献
#[test]
fn test_set_contributions_follow_ancestry() {
    let graph = resolve(&set_model(), "Root");

    let at_root = graph.bindings_named(&key("Set<Bar>"), "Root");
    assert_eq!(at_root.len(), 1);
    assert_eq!(at_root[0].binding.kind(), BindingKind::MultiboundSet);
    assert_eq!(at_root[0].binding.dependencies().len(), 1);

    let at_child = graph.bindings_named(&key("Set<Bar>"), "Child");
    assert_eq!(at_child.len(), 1);
    assert_eq!(at_child[0].binding.dependencies().len(), 2);
    // 每个贡献都解析到唯一的绑定
    for edge in &at_child[0].edges {
        assert_eq!(edge.targets.len(), 1);
    }
}

/// 测试多次解析同一输入得到相同的结果
#[test]
fn test_resolution_is_deterministic() {
    let snapshot = || {
        let graph = resolve(&set_model(), "Root");
        graph
            .resolutions()
            .map(|(key, component, ids)| {
                let bindings: Vec<String> = ids
                    .iter()
                    .map(|id| {
                        let node = graph.node(*id);
                        format!("{} @ {}", node.binding, graph.tree().path(node.owner))
                    })
                    .collect();
                (key.to_string(), component, bindings)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(snapshot(), snapshot());
}

/// 测试委托链会一直走到具体绑定
#[test]
fn test_delegate_chain_reaches_concrete_binding() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .delegate(DelegateDeclaration::binds(key("A"), key("B"), "AppModule", "bindA"))
                .delegate(DelegateDeclaration::binds(key("B"), key("C"), "AppModule", "bindB"))
                .build(),
        )
        .with_injection_binding(inject("C", &[]))
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("a", request("A"))
                .entry_point("c", request("C"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let a = graph.bindings_named(&key("A"), "Root")[0].id;
    let chain = graph.resolve_delegate_chain(a);
    assert_eq!(chain.len(), 3);
    let c = graph.bindings_named(&key("C"), "Root")[0].id;
    assert_eq!(chain.last(), Some(&c));
    assert_eq!(graph.binding(c).kind(), BindingKind::Injection);
}

/// 测试缺失绑定留下空的解析结果，不影响其他请求
#[test]
fn test_missing_binding_leaves_empty_resolution() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .binding(provides("AppModule", "foo", "Foo", &["Missing"]))
                .binding(provides("AppModule", "bar", "Bar", &[]))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("foo", request("Foo"))
                .entry_point("bar", request("Bar"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let root = graph.tree().root_id();
    assert_eq!(graph.resolution(&key("Missing"), root), Some(&[][..]));
    assert_eq!(graph.bindings_for(&key("Bar"), root).len(), 1);
    let foo = graph.bindings_for(&key("Foo"), root)[0];
    assert!(foo.edges[0].targets.is_empty());
}

/// 测试重复绑定都保留在解析结果中
#[test]
fn test_duplicate_bindings_are_all_resolved() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("First")
                .binding(provides("First", "name", "@Named(\"x\") String", &[]))
                .build(),
        )
        .with_module(
            ModuleBuilder::new("Second")
                .binding(provides("Second", "name", "@Named(\"x\") String", &[]))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("First")
                .module("Second")
                .entry_point("name", request("@Named(\"x\") String"))
                .build(),
        );
    let graph = resolve(&model, "Root");
    assert_eq!(
        graph
            .bindings_named(&key("@Named(\"x\") String"), "Root")
            .len(),
        2
    );
}

/// 测试经过 Provider 的结构环被记录，但立即实例化网络中没有环
#[test]
fn test_provider_cycle_is_recorded_as_reentrant() {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("A", &["Provider<B>"]))
        .with_injection_binding(inject("B", &["A"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("a", request("A"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    assert_eq!(graph.reentrant_requests().len(), 1);
    assert_eq!(graph.reentrant_requests()[0].key, key("A"));
    assert!(graph.network().eager_cycles().is_empty());
    assert!(graph.initialization_order().is_some());
}

/// 测试立即实例化的环出现在依赖网络中
#[test]
fn test_eager_cycle_is_visible_in_network() {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("A", &["B"]))
        .with_injection_binding(inject("B", &["A"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("a", request("A"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let cycles = graph.network().eager_cycles();
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].len(), 2);
    let shortest = graph.network().shortest_eager_cycle(&cycles[0]).unwrap();
    assert_eq!(shortest.len(), 2);
    assert!(graph.initialization_order().is_none());
}

/// 测试带作用域的注入绑定放在拥有该作用域的祖先组件
#[test]
fn test_scoped_injection_binding_moves_to_scope_owner() {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Cache", &[]).with_scope(Scope::singleton()))
        .with_component(
            ComponentBuilder::new("Root")
                .scope(Scope::singleton())
                .factory_method("child", "Child", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Child")
                .entry_point("cache", request("Cache"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let cache = graph.bindings_named(&key("Cache"), "Child");
    assert_eq!(cache.len(), 1);
    assert_eq!(cache[0].owner, graph.tree().root_id());
}

/// 测试可选绑定在底层绑定存在与否时的结果
#[test]
fn test_optional_binding_presence() {
    let module = ModuleBuilder::new("AppModule")
        .optional(key("Foo"), "optionalFoo")
        .optional(key("Bar"), "optionalBar")
        .build();
    let model = DeclarationModel::new()
        .with_module(module)
        .with_injection_binding(inject("Foo", &[]))
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("foo", request("Optional<Foo>"))
                .entry_point("bar", request("Optional<Bar>"))
                .entry_point("lazyFoo", request("Optional<Lazy<Foo>>"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let present = graph.bindings_named(&key("Optional<Foo>"), "Root");
    assert_eq!(present.len(), 1);
    assert_eq!(present[0].binding.dependencies().len(), 1);
    assert_eq!(present[0].edges[0].targets.len(), 1);

    let absent = graph.bindings_named(&key("Optional<Bar>"), "Root");
    assert_eq!(absent.len(), 1);
    assert_eq!(absent[0].binding.kind(), BindingKind::Optional);
    assert!(absent[0].binding.dependencies().is_empty());

    let lazy = graph.bindings_named(&key("Optional<Lazy<Foo>>"), "Root");
    assert_eq!(lazy[0].binding.dependencies()[0].kind, RequestKind::Lazy);
}

/// 测试 Map<K, Provider<V>> 汇集 Map<K, V> 的贡献并以 Provider 方式请求
#[test]
fn test_map_of_providers_shares_contributions() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .binding(
                    provides("AppModule", "a", "Map<String, Foo>", &[])
                        .into_map(MapKey::new("\"a\"")),
                )
                .binding(
                    provides("AppModule", "b", "Map<String, Foo>", &[])
                        .into_map(MapKey::new("\"b\"")),
                )
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("values", request("Map<String, Foo>"))
                .entry_point("providers", request("Map<String, Provider<Foo>>"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let providers = graph.bindings_named(&key("Map<String, Provider<Foo>>"), "Root");
    assert_eq!(providers[0].binding.kind(), BindingKind::MultiboundMap);
    assert!(providers[0]
        .binding
        .dependencies()
        .iter()
        .all(|dep| dep.kind == RequestKind::Provider));

    let values = graph.bindings_named(&key("Map<String, Foo>"), "Root");
    let targets = |node: &crate::BindingNode| -> Vec<_> {
        node.edges.iter().flat_map(|e| e.targets.clone()).collect()
    };
    assert_eq!(targets(providers[0]), targets(values[0]));
    assert_eq!(targets(values[0]).len(), 2);
}

/// 测试只有多重绑定声明时集合为空
#[test]
fn test_multibinds_declaration_yields_empty_collection() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .multibinds(key("Set<Plugin>"), "plugins")
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("plugins", request("Set<Plugin>"))
                .build(),
        );
    let graph = resolve(&model, "Root");
    let plugins = graph.bindings_named(&key("Set<Plugin>"), "Root");
    assert_eq!(plugins.len(), 1);
    assert!(plugins[0].binding.dependencies().is_empty());
}

/// 测试唯一绑定携带贡献标识时报告格式错误
#[test]
fn test_unique_binding_with_contribution_id_is_malformed() {
    let mut binding = provides("AppModule", "bar", "Set<Bar>", &[]);
    binding.key = binding
        .key
        .with_contribution_id(MultibindingContributionId::new("AppModule", "bar"));
    let model = DeclarationModel::new()
        .with_module(ModuleBuilder::new("AppModule").binding(binding).build())
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("bars", request("Set<Bar>"))
                .build(),
        );
    let error = resolve_with(&model, "Root", ResolverOptions::default()).unwrap_err();
    assert!(matches!(
        error,
        GraphError::Model {
            source: ModelError::MalformedDeclaration { .. }
        }
    ));
}

/// 测试委托目标缺少类型时报告格式错误
#[test]
fn test_delegate_without_target_type_is_malformed() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .delegate(DelegateDeclaration::binds(
                    key("Foo"),
                    Key::new(TypeName::new("")),
                    "AppModule",
                    "bindFoo",
                ))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("foo", request("Foo"))
                .build(),
        );
    let error = resolve_with(&model, "Root", ResolverOptions::default()).unwrap_err();
    assert!(error.is_model_error());
}

/// 测试超过最大解析深度时返回内部错误
#[test]
fn test_resolution_depth_limit() {
    let mut model = DeclarationModel::new().with_component(
        ComponentBuilder::new("Root")
            .entry_point("start", request("T0"))
            .build(),
    );
    for i in 0..5 {
        let next = format!("T{}", i + 1);
        model = model.with_injection_binding(inject(&format!("T{i}"), &[next.as_str()]));
    }
    let options = ResolverOptions {
        max_resolution_depth: 3,
        ..ResolverOptions::default()
    };
    let error = resolve_with(&model, "Root", options).unwrap_err();
    match error {
        GraphError::Internal {
            source: InternalError::ResolutionDepthExceeded { limit, chain, .. },
        } => {
            assert_eq!(limit, 3);
            assert_eq!(chain.len(), 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

/// 一千层的 @Provides 依赖链
fn long_chain_model(length: usize) -> DeclarationModel {
    let mut module = ModuleBuilder::new("ChainModule");
    for i in 0..length {
        let ty = format!("T{i}");
        let next = format!("T{}", i + 1);
        let deps: Vec<&str> = if i + 1 < length { vec![next.as_str()] } else { vec![] };
        module = module.binding(provides("ChainModule", &format!("provideT{i}"), &ty, &deps));
    }
    DeclarationModel::new()
        .with_module(module.build())
        .with_component(
            ComponentBuilder::new("Root")
                .module("ChainModule")
                .entry_point("start", request("T0"))
                .build(),
        )
}

/// 测试深度上限内的长依赖链在默认测试线程上也能解析完成
#[test]
fn test_long_dependency_chain_resolves() {
    let graph = resolve(&long_chain_model(1000), "Root");
    assert_eq!(graph.binding_count(), 1000);
    assert!(graph.resolutions().all(|(_, _, ids)| ids.len() == 1));
    let last = graph.bindings_named(&key("T999"), "Root");
    assert_eq!(last.len(), 1);
}

/// 测试深度上限接近链长时仍按上限报错而不是耗尽栈
#[test]
fn test_long_chain_beyond_limit_reports_depth() {
    let options = ResolverOptions {
        max_resolution_depth: 999,
        ..ResolverOptions::default()
    };
    let error = resolve_with(&long_chain_model(1000), "Root", options).unwrap_err();
    assert!(matches!(
        error,
        GraphError::Internal {
            source: InternalError::ResolutionDepthExceeded { limit: 999, .. }
        }
    ));
}

/// 测试解析线程栈随深度上限增长
#[test]
fn test_resolver_stack_size_grows_with_depth() {
    assert_eq!(resolver_stack_size(0), MIN_RESOLVER_STACK_SIZE);
    assert_eq!(resolver_stack_size(1024), MIN_RESOLVER_STACK_SIZE.max(1024 * STACK_PER_DEPTH));
    assert_eq!(resolver_stack_size(100_000), 100_000 * STACK_PER_DEPTH);
    assert!(resolver_stack_size(usize::MAX) >= MIN_RESOLVER_STACK_SIZE);
}

fn placement_model() -> DeclarationModel {
    DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("ChildModule")
                .binding(provides("ChildModule", "baz", "Baz", &[]))
                .build(),
        )
        .with_injection_binding(inject("Foo", &[]))
        .with_injection_binding(inject("Bar", &["Baz"]))
        .with_component(
            ComponentBuilder::new("Root")
                .factory_method("child", "Child", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Child")
                .module("ChildModule")
                .entry_point("foo", request("Foo"))
                .entry_point("bar", request("Bar"))
                .build(),
        )
}

/// 测试默认放置在请求所在的组件
#[test]
fn test_lowest_placement_uses_requesting_component() {
    let graph = resolve(&placement_model(), "Root");
    let child = graph.tree().find("Child").unwrap();
    assert_eq!(graph.bindings_named(&key("Foo"), "Child")[0].owner, child);
    assert_eq!(graph.bindings_named(&key("Bar"), "Child")[0].owner, child);
}

/// 测试最高放置策略受依赖的持有组件约束
#[test]
fn test_highest_placement_respects_dependency_owners() {
    let options = ResolverOptions {
        placement_policy: PlacementPolicy::Highest,
        ..ResolverOptions::default()
    };
    let graph = resolve_with(&placement_model(), "Root", options).unwrap();
    let root = graph.tree().root_id();
    let child = graph.tree().find("Child").unwrap();
    assert_eq!(graph.bindings_named(&key("Foo"), "Child")[0].owner, root);
    assert_eq!(graph.bindings_named(&key("Bar"), "Child")[0].owner, child);
}

/// 测试完整绑定图模式会解析未被请求的声明
#[test]
fn test_full_binding_graph_resolves_declared_keys() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .binding(provides("AppModule", "foo", "Foo", &[]))
                .build(),
        )
        .with_component(ComponentBuilder::new("Root").module("AppModule").build());

    let graph = resolve(&model, "Root");
    assert!(graph.resolution(&key("Foo"), graph.tree().root_id()).is_none());

    let options = ResolverOptions {
        full_binding_graph_validation: true,
        ..ResolverOptions::default()
    };
    let graph = resolve_with(&model, "Root", options).unwrap();
    assert_eq!(graph.bindings_named(&key("Foo"), "Root").len(), 1);
}

/// 测试子组件创建器绑定由声明它的组件持有
#[test]
fn test_subcomponent_creator_binding() {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .subcomponent(key("Child.Builder"), "Child")
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("AppModule")
                .entry_point("childBuilder", request("Child.Builder"))
                .build(),
        )
        .with_component(ComponentBuilder::new("Child").build());
    let graph = resolve(&model, "Root");

    assert_eq!(graph.tree().len(), 2);
    let creator = graph.bindings_named(&key("Child.Builder"), "Root");
    assert_eq!(creator.len(), 1);
    assert_eq!(creator[0].binding.kind(), BindingKind::SubcomponentCreator);
    assert_eq!(creator[0].owner, graph.tree().root_id());
}

/// 测试依赖路径从入口点开始
#[test]
fn test_trace_starts_at_entry_point() {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("A", &["B"]))
        .with_injection_binding(inject("B", &["C"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("a", request("A"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let trace = graph.trace(&key("C"), graph.tree().root_id());
    assert_eq!(trace.len(), 3);
    assert!(trace[0].to_string().contains("Root.a()"));
    assert!(trace[2].to_string().contains("请求 C"));
}

/// 测试初始化顺序把依赖放在前面
#[test]
fn test_initialization_order_puts_dependencies_first() {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("A", &["B"]))
        .with_injection_binding(inject("B", &["C"]))
        .with_injection_binding(inject("C", &[]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("a", request("A"))
                .build(),
        );
    let graph = resolve(&model, "Root");

    let order: Vec<String> = graph
        .initialization_order()
        .unwrap()
        .into_iter()
        .map(|id| graph.binding(id).key().to_string())
        .collect();
    assert_eq!(order, vec!["C", "B", "A"]);
}
