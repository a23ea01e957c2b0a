//! 校验诊断的端到端测试
mod common;

use binding_abstractions::{ComponentBuilder, DeclarationModel, ModuleBuilder};
use binding_common::{DiagnosticKind, Scope, Severity};
use common::{compile, compile_root, inject, key, provides, request};

/// 测试经过 Provider 的环不产生任何诊断
#[test]
fn test_provider_cycle_is_clean() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Engine", &["Provider<Car>"]))
        .with_injection_binding(inject("Car", &["Engine"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("car", request("Car"))
                .build(),
        );
    let result = compile(&model)?;
    assert_eq!(result.diagnostics().count(), 0);

    let graph = &result.graphs[0].graph;
    assert!(graph.initialization_order().is_some());
    Ok(())
}

/// 测试立即实例化的环只报告一次
#[test]
fn test_eager_cycle_is_reported() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Engine", &["Car"]))
        .with_injection_binding(inject("Car", &["Engine"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("car", request("Car"))
                .entry_point("engine", request("Engine"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;

    let cycles = compiled.report.of_kind(DiagnosticKind::DependencyCycle);
    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].severity, Severity::Error);
    let message = &cycles[0].message;
    assert!(message.contains("Car → Engine → Car") || message.contains("Engine → Car → Engine"));
    assert_eq!(cycles[0].sites.len(), 2);
    assert!(compiled.graph.initialization_order().is_none());
    Ok(())
}

/// 测试父子组件都请求重复的限定绑定时只报告一次
#[test]
fn test_duplicate_named_binding_reported_once() -> anyhow::Result<()> {
    let named = "@Named(\"endpoint\") String";
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("NetworkModule")
                .binding(provides("NetworkModule", "primary", named, &[]))
                .binding(provides("NetworkModule", "fallback", named, &[]))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("NetworkModule")
                .entry_point("endpoint", request(named))
                .factory_method("session", "Session", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Session")
                .entry_point("endpoint", request(named))
                .build(),
        );
    let result = compile(&model)?;

    let duplicates: Vec<_> = result
        .diagnostics()
        .filter(|d| d.kind == DiagnosticKind::DuplicateBinding)
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].key, Some(key(named)));
    let elements: Vec<&str> = duplicates[0]
        .sites
        .iter()
        .map(|site| site.element.as_str())
        .collect();
    assert_eq!(elements, vec!["primary", "fallback"]);
    Ok(())
}

/// 测试缺失绑定带有从入口点开始的路径
#[test]
fn test_missing_binding_trace() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Api", &["HttpClient"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("api", request("Api"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;

    let missing = compiled.report.of_kind(DiagnosticKind::MissingBinding);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].key, Some(key("HttpClient")));
    let rendered = compiled.report.render();
    assert!(rendered.contains("Root.api()"));
    Ok(())
}

fn scoped_model(service_scope: Scope) -> DeclarationModel {
    DeclarationModel::new()
        .with_injection_binding(inject("Service", &["Session"]).with_scope(service_scope))
        .with_injection_binding(inject("Session", &[]).with_scope(Scope::new("SessionScope")))
        .with_component(
            ComponentBuilder::new("Root")
                .scope(Scope::singleton())
                .factory_method("session", "SessionComponent", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("SessionComponent")
                .scope(Scope::new("SessionScope"))
                .entry_point("service", request("Service"))
                .build(),
        )
}

/// 测试单例依赖会话作用域的绑定
#[test]
fn test_singleton_capturing_session_scope() -> anyhow::Result<()> {
    let compiled = compile_root(&scoped_model(Scope::singleton()), "Root")?;

    let containment = compiled.report.of_kind(DiagnosticKind::ScopeContainment);
    assert_eq!(containment.len(), 1);
    assert_eq!(containment[0].key, Some(key("Service")));

    let clean = compile_root(&scoped_model(Scope::new("SessionScope")), "Root")?;
    assert!(!clean.has_errors());
    Ok(())
}

/// 测试作用域绑定安装在没有该作用域的组件上
#[test]
fn test_scope_mismatch() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("CacheModule")
                .binding(provides("CacheModule", "cache", "Cache", &[]).with_scope(Scope::singleton()))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .module("CacheModule")
                .entry_point("cache", request("Cache"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;

    let incompatible = compiled
        .report
        .of_kind(DiagnosticKind::IncompatiblyScopedBinding);
    assert_eq!(incompatible.len(), 1);
    assert_eq!(incompatible[0].component_path, "Root");
    Ok(())
}

/// 测试工厂方法缺少需要实例的模块参数
#[test]
fn test_factory_method_requires_module_instance() -> anyhow::Result<()> {
    let model = |parameters: &[&str]| {
        DeclarationModel::new()
            .with_module(
                ModuleBuilder::new("UserModule")
                    .requires_instance()
                    .binding(provides("UserModule", "user", "User", &[]))
                    .build(),
            )
            .with_component(
                ComponentBuilder::new("Root")
                    .factory_method("user", "UserComponent", parameters)
                    .build(),
            )
            .with_component(
                ComponentBuilder::new("UserComponent")
                    .module("UserModule")
                    .entry_point("user", request("User"))
                    .build(),
            )
    };

    let compiled = compile_root(&model(&[]), "Root")?;
    let invalid = compiled
        .report
        .of_kind(DiagnosticKind::SubcomponentFactoryMethod);
    assert_eq!(invalid.len(), 1);
    assert!(invalid[0].message.contains("UserModule"));

    let compiled = compile_root(&model(&["UserModule"]), "Root")?;
    assert!(!compiled.has_errors());
    Ok(())
}

/// 测试报告可以序列化为 JSON
#[test]
fn test_report_json() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_injection_binding(inject("Api", &["HttpClient"]))
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("api", request("Api"))
                .build(),
        );
    let compiled = compile_root(&model, "Root")?;
    let json = compiled.report.to_json()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["root"], "Root");
    assert_eq!(value["diagnostics"].as_array().map(Vec::len), Some(1));
    Ok(())
}
