//! 编译选项的端到端测试
mod common;

use binding_abstractions::{ComponentBuilder, DeclarationModel, ModuleBuilder};
use binding_common::{DiagnosticKind, PlacementPolicy, ValidationLevel};
use common::{inject, key, provides, request};
use graph_composition::GraphCompilerBuilder;
use std::collections::HashMap;
use std::io::Write;

fn conflict_model() -> DeclarationModel {
    DeclarationModel::new()
        .with_injection_binding(inject("Logger", &[]))
        .with_module(
            ModuleBuilder::new("ChildModule")
                .binding(provides("ChildModule", "logger", "Logger", &[]))
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Root")
                .entry_point("logger", request("Logger"))
                .factory_method("child", "Child", &[])
                .build(),
        )
        .with_component(
            ComponentBuilder::new("Child")
                .module("ChildModule")
                .entry_point("logger", request("Logger"))
                .build(),
        )
}

/// 测试配置文件可以调整校验级别
#[test]
fn test_validation_level_from_file() -> anyhow::Result<()> {
    let default = GraphCompilerBuilder::new().build()?.compile(&conflict_model())?;
    let warnings: Vec<_> = default
        .diagnostics()
        .filter(|d| d.kind == DiagnosticKind::ExplicitBindingConflictsWithInject)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, Some(key("Logger")));
    assert!(!default.has_errors());

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
    writeln!(
        file,
        "[validation]\nexplicit_binding_conflicts_with_inject = \"error\""
    )?;
    let strict = GraphCompilerBuilder::new()
        .add_config_file(file.path())?
        .build()?;
    assert_eq!(
        strict.options().validation.explicit_binding_conflicts_with_inject,
        ValidationLevel::Error
    );
    assert!(strict.compile(&conflict_model())?.has_errors());
    Ok(())
}

/// 测试 JSON 配置文件与环境变量覆盖
#[test]
fn test_json_file_with_environment_override() -> anyhow::Result<()> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    writeln!(
        file,
        r#"{{ "resolver": {{ "placement_policy": "highest", "parallel_roots": false }} }}"#
    )?;
    let env = HashMap::from([(
        "BINDING_GRAPH_RESOLVER__PLACEMENT_POLICY".to_string(),
        "lowest".to_string(),
    )]);
    let compiler = GraphCompilerBuilder::new()
        .add_config_file(file.path())?
        .with_env_source(env)
        .build()?;

    let options = compiler.options();
    assert_eq!(options.resolver.placement_policy, PlacementPolicy::Lowest);
    assert!(!options.resolver.parallel_roots);
    Ok(())
}

/// 测试按名称禁用校验器
#[test]
fn test_disabled_validators_from_toml() -> anyhow::Result<()> {
    let compiler = GraphCompilerBuilder::new()
        .with_config_toml("[validation]\ndisabled_validators = [\"inject-conflicts\"]")
        .build()?;
    let result = compiler.compile(&conflict_model())?;
    assert_eq!(result.diagnostics().count(), 0);
    Ok(())
}

/// 测试完整绑定图模式会解析没有被入口点请求的声明
#[test]
fn test_full_binding_graph_mode() -> anyhow::Result<()> {
    let model = DeclarationModel::new()
        .with_module(
            ModuleBuilder::new("AppModule")
                .binding(provides("AppModule", "unused", "Unused", &["Missing"]))
                .build(),
        )
        .with_component(ComponentBuilder::new("Root").module("AppModule").build());

    let reachable_only = GraphCompilerBuilder::new().build()?.compile(&model)?;
    assert!(!reachable_only.has_errors());

    let full = GraphCompilerBuilder::new()
        .with_full_binding_graph_validation(true)
        .build()?
        .compile(&model)?;
    let missing: Vec<_> = full
        .diagnostics()
        .filter(|d| d.kind == DiagnosticKind::MissingBinding)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].key, Some(key("Missing")));
    Ok(())
}
