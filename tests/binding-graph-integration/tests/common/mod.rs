//! 集成测试共用的声明构造工具
#![allow(dead_code)]

use binding_abstractions::{ContributionBinding, DeclarationModel};
use binding_common::{DependencyRequest, Key};
use graph_composition::{CompilationResult, GraphCompiler, ValidatedGraph};

pub fn key(ty: &str) -> Key {
    Key::parse(ty).unwrap()
}

pub fn request(ty: &str) -> DependencyRequest {
    DependencyRequest::parse(ty).unwrap()
}

pub fn provides(module: &str, element: &str, ty: &str, deps: &[&str]) -> ContributionBinding {
    ContributionBinding::provision(key(ty), module, element)
        .with_dependencies(deps.iter().map(|dep| request(dep)))
}

pub fn inject(ty: &str, deps: &[&str]) -> ContributionBinding {
    ContributionBinding::injection(key(ty), &format!("{ty}()"))
        .with_dependencies(deps.iter().map(|dep| request(dep)))
}

/// 使用默认选项编译
pub fn compile(model: &DeclarationModel) -> anyhow::Result<CompilationResult> {
    Ok(GraphCompiler::default().compile(model)?)
}

/// 编译并取出指定根组件的结果
pub fn compile_root(model: &DeclarationModel, root: &str) -> anyhow::Result<ValidatedGraph> {
    Ok(GraphCompiler::default().compile_root(model, root)?)
}
