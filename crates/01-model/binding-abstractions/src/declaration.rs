//! 声明模型
//!
//! 每种声明只携带与它相关的字段。声明构造后不可变。

use binding_common::{
    DeclarationSource, DependencyRequest, Key, MultibindingContributionId, Scope,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 映射多重绑定的键，例如 `"foo"` 或 `Bar.class`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapKey(String);

impl MapKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 贡献方式
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    /// 唯一绑定
    #[default]
    Unique,
    /// `@IntoSet`
    IntoSet,
    /// `@ElementsIntoSet`
    ElementsIntoSet,
    /// `@IntoMap`
    IntoMap(MapKey),
}

impl ContributionType {
    /// 是否为多重绑定贡献
    pub fn is_multibinding(&self) -> bool {
        !matches!(self, Self::Unique)
    }

    /// 是否为集合贡献
    pub fn is_set_contribution(&self) -> bool {
        matches!(self, Self::IntoSet | Self::ElementsIntoSet)
    }

    /// 映射贡献的键
    pub fn map_key(&self) -> Option<&MapKey> {
        match self {
            Self::IntoMap(key) => Some(key),
            _ => None,
        }
    }
}

/// 贡献绑定的来源种类
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    /// 构造函数注入
    Injection,
    /// `@Provides` 方法
    #[default]
    Provision,
    /// `@Produces` 方法
    Production,
    /// 组件创建器绑定的实例
    BoundInstance,
}

/// 贡献绑定：为某个 Key 产出一个值
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributionBinding {
    pub key: Key,
    #[serde(default)]
    pub contribution_type: ContributionType,
    #[serde(default)]
    pub kind: ContributionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRequest>,
    /// 绑定是否可能返回 null
    #[serde(default)]
    pub nullable: bool,
    pub source: DeclarationSource,
}

impl ContributionBinding {
    /// 模块中的 `@Provides` 方法
    pub fn provision(key: Key, module: &str, element: &str) -> Self {
        Self {
            key,
            contribution_type: ContributionType::Unique,
            kind: ContributionKind::Provision,
            scope: None,
            dependencies: Vec::new(),
            nullable: false,
            source: DeclarationSource::in_module(module, element),
        }
    }

    /// 模块中的 `@Produces` 方法
    pub fn production(key: Key, module: &str, element: &str) -> Self {
        Self {
            kind: ContributionKind::Production,
            ..Self::provision(key, module, element)
        }
    }

    /// 构造函数注入绑定
    pub fn injection(key: Key, constructor: &str) -> Self {
        Self {
            key,
            contribution_type: ContributionType::Unique,
            kind: ContributionKind::Injection,
            scope: None,
            dependencies: Vec::new(),
            nullable: false,
            source: DeclarationSource::standalone(constructor),
        }
    }

    /// 创建器绑定的实例
    pub fn bound_instance(key: Key, creator: &str, element: &str) -> Self {
        Self {
            kind: ContributionKind::BoundInstance,
            source: DeclarationSource::in_module(creator, element),
            ..Self::injection(key, element)
        }
    }

    pub fn with_dependency(mut self, request: DependencyRequest) -> Self {
        self.dependencies.push(request);
        self
    }

    pub fn with_dependencies(mut self, requests: impl IntoIterator<Item = DependencyRequest>) -> Self {
        self.dependencies.extend(requests);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// 改为 `@IntoSet` 贡献，Key 附加贡献标识
    pub fn into_set(self) -> Self {
        self.as_contribution(ContributionType::IntoSet)
    }

    /// 改为 `@ElementsIntoSet` 贡献
    pub fn elements_into_set(self) -> Self {
        self.as_contribution(ContributionType::ElementsIntoSet)
    }

    /// 改为 `@IntoMap` 贡献
    pub fn into_map(self, map_key: MapKey) -> Self {
        self.as_contribution(ContributionType::IntoMap(map_key))
    }

    fn as_contribution(mut self, contribution_type: ContributionType) -> Self {
        let id = contribution_id(&self.source);
        self.key = self.key.with_contribution_id(id);
        self.contribution_type = contribution_type;
        self
    }
}

/// 委托声明：Key A 通过重新请求 Key B 来满足
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelegateDeclaration {
    pub key: Key,
    #[serde(default)]
    pub contribution_type: ContributionType,
    pub delegate: DependencyRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    pub source: DeclarationSource,
}

impl DelegateDeclaration {
    /// `@Binds` 方法
    pub fn binds(key: Key, target: Key, module: &str, element: &str) -> Self {
        Self {
            key,
            contribution_type: ContributionType::Unique,
            delegate: DependencyRequest::instance(target),
            scope: None,
            source: DeclarationSource::in_module(module, element),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// 改为 `@Binds @IntoSet`
    pub fn into_set(mut self) -> Self {
        self.key = self.key.with_contribution_id(contribution_id(&self.source));
        self.contribution_type = ContributionType::IntoSet;
        self
    }

    /// 改为 `@Binds @IntoMap`
    pub fn into_map(mut self, map_key: MapKey) -> Self {
        self.key = self.key.with_contribution_id(contribution_id(&self.source));
        self.contribution_type = ContributionType::IntoMap(map_key);
        self
    }
}

/// 多重绑定声明：即使没有贡献，Key 也是一个（可能为空的）集合
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MultibindingDeclaration {
    pub key: Key,
    pub source: DeclarationSource,
}

/// 可选绑定声明
///
/// `key` 是被包装的类型 T 的 Key，请求 `Optional<T>` 时根据 T 是否有绑定决定存在与否。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionalBindingDeclaration {
    pub key: Key,
    pub source: DeclarationSource,
}

/// 子组件声明：通过模块把子组件的创建器暴露给当前组件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubcomponentDeclaration {
    /// 子组件创建器的 Key
    pub key: Key,
    /// 子组件名称
    pub subcomponent: String,
    pub source: DeclarationSource,
}

/// 模块中的一条声明
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "snake_case")]
pub enum Declaration {
    Contribution(ContributionBinding),
    Delegate(DelegateDeclaration),
    Multibinding(MultibindingDeclaration),
    OptionalBinding(OptionalBindingDeclaration),
    Subcomponent(SubcomponentDeclaration),
}

impl Declaration {
    pub fn key(&self) -> &Key {
        match self {
            Self::Contribution(d) => &d.key,
            Self::Delegate(d) => &d.key,
            Self::Multibinding(d) => &d.key,
            Self::OptionalBinding(d) => &d.key,
            Self::Subcomponent(d) => &d.key,
        }
    }

    pub fn source(&self) -> &DeclarationSource {
        match self {
            Self::Contribution(d) => &d.source,
            Self::Delegate(d) => &d.source,
            Self::Multibinding(d) => &d.source,
            Self::OptionalBinding(d) => &d.source,
            Self::Subcomponent(d) => &d.source,
        }
    }
}

impl From<ContributionBinding> for Declaration {
    fn from(value: ContributionBinding) -> Self {
        Self::Contribution(value)
    }
}

impl From<DelegateDeclaration> for Declaration {
    fn from(value: DelegateDeclaration) -> Self {
        Self::Delegate(value)
    }
}

impl From<MultibindingDeclaration> for Declaration {
    fn from(value: MultibindingDeclaration) -> Self {
        Self::Multibinding(value)
    }
}

impl From<OptionalBindingDeclaration> for Declaration {
    fn from(value: OptionalBindingDeclaration) -> Self {
        Self::OptionalBinding(value)
    }
}

impl From<SubcomponentDeclaration> for Declaration {
    fn from(value: SubcomponentDeclaration) -> Self {
        Self::Subcomponent(value)
    }
}

fn contribution_id(source: &DeclarationSource) -> MultibindingContributionId {
    MultibindingContributionId::new(
        source.module.clone().unwrap_or_default(),
        source.element.clone(),
    )
}
