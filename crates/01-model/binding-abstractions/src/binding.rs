//! 解析后的绑定
//!
//! 封闭的和类型，每种绑定只携带自己需要的字段。解析器和校验器通过 `match` 区分种类。

use crate::declaration::{
    ContributionBinding, ContributionKind, ContributionType, DelegateDeclaration,
};
use binding_common::{DeclarationSource, DependencyRequest, Key, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 多重绑定集合的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiboundKind {
    Set,
    Map,
}

/// 绑定种类，用于统计和展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Injection,
    Provision,
    Production,
    BoundInstance,
    Delegate,
    MultiboundSet,
    MultiboundMap,
    Optional,
    SubcomponentCreator,
}

/// 满足某个 Key 的绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    /// 显式或构造函数注入的贡献绑定
    Contribution(Arc<ContributionBinding>),
    /// 委托（别名）绑定，依赖就是被委托的请求
    Delegate(Arc<DelegateDeclaration>),
    /// 合成的多重绑定集合，依赖是所有可见的单个贡献
    Multibound {
        key: Key,
        kind: MultiboundKind,
        contributions: Vec<DependencyRequest>,
        production: bool,
    },
    /// 合成的可选绑定，`underlying` 为空表示不存在
    Optional {
        key: Key,
        underlying: Option<DependencyRequest>,
    },
    /// 通过子组件声明暴露的子组件创建器
    SubcomponentCreator {
        key: Key,
        subcomponent: String,
        source: DeclarationSource,
    },
}

impl Binding {
    pub fn key(&self) -> &Key {
        match self {
            Self::Contribution(b) => &b.key,
            Self::Delegate(d) => &d.key,
            Self::Multibound { key, .. }
            | Self::Optional { key, .. }
            | Self::SubcomponentCreator { key, .. } => key,
        }
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            Self::Contribution(b) => match b.kind {
                ContributionKind::Injection => BindingKind::Injection,
                ContributionKind::Provision => BindingKind::Provision,
                ContributionKind::Production => BindingKind::Production,
                ContributionKind::BoundInstance => BindingKind::BoundInstance,
            },
            Self::Delegate(_) => BindingKind::Delegate,
            Self::Multibound {
                kind: MultiboundKind::Set,
                ..
            } => BindingKind::MultiboundSet,
            Self::Multibound {
                kind: MultiboundKind::Map,
                ..
            } => BindingKind::MultiboundMap,
            Self::Optional { .. } => BindingKind::Optional,
            Self::SubcomponentCreator { .. } => BindingKind::SubcomponentCreator,
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Self::Contribution(b) => b.scope.as_ref(),
            Self::Delegate(d) => d.scope.as_ref(),
            _ => None,
        }
    }

    /// 绑定的依赖请求
    pub fn dependencies(&self) -> &[DependencyRequest] {
        match self {
            Self::Contribution(b) => &b.dependencies,
            Self::Delegate(d) => std::slice::from_ref(&d.delegate),
            Self::Multibound { contributions, .. } => contributions,
            Self::Optional { underlying, .. } => underlying.as_slice(),
            Self::SubcomponentCreator { .. } => &[],
        }
    }

    /// 声明位置，合成的集合和可选绑定没有
    pub fn source(&self) -> Option<&DeclarationSource> {
        match self {
            Self::Contribution(b) => Some(&b.source),
            Self::Delegate(d) => Some(&d.source),
            Self::SubcomponentCreator { source, .. } => Some(source),
            Self::Multibound { .. } | Self::Optional { .. } => None,
        }
    }

    pub fn contribution_type(&self) -> ContributionType {
        match self {
            Self::Contribution(b) => b.contribution_type.clone(),
            Self::Delegate(d) => d.contribution_type.clone(),
            _ => ContributionType::Unique,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Contribution(b) => b.nullable,
            _ => false,
        }
    }

    /// 是否为生产绑定
    pub fn is_production(&self) -> bool {
        match self {
            Self::Contribution(b) => b.kind == ContributionKind::Production,
            Self::Multibound { production, .. } => *production,
            _ => false,
        }
    }

    /// 是否为解析器合成的绑定
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Multibound { .. } | Self::Optional { .. })
    }

    /// 是否来自构造函数注入
    pub fn is_injection(&self) -> bool {
        self.kind() == BindingKind::Injection
    }

    /// 是否需要按作用域固定在某个组件上
    pub fn requires_scope_owner(&self) -> bool {
        self.scope().is_some_and(|scope| !scope.is_reusable())
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source() {
            Some(source) => write!(f, "{} ({})", self.key(), source),
            None => write!(f, "{} (合成)", self.key()),
        }
    }
}
