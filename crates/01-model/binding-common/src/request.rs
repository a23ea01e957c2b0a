//! 依赖请求

use crate::key::{Key, Qualifier};
use crate::types::{TypeName, WellKnownType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 依赖的消费方式
///
/// 只影响实例化时机和异步包装，不影响 Key 的解析。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// 直接注入实例
    #[default]
    Instance,
    /// `Provider<T>`
    Provider,
    /// `Lazy<T>`
    Lazy,
    /// `Provider<Lazy<T>>`
    ProviderOfLazy,
    /// `Producer<T>`
    Producer,
    /// `Produced<T>`
    Produced,
    /// `Future<T>`
    Future,
}

impl RequestKind {
    /// 是否推迟实例化，推迟的边允许出现在依赖环中
    pub fn is_deferred(self) -> bool {
        matches!(
            self,
            Self::Provider | Self::Lazy | Self::ProviderOfLazy | Self::Producer
        )
    }

    /// 是否为生产者相关的请求方式
    pub fn is_production(self) -> bool {
        matches!(self, Self::Producer | Self::Produced | Self::Future)
    }

    /// 拆开框架包装类型，返回请求方式和被请求的类型
    pub fn from_type(ty: &TypeName) -> (Self, TypeName) {
        let Some(kind) = ty.well_known() else {
            return (Self::Instance, ty.clone());
        };
        let inner = match ty.args().first() {
            Some(inner) => inner,
            None => return (Self::Instance, ty.clone()),
        };
        match kind {
            WellKnownType::Provider => match inner.unwrap_single(WellKnownType::Lazy) {
                Some(lazy_inner) => (Self::ProviderOfLazy, lazy_inner.clone()),
                None => (Self::Provider, inner.clone()),
            },
            WellKnownType::Lazy => (Self::Lazy, inner.clone()),
            WellKnownType::Producer => (Self::Producer, inner.clone()),
            WellKnownType::Produced => (Self::Produced, inner.clone()),
            WellKnownType::Future => (Self::Future, inner.clone()),
            _ => (Self::Instance, ty.clone()),
        }
    }

    /// 按请求方式重新包装类型，用于展示
    pub fn wrap(self, ty: &TypeName) -> TypeName {
        match self {
            Self::Instance => ty.clone(),
            Self::Provider => TypeName::wrapped(WellKnownType::Provider, ty.clone()),
            Self::Lazy => TypeName::wrapped(WellKnownType::Lazy, ty.clone()),
            Self::ProviderOfLazy => TypeName::wrapped(
                WellKnownType::Provider,
                TypeName::wrapped(WellKnownType::Lazy, ty.clone()),
            ),
            Self::Producer => TypeName::wrapped(WellKnownType::Producer, ty.clone()),
            Self::Produced => TypeName::wrapped(WellKnownType::Produced, ty.clone()),
            Self::Future => TypeName::wrapped(WellKnownType::Future, ty.clone()),
        }
    }
}

/// 依赖请求：Key 加请求方式
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyRequest {
    pub key: Key,
    #[serde(default)]
    pub kind: RequestKind,
    /// 请求端是否接受 null
    #[serde(default)]
    pub nullable: bool,
    /// 请求所在的元素，例如构造函数参数名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl DependencyRequest {
    pub fn new(key: Key, kind: RequestKind) -> Self {
        Self {
            key,
            kind,
            nullable: false,
            element: None,
        }
    }

    /// 直接实例请求
    pub fn instance(key: Key) -> Self {
        Self::new(key, RequestKind::Instance)
    }

    /// `Provider<T>` 请求
    pub fn provider(key: Key) -> Self {
        Self::new(key, RequestKind::Provider)
    }

    /// `Lazy<T>` 请求
    pub fn lazy(key: Key) -> Self {
        Self::new(key, RequestKind::Lazy)
    }

    /// 从声明中的参数类型构造请求，框架包装类型会被拆开
    pub fn from_type(ty: &TypeName, qualifier: Option<Qualifier>) -> Self {
        let (kind, inner) = RequestKind::from_type(ty);
        Self::new(Key::new(inner).with_qualifier(qualifier), kind)
    }

    /// 从类型文本构造请求，可以带限定符前缀
    pub fn parse(text: &str) -> crate::errors::ModelResult<Self> {
        let (qualifier, ty) = crate::key::split_qualifier(text);
        Ok(Self::from_type(&TypeName::parse(ty)?, qualifier))
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn is_deferred(&self) -> bool {
        self.kind.is_deferred()
    }

    /// 请求在用户代码中的完整类型
    pub fn requested_type(&self) -> TypeName {
        self.kind.wrap(self.key.type_name())
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = self.key.qualifier() {
            write!(f, "{qualifier} ")?;
        }
        write!(f, "{}", self.requested_type())?;
        if let Some(element) = &self.element {
            write!(f, " {element}")?;
        }
        Ok(())
    }
}
