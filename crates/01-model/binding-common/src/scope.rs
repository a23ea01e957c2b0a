//! 作用域注解

use serde::{Deserialize, Serialize};
use std::fmt;

const SINGLETON: &str = "Singleton";
const REUSABLE: &str = "Reusable";
const PRODUCTION_SCOPE: &str = "ProductionScope";

/// 作用域，约束哪个组件可以持有绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn singleton() -> Self {
        Self::new(SINGLETON)
    }

    /// 可复用作用域，不绑定到特定组件
    pub fn reusable() -> Self {
        Self::new(REUSABLE)
    }

    /// 生产组件隐式声明的作用域
    pub fn production() -> Self {
        Self::new(PRODUCTION_SCOPE)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_reusable(&self) -> bool {
        self.0 == REUSABLE
    }

    pub fn is_production_scope(&self) -> bool {
        self.0 == PRODUCTION_SCOPE
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}
