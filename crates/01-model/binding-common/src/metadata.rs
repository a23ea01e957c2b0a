//! 声明来源元数据

use serde::{Deserialize, Serialize};
use std::fmt;

/// 声明所在位置，诊断中用来指向用户代码
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclarationSource {
    /// 声明所在模块，构造函数注入和合成绑定没有模块
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// 声明元素，例如方法名或构造函数签名
    pub element: String,
}

impl DeclarationSource {
    /// 模块中的声明
    pub fn in_module(module: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            element: element.into(),
        }
    }

    /// 不属于任何模块的声明
    pub fn standalone(element: impl Into<String>) -> Self {
        Self {
            module: None,
            element: element.into(),
        }
    }
}

impl fmt::Display for DeclarationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{module}.{}", self.element),
            None => f.write_str(&self.element),
        }
    }
}
