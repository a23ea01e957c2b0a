//! 绑定标识

use crate::errors::ModelResult;
use crate::types::TypeName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 限定符注解，例如 `@Named("x")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qualifier(String);

impl Qualifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `@Named("value")`
    pub fn named(value: &str) -> Self {
        Self(format!("@Named(\"{value}\")"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 多重绑定贡献标识
///
/// 区分单个贡献和它所汇入的集合。贡献的 Key 永远不会等于集合本身的 Key。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MultibindingContributionId {
    /// 声明所在模块
    pub module: String,
    /// 声明元素（方法名）
    pub element: String,
}

impl MultibindingContributionId {
    pub fn new(module: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            element: element.into(),
        }
    }
}

impl fmt::Display for MultibindingContributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.module, self.element)
    }
}

/// 绑定和依赖请求的唯一标识
///
/// 三个字段全部相等时两个 Key 才相等。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    #[serde(rename = "type")]
    type_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qualifier: Option<Qualifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    multibinding_contribution_id: Option<MultibindingContributionId>,
}

impl Key {
    /// 创建不带限定符的 Key
    pub fn new(type_name: TypeName) -> Self {
        Self {
            type_name,
            qualifier: None,
            multibinding_contribution_id: None,
        }
    }

    /// 从文本创建 Key，可以带限定符前缀，例如 `@Named("x") String`
    pub fn parse(text: &str) -> ModelResult<Self> {
        let (qualifier, type_name) = split_qualifier(text);
        Ok(Self::new(TypeName::parse(type_name)?).with_qualifier(qualifier))
    }

    /// 创建带限定符的 Key
    pub fn qualified(type_name: TypeName, qualifier: Qualifier) -> Self {
        Self::new(type_name).with_qualifier(Some(qualifier))
    }

    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// 附加多重绑定贡献标识
    pub fn with_contribution_id(mut self, id: MultibindingContributionId) -> Self {
        self.multibinding_contribution_id = Some(id);
        self
    }

    /// 去掉贡献标识，得到贡献所汇入的集合 Key
    pub fn without_contribution_id(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            qualifier: self.qualifier.clone(),
            multibinding_contribution_id: None,
        }
    }

    /// 替换类型，保留限定符，丢弃贡献标识
    pub fn with_type(&self, type_name: TypeName) -> Self {
        Self {
            type_name,
            qualifier: self.qualifier.clone(),
            multibinding_contribution_id: None,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    pub fn multibinding_contribution_id(&self) -> Option<&MultibindingContributionId> {
        self.multibinding_contribution_id.as_ref()
    }

    /// 是否为单个多重绑定贡献
    pub fn is_multibinding_contribution(&self) -> bool {
        self.multibinding_contribution_id.is_some()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(qualifier) = &self.qualifier {
            write!(f, "{qualifier} ")?;
        }
        write!(f, "{}", self.type_name)?;
        if let Some(id) = &self.multibinding_contribution_id {
            write!(f, " (贡献 {id})")?;
        }
        Ok(())
    }
}

/// 拆出开头的限定符注解，括号内的空白不作为分隔
pub(crate) fn split_qualifier(text: &str) -> (Option<Qualifier>, &str) {
    let text = text.trim();
    if !text.starts_with('@') {
        return (None, text);
    }
    let mut depth = 0usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                return (
                    Some(Qualifier::new(&text[..index])),
                    text[index..].trim_start(),
                );
            }
            _ => {}
        }
    }
    (None, text)
}

impl From<TypeName> for Key {
    fn from(type_name: TypeName) -> Self {
        Self::new(type_name)
    }
}
