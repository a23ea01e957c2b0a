//! 结构化类型名称
//!
//! 类型以 `名称<参数, ...>` 的形式表示，参数本身也是类型名称。
//! 解析阶段不做任何语义检查，只保证结构完整。

use crate::errors::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 框架内置的集合和包装类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    /// 多重绑定集合 `Set<T>`
    Set,
    /// 多重绑定映射 `Map<K, V>`
    Map,
    /// 可选绑定 `Optional<T>`
    Optional,
    /// 延迟获取 `Provider<T>`
    Provider,
    /// 懒加载 `Lazy<T>`
    Lazy,
    /// 异步生产者 `Producer<T>`
    Producer,
    /// 生产结果 `Produced<T>`
    Produced,
    /// 异步结果 `Future<T>`
    Future,
}

impl WellKnownType {
    /// 类型的规范名称
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "Set",
            Self::Map => "Map",
            Self::Optional => "Optional",
            Self::Provider => "Provider",
            Self::Lazy => "Lazy",
            Self::Producer => "Producer",
            Self::Produced => "Produced",
            Self::Future => "Future",
        }
    }

    /// 泛型参数数量
    pub fn arity(self) -> usize {
        match self {
            Self::Map => 2,
            _ => 1,
        }
    }

    /// 根据名称查找内置类型
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Set" => Some(Self::Set),
            "Map" => Some(Self::Map),
            "Optional" => Some(Self::Optional),
            "Provider" => Some(Self::Provider),
            "Lazy" => Some(Self::Lazy),
            "Producer" => Some(Self::Producer),
            "Produced" => Some(Self::Produced),
            "Future" => Some(Self::Future),
            _ => None,
        }
    }
}

/// 类型名称
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName {
    name: String,
    args: Vec<TypeName>,
}

impl TypeName {
    /// 创建不带泛型参数的类型
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// 创建泛型类型
    pub fn generic(name: impl Into<String>, args: Vec<TypeName>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// 从文本解析类型名称
    pub fn parse(input: &str) -> Result<Self, ModelError> {
        let mut parser = TypeParser { input, pos: 0 };
        let parsed = parser
            .parse_type()
            .and_then(|ty| {
                if parser.pos == input.len() {
                    Ok(ty)
                } else {
                    Err(format!("位置 {} 处存在多余的字符", parser.pos))
                }
            })
            .map_err(|reason| ModelError::MalformedType {
                input: input.to_string(),
                reason,
            })?;
        Ok(parsed)
    }

    /// `Set<T>`
    pub fn set_of(element: TypeName) -> Self {
        Self::wrapped(WellKnownType::Set, element)
    }

    /// `Map<K, V>`
    pub fn map_of(key: TypeName, value: TypeName) -> Self {
        Self::generic(WellKnownType::Map.as_str(), vec![key, value])
    }

    /// `Optional<T>`
    pub fn optional_of(value: TypeName) -> Self {
        Self::wrapped(WellKnownType::Optional, value)
    }

    /// 使用单参数内置类型包装
    pub fn wrapped(kind: WellKnownType, inner: TypeName) -> Self {
        Self::generic(kind.as_str(), vec![inner])
    }

    /// 类型名称（不含泛型参数）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 泛型参数
    pub fn args(&self) -> &[TypeName] {
        &self.args
    }

    /// 名称是否为空
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// 参数数量匹配时返回对应的内置类型
    pub fn well_known(&self) -> Option<WellKnownType> {
        WellKnownType::from_name(&self.name).filter(|kind| kind.arity() == self.args.len())
    }

    /// 是否为指定的内置类型
    pub fn is(&self, kind: WellKnownType) -> bool {
        self.well_known() == Some(kind)
    }

    pub fn is_set(&self) -> bool {
        self.is(WellKnownType::Set)
    }

    pub fn is_map(&self) -> bool {
        self.is(WellKnownType::Map)
    }

    pub fn is_optional(&self) -> bool {
        self.is(WellKnownType::Optional)
    }

    /// 是否为多重绑定集合（Set 或 Map）
    pub fn is_multibound_collection(&self) -> bool {
        self.is_set() || self.is_map()
    }

    /// 单参数内置类型的参数
    pub fn unwrap_single(&self, kind: WellKnownType) -> Option<&TypeName> {
        if self.is(kind) {
            self.args.first()
        } else {
            None
        }
    }

    /// `Set<T>` 的元素类型
    pub fn set_element(&self) -> Option<&TypeName> {
        self.unwrap_single(WellKnownType::Set)
    }

    /// `Optional<T>` 的值类型
    pub fn optional_value(&self) -> Option<&TypeName> {
        self.unwrap_single(WellKnownType::Optional)
    }

    /// `Map<K, V>` 的键类型
    pub fn map_key_type(&self) -> Option<&TypeName> {
        if self.is_map() {
            self.args.first()
        } else {
            None
        }
    }

    /// `Map<K, V>` 的值类型
    pub fn map_value_type(&self) -> Option<&TypeName> {
        if self.is_map() {
            self.args.get(1)
        } else {
            None
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (index, arg) in self.args.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl FromStr for TypeName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TypeName {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.to_string()
    }
}

/// 递归下降解析器
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump(c);
        }
    }

    fn parse_type(&mut self) -> Result<TypeName, String> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',') {
                break;
            }
            self.bump(c);
        }
        let name = self.input[start..self.pos].trim();
        if name.is_empty() {
            return Err(format!("位置 {start} 处缺少类型名称"));
        }

        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.bump('<');
            loop {
                args.push(self.parse_type()?);
                match self.peek() {
                    Some(',') => self.bump(','),
                    Some('>') => {
                        self.bump('>');
                        break;
                    }
                    _ => return Err(format!("位置 {} 处缺少 '>'", self.pos)),
                }
            }
        }
        self.skip_whitespace();

        Ok(TypeName::generic(name, args))
    }
}
