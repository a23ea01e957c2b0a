//! 诊断信息
//!
//! 诊断是可恢复的、面向用户的数据。校验器只产出诊断，从不中断解析。

use crate::key::Key;
use crate::metadata::DeclarationSource;
use crate::request::DependencyRequest;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "错误",
            Self::Warning => "警告",
            Self::Note => "提示",
        };
        f.write_str(label)
    }
}

/// 诊断类别，对应产出它的校验器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingBinding,
    DuplicateBinding,
    DependencyCycle,
    IncompatiblyScopedBinding,
    ScopeContainment,
    ScopeCycle,
    DuplicateMapKey,
    DuplicateSetDelegate,
    SubcomponentFactoryMethod,
    NullableBinding,
    ProvisionDependsOnProducer,
    InvalidProductionScope,
    ExplicitBindingConflictsWithInject,
}

impl DiagnosticKind {
    /// 中文描述
    pub fn description(self) -> &'static str {
        match self {
            Self::MissingBinding => "缺失绑定",
            Self::DuplicateBinding => "重复绑定",
            Self::DependencyCycle => "依赖循环",
            Self::IncompatiblyScopedBinding => "作用域不兼容",
            Self::ScopeContainment => "作用域包含关系错误",
            Self::ScopeCycle => "作用域循环",
            Self::DuplicateMapKey => "映射键重复",
            Self::DuplicateSetDelegate => "集合委托重复",
            Self::SubcomponentFactoryMethod => "子组件工厂方法无效",
            Self::NullableBinding => "可空绑定注入到非空位置",
            Self::ProvisionDependsOnProducer => "提供绑定依赖生产者",
            Self::InvalidProductionScope => "生产作用域位置无效",
            Self::ExplicitBindingConflictsWithInject => "显式绑定与构造注入冲突",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// 依赖路径中的一步，从入口点到出问题的请求
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum TraceStep {
    /// 组件入口点发出的请求
    EntryPoint {
        component: String,
        method: String,
        request: DependencyRequest,
    },
    /// 某个绑定对依赖的请求
    Dependency {
        component: String,
        binding: Key,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<DeclarationSource>,
        request: DependencyRequest,
    },
}

impl TraceStep {
    /// 这一步发出的请求
    pub fn request(&self) -> &DependencyRequest {
        match self {
            Self::EntryPoint { request, .. } | Self::Dependency { request, .. } => request,
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryPoint {
                component,
                method,
                request,
            } => write!(f, "{component}.{method}() 请求 {request}"),
            Self::Dependency {
                component,
                binding,
                source,
                request,
            } => {
                write!(f, "{binding} [{component}]")?;
                if let Some(source) = source {
                    write!(f, " ({source})")?;
                }
                write!(f, " 请求 {request}")
            }
        }
    }
}

/// 诊断
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// 从根组件到出问题组件的路径，例如 `AppComponent → ChildComponent`
    pub component_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
    /// 相关的声明位置
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sites: Vec<DeclarationSource>,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        component_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            component_path: component_path.into(),
            key: None,
            message: message.into(),
            trace: Vec::new(),
            sites: Vec::new(),
        }
    }

    /// 创建错误级别诊断
    pub fn error(
        kind: DiagnosticKind,
        component_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind, Severity::Error, component_path, message)
    }

    pub fn with_key(mut self, key: Key) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_trace(mut self, trace: Vec<TraceStep>) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_sites(mut self, sites: Vec<DeclarationSource>) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_site(mut self, site: DeclarationSource) -> Self {
        self.sites.push(site);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// 排序键，保证同一输入的诊断顺序稳定
    pub fn sort_key(&self) -> (Severity, DiagnosticKind, &str, Option<&Key>, &str) {
        (
            self.severity,
            self.kind,
            self.component_path.as_str(),
            self.key.as_ref(),
            self.message.as_str(),
        )
    }

    /// 渲染为多行文本
    pub fn render(&self) -> String {
        let mut out = format!(
            "[{}] {}: {} ({})",
            self.severity, self.kind, self.message, self.component_path
        );
        if !self.trace.is_empty() {
            out.push_str("\n    依赖路径:");
            for step in &self.trace {
                out.push_str("\n      ");
                out.push_str(&step.to_string());
            }
        }
        if !self.sites.is_empty() {
            out.push_str("\n    声明位置:");
            for site in &self.sites {
                out.push_str("\n      ");
                out.push_str(&site.to_string());
            }
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
