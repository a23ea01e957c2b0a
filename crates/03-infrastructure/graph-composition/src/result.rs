//! 编译结果

use binding_common::Diagnostic;
use binding_graph::BindingGraph;
use binding_validation::ValidationReport;
use serde::{Deserialize, Serialize};

/// 一个根组件的绑定图及其校验结果
#[derive(Debug)]
pub struct ValidatedGraph {
    pub graph: BindingGraph,
    pub report: ValidationReport,
}

impl ValidatedGraph {
    /// 根组件名
    pub fn root(&self) -> &str {
        self.graph.root_name()
    }

    /// 是否含有错误诊断
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }

    /// 统计信息
    pub fn summary(&self) -> RootSummary {
        RootSummary {
            root: self.root().to_string(),
            components: self.graph.tree().len(),
            bindings: self.graph.binding_count(),
            resolutions: self.graph.resolution_count(),
            errors: self.report.error_count(),
            warnings: self.report.warning_count(),
        }
    }
}

/// 一次编译的全部结果，按根组件在声明模型中的顺序排列
#[derive(Debug, Default)]
pub struct CompilationResult {
    pub graphs: Vec<ValidatedGraph>,
}

impl CompilationResult {
    /// 由各根组件的结果组成
    pub fn new(graphs: Vec<ValidatedGraph>) -> Self {
        Self { graphs }
    }

    /// 按根组件名称查找
    pub fn graph(&self, root: &str) -> Option<&ValidatedGraph> {
        self.graphs.iter().find(|graph| graph.root() == root)
    }

    /// 全部诊断
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.graphs.iter().flat_map(|graph| graph.report.iter())
    }

    /// 是否有任一根组件含错误
    pub fn has_errors(&self) -> bool {
        self.graphs.iter().any(ValidatedGraph::has_errors)
    }

    /// 全部错误诊断数量
    pub fn error_count(&self) -> usize {
        self.graphs.iter().map(|g| g.report.error_count()).sum()
    }

    /// 生成编译摘要
    pub fn summary(&self) -> CompilationSummary {
        let roots: Vec<RootSummary> = self.graphs.iter().map(ValidatedGraph::summary).collect();
        CompilationSummary {
            errors: roots.iter().map(|r| r.errors).sum(),
            warnings: roots.iter().map(|r| r.warnings).sum(),
            roots,
        }
    }
}

/// 单个根组件的统计
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSummary {
    pub root: String,
    pub components: usize,
    pub bindings: usize,
    pub resolutions: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// 编译统计，可序列化为 JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationSummary {
    pub roots: Vec<RootSummary>,
    pub errors: usize,
    pub warnings: usize,
}

impl CompilationSummary {
    /// 序列化为 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
