//! 校验器 trait 与诊断收集器

use binding_abstractions::ComponentId;
use binding_common::{Diagnostic, DiagnosticKind, Key, Severity};
use binding_graph::{BindingGraph, BindingId};
use parking_lot::Mutex;

/// 校验器 trait
///
/// 校验器是绑定图到诊断的纯函数，不能修改绑定图，也不依赖其他校验器的结果。
pub trait ValidationPlugin: Send + Sync {
    /// 校验器名称，用于配置中按名称禁用
    fn name(&self) -> &'static str;

    /// 检查绑定图并报告诊断
    fn visit(&self, graph: &BindingGraph, reporter: &DiagnosticReporter<'_>);
}

/// 诊断收集器
///
/// 多个校验器并行运行时共享同一个收集器。
pub struct DiagnosticReporter<'g> {
    graph: &'g BindingGraph,
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl<'g> DiagnosticReporter<'g> {
    pub fn new(graph: &'g BindingGraph) -> Self {
        Self {
            graph,
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    pub fn graph(&self) -> &'g BindingGraph {
        self.graph
    }

    /// 报告一条已经构造好的诊断
    pub fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }

    /// 某个 (Key, 组件) 请求上的诊断，依赖路径取自解析时记录的请求来源
    pub fn request_diagnostic(
        &self,
        kind: DiagnosticKind,
        severity: Severity,
        key: &Key,
        component: ComponentId,
        message: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic::new(kind, severity, self.graph.tree().path(component), message)
            .with_key(key.clone())
            .with_trace(self.graph.trace(key, component))
    }

    /// 某个绑定节点上的诊断，带上绑定的声明位置
    pub fn binding_diagnostic(
        &self,
        kind: DiagnosticKind,
        severity: Severity,
        id: BindingId,
        message: impl Into<String>,
    ) -> Diagnostic {
        let node = self.graph.node(id);
        let diagnostic = Diagnostic::new(
            kind,
            severity,
            self.graph.tree().path(node.owner),
            message,
        )
        .with_key(node.binding.key().clone())
        .with_trace(self.graph.trace_to(id));
        match node.binding.source() {
            Some(source) => diagnostic.with_site(source.clone()),
            None => diagnostic,
        }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}
