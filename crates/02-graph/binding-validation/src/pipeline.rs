//! 校验流水线

use crate::plugin::{DiagnosticReporter, ValidationPlugin};
use crate::report::ValidationReport;
use crate::validators::{
    DependencyCycleValidator, DuplicateBindingValidator, InjectConflictValidator,
    MapKeyValidator, MissingBindingValidator, NullableValidator, ProductionValidator,
    ScopingValidator, SetDelegateValidator, SubcomponentFactoryValidator,
};
use binding_common::{DiagnosticKind, ValidationOptions};
use binding_graph::BindingGraph;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 标准校验器的名称
pub const STANDARD_VALIDATORS: &[&str] = &[
    MissingBindingValidator::NAME,
    DuplicateBindingValidator::NAME,
    DependencyCycleValidator::NAME,
    ScopingValidator::NAME,
    MapKeyValidator::NAME,
    SetDelegateValidator::NAME,
    SubcomponentFactoryValidator::NAME,
    NullableValidator::NAME,
    ProductionValidator::NAME,
    InjectConflictValidator::NAME,
];

/// 校验流水线
#[derive(Clone)]
pub struct ValidationPipeline {
    plugins: Vec<Arc<dyn ValidationPlugin>>,
    parallel: bool,
}

impl ValidationPipeline {
    /// 空流水线
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            parallel: true,
        }
    }

    /// 按选项组装标准校验器，被禁用或级别为 `off` 的校验器不会加入
    pub fn standard(options: &ValidationOptions) -> Self {
        let mut candidates: Vec<Arc<dyn ValidationPlugin>> = vec![
            Arc::new(MissingBindingValidator),
            Arc::new(DuplicateBindingValidator),
            Arc::new(DependencyCycleValidator),
            Arc::new(ScopingValidator::new(options.scope_cycle_validation.severity())),
            Arc::new(MapKeyValidator),
            Arc::new(SetDelegateValidator),
            Arc::new(SubcomponentFactoryValidator),
            Arc::new(ProductionValidator),
        ];
        if let Some(severity) = options.nullable_validation.severity() {
            candidates.push(Arc::new(NullableValidator::new(severity)));
        }
        if let Some(severity) = options.explicit_binding_conflicts_with_inject.severity() {
            candidates.push(Arc::new(InjectConflictValidator::new(severity)));
        }

        let plugins = candidates
            .into_iter()
            .filter(|plugin| {
                let disabled = options.is_disabled(plugin.name());
                if disabled {
                    debug!("校验器已禁用: {}", plugin.name());
                }
                !disabled
            })
            .collect();

        Self {
            plugins,
            parallel: options.parallel_validation,
        }
    }

    /// 追加校验器
    pub fn with_plugin(mut self, plugin: Arc<dyn ValidationPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// 按名称移除校验器
    pub fn without(mut self, name: &str) -> Self {
        self.plugins.retain(|plugin| plugin.name() != name);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// 对一个绑定图运行全部校验器
    pub fn validate(&self, graph: &BindingGraph) -> ValidationReport {
        let reporter = DiagnosticReporter::new(graph);
        if self.parallel {
            self.plugins
                .par_iter()
                .for_each(|plugin| plugin.visit(graph, &reporter));
        } else {
            for plugin in &self.plugins {
                plugin.visit(graph, &reporter);
            }
        }

        let report = ValidationReport::new(graph.root_name(), reporter.into_diagnostics());

        let mut by_kind: IndexMap<DiagnosticKind, usize> = IndexMap::new();
        for diagnostic in report.iter() {
            *by_kind.entry(diagnostic.kind).or_default() += 1;
        }
        for (kind, count) in &by_kind {
            debug!("{}: {} 条诊断 ({})", graph.root_name(), count, kind);
        }
        info!(
            "校验完成: {}, 校验器数: {}, 错误: {}, 警告: {}",
            graph.root_name(),
            self.plugins.len(),
            report.error_count(),
            report.warning_count()
        );
        report
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard(&ValidationOptions::default())
    }
}

impl fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("plugins", &self.plugin_names())
            .field("parallel", &self.parallel)
            .finish()
    }
}
