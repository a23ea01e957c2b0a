//! 绑定图编译器
//!
//! 一次编译：建立声明目录，找出根组件，为每个根组件构建组件树并解析绑定图，
//! 最后运行校验流水线。各个根组件相互独立，可以并行解析。

use crate::builder::GraphCompilerBuilder;
use crate::result::{CompilationResult, ValidatedGraph};
use binding_abstractions::{ComponentTree, DeclarationModel, ModelCatalog};
use binding_common::{GraphOptions, GraphResult};
use binding_graph::{DeclarationsCache, DefaultGraphResolver, GraphResolver};
use binding_validation::ValidationPipeline;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定图编译器
#[derive(Debug, Clone)]
pub struct GraphCompiler {
    options: GraphOptions,
    pipeline: ValidationPipeline,
}

impl GraphCompiler {
    /// 使用标准校验器
    pub fn new(options: GraphOptions) -> Self {
        let pipeline = ValidationPipeline::standard(&options.validation);
        Self::with_pipeline(options, pipeline)
    }

    /// 使用指定的选项与验证管线
    pub fn with_pipeline(options: GraphOptions, pipeline: ValidationPipeline) -> Self {
        Self { options, pipeline }
    }

    /// 创建编译器构建器
    pub fn builder() -> GraphCompilerBuilder {
        GraphCompilerBuilder::new()
    }

    /// 编译选项
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    /// 验证管线
    pub fn pipeline(&self) -> &ValidationPipeline {
        &self.pipeline
    }

    /// 编译模型中的全部根组件，结果按根组件的声明顺序排列
    pub fn compile(&self, model: &DeclarationModel) -> GraphResult<CompilationResult> {
        let catalog = Arc::new(model.catalog()?);
        let roots = catalog.root_components()?;
        info!("开始编译, 根组件数: {}", roots.len());

        let resolver = self.resolver();
        let parallel = self.options.resolver.parallel_roots && roots.len() > 1;
        debug!("并行解析根组件: {}", parallel);

        let graphs = if parallel {
            roots
                .par_iter()
                .map(|root| self.compile_tree(&catalog, root, &resolver))
                .collect::<GraphResult<Vec<_>>>()?
        } else {
            roots
                .iter()
                .map(|root| self.compile_tree(&catalog, root, &resolver))
                .collect::<GraphResult<Vec<_>>>()?
        };

        let result = CompilationResult::new(graphs);
        info!(
            "编译完成, 根组件数: {}, 错误: {}",
            result.graphs.len(),
            result.error_count()
        );
        Ok(result)
    }

    /// 只编译指定的根组件
    pub fn compile_root(
        &self,
        model: &DeclarationModel,
        root: &str,
    ) -> GraphResult<ValidatedGraph> {
        let catalog = Arc::new(model.catalog()?);
        let resolver = self.resolver();
        self.compile_tree(&catalog, root, &resolver)
    }

    fn resolver(&self) -> DefaultGraphResolver {
        DefaultGraphResolver::with_cache(
            self.options.resolver.clone(),
            Arc::new(DeclarationsCache::new()),
        )
    }

    fn compile_tree(
        &self,
        catalog: &Arc<ModelCatalog>,
        root: &str,
        resolver: &DefaultGraphResolver,
    ) -> GraphResult<ValidatedGraph> {
        let tree = Arc::new(ComponentTree::build(Arc::clone(catalog), root)?);
        let graph = resolver.resolve(tree)?;
        let report = self.pipeline.validate(&graph);
        Ok(ValidatedGraph { graph, report })
    }
}

impl Default for GraphCompiler {
    fn default() -> Self {
        Self::new(GraphOptions::default())
    }
}
