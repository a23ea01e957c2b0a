//! 绑定图
//!
//! 解析结果：每个被请求的 (Key, 组件) 对应的绑定、绑定的持有组件，以及绑定到依赖的边。
//! 绑定图构建完成后只读，可以被多个校验器并行访问。

use crate::declarations::ComponentDeclarations;
use crate::topology::DependencyNetwork;
use binding_abstractions::{Binding, BindingKind, ComponentId, ComponentTree};
use binding_common::{DependencyRequest, Key, TraceStep};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// 绑定节点编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// 依赖边：一个依赖请求及其解析到的绑定
#[derive(Debug, Clone)]
pub struct DependencyEdge {
    pub request: DependencyRequest,
    /// 为空表示缺失绑定，多于一个表示重复绑定
    pub targets: Vec<BindingId>,
}

/// 绑定节点
#[derive(Debug, Clone)]
pub struct BindingNode {
    pub id: BindingId,
    pub binding: Arc<Binding>,
    /// 持有该绑定的组件
    pub owner: ComponentId,
    /// 与 `binding.dependencies()` 一一对应
    pub edges: Vec<DependencyEdge>,
    /// 第一次引入该节点的请求 (Key, 组件)
    pub introduced_by: (Key, ComponentId),
}

/// 某个请求的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// 组件入口点，`index` 是入口点在组件描述符中的位置
    EntryPoint { component: ComponentId, index: usize },
    /// 绑定的第 `index` 个依赖
    Dependency { from: BindingId, index: usize },
    /// 完整绑定图模式下组件声明的 Key
    Declared { component: ComponentId },
}

/// 入口点的解析结果
#[derive(Debug, Clone)]
pub struct EntryPointResolution {
    pub component: ComponentId,
    pub method: String,
    pub request: DependencyRequest,
    pub targets: Vec<BindingId>,
}

/// 解析过程中遇到正在解析的请求（结构上的环）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReentrantRequest {
    pub key: Key,
    pub component: ComponentId,
    pub requested_by: Option<BindingId>,
}

/// 绑定图
#[derive(Debug)]
pub struct BindingGraph {
    pub(crate) tree: Arc<ComponentTree>,
    pub(crate) declarations: Vec<Arc<ComponentDeclarations>>,
    pub(crate) nodes: Vec<BindingNode>,
    pub(crate) resolutions: IndexMap<(Key, ComponentId), Vec<BindingId>>,
    pub(crate) origins: HashMap<(Key, ComponentId), RequestOrigin>,
    pub(crate) entry_points: Vec<EntryPointResolution>,
    pub(crate) reentrant: Vec<ReentrantRequest>,
    pub(crate) network: OnceCell<DependencyNetwork>,
}

impl BindingGraph {
    /// 绑定图所属的组件树
    pub fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    /// 根组件名称
    pub fn root_name(&self) -> &str {
        self.tree.root().name()
    }

    /// 组件的声明索引
    pub fn declarations(&self, component: ComponentId) -> &ComponentDeclarations {
        &self.declarations[component.0]
    }

    /// 全部绑定节点，按 BindingId 顺序
    pub fn nodes(&self) -> &[BindingNode] {
        &self.nodes
    }

    /// 按编号取绑定节点
    pub fn node(&self, id: BindingId) -> &BindingNode {
        &self.nodes[id.0]
    }

    /// 按编号取绑定
    pub fn binding(&self, id: BindingId) -> &Binding {
        &self.nodes[id.0].binding
    }

    /// 绑定节点数量
    pub fn binding_count(&self) -> usize {
        self.nodes.len()
    }

    /// 全部解析结果，按首次请求的顺序
    pub fn resolutions(&self) -> impl Iterator<Item = (&Key, ComponentId, &[BindingId])> {
        self.resolutions
            .iter()
            .map(|((key, component), ids)| (key, *component, ids.as_slice()))
    }

    /// 解析记录数量
    pub fn resolution_count(&self) -> usize {
        self.resolutions.len()
    }

    /// 某个组件中某个 Key 的解析结果，未被请求时返回 `None`
    pub fn resolution(&self, key: &Key, component: ComponentId) -> Option<&[BindingId]> {
        self.resolutions
            .get(&(key.clone(), component))
            .map(Vec::as_slice)
    }

    /// 某个组件中某个 Key 解析到的绑定
    pub fn bindings_for(&self, key: &Key, component: ComponentId) -> Vec<&BindingNode> {
        self.resolution(key, component)
            .unwrap_or(&[])
            .iter()
            .map(|id| self.node(*id))
            .collect()
    }

    /// 按组件名称查找解析结果
    pub fn bindings_named(&self, key: &Key, component: &str) -> Vec<&BindingNode> {
        self.tree
            .find(component)
            .map(|id| self.bindings_for(key, id))
            .unwrap_or_default()
    }

    /// 各组件入口点的解析结果
    pub fn entry_points(&self) -> &[EntryPointResolution] {
        &self.entry_points
    }

    /// 在解析过程中被重入的请求
    pub fn reentrant_requests(&self) -> &[ReentrantRequest] {
        &self.reentrant
    }

    /// 依赖网络，首次访问时构建
    pub fn network(&self) -> &DependencyNetwork {
        self.network
            .get_or_init(|| DependencyNetwork::build(&self.nodes))
    }

    /// 从入口点到某个请求的依赖路径
    pub fn trace(&self, key: &Key, component: ComponentId) -> Vec<TraceStep> {
        let mut steps = Vec::new();
        let mut visited = HashSet::new();
        let mut current = (key.clone(), component);

        while visited.insert(current.clone()) {
            match self.origins.get(&current) {
                Some(RequestOrigin::EntryPoint { component, index }) => {
                    let node = self.tree.node(*component);
                    if let Some(entry) = node.descriptor.entry_points.get(*index) {
                        steps.push(TraceStep::EntryPoint {
                            component: node.path.clone(),
                            method: entry.method.clone(),
                            request: entry.request.clone(),
                        });
                    }
                    break;
                }
                Some(RequestOrigin::Dependency { from, index }) => {
                    let node = self.node(*from);
                    if let Some(request) = node.binding.dependencies().get(*index) {
                        steps.push(TraceStep::Dependency {
                            component: self.tree.path(node.owner).to_string(),
                            binding: node.binding.key().clone(),
                            source: node.binding.source().cloned(),
                            request: request.clone(),
                        });
                    }
                    current = node.introduced_by.clone();
                }
                Some(RequestOrigin::Declared { .. }) | None => break,
            }
        }

        steps.reverse();
        steps
    }

    /// 到引入某个绑定节点的请求为止的依赖路径
    pub fn trace_to(&self, id: BindingId) -> Vec<TraceStep> {
        let (key, component) = &self.node(id).introduced_by;
        self.trace(key, *component)
    }

    /// 沿委托链一直走到第一个非委托绑定，返回经过的全部节点
    ///
    /// 委托目标缺失、重复或成环时停在最后一个能确定的节点。
    pub fn resolve_delegate_chain(&self, start: BindingId) -> Vec<BindingId> {
        let mut chain = vec![start];
        let mut current = start;
        while self.binding(current).kind() == BindingKind::Delegate {
            let next = match self.node(current).edges.first() {
                Some(edge) if edge.targets.len() == 1 => edge.targets[0],
                _ => break,
            };
            if chain.contains(&next) {
                break;
            }
            chain.push(next);
            current = next;
        }
        chain
    }

    /// 依赖在前的初始化顺序，存在立即实例化的环时返回 `None`
    pub fn initialization_order(&self) -> Option<Vec<BindingId>> {
        self.network().initialization_order()
    }
}
