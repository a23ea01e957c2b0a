//! 拓扑工具
//!
//! 通用的有向图算法（强连通分量、最短环、可达性、拓扑排序），
//! 以及在绑定图上建立的依赖网络。

use crate::graph::{BindingId, BindingNode};
use petgraph::algo::{has_path_connecting, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::{HashMap, HashSet, VecDeque};

/// 非平凡的强连通分量：大小大于 1，或者带自环的单个节点。每个分量内部按编号排序。
pub fn cyclic_components<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(graph)
        .into_iter()
        .filter(|scc| {
            scc.len() > 1
                || scc
                    .first()
                    .is_some_and(|node| graph.contains_edge(*node, *node))
        })
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    components.sort();
    components
}

/// 经过 `start` 且只使用 `within` 中节点的最短环，返回的路径以 `start` 开头
pub fn shortest_cycle_through<N, E>(
    graph: &DiGraph<N, E>,
    start: NodeIndex,
    within: &HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        let mut neighbors: Vec<NodeIndex> = graph.neighbors(current).collect();
        neighbors.sort();
        neighbors.dedup();
        for next in neighbors {
            if !within.contains(&next) {
                continue;
            }
            if next == start {
                let mut path = vec![current];
                let mut node = current;
                while node != start {
                    node = *parents.get(&node)?;
                    path.push(node);
                }
                path.reverse();
                return Some(path);
            }
            if seen.insert(next) {
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// 从若干起点出发可达的节点（含起点），按编号排序
pub fn reachable_from<N, E>(graph: &DiGraph<N, E>, starts: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut visited = HashSet::new();
    for start in starts {
        if visited.contains(start) {
            continue;
        }
        let mut bfs = Bfs::new(graph, *start);
        while let Some(node) = bfs.next(graph) {
            visited.insert(node);
        }
    }
    let mut nodes: Vec<NodeIndex> = visited.into_iter().collect();
    nodes.sort();
    nodes
}

/// 依赖在前的拓扑顺序，图中有环时返回 `None`
pub fn dependencies_first<N, E>(graph: &DiGraph<N, E>) -> Option<Vec<NodeIndex>> {
    toposort(graph, None).ok().map(|mut order| {
        order.reverse();
        order
    })
}

/// 依赖边的属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeInfo {
    /// 依赖请求在绑定依赖列表中的位置
    pub request_index: usize,
    /// 是否为推迟实例化的请求
    pub deferred: bool,
}

/// 绑定图上的依赖网络
///
/// 节点编号与 [`BindingId`] 一一对应。`eager` 只保留立即实例化的边，用于环检测和初始化顺序。
#[derive(Debug, Clone)]
pub struct DependencyNetwork {
    full: DiGraph<BindingId, EdgeInfo>,
    eager: DiGraph<BindingId, EdgeInfo>,
}

impl DependencyNetwork {
    /// 从绑定节点构建
    pub fn build(nodes: &[BindingNode]) -> Self {
        let mut full = DiGraph::with_capacity(nodes.len(), nodes.len());
        let mut eager = DiGraph::with_capacity(nodes.len(), nodes.len());
        for node in nodes {
            full.add_node(node.id);
            eager.add_node(node.id);
        }
        for node in nodes {
            let from = NodeIndex::new(node.id.0);
            for (request_index, edge) in node.edges.iter().enumerate() {
                let info = EdgeInfo {
                    request_index,
                    deferred: edge.request.is_deferred(),
                };
                for target in &edge.targets {
                    let to = NodeIndex::new(target.0);
                    full.add_edge(from, to, info);
                    if !info.deferred {
                        eager.add_edge(from, to, info);
                    }
                }
            }
        }
        Self { full, eager }
    }

    fn graph(&self, eager_only: bool) -> &DiGraph<BindingId, EdgeInfo> {
        if eager_only {
            &self.eager
        } else {
            &self.full
        }
    }

    /// 节点数量
    pub fn node_count(&self) -> usize {
        self.full.node_count()
    }

    /// 边数量
    pub fn edge_count(&self) -> usize {
        self.full.edge_count()
    }

    /// 只由立即实例化的边构成的环所在的强连通分量
    pub fn eager_cycles(&self) -> Vec<Vec<BindingId>> {
        cyclic_components(&self.eager)
            .into_iter()
            .map(|scc| scc.into_iter().map(to_binding_id).collect())
            .collect()
    }

    /// 强连通分量中经过编号最小节点的最短立即实例化环
    pub fn shortest_eager_cycle(&self, component: &[BindingId]) -> Option<Vec<BindingId>> {
        let within: HashSet<NodeIndex> = component.iter().map(|id| NodeIndex::new(id.0)).collect();
        let start = within.iter().min().copied()?;
        shortest_cycle_through(&self.eager, start, &within)
            .map(|path| path.into_iter().map(to_binding_id).collect())
    }

    /// 从起点可达的绑定
    pub fn reachable(&self, starts: &[BindingId], eager_only: bool) -> Vec<BindingId> {
        let starts: Vec<NodeIndex> = starts.iter().map(|id| NodeIndex::new(id.0)).collect();
        reachable_from(self.graph(eager_only), &starts)
            .into_iter()
            .map(to_binding_id)
            .collect()
    }

    /// 是否存在从 from 到 to 的路径；eager_only 时只沿非延迟边
    pub fn has_path(&self, from: BindingId, to: BindingId, eager_only: bool) -> bool {
        has_path_connecting(
            self.graph(eager_only),
            NodeIndex::new(from.0),
            NodeIndex::new(to.0),
            None,
        )
    }

    /// 直接依赖某个绑定的绑定
    pub fn dependents(&self, id: BindingId) -> Vec<BindingId> {
        let mut dependents: Vec<BindingId> = self
            .full
            .neighbors_directed(NodeIndex::new(id.0), petgraph::Direction::Incoming)
            .map(to_binding_id)
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// 依赖在前的初始化顺序，存在立即实例化的环时返回 `None`
    pub fn initialization_order(&self) -> Option<Vec<BindingId>> {
        dependencies_first(&self.eager)
            .map(|order| order.into_iter().map(to_binding_id).collect())
    }
}

fn to_binding_id(index: NodeIndex) -> BindingId {
    BindingId(index.index())
}
