//! 绑定图解析器
//!
//! 对组件树中每个入口点请求递归解析，结果按 (Key, 组件) 记忆化。
//! 每个 (Key, 组件) 槽位有三种状态：未开始、解析中、已完成。遇到“解析中”即是结构上的环，
//! 记录下来后继续，是否为非法的环由校验器根据依赖网络判断。
//!
//! 缺失绑定不会中断解析，空的解析结果留在图中，由校验器报告。

use crate::declarations::{ComponentDeclarations, DeclarationsCache};
use crate::graph::{
    BindingGraph, BindingId, BindingNode, DependencyEdge, EntryPointResolution, ReentrantRequest,
    RequestOrigin,
};
use binding_abstractions::{
    Binding, BindingKind, ComponentId, ComponentTree, ContributionBinding, ContributionKind,
    ContributionType, DelegateDeclaration, MultiboundKind,
};
use binding_common::{
    DependencyRequest, GraphError, GraphResult, InternalError, Key, ModelError, PlacementPolicy,
    RequestKind, ResolverOptions, TypeName, WellKnownType,
};
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

/// 错误信息中保留的依赖链长度
const CHAIN_CONTEXT: usize = 32;

/// 解析线程的最小栈大小
pub const MIN_RESOLVER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// 每一层解析深度预留的栈空间
pub const STACK_PER_DEPTH: usize = 16 * 1024;

/// 解析深度上限对应的解析线程栈大小
pub fn resolver_stack_size(max_resolution_depth: usize) -> usize {
    MIN_RESOLVER_STACK_SIZE.max(max_resolution_depth.saturating_mul(STACK_PER_DEPTH))
}

/// 绑定图解析器 trait
pub trait GraphResolver: Send + Sync {
    /// 解析以树根为根组件的绑定图
    fn resolve(&self, tree: Arc<ComponentTree>) -> GraphResult<BindingGraph>;
}

/// 默认的绑定图解析器
///
/// 声明索引缓存可以在多个解析器之间共享，记忆化状态只属于单次解析。
#[derive(Debug, Clone)]
pub struct DefaultGraphResolver {
    cache: Arc<DeclarationsCache>,
    options: ResolverOptions,
}

impl DefaultGraphResolver {
    /// 使用独立的声明索引缓存
    pub fn new(options: ResolverOptions) -> Self {
        Self::with_cache(options, Arc::new(DeclarationsCache::new()))
    }

    /// 使用共享的声明索引缓存
    pub fn with_cache(options: ResolverOptions, cache: Arc<DeclarationsCache>) -> Self {
        Self { cache, options }
    }

    /// 解析器选项
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// 声明索引缓存
    pub fn cache(&self) -> &Arc<DeclarationsCache> {
        &self.cache
    }
}

impl Default for DefaultGraphResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl DefaultGraphResolver {
    fn resolve_on_current_thread(&self, tree: Arc<ComponentTree>) -> GraphResult<BindingGraph> {
        info!(
            "开始解析根组件: {}, 组件数: {}",
            tree.root().name(),
            tree.len()
        );
        let mut context = ResolutionContext::new(tree, &self.cache, &self.options);
        context.run()?;
        let graph = context.finish()?;
        info!(
            "根组件解析完成: {}, 绑定数: {}, 解析数: {}",
            graph.root_name(),
            graph.binding_count(),
            graph.resolution_count()
        );
        Ok(graph)
    }
}

impl GraphResolver for DefaultGraphResolver {
    /// 递归解析在单独的线程上进行，栈大小由 `max_resolution_depth` 决定，
    /// 深度上限内的输入不会耗尽调用方线程的栈
    fn resolve(&self, tree: Arc<ComponentTree>) -> GraphResult<BindingGraph> {
        let stack_size = resolver_stack_size(self.options.max_resolution_depth);
        let thread_name = format!("resolve-{}", tree.root().name());
        std::thread::scope(|scope| {
            let handle = std::thread::Builder::new()
                .name(thread_name)
                .stack_size(stack_size)
                .spawn_scoped(scope, move || self.resolve_on_current_thread(tree))
                .map_err(|e| GraphError::BootstrapFailed {
                    message: format!("解析线程创建失败: {e}"),
                })?;
            handle
                .join()
                .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
        })
    }
}

/// 记忆化槽位
#[derive(Debug, Clone)]
enum Slot {
    InProgress,
    Done(Vec<BindingId>),
}

/// 绑定的声明位置，决定放置范围的上界
#[derive(Debug, Clone, Copy)]
enum Declaring {
    /// 在某个组件的模块中声明
    Component(ComponentId),
    /// 构造函数注入，任何组件都可见
    Injection,
    /// 合成绑定，上界是最低的有本地声明的组件
    Synthetic(ComponentId),
}

#[derive(Debug)]
struct Candidate {
    binding: Arc<Binding>,
    declaring: Declaring,
}

#[derive(Debug)]
struct PendingNode {
    binding: Arc<Binding>,
    owner: ComponentId,
}

type SlotKey = (Key, ComponentId);

/// 单次根组件解析的上下文
struct ResolutionContext<'a> {
    tree: Arc<ComponentTree>,
    options: &'a ResolverOptions,
    declarations: Vec<Arc<ComponentDeclarations>>,
    slots: IndexMap<SlotKey, Slot>,
    origins: HashMap<SlotKey, Vec<RequestOrigin>>,
    nodes: Vec<PendingNode>,
    interned: HashMap<(Arc<Binding>, ComponentId), BindingId>,
    entry_points: Vec<(ComponentId, usize)>,
    roots: Vec<SlotKey>,
    reentrant: IndexSet<ReentrantRequest>,
    stack: Vec<SlotKey>,
}

impl<'a> ResolutionContext<'a> {
    fn new(
        tree: Arc<ComponentTree>,
        cache: &DeclarationsCache,
        options: &'a ResolverOptions,
    ) -> Self {
        let declarations = tree.nodes().map(|node| cache.get_or_build(node)).collect();
        Self {
            tree,
            options,
            declarations,
            slots: IndexMap::new(),
            origins: HashMap::new(),
            nodes: Vec::new(),
            interned: HashMap::new(),
            entry_points: Vec::new(),
            roots: Vec::new(),
            reentrant: IndexSet::new(),
            stack: Vec::new(),
        }
    }

    /// 按组件先序处理入口点，完整模式下再处理组件声明的全部 Key
    fn run(&mut self) -> GraphResult<()> {
        let tree = Arc::clone(&self.tree);
        for node in tree.nodes() {
            for (index, entry) in node.descriptor.entry_points.iter().enumerate() {
                let key = entry.request.key.clone();
                self.resolve(
                    &key,
                    node.id,
                    Some(RequestOrigin::EntryPoint {
                        component: node.id,
                        index,
                    }),
                    None,
                )?;
                self.entry_points.push((node.id, index));
                self.roots.push((key, node.id));
            }

            if self.options.full_binding_graph_validation {
                let declared = self.declarations[node.id.0].declared_keys();
                for key in declared {
                    self.resolve(
                        &key,
                        node.id,
                        Some(RequestOrigin::Declared { component: node.id }),
                        None,
                    )?;
                    self.roots.push((key, node.id));
                }
            }
        }
        Ok(())
    }

    /// 解析一个请求。槽位正在解析时返回 `None`。
    fn resolve(
        &mut self,
        key: &Key,
        component: ComponentId,
        origin: Option<RequestOrigin>,
        requested_by: Option<BindingId>,
    ) -> GraphResult<Option<Vec<BindingId>>> {
        let slot_key = (key.clone(), component);
        if let Some(origin) = origin {
            let origins = self.origins.entry(slot_key.clone()).or_default();
            if !origins.contains(&origin) {
                origins.push(origin);
            }
        }

        match self.slots.get(&slot_key) {
            Some(Slot::Done(ids)) => return Ok(Some(ids.clone())),
            Some(Slot::InProgress) => {
                debug!("重入请求: {} (组件 {})", key, self.tree.path(component));
                self.reentrant.insert(ReentrantRequest {
                    key: key.clone(),
                    component,
                    requested_by,
                });
                return Ok(None);
            }
            None => {}
        }

        if self.stack.len() >= self.options.max_resolution_depth {
            return Err(InternalError::ResolutionDepthExceeded {
                key: key.clone(),
                component: self.tree.path(component).to_string(),
                limit: self.options.max_resolution_depth,
                chain: self.chain(),
            }
            .into());
        }

        self.slots.insert(slot_key.clone(), Slot::InProgress);
        self.stack.push(slot_key.clone());

        let candidates = self.lookup(key, component)?;
        let mut ids = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let owner = self.place(&candidate, component)?;
            let id = self.intern(candidate.binding, owner)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            debug!("未解析的 Key: {} (组件 {})", key, self.tree.path(component));
        }

        self.stack.pop();
        self.slots.insert(slot_key, Slot::Done(ids.clone()));
        Ok(Some(ids))
    }

    /// 按 (绑定, 持有组件) 复用节点，新节点立即在持有组件中解析依赖
    fn intern(&mut self, binding: Arc<Binding>, owner: ComponentId) -> GraphResult<BindingId> {
        let intern_key = (Arc::clone(&binding), owner);
        if let Some(id) = self.interned.get(&intern_key) {
            return Ok(*id);
        }

        let id = BindingId(self.nodes.len());
        self.nodes.push(PendingNode {
            binding: Arc::clone(&binding),
            owner,
        });
        self.interned.insert(intern_key, id);

        for (index, request) in binding.dependencies().iter().enumerate() {
            self.resolve(
                &request.key,
                owner,
                Some(RequestOrigin::Dependency { from: id, index }),
                Some(id),
            )?;
        }
        Ok(id)
    }

    /// 在祖先链上查找满足 Key 的全部绑定
    fn lookup(&mut self, key: &Key, component: ComponentId) -> GraphResult<Vec<Candidate>> {
        let ancestry = self.tree.ancestry(component);
        let mut candidates: Vec<Candidate> = Vec::new();

        for &owner in ancestry.iter().rev() {
            let declarations = Arc::clone(&self.declarations[owner.0]);
            for binding in declarations.bindings(key) {
                self.check_contribution(component, binding)?;
                push_candidate(
                    &mut candidates,
                    Binding::Contribution(Arc::clone(binding)),
                    Declaring::Component(owner),
                );
            }
            for delegate in declarations.delegates(key) {
                self.check_delegate(component, delegate)?;
                push_candidate(
                    &mut candidates,
                    Binding::Delegate(Arc::clone(delegate)),
                    Declaring::Component(owner),
                );
            }
            if !declarations.multibindings(key).is_empty()
                && !key.type_name().is_multibound_collection()
            {
                return Err(self.malformed(key, component, "多重绑定声明只能用于 Set 或 Map").into());
            }
            for subcomponent in declarations.subcomponents(key) {
                push_candidate(
                    &mut candidates,
                    Binding::SubcomponentCreator {
                        key: key.clone(),
                        subcomponent: subcomponent.subcomponent.clone(),
                        source: subcomponent.source.clone(),
                    },
                    Declaring::Component(owner),
                );
            }
        }

        if let Some(candidate) = self.multibound_candidate(key, component, &ancestry)? {
            candidates.push(candidate);
        }
        if let Some(candidate) = self.optional_candidate(key, &ancestry) {
            candidates.push(candidate);
        }

        if candidates.is_empty() && is_injectable(key) {
            if let Some(binding) = self.tree.catalog().injection_binding(key) {
                candidates.push(Candidate {
                    binding: Arc::new(Binding::Contribution(Arc::clone(binding))),
                    declaring: Declaring::Injection,
                });
            }
        }

        Ok(candidates)
    }

    /// 合成多重绑定：收集自身和全部祖先中的贡献
    fn multibound_candidate(
        &self,
        key: &Key,
        component: ComponentId,
        ancestry: &[ComponentId],
    ) -> GraphResult<Option<Candidate>> {
        let Some((kind, aggregate, request_kind)) = multibound_aggregate(key) else {
            return Ok(None);
        };

        let mut contributions: Vec<DependencyRequest> = Vec::new();
        let mut production = false;
        let mut top = None;
        for &owner in ancestry.iter().rev() {
            let declarations = &self.declarations[owner.0];
            if declarations.has_multibinding_declarations(&aggregate) {
                top = Some(owner);
            }
            for binding in declarations.multibinding_contributions(&aggregate) {
                self.check_contribution(component, binding)?;
                production |= binding.kind == ContributionKind::Production;
                let request = DependencyRequest::new(binding.key.clone(), request_kind);
                if !contributions.contains(&request) {
                    contributions.push(request);
                }
            }
            for delegate in declarations.delegate_multibinding_contributions(&aggregate) {
                self.check_delegate(component, delegate)?;
                let request = DependencyRequest::new(delegate.key.clone(), request_kind);
                if !contributions.contains(&request) {
                    contributions.push(request);
                }
            }
        }

        Ok(top.map(|top| Candidate {
            binding: Arc::new(Binding::Multibound {
                key: key.clone(),
                kind,
                contributions,
                production,
            }),
            declaring: Declaring::Synthetic(top),
        }))
    }

    /// 合成可选绑定：`Optional<T>` 在 T 有任意绑定时存在
    fn optional_candidate(&self, key: &Key, ancestry: &[ComponentId]) -> Option<Candidate> {
        if key.is_multibinding_contribution() {
            return None;
        }
        let value = key.type_name().optional_value()?;
        let (request_kind, underlying_type) = RequestKind::from_type(value);
        let underlying_key = key.with_type(underlying_type);

        let top = ancestry
            .iter()
            .find(|owner| {
                !self.declarations[owner.0]
                    .optional_bindings(&underlying_key)
                    .is_empty()
            })
            .copied()?;

        let underlying = self
            .has_any_binding(&underlying_key, ancestry)
            .then(|| DependencyRequest::new(underlying_key, request_kind));

        Some(Candidate {
            binding: Arc::new(Binding::Optional {
                key: key.clone(),
                underlying,
            }),
            declaring: Declaring::Synthetic(top),
        })
    }

    /// Key 在祖先链上是否有任意绑定，与作用域无关
    fn has_any_binding(&self, key: &Key, ancestry: &[ComponentId]) -> bool {
        let aggregate = multibound_aggregate(key).map(|(_, aggregate, _)| aggregate);
        let optional_value = key
            .type_name()
            .optional_value()
            .map(|value| key.with_type(RequestKind::from_type(value).1));

        let declared = ancestry.iter().any(|owner| {
            let declarations = &self.declarations[owner.0];
            declarations.has_explicit_binding(key)
                || !declarations.subcomponents(key).is_empty()
                || aggregate
                    .as_ref()
                    .is_some_and(|aggregate| declarations.has_multibinding_declarations(aggregate))
                || optional_value
                    .as_ref()
                    .is_some_and(|value| !declarations.optional_bindings(value).is_empty())
        });

        declared
            || (is_injectable(key) && self.tree.catalog().injection_binding(key).is_some())
    }

    /// 决定绑定的持有组件
    fn place(&mut self, candidate: &Candidate, component: ComponentId) -> GraphResult<ComponentId> {
        let binding = &candidate.binding;

        if let Declaring::Component(declaring) = candidate.declaring {
            let pinned = binding.requires_scope_owner()
                || matches!(
                    binding.kind(),
                    BindingKind::SubcomponentCreator | BindingKind::BoundInstance
                );
            if pinned {
                return Ok(declaring);
            }
        }

        if let (Declaring::Injection, Some(scope)) = (candidate.declaring, binding.scope()) {
            if !scope.is_reusable() {
                let owner = self
                    .tree
                    .ancestry(component)
                    .into_iter()
                    .find(|id| self.tree.node(*id).has_scope(scope))
                    .unwrap_or(component);
                return Ok(owner);
            }
        }

        match self.options.placement_policy {
            PlacementPolicy::Lowest => Ok(component),
            PlacementPolicy::Highest => self.highest_placement(candidate, component),
        }
    }

    /// 放在不高于上界、也不高于任何依赖持有组件的最高组件
    fn highest_placement(
        &mut self,
        candidate: &Candidate,
        component: ComponentId,
    ) -> GraphResult<ComponentId> {
        let top = match candidate.declaring {
            Declaring::Component(id) | Declaring::Synthetic(id) => id,
            Declaring::Injection => self.tree.root_id(),
        };
        let mut floor = self.tree.node(top).depth;

        for request in candidate.binding.dependencies() {
            if let Some(ids) = self.resolve(&request.key, component, None, None)? {
                for id in ids {
                    let owner = self.nodes[id.0].owner;
                    floor = floor.max(self.tree.node(owner).depth);
                }
            }
        }

        Ok(self
            .tree
            .ancestry(component)
            .into_iter()
            .find(|id| self.tree.node(*id).depth == floor)
            .unwrap_or(component))
    }

    fn check_contribution(
        &self,
        component: ComponentId,
        binding: &ContributionBinding,
    ) -> GraphResult<()> {
        self.check_shape(
            component,
            &binding.key,
            &binding.contribution_type,
        )
    }

    fn check_delegate(
        &self,
        component: ComponentId,
        delegate: &DelegateDeclaration,
    ) -> GraphResult<()> {
        if delegate.delegate.key.type_name().is_empty() {
            return Err(self
                .malformed(&delegate.key, component, "委托目标缺少类型")
                .into());
        }
        self.check_shape(component, &delegate.key, &delegate.contribution_type)
    }

    /// 声明的 Key 与贡献方式必须一致
    fn check_shape(
        &self,
        component: ComponentId,
        key: &Key,
        contribution_type: &ContributionType,
    ) -> GraphResult<()> {
        let aggregate = key.without_contribution_id();
        let reason = if key.type_name().is_empty() {
            Some("声明缺少类型")
        } else if contribution_type.is_multibinding() && !key.is_multibinding_contribution() {
            Some("多重绑定贡献缺少贡献标识")
        } else if !contribution_type.is_multibinding() && key.is_multibinding_contribution() {
            Some("唯一绑定不能携带贡献标识")
        } else if contribution_type.is_set_contribution() && !aggregate.type_name().is_set() {
            Some("集合贡献的 Key 必须是 Set 类型")
        } else if contribution_type.map_key().is_some() && !aggregate.type_name().is_map() {
            Some("映射贡献的 Key 必须是 Map 类型")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(self.malformed(key, component, reason).into()),
            None => Ok(()),
        }
    }

    fn malformed(&self, key: &Key, component: ComponentId, reason: &str) -> ModelError {
        ModelError::malformed_declaration(
            key.clone(),
            self.tree.path(component),
            reason,
            self.chain(),
        )
    }

    /// 当前依赖链的末尾部分
    fn chain(&self) -> Vec<String> {
        let skip = self.stack.len().saturating_sub(CHAIN_CONTEXT);
        self.stack
            .iter()
            .skip(skip)
            .map(|(key, component)| format!("{} [{}]", key, self.tree.node(*component).name()))
            .collect()
    }

    /// 只保留从根请求可达的部分，重新编号并生成边
    fn finish(self) -> GraphResult<BindingGraph> {
        let root_name = self.tree.root().name().to_string();
        let done = |slot: &SlotKey| -> GraphResult<&Vec<BindingId>> {
            match self.slots.get(slot) {
                Some(Slot::Done(ids)) => Ok(ids),
                _ => Err(InternalError::memo_inconsistency(
                    slot.0.clone(),
                    self.tree.path(slot.1),
                    "槽位在解析结束时没有完成",
                )
                .into()),
            }
        };

        let mut reachable_slots: IndexSet<SlotKey> = IndexSet::new();
        let mut reachable_nodes = vec![false; self.nodes.len()];
        let mut queue: VecDeque<SlotKey> = VecDeque::new();
        for root in &self.roots {
            if reachable_slots.insert(root.clone()) {
                queue.push_back(root.clone());
            }
        }
        while let Some(slot) = queue.pop_front() {
            for id in done(&slot)? {
                if reachable_nodes[id.0] {
                    continue;
                }
                reachable_nodes[id.0] = true;
                let node = &self.nodes[id.0];
                for request in node.binding.dependencies() {
                    let dependency = (request.key.clone(), node.owner);
                    if reachable_slots.insert(dependency.clone()) {
                        queue.push_back(dependency);
                    }
                }
            }
        }

        let mut remap: Vec<Option<BindingId>> = vec![None; self.nodes.len()];
        let mut next = 0;
        for (old, reachable) in reachable_nodes.iter().enumerate() {
            if *reachable {
                remap[old] = Some(BindingId(next));
                next += 1;
            }
        }
        let map_ids = |ids: &[BindingId]| -> Vec<BindingId> {
            ids.iter().filter_map(|id| remap[id.0]).collect()
        };

        let mut resolutions = IndexMap::new();
        let mut introduced_by: Vec<Option<SlotKey>> = vec![None; next];
        for slot in self.slots.keys() {
            if !reachable_slots.contains(slot) {
                continue;
            }
            let mapped = map_ids(done(slot)?);
            for id in &mapped {
                introduced_by[id.0].get_or_insert_with(|| slot.clone());
            }
            resolutions.insert(slot.clone(), mapped);
        }

        let mut nodes = Vec::with_capacity(next);
        for (old, pending) in self.nodes.iter().enumerate() {
            let Some(id) = remap[old] else {
                continue;
            };
            let mut edges = Vec::with_capacity(pending.binding.dependencies().len());
            for request in pending.binding.dependencies() {
                let targets = map_ids(done(&(request.key.clone(), pending.owner))?);
                edges.push(DependencyEdge {
                    request: request.clone(),
                    targets,
                });
            }
            let introduced = introduced_by[id.0].clone().ok_or_else(|| {
                InternalError::memo_inconsistency(
                    pending.binding.key().clone(),
                    self.tree.path(pending.owner),
                    "可达节点没有对应的解析结果",
                )
            })?;
            nodes.push(BindingNode {
                id,
                binding: Arc::clone(&pending.binding),
                owner: pending.owner,
                edges,
                introduced_by: introduced,
            });
        }

        let mut origins = HashMap::new();
        for (slot, candidates) in &self.origins {
            if !reachable_slots.contains(slot) {
                continue;
            }
            let origin = candidates.iter().find_map(|origin| match *origin {
                RequestOrigin::Dependency { from, index } => remap[from.0]
                    .map(|from| RequestOrigin::Dependency { from, index }),
                other => Some(other),
            });
            if let Some(origin) = origin {
                origins.insert(slot.clone(), origin);
            }
        }

        let mut entry_points = Vec::with_capacity(self.entry_points.len());
        for (component, index) in &self.entry_points {
            let node = self.tree.node(*component);
            let Some(entry) = node.descriptor.entry_points.get(*index) else {
                continue;
            };
            let targets = map_ids(done(&(entry.request.key.clone(), *component))?);
            entry_points.push(EntryPointResolution {
                component: *component,
                method: entry.method.clone(),
                request: entry.request.clone(),
                targets,
            });
        }

        let reentrant = self
            .reentrant
            .iter()
            .filter(|request| reachable_slots.contains(&(request.key.clone(), request.component)))
            .map(|request| ReentrantRequest {
                key: request.key.clone(),
                component: request.component,
                requested_by: request.requested_by.and_then(|id| remap[id.0]),
            })
            .collect();

        debug!(
            "解析结果整理完成: {}, 可达绑定 {}/{}",
            root_name,
            nodes.len(),
            self.nodes.len()
        );

        Ok(BindingGraph {
            tree: self.tree,
            declarations: self.declarations,
            nodes,
            resolutions,
            origins,
            entry_points,
            reentrant,
            network: OnceCell::new(),
        })
    }
}

/// 按结构去重后加入候选
fn push_candidate(candidates: &mut Vec<Candidate>, binding: Binding, declaring: Declaring) {
    if candidates.iter().any(|c| *c.binding == binding) {
        return;
    }
    candidates.push(Candidate {
        binding: Arc::new(binding),
        declaring,
    });
}

/// 构造函数注入只适用于没有限定符的普通 Key
fn is_injectable(key: &Key) -> bool {
    key.qualifier().is_none() && !key.is_multibinding_contribution()
}

/// 集合请求对应的形态、贡献所汇入的规范 Key 和贡献边的请求方式
///
/// `Map<K, Provider<V>>` 与 `Map<K, Producer<V>>` 汇集 `Map<K, V>` 的贡献。
fn multibound_aggregate(key: &Key) -> Option<(MultiboundKind, Key, RequestKind)> {
    if key.is_multibinding_contribution() {
        return None;
    }
    let type_name = key.type_name();
    if type_name.is_set() {
        return Some((MultiboundKind::Set, key.clone(), RequestKind::Instance));
    }
    let (map_key, value) = (type_name.map_key_type()?, type_name.map_value_type()?);
    let unwrapped = |kind: WellKnownType| {
        value
            .unwrap_single(kind)
            .map(|inner| key.with_type(TypeName::map_of(map_key.clone(), inner.clone())))
    };
    if let Some(aggregate) = unwrapped(WellKnownType::Provider) {
        return Some((MultiboundKind::Map, aggregate, RequestKind::Provider));
    }
    if let Some(aggregate) = unwrapped(WellKnownType::Producer) {
        return Some((MultiboundKind::Map, aggregate, RequestKind::Producer));
    }
    Some((MultiboundKind::Map, key.clone(), RequestKind::Instance))
}
