//! 组件声明索引
//!
//! 对组件安装的模块（含传递引入的模块）和创建器绑定的实例做一次折叠，
//! 得到按 Key 索引的多重映射。构建过程不会失败，重复声明留给校验器报告。

use binding_abstractions::{
    ComponentNode, ContributionBinding, Declaration, DelegateDeclaration,
    MultibindingDeclaration, OptionalBindingDeclaration, SubcomponentDeclaration,
};
use binding_common::{Key, TypeName};
use dashmap::DashMap;
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;
use tracing::debug;

type Multimap<T> = IndexMap<Key, Vec<Arc<T>>>;

fn put<T>(map: &mut Multimap<T>, key: Key, value: Arc<T>) {
    map.entry(key).or_default().push(value);
}

fn get<'a, T>(map: &'a Multimap<T>, key: &Key) -> &'a [Arc<T>] {
    map.get(key).map(Vec::as_slice).unwrap_or(&[])
}

/// 单个组件的声明索引
#[derive(Debug, Default)]
pub struct ComponentDeclarations {
    component: String,
    bindings: Multimap<ContributionBinding>,
    delegates: Multimap<DelegateDeclaration>,
    multibindings: Multimap<MultibindingDeclaration>,
    optional_bindings: Multimap<OptionalBindingDeclaration>,
    subcomponents: Multimap<SubcomponentDeclaration>,
    multibinding_contributions: Multimap<ContributionBinding>,
    delegate_multibinding_contributions: Multimap<DelegateDeclaration>,
}

impl ComponentDeclarations {
    /// 从声明序列构建索引
    pub fn from_declarations<'a>(
        component: impl Into<String>,
        declarations: impl IntoIterator<Item = &'a Declaration>,
    ) -> Self {
        let mut index = Self {
            component: component.into(),
            ..Self::default()
        };
        for declaration in declarations {
            index.add(declaration.clone());
        }
        index
    }

    /// 为组件树中的节点构建索引
    pub fn for_component(node: &ComponentNode) -> Self {
        let mut index = Self::from_declarations(
            node.name(),
            node.modules.iter().flat_map(|module| module.declarations.iter()),
        );

        if let Some(creator) = &node.descriptor.creator {
            let creator_name = creator.key.to_string();
            for instance in &creator.bound_instances {
                let binding = ContributionBinding::bound_instance(
                    instance.key.clone(),
                    &creator_name,
                    &instance.element,
                )
                .with_nullable(instance.nullable);
                index.add(Declaration::Contribution(binding));
            }
        }

        debug!(
            "组件声明索引构建完成: {}, 绑定 Key 数: {}, 委托 Key 数: {}, 多重绑定集合数: {}",
            index.component,
            index.bindings.len(),
            index.delegates.len(),
            index.multibinding_contributions.len() + index.multibindings.len()
        );
        index
    }

    fn add(&mut self, declaration: Declaration) {
        match declaration {
            Declaration::Contribution(binding) => {
                let binding = Arc::new(binding);
                if binding.key.is_multibinding_contribution()
                    || binding.contribution_type.is_multibinding()
                {
                    put(
                        &mut self.multibinding_contributions,
                        binding.key.without_contribution_id(),
                        Arc::clone(&binding),
                    );
                }
                put(&mut self.bindings, binding.key.clone(), binding);
            }
            Declaration::Delegate(delegate) => {
                let delegate = Arc::new(delegate);
                if delegate.key.is_multibinding_contribution()
                    || delegate.contribution_type.is_multibinding()
                {
                    put(
                        &mut self.delegate_multibinding_contributions,
                        delegate.key.without_contribution_id(),
                        Arc::clone(&delegate),
                    );
                }
                put(&mut self.delegates, delegate.key.clone(), delegate);
            }
            Declaration::Multibinding(multibinding) => {
                put(
                    &mut self.multibindings,
                    multibinding.key.clone(),
                    Arc::new(multibinding),
                );
            }
            Declaration::OptionalBinding(optional) => {
                put(
                    &mut self.optional_bindings,
                    optional.key.clone(),
                    Arc::new(optional),
                );
            }
            Declaration::Subcomponent(subcomponent) => {
                put(
                    &mut self.subcomponents,
                    subcomponent.key.clone(),
                    Arc::new(subcomponent),
                );
            }
        }
    }

    /// 索引所属的组件名
    pub fn component(&self) -> &str {
        &self.component
    }

    /// 以 Key 原样索引的贡献绑定（单个多重绑定贡献以带贡献标识的 Key 索引）
    pub fn bindings(&self, key: &Key) -> &[Arc<ContributionBinding>] {
        get(&self.bindings, key)
    }

    /// 键的委托声明
    pub fn delegates(&self, key: &Key) -> &[Arc<DelegateDeclaration>] {
        get(&self.delegates, key)
    }

    /// 键的多绑定声明
    pub fn multibindings(&self, key: &Key) -> &[Arc<MultibindingDeclaration>] {
        get(&self.multibindings, key)
    }

    /// 以被包装类型 T 的 Key 索引的可选绑定声明
    pub fn optional_bindings(&self, key: &Key) -> &[Arc<OptionalBindingDeclaration>] {
        get(&self.optional_bindings, key)
    }

    /// 键的子组件声明
    pub fn subcomponents(&self, key: &Key) -> &[Arc<SubcomponentDeclaration>] {
        get(&self.subcomponents, key)
    }

    /// 汇入某个集合 Key 的贡献绑定
    pub fn multibinding_contributions(&self, aggregate: &Key) -> &[Arc<ContributionBinding>] {
        get(&self.multibinding_contributions, aggregate)
    }

    /// 汇入某个集合 Key 的委托贡献
    pub fn delegate_multibinding_contributions(
        &self,
        aggregate: &Key,
    ) -> &[Arc<DelegateDeclaration>] {
        get(&self.delegate_multibinding_contributions, aggregate)
    }

    /// 组件本地是否有该集合的贡献或声明
    pub fn has_multibinding_declarations(&self, aggregate: &Key) -> bool {
        !self.multibinding_contributions(aggregate).is_empty()
            || !self.delegate_multibinding_contributions(aggregate).is_empty()
            || !self.multibindings(aggregate).is_empty()
    }

    /// 组件本地是否有该 Key 的显式声明（贡献绑定或委托）
    pub fn has_explicit_binding(&self, key: &Key) -> bool {
        !self.bindings(key).is_empty() || !self.delegates(key).is_empty()
    }

    /// 组件声明的全部 Key，用于完整绑定图模式
    ///
    /// 单个贡献以集合 Key 代替，可选绑定以 `Optional<T>` 代替。
    pub fn declared_keys(&self) -> IndexSet<Key> {
        let mut keys = IndexSet::new();
        for key in self.bindings.keys().chain(self.delegates.keys()) {
            keys.insert(key.without_contribution_id());
        }
        keys.extend(self.multibindings.keys().cloned());
        for key in self.optional_bindings.keys() {
            keys.insert(key.with_type(TypeName::optional_of(key.type_name().clone())));
        }
        keys.extend(self.subcomponents.keys().cloned());
        keys
    }
}

/// 组件声明索引缓存
///
/// 索引只依赖组件描述符，按组件名称共享。先计算后插入，读者只会看到完整的索引。
#[derive(Debug, Default)]
pub struct DeclarationsCache {
    entries: DashMap<String, Arc<ComponentDeclarations>>,
}

impl DeclarationsCache {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取组件的声明索引，不存在时构建
    pub fn get_or_build(&self, node: &ComponentNode) -> Arc<ComponentDeclarations> {
        if let Some(existing) = self.entries.get(node.name()) {
            return Arc::clone(existing.value());
        }
        let built = Arc::new(ComponentDeclarations::for_component(node));
        Arc::clone(
            self.entries
                .entry(node.name().to_string())
                .or_insert(built)
                .value(),
        )
    }

    /// 已缓存的组件索引数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
