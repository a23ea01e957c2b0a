//! 模块、组件描述符与组件树

use crate::declaration::Declaration;
use crate::model::ModelCatalog;
use binding_common::{DependencyRequest, Key, ModelError, ModelResult, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// 模块描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// 隐式引入的模块
    #[serde(default)]
    pub includes: Vec<String>,
    /// 模块需要由调用方传入实例（没有可见的无参构造函数）
    #[serde(default)]
    pub requires_instance: bool,
}

/// 组件入口点
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    pub method: String,
    pub request: DependencyRequest,
}

/// 通过组件创建器绑定的实例
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundInstance {
    pub key: Key,
    pub element: String,
    #[serde(default)]
    pub nullable: bool,
}

/// 组件创建器（Builder / Factory）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorDescriptor {
    pub key: Key,
    #[serde(default)]
    pub bound_instances: Vec<BoundInstance>,
}

/// 父组件上用于创建子组件的工厂方法
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactoryMethod {
    pub name: String,
    pub subcomponent: String,
    /// 作为参数传入的模块
    #[serde(default)]
    pub module_parameters: Vec<String>,
}

/// 组件描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub name: String,
    /// 生产组件（ProductionComponent）
    #[serde(default)]
    pub production: bool,
    #[serde(default)]
    pub scopes: Vec<Scope>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorDescriptor>,
    #[serde(default)]
    pub factory_methods: Vec<FactoryMethod>,
}

impl ComponentDescriptor {
    /// 组件拥有的全部作用域，生产组件隐式拥有 `ProductionScope`
    pub fn effective_scopes(&self) -> Vec<Scope> {
        let mut scopes = self.scopes.clone();
        if self.production && !scopes.iter().any(Scope::is_production_scope) {
            scopes.push(Scope::production());
        }
        scopes
    }
}

/// 组件树中节点的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 组件树节点
///
/// 同一个组件类在不同父组件下会生成不同的节点，解析结果依赖完整的祖先链。
#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub id: ComponentId,
    pub descriptor: Arc<ComponentDescriptor>,
    pub parent: Option<ComponentId>,
    pub children: Vec<ComponentId>,
    pub depth: usize,
    /// 安装的模块及其传递引入的模块
    pub modules: Vec<Arc<ModuleDescriptor>>,
    /// 从根组件开始的路径
    pub path: String,
    /// 父组件创建该子组件时使用的工厂方法
    pub factory_method: Option<FactoryMethod>,
    scopes: Vec<Scope>,
}

impl ComponentNode {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes.contains(scope)
    }

    pub fn is_production(&self) -> bool {
        self.descriptor.production
    }

    /// 模块是否（直接或通过引入）安装在该组件上
    pub fn installs_module(&self, module: &str) -> bool {
        self.modules.iter().any(|m| m.name == module)
    }
}

/// 以某个根组件展开的组件树
#[derive(Debug, Clone)]
pub struct ComponentTree {
    catalog: Arc<ModelCatalog>,
    nodes: Vec<ComponentNode>,
}

impl ComponentTree {
    /// 从根组件展开组件树
    pub fn build(catalog: Arc<ModelCatalog>, root: &str) -> ModelResult<Self> {
        let descriptor =
            catalog
                .component(root)
                .cloned()
                .ok_or_else(|| ModelError::UnknownComponent {
                    component: root.to_string(),
                })?;

        let mut tree = Self {
            catalog,
            nodes: Vec::new(),
        };
        tree.add_node(descriptor, None, None)?;
        debug!("组件树构建完成: {}, 节点数: {}", root, tree.nodes.len());
        Ok(tree)
    }

    fn add_node(
        &mut self,
        descriptor: Arc<ComponentDescriptor>,
        parent: Option<ComponentId>,
        factory_method: Option<FactoryMethod>,
    ) -> ModelResult<ComponentId> {
        let id = ComponentId(self.nodes.len());
        let (depth, path) = match parent {
            Some(parent_id) => {
                let parent_node = self.node(parent_id);
                (
                    parent_node.depth + 1,
                    format!("{} → {}", parent_node.path, descriptor.name),
                )
            }
            None => (0, descriptor.name.clone()),
        };
        let modules = self
            .catalog
            .module_closure(&descriptor.name, &descriptor.modules)?;

        let children = child_references(&descriptor, &modules);
        self.nodes.push(ComponentNode {
            id,
            scopes: descriptor.effective_scopes(),
            descriptor,
            parent,
            children: Vec::new(),
            depth,
            modules,
            path,
            factory_method,
        });

        for (child_name, method) in children {
            if self
                .ancestry(id)
                .iter()
                .any(|ancestor| self.node(*ancestor).name() == child_name)
            {
                return Err(ModelError::invalid_tree(
                    child_name,
                    "子组件出现在自身的祖先链中",
                ));
            }
            let child_descriptor = self
                .catalog
                .component(&child_name)
                .cloned()
                .ok_or_else(|| ModelError::UnknownComponent {
                    component: child_name.clone(),
                })?;
            let child_id = self.add_node(child_descriptor, Some(id), method)?;
            self.nodes[id.0].children.push(child_id);
        }

        Ok(id)
    }

    pub fn catalog(&self) -> &Arc<ModelCatalog> {
        &self.catalog
    }

    pub fn root_id(&self) -> ComponentId {
        ComponentId(0)
    }

    pub fn root(&self) -> &ComponentNode {
        &self.nodes[0]
    }

    /// 按编号获取节点，编号必须来自同一棵树
    pub fn node(&self, id: ComponentId) -> &ComponentNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ComponentNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.node(id).parent
    }

    /// 从自身到根组件的链
    pub fn ancestry(&self, id: ComponentId) -> Vec<ComponentId> {
        let mut chain = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        chain
    }

    /// `ancestor` 是否是 `id` 自身或它的祖先
    pub fn is_ancestor_or_self(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        self.ancestry(id).contains(&ancestor)
    }

    pub fn path(&self, id: ComponentId) -> &str {
        &self.node(id).path
    }

    /// 按名称查找第一个节点
    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.nodes.iter().find(|n| n.name() == name).map(|n| n.id)
    }
}

/// 组件直接引用的子组件：先是工厂方法，再是模块中的子组件声明
pub(crate) fn child_references(
    descriptor: &ComponentDescriptor,
    modules: &[Arc<ModuleDescriptor>],
) -> Vec<(String, Option<FactoryMethod>)> {
    let mut children: Vec<(String, Option<FactoryMethod>)> = Vec::new();
    for method in &descriptor.factory_methods {
        if !children.iter().any(|(name, _)| name == &method.subcomponent) {
            children.push((method.subcomponent.clone(), Some(method.clone())));
        }
    }
    for module in modules {
        for declaration in &module.declarations {
            if let Declaration::Subcomponent(subcomponent) = declaration {
                if !children
                    .iter()
                    .any(|(name, _)| name == &subcomponent.subcomponent)
                {
                    children.push((subcomponent.subcomponent.clone(), None));
                }
            }
        }
    }
    children
}
