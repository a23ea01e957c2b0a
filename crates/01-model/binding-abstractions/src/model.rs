//! 声明模型：上游发现阶段交付的纯数据输入

use crate::component::{child_references, ComponentDescriptor, ModuleDescriptor};
use crate::declaration::{ContributionBinding, ContributionKind, ContributionType};
use binding_common::{Key, ModelError, ModelResult};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// 一次编译的完整输入
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationModel {
    #[serde(default)]
    pub modules: Vec<ModuleDescriptor>,
    /// 构造函数注入绑定，全局可见
    #[serde(default)]
    pub injection_bindings: Vec<ContributionBinding>,
    #[serde(default)]
    pub components: Vec<ComponentDescriptor>,
}

impl DeclarationModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 解析
    pub fn from_json(json: &str) -> ModelResult<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::Deserialization {
            message: e.to_string(),
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_module(mut self, module: ModuleDescriptor) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_component(mut self, component: ComponentDescriptor) -> Self {
        self.components.push(component);
        self
    }

    pub fn with_injection_binding(mut self, binding: ContributionBinding) -> Self {
        self.injection_bindings.push(binding);
        self
    }

    /// 建立按名称和 Key 索引的只读目录
    pub fn catalog(&self) -> ModelResult<ModelCatalog> {
        let mut modules = IndexMap::new();
        for module in &self.modules {
            if modules
                .insert(module.name.clone(), Arc::new(module.clone()))
                .is_some()
            {
                return Err(ModelError::DuplicateModule {
                    module: module.name.clone(),
                });
            }
        }

        let mut components = IndexMap::new();
        for component in &self.components {
            if components
                .insert(component.name.clone(), Arc::new(component.clone()))
                .is_some()
            {
                return Err(ModelError::DuplicateComponent {
                    component: component.name.clone(),
                });
            }
        }

        let mut injection_bindings = IndexMap::new();
        for binding in &self.injection_bindings {
            validate_injection_binding(binding)?;
            if injection_bindings
                .insert(binding.key.clone(), Arc::new(binding.clone()))
                .is_some()
            {
                return Err(ModelError::InvalidInjectionBinding {
                    key: binding.key.clone(),
                    reason: "同一个 Key 存在多个构造函数注入绑定".to_string(),
                });
            }
        }

        debug!(
            "声明目录建立完成, 模块数: {}, 组件数: {}, 注入绑定数: {}",
            modules.len(),
            components.len(),
            injection_bindings.len()
        );

        Ok(ModelCatalog {
            modules,
            components,
            injection_bindings,
        })
    }
}

fn validate_injection_binding(binding: &ContributionBinding) -> ModelResult<()> {
    let reason = if binding.kind != ContributionKind::Injection {
        "注入绑定的种类必须是 injection"
    } else if binding.contribution_type != ContributionType::Unique {
        "注入绑定不能是多重绑定贡献"
    } else if binding.key.is_multibinding_contribution() {
        "注入绑定的 Key 不能携带贡献标识"
    } else if binding.key.qualifier().is_some() {
        "注入绑定的 Key 不能带限定符"
    } else if binding.key.type_name().is_empty() {
        "注入绑定缺少类型"
    } else {
        return Ok(());
    };
    Err(ModelError::InvalidInjectionBinding {
        key: binding.key.clone(),
        reason: reason.to_string(),
    })
}

/// 声明目录，构建后只读，可在多个根组件的并行解析之间共享
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    modules: IndexMap<String, Arc<ModuleDescriptor>>,
    components: IndexMap<String, Arc<ComponentDescriptor>>,
    injection_bindings: IndexMap<Key, Arc<ContributionBinding>>,
}

impl ModelCatalog {
    pub fn module(&self, name: &str) -> Option<&Arc<ModuleDescriptor>> {
        self.modules.get(name)
    }

    pub fn component(&self, name: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.components.get(name)
    }

    pub fn components(&self) -> impl Iterator<Item = &Arc<ComponentDescriptor>> {
        self.components.values()
    }

    /// 构造函数注入绑定
    pub fn injection_binding(&self, key: &Key) -> Option<&Arc<ContributionBinding>> {
        self.injection_bindings.get(key)
    }

    /// 组件安装的模块加上它们传递引入的模块，按深度优先先序排列
    pub fn module_closure(
        &self,
        component: &str,
        installed: &[String],
    ) -> ModelResult<Vec<Arc<ModuleDescriptor>>> {
        let mut visited = IndexSet::new();
        let mut ordered = Vec::new();
        let mut stack: Vec<&str> = installed.iter().rev().map(String::as_str).collect();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.to_string()) {
                continue;
            }
            let module = self
                .module(name)
                .ok_or_else(|| ModelError::UnknownModule {
                    module: name.to_string(),
                    component: component.to_string(),
                })?;
            ordered.push(Arc::clone(module));
            stack.extend(module.includes.iter().rev().map(String::as_str));
        }

        Ok(ordered)
    }

    /// 不是任何其他组件子组件的组件
    pub fn root_components(&self) -> ModelResult<Vec<String>> {
        let mut referenced = IndexSet::new();
        for component in self.components.values() {
            let modules = self.module_closure(&component.name, &component.modules)?;
            for (child, _) in child_references(component, &modules) {
                referenced.insert(child);
            }
        }
        Ok(self
            .components
            .keys()
            .filter(|name| !referenced.contains(*name))
            .cloned()
            .collect())
    }
}
