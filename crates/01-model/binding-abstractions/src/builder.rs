//! 模块和组件描述符的流式构建器

use crate::component::{
    BoundInstance, ComponentDescriptor, CreatorDescriptor, EntryPoint, FactoryMethod,
    ModuleDescriptor,
};
use crate::declaration::{
    ContributionBinding, Declaration, DelegateDeclaration, MultibindingDeclaration,
    OptionalBindingDeclaration, SubcomponentDeclaration,
};
use binding_common::{DeclarationSource, DependencyRequest, Key, Scope};

/// 模块构建器
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    module: ModuleDescriptor,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: ModuleDescriptor {
                name: name.into(),
                declarations: Vec::new(),
                includes: Vec::new(),
                requires_instance: false,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.module.name
    }

    /// 添加任意声明
    pub fn declare(mut self, declaration: impl Into<Declaration>) -> Self {
        self.module.declarations.push(declaration.into());
        self
    }

    pub fn binding(self, binding: ContributionBinding) -> Self {
        self.declare(binding)
    }

    pub fn delegate(self, delegate: DelegateDeclaration) -> Self {
        self.declare(delegate)
    }

    /// `@Multibinds`
    pub fn multibinds(self, key: Key, element: &str) -> Self {
        let source = DeclarationSource::in_module(self.module.name.clone(), element);
        self.declare(MultibindingDeclaration { key, source })
    }

    /// `@BindsOptionalOf`
    pub fn optional(self, key: Key, element: &str) -> Self {
        let source = DeclarationSource::in_module(self.module.name.clone(), element);
        self.declare(OptionalBindingDeclaration { key, source })
    }

    /// `@Module(subcomponents = ...)`
    pub fn subcomponent(self, creator: Key, subcomponent: &str) -> Self {
        let source = DeclarationSource::in_module(self.module.name.clone(), subcomponent);
        self.declare(SubcomponentDeclaration {
            key: creator,
            subcomponent: subcomponent.to_string(),
            source,
        })
    }

    pub fn include(mut self, module: impl Into<String>) -> Self {
        self.module.includes.push(module.into());
        self
    }

    pub fn requires_instance(mut self) -> Self {
        self.module.requires_instance = true;
        self
    }

    pub fn build(self) -> ModuleDescriptor {
        self.module
    }
}

/// 组件构建器
#[derive(Debug, Clone)]
pub struct ComponentBuilder {
    component: ComponentDescriptor,
}

impl ComponentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            component: ComponentDescriptor {
                name: name.into(),
                production: false,
                scopes: Vec::new(),
                modules: Vec::new(),
                entry_points: Vec::new(),
                creator: None,
                factory_methods: Vec::new(),
            },
        }
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.component.scopes.push(scope);
        self
    }

    pub fn production(mut self) -> Self {
        self.component.production = true;
        self
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.component.modules.push(module.into());
        self
    }

    pub fn entry_point(mut self, method: impl Into<String>, request: DependencyRequest) -> Self {
        self.component.entry_points.push(EntryPoint {
            method: method.into(),
            request,
        });
        self
    }

    /// 父组件上的子组件工厂方法
    pub fn factory_method(
        mut self,
        name: impl Into<String>,
        subcomponent: impl Into<String>,
        module_parameters: &[&str],
    ) -> Self {
        self.component.factory_methods.push(FactoryMethod {
            name: name.into(),
            subcomponent: subcomponent.into(),
            module_parameters: module_parameters.iter().map(|m| m.to_string()).collect(),
        });
        self
    }

    /// 组件创建器，`creator` 是创建器类型的 Key
    pub fn creator(mut self, creator: Key) -> Self {
        self.component.creator = Some(CreatorDescriptor {
            key: creator,
            bound_instances: Vec::new(),
        });
        self
    }

    /// 通过创建器绑定实例，没有创建器时以组件名生成一个
    pub fn bind_instance(mut self, key: Key, element: impl Into<String>) -> Self {
        let name = self.component.name.clone();
        let creator = self.component.creator.get_or_insert_with(|| CreatorDescriptor {
            key: Key::new(binding_common::TypeName::new(format!("{name}.Builder"))),
            bound_instances: Vec::new(),
        });
        creator.bound_instances.push(BoundInstance {
            key,
            element: element.into(),
            nullable: false,
        });
        self
    }

    pub fn build(self) -> ComponentDescriptor {
        self.component
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeclarationModel;
    use crate::ComponentTree;
    use binding_common::ModelError;
    use std::sync::Arc;

    fn key(ty: &str) -> Key {
        Key::parse(ty).unwrap()
    }

    #[test]
    fn test_tree_follows_factory_methods_and_subcomponent_declarations() {
        let model = DeclarationModel::new()
            .with_module(
                ModuleBuilder::new("AppModule")
                    .subcomponent(key("RequestComponent.Builder"), "RequestComponent")
                    .build(),
            )
            .with_module(ModuleBuilder::new("SessionModule").build())
            .with_component(
                ComponentBuilder::new("AppComponent")
                    .scope(Scope::singleton())
                    .module("AppModule")
                    .factory_method("session", "SessionComponent", &["SessionModule"])
                    .build(),
            )
            .with_component(
                ComponentBuilder::new("SessionComponent")
                    .module("SessionModule")
                    .build(),
            )
            .with_component(ComponentBuilder::new("RequestComponent").build());

        let catalog = Arc::new(model.catalog().unwrap());
        assert_eq!(catalog.root_components().unwrap(), vec!["AppComponent"]);

        let tree = ComponentTree::build(catalog, "AppComponent").unwrap();
        assert_eq!(tree.len(), 3);
        let session = tree.find("SessionComponent").unwrap();
        assert_eq!(tree.path(session), "AppComponent → SessionComponent");
        assert!(tree.node(session).factory_method.is_some());
        let request = tree.find("RequestComponent").unwrap();
        assert_eq!(tree.ancestry(request), vec![request, tree.root_id()]);
    }

    #[test]
    fn test_module_includes_are_transitive() {
        let model = DeclarationModel::new()
            .with_module(ModuleBuilder::new("A").include("B").build())
            .with_module(ModuleBuilder::new("B").include("C").include("A").build())
            .with_module(ModuleBuilder::new("C").build())
            .with_component(ComponentBuilder::new("Root").module("A").build());
        let tree = ComponentTree::build(Arc::new(model.catalog().unwrap()), "Root").unwrap();
        let names: Vec<_> = tree.root().modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_unknown_module_is_model_error() {
        let model = DeclarationModel::new()
            .with_component(ComponentBuilder::new("Root").module("Missing").build());
        let error = ComponentTree::build(Arc::new(model.catalog().unwrap()), "Root").unwrap_err();
        assert!(matches!(error, ModelError::UnknownModule { .. }));
    }

    #[test]
    fn test_factory_parameters_are_not_checked_while_building() {
        let model = DeclarationModel::new()
            .with_component(
                ComponentBuilder::new("Root")
                    .factory_method("child", "Child", &["ExtraModule"])
                    .build(),
            )
            .with_component(ComponentBuilder::new("Child").build());
        let tree = ComponentTree::build(Arc::new(model.catalog().unwrap()), "Root").unwrap();
        let child = tree.find("Child").unwrap();
        let method = tree.node(child).factory_method.as_ref().unwrap();
        assert_eq!(method.module_parameters, vec!["ExtraModule".to_string()]);
    }

    #[test]
    fn test_component_cycle_is_rejected() {
        let model = DeclarationModel::new()
            .with_component(
                ComponentBuilder::new("A")
                    .factory_method("b", "B", &[])
                    .build(),
            )
            .with_component(
                ComponentBuilder::new("B")
                    .factory_method("a", "A", &[])
                    .build(),
            );
        let error = ComponentTree::build(Arc::new(model.catalog().unwrap()), "A").unwrap_err();
        assert!(matches!(error, ModelError::InvalidComponentTree { .. }));
    }

    #[test]
    fn test_duplicate_injection_binding_rejected() {
        let binding = ContributionBinding::injection(key("Foo"), "Foo()");
        let model = DeclarationModel::new()
            .with_injection_binding(binding.clone())
            .with_injection_binding(binding);
        assert!(matches!(
            model.catalog(),
            Err(ModelError::InvalidInjectionBinding { .. })
        ));
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = DeclarationModel::new()
            .with_module(
                ModuleBuilder::new("AppModule")
                    .binding(
                        ContributionBinding::provision(key("Foo"), "AppModule", "foo")
                            .with_dependency(DependencyRequest::parse("Provider<Bar>").unwrap()),
                    )
                    .build(),
            )
            .with_component(
                ComponentBuilder::new("AppComponent")
                    .module("AppModule")
                    .entry_point("foo", DependencyRequest::instance(key("Foo")))
                    .build(),
            );
        let json = model.to_json().unwrap();
        assert_eq!(DeclarationModel::from_json(&json).unwrap(), model);
    }
}
