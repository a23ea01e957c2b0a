//! 标准校验器

mod dependency_cycle;
mod duplicate_bindings;
mod inject_conflicts;
mod map_keys;
mod missing_binding;
mod nullable;
mod production;
mod scoping;
mod set_delegates;
mod subcomponent_factory;

pub use dependency_cycle::DependencyCycleValidator;
pub use duplicate_bindings::DuplicateBindingValidator;
pub use inject_conflicts::InjectConflictValidator;
pub use map_keys::MapKeyValidator;
pub use missing_binding::MissingBindingValidator;
pub use nullable::NullableValidator;
pub use production::ProductionValidator;
pub use scoping::ScopingValidator;
pub use set_delegates::SetDelegateValidator;
pub use subcomponent_factory::SubcomponentFactoryValidator;
