pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod resources;
pub mod stage;

pub use dependency::{InternalDependency, InternalDependencyMap, LibraryDependency};
pub use descriptor::{ModuleDescriptor, TaskDescriptor};
pub use error::{CoreError, CoreErrorKind, CoreResult};
pub use resources::{RESOURCE_REF_PREFIX, ResourceTable, resource_ref};
pub use stage::PackageStage;
