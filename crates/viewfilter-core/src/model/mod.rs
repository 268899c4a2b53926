pub mod collections;
pub mod compare;
pub mod value;

pub use collections::{Container, ContainerKind, ElementType, ObjectArray, PrimitiveArray};
pub use compare::structurally_equal;
pub use value::{ArrayRef, ContainerRef, Object, ObjectRef, PrimitiveArrayRef, Shape, Value};
