use super::value::Value;
use crate::errors::{Result, ViewFilterError};
use crate::schema::ClassId;

/// Static element type of an [`ObjectArray`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Any,
    Str,
    Class(ClassId),
}

/// Array of reference-typed elements
#[derive(Clone)]
pub struct ObjectArray {
    element: ElementType,
    items: Vec<Value>,
}

impl ObjectArray {
    pub fn new(element: ElementType, items: Vec<Value>) -> Self {
        Self { element, items }
    }

    /// Array of `len` nulls
    pub fn with_len(element: ElementType, len: usize) -> Self {
        Self {
            element,
            items: vec![Value::Null; len],
        }
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Overwrite the element at `index`; the array length is fixed.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.items.len();
        let slot = self
            .items
            .get_mut(index)
            .ok_or_else(|| ViewFilterError::Introspection {
                reason: format!("array index {} out of bounds (len {})", index, len),
            })?;
        *slot = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Array of primitive elements
///
/// Projection never copies these; see [`crate::engine`].
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Bool(Vec<bool>),
    Byte(Vec<u8>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Char(Vec<char>),
}

impl PrimitiveArray {
    pub fn len(&self) -> usize {
        match self {
            PrimitiveArray::Bool(v) => v.len(),
            PrimitiveArray::Byte(v) => v.len(),
            PrimitiveArray::Int(v) => v.len(),
            PrimitiveArray::Float(v) => v.len(),
            PrimitiveArray::Char(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_name(&self) -> &'static str {
        match self {
            PrimitiveArray::Bool(_) => "bool",
            PrimitiveArray::Byte(_) => "byte",
            PrimitiveArray::Int(_) => "int",
            PrimitiveArray::Float(_) => "float",
            PrimitiveArray::Char(_) => "char",
        }
    }
}

/// Concrete container implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Growable ordered list
    List,
    /// Double-ended ordered queue
    Deque,
    /// Unordered set, deduplicated by [`Value::same_value`]
    Set,
    /// Fixed-size list view over existing storage; cannot be default-constructed
    FixedList,
}

impl ContainerKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerKind::List => "List",
            ContainerKind::Deque => "Deque",
            ContainerKind::Set => "Set",
            ContainerKind::FixedList => "FixedList",
        }
    }

    pub fn is_ordered(&self) -> bool {
        !matches!(self, ContainerKind::Set)
    }

    pub fn has_default_constructor(&self) -> bool {
        !matches!(self, ContainerKind::FixedList)
    }

    /// Zero-argument construction of an empty container of this kind
    ///
    /// # Errors
    ///
    /// Returns `ConstructionFailed` for kinds without a default constructor.
    pub fn instantiate(&self) -> Result<Container> {
        if !self.has_default_constructor() {
            return Err(ViewFilterError::ConstructionFailed {
                type_name: self.name().to_string(),
                reason: "container kind has no zero-argument constructor".to_string(),
            });
        }
        Ok(Container {
            kind: *self,
            items: Vec::new(),
        })
    }
}

/// A homogeneous list-like or set-like collection
#[derive(Clone)]
pub struct Container {
    kind: ContainerKind,
    items: Vec<Value>,
}

impl Container {
    /// Build a container holding `items`, deduplicating for set kinds.
    ///
    /// Unlike [`ContainerKind::instantiate`], this works for every kind.
    pub fn with_items(kind: ContainerKind, items: impl IntoIterator<Item = Value>) -> Self {
        let mut container = Container {
            kind,
            items: Vec::new(),
        };
        for item in items {
            container.insert(item);
        }
        container
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Append `value`; returns false when a set already holds it.
    pub fn add(&mut self, value: Value) -> Result<bool> {
        if self.kind == ContainerKind::FixedList {
            return Err(ViewFilterError::Introspection {
                reason: "FixedList does not support add".to_string(),
            });
        }
        Ok(self.insert(value))
    }

    fn insert(&mut self, value: Value) -> bool {
        if self.kind == ContainerKind::Set && self.items.iter().any(|v| v.same_value(&value)) {
            return false;
        }
        self.items.push(value);
        true
    }

    /// Elements in this container's iteration order
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
