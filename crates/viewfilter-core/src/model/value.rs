use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::collections::{Container, ObjectArray, PrimitiveArray};
use crate::schema::ClassId;

/// Shared handle to an object instance
pub type ObjectRef = Rc<RefCell<Object>>;
/// Shared handle to an array of reference-typed elements
pub type ArrayRef = Rc<RefCell<ObjectArray>>;
/// Shared handle to a list-like or set-like container
pub type ContainerRef = Rc<RefCell<Container>>;
/// Shared handle to an array of primitive elements
pub type PrimitiveArrayRef = Rc<RefCell<PrimitiveArray>>;

/// A node in an in-memory object graph
///
/// Scalars are held inline. Everything else is a shared reference whose
/// identity (the `Rc` allocation) is what the projection memo keys on, so
/// cloning a `Value` never copies the underlying object.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(Rc<str>),
    PrimitiveArray(PrimitiveArrayRef),
    Array(ArrayRef),
    Container(ContainerRef),
    Object(ObjectRef),
}

/// Runtime shape of a value, as seen by the projection engine
pub enum Shape<'a> {
    Absent,
    /// Inline scalars and shared strings; immutable leaves
    Scalar,
    PrimitiveArray(&'a PrimitiveArrayRef),
    ObjectArray(&'a ArrayRef),
    Container(&'a ContainerRef),
    Composite(&'a ObjectRef),
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    /// Wrap an object into a fresh shared reference
    pub fn object(object: Object) -> Self {
        Value::Object(Rc::new(RefCell::new(object)))
    }

    pub fn array(array: ObjectArray) -> Self {
        Value::Array(Rc::new(RefCell::new(array)))
    }

    pub fn container(container: Container) -> Self {
        Value::Container(Rc::new(RefCell::new(container)))
    }

    pub fn primitive_array(array: PrimitiveArray) -> Self {
        Value::PrimitiveArray(Rc::new(RefCell::new(array)))
    }

    pub fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Absent,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Char(_) | Value::Str(_) => {
                Shape::Scalar
            }
            Value::PrimitiveArray(array) => Shape::PrimitiveArray(array),
            Value::Array(array) => Shape::ObjectArray(array),
            Value::Container(container) => Shape::Container(container),
            Value::Object(object) => Shape::Composite(object),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ContainerRef> {
        match self {
            Value::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn as_primitive_array(&self) -> Option<&PrimitiveArrayRef> {
        match self {
            Value::PrimitiveArray(array) => Some(array),
            _ => None,
        }
    }

    /// Class of the object behind this value, if it is one
    pub fn class(&self) -> Option<ClassId> {
        self.as_object().map(|object| object.borrow().class())
    }

    /// Address of the shared allocation, `None` for null and inline scalars
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Char(_) => None,
            Value::Str(s) => Some(Rc::as_ptr(s) as *const u8 as usize),
            Value::PrimitiveArray(a) => Some(Rc::as_ptr(a) as *const u8 as usize),
            Value::Array(a) => Some(Rc::as_ptr(a) as *const u8 as usize),
            Value::Container(c) => Some(Rc::as_ptr(c) as *const u8 as usize),
            Value::Object(o) => Some(Rc::as_ptr(o) as *const u8 as usize),
        }
    }

    /// Reference identity for shared values; both-null counts as the same.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.is_null() && other.is_null(),
            _ => false,
        }
    }

    /// Equality as used by set-like containers: scalars and strings by value,
    /// everything else by identity.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => self.identity().is_some() && self.same_ref(other),
        }
    }

    /// Short, non-recursive description used in errors and logs
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Char(c) => format!("'{}'", c),
            Value::Str(s) => format!("{:?}", s),
            Value::PrimitiveArray(a) => {
                let a = a.borrow();
                format!("{}[{}]", a.element_name(), a.len())
            }
            Value::Array(a) => format!("array[{}]", a.borrow().len()),
            Value::Container(c) => {
                let c = c.borrow();
                format!("{}({})", c.kind().name(), c.len())
            }
            Value::Object(o) => {
                let o = o.borrow();
                format!("object#{}({} slots)", o.class().index(), o.slot_count())
            }
        }
    }
}

// Graphs may be cyclic, so Debug never recurses.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

// Unsuffixed integer literals default to i32.
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

/// An instance of a schema class
///
/// Holds one slot per field in the class layout. Slots are addressed through
/// [`FieldDescriptor`](crate::schema::FieldDescriptor)s, never by name.
#[derive(Clone)]
pub struct Object {
    class: ClassId,
    slots: Vec<Value>,
}

impl Object {
    pub fn new(class: ClassId, slots: Vec<Value>) -> Self {
        Self { class, slots }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.slots.get_mut(index)
    }

    pub fn slots(&self) -> &[Value] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}
