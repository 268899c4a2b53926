//! Class descriptor tables
//!
//! A [`Schema`] is the field metadata for every class that can appear in an
//! object graph. It is assembled once at start-up with [`SchemaBuilder`] and
//! shared read-only afterwards. Each class records its parent, its own
//! fields (each with an optional view tag) and whether it can be constructed
//! without arguments.
//!
//! Object layout: a class's slots are its parent's slots followed by its own
//! fields, so a shadowed field name gets a distinct slot per declaring class.

use std::collections::HashMap;

use crate::errors::{Result, ViewFilterError};
use crate::model::{Object, Value};
use crate::tags::TagId;

/// Handle to a class defined in a [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Static type of a field, which decides its zero value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Char,
    /// Any shared value: strings, arrays, containers, objects
    Reference,
}

impl FieldType {
    /// `false`, `0`, `0.0`, `'\0'` or null
    pub fn zero_value(&self) -> Value {
        match self {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int => Value::Int(0),
            FieldType::Float => Value::Float(0.0),
            FieldType::Char => Value::Char('\0'),
            FieldType::Reference => Value::Null,
        }
    }
}

/// Whether the metadata layer lets a field be read or written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldAccess {
    #[default]
    ReadWrite,
    /// Readable, but cannot be assigned after construction
    ReadOnly,
    /// Writable, but its value cannot be read through the metadata layer
    WriteOnly,
}

/// One field of one class
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    declaring: ClassId,
    name: String,
    field_type: FieldType,
    tag: Option<TagId>,
    access: FieldAccess,
    slot: usize,
}

impl FieldDescriptor {
    pub fn declaring_class(&self) -> ClassId {
        self.declaring
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// The declared view tag; untagged fields are never projected
    pub fn tag(&self) -> Option<TagId> {
        self.tag
    }

    pub fn access(&self) -> FieldAccess {
        self.access
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Field metadata consumed by the projection engine
pub trait FieldMetadata {
    /// Fields of `class` and all its ancestors: the class's own fields
    /// first, then each ancestor's, walking up the hierarchy.
    ///
    /// # Errors
    ///
    /// Returns `Introspection` when the class is unknown to the provider.
    fn fields_of(&self, class: ClassId) -> Result<&[FieldDescriptor]>;

    /// Direct parent of `class`, `None` for a root class
    ///
    /// # Errors
    ///
    /// Returns `Introspection` when the class is unknown to the provider.
    fn parent_of(&self, class: ClassId) -> Result<Option<ClassId>>;

    /// # Errors
    ///
    /// Returns `Introspection` when the class is unknown to the provider.
    fn class_name(&self, class: ClassId) -> Result<&str>;

    /// Resolve a class by name
    fn class_named(&self, name: &str) -> Option<ClassId>;

    /// Zero-argument construction: every slot holds its zero value.
    ///
    /// # Errors
    ///
    /// Returns `ConstructionFailed` if the class opted out of default
    /// construction, or `Introspection` if it is unknown.
    fn instantiate(&self, class: ClassId) -> Result<Object>;

    /// Read a field through the metadata layer
    ///
    /// # Errors
    ///
    /// Returns `FieldAccessDenied` for write-only fields or when the object's
    /// layout has no such slot.
    fn read_field(&self, object: &Object, field: &FieldDescriptor) -> Result<Value> {
        if field.access() == FieldAccess::WriteOnly {
            return Err(self.access_denied(field, "field is not readable"));
        }
        object
            .slot(field.slot())
            .cloned()
            .ok_or_else(|| self.access_denied(field, "object layout has no slot for field"))
    }

    /// Write a field through the metadata layer
    ///
    /// # Errors
    ///
    /// Returns `FieldAccessDenied` for read-only fields or when the object's
    /// layout has no such slot.
    fn write_field(&self, object: &mut Object, field: &FieldDescriptor, value: Value) -> Result<()> {
        if field.access() == FieldAccess::ReadOnly {
            return Err(self.access_denied(field, "field is not writable"));
        }
        let slot = object
            .slot_mut(field.slot())
            .ok_or_else(|| self.access_denied(field, "object layout has no slot for field"))?;
        *slot = value;
        Ok(())
    }

    #[doc(hidden)]
    fn access_denied(&self, field: &FieldDescriptor, reason: &str) -> ViewFilterError {
        ViewFilterError::FieldAccessDenied {
            type_name: self
                .class_name(field.declaring_class())
                .unwrap_or("<unknown>")
                .to_string(),
            field: field.name().to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct ClassDescriptor {
    name: String,
    parent: Option<ClassId>,
    /// Own fields first, then inherited ones
    fields: Vec<FieldDescriptor>,
    slot_count: usize,
    default_constructor: bool,
}

/// Immutable class descriptor tables
#[derive(Debug, Clone, Default)]
pub struct Schema {
    classes: Vec<ClassDescriptor>,
    by_name: HashMap<String, ClassId>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Resolve a class by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownClass` if no class has that name.
    pub fn require(&self, name: &str) -> Result<ClassId> {
        self.class_id(name)
            .ok_or_else(|| ViewFilterError::UnknownClass {
                name: name.to_string(),
            })
    }

    /// True iff `class` is `ancestor` or inherits from it
    pub fn is_subclass_of(&self, class: ClassId, ancestor: ClassId) -> bool {
        let mut current = Some(class);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.classes.get(id.index()).and_then(|c| c.parent);
        }
        false
    }

    /// Look a field up by name, most-derived declaration first
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if neither the class nor an ancestor declares it.
    pub fn field(&self, class: ClassId, name: &str) -> Result<&FieldDescriptor> {
        self.fields_of(class)?
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| ViewFilterError::UnknownField {
                type_name: self.class_name(class).unwrap_or("<unknown>").to_string(),
                field: name.to_string(),
            })
    }

    /// Look a field up by the class that declares it, bypassing shadowing
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` if `declaring` is not in the hierarchy of
    /// `class` or does not declare `name`.
    pub fn declared_field(
        &self,
        class: ClassId,
        declaring: ClassId,
        name: &str,
    ) -> Result<&FieldDescriptor> {
        self.fields_of(class)?
            .iter()
            .find(|f| f.declaring_class() == declaring && f.name() == name)
            .ok_or_else(|| ViewFilterError::UnknownField {
                type_name: self.class_name(declaring).unwrap_or("<unknown>").to_string(),
                field: name.to_string(),
            })
    }

    /// Start building an instance of `class`
    pub fn object(&self, class: ClassId) -> ObjectBuilder<'_> {
        ObjectBuilder {
            schema: self,
            class,
            assignments: Vec::new(),
        }
    }

    /// Read a named field of an object value
    ///
    /// # Errors
    ///
    /// Returns `Introspection` if `value` is not an object, `UnknownField`
    /// for a bad name, or `FieldAccessDenied` for a write-only field.
    pub fn read(&self, value: &Value, name: &str) -> Result<Value> {
        let object = expect_object(value)?.borrow();
        let field = self.field(object.class(), name)?;
        self.read_field(&object, field)
    }

    /// Assign a named field of an object value
    ///
    /// # Errors
    ///
    /// Returns `Introspection` if `value` is not an object, `UnknownField`
    /// for a bad name, or `FieldAccessDenied` for a read-only field.
    pub fn write(&self, value: &Value, name: &str, new_value: Value) -> Result<()> {
        let object = expect_object(value)?;
        let class = object.borrow().class();
        let field = self.field(class, name)?;
        self.write_field(&mut object.borrow_mut(), field, new_value)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn descriptor(&self, class: ClassId) -> Result<&ClassDescriptor> {
        self.classes
            .get(class.index())
            .ok_or_else(|| ViewFilterError::Introspection {
                reason: format!("class #{} is not defined in this schema", class.index()),
            })
    }
}

fn expect_object(value: &Value) -> Result<&crate::model::ObjectRef> {
    value
        .as_object()
        .ok_or_else(|| ViewFilterError::Introspection {
            reason: format!("expected an object, found {}", value.describe()),
        })
}

impl FieldMetadata for Schema {
    fn fields_of(&self, class: ClassId) -> Result<&[FieldDescriptor]> {
        Ok(&self.descriptor(class)?.fields)
    }

    fn parent_of(&self, class: ClassId) -> Result<Option<ClassId>> {
        Ok(self.descriptor(class)?.parent)
    }

    fn class_name(&self, class: ClassId) -> Result<&str> {
        Ok(&self.descriptor(class)?.name)
    }

    fn class_named(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn instantiate(&self, class: ClassId) -> Result<Object> {
        let descriptor = self.descriptor(class)?;
        if !descriptor.default_constructor {
            return Err(ViewFilterError::ConstructionFailed {
                type_name: descriptor.name.clone(),
                reason: "class has no zero-argument constructor".to_string(),
            });
        }
        let mut slots = vec![Value::Null; descriptor.slot_count];
        for field in &descriptor.fields {
            slots[field.slot()] = field.field_type().zero_value();
        }
        Ok(Object::new(class, slots))
    }
}

/// Builds an instance field by field, like an all-arguments constructor
///
/// Assignments bypass [`FieldAccess`] restrictions; errors are reported by
/// [`ObjectBuilder::build`].
pub struct ObjectBuilder<'a> {
    schema: &'a Schema,
    class: ClassId,
    assignments: Vec<(String, Value)>,
}

impl ObjectBuilder<'_> {
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.assignments.push((name.to_string(), value.into()));
        self
    }

    /// # Errors
    ///
    /// Returns `Introspection` for an unknown class or `UnknownField` for a
    /// bad field name.
    pub fn build(self) -> Result<Value> {
        let descriptor = self.schema.descriptor(self.class)?;
        let mut slots = vec![Value::Null; descriptor.slot_count];
        for field in &descriptor.fields {
            slots[field.slot()] = field.field_type().zero_value();
        }
        for (name, value) in self.assignments {
            let field = self.schema.field(self.class, &name)?;
            slots[field.slot()] = value;
        }
        Ok(Value::object(Object::new(self.class, slots)))
    }
}

/// Builder for a [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Start declaring a class
    pub fn class(&mut self, name: &str) -> ClassBuilder<'_> {
        ClassBuilder {
            builder: self,
            name: name.to_string(),
            parent: None,
            fields: Vec::new(),
            default_constructor: true,
        }
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

struct PendingField {
    name: String,
    field_type: FieldType,
    tag: Option<TagId>,
    access: FieldAccess,
}

/// Declares one class; finish with [`ClassBuilder::build`]
pub struct ClassBuilder<'a> {
    builder: &'a mut SchemaBuilder,
    name: String,
    parent: Option<ClassId>,
    fields: Vec<PendingField>,
    default_constructor: bool,
}

impl ClassBuilder<'_> {
    pub fn extends(mut self, parent: ClassId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a field with no view tag
    pub fn field(self, name: &str, field_type: FieldType) -> Self {
        self.field_with(name, field_type, None, FieldAccess::ReadWrite)
    }

    /// Declare a field visible under `tag`
    pub fn tagged_field(self, name: &str, field_type: FieldType, tag: TagId) -> Self {
        self.field_with(name, field_type, Some(tag), FieldAccess::ReadWrite)
    }

    pub fn field_with(
        mut self,
        name: &str,
        field_type: FieldType,
        tag: Option<TagId>,
        access: FieldAccess,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.to_string(),
            field_type,
            tag,
            access,
        });
        self
    }

    pub fn no_default_constructor(mut self) -> Self {
        self.default_constructor = false;
        self
    }

    /// Register the class
    ///
    /// # Errors
    ///
    /// Returns `DuplicateClass` for a taken name, `UnknownClass` for a parent
    /// not defined by this builder, or `DuplicateField` if the class declares
    /// the same field name twice.
    pub fn build(self) -> Result<ClassId> {
        let schema = &mut self.builder.schema;
        if schema.by_name.contains_key(&self.name) {
            return Err(ViewFilterError::DuplicateClass { name: self.name });
        }

        let (inherited, base_slot) = match self.parent {
            Some(parent) => {
                let p = schema.classes.get(parent.index()).ok_or_else(|| {
                    ViewFilterError::UnknownClass {
                        name: format!("#{}", parent.index()),
                    }
                })?;
                (p.fields.clone(), p.slot_count)
            }
            None => (Vec::new(), 0),
        };

        let id = ClassId::from_index(schema.classes.len());
        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len() + inherited.len());
        for (offset, pending) in self.fields.into_iter().enumerate() {
            if fields.iter().any(|f| f.name == pending.name) {
                return Err(ViewFilterError::DuplicateField {
                    type_name: self.name,
                    field: pending.name,
                });
            }
            fields.push(FieldDescriptor {
                declaring: id,
                name: pending.name,
                field_type: pending.field_type,
                tag: pending.tag,
                access: pending.access,
                slot: base_slot + offset,
            });
        }
        let slot_count = base_slot + fields.len();
        fields.extend(inherited);

        schema.by_name.insert(self.name.clone(), id);
        schema.classes.push(ClassDescriptor {
            name: self.name,
            parent: self.parent,
            fields,
            slot_count,
            default_constructor: self.default_constructor,
        });
        Ok(id)
    }
}
