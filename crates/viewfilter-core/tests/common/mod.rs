use std::sync::Arc;

use viewfilter_core::{
    ClassId, Container, ContainerKind, FieldType, Schema, TagId, TagLattice, Value,
};

/// Two-level hierarchy with one tag per field
///
/// `AllFieldsBase` covers every base field; `AllFieldsDerived` extends it
/// and adds the derived field's tag.
#[allow(dead_code)]
pub struct HierarchyFixture {
    pub schema: Arc<Schema>,
    pub lattice: Arc<TagLattice>,
    pub base: ClassId,
    pub derived: ClassId,
    pub public_string: TagId,
    pub public_int: TagId,
    pub private_double: TagId,
    pub public_float: TagId,
    pub all_fields_base: TagId,
    pub all_fields_derived: TagId,
}

#[allow(dead_code)]
impl HierarchyFixture {
    pub fn new() -> Self {
        let mut tags = TagLattice::builder();
        let public_string = tags.define("PublicString", &[]).unwrap();
        let public_int = tags.define("PublicInt", &[]).unwrap();
        let private_double = tags.define("PrivateDouble", &[]).unwrap();
        let public_float = tags.define("PublicFloat", &[]).unwrap();
        let all_fields_base = tags
            .define(
                "AllFieldsBase",
                &[public_string, public_int, private_double],
            )
            .unwrap();
        let all_fields_derived = tags
            .define("AllFieldsDerived", &[all_fields_base, public_float])
            .unwrap();

        let mut classes = Schema::builder();
        let base = classes
            .class("Base")
            .tagged_field("public_string", FieldType::Reference, public_string)
            .tagged_field("public_int", FieldType::Int, public_int)
            .tagged_field("private_double", FieldType::Float, private_double)
            .build()
            .unwrap();
        let derived = classes
            .class("Derived")
            .extends(base)
            .tagged_field("public_float", FieldType::Float, public_float)
            .build()
            .unwrap();

        Self {
            schema: Arc::new(classes.build()),
            lattice: Arc::new(tags.build()),
            base,
            derived,
            public_string,
            public_int,
            private_double,
            public_float,
            all_fields_base,
            all_fields_derived,
        }
    }

    pub fn base_value(&self, s: Option<&str>, i: i64, d: f64) -> Value {
        self.schema
            .object(self.base)
            .with("public_string", s.map(Value::str).unwrap_or_default())
            .with("public_int", i)
            .with("private_double", d)
            .build()
            .unwrap()
    }

    pub fn derived_value(&self, s: Option<&str>, i: i64, d: f64, f: f64) -> Value {
        self.schema
            .object(self.derived)
            .with("public_string", s.map(Value::str).unwrap_or_default())
            .with("public_int", i)
            .with("private_double", d)
            .with("public_float", f)
            .build()
            .unwrap()
    }
}

/// Parent/child graph where each child points back at its parent
#[allow(dead_code)]
pub struct FamilyFixture {
    pub schema: Arc<Schema>,
    pub lattice: Arc<TagLattice>,
    pub parent: ClassId,
    pub child: ClassId,
    pub name: TagId,
    pub children: TagId,
    pub back_ref: TagId,
    pub whole_family: TagId,
}

#[allow(dead_code)]
impl FamilyFixture {
    pub fn new() -> Self {
        let mut tags = TagLattice::builder();
        let name = tags.define("Name", &[]).unwrap();
        let children = tags.define("Children", &[]).unwrap();
        let back_ref = tags.define("BackRef", &[]).unwrap();
        let whole_family = tags
            .define("WholeFamily", &[name, children, back_ref])
            .unwrap();

        let mut classes = Schema::builder();
        let parent = classes
            .class("Parent")
            .tagged_field("name", FieldType::Reference, name)
            .tagged_field("children", FieldType::Reference, children)
            .build()
            .unwrap();
        let child = classes
            .class("Child")
            .tagged_field("name", FieldType::Reference, name)
            .tagged_field("parent", FieldType::Reference, back_ref)
            .build()
            .unwrap();

        Self {
            schema: Arc::new(classes.build()),
            lattice: Arc::new(tags.build()),
            parent,
            child,
            name,
            children,
            back_ref,
            whole_family,
        }
    }

    /// A parent holding two children in a container of `kind`; each child
    /// references the parent.
    pub fn family(&self, kind: ContainerKind) -> (Value, Value, Value) {
        let parent = self
            .schema
            .object(self.parent)
            .with("name", "parent")
            .build()
            .unwrap();
        let first = self.new_child("first", &parent);
        let second = self.new_child("second", &parent);
        let children = Value::container(Container::with_items(
            kind,
            vec![first.clone(), second.clone()],
        ));
        self.schema.write(&parent, "children", children).unwrap();
        (parent, first, second)
    }

    pub fn new_child(&self, name: &str, parent: &Value) -> Value {
        self.schema
            .object(self.child)
            .with("name", name)
            .with("parent", parent.clone())
            .build()
            .unwrap()
    }

    pub fn children_of(&self, parent: &Value) -> Vec<Value> {
        let children = self.schema.read(parent, "children").unwrap();
        let container = children.as_container().unwrap().borrow();
        container.items().to_vec()
    }
}

/// Read a field, panicking on failure
#[allow(dead_code)]
pub fn read(schema: &Schema, value: &Value, field: &str) -> Value {
    schema.read(value, field).unwrap()
}

/// Singly linked `Node{label, next}` with both fields under one tag
#[allow(dead_code)]
pub struct ChainFixture {
    pub schema: Arc<Schema>,
    pub lattice: Arc<TagLattice>,
    pub node: ClassId,
    pub link: TagId,
}

#[allow(dead_code)]
impl ChainFixture {
    pub fn new() -> Self {
        let mut tags = TagLattice::builder();
        let link = tags.define("Link", &[]).unwrap();

        let mut classes = Schema::builder();
        let node = classes
            .class("Node")
            .tagged_field("label", FieldType::Reference, link)
            .tagged_field("next", FieldType::Reference, link)
            .build()
            .unwrap();

        Self {
            schema: Arc::new(classes.build()),
            lattice: Arc::new(tags.build()),
            node,
            link,
        }
    }

    pub fn new_node(&self, label: &str, next: Value) -> Value {
        self.schema
            .object(self.node)
            .with("label", label)
            .with("next", next)
            .build()
            .unwrap()
    }

    /// Head of a chain labelled `n0..n{len-1}`, built tail first
    pub fn chain(&self, len: usize) -> Value {
        let mut head = Value::Null;
        for i in (0..len).rev() {
            head = self.new_node(&format!("n{}", i), head);
        }
        head
    }

    /// Cut every link so dropping a long chain does not recurse
    pub fn unlink(&self, head: Value) {
        let mut cursor = head;
        while !cursor.is_null() {
            let next = read(&self.schema, &cursor, "next");
            self.schema.write(&cursor, "next", Value::Null).unwrap();
            cursor = next;
        }
    }
}
