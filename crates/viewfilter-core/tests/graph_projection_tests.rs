//! Cyclic graphs and container fidelity

mod common;

use std::rc::Rc;

use common::{read, ChainFixture, FamilyFixture};
use viewfilter_core::{
    project, structurally_equal, Container, ContainerKind, ElementType, ObjectArray, TagId, Value,
    ViewFilter,
};

fn family_filter(f: &FamilyFixture, views: &[TagId]) -> ViewFilter {
    ViewFilter::builder(f.schema.clone(), f.lattice.clone())
        .for_classes([f.parent, f.child])
        .use_views(views.iter().copied())
        .build()
        .unwrap()
}

fn chain_filter(c: &ChainFixture) -> ViewFilter {
    ViewFilter::builder(c.schema.clone(), c.lattice.clone())
        .for_class(c.node)
        .use_view(c.link)
        .build()
        .unwrap()
}

#[test]
fn test_cycle_terminates_and_children_point_at_projected_parent() {
    let f = FamilyFixture::new();
    let (parent, _, _) = f.family(ContainerKind::List);

    let projected = family_filter(&f, &[f.whole_family]).apply_to(&parent).unwrap();

    assert!(!projected.same_ref(&parent));
    let children = f.children_of(&projected);
    assert_eq!(children.len(), 2);
    for child in &children {
        assert!(read(&f.schema, child, "parent").same_ref(&projected));
    }
    assert!(structurally_equal(&projected, &parent));
}

#[test]
fn test_projection_from_child_reaches_siblings_through_parent() {
    let f = FamilyFixture::new();
    let (_, first, second) = f.family(ContainerKind::List);

    let projected = family_filter(&f, &[f.whole_family]).apply_to(&first).unwrap();

    let parent = read(&f.schema, &projected, "parent");
    let siblings = f.children_of(&parent);
    assert!(siblings[0].same_ref(&projected));
    assert_eq!(read(&f.schema, &siblings[1], "name").as_str(), Some("second"));
    assert!(!siblings[1].same_ref(&second));
}

#[test]
fn test_excluded_back_reference_is_null() {
    let f = FamilyFixture::new();
    let (parent, _, _) = f.family(ContainerKind::List);

    let projected = family_filter(&f, &[f.name, f.children])
        .apply_to(&parent)
        .unwrap();

    let children = f.children_of(&projected);
    assert_eq!(children.len(), 2);
    assert_eq!(read(&f.schema, &children[0], "name").as_str(), Some("first"));
    assert_eq!(read(&f.schema, &children[1], "name").as_str(), Some("second"));
    for child in &children {
        assert!(read(&f.schema, child, "parent").is_null());
    }
}

#[test]
fn test_excluded_container_field_is_null() {
    let f = FamilyFixture::new();
    let (parent, _, _) = f.family(ContainerKind::List);

    let projected = family_filter(&f, &[f.name]).apply_to(&parent).unwrap();

    assert_eq!(read(&f.schema, &projected, "name").as_str(), Some("parent"));
    assert!(read(&f.schema, &projected, "children").is_null());
}

#[test]
fn test_list_keeps_length_order_and_kind() {
    let f = FamilyFixture::new();
    let (parent, first, second) = f.family(ContainerKind::Deque);

    let projected = family_filter(&f, &[f.whole_family]).apply_to(&parent).unwrap();

    let original_children = read(&f.schema, &parent, "children");
    let children = read(&f.schema, &projected, "children");
    assert!(!children.same_ref(&original_children));
    assert_eq!(
        children.as_container().unwrap().borrow().kind(),
        ContainerKind::Deque
    );

    let items = f.children_of(&projected);
    assert!(structurally_equal(&items[0], &first));
    assert!(structurally_equal(&items[1], &second));
}

#[test]
fn test_set_keeps_count() {
    let f = FamilyFixture::new();
    let (parent, _, _) = f.family(ContainerKind::Set);

    let projected = family_filter(&f, &[f.name, f.children])
        .apply_to(&parent)
        .unwrap();

    let children = read(&f.schema, &projected, "children");
    let children = children.as_container().unwrap().borrow();
    assert_eq!(children.kind(), ContainerKind::Set);
    assert_eq!(children.len(), 2);
    assert!(children
        .iter()
        .all(|child| read(&f.schema, child, "parent").is_null()));

    let mut names: Vec<String> = children
        .iter()
        .filter_map(|child| read(&f.schema, child, "name").as_str().map(str::to_string))
        .collect();
    names.sort();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_container_holding_itself() {
    let f = FamilyFixture::new();
    let list = Value::container(Container::with_items(ContainerKind::List, Vec::<Value>::new()));
    list.as_container()
        .unwrap()
        .borrow_mut()
        .add(list.clone())
        .unwrap();

    let projected = family_filter(&f, &[f.whole_family]).apply_to(&list).unwrap();

    assert!(!projected.same_ref(&list));
    let inner = projected.as_container().unwrap().borrow().items()[0].clone();
    assert!(inner.same_ref(&projected));
}

#[test]
fn test_project_filters_only_the_root_class() {
    let f = FamilyFixture::new();
    let (parent, first, _) = f.family(ContainerKind::List);

    let projected = project(&f.schema, &f.lattice, &parent, &[f.children]).unwrap();

    assert!(read(&f.schema, &projected, "name").is_null());
    let children = f.children_of(&projected);
    // Child is not registered, so the original instances are kept.
    assert!(children[0].same_ref(&first));
}

#[test]
fn test_long_chain_projects_without_overflow() {
    let c = ChainFixture::new();
    let head = c.chain(10_000);

    let projected = chain_filter(&c).apply_to(&head).unwrap();

    let mut count = 0;
    let mut original = head.clone();
    let mut copy = projected.clone();
    while !copy.is_null() {
        assert!(!copy.same_ref(&original));
        assert_eq!(
            read(&c.schema, &copy, "label").as_str(),
            read(&c.schema, &original, "label").as_str()
        );
        original = read(&c.schema, &original, "next");
        copy = read(&c.schema, &copy, "next");
        count += 1;
    }
    assert_eq!(count, 10_000);
    assert!(original.is_null());

    c.unlink(projected);
    c.unlink(head);
}

#[test]
fn test_deeply_nested_arrays_project_without_overflow() {
    let c = ChainFixture::new();
    let filter = ViewFilter::builder(c.schema.clone(), c.lattice.clone())
        .build()
        .unwrap();

    let mut root = Value::str("leaf");
    for _ in 0..10_000 {
        root = Value::array(ObjectArray::new(ElementType::Any, vec![root]));
    }

    let projected = filter.apply_to(&root).unwrap();

    let mut depth = 0;
    let mut original = root.clone();
    let mut copy = projected.clone();
    while let (Some(a), Some(b)) = (original.as_array().cloned(), copy.as_array().cloned()) {
        assert!(!Rc::ptr_eq(&a, &b));
        assert_eq!(b.borrow().len(), 1);
        original = a.borrow().items()[0].clone();
        copy = b.borrow().items()[0].clone();
        depth += 1;
    }
    assert_eq!(depth, 10_000);
    assert_eq!(copy.as_str(), Some("leaf"));

    for top in [projected, root] {
        let mut cursor = top;
        while let Some(array) = cursor.as_array().cloned() {
            let next = array.borrow().items()[0].clone();
            array.borrow_mut().set(0, Value::Null).unwrap();
            cursor = next;
        }
    }
}

#[test]
fn test_projected_cycle_is_freed_once_broken() {
    let c = ChainFixture::new();
    let node = c.new_node("loop", Value::Null);
    c.schema.write(&node, "next", node.clone()).unwrap();

    let projected = chain_filter(&c).apply_to(&node).unwrap();
    let object = projected.as_object().unwrap().clone();
    assert!(read(&c.schema, &projected, "next").same_ref(&projected));
    // the caller's handle, the self-reference and `object`
    assert_eq!(Rc::strong_count(&object), 3);

    let weak = Rc::downgrade(&object);
    drop(object);
    c.schema.write(&projected, "next", Value::Null).unwrap();
    drop(projected);
    assert!(weak.upgrade().is_none());

    c.schema.write(&node, "next", Value::Null).unwrap();
}
