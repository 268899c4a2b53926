use std::collections::HashSet;
use std::fmt::Write;

use crate::errors::Result;
use crate::model::{PrimitiveArray, Value};
use crate::schema::{FieldAccess, FieldMetadata};

/// Pending output while walking a value graph
enum Step {
    Render(Value),
    Text(String),
    /// Leaving the composite with this identity
    Leave(usize),
}

/// Render a value graph as a single line of text
///
/// Objects print as `Class{field: value, ..}` in layout order (inherited
/// fields first). A reference that is already being rendered further up
/// the path prints as `<cycle Class>`; write-only fields print as
/// `<write-only>`.
///
/// # Errors
///
/// Propagates provider failures for unknown classes.
pub fn render_value(metadata: &dyn FieldMetadata, value: &Value) -> Result<String> {
    let mut out = String::new();
    let mut path = HashSet::new();
    let mut stack = vec![Step::Render(value.clone())];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => out.push_str(&text),
            Step::Leave(id) => {
                path.remove(&id);
            }
            Step::Render(value) => {
                let steps = expand(metadata, &value, &mut path, &mut out)?;
                stack.extend(steps.into_iter().rev());
            }
        }
    }
    Ok(out)
}

/// Write leaves straight to `out`; return the steps for a composite's body.
fn expand(
    metadata: &dyn FieldMetadata,
    value: &Value,
    path: &mut HashSet<usize>,
    out: &mut String,
) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    match value {
        Value::Object(object) => {
            let object = object.borrow();
            let class_name = metadata.class_name(object.class())?;
            if value.identity().is_some_and(|id| path.contains(&id)) {
                let _ = write!(out, "<cycle {}>", class_name);
                return Ok(steps);
            }
            let mut fields: Vec<_> = metadata.fields_of(object.class())?.iter().collect();
            fields.sort_by_key(|f| f.slot());

            steps.push(Step::Text(format!("{}{{", class_name)));
            for (i, field) in fields.iter().enumerate() {
                let separator = if i > 0 { ", " } else { "" };
                steps.push(Step::Text(format!("{}{}: ", separator, field.name())));
                steps.push(match (field.access(), object.slot(field.slot())) {
                    (FieldAccess::WriteOnly, _) => Step::Text("<write-only>".to_string()),
                    (_, Some(slot)) => Step::Render(slot.clone()),
                    (_, None) => Step::Text("<missing>".to_string()),
                });
            }
            steps.push(Step::Text("}".to_string()));
        }
        Value::Array(array) => {
            if value.identity().is_some_and(|id| path.contains(&id)) {
                let _ = write!(out, "<cycle {}>", value.describe());
                return Ok(steps);
            }
            steps.push(Step::Text("[".to_string()));
            push_items(&mut steps, array.borrow().items());
            steps.push(Step::Text("]".to_string()));
        }
        Value::Container(container) => {
            if value.identity().is_some_and(|id| path.contains(&id)) {
                let _ = write!(out, "<cycle {}>", value.describe());
                return Ok(steps);
            }
            let container = container.borrow();
            steps.push(Step::Text(format!("{}[", container.kind().name())));
            push_items(&mut steps, container.items());
            steps.push(Step::Text("]".to_string()));
        }
        Value::PrimitiveArray(array) => {
            let array = array.borrow();
            let items = match &*array {
                PrimitiveArray::Bool(v) => join(v),
                PrimitiveArray::Byte(v) => join(v),
                PrimitiveArray::Int(v) => join(v),
                PrimitiveArray::Float(v) => join(v),
                PrimitiveArray::Char(v) => join(v),
            };
            let _ = write!(out, "{}[{}]", array.element_name(), items);
            return Ok(steps);
        }
        other => {
            out.push_str(&other.describe());
            return Ok(steps);
        }
    }

    if let Some(id) = value.identity() {
        path.insert(id);
        steps.push(Step::Leave(id));
    }
    Ok(steps)
}

fn push_items(steps: &mut Vec<Step>, items: &[Value]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            steps.push(Step::Text(", ".to_string()));
        }
        steps.push(Step::Render(item.clone()));
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
