//! Projection engine
//!
//! Walks an object graph depth-first and builds its view-filtered
//! projection. Dispatch is on [`Shape`]:
//!
//! | shape            | projection                                          |
//! |------------------|-----------------------------------------------------|
//! | absent           | absent                                              |
//! | scalar / string  | same value                                          |
//! | primitive array  | same reference, never copied                        |
//! | object array     | new array, same length and element type             |
//! | container        | new empty container of the same kind, refilled      |
//! | unfiltered class | same reference                                      |
//! | filtered class   | new instance; kept fields projected, others zeroed  |
//!
//! Every new array, container or instance is recorded in the call's
//! [`IdentityMemo`] before its children are visited, so shared and cyclic
//! references resolve to the same projection. Children are visited from a
//! work stack rather than by recursion.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use viewfilter_core_types::RequestId;

use crate::builder::ViewFilterBuilder;
use crate::errors::Result;
use crate::memo::IdentityMemo;
use crate::model::{ArrayRef, ContainerRef, ObjectArray, ObjectRef, Shape, Value};
use crate::schema::{ClassId, FieldDescriptor, FieldMetadata, Schema};
use crate::selection::SelectionState;
use crate::tags::{TagAncestry, TagId, TagLattice};
use crate::{log_op_end, log_op_error, log_op_start};

/// Shared field metadata provider
pub type SharedMetadata = Arc<dyn FieldMetadata + Send + Sync>;
/// Shared tag ancestry provider
pub type SharedAncestry = Arc<dyn TagAncestry + Send + Sync>;

/// State owned by one top-level projection call
///
/// Passed explicitly through the traversal; never shared between calls.
pub struct ProjectionContext {
    request_id: RequestId,
    memo: IdentityMemo,
}

impl ProjectionContext {
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            memo: IdentityMemo::new(),
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn memo(&self) -> &IdentityMemo {
        &self.memo
    }
}

impl Default for ProjectionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A configured projection: metadata providers plus a [`SelectionState`]
///
/// Immutable once built and `Send + Sync`; each `apply_to` call uses its own
/// [`ProjectionContext`].
#[derive(Clone)]
pub struct ViewFilter {
    metadata: SharedMetadata,
    ancestry: SharedAncestry,
    selection: SelectionState,
}

impl ViewFilter {
    /// Start configuring a filter over a schema and tag lattice
    pub fn builder(schema: Arc<Schema>, lattice: Arc<TagLattice>) -> ViewFilterBuilder {
        ViewFilterBuilder::new(schema, lattice)
    }

    /// Start configuring a filter over custom providers
    pub fn builder_with(metadata: SharedMetadata, ancestry: SharedAncestry) -> ViewFilterBuilder {
        ViewFilterBuilder::new(metadata, ancestry)
    }

    pub(crate) fn from_parts(
        metadata: SharedMetadata,
        ancestry: SharedAncestry,
        selection: SelectionState,
    ) -> Self {
        Self {
            metadata,
            ancestry,
            selection,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn views(&self) -> &BTreeSet<TagId> {
        self.selection.views()
    }

    /// Project `value` under the configured views
    ///
    /// The projection of a cyclic graph is itself cyclic, and `Rc` cycles are
    /// never freed on their own. Callers that drop such a projection should
    /// first break its back-references, e.g. by writing `Value::Null` into
    /// them.
    ///
    /// # Errors
    ///
    /// Any construction, field access or provider failure aborts the call and
    /// is returned as `ProjectionFailed`, naming the value being processed at
    /// the innermost point of failure.
    pub fn apply_to(&self, value: &Value) -> Result<Value> {
        let mut ctx = ProjectionContext::new();
        log_op_start!(
            "apply_to",
            request_id = %ctx.request_id(),
            filtered_classes = self.selection.filtered().len(),
            views = self.selection.views().len()
        );
        let start = Instant::now();

        let projection = self.apply_in(value, &mut ctx).map_err(|e| {
            log_op_error!(
                "apply_to",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                request_id = %ctx.request_id()
            );
            e
        })?;

        log_op_end!(
            "apply_to",
            duration_ms = start.elapsed().as_millis() as u64,
            request_id = %ctx.request_id(),
            memo_entries = ctx.memo().len()
        );

        Ok(projection)
    }

    /// Project `value` within an existing call context
    ///
    /// Composites are opened (shell created and recorded in the memo) when
    /// first reached and filled later from an explicit work stack, so graph
    /// depth never grows the native stack.
    ///
    /// # Errors
    ///
    /// See [`ViewFilter::apply_to`].
    pub fn apply_in(&self, value: &Value, ctx: &mut ProjectionContext) -> Result<Value> {
        let mut pending = Vec::new();
        let projection = self.visit(value, ctx, &mut pending)?;

        while let Some(Pending { original, fill }) = pending.pop() {
            self.fill(fill, ctx, &mut pending).map_err(|e| e.at(&original))?;
        }
        Ok(projection)
    }

    /// Fields of `class` this filter keeps
    ///
    /// # Errors
    ///
    /// Propagates provider failures.
    pub fn included_fields(&self, class: ClassId) -> Result<Vec<&FieldDescriptor>> {
        self.selection
            .included_fields(class, self.metadata.as_ref(), self.ancestry.as_ref())
    }

    /// Projection of `value`, opening a new shell if it is an unseen composite
    fn visit(
        &self,
        value: &Value,
        ctx: &mut ProjectionContext,
        pending: &mut Vec<Pending>,
    ) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        if let Some(projection) = ctx.memo.lookup(value) {
            return Ok(projection);
        }
        self.open(value, ctx, pending).map_err(|e| e.at(value))
    }

    fn open(
        &self,
        value: &Value,
        ctx: &mut ProjectionContext,
        pending: &mut Vec<Pending>,
    ) -> Result<Value> {
        let fill = match value.shape() {
            Shape::Absent => return Ok(Value::Null),
            Shape::Scalar | Shape::PrimitiveArray(_) => return Ok(value.clone()),
            Shape::ObjectArray(array) => {
                let (element, items) = {
                    let array = array.borrow();
                    (array.element(), array.items().to_vec())
                };
                let shell = ObjectArray::with_len(element, items.len());
                Fill::Array {
                    shell: Rc::new(RefCell::new(shell)),
                    items,
                }
            }
            Shape::Container(container) => {
                let (kind, items) = {
                    let container = container.borrow();
                    (container.kind(), container.items().to_vec())
                };
                Fill::Container {
                    shell: Rc::new(RefCell::new(kind.instantiate()?)),
                    items,
                }
            }
            Shape::Composite(object) => {
                let class = object.borrow().class();
                if !self
                    .selection
                    .filtered()
                    .is_filtered(class, self.metadata.as_ref())?
                {
                    tracing::trace!(class = class.index(), "class not filtered, passing through");
                    return Ok(value.clone());
                }
                Fill::Object {
                    source: object.clone(),
                    shell: Rc::new(RefCell::new(self.metadata.instantiate(class)?)),
                }
            }
        };

        let projection = fill.projection();
        ctx.memo.record(value, projection.clone());
        pending.push(Pending {
            original: value.clone(),
            fill,
        });
        Ok(projection)
    }

    fn fill(
        &self,
        fill: Fill,
        ctx: &mut ProjectionContext,
        pending: &mut Vec<Pending>,
    ) -> Result<()> {
        match fill {
            Fill::Array { shell, items } => {
                for (index, item) in items.iter().enumerate() {
                    let projected = self.visit(item, ctx, pending)?;
                    shell.borrow_mut().set(index, projected)?;
                }
            }
            Fill::Container { shell, items } => {
                for item in &items {
                    let projected = self.visit(item, ctx, pending)?;
                    shell.borrow_mut().add(projected)?;
                }
            }
            Fill::Object { source, shell } => {
                let class = source.borrow().class();
                for field in self.metadata.fields_of(class)? {
                    let next = if self.selection.includes(field, self.ancestry.as_ref())? {
                        let current = self.metadata.read_field(&source.borrow(), field)?;
                        self.visit(&current, ctx, pending)?
                    } else {
                        field.field_type().zero_value()
                    };
                    self.metadata
                        .write_field(&mut shell.borrow_mut(), field, next)?;
                }
            }
        }
        Ok(())
    }
}

/// An opened composite whose shell is in the memo but not yet filled
struct Pending {
    original: Value,
    fill: Fill,
}

enum Fill {
    Array {
        shell: ArrayRef,
        items: Vec<Value>,
    },
    Container {
        shell: ContainerRef,
        items: Vec<Value>,
    },
    Object {
        source: ObjectRef,
        shell: ObjectRef,
    },
}

impl Fill {
    fn projection(&self) -> Value {
        match self {
            Fill::Array { shell, .. } => Value::Array(shell.clone()),
            Fill::Container { shell, .. } => Value::Container(shell.clone()),
            Fill::Object { shell, .. } => Value::Object(shell.clone()),
        }
    }
}
