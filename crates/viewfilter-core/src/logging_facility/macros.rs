//! Canonical logging macros
//!
//! Every operation boundary emits `component`, `op` and `event` fields so
//! that start, end and error events can be matched up. The public macros
//! only differ in level, event name and the fields they require; all of
//! them expand through `__log_op_event!`.

/// Emit one operation-boundary event at `level`
///
/// `event` names a constant in `core_types::schema`. Extra fields are passed
/// through to `tracing` unchanged.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event
            $(, $($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use viewfilter_core::log_op_start;
/// log_op_start!("apply_to");
/// log_op_start!("apply_to", views = 2);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Log the successful end of an operation
///
/// `duration_ms` is required and always comes first.
///
/// ```
/// # use viewfilter_core::log_op_end;
/// log_op_end!("apply_to", duration_ms = 42);
/// log_op_end!("apply_to", duration_ms = 42, memo_entries = 7);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log an operation error with its stable kind and code
///
/// `err` is anything convertible into [`ExError`](crate::errors::ExError);
/// it is consumed.
///
/// ```
/// # use viewfilter_core::{log_op_error, errors::ViewFilterError};
/// let err = ViewFilterError::UnknownTag { name: "Public".to_string() };
/// log_op_error!("build", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}
