use std::collections::HashSet;

use super::value::Value;

/// Deep structural equality between two object graphs
///
/// Objects must share a class and have equal slots; arrays and ordered
/// containers compare element-wise; sets compare without regard to order.
/// Cycles are handled coinductively: a pair of references already under
/// comparison is assumed equal.
pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    let mut assumed = HashSet::new();
    equal(a, b, &mut assumed)
}

fn equal(a: &Value, b: &Value, assumed: &mut HashSet<(usize, usize)>) -> bool {
    if let (Some(x), Some(y)) = (a.identity(), b.identity()) {
        if x == y || !assumed.insert((x, y)) {
            return true;
        }
    }

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::PrimitiveArray(x), Value::PrimitiveArray(y)) => *x.borrow() == *y.borrow(),
        (Value::Array(x), Value::Array(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.element() == y.element() && all_equal(x.items(), y.items(), assumed)
        }
        (Value::Container(x), Value::Container(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            if x.kind() != y.kind() || x.len() != y.len() {
                return false;
            }
            if x.kind().is_ordered() {
                all_equal(x.items(), y.items(), assumed)
            } else {
                // failed trial matches must not leave assumptions behind
                x.iter().all(|item| {
                    y.iter().any(|other| {
                        let mut trial = assumed.clone();
                        let matched = equal(item, other, &mut trial);
                        if matched {
                            *assumed = trial;
                        }
                        matched
                    })
                })
            }
        }
        (Value::Object(x), Value::Object(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.class() == y.class() && all_equal(x.slots(), y.slots(), assumed)
        }
        _ => false,
    }
}

fn all_equal(xs: &[Value], ys: &[Value], assumed: &mut HashSet<(usize, usize)>) -> bool {
    xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| equal(x, y, assumed))
}
