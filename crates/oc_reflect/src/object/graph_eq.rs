use alloc::vec;

use oc_utils::hash::HashMap;

use crate::object::Value;

/// Structural equality of two object graphs.
///
/// Objects are compared field by field. Shared references and cycles must
/// have the same shape on both sides: every object of `a` is paired with
/// exactly one object of `b`. Floats compare by bit pattern, so `NaN`
/// equals itself.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use oc_reflect::info::{ClassInfo, FieldInfo, FieldType};
/// use oc_reflect::object::{Object, ObjectRef, Value, graph_eq};
///
/// let class = Arc::new(ClassInfo::new("demo::Node", [
///     FieldInfo::new("id", FieldType::INT),
///     FieldInfo::new("next", FieldType::class("demo::Node")),
/// ]));
/// let ring = |id: i32| {
///     let node = ObjectRef::new(Object::new(class.clone()));
///     node.set("id", id).unwrap();
///     node.set("next", node.clone()).unwrap();
///     Value::Object(node)
/// };
///
/// assert!(graph_eq(&ring(1), &ring(1)));
/// assert!(!graph_eq(&ring(1), &ring(2)));
/// ```
pub fn graph_eq(a: &Value, b: &Value) -> bool {
    let mut forward: HashMap<usize, usize> = HashMap::default();
    let mut backward: HashMap<usize, usize> = HashMap::default();
    let mut pending = vec![(a.clone(), b.clone())];

    while let Some(pair) = pending.pop() {
        match pair {
            (Value::Object(x), Value::Object(y)) => {
                let (xa, ya) = (x.addr(), y.addr());
                match (forward.get(&xa), backward.get(&ya)) {
                    (Some(&seen), _) if seen == ya => continue,
                    (None, None) => {}
                    _ => return false,
                }
                forward.insert(xa, ya);
                backward.insert(ya, xa);

                if x.class_id() != y.class_id() {
                    return false;
                }
                let (Ok(xs), Ok(ys)) = (x.values(), y.values()) else {
                    return false;
                };
                if xs.len() != ys.len() {
                    return false;
                }
                pending.extend(xs.into_iter().zip(ys));
            }
            (Value::Float(x), Value::Float(y)) => {
                if x.to_bits() != y.to_bits() {
                    return false;
                }
            }
            (Value::Double(x), Value::Double(y)) => {
                if x.to_bits() != y.to_bits() {
                    return false;
                }
            }
            (x, y) => {
                if x != y {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;

    use super::graph_eq;
    use crate::info::{ClassInfo, FieldInfo, FieldType};
    use crate::object::{Object, ObjectRef, Value};

    fn pair_class() -> Arc<ClassInfo> {
        Arc::new(ClassInfo::new(
            "t::Pair",
            [
                FieldInfo::new("left", FieldType::Dynamic),
                FieldInfo::new("right", FieldType::Dynamic),
            ],
        ))
    }

    fn pair(class: &Arc<ClassInfo>, left: Value, right: Value) -> ObjectRef {
        ObjectRef::new(Object::from_values(class.clone(), [left, right]).unwrap())
    }

    #[test]
    fn sharing_must_match() {
        let class = pair_class();
        let leaf = pair(&class, Value::Int(1), Value::Null);
        let shared = pair(&class, leaf.clone().into(), leaf.into());

        let a = pair(&class, Value::Int(1), Value::Null);
        let b = pair(&class, Value::Int(1), Value::Null);
        let split = pair(&class, a.into(), b.into());

        assert!(graph_eq(&shared.clone().into(), &shared.clone().into()));
        assert!(!graph_eq(&shared.into(), &split.into()));
    }

    #[test]
    fn plain_values() {
        assert!(graph_eq(&Value::Null, &Value::Null));
        assert!(graph_eq(&Value::Double(f64::NAN), &Value::Double(f64::NAN)));
        assert!(!graph_eq(&Value::Int(1), &Value::Long(1)));
        assert!(!graph_eq(&Value::from("a"), &Value::Null));
    }
}
