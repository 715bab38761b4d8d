//! Iterator prototypes.
//!
//! %IteratorPrototype% and the array and string iterators built on it.

use crate::interpreter::Interpreter;
use crate::runtime::completion::Completion;
use crate::runtime::object::{ArrayIteratorState, IterationKind, JsObject, ObjectClass, StringIteratorState};
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::realm::Intrinsics;
use crate::runtime::string::JsString;
use crate::runtime::symbol::well_known;
use crate::runtime::value::Value;

use super::define_method;

pub(super) fn init(intrinsics: &Intrinsics) {
    let symbols = well_known();
    define_method(
        intrinsics,
        &intrinsics.iterator_prototype,
        symbols.iterator.clone(),
        iterator,
        0,
    );

    let array_iterator = &intrinsics.array_iterator_prototype;
    define_method(intrinsics, array_iterator, "next", array_iterator_next, 0);
    array_iterator.insert(
        symbols.to_string_tag.clone(),
        Property::data("Array Iterator", false, false, true),
    );

    let string_iterator = &intrinsics.string_iterator_prototype;
    define_method(intrinsics, string_iterator, "next", string_iterator_next, 0);
    string_iterator.insert(
        symbols.to_string_tag.clone(),
        Property::data("String Iterator", false, false, true),
    );
}

/// CreateArrayIterator.
pub(crate) fn create_array_iterator(interp: &Interpreter, object: JsObject, kind: IterationKind) -> JsObject {
    JsObject::new(
        Some(interp.intrinsics().array_iterator_prototype.clone()),
        ObjectClass::ArrayIterator(ArrayIteratorState {
            object: Some(object),
            next_index: 0,
            kind,
        }),
    )
}

/// CreateStringIterator.
pub(crate) fn create_string_iterator(interp: &Interpreter, string: JsString) -> JsObject {
    JsObject::new(
        Some(interp.intrinsics().string_iterator_prototype.clone()),
        ObjectClass::StringIterator(StringIteratorState {
            string: Some(string),
            position: 0,
        }),
    )
}

// ============================================================================
// %IteratorPrototype%
// ============================================================================

/// %IteratorPrototype%[@@iterator]() - Returns this.
pub fn iterator(
    _interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    Ok(this.clone())
}

// ============================================================================
// %ArrayIteratorPrototype%
// ============================================================================

/// %ArrayIteratorPrototype%.next()
pub fn array_iterator_next(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let iterator = match this {
        Value::Object(object) if matches!(&*object.class(), ObjectClass::ArrayIterator(_)) => object.clone(),
        other => {
            return Err(interp.type_error(format!(
                "next method called on incompatible receiver {}",
                interp.describe(other)
            )));
        }
    };
    let (object, index, kind) = match &*iterator.class() {
        ObjectClass::ArrayIterator(state) => (state.object.clone(), state.next_index, state.kind),
        _ => (None, 0, IterationKind::Values),
    };
    let Some(object) = object else {
        return Ok(Value::Object(interp.create_iter_result_object(Value::Undefined, true)));
    };

    let length = interp.get(&object, "length")?;
    let length = interp.to_length(&length)?;
    if let ObjectClass::ArrayIterator(state) = &mut *iterator.class_mut() {
        if index >= length {
            state.object = None;
        } else {
            state.next_index = index + 1;
        }
    }
    if index >= length {
        return Ok(Value::Object(interp.create_iter_result_object(Value::Undefined, true)));
    }

    let index_value = Value::Number(index as f64);
    let result = match kind {
        IterationKind::Keys => index_value,
        IterationKind::Values => interp.get(&object, PropertyKey::from(index.to_string()))?,
        IterationKind::Entries => {
            let element = interp.get(&object, PropertyKey::from(index.to_string()))?;
            Value::Object(interp.create_array_from_list([index_value, element]))
        }
    };
    Ok(Value::Object(interp.create_iter_result_object(result, false)))
}

// ============================================================================
// %StringIteratorPrototype%
// ============================================================================

/// %StringIteratorPrototype%.next() - Yields one code point at a time;
/// surrogate pairs stay together.
pub fn string_iterator_next(
    interp: &mut Interpreter,
    this: &Value,
    _args: &[Value],
    _new_target: Option<&JsObject>,
) -> Completion<Value> {
    let Some(iterator) = this
        .as_object()
        .filter(|object| matches!(&*object.class(), ObjectClass::StringIterator(_)))
    else {
        return Err(interp.type_error(format!(
            "next method called on incompatible receiver {}",
            interp.describe(this)
        )));
    };

    let next = match &mut *iterator.class_mut() {
        ObjectClass::StringIterator(state) => match state.string.clone() {
            Some(string) if state.position < string.len() => {
                let start = state.position;
                let width = code_point_width(&string, start);
                state.position += width;
                Some(string.substring(start, start + width))
            }
            _ => {
                state.string = None;
                None
            }
        },
        _ => None,
    };
    let result = match next {
        Some(code_point) => interp.create_iter_result_object(Value::String(code_point), false),
        None => interp.create_iter_result_object(Value::Undefined, true),
    };
    Ok(Value::Object(result))
}

/// The number of code units of the code point starting at `position`.
fn code_point_width(string: &JsString, position: usize) -> usize {
    let is_lead = |unit: u16| (0xD800..=0xDBFF).contains(&unit);
    let is_trail = |unit: u16| (0xDC00..=0xDFFF).contains(&unit);
    match (string.code_unit_at(position), string.code_unit_at(position + 1)) {
        (Some(lead), Some(trail)) if is_lead(lead) && is_trail(trail) => 2,
        _ => 1,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    fn drain(interp: &mut Interpreter, iterator: JsObject) -> Vec<Value> {
        let mut record = match interp.get_iterator(&Value::Object(iterator)) {
            Ok(record) => record,
            Err(_) => panic!("not iterable"),
        };
        let mut values = Vec::new();
        while let Ok(Some(value)) = interp.iterator_step_value(&mut record) {
            values.push(value);
        }
        values
    }

    #[test]
    fn test_array_iterator_kinds() {
        let mut interp = interpreter();
        let array = interp.create_array_from_list([Value::from("a"), Value::from("b")]);
        let keys = create_array_iterator(&interp, array.clone(), IterationKind::Keys);
        assert_eq!(drain(&mut interp, keys), vec![Value::from(0), Value::from(1)]);
        let values = create_array_iterator(&interp, array, IterationKind::Values);
        assert_eq!(drain(&mut interp, values), vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_exhausted_iterator_stays_done() {
        let mut interp = interpreter();
        let array = interp.create_array_from_list(Vec::new());
        let iterator = Value::Object(create_array_iterator(&interp, array, IterationKind::Values));
        for _ in 0..2 {
            let Ok(Value::Object(result)) = array_iterator_next(&mut interp, &iterator, &[], None) else {
                panic!("next failed");
            };
            assert_eq!(interp.get(&result, "done").ok(), Some(Value::Boolean(true)));
        }
    }

    #[test]
    fn test_string_iterator_keeps_surrogate_pairs() {
        let mut interp = interpreter();
        let iterator = create_string_iterator(&interp, JsString::from("a\u{1F600}b"));
        let values = drain(&mut interp, iterator);
        assert_eq!(values.len(), 3);
        assert_eq!(values[1], Value::from("\u{1F600}"));
    }

    #[test]
    fn test_next_rejects_wrong_receiver() {
        let mut interp = interpreter();
        let object = Value::Object(interp.ordinary_object_create());
        assert!(array_iterator_next(&mut interp, &object, &[], None).is_err());
        assert!(string_iterator_next(&mut interp, &object, &[], None).is_err());
    }
}
