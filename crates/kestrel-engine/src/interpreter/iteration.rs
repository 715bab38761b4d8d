//! The iterator protocol and for-in enumeration.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::runtime::completion::{Abrupt, Completion};
use crate::runtime::conversions::to_boolean;
use crate::runtime::object::JsObject;
use crate::runtime::property::{Property, PropertyKey};
use crate::runtime::symbol::well_known;
use crate::runtime::value::Value;

use super::Interpreter;

/// An Iterator Record.
pub struct IteratorRecord {
    /// `[[Iterator]]`
    pub iterator: JsObject,
    /// `[[NextMethod]]`
    pub next_method: Value,
    /// `[[Done]]`
    pub done: bool,
}

/// EnumerateObjectProperties: the string keys visited by `for-in`.
///
/// Keys are read one object at a time, so properties deleted before they
/// are reached are skipped and keys already seen on a nearer object shadow
/// the same key further up the chain.
pub(crate) struct PropertyEnumerator {
    object: Option<JsObject>,
    pending: VecDeque<PropertyKey>,
    visited: FxHashSet<PropertyKey>,
    started: bool,
}

impl PropertyEnumerator {
    pub(crate) fn new(object: JsObject) -> Self {
        Self {
            object: Some(object),
            pending: VecDeque::new(),
            visited: FxHashSet::default(),
            started: false,
        }
    }

    /// The next enumerable key, or `None` when the chain is exhausted.
    pub(crate) fn next_key(&mut self) -> Option<PropertyKey> {
        loop {
            let object = self.object.clone()?;
            if !self.started {
                self.pending = object
                    .own_property_keys()
                    .into_iter()
                    .filter(|key| !key.is_symbol())
                    .collect();
                self.started = true;
            }
            while let Some(key) = self.pending.pop_front() {
                if self.visited.contains(&key) {
                    continue;
                }
                let Some(property) = object.get_own_property(&key) else {
                    continue;
                };
                self.visited.insert(key.clone());
                if property.enumerable() {
                    return Some(key);
                }
            }
            self.object = object.get_prototype_of();
            self.started = false;
        }
    }
}

impl Interpreter {
    /// GetIterator(obj, sync).
    pub fn get_iterator(&mut self, value: &Value) -> Completion<IteratorRecord> {
        let Some(method) = self.get_method(value, well_known().iterator.clone())? else {
            return Err(self.type_error(format!("{} is not iterable", self.describe(value))));
        };
        let iterator = self.call(&Value::Object(method), value, &[])?;
        let Value::Object(iterator) = iterator else {
            return Err(self.type_error("Result of the Symbol.iterator method is not an object"));
        };
        let next_method = self.get(&iterator, "next")?;
        Ok(IteratorRecord {
            iterator,
            next_method,
            done: false,
        })
    }

    /// IteratorStepValue: the next value, or `None` once the iterator is
    /// done. Any abrupt completion also marks the record done.
    pub fn iterator_step_value(&mut self, record: &mut IteratorRecord) -> Completion<Option<Value>> {
        let result = self.iterator_step_value_inner(record);
        if !matches!(result, Ok(Some(_))) {
            record.done = true;
        }
        result
    }

    fn iterator_step_value_inner(&mut self, record: &IteratorRecord) -> Completion<Option<Value>> {
        let iterator = Value::Object(record.iterator.clone());
        let result = self.call(&record.next_method, &iterator, &[])?;
        let Value::Object(result) = result else {
            return Err(self.type_error(format!(
                "Iterator result {} is not an object",
                self.describe(&result)
            )));
        };
        let done = self.get(&result, "done")?;
        if to_boolean(&done) {
            return Ok(None);
        }
        self.get(&result, "value").map(Some)
    }

    /// IteratorClose: calls `return` on the iterator and merges its outcome
    /// with `completion`. A throw completion always wins.
    pub fn iterator_close<T>(&mut self, record: &IteratorRecord, completion: Completion<T>) -> Completion<T> {
        if matches!(completion, Err(Abrupt::Fault(_))) {
            return completion;
        }
        let iterator = Value::Object(record.iterator.clone());
        let inner = match self.get_method(&iterator, "return") {
            Ok(None) => return completion,
            Ok(Some(method)) => self.call(&Value::Object(method), &iterator, &[]),
            Err(abrupt) => Err(abrupt),
        };
        if matches!(completion, Err(Abrupt::Throw(_))) {
            return completion;
        }
        let inner = inner?;
        if !inner.is_object() {
            return Err(self.type_error("Iterator result is not an object"));
        }
        completion
    }

    /// IterableToList.
    pub fn iterable_to_list(&mut self, value: &Value) -> Completion<Vec<Value>> {
        let mut record = self.get_iterator(value)?;
        let mut values = Vec::new();
        while let Some(value) = self.iterator_step_value(&mut record)? {
            values.push(value);
        }
        Ok(values)
    }

    /// CreateIterResultObject.
    pub fn create_iter_result_object(&self, value: Value, done: bool) -> JsObject {
        let result = self.ordinary_object_create();
        result.insert("value", Property::plain(value));
        result.insert("done", Property::plain(done));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerator_skips_shadowed_and_hidden_keys() {
        let parent = JsObject::ordinary(None);
        parent.insert("a", Property::plain(1));
        parent.insert("inherited", Property::plain(2));
        parent.insert("hidden", Property::hidden(3));
        let child = JsObject::ordinary(Some(parent));
        child.insert("a", Property::plain(4));
        child.insert("own", Property::plain(5));

        let mut enumerator = PropertyEnumerator::new(child);
        let mut keys = Vec::new();
        while let Some(key) = enumerator.next_key() {
            keys.push(key.to_string());
        }
        assert_eq!(keys, vec!["a", "own", "inherited"]);
    }

    #[test]
    fn test_enumerator_skips_deleted_keys() {
        let object = JsObject::ordinary(None);
        object.insert("first", Property::plain(1));
        object.insert("second", Property::plain(2));
        let mut enumerator = PropertyEnumerator::new(object.clone());
        assert_eq!(enumerator.next_key().map(|key| key.to_string()), Some("first".into()));
        object.delete(&PropertyKey::from("second"));
        assert_eq!(enumerator.next_key(), None);
    }

    #[test]
    fn test_enumerator_orders_indices_first() {
        let object = JsObject::ordinary(None);
        object.insert("b", Property::plain(1));
        object.insert(2u32, Property::plain(2));
        object.insert(0u32, Property::plain(3));
        let mut enumerator = PropertyEnumerator::new(object);
        let mut keys = Vec::new();
        while let Some(key) = enumerator.next_key() {
            keys.push(key.to_string());
        }
        assert_eq!(keys, vec!["0", "2", "b"]);
    }
}
