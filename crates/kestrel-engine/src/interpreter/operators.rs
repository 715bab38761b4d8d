//! Binary operators, equality and relational comparison.

use crate::ast::BinaryOperator;
use crate::runtime::completion::Completion;
use crate::runtime::conversions::{PreferredType, string_to_number, to_boolean};
use crate::runtime::object::{CallBehavior, JsObject};
use crate::runtime::symbol::well_known;
use crate::runtime::value::{Value, is_strictly_equal};

use super::Interpreter;

/// Number::exponentiate.
pub fn exponentiate(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() {
        return f64::NAN;
    }
    if exponent == 0.0 {
        return 1.0;
    }
    if base.abs() == 1.0 && exponent.is_infinite() {
        return f64::NAN;
    }
    base.powf(exponent)
}

impl Interpreter {
    /// ApplyStringOrNumericBinaryOperator on two already evaluated operands.
    pub(crate) fn apply_binary(&mut self, operator: BinaryOperator, left: Value, right: Value) -> Completion<Value> {
        use BinaryOperator::*;

        match operator {
            Add => {
                let left = self.to_primitive(&left, PreferredType::Default)?;
                let right = self.to_primitive(&right, PreferredType::Default)?;
                if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                    let left = self.to_string(&left)?;
                    let right = self.to_string(&right)?;
                    return Ok(Value::String(left.concat(&right)));
                }
                Ok(Value::Number(self.to_number(&left)? + self.to_number(&right)?))
            }
            Subtract | Multiply | Divide | Modulo | Exponent => {
                let left = self.to_number(&left)?;
                let right = self.to_number(&right)?;
                Ok(Value::Number(match operator {
                    Subtract => left - right,
                    Multiply => left * right,
                    Divide => left / right,
                    Modulo => left % right,
                    _ => exponentiate(left, right),
                }))
            }
            LeftShift | RightShift | UnsignedRightShift => {
                let shift = self.to_uint32(&right)? & 0x1f;
                if operator == UnsignedRightShift {
                    let left = self.to_uint32(&left)?;
                    return Ok(Value::from(left >> shift));
                }
                let left = self.to_int32(&left)?;
                let result = if operator == LeftShift {
                    left.wrapping_shl(shift)
                } else {
                    left >> shift
                };
                Ok(Value::from(result))
            }
            BitwiseAnd | BitwiseOr | BitwiseXor => {
                let left = self.to_int32(&left)?;
                let right = self.to_int32(&right)?;
                Ok(Value::from(match operator {
                    BitwiseAnd => left & right,
                    BitwiseOr => left | right,
                    _ => left ^ right,
                }))
            }
            Equal => Ok(Value::Boolean(self.is_loosely_equal(&left, &right)?)),
            NotEqual => Ok(Value::Boolean(!self.is_loosely_equal(&left, &right)?)),
            StrictEqual => Ok(Value::Boolean(is_strictly_equal(&left, &right))),
            StrictNotEqual => Ok(Value::Boolean(!is_strictly_equal(&left, &right))),
            LessThan => Ok(Value::Boolean(self.is_less_than(&left, &right, true)? == Some(true))),
            GreaterThan => Ok(Value::Boolean(self.is_less_than(&right, &left, false)? == Some(true))),
            LessThanEqual => Ok(Value::Boolean(self.is_less_than(&right, &left, false)? == Some(false))),
            GreaterThanEqual => Ok(Value::Boolean(self.is_less_than(&left, &right, true)? == Some(false))),
            In => {
                let Value::Object(object) = &right else {
                    let key = self.describe(&left);
                    let target = self.describe(&right);
                    return Err(self.type_error(format!("Cannot use 'in' operator to search for {key} in {target}")));
                };
                let key = self.to_property_key(&left)?;
                Ok(Value::Boolean(object.has_property(&key)))
            }
            InstanceOf => Ok(Value::Boolean(self.instance_of(&left, &right)?)),
        }
    }

    /// IsLooselyEqual.
    pub fn is_loosely_equal(&mut self, x: &Value, y: &Value) -> Completion<bool> {
        match (x, y) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Ok(true),
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => Ok(false),
            (Value::Number(a), Value::String(b)) => Ok(*a == string_to_number(&b.to_std_string())),
            (Value::String(a), Value::Number(b)) => Ok(string_to_number(&a.to_std_string()) == *b),
            (Value::Boolean(b), _) => {
                let x = Value::Number(if *b { 1.0 } else { 0.0 });
                self.is_loosely_equal(&x, y)
            }
            (_, Value::Boolean(b)) => {
                let y = Value::Number(if *b { 1.0 } else { 0.0 });
                self.is_loosely_equal(x, &y)
            }
            (Value::Object(_), Value::Object(_)) => Ok(is_strictly_equal(x, y)),
            (Value::Object(_), _) => {
                let x = self.to_primitive(x, PreferredType::Default)?;
                self.is_loosely_equal(&x, y)
            }
            (_, Value::Object(_)) => {
                let y = self.to_primitive(y, PreferredType::Default)?;
                self.is_loosely_equal(x, &y)
            }
            _ => Ok(is_strictly_equal(x, y)),
        }
    }

    /// IsLessThan. `None` stands for undefined, produced when either side
    /// is NaN.
    pub fn is_less_than(&mut self, x: &Value, y: &Value, left_first: bool) -> Completion<Option<bool>> {
        let (px, py) = if left_first {
            let px = self.to_primitive(x, PreferredType::Number)?;
            let py = self.to_primitive(y, PreferredType::Number)?;
            (px, py)
        } else {
            let py = self.to_primitive(y, PreferredType::Number)?;
            let px = self.to_primitive(x, PreferredType::Number)?;
            (px, py)
        };
        if let (Value::String(a), Value::String(b)) = (&px, &py) {
            return Ok(Some(a < b));
        }
        let nx = self.to_number(&px)?;
        let ny = self.to_number(&py)?;
        if nx.is_nan() || ny.is_nan() {
            return Ok(None);
        }
        Ok(Some(nx < ny))
    }

    /// InstanceofOperator.
    pub fn instance_of(&mut self, value: &Value, target: &Value) -> Completion<bool> {
        let Value::Object(target_object) = target else {
            return Err(self.type_error("Right-hand side of 'instanceof' is not an object"));
        };
        if let Some(handler) = self.get_method(target, well_known().has_instance.clone())? {
            let result = self.call(&Value::Object(handler), target, std::slice::from_ref(value))?;
            return Ok(to_boolean(&result));
        }
        if !target_object.is_callable() {
            return Err(self.type_error("Right-hand side of 'instanceof' is not callable"));
        }
        self.ordinary_has_instance(target_object, value)
    }

    /// OrdinaryHasInstance.
    pub fn ordinary_has_instance(&mut self, constructor: &JsObject, value: &Value) -> Completion<bool> {
        if !constructor.is_callable() {
            return Ok(false);
        }
        if let Some(CallBehavior::Bound(bound)) = constructor.call_behavior() {
            return self.instance_of(value, &Value::Object(bound.target.clone()));
        }
        let Value::Object(object) = value else {
            return Ok(false);
        };
        let prototype = self.get(constructor, "prototype")?;
        let Value::Object(prototype) = prototype else {
            return Err(self.type_error("Function has non-object prototype in instanceof check"));
        };
        let mut current = object.get_prototype_of();
        while let Some(candidate) = current {
            if candidate == prototype {
                return Ok(true);
            }
            current = candidate.get_prototype_of();
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::host::BufferedHost;

    fn interpreter() -> Interpreter {
        Interpreter::new(Box::new(BufferedHost::new()), EngineConfig::default())
    }

    #[test]
    fn test_exponentiate_edge_cases() {
        assert!(exponentiate(1.0, f64::INFINITY).is_nan());
        assert!(exponentiate(1.0, f64::NAN).is_nan());
        assert_eq!(exponentiate(f64::NAN, 0.0), 1.0);
        assert_eq!(exponentiate(2.0, 10.0), 1024.0);
    }

    #[test]
    fn test_addition_prefers_strings() {
        let mut interp = interpreter();
        let result = interp
            .apply_binary(BinaryOperator::Add, Value::from("5"), Value::from(3))
            .ok();
        assert_eq!(result, Some(Value::from("53")));
        let result = interp
            .apply_binary(BinaryOperator::Subtract, Value::from("5"), Value::from(3))
            .ok();
        assert_eq!(result, Some(Value::from(2)));
    }

    #[test]
    fn test_loose_equality() {
        let mut interp = interpreter();
        assert_eq!(interp.is_loosely_equal(&Value::Null, &Value::Undefined).ok(), Some(true));
        assert_eq!(interp.is_loosely_equal(&Value::from("1"), &Value::from(1)).ok(), Some(true));
        assert_eq!(interp.is_loosely_equal(&Value::from(true), &Value::from("1")).ok(), Some(true));
        assert_eq!(interp.is_loosely_equal(&Value::Null, &Value::from(0)).ok(), Some(false));
    }

    #[test]
    fn test_relational_with_nan() {
        let mut interp = interpreter();
        let nan = Value::Number(f64::NAN);
        assert_eq!(interp.is_less_than(&nan, &Value::from(1), true).ok(), Some(None));
        for operator in [BinaryOperator::LessThanEqual, BinaryOperator::GreaterThanEqual] {
            let result = interp.apply_binary(operator, nan.clone(), Value::from(1)).ok();
            assert_eq!(result, Some(Value::Boolean(false)));
        }
    }

    #[test]
    fn test_shift_masks_count() {
        let mut interp = interpreter();
        let result = interp
            .apply_binary(BinaryOperator::LeftShift, Value::from(1), Value::from(33))
            .ok();
        assert_eq!(result, Some(Value::from(2)));
        let result = interp
            .apply_binary(BinaryOperator::UnsignedRightShift, Value::from(-1), Value::from(0))
            .ok();
        assert_eq!(result, Some(Value::from(4_294_967_295u32)));
    }
}
