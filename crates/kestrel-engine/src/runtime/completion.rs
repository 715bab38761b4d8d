//! The completion protocol.
//!
//! Every evaluation step returns a [`Completion`]. `Ok` is a normal
//! completion; [`Abrupt`] carries `break`, `continue`, `return`, `throw` and
//! host-level faults, and `?` propagates it unchanged. Statements produce
//! `Completion<Option<Value>>` where `None` is the empty completion value.

use std::fmt;

use crate::ast::Name;

use super::value::Value;

/// A fault raised by the engine itself rather than by script code.
/// Faults are never observable by `try`/`catch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineFault {
    /// A language feature this engine does not implement
    Unsupported(&'static str),
    /// A broken engine invariant
    Internal(String),
    /// The configured step budget ran out
    StepBudgetExhausted,
}

impl fmt::Display for EngineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineFault::Unsupported(feature) => write!(f, "unsupported: {feature}"),
            EngineFault::Internal(message) => write!(f, "internal error: {message}"),
            EngineFault::StepBudgetExhausted => f.write_str("step budget exhausted"),
        }
    }
}

/// A non-normal completion.
#[derive(Debug, Clone)]
pub enum Abrupt {
    /// `break`, optionally labelled, with the completion value so far
    Break(Option<Name>, Option<Value>),
    /// `continue`, optionally labelled, with the completion value so far
    Continue(Option<Name>, Option<Value>),
    /// `return value`
    Return(Value),
    /// `throw value`
    Throw(Value),
    /// An engine fault
    Fault(EngineFault),
}

impl Abrupt {
    /// An `Internal` fault.
    pub fn internal(message: impl Into<String>) -> Self {
        Abrupt::Fault(EngineFault::Internal(message.into()))
    }

    /// An `Unsupported` fault.
    pub fn unsupported(feature: &'static str) -> Self {
        Abrupt::Fault(EngineFault::Unsupported(feature))
    }
}

/// The result of an evaluation step.
pub type Completion<T = Value> = Result<T, Abrupt>;

/// The result of evaluating a statement; `None` is the empty value.
pub type StatementCompletion = Completion<Option<Value>>;

/// UpdateEmpty: replaces an empty completion value with `value`. Applies to
/// normal completions and to `break`/`continue`.
pub fn update_empty(completion: StatementCompletion, value: Option<Value>) -> StatementCompletion {
    match completion {
        Ok(result) => Ok(result.or(value)),
        Err(Abrupt::Break(label, result)) => Err(Abrupt::Break(label, result.or(value))),
        Err(Abrupt::Continue(label, result)) => Err(Abrupt::Continue(label, result.or(value))),
        Err(other) => Err(other),
    }
}

/// Whether a loop keeps going after its body completed with `completion`
/// (LoopContinues), given the loop's own label set.
pub fn loop_continues(completion: &StatementCompletion, labels: &[Name]) -> bool {
    match completion {
        Ok(_) => true,
        Err(Abrupt::Continue(None, _)) => true,
        Err(Abrupt::Continue(Some(label), _)) => labels.contains(label),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_empty_keeps_existing_value() {
        let filled = update_empty(Ok(None), Some(Value::from(1)));
        assert_eq!(filled.ok().flatten(), Some(Value::from(1)));

        let kept = update_empty(Ok(Some(Value::from(2))), Some(Value::from(1)));
        assert_eq!(kept.ok().flatten(), Some(Value::from(2)));

        let abrupt = update_empty(Err(Abrupt::Break(None, None)), Some(Value::from(1)));
        assert!(matches!(abrupt, Err(Abrupt::Break(None, Some(ref v))) if *v == Value::from(1)));

        let carried = update_empty(Err(Abrupt::Continue(None, Some(Value::from(3)))), Some(Value::from(1)));
        assert!(matches!(carried, Err(Abrupt::Continue(None, Some(ref v))) if *v == Value::from(3)));

        let thrown = update_empty(Err(Abrupt::Throw(Value::from(4))), Some(Value::from(1)));
        assert!(matches!(thrown, Err(Abrupt::Throw(ref v)) if *v == Value::from(4)));
    }

    #[test]
    fn test_loop_continues() {
        let label: Name = "outer".into();
        assert!(loop_continues(&Ok(None), &[]));
        assert!(loop_continues(&Err(Abrupt::Continue(None, None)), &[]));
        assert!(loop_continues(&Err(Abrupt::Continue(Some(label.clone()), None)), &[label.clone()]));
        assert!(!loop_continues(&Err(Abrupt::Continue(Some(label), None)), &[]));
        assert!(!loop_continues(&Err(Abrupt::Break(None, None)), &[]));
    }

    #[test]
    fn test_fault_display() {
        assert_eq!(
            EngineFault::Unsupported("generators").to_string(),
            "unsupported: generators"
        );
    }
}
