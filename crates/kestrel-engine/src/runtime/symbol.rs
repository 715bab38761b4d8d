//! Symbol values.
//!
//! Every symbol carries a process-unique id; two symbols with the same
//! description are still distinct. The well-known symbols are created once
//! per process and shared by every realm.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct SymbolData {
    id: u64,
    description: Option<String>,
}

/// A unique symbol.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolData>);

impl Symbol {
    /// Creates a fresh symbol.
    pub fn new(description: Option<String>) -> Self {
        let id = NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed);
        Self(Arc::new(SymbolData { id, description }))
    }

    /// The process-unique id.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// The `[[Description]]`.
    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    /// SymbolDescriptiveString: `Symbol(description)`.
    pub fn descriptive_string(&self) -> String {
        format!("Symbol({})", self.description().unwrap_or(""))
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.descriptive_string(), self.0.id)
    }
}

/// The well-known symbols.
#[derive(Debug)]
pub struct WellKnownSymbols {
    /// `Symbol.iterator`
    pub iterator: Symbol,
    /// `Symbol.hasInstance`
    pub has_instance: Symbol,
    /// `Symbol.toPrimitive`
    pub to_primitive: Symbol,
    /// `Symbol.toStringTag`
    pub to_string_tag: Symbol,
    /// `Symbol.unscopables`
    pub unscopables: Symbol,
}

/// Returns the process-wide well-known symbols.
pub fn well_known() -> &'static WellKnownSymbols {
    static WELL_KNOWN: OnceLock<WellKnownSymbols> = OnceLock::new();
    WELL_KNOWN.get_or_init(|| WellKnownSymbols {
        iterator: Symbol::new(Some("Symbol.iterator".into())),
        has_instance: Symbol::new(Some("Symbol.hasInstance".into())),
        to_primitive: Symbol::new(Some("Symbol.toPrimitive".into())),
        to_string_tag: Symbol::new(Some("Symbol.toStringTag".into())),
        unscopables: Symbol::new(Some("Symbol.unscopables".into())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_are_unique() {
        let a = Symbol::new(Some("x".into()));
        let b = Symbol::new(Some("x".into()));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.descriptive_string(), "Symbol(x)");
        assert_eq!(Symbol::new(None).descriptive_string(), "Symbol()");
    }

    #[test]
    fn test_well_known_symbols_are_singletons() {
        assert_eq!(well_known().iterator, well_known().iterator);
        assert_ne!(well_known().iterator, well_known().has_instance);
        assert_eq!(well_known().iterator.description(), Some("Symbol.iterator"));
    }
}
