//! The runtime data model: values, objects, environments, realms and
//! function objects.

pub mod arguments;
pub mod completion;
pub mod context;
pub mod conversions;
pub mod environment;
pub mod function;
pub mod object;
pub mod property;
pub mod realm;
pub mod reference;
pub mod string;
pub mod symbol;
pub mod value;

pub use completion::{Abrupt, Completion, EngineFault, StatementCompletion};
pub use object::JsObject;
pub use property::{Property, PropertyDescriptor, PropertyKey};
pub use realm::Realm;
pub use string::JsString;
pub use symbol::Symbol;
pub use value::Value;
