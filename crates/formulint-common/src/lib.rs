pub mod diagnostic;
pub mod error;
pub mod function;
pub mod position;

pub use diagnostic::*;
pub use error::*;
pub use function::*;
pub use position::*;
