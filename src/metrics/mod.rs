pub mod aggregate;
pub mod derive;
pub mod model;
pub mod parse;
pub mod report;

pub use aggregate::*;
pub use derive::*;
pub use model::*;
pub use parse::*;
pub use report::*;
