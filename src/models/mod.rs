pub mod product;
pub mod search;

pub use product::*;
pub use search::*;
