mod interface;
mod schema;

pub use interface::*;
pub use schema::*;
