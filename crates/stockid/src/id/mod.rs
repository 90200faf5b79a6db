mod compare;
mod debug;
mod guid;
#[cfg(test)]
mod tests;

pub use compare::*;
pub use guid::*;
