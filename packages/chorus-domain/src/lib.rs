pub mod builder;
pub mod instruction;

mod error;

pub use builder::BodyBuilder;
pub use error::{Error, Result};
pub use instruction::{Clause, Instruction, RawInstruction, SortDirection};
