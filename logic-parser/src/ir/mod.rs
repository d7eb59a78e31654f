pub mod ast;
pub mod memory;
