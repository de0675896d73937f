pub mod token;
pub mod position;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod types;
pub mod memory;
pub mod builtin;
pub mod interpreter;
