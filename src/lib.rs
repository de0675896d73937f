pub mod v1;
pub mod error;
pub mod engine;
pub mod logger;
pub mod patterns;

use std::io;

pub use error::{ChainError, ChainResult};
pub use engine::{read_source, ChainEngine, RunOptions};
pub use v1::interpreter::{EvalError, Interpreter};
pub use v1::lexer::Lexer;
pub use v1::memory::Memory;
pub use v1::parser::{ParseError, Parser};
pub use v1::types::Dynamic;

/// Parses and evaluates `source` against a fresh memory, discarding output.
pub fn run_source(source:&str)->ChainResult<(Vec<Dynamic>,Memory)>{
    let ast=Parser::from_script(source)?.parse()?;
    let mut interpreter=Interpreter::with_output(vec![],Box::new(io::sink()));
    let results=interpreter.execute(&ast)?;
    Ok((results,interpreter.into_memory()))
}
