use thiserror::Error;
use crate::v1::interpreter::EvalError;
use crate::v1::lexer::LexError;
use crate::v1::parser::ParseError;
use crate::v1::position::Position;

pub type ChainResult<T>=Result<T,ChainError>;

#[derive(Debug,Error)]
pub enum ChainError{
    #[error("lex failed, {0}")]
    Lex(#[from] LexError),
    #[error("parse failed, {0}")]
    Parse(#[from] ParseError),
    #[error("eval failed, {0}")]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("\"{path}\" is not valid {encoding}")]
    Encoding{path:String,encoding:&'static str},
    #[error("invalid define \"{0}\", expected NAME=VALUE")]
    InvalidDefine(String),
}

impl ChainError {
    /// Source position of lex and parse failures.
    pub fn position(&self)->Option<Position>{
        match self {
            ChainError::Lex(e)=>Some(e.position()),
            ChainError::Parse(e)=>e.position(),
            _=>None
        }
    }
}
