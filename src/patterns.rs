use std::sync::LazyLock;
use regex::Regex;
use crate::error::{ChainError, ChainResult};
use crate::v1::types::Dynamic;

static NUMBER:LazyLock<Regex>=LazyLock::new(||Regex::new(r"^-?\d+(\.\d*)?$").unwrap());
static VARIABLE:LazyLock<Regex>=LazyLock::new(||Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap());
static STRING:LazyLock<Regex>=LazyLock::new(||Regex::new(r#"^(?s)("[^"]*"|'[^']*')$"#).unwrap());

pub fn is_number(s:&str)->bool{
    NUMBER.is_match(s)
}
pub fn is_valid_variable(s:&str)->bool{
    VARIABLE.is_match(s)
}
pub fn is_string(s:&str)->bool{
    STRING.is_match(s)
}

/// Interprets a command-line value the way a literal in source would read.
/// Anything that is not a number, quoted string or boolean stays a raw string.
pub fn coerce_literal(raw:&str)->Dynamic{
    let raw=raw.trim();
    match raw {
        "true"=>return Dynamic::Boolean(true),
        "false"=>return Dynamic::Boolean(false),
        _=>{}
    }
    if is_number(raw){
        if let Ok(i)=raw.parse::<i64>(){
            return Dynamic::Integer(i)
        }
        if let Ok(f)=raw.parse::<f64>(){
            return Dynamic::Float(f)
        }
    }
    if is_string(raw){
        return Dynamic::from(&raw[1..raw.len()-1])
    }
    Dynamic::from(raw)
}

/// Splits `name=value` and validates the name.
pub fn parse_define(define:&str)->ChainResult<(String,Dynamic)>{
    let Some((name,value))=define.split_once('=') else {
        return Err(ChainError::InvalidDefine(define.into()))
    };
    let name=name.trim();
    if !is_valid_variable(name){
        return Err(ChainError::InvalidDefine(define.into()))
    }
    Ok((name.into(),coerce_literal(value)))
}
