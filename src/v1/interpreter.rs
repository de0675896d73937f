use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use log::debug;
use thiserror::Error;
use crate::v1::ast::{Assign, FunctionCall, Identifier, Node, Op, ReturnMode};
use crate::v1::memory::{walk, Memory};
use crate::v1::types::Dynamic;

pub type EvalFn = fn(&mut Interpreter, Vec<Dynamic>) -> EvalResult<Dynamic>;
pub type EvalResult<T>=Result<T, EvalError>;

#[derive(Debug,Clone,PartialEq,Error)]
pub enum EvalError{
    #[error("identifier '{0}' not found in memory")]
    KeyNotFound(String),
    #[error("list index must be an integer, got {0}")]
    NonIntegerIndex(&'static str),
    #[error("list index {index} out of range for length {len}")]
    IndexOutOfBounds{index:i64,len:usize},
    #[error("{0} value cannot be indexed")]
    NotIndexable(&'static str),
    #[error("unhashable type {0} used as a key")]
    Unhashable(&'static str),
    #[error("unsupported operand types for {op}: {left} and {right}")]
    UnsupportedOperand{op:Op,left:&'static str,right:&'static str},
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in {left} {op} {right}")]
    Overflow{op:Op,left:i64,right:i64},
    #[error("repeating a string of length {len} {count} times exceeds the size limit")]
    StringTooLong{len:usize,count:i64},
    #[error("{0} value is not callable")]
    NotCallable(&'static str),
    #[error("cannot assign to {0}")]
    NotAssignable(&'static str),
    #[error("output failed: {0}")]
    Output(String),
}

/// Tree-walking evaluator owning the program and the memory it mutates.
pub struct Interpreter{
    ast:Vec<Node>,
    memory:Memory,
    output:Box<dyn Write>
}

impl Interpreter{
    pub fn new(ast:Vec<Node>)->Self{
        Self::with_output(ast,Box::new(io::stdout()))
    }
    pub fn with_output(ast:Vec<Node>,output:Box<dyn Write>)->Self{
        Self{ast,memory:Memory::new(),output}
    }
    pub fn memory(&self)->&Memory{
        &self.memory
    }
    pub fn memory_mut(&mut self)->&mut Memory{
        &mut self.memory
    }
    pub fn into_memory(self)->Memory{
        self.memory
    }
    pub fn output(&mut self)->&mut dyn Write{
        self.output.as_mut()
    }
    /// Evaluates every statement in order, writing each result and then the
    /// final memory to the output.
    pub fn interpret(&mut self)->EvalResult<Vec<Dynamic>>{
        let ast=mem::take(&mut self.ast);
        let mut results=Vec::with_capacity(ast.len());
        let mut outcome=Ok(());
        for stmt in &ast{
            match self.evaluate(stmt).and_then(|v|self.emit(&v).map(|_|v)) {
                Ok(v)=>results.push(v),
                Err(e)=>{
                    outcome=Err(e);
                    break
                }
            }
        }
        self.ast=ast;
        outcome?;
        let memory=self.memory.to_string();
        self.emit(&Dynamic::String(memory))?;
        Ok(results)
    }
    /// Evaluates statements against the running memory without writing results.
    pub fn execute(&mut self,stmts:&[Node])->EvalResult<Vec<Dynamic>>{
        let mut results=Vec::with_capacity(stmts.len());
        for (i,stmt) in stmts.iter().enumerate(){
            debug!("evaluating statement {i}");
            results.push(self.evaluate(stmt)?);
        }
        Ok(results)
    }
    fn emit(&mut self,value:&Dynamic)->EvalResult<()>{
        writeln!(self.output,"{value}").map_err(|e|EvalError::Output(e.to_string()))
    }
    pub fn evaluate(&mut self,node:&Node)->EvalResult<Dynamic>{
        match node {
            Node::Integer(i)=>Ok(Dynamic::Integer(*i)),
            Node::Float(f)=>Ok(Dynamic::Float(*f)),
            Node::String(s)=>Ok(Dynamic::String(s.clone())),
            Node::Boolean(b)=>Ok(Dynamic::Boolean(*b)),
            Node::Identifier(identifier)=>self.identity_value(identifier),
            Node::FunctionCall(call)=>self.call(call),
            Node::Array(elements)=>{
                let mut v=Vec::with_capacity(elements.len());
                for e in elements{
                    v.push(self.evaluate(e)?);
                }
                Ok(Dynamic::Array(v))
            }
            Node::Object(object)=>{
                let mut map=HashMap::new();
                for (key,value) in object.properties(){
                    let key=self.evaluate(key)?;
                    let value=self.evaluate(value)?;
                    map.insert(key,value);
                }
                Ok(Dynamic::Map(map))
            }
            Node::BinaryOperation(operation)=>{
                let left=self.evaluate(&operation.left)?;
                let right=self.evaluate(&operation.right)?;
                Dynamic::binary(operation.op,left,right)
            }
            Node::Assign(assign)=>self.execute_assign(assign),
        }
    }
    /// Reads through an address chain. Each element is evaluated and checked
    /// against the container reached so far before the next one runs.
    fn identity_value(&mut self,identifier:&Identifier)->EvalResult<Dynamic>{
        let (origin,rest)=match identifier.address().split_first() {
            Some((Node::FunctionCall(call),rest))=>(Some(self.call(call)?),rest),
            _=>(None,identifier.address())
        };
        let mut keys=Vec::with_capacity(rest.len());
        for part in rest{
            let key=self.evaluate(part)?;
            keys.push(key);
            self.locate(origin.as_ref(),&keys)?;
        }
        Ok(self.locate(origin.as_ref(),&keys)?.clone())
    }
    fn locate<'a>(&'a self,origin:Option<&'a Dynamic>,keys:&[Dynamic])->EvalResult<&'a Dynamic>{
        match origin {
            Some(value)=>walk(value,keys),
            None=>self.memory.resolve(keys)
        }
    }
    fn execute_assign(&mut self,assign:&Assign)->EvalResult<Dynamic>{
        let value=self.evaluate(assign.value())?;
        let Some((last,parents))=assign.identifier().address().split_last() else {
            return Err(EvalError::NotAssignable("empty address"))
        };
        if matches!(parents.first().unwrap_or(last),Node::FunctionCall(_)){
            return Err(EvalError::NotAssignable("function call result"))
        }
        let mut keys=Vec::with_capacity(parents.len());
        for part in parents{
            let key=self.evaluate(part)?;
            keys.push(key);
            self.memory.resolve(&keys)?;
        }
        let key=self.evaluate(last)?;
        let old=self.memory.write(&keys,key,value.clone())?;
        Ok(match assign.return_mode() {
            ReturnMode::After=>value,
            ReturnMode::Before=>old
        })
    }
    fn call(&mut self,call:&FunctionCall)->EvalResult<Dynamic>{
        let builtin=call.identifier.simple_name().and_then(|name|self.memory.builtin(name)).cloned();
        let target=match builtin {
            Some(f)=>f,
            None=>self.identity_value(&call.identifier)?
        };
        let native=match target {
            Dynamic::Native(native)=>native,
            other=>return Err(EvalError::NotCallable(other.type_name()))
        };
        let mut args=Vec::with_capacity(call.args.len());
        for a in &call.args{
            args.push(self.evaluate(a)?);
        }
        (native.func)(self,args)
    }
}
