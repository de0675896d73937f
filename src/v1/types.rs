use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use crate::v1::ast::Op;
use crate::v1::interpreter::{EvalError, EvalFn, EvalResult};

/// Runtime value of the language.
#[derive(Debug,Clone)]
pub enum Dynamic{
    /// Also the "no prior value" result of writing a fresh slot.
    Unit,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Array(Vec<Dynamic>),
    Map(HashMap<Dynamic,Dynamic>),
    Native(NativeFn)
}

#[derive(Clone,Copy)]
pub struct NativeFn{
    pub name:&'static str,
    pub func:EvalFn
}

impl std::fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"NativeFn({})",self.name)
    }
}

/// Operand view used by the arithmetic table; booleans count as 0 and 1.
#[derive(Debug,Clone,Copy)]
enum Number{
    Int(i64),
    Float(f64)
}

impl From<&str> for Dynamic{
    fn from(value: &str) -> Self {
        Dynamic::String(String::from(value))
    }
}
impl From<String> for Dynamic{
    fn from(value: String) -> Self {
        Dynamic::String(value)
    }
}
impl From<i64> for Dynamic{
    fn from(value: i64) -> Self {
        Dynamic::Integer(value)
    }
}
impl From<f64> for Dynamic{
    fn from(value: f64) -> Self {
        Dynamic::Float(value)
    }
}
impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Dynamic::Boolean(value)
    }
}
impl From<Vec<Dynamic>> for Dynamic {
    fn from(value: Vec<Dynamic>) -> Self {
        Dynamic::Array(value)
    }
}

impl Display for Dynamic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dynamic::String(s) => write!(f,"{s}"),
            other => other.fmt_nested(f)
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, rhs: &Self) -> bool {
        match (self,rhs) {
            (Dynamic::Unit,Dynamic::Unit) => true,
            (Dynamic::Integer(l),Dynamic::Integer(r)) => l==r,
            (Dynamic::Float(l),Dynamic::Float(r)) => l.to_bits()==r.to_bits(),
            (Dynamic::String(l),Dynamic::String(r)) => l==r,
            (Dynamic::Boolean(l),Dynamic::Boolean(r)) => l==r,
            (Dynamic::Array(l),Dynamic::Array(r)) => l==r,
            (Dynamic::Map(l),Dynamic::Map(r)) => l==r,
            (Dynamic::Native(l),Dynamic::Native(r)) => l.name==r.name,
            _ => false
        }
    }
}

impl Eq for Dynamic {}

impl Hash for Dynamic{
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Dynamic::Integer(i) => i.hash(state),
            Dynamic::Float(f) => f.to_bits().hash(state),
            Dynamic::String(s) => s.hash(state),
            Dynamic::Boolean(b) => b.hash(state),
            Dynamic::Native(n) => n.name.hash(state),
            // never used as keys, see `is_hashable`
            Dynamic::Unit|Dynamic::Array(_)|Dynamic::Map(_) => {}
        }
    }
}

impl Dynamic{
    pub fn type_name(&self)->&'static str{
        match self {
            Dynamic::Unit => "Unit",
            Dynamic::Integer(_) => "Integer",
            Dynamic::Float(_) => "Float",
            Dynamic::String(_) => "String",
            Dynamic::Boolean(_) => "Boolean",
            Dynamic::Array(_) => "Array",
            Dynamic::Map(_) => "Map",
            Dynamic::Native(_) => "Function",
        }
    }
    pub fn is_hashable(&self)->bool{
        !matches!(self,Dynamic::Array(_)|Dynamic::Map(_))
    }
    pub fn as_map(&self)->Option<&HashMap<Dynamic,Dynamic>>{
        match self {
            Dynamic::Map(m)=>Some(m),
            _=>None
        }
    }
    fn as_number(&self)->Option<Number>{
        match self {
            Dynamic::Integer(i)=>Some(Number::Int(*i)),
            Dynamic::Float(f)=>Some(Number::Float(*f)),
            Dynamic::Boolean(b)=>Some(Number::Int(i64::from(*b))),
            _=>None
        }
    }
    /// Renders strings quoted, as they appear inside containers.
    fn fmt_nested(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dynamic::Unit => write!(f,"Unit"),
            Dynamic::Integer(i) => write!(f,"{i}"),
            Dynamic::Float(x) => write!(f,"{x:?}"),
            Dynamic::String(s) => write!(f,"{s:?}"),
            Dynamic::Boolean(b) => write!(f,"{b}"),
            Dynamic::Native(n) => write!(f,"function {}",n.name),
            Dynamic::Array(v) => {
                write!(f,"[")?;
                for (i,a) in v.iter().enumerate(){
                    if i>0{
                        write!(f,", ")?;
                    }
                    a.fmt_nested(f)?;
                }
                write!(f,"]")
            }
            Dynamic::Map(m) => {
                write!(f,"{{")?;
                for (i,(k,v)) in sorted_entries(m).into_iter().enumerate(){
                    if i>0{
                        write!(f,", ")?;
                    }
                    k.fmt_nested(f)?;
                    write!(f,": ")?;
                    v.fmt_nested(f)?;
                }
                write!(f,"}}")
            }
        }
    }
    /// Applies an arithmetic operator to two runtime values.
    pub fn binary(op:Op,left:Dynamic,right:Dynamic)->EvalResult<Dynamic>{
        match (op,&left,&right) {
            (Op::Plus,Dynamic::String(l),Dynamic::String(r))=>return Ok(Dynamic::String(format!("{l}{r}"))),
            (Op::Mul,Dynamic::String(s),n)|(Op::Mul,n,Dynamic::String(s)) if !matches!(n,Dynamic::String(_))=>{
                if let Some(Number::Int(count))=n.as_number(){
                    return repeat(s,count)
                }
            }
            _=>{}
        }
        match (left.as_number(),right.as_number()) {
            (Some(Number::Int(l)),Some(Number::Int(r)))=>integer_op(op,l,r),
            (Some(l),Some(r))=>Ok(Dynamic::Float(float_op(op,l.to_f64(),r.to_f64())?)),
            _=>Err(EvalError::UnsupportedOperand{
                op,
                left:left.type_name(),
                right:right.type_name()
            })
        }
    }
}

impl Number {
    fn to_f64(self)->f64{
        match self {
            Number::Int(i)=>i as f64,
            Number::Float(f)=>f
        }
    }
}

/// Largest string, in bytes, that `*` may build.
pub const MAX_STRING_LEN:usize=1<<30;

fn repeat(s:&str,count:i64)->EvalResult<Dynamic>{
    let times=usize::try_from(count).unwrap_or(0);
    match s.len().checked_mul(times) {
        Some(len) if len<=MAX_STRING_LEN=>Ok(Dynamic::String(s.repeat(times))),
        _=>Err(EvalError::StringTooLong{len:s.len(),count})
    }
}

pub(crate) fn sorted_entries(m:&HashMap<Dynamic,Dynamic>)->Vec<(&Dynamic,&Dynamic)>{
    let mut entries:Vec<_>=m.iter().collect();
    entries.sort_by_cached_key(|(k,_)|format!("{}:{k}",k.type_name()));
    entries
}

fn integer_op(op:Op,l:i64,r:i64)->EvalResult<Dynamic>{
    let result=match op {
        Op::Plus=>l.checked_add(r),
        Op::Minus=>l.checked_sub(r),
        Op::Mul=>l.checked_mul(r),
        Op::Div=>{
            if r==0{
                return Err(EvalError::DivisionByZero)
            }
            return Ok(Dynamic::Float(l as f64/r as f64))
        }
        Op::Mod=>{
            if r==0{
                return Err(EvalError::DivisionByZero)
            }
            if r==-1{
                return Ok(Dynamic::Integer(0))
            }
            l.checked_rem(r).map(|m|if m!=0&&(m<0)!=(r<0){m+r}else{m})
        }
        Op::Pow=>{
            if r<0{
                if l==0{
                    return Err(EvalError::DivisionByZero)
                }
                return Ok(Dynamic::Float((l as f64).powf(r as f64)))
            }
            match l {
                0|1=>Some(if r==0{1}else{l}),
                -1=>Some(if r%2==0{1}else{-1}),
                _=>u32::try_from(r).ok().and_then(|e|l.checked_pow(e))
            }
        }
    };
    result.map(Dynamic::Integer).ok_or(EvalError::Overflow{op,left:l,right:r})
}

fn float_op(op:Op,l:f64,r:f64)->EvalResult<f64>{
    match op {
        Op::Plus=>Ok(l+r),
        Op::Minus=>Ok(l-r),
        Op::Mul=>Ok(l*r),
        Op::Div=>{
            if r==0.0{
                return Err(EvalError::DivisionByZero)
            }
            Ok(l/r)
        }
        Op::Mod=>{
            if r==0.0{
                return Err(EvalError::DivisionByZero)
            }
            let m=l%r;
            Ok(if m!=0.0&&(m<0.0)!=(r<0.0){m+r}else{m})
        }
        Op::Pow=>{
            if l==0.0&&r<0.0{
                return Err(EvalError::DivisionByZero)
            }
            Ok(l.powf(r))
        }
    }
}
