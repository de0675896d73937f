use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use crate::v1::builtin;
use crate::v1::interpreter::{EvalError, EvalResult};
use crate::v1::types::{sorted_entries, Dynamic};

/// Root key of the builtin namespace. `$` never starts an identifier token,
/// so no user path can reach or overwrite it.
pub const BUILTIN_NAMESPACE:&str="$builtins";

/// The single global store every identifier read and assignment write goes through.
#[derive(Debug,Clone)]
pub struct Memory{
    root:Dynamic
}

impl Default for Memory {
    fn default() -> Self {
        let mut map=HashMap::new();
        map.insert(Dynamic::from(BUILTIN_NAMESPACE),builtin::namespace());
        Self{root:Dynamic::Map(map)}
    }
}

impl Memory {
    pub fn new()->Self{
        Self::default()
    }
    pub fn builtin(&self,name:&str)->Option<&Dynamic>{
        let namespace=step(&self.root,&Dynamic::from(BUILTIN_NAMESPACE)).ok()?;
        namespace.as_map()?.get(&Dynamic::from(name))
    }
    /// Follows `keys` from the root; every key must already exist.
    pub fn resolve(&self,keys:&[Dynamic])->EvalResult<&Dynamic>{
        walk(&self.root,keys)
    }
    /// Writes `value` at `key` inside the container addressed by `parents`
    /// and returns what the slot held before, `Unit` if it was empty.
    /// Only the final key of a mapping is created on demand.
    pub fn write(&mut self,parents:&[Dynamic],key:Dynamic,value:Dynamic)->EvalResult<Dynamic>{
        let mut cursor=&mut self.root;
        for k in parents{
            cursor=step_mut(cursor,k)?;
        }
        match cursor {
            Dynamic::Map(m)=>{
                if !key.is_hashable(){
                    return Err(EvalError::Unhashable(key.type_name()))
                }
                Ok(m.insert(key,value).unwrap_or(Dynamic::Unit))
            }
            Dynamic::Array(v)=>{
                let i=index(&key,v.len())?;
                Ok(std::mem::replace(&mut v[i],value))
            }
            other=>Err(EvalError::NotIndexable(other.type_name()))
        }
    }
    /// Root-level variable, used to pre-seed memory before a run.
    pub fn define(&mut self,name:&str,value:Dynamic)->EvalResult<Dynamic>{
        self.write(&[],Dynamic::from(name),value)
    }
    pub fn get(&self,name:&str)->Option<&Dynamic>{
        self.resolve(&[Dynamic::from(name)]).ok()
    }
    /// User variables, builtin namespace excluded, in display order.
    pub fn variables(&self)->Vec<(&Dynamic,&Dynamic)>{
        let Some(map)=self.root.as_map() else {
            return vec![]
        };
        sorted_entries(map).into_iter()
            .filter(|(k,_)|**k!=Dynamic::from(BUILTIN_NAMESPACE))
            .collect()
    }
}

impl Display for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let user:HashMap<Dynamic,Dynamic>=self.variables().into_iter()
            .map(|(k,v)|(k.clone(),v.clone()))
            .collect();
        write!(f,"{}",Dynamic::Map(user))
    }
}

/// Steps one key into a container value.
pub fn step<'a>(container:&'a Dynamic,key:&Dynamic)->EvalResult<&'a Dynamic>{
    match container {
        Dynamic::Map(m)=>{
            if !key.is_hashable(){
                return Err(EvalError::Unhashable(key.type_name()))
            }
            m.get(key).ok_or_else(||EvalError::KeyNotFound(key.to_string()))
        }
        Dynamic::Array(v)=>Ok(&v[index(key,v.len())?]),
        other=>Err(EvalError::NotIndexable(other.type_name()))
    }
}

fn step_mut<'a>(container:&'a mut Dynamic,key:&Dynamic)->EvalResult<&'a mut Dynamic>{
    match container {
        Dynamic::Map(m)=>{
            if !key.is_hashable(){
                return Err(EvalError::Unhashable(key.type_name()))
            }
            m.get_mut(key).ok_or_else(||EvalError::KeyNotFound(key.to_string()))
        }
        Dynamic::Array(v)=>{
            let i=index(key,v.len())?;
            Ok(&mut v[i])
        }
        other=>Err(EvalError::NotIndexable(other.type_name()))
    }
}

pub fn walk<'a>(root:&'a Dynamic,keys:&[Dynamic])->EvalResult<&'a Dynamic>{
    keys.iter().try_fold(root,|cursor,key|step(cursor,key))
}

/// Sequence indices are non-negative integers below the length.
fn index(key:&Dynamic,len:usize)->EvalResult<usize>{
    let Dynamic::Integer(i)=key else {
        return Err(EvalError::NonIntegerIndex(key.type_name()))
    };
    usize::try_from(*i).ok()
        .filter(|i|*i<len)
        .ok_or(EvalError::IndexOutOfBounds{index:*i,len})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded()->Memory{
        let mut memory=Memory::new();
        memory.define("a",Dynamic::Array(vec![Dynamic::Integer(1),Dynamic::Integer(2),Dynamic::Integer(3)])).unwrap();
        let mut obj=HashMap::new();
        obj.insert(Dynamic::from("b"),Dynamic::Integer(5));
        memory.define("o",Dynamic::Map(obj)).unwrap();
        memory
    }

    #[test]
    fn resolve_steps_through_containers(){
        let memory=seeded();
        assert_eq!(memory.resolve(&["a".into(),Dynamic::Integer(1)]).unwrap(),&Dynamic::Integer(2));
        assert_eq!(memory.resolve(&["o".into(),"b".into()]).unwrap(),&Dynamic::Integer(5));
    }

    #[test]
    fn resolve_failures_are_distinct(){
        let memory=seeded();
        assert!(matches!(memory.resolve(&["missing".into()]),Err(EvalError::KeyNotFound(k)) if k == "missing"));
        assert!(matches!(
            memory.resolve(&["a".into(),Dynamic::Integer(5)]),
            Err(EvalError::IndexOutOfBounds{index:5,len:3})
        ));
        assert!(matches!(memory.resolve(&["a".into(),Dynamic::Integer(-1)]),Err(EvalError::IndexOutOfBounds{..})));
        assert!(matches!(memory.resolve(&["a".into(),"x".into()]),Err(EvalError::NonIntegerIndex("String"))));
        assert!(matches!(memory.resolve(&["o".into(),"b".into(),Dynamic::Integer(0)]),Err(EvalError::NotIndexable("Integer"))));
    }

    #[test]
    fn write_returns_previous_value(){
        let mut memory=seeded();
        let old=memory.write(&["a".into()],Dynamic::Integer(0),Dynamic::Integer(10)).unwrap();
        assert_eq!(old,Dynamic::Integer(1));
        let old=memory.write(&["o".into()],"c".into(),Dynamic::Integer(7)).unwrap();
        assert_eq!(old,Dynamic::Unit);
        assert_eq!(memory.resolve(&["o".into(),"c".into()]).unwrap(),&Dynamic::Integer(7));
    }

    #[test]
    fn write_never_creates_parents_or_grows_arrays(){
        let mut memory=seeded();
        assert!(matches!(memory.write(&["x".into()],"b".into(),Dynamic::Integer(1)),Err(EvalError::KeyNotFound(_))));
        assert!(matches!(memory.write(&["a".into()],Dynamic::Integer(3),Dynamic::Integer(1)),Err(EvalError::IndexOutOfBounds{..})));
        assert!(matches!(
            memory.write(&["o".into()],Dynamic::Array(vec![]),Dynamic::Integer(1)),
            Err(EvalError::Unhashable("Array"))
        ));
    }

    #[test]
    fn builtins_are_hidden_from_variables(){
        let memory=seeded();
        assert!(memory.builtin("print").is_some());
        assert!(memory.get(BUILTIN_NAMESPACE).is_some());
        assert_eq!(memory.variables().len(),2);
        assert_eq!(memory.to_string(),r#"{"a": [1, 2, 3], "o": {"b": 5}}"#);
    }
}
