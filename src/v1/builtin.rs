use std::collections::HashMap;
use std::io::Write;
use crate::v1::interpreter::{EvalError, EvalResult, Interpreter};
use crate::v1::types::{Dynamic, NativeFn};

/// Builtins stored under the reserved root key of memory.
pub fn namespace()->Dynamic{
    let mut map=HashMap::new();
    for f in [NativeFn{name:"print",func:print}]{
        map.insert(Dynamic::from(f.name),Dynamic::Native(f));
    }
    Dynamic::Map(map)
}

/// Writes its arguments and hands them back unchanged.
pub fn print(interpreter:&mut Interpreter,mut args:Vec<Dynamic>)->EvalResult<Dynamic>{
    let line=args.iter().map(|a|a.to_string()).collect::<Vec<_>>().join(" ");
    writeln!(interpreter.output(),"{line}").map_err(|e|EvalError::Output(e.to_string()))?;
    Ok(match args.len() {
        0=>Dynamic::Unit,
        1=>args.remove(0),
        _=>Dynamic::Array(args)
    })
}
