use std::fs;
use std::io::{self, Write};
use std::path::Path;
use encoding_rs::{Encoding, UTF_8};
use log::info;
use crate::error::{ChainError, ChainResult};
use crate::patterns;
use crate::v1::ast::Node;
use crate::v1::interpreter::Interpreter;
use crate::v1::lexer::Lexer;
use crate::v1::memory::Memory;
use crate::v1::parser::Parser;
use crate::v1::token::Token;
use crate::v1::types::Dynamic;

#[derive(Debug,Clone,Copy)]
pub struct RunOptions{
    pub show_results:bool,
    pub show_memory:bool
}

impl Default for RunOptions {
    fn default() -> Self {
        Self{show_results:true,show_memory:true}
    }
}

/// One interpreter kept alive across compile/eval rounds, so later sources
/// see the memory left by earlier ones.
pub struct ChainEngine{
    interpreter:Interpreter,
    options:RunOptions
}

impl Default for ChainEngine {
    fn default() -> Self {
        ChainEngine::new(RunOptions::default())
    }
}

impl ChainEngine{
    pub fn new(options:RunOptions)->Self{
        Self::with_output(options,Box::new(io::stdout()))
    }
    pub fn with_output(options:RunOptions,output:Box<dyn Write>)->Self{
        Self{interpreter:Interpreter::with_output(vec![],output),options}
    }
    pub fn tokens(&self,source:impl AsRef<str>)->ChainResult<Vec<Token>>{
        Ok(Lexer::from_script(source).tokenize()?)
    }
    pub fn compile(&self,source:impl AsRef<str>)->ChainResult<Vec<Node>>{
        Ok(Parser::from_script(source)?.parse()?)
    }
    /// Compiles and runs `source`, then writes each result and the memory
    /// as the options ask.
    pub fn eval(&mut self,source:impl AsRef<str>)->ChainResult<Vec<Dynamic>>{
        let ast=self.compile(source)?;
        info!("running {} statements",ast.len());
        let results=self.interpreter.execute(&ast)?;
        let output=self.interpreter.output();
        if self.options.show_results{
            for r in &results{
                writeln!(output,"{r}")?;
            }
        }
        if self.options.show_memory{
            let memory=self.interpreter.memory().to_string();
            writeln!(self.interpreter.output(),"{memory}")?;
        }
        Ok(results)
    }
    pub fn define(&mut self,name:&str,value:Dynamic)->ChainResult<()>{
        if !patterns::is_valid_variable(name){
            return Err(ChainError::InvalidDefine(name.into()))
        }
        self.interpreter.memory_mut().define(name,value)?;
        Ok(())
    }
    /// Seeds memory from a `NAME=VALUE` command-line define.
    pub fn define_raw(&mut self,define:&str)->ChainResult<()>{
        let (name,value)=patterns::parse_define(define)?;
        self.define(&name,value)
    }
    pub fn memory(&self)->&Memory{
        self.interpreter.memory()
    }
}

/// Reads a script, honouring a byte order mark and defaulting to UTF-8.
pub fn read_source(path:impl AsRef<Path>)->ChainResult<String>{
    let path=path.as_ref();
    let bytes=fs::read(path)?;
    let (encoding,bom)=Encoding::for_bom(&bytes).unwrap_or((UTF_8,0));
    let (text,had_errors)=encoding.decode_without_bom_handling(&bytes[bom..]);
    if had_errors{
        return Err(ChainError::Encoding{path:path.display().to_string(),encoding:encoding.name()})
    }
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone,Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self,buf:&[u8])->io::Result<usize>{
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self)->io::Result<()>{
            Ok(())
        }
    }

    impl Captured {
        fn text(&self)->String{
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn engine(options:RunOptions)->(ChainEngine,Captured){
        let out=Captured::default();
        (ChainEngine::with_output(options,Box::new(out.clone())),out)
    }

    #[test]
    fn eval_prints_results_then_memory(){
        let (mut engine,out)=engine(RunOptions::default());
        engine.eval("a = [1, 'x']; a[1]").unwrap();
        assert_eq!(out.text(),"[1, \"x\"]\nx\n{\"a\": [1, \"x\"]}\n");
    }

    #[test]
    fn memory_persists_between_rounds(){
        let (mut engine,out)=engine(RunOptions{show_results:true,show_memory:false});
        engine.eval("a = 1").unwrap();
        engine.eval("a += 1").unwrap();
        assert_eq!(out.text(),"1\n2\n");
        assert_eq!(engine.memory().get("a"),Some(&Dynamic::Integer(2)));
    }

    #[test]
    fn print_output_precedes_results(){
        let (mut engine,out)=engine(RunOptions{show_results:false,show_memory:false});
        engine.eval("print('a', 1); print()").unwrap();
        assert_eq!(out.text(),"a 1\n\n");
    }

    #[test]
    fn defines_seed_memory(){
        let (mut engine,_)=engine(RunOptions::default());
        engine.define_raw("n=3").unwrap();
        assert_eq!(engine.eval("n * 2").unwrap(),vec![Dynamic::Integer(6)]);
        assert!(matches!(engine.define("$builtins",Dynamic::Unit),Err(ChainError::InvalidDefine(_))));
    }

    #[test]
    fn errors_convert_per_phase(){
        let (mut engine,_)=engine(RunOptions::default());
        assert!(matches!(engine.eval("'open"),Err(ChainError::Parse(_))));
        assert!(matches!(engine.eval("missing"),Err(ChainError::Eval(_))));
        assert!(matches!(engine.tokens("#"),Err(ChainError::Lex(_))));
    }

    #[test]
    fn source_files_decode_with_bom(){
        let dir=std::env::temp_dir();
        let utf16=dir.join("chainscript_bom_utf16.cs");
        let mut bytes=vec![0xFF,0xFE];
        for unit in "a = 1".encode_utf16(){
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        fs::write(&utf16,bytes).unwrap();
        assert_eq!(read_source(&utf16).unwrap(),"a = 1");
        let broken=dir.join("chainscript_broken_utf8.cs");
        fs::write(&broken,[b'a',0xFF,b'b']).unwrap();
        assert!(matches!(read_source(&broken),Err(ChainError::Encoding{..})));
        let _=fs::remove_file(utf16);
        let _=fs::remove_file(broken);
    }
}
