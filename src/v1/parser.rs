use std::mem;
use log::{debug, warn};
use thiserror::Error;
use crate::v1::ast::{Assign, BinaryOperation, FunctionCall, Identifier, Node, Object, ReturnMode, StructuralError};
use crate::v1::lexer::{LexError, Lexer};
use crate::v1::position::Position;
use crate::v1::token::{Token, TokenKind, TokenValue};

pub type ParseResult<T>=Result<T,ParseError>;

/// Nesting limit for sub-expressions, keeps recursion off the end of the stack.
pub const MAX_DEPTH:usize=128;

#[derive(Debug,Clone,PartialEq,Error)]
pub enum ParseError{
    #[error("expected {expected}, got {found}")]
    UnexpectedToken{expected:String,found:TokenKind,pos:Position},
    #[error("unexpected identifier '{name}'")]
    UnexpectedIdentifier{name:String,pos:Position},
    #[error("unexpected double dot")]
    DoubleDot{pos:Position},
    #[error("unexpected dot at the end of identifier")]
    TrailingDot{pos:Position},
    #[error("expected end of line, got {found}")]
    ExpectedEndOfLine{found:TokenKind,pos:Position},
    #[error("expression nested too deeply")]
    TooDeep{pos:Position},
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

impl ParseError {
    pub fn position(&self)->Option<Position>{
        match self {
            ParseError::UnexpectedToken{pos,..}
            |ParseError::UnexpectedIdentifier{pos,..}
            |ParseError::DoubleDot{pos}
            |ParseError::TrailingDot{pos}
            |ParseError::ExpectedEndOfLine{pos,..}
            |ParseError::TooDeep{pos}=>Some(*pos),
            ParseError::Lex(e)=>Some(e.position()),
            ParseError::Structural(_)=>None
        }
    }
}

/// Recursive-descent parser holding exactly one token of lookahead.
///
/// Precedence, lowest first: assignment, `+ -`, `* / %`, `**`, primary.
/// All binary levels associate to the left, `**` included.
pub struct Parser{
    lexer:Lexer,
    current_token:Token,
    depth:usize
}

impl Parser{
    pub fn new(mut lexer:Lexer)->ParseResult<Self>{
        let current_token=lexer.next_token()?;
        Ok(Self{lexer,current_token,depth:0})
    }
    pub fn from_script(script:impl AsRef<str>)->ParseResult<Self>{
        Self::new(Lexer::from_script(script))
    }
    pub fn parse(&mut self)->ParseResult<Vec<Node>>{
        let mut ast=vec![];
        while self.current_token.kind!=TokenKind::EOF{
            if self.current_token.kind.is_end_line(){
                self.eat(self.current_token.kind)?;
                continue
            }
            if let Some(stmt)=self.statement()?{
                debug!("parsed statement {}",ast.len());
                ast.push(stmt);
            }
        }
        Ok(ast)
    }
    fn eat(&mut self,kind:TokenKind)->ParseResult<Token>{
        if self.current_token.kind!=kind{
            return Err(ParseError::UnexpectedToken{
                expected:kind.to_string(),
                found:self.current_token.kind,
                pos:self.current_token.pos
            })
        }
        let next=self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current_token,next))
    }
    fn statement(&mut self)->ParseResult<Option<Node>>{
        if self.current_token.kind.is_reserved(){
            self.skip_reserved()?;
            return Ok(None)
        }
        let expression=self.expr()?;
        if (expression.is_primitive()||matches!(expression,Node::BinaryOperation(_)))
            &&!self.current_token.kind.is_end_line(){
            return Err(ParseError::ExpectedEndOfLine{found:self.current_token.kind,pos:self.current_token.pos})
        }
        Ok(Some(expression))
    }
    /// Control flow and function definitions are not implemented; the
    /// statement is consumed up to its terminator and dropped.
    fn skip_reserved(&mut self)->ParseResult<()>{
        warn!("reserved keyword {} is not implemented, statement skipped",self.current_token.kind);
        while !self.current_token.kind.is_end_line(){
            self.eat(self.current_token.kind)?;
        }
        Ok(())
    }
    /// Every nested sub-expression enters here, so this is where depth is counted.
    fn expr(&mut self)->ParseResult<Node>{
        if self.depth>=MAX_DEPTH{
            return Err(ParseError::TooDeep{pos:self.current_token.pos})
        }
        self.depth+=1;
        let node=self.assignment();
        self.depth-=1;
        node
    }
    fn assignment(&mut self)->ParseResult<Node>{
        let mut node=self.term()?;
        while matches!(self.current_token.kind,TokenKind::Plus|TokenKind::Minus){
            let kind=self.eat(self.current_token.kind)?.kind;
            let right=self.term()?;
            node=Node::BinaryOperation(BinaryOperation::new(kind,node,right)?);
        }
        if self.current_token.kind.is_assignment(){
            let kind=self.eat(self.current_token.kind)?.kind;
            let value=self.expr()?;
            let value=if kind==TokenKind::Assign{
                value
            }else{
                Node::BinaryOperation(BinaryOperation::new(kind,node.clone(),value)?)
            };
            return Ok(Node::Assign(Assign::new(node,value,ReturnMode::After)?))
        }
        Ok(node)
    }
    fn term(&mut self)->ParseResult<Node>{
        let mut node=self.exponent()?;
        while matches!(self.current_token.kind,TokenKind::Multiply|TokenKind::Divide|TokenKind::Modulus){
            let kind=self.eat(self.current_token.kind)?.kind;
            let right=self.exponent()?;
            node=Node::BinaryOperation(BinaryOperation::new(kind,node,right)?);
        }
        Ok(node)
    }
    fn exponent(&mut self)->ParseResult<Node>{
        let mut node=self.factor()?;
        while self.current_token.kind==TokenKind::Exponent{
            self.eat(TokenKind::Exponent)?;
            let right=self.factor()?;
            node=Node::BinaryOperation(BinaryOperation::new(TokenKind::Exponent,node,right)?);
        }
        Ok(node)
    }
    fn factor(&mut self)->ParseResult<Node>{
        match self.current_token.kind {
            TokenKind::Number=>{
                let token=self.eat(TokenKind::Number)?;
                match token.value {
                    TokenValue::Float(f)=>Ok(Node::Float(f)),
                    TokenValue::Integer(i)=>Ok(Node::Integer(i)),
                    _=>Err(ParseError::UnexpectedToken{expected:TokenKind::Number.to_string(),found:token.kind,pos:token.pos})
                }
            }
            TokenKind::String=>{
                let token=self.eat(TokenKind::String)?;
                match token.value {
                    TokenValue::String(s)=>Ok(Node::String(s)),
                    _=>Err(ParseError::UnexpectedToken{expected:TokenKind::String.to_string(),found:token.kind,pos:token.pos})
                }
            }
            TokenKind::Bool=>{
                let token=self.eat(TokenKind::Bool)?;
                match token.value {
                    TokenValue::Bool(b)=>Ok(Node::Boolean(b)),
                    _=>Err(ParseError::UnexpectedToken{expected:TokenKind::Bool.to_string(),found:token.kind,pos:token.pos})
                }
            }
            TokenKind::Identifier=>{
                let identifier=self.get_identity()?;
                if self.current_token.kind.is_unary(){
                    let kind=self.eat(self.current_token.kind)?.kind;
                    let value=BinaryOperation::unary(kind,identifier.clone().into())?;
                    return Ok(Node::Assign(Assign::new(identifier.into(),Node::BinaryOperation(value),ReturnMode::Before)?))
                }
                Ok(Node::Identifier(identifier))
            }
            TokenKind::Increment|TokenKind::Decrement=>{
                let kind=self.eat(self.current_token.kind)?.kind;
                let target=self.expr()?;
                let value=BinaryOperation::unary(kind,target.clone())?;
                Ok(Node::Assign(Assign::new(target,Node::BinaryOperation(value),ReturnMode::After)?))
            }
            TokenKind::LParen=>{
                self.eat(TokenKind::LParen)?;
                let expr=self.expr()?;
                self.eat(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket=>self.array(),
            TokenKind::LCurly=>self.object(),
            _=>Err(self.unexpected("expression",&self.current_token))
        }
    }
    fn unexpected(&self,expected:&str,token:&Token)->ParseError{
        ParseError::UnexpectedToken{expected:expected.into(),found:token.kind,pos:token.pos}
    }
    /// Address-chain: identifier segments, `.`, `[expr]` and `(args)` fused
    /// into one path. A call wraps everything read so far and the chain then
    /// continues on the call's result.
    fn get_identity(&mut self)->ParseResult<Identifier>{
        let mut address=vec![];
        let mut dot=true;
        loop {
            match self.current_token.kind {
                TokenKind::Identifier=>{
                    let token=self.eat(TokenKind::Identifier)?;
                    let name=token.get_identifier_value().to_string();
                    if !dot{
                        return Err(ParseError::UnexpectedIdentifier{name,pos:token.pos})
                    }
                    address.push(Node::String(name));
                    dot=false;
                }
                TokenKind::Dot=>{
                    if dot{
                        return Err(ParseError::DoubleDot{pos:self.current_token.pos})
                    }
                    self.eat(TokenKind::Dot)?;
                    dot=true;
                }
                TokenKind::LBracket=>{
                    dot=false;
                    self.eat(TokenKind::LBracket)?;
                    let index=self.expr()?;
                    self.eat(TokenKind::RBracket)?;
                    address.push(index);
                }
                TokenKind::LParen=>{
                    dot=false;
                    self.eat(TokenKind::LParen)?;
                    let args=if self.current_token.kind!=TokenKind::RParen{self.args()?}else{vec![]};
                    self.eat(TokenKind::RParen)?;
                    let identifier=Identifier::new(mem::take(&mut address))?;
                    address.push(Node::FunctionCall(FunctionCall{identifier,args}));
                }
                _=>break
            }
        }
        if dot{
            return Err(ParseError::TrailingDot{pos:self.current_token.pos})
        }
        Ok(Identifier::new(address)?)
    }
    fn args(&mut self)->ParseResult<Vec<Node>>{
        let mut args=vec![self.expr()?];
        while self.current_token.kind==TokenKind::Comma{
            self.eat(TokenKind::Comma)?;
            args.push(self.expr()?);
        }
        Ok(args)
    }
    fn array(&mut self)->ParseResult<Node>{
        self.eat(TokenKind::LBracket)?;
        let mut elements=vec![];
        while self.current_token.kind!=TokenKind::RBracket{
            elements.push(self.expr()?);
            if self.current_token.kind!=TokenKind::Comma{
                break
            }
            self.eat(TokenKind::Comma)?;
        }
        self.eat(TokenKind::RBracket)?;
        Ok(Node::Array(elements))
    }
    fn object(&mut self)->ParseResult<Node>{
        self.eat(TokenKind::LCurly)?;
        let mut properties=vec![];
        while self.current_token.kind!=TokenKind::RCurly{
            let key=self.expr()?;
            self.eat(TokenKind::Colon)?;
            let value=self.expr()?;
            properties.push((key,value));
            if self.current_token.kind!=TokenKind::Comma{
                break
            }
            self.eat(TokenKind::Comma)?;
        }
        self.eat(TokenKind::RCurly)?;
        Ok(Node::Object(Object::new(properties)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v1::ast::Op;

    fn parse(source:&str)->ParseResult<Vec<Node>>{
        Parser::from_script(source)?.parse()
    }

    fn binary(op:Op,left:Node,right:Node)->Node{
        Node::BinaryOperation(BinaryOperation{op,left:Box::new(left),right:Box::new(right)})
    }

    #[test]
    fn multiplication_binds_tighter_than_addition(){
        let ast=parse("2 + 3 * 4").unwrap();
        let expected=binary(
            Op::Plus,
            Node::Integer(2),
            binary(Op::Mul,Node::Integer(3),Node::Integer(4)),
        );
        assert_eq!(ast,vec![expected]);
    }

    #[test]
    fn exponent_chains_left_to_right(){
        let ast=parse("2 ** 3 ** 2").unwrap();
        let expected=binary(
            Op::Pow,
            binary(Op::Pow,Node::Integer(2),Node::Integer(3)),
            Node::Integer(2),
        );
        assert_eq!(ast,vec![expected]);
    }

    #[test]
    fn address_chain_with_call_in_the_middle(){
        let ast=parse("a.b[0](x).c").unwrap();
        let Node::Identifier(outer)=&ast[0] else{panic!("expected identifier, got {:?}",ast[0])};
        let [Node::FunctionCall(call),Node::String(c)]=outer.address() else {
            panic!("unexpected address {:?}",outer.address())
        };
        assert_eq!(c,"c");
        assert_eq!(
            call.identifier.address(),
            &[Node::String("a".into()),Node::String("b".into()),Node::Integer(0)]
        );
        assert_eq!(call.args,vec![Node::Identifier(Identifier::named("x"))]);
    }

    #[test]
    fn chain_errors(){
        assert!(matches!(parse("a..b"),Err(ParseError::DoubleDot{..})));
        assert!(matches!(parse("a."),Err(ParseError::TrailingDot{..})));
        assert!(matches!(parse("a[0]b"),Err(ParseError::UnexpectedIdentifier{..})));
        assert!(matches!(parse("a[1 + 1]"),Err(ParseError::Structural(_))));
    }

    #[test]
    fn post_increment_yields_old_value(){
        let ast=parse("a++").unwrap();
        let Node::Assign(assign)=&ast[0] else{panic!("expected assign")};
        assert_eq!(assign.return_mode(),ReturnMode::Before);
        assert_eq!(
            assign.value(),
            &binary(Op::Plus,Identifier::named("a").into(),Node::Integer(1))
        );
    }

    #[test]
    fn pre_decrement_yields_new_value(){
        let ast=parse("--a.b").unwrap();
        let Node::Assign(assign)=&ast[0] else{panic!("expected assign")};
        assert_eq!(assign.return_mode(),ReturnMode::After);
        let Node::BinaryOperation(op)=assign.value() else{panic!("expected operation")};
        assert_eq!(op.op,Op::Minus);
        assert!(matches!(parse("++1"),Err(ParseError::Structural(StructuralError::NotAssignable(_)))));
    }

    #[test]
    fn compound_assignment_builds_operation(){
        let ast=parse("a **= 2").unwrap();
        let Node::Assign(assign)=&ast[0] else{panic!("expected assign")};
        assert_eq!(
            assign.value(),
            &binary(Op::Pow,Identifier::named("a").into(),Node::Integer(2))
        );
    }

    #[test]
    fn assignment_target_must_be_identifier(){
        let err=parse("1 + a = 2").unwrap_err();
        assert!(matches!(err,ParseError::Structural(StructuralError::NotAssignable(_))));
        assert!(matches!(parse("print(1) = 2"),Err(ParseError::Structural(_))));
    }

    #[test]
    fn literals_and_trailing_commas(){
        let ast=parse("{1: 2, 'b': {1: 22},}; [1, true, 'x',]; []; {}").unwrap();
        assert_eq!(ast.len(),4);
        let Node::Object(obj)=&ast[0] else{panic!("expected object")};
        assert_eq!(obj.properties().len(),2);
        assert_eq!(ast[1],Node::Array(vec![Node::Integer(1),Node::Boolean(true),Node::String("x".into())]));
        assert!(matches!(parse("{a: 1}"),Err(ParseError::Structural(StructuralError::NonLiteralKey(_)))));
    }

    #[test]
    fn reserved_keywords_produce_nothing(){
        assert_eq!(parse("while").unwrap(),vec![]);
        assert_eq!(parse("if a b c; x").unwrap(),vec![Node::Identifier(Identifier::named("x"))]);
        assert_eq!(parse("return 1; fn; break; continue; else").unwrap(),vec![]);
    }

    #[test]
    fn literal_statement_needs_terminator(){
        assert!(matches!(parse("1 2"),Err(ParseError::ExpectedEndOfLine{..})));
        assert_eq!(parse("a = 1\nb = 2").unwrap().len(),2);
        assert_eq!(parse(";;1;;").unwrap(),vec![Node::Integer(1)]);
    }

    #[test]
    fn deep_nesting_is_rejected(){
        let parens=format!("{}1{}","(".repeat(10_000),")".repeat(10_000));
        assert!(matches!(parse(&parens),Err(ParseError::TooDeep{..})));
        assert!(matches!(parse(&"[".repeat(10_000)),Err(ParseError::TooDeep{..})));
        let fits=format!("{}1{}","(".repeat(MAX_DEPTH - 1),")".repeat(MAX_DEPTH - 1));
        assert_eq!(parse(&fits).unwrap(),vec![Node::Integer(1)]);
    }

    #[test]
    fn eat_mismatch_names_both_kinds(){
        let err=parse("(1 + 2").unwrap_err();
        assert_eq!(err.to_string(),"expected RPAREN, got EOF");
        let err=parse("* 2").unwrap_err();
        assert_eq!(err.to_string(),"expected expression, got MULTIPLY");
    }

    #[test]
    fn lex_errors_surface_through_parse(){
        assert!(matches!(parse("a = #"),Err(ParseError::Lex(LexError::UnexpectedChar{ch:'#',..}))));
    }
}
