use std::fmt::{Display, Formatter};
use crate::v1::position::Position;

/// Kind of a token, the contract between lexer and parser.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash)]
pub enum TokenKind{
    Identifier,
    Number,
    String,
    Bool,
    /// ==
    Equals,
    /// .
    Dot,
    /// ,
    Comma,
    /// :
    Colon,
    /// ;
    Semicolon,
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// {
    LCurly,
    /// }
    RCurly,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulus,
    /// **
    Exponent,
    /// ++
    Increment,
    /// --
    Decrement,
    Assign,
    AdditionAssign,
    SubtractionAssign,
    MultiplicationAssign,
    DivisionAssign,
    ModulusAssign,
    ExponentAssign,
    If,
    Else,
    While,
    Fn,
    Return,
    Break,
    Continue,
    Blank,
    EOF
}

impl TokenKind {
    pub fn name(&self)->&'static str{
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Bool => "BOOL",
            TokenKind::Equals => "EQUALS",
            TokenKind::Dot => "DOT",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LCurly => "LCURLY",
            TokenKind::RCurly => "RCURLY",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Multiply => "MULTIPLY",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Modulus => "MODULUS",
            TokenKind::Exponent => "EXPONENT",
            TokenKind::Increment => "INCREMENT",
            TokenKind::Decrement => "DECREMENT",
            TokenKind::Assign => "ASSIGN",
            TokenKind::AdditionAssign => "ADDITION_ASSIGN",
            TokenKind::SubtractionAssign => "SUBTRACTION_ASSIGN",
            TokenKind::MultiplicationAssign => "MULTIPLICATION_ASSIGN",
            TokenKind::DivisionAssign => "DIVISION_ASSIGN",
            TokenKind::ModulusAssign => "MODULUS_ASSIGN",
            TokenKind::ExponentAssign => "EXPONENT_ASSIGN",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Fn => "FN",
            TokenKind::Return => "RETURN",
            TokenKind::Break => "BREAK",
            TokenKind::Continue => "CONTINUE",
            TokenKind::Blank => "BLANK",
            TokenKind::EOF => "EOF",
        }
    }
    pub fn keyword(word:&str)->Option<TokenKind>{
        match word {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "fn" => Some(TokenKind::Fn),
            "return" => Some(TokenKind::Return),
            "break" => Some(TokenKind::Break),
            "continue" => Some(TokenKind::Continue),
            _ => None
        }
    }
    pub fn is_reserved(&self)->bool{
        matches!(self,TokenKind::If|TokenKind::Else|TokenKind::While|TokenKind::Fn
            |TokenKind::Return|TokenKind::Break|TokenKind::Continue)
    }
    pub fn is_unary(&self)->bool{
        matches!(self,TokenKind::Increment|TokenKind::Decrement)
    }
    pub fn is_end_line(&self)->bool{
        matches!(self,TokenKind::Semicolon|TokenKind::EOF)
    }
    pub fn is_assignment(&self)->bool{
        matches!(self,TokenKind::Assign|TokenKind::AdditionAssign|TokenKind::SubtractionAssign
            |TokenKind::MultiplicationAssign|TokenKind::DivisionAssign|TokenKind::ModulusAssign
            |TokenKind::ExponentAssign)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.name())
    }
}

/// Literal payload of a token.
#[derive(Debug,Clone,PartialEq)]
pub enum TokenValue{
    None,
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool)
}

#[derive(Debug,Clone,PartialEq)]
pub struct Token{
    pub kind:TokenKind,
    pub value:TokenValue,
    pub pos:Position
}

impl Token {
    pub fn new(kind:TokenKind,value:TokenValue,pos:Position)->Self{
        Self{kind,value,pos}
    }
    pub fn symbol(kind:TokenKind,pos:Position)->Self{
        Self{kind,value:TokenValue::None,pos}
    }
    pub fn eof(index:usize)->Self{
        Self::symbol(TokenKind::EOF,Position::with_pos(index))
    }
    pub fn get_identifier_value(&self)->&str{
        match &self.value {
            TokenValue::String(s) if self.kind==TokenKind::Identifier => s.as_str(),
            _ => ""
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            TokenValue::None => write!(f,"{}",self.kind),
            TokenValue::Integer(i) => write!(f,"{} {i}",self.kind),
            TokenValue::Float(x) => write!(f,"{} {x:?}",self.kind),
            TokenValue::String(s) => write!(f,"{} {s:?}",self.kind),
            TokenValue::Bool(b) => write!(f,"{} {b}",self.kind),
        }
    }
}
