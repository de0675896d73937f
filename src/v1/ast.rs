use std::fmt::{Display, Formatter};
use thiserror::Error;
use crate::v1::token::TokenKind;

#[derive(Debug,Clone,PartialEq,Error)]
pub enum StructuralError{
    #[error("object key must be a number, string or boolean literal, got {0}")]
    NonLiteralKey(String),
    #[error("address element must be a literal, identifier or function call, got {0}")]
    InvalidAddressElement(String),
    #[error("identifier must have at least one address element")]
    EmptyAddress,
    #[error("cannot assign value to non-identifier: {0}")]
    NotAssignable(String),
    #[error("{0} is not an arithmetic operator")]
    NotArithmetic(TokenKind),
}

/// Arithmetic operators of a [`BinaryOperation`].
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Op{
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Pow
}

impl Op {
    /// Maps arithmetic, compound-assignment and unary tokens onto their operator.
    pub fn from_token(kind:TokenKind)->Result<Op,StructuralError>{
        match kind {
            TokenKind::Plus|TokenKind::AdditionAssign|TokenKind::Increment=>Ok(Op::Plus),
            TokenKind::Minus|TokenKind::SubtractionAssign|TokenKind::Decrement=>Ok(Op::Minus),
            TokenKind::Multiply|TokenKind::MultiplicationAssign=>Ok(Op::Mul),
            TokenKind::Divide|TokenKind::DivisionAssign=>Ok(Op::Div),
            TokenKind::Modulus|TokenKind::ModulusAssign=>Ok(Op::Mod),
            TokenKind::Exponent|TokenKind::ExponentAssign=>Ok(Op::Pow),
            k=>Err(StructuralError::NotArithmetic(k))
        }
    }
    pub fn symbol(&self)->&'static str{
        match self {
            Op::Plus => "+",
            Op::Minus => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::Pow => "**",
        }
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f,"{}",self.symbol())
    }
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum ReturnMode{
    /// Yield the value held before the write (post-increment).
    Before,
    /// Yield the value written.
    After
}

#[derive(Debug,Clone,PartialEq)]
pub enum Node{
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Identifier(Identifier),
    FunctionCall(FunctionCall),
    Array(Vec<Node>),
    Object(Object),
    BinaryOperation(BinaryOperation),
    Assign(Assign)
}

impl Node {
    pub fn is_primitive(&self)->bool{
        matches!(self,Node::Integer(_)|Node::Float(_)|Node::String(_)|Node::Boolean(_))
    }
    pub fn type_name(&self)->&'static str{
        match self {
            Node::Integer(_)|Node::Float(_) => "Number",
            Node::String(_) => "String",
            Node::Boolean(_) => "Boolean",
            Node::Identifier(_) => "Identifier",
            Node::FunctionCall(_) => "FunctionCall",
            Node::Array(_) => "Array",
            Node::Object(_) => "Object",
            Node::BinaryOperation(_) => "BinaryOperation",
            Node::Assign(_) => "Assign",
        }
    }
}

impl From<Identifier> for Node {
    fn from(value: Identifier) -> Self {
        Node::Identifier(value)
    }
}

/// A path into memory. Each element evaluates to a mapping key or a sequence index.
#[derive(Debug,Clone,PartialEq)]
pub struct Identifier{
    address:Vec<Node>
}

impl Identifier {
    pub fn new(address:Vec<Node>)->Result<Self,StructuralError>{
        if address.is_empty(){
            return Err(StructuralError::EmptyAddress)
        }
        for a in &address{
            if !a.is_primitive()&&!matches!(a,Node::Identifier(_)|Node::FunctionCall(_)){
                return Err(StructuralError::InvalidAddressElement(a.type_name().into()))
            }
        }
        Ok(Self{address})
    }
    #[cfg(test)]
    pub fn named(name:impl Into<String>)->Self{
        Self{address:vec![Node::String(name.into())]}
    }
    pub fn address(&self)->&[Node]{
        &self.address
    }
    /// A chain starting with a call reads from the call's result, not from memory.
    pub fn is_addressable(&self)->bool{
        !matches!(self.address.first(),Some(Node::FunctionCall(_)))
    }
    /// The plain name of a single-segment path such as `print`.
    pub fn simple_name(&self)->Option<&str>{
        match self.address.as_slice() {
            [Node::String(s)]=>Some(s.as_str()),
            _=>None
        }
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct FunctionCall{
    pub identifier:Identifier,
    pub args:Vec<Node>
}

#[derive(Debug,Clone,PartialEq,Default)]
pub struct Object{
    properties:Vec<(Node,Node)>
}

impl Object {
    pub fn new(properties:Vec<(Node,Node)>)->Result<Self,StructuralError>{
        for (key,_) in &properties{
            if !key.is_primitive(){
                return Err(StructuralError::NonLiteralKey(key.type_name().into()))
            }
        }
        Ok(Self{properties})
    }
    pub fn properties(&self)->&[(Node,Node)]{
        &self.properties
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct BinaryOperation{
    pub op:Op,
    pub left:Box<Node>,
    pub right:Box<Node>
}

impl BinaryOperation {
    pub fn new(kind:TokenKind,left:Node,right:Node)->Result<Self,StructuralError>{
        Ok(Self{op:Op::from_token(kind)?,left:Box::new(left),right:Box::new(right)})
    }
    /// `++`/`--` become `operand + 1` and `operand - 1`.
    pub fn unary(kind:TokenKind,operand:Node)->Result<Self,StructuralError>{
        if !kind.is_unary(){
            return Err(StructuralError::NotArithmetic(kind))
        }
        Self::new(kind,operand,Node::Integer(1))
    }
}

#[derive(Debug,Clone,PartialEq)]
pub struct Assign{
    identifier:Identifier,
    value:Box<Node>,
    return_mode:ReturnMode
}

impl Assign {
    pub fn new(target:Node,value:Node,return_mode:ReturnMode)->Result<Self,StructuralError>{
        match target {
            Node::Identifier(identifier) if identifier.is_addressable()=>{
                Ok(Self{identifier,value:Box::new(value),return_mode})
            }
            Node::Identifier(_)=>Err(StructuralError::NotAssignable("function call result".into())),
            other=>Err(StructuralError::NotAssignable(other.type_name().into()))
        }
    }
    pub fn identifier(&self)->&Identifier{
        &self.identifier
    }
    pub fn value(&self)->&Node{
        &self.value
    }
    pub fn return_mode(&self)->ReturnMode{
        self.return_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rejects_computed_elements(){
        let op=BinaryOperation::new(TokenKind::Plus,Node::Integer(1),Node::Integer(2)).unwrap();
        let err=Identifier::new(vec![Node::String("a".into()),Node::BinaryOperation(op)]).unwrap_err();
        assert!(matches!(err,StructuralError::InvalidAddressElement(_)));
        assert_eq!(Identifier::new(vec![]).unwrap_err(),StructuralError::EmptyAddress);
    }

    #[test]
    fn object_keys_must_be_literals(){
        let key=Node::Identifier(Identifier::named("k"));
        let err=Object::new(vec![(key,Node::Integer(1))]).unwrap_err();
        assert!(matches!(err,StructuralError::NonLiteralKey(_)));
        assert!(Object::new(vec![(Node::Boolean(true),Node::Integer(1))]).is_ok());
    }

    #[test]
    fn unary_normalizes_to_plus_or_minus_one(){
        let inc=BinaryOperation::unary(TokenKind::Increment,Identifier::named("a").into()).unwrap();
        assert_eq!(inc.op,Op::Plus);
        assert_eq!(*inc.right,Node::Integer(1));
        let dec=BinaryOperation::unary(TokenKind::Decrement,Identifier::named("a").into()).unwrap();
        assert_eq!(dec.op,Op::Minus);
        assert!(BinaryOperation::unary(TokenKind::Plus,Node::Integer(1)).is_err());
    }

    #[test]
    fn compound_assignment_tokens_map_to_operators(){
        assert_eq!(Op::from_token(TokenKind::ExponentAssign).unwrap(),Op::Pow);
        assert_eq!(Op::from_token(TokenKind::ModulusAssign).unwrap(),Op::Mod);
        assert!(Op::from_token(TokenKind::Assign).is_err());
    }

    #[test]
    fn assign_requires_addressable_identifier(){
        assert!(Assign::new(Node::Integer(1),Node::Integer(2),ReturnMode::After).is_err());
        let call=FunctionCall{identifier:Identifier::named("print"),args:vec![]};
        let chained=Identifier::new(vec![Node::FunctionCall(call)]).unwrap();
        assert!(Assign::new(chained.into(),Node::Integer(2),ReturnMode::After).is_err());
        assert!(Assign::new(Identifier::named("a").into(),Node::Integer(2),ReturnMode::After).is_ok());
    }
}
