use log::trace;
use thiserror::Error;
use crate::v1::position::Position;
use crate::v1::token::{Token, TokenKind, TokenValue};

pub type LexResult<T>=Result<T,LexError>;

#[derive(Debug,Clone,PartialEq,Error)]
pub enum LexError{
    #[error("invalid character '{ch}'")]
    UnexpectedChar{ch:char,pos:Position},
    #[error("unterminated string literal")]
    UnterminatedString{pos:Position},
    #[error("invalid number literal '{literal}'")]
    InvalidNumber{literal:String,pos:Position},
}

impl LexError {
    pub fn position(&self)->Position{
        match self {
            LexError::UnexpectedChar{pos,..}=>*pos,
            LexError::UnterminatedString{pos}=>*pos,
            LexError::InvalidNumber{pos,..}=>*pos,
        }
    }
}

/// Pull-based scanner: every call to [`Lexer::next_token`] yields one token,
/// and once the input is exhausted it keeps yielding `EOF`.
#[derive(Debug,Clone)]
pub struct Lexer{
    chars:Vec<char>,
    index:usize,
}

impl Iterator for Lexer {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(t) if t.kind==TokenKind::EOF=>None,
            r=>Some(r)
        }
    }
}

impl Lexer{
    pub fn from_script(script:impl AsRef<str>)->Self{
        Self{ chars: script.as_ref().chars().collect(), index: 0 }
    }
    /// Scans the whole input, EOF included.
    pub fn tokenize(&mut self)->LexResult<Vec<Token>>{
        let mut v=vec![];
        loop {
            let token=self.next_token()?;
            let end=token.kind==TokenKind::EOF;
            v.push(token);
            if end{
                return Ok(v)
            }
        }
    }
    pub fn next_token(&mut self)->LexResult<Token>{
        let token=self.scan()?;
        trace!("token {token}");
        Ok(token)
    }
    fn scan(&mut self)->LexResult<Token>{
        while let Some(c)=self.current_char(){
            if c.is_whitespace(){
                self.increase_index();
                continue
            }
            let peek=self.peek_char().unwrap_or('\0');
            let start=self.index;
            return match (c,peek) {
                ('0'..='9',_)=>self.scan_number(),
                (c,_) if c.is_alphabetic()||c=='_'=>Ok(self.scan_identifier()),
                ('"'|'\'',_)=>self.scan_string(c),
                ('*','*')=>{
                    self.increase_index();
                    self.increase_index();
                    if self.current_char()==Some('='){
                        return Ok(self.symbol(TokenKind::ExponentAssign,start))
                    }
                    Ok(Token::symbol(TokenKind::Exponent,Position::new(start,2)))
                }
                ('*','=')=>self.pair(TokenKind::MultiplicationAssign),
                ('/','=')=>self.pair(TokenKind::DivisionAssign),
                ('%','=')=>self.pair(TokenKind::ModulusAssign),
                ('+','=')=>self.pair(TokenKind::AdditionAssign),
                ('+','+')=>self.pair(TokenKind::Increment),
                ('-','=')=>self.pair(TokenKind::SubtractionAssign),
                ('-','-')=>self.pair(TokenKind::Decrement),
                ('=','=')=>self.pair(TokenKind::Equals),
                ('=',_)=>self.single(TokenKind::Assign),
                ('+',_)=>self.single(TokenKind::Plus),
                ('-',_)=>self.single(TokenKind::Minus),
                ('*',_)=>self.single(TokenKind::Multiply),
                ('/',_)=>self.single(TokenKind::Divide),
                ('%',_)=>self.single(TokenKind::Modulus),
                ('.',_)=>self.single(TokenKind::Dot),
                (',',_)=>self.single(TokenKind::Comma),
                (':',_)=>self.single(TokenKind::Colon),
                (';',_)=>self.single(TokenKind::Semicolon),
                ('(',_)=>self.single(TokenKind::LParen),
                (')',_)=>self.single(TokenKind::RParen),
                ('[',_)=>self.single(TokenKind::LBracket),
                (']',_)=>self.single(TokenKind::RBracket),
                ('{',_)=>self.single(TokenKind::LCurly),
                ('}',_)=>self.single(TokenKind::RCurly),
                (ch,_)=>Err(LexError::UnexpectedChar{ch,pos:Position::new(start,1)})
            }
        }
        Ok(Token::eof(self.chars.len()))
    }
    fn single(&mut self,kind:TokenKind)->LexResult<Token>{
        let start=self.index;
        self.increase_index();
        Ok(Token::symbol(kind,Position::new(start,1)))
    }
    fn pair(&mut self,kind:TokenKind)->LexResult<Token>{
        let start=self.index;
        self.increase_index();
        Ok(self.symbol(kind,start))
    }
    /// Consumes the current char and closes a token that began at `start`.
    fn symbol(&mut self,kind:TokenKind,start:usize)->Token{
        self.increase_index();
        Token::symbol(kind,Position::new(start,self.index-start))
    }
    fn peek_char(&self)->Option<char>{
        self.chars.get(self.index+1).copied()
    }
    fn current_char(&self)->Option<char>{
        self.chars.get(self.index).copied()
    }
    fn increase_index(&mut self){
        self.index+=1;
    }
    fn scan_number(&mut self)->LexResult<Token>{
        let mut v=String::new();
        let mut pos=Position::with_pos(self.index);
        let mut is_decimal=false;
        while let Some(c)=self.current_char(){
            if c=='.'&&!is_decimal{
                is_decimal=true;
            }else if !c.is_ascii_digit(){
                break
            }
            v.push(c);
            self.increase_index();
        }
        pos.set_span(v.chars().count());
        if is_decimal{
            return match v.parse::<f64>() {
                Ok(f)=>Ok(Token::new(TokenKind::Number,TokenValue::Float(f),pos)),
                Err(_)=>Err(LexError::InvalidNumber{literal:v,pos})
            }
        }
        match v.parse::<i64>() {
            Ok(i)=>Ok(Token::new(TokenKind::Number,TokenValue::Integer(i),pos)),
            Err(_)=>Err(LexError::InvalidNumber{literal:v,pos})
        }
    }
    fn scan_identifier(&mut self)->Token{
        let mut v=String::new();
        let mut pos=Position::with_pos(self.index);
        while let Some(c)=self.current_char(){
            if !c.is_alphanumeric()&&c!='_'{
                break
            }
            v.push(c);
            self.increase_index();
        }
        pos.set_span(v.chars().count());
        if let Some(kind)=TokenKind::keyword(v.as_str()){
            return Token::new(kind,TokenValue::String(v),pos)
        }
        match v.as_str() {
            "true"=>Token::new(TokenKind::Bool,TokenValue::Bool(true),pos),
            "false"=>Token::new(TokenKind::Bool,TokenValue::Bool(false),pos),
            _=>Token::new(TokenKind::Identifier,TokenValue::String(v),pos)
        }
    }
    fn scan_string(&mut self,quote:char)->LexResult<Token>{
        let start=self.index;
        let mut v=String::new();
        self.increase_index();
        loop {
            match self.current_char() {
                None=>return Err(LexError::UnterminatedString{pos:Position::new(start,self.index-start)}),
                Some(c) if c==quote=>{
                    self.increase_index();
                    break
                }
                Some('\\')=>{
                    self.increase_index();
                    let Some(escaped)=self.current_char() else {
                        return Err(LexError::UnterminatedString{pos:Position::new(start,self.index-start)})
                    };
                    match escaped {
                        'n'=>v.push('\n'),
                        't'=>v.push('\t'),
                        'r'=>v.push('\r'),
                        '0'=>v.push('\0'),
                        '\\'|'\''|'"'=>v.push(escaped),
                        other=>{
                            v.push('\\');
                            v.push(other);
                        }
                    }
                    self.increase_index();
                }
                Some(c)=>{
                    v.push(c);
                    self.increase_index();
                }
            }
        }
        Ok(Token::new(TokenKind::String,TokenValue::String(v),Position::new(start,self.index-start)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source:&str)->Vec<TokenKind>{
        Lexer::from_script(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn greedy_operators(){
        assert_eq!(
            kinds("** **= *= * /= / %= % += ++ + -= -- - == ="),
            vec![
                TokenKind::Exponent,
                TokenKind::ExponentAssign,
                TokenKind::MultiplicationAssign,
                TokenKind::Multiply,
                TokenKind::DivisionAssign,
                TokenKind::Divide,
                TokenKind::ModulusAssign,
                TokenKind::Modulus,
                TokenKind::AdditionAssign,
                TokenKind::Increment,
                TokenKind::Plus,
                TokenKind::SubtractionAssign,
                TokenKind::Decrement,
                TokenKind::Minus,
                TokenKind::Equals,
                TokenKind::Assign,
                TokenKind::EOF,
            ]
        );
    }

    #[test]
    fn adjacent_operators_split_longest_first(){
        assert_eq!(
            kinds("a+++b"),
            vec![
                TokenKind::Identifier,
                TokenKind::Increment,
                TokenKind::Plus,
                TokenKind::Identifier,
                TokenKind::EOF,
            ]
        );
        assert_eq!(kinds("***"),vec![TokenKind::Exponent,TokenKind::Multiply,TokenKind::EOF]);
    }

    #[test]
    fn numbers(){
        let tokens=Lexer::from_script("42 3.5 7. 1.2.3").tokenize().unwrap();
        assert_eq!(tokens[0].value,TokenValue::Integer(42));
        assert_eq!(tokens[1].value,TokenValue::Float(3.5));
        assert_eq!(tokens[2].value,TokenValue::Float(7.0));
        assert_eq!(tokens[3].value,TokenValue::Float(1.2));
        assert_eq!(tokens[4].kind,TokenKind::Dot);
        assert_eq!(tokens[5].value,TokenValue::Integer(3));
    }

    #[test]
    fn huge_integer_is_an_error(){
        let err=Lexer::from_script("99999999999999999999").next_token().unwrap_err();
        assert!(matches!(err,LexError::InvalidNumber{..}));
    }

    #[test]
    fn keywords_booleans_and_identifiers(){
        let tokens=Lexer::from_script("while true _x9 fnord continue").tokenize().unwrap();
        assert_eq!(tokens[0].kind,TokenKind::While);
        assert_eq!(tokens[1].value,TokenValue::Bool(true));
        assert_eq!(tokens[2].get_identifier_value(),"_x9");
        assert_eq!(tokens[3].get_identifier_value(),"fnord");
        assert_eq!(tokens[4].kind,TokenKind::Continue);
    }

    #[test]
    fn strings_with_both_quotes_and_escapes(){
        let tokens=Lexer::from_script(r#""a'b" 'c\'d' "x\ny" "\q""#).tokenize().unwrap();
        assert_eq!(tokens[0].value,TokenValue::String("a'b".into()));
        assert_eq!(tokens[1].value,TokenValue::String("c'd".into()));
        assert_eq!(tokens[2].value,TokenValue::String("x\ny".into()));
        assert_eq!(tokens[3].value,TokenValue::String("\\q".into()));
    }

    #[test]
    fn unterminated_string(){
        let err=Lexer::from_script("'abc").next_token().unwrap_err();
        assert!(matches!(err,LexError::UnterminatedString{..}));
    }

    #[test]
    fn invalid_character_reports_position(){
        let mut lexer=Lexer::from_script("a = $");
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err=lexer.next_token().unwrap_err();
        assert_eq!(err,LexError::UnexpectedChar{ch:'$',pos:Position::new(4,1)});
    }

    #[test]
    fn eof_repeats(){
        let mut lexer=Lexer::from_script("  ");
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind,TokenKind::EOF);
        }
    }

    #[test]
    fn relexing_is_deterministic(){
        let source="obj.list[0](x, 'y').z **= 2; n--";
        let a=Lexer::from_script(source).tokenize().unwrap();
        let b=Lexer::from_script(source).tokenize().unwrap();
        assert_eq!(a,b);
        assert_eq!(a.iter().filter(|t| t.kind == TokenKind::EOF).count(),1);
    }
}
