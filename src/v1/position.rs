#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct Position{
    pub(crate) pos:usize,
    pub(crate) span:usize,
}

impl Position {
    pub fn new(pos:usize,span:usize)->Self{
        Self{pos,span}
    }
    pub fn with_pos(pos:usize)->Self{
        Self{pos,span:0}
    }
    pub fn set_span(&mut self,span:usize){
        self.span=span;
    }
    pub fn pos(&self)->usize{
        self.pos
    }
    pub fn span(&self)->usize{
        self.span
    }
    /// Source text covered by this position, clamped to the end of `source`.
    pub fn get_raw_string(&self,source:&[char])->String{
        let start=self.pos.min(source.len());
        let end=(self.pos+self.span).min(source.len());
        source[start..end].iter().collect()
    }
    /// Zero-based (row, col) of the first covered character.
    pub fn get_row_col(&self,source:&[char])->(usize,usize){
        let mut row = 0;
        let mut col = 0;
        for &ch in source.iter().take(self.pos) {
            if ch == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        (row, col)
    }
}
