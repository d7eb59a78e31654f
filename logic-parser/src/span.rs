/// Location of a token in the source text.
///
/// `line` and `column` are 1-based; `start`/`end` are character offsets into
/// the source, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

