/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 0-based line number.
    pub line: usize,
    /// 0-based column number (character position in the line).
    pub column: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open source range: `[start, end)`.
///
/// `Span` marks the region of source text that a token covers, or attaches a
/// location to a diagnostic.
///
/// Invariants are not enforced here, but it is conventional for `start <= end`
/// in lexicographic `(line, column)` ordering.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    /// Creates a new `Span`.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Start (or restart) this span at its current `end` position (empty span at end).
    /// Effect: span(x,y, z,w) -> span(z,w, z,w)
    pub fn collapse(&mut self) {
        self.start = self.end;
    }

    /// Merge with another span by covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start <= other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end >= other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// Is this span empty (start == end)?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the inclusive line range spanned by this `Span`.
    #[inline]
    pub fn line_range(&self) -> (usize, usize) {
        (self.start.line, self.end.line)
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> String {
        format!(
            "span {}:{} to {}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Tracks the current lexical position of the analyzer.
///
/// `LexerCursor` only moves forward: the lexer decides how long a lexeme is
/// before it consumes it, so there is never anything to unread.
#[derive(Debug, Clone, Default)]
pub struct LexerCursor {
    /// Byte offset into the input.
    pub pos: usize,
    /// Span of the most recently consumed lexeme.
    pub span: Span,
}

impl LexerCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes `lexeme`, leaving `span` covering exactly that lexeme.
    pub fn advance(&mut self, lexeme: &str) {
        self.span.collapse();
        for c in lexeme.chars() {
            if c == '\n' {
                self.span.end.line += 1;
                self.span.end.column = 0;
            } else {
                self.span.end.column += 1;
            }
        }
        self.pos += lexeme.len();
    }

    /// Position right after the last consumed lexeme.
    #[inline]
    pub fn position(&self) -> Position {
        self.span.end
    }
}

/// Build an `Option<Span>` inline from 0-based line/column coordinates.
///
/// # Examples
///
/// ```rust
/// # use tablex::span;
/// let s = span!(0, 0, 1, 4);
/// assert_eq!(s.unwrap().end.column, 4);
/// ```
#[macro_export]
macro_rules! span {
    ($line_start:expr, $col_start:expr, $line_end:expr, $col_end:expr) => {
        Some($crate::Span {
            start: $crate::Position {
                line: $line_start,
                column: $col_start,
            },
            end: $crate::Position {
                line: $line_end,
                column: $col_end,
            },
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_columns() {
        let mut cursor = LexerCursor::new();
        cursor.advance("abc");
        assert_eq!(cursor.pos, 3);
        assert_eq!(cursor.span, span!(0, 0, 0, 3).unwrap());
        cursor.advance("de");
        assert_eq!(cursor.span, span!(0, 3, 0, 5).unwrap());
    }

    #[test]
    fn advance_over_newlines() {
        let mut cursor = LexerCursor::new();
        cursor.advance("ab\ncd");
        assert_eq!(cursor.span, span!(0, 0, 1, 2).unwrap());
        cursor.advance("\n");
        assert_eq!(cursor.position(), Position::new(2, 0));
    }

    #[test]
    fn advance_counts_bytes_for_pos() {
        let mut cursor = LexerCursor::new();
        cursor.advance("é");
        assert_eq!(cursor.pos, 2);
        assert_eq!(cursor.position(), Position::new(0, 1));
    }

    #[test]
    fn merge_covers_both() {
        let a = span!(0, 5, 0, 10).unwrap();
        let b = span!(0, 2, 1, 0).unwrap();
        let m = a.merge(&b);
        assert_eq!(m.start, Position::new(0, 2));
        assert_eq!(m.end, Position::new(1, 0));
        assert_eq!(m.display(), "span 0:2 to 1:0");
    }
}
