//! Textual regular expressions.
//!
//! Supported syntax:
//!
//! | form        | meaning                                          |
//! |-------------|--------------------------------------------------|
//! | `c`         | the character `c`                                |
//! | `.`         | any character                                    |
//! | `ab`        | concatenation                                    |
//! | `a\|b`      | alternation                                      |
//! | `a*` `a+` `a?` | zero or more, one or more, zero or one        |
//! | `(a)`       | grouping                                         |
//! | `[abx-z]`   | any listed character or range                    |
//! | `[^abx-z]`  | any character not listed                         |
//! | `\n` `\t` `\r` `\0` | control characters                       |
//! | `\*`        | a metacharacter taken literally                  |
//!
//! Inside brackets, `-` is literal when it comes first or last, and `]` is
//! literal when it comes first. A reversed range such as `z-a` is empty.
//!
//! The syntax is parsed by a table-driven parser generated from a grammar
//! at first use; its tokens are single characters.
//!
//! ```rust
//! # use tablex_gen::alex::parse_regex;
//! let number = parse_regex("-?[0-9]+(\\.[0-9]+)?").unwrap().compile();
//! assert!(number.is_match("-3.14"));
//! assert_eq!(number.longest_match("42.x"), Some("42"));
//! ```

use super::charclass::CharClass;
use super::regex::Regex;
use crate::aslr::Generator;
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use std::str::FromStr;
use tablex::{Grammar, LexerCursor, Parser, Terminal, Token};

/// Semantic values of the regex grammar.
#[derive(Debug, Clone, Default)]
enum Node {
    #[default]
    None,
    Char(char),
    Regex(Regex),
    /// A possibly empty concatenation.
    Seq(Option<Regex>),
    Class(CharClass),
}

impl Node {
    fn regex(self) -> Regex {
        match self {
            Node::Regex(r) | Node::Seq(Some(r)) => r,
            Node::Char(c) => Regex::char(c),
            Node::Class(class) => Regex::set(class),
            Node::Seq(None) | Node::None => Regex::epsilon(),
        }
    }

    fn class(self) -> CharClass {
        match self {
            Node::Class(class) => class,
            Node::Char(c) => CharClass::single(c),
            _ => CharClass::empty(),
        }
    }

    fn char(&self) -> char {
        match self {
            Node::Char(c) => *c,
            _ => '\0',
        }
    }
}

/// Moves the right-hand side values into an array.
fn take<const N: usize>(values: Vec<Node>) -> [Node; N] {
    let mut values = values.into_iter();
    std::array::from_fn(|_| values.next().unwrap_or_default())
}

struct Terminals {
    ch: Terminal,
    bar: Terminal,
    star: Terminal,
    plus: Terminal,
    qmark: Terminal,
    dot: Terminal,
    lparen: Terminal,
    rparen: Terminal,
    lbrack: Terminal,
    lbrack_not: Terminal,
    rbrack: Terminal,
    dash: Terminal,
}

struct Syntax {
    parser: Parser<Node>,
    t: Terminals,
}

static SYNTAX: Lazy<Syntax> = Lazy::new(Syntax::new);

impl Syntax {
    fn new() -> Self {
        let mut g = Grammar::<Node>::builder();
        let alt = g.nonterminal("Alt");
        let seq = g.nonterminal("Seq");
        let post = g.nonterminal("Post");
        let atom = g.nonterminal("Atom");
        let items = g.nonterminal("Items");
        let item = g.nonterminal("Item");
        let t = Terminals {
            ch: g.terminal("char"),
            bar: g.terminal("|"),
            star: g.terminal("*"),
            plus: g.terminal("+"),
            qmark: g.terminal("?"),
            dot: g.terminal("."),
            lparen: g.terminal("("),
            rparen: g.terminal(")"),
            lbrack: g.terminal("["),
            lbrack_not: g.terminal("[^"),
            rbrack: g.terminal("]"),
            dash: g.terminal("-"),
        };

        g.rule(alt, [alt.into(), t.bar.into(), seq.into()]).action(|v| {
            let [a, _, b] = take(v);
            Node::Regex(a.regex().union(b.regex()))
        });
        g.rule(alt, [seq.into()]).action(|v| {
            let [s] = take(v);
            Node::Regex(s.regex())
        });

        g.rule(seq, [seq.into(), post.into()]).action(|v| {
            let [s, p] = take(v);
            Node::Seq(Some(match s {
                Node::Seq(Some(r)) => r.concat(p.regex()),
                _ => p.regex(),
            }))
        });
        g.rule(seq, []).action(|_| Node::Seq(None));

        g.rule(post, [atom.into(), t.star.into()]).action(|v| {
            let [a, _] = take(v);
            Node::Regex(a.regex().star())
        });
        g.rule(post, [atom.into(), t.plus.into()]).action(|v| {
            let [a, _] = take(v);
            Node::Regex(a.regex().plus())
        });
        g.rule(post, [atom.into(), t.qmark.into()]).action(|v| {
            let [a, _] = take(v);
            Node::Regex(a.regex().optional())
        });
        g.rule(post, [atom.into()]).action(|v| {
            let [a] = take(v);
            a
        });

        g.rule(atom, [t.ch.into()]).action(|v| {
            let [c] = take(v);
            Node::Regex(c.regex())
        });
        g.rule(atom, [t.dot.into()])
            .action(|_| Node::Regex(Regex::set(CharClass::any())));
        g.rule(atom, [t.lparen.into(), alt.into(), t.rparen.into()])
            .action(|v| {
                let [_, a, _] = take(v);
                a
            });
        g.rule(atom, [t.lbrack.into(), items.into(), t.rbrack.into()])
            .action(|v| {
                let [_, c, _] = take(v);
                Node::Regex(Regex::set(c.class()))
            });
        g.rule(atom, [t.lbrack_not.into(), items.into(), t.rbrack.into()])
            .action(|v| {
                let [_, c, _] = take(v);
                Node::Regex(Regex::set(c.class().complement()))
            });

        g.rule(items, [items.into(), item.into()]).action(|v| {
            let [a, b] = take(v);
            Node::Class(a.class().union(b.class()))
        });
        g.rule(items, [item.into()]).action(|v| {
            let [a] = take(v);
            a
        });
        g.rule(item, [t.ch.into()]).action(|v| {
            let [c] = take(v);
            Node::Class(c.class())
        });
        g.rule(item, [t.ch.into(), t.dash.into(), t.ch.into()])
            .action(|v| {
                let [lo, _, hi] = take(v);
                Node::Class(CharClass::range(lo.char(), hi.char()))
            });

        let parser = Generator::new().generate(g.build(alt));
        Self { parser, t }
    }

    /// Splits `pattern` into one token per character, or per escape
    /// sequence, tracking whether a bracket expression is open.
    fn tokenize(&self, pattern: &str) -> Result<Vec<Token<Node>>> {
        let t = &self.t;
        let mut tokens: Vec<Token<Node>> = Vec::new();
        let mut cursor = LexerCursor::new();
        let mut chars = pattern.char_indices().peekable();
        let mut in_class = false;
        let mut class_start = false;
        while let Some((at, c)) = chars.next() {
            let mut end = at + c.len_utf8();
            let (symbol, value) = if c == '\\' {
                let Some((i, e)) = chars.next() else {
                    bail!("trailing backslash at {}", cursor.position());
                };
                end = i + e.len_utf8();
                let literal = match e {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    e if !e.is_alphanumeric() => e,
                    e => bail!("unknown escape \\{} at {}", e, cursor.position()),
                };
                (t.ch, Node::Char(literal))
            } else if in_class {
                let next = chars.peek().map(|&(_, n)| n);
                match c {
                    ']' if !class_start => {
                        in_class = false;
                        (t.rbrack, Node::None)
                    }
                    '-' if !class_start
                        && next.is_some_and(|n| n != ']')
                        && self.range_may_follow(&tokens) =>
                    {
                        (t.dash, Node::None)
                    }
                    c => (t.ch, Node::Char(c)),
                }
            } else {
                match c {
                    '|' => (t.bar, Node::None),
                    '*' => (t.star, Node::None),
                    '+' => (t.plus, Node::None),
                    '?' => (t.qmark, Node::None),
                    '.' => (t.dot, Node::None),
                    '(' => (t.lparen, Node::None),
                    ')' => (t.rparen, Node::None),
                    '[' => {
                        in_class = true;
                        class_start = true;
                        let symbol = match chars.next_if(|&(_, n)| n == '^') {
                            Some((i, n)) => {
                                end = i + n.len_utf8();
                                t.lbrack_not
                            }
                            None => t.lbrack,
                        };
                        let lexeme = &pattern[at..end];
                        tokens.push(Self::token(&mut cursor, lexeme, symbol, Node::None));
                        continue;
                    }
                    c => (t.ch, Node::Char(c)),
                }
            };
            class_start = false;
            tokens.push(Self::token(&mut cursor, &pattern[at..end], symbol, value));
        }
        Ok(tokens)
    }

    /// Whether a `-` inside brackets closes a range: it needs a character
    /// before it that is not already the end of a range.
    fn range_may_follow(&self, tokens: &[Token<Node>]) -> bool {
        match tokens {
            [.., before, last] => last.symbol == self.t.ch && before.symbol != self.t.dash,
            [last] => last.symbol == self.t.ch,
            [] => false,
        }
    }

    fn token(cursor: &mut LexerCursor, lexeme: &str, symbol: Terminal, value: Node) -> Token<Node> {
        cursor.advance(lexeme);
        Token::new(symbol, value).with_span(cursor.span)
    }

    fn parse(&self, pattern: &str) -> Result<Regex> {
        let tokens = self.tokenize(pattern)?;
        log::trace!("regex {:?}: {} tokens", pattern, tokens.len());
        let node = self.parser.parse(tokens)?;
        match node {
            Node::Regex(r) => Ok(r),
            other => bail!("unexpected parse result {:?}", other),
        }
    }
}

/// Parses a textual regular expression.
pub fn parse_regex(pattern: &str) -> Result<Regex> {
    SYNTAX
        .parse(pattern)
        .with_context(|| format!("invalid regular expression {:?}", pattern))
}

impl FromStr for Regex {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_regex(s)
    }
}
