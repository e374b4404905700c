use crate::cursor::Span;
use crate::error::{LexError, ParseError};
use crate::grammar::{Grammar, NonTerminal, Symbol, Terminal};
use crate::lexer::Token;
use smartstring::alias::String;
use std::collections::BTreeMap;
use std::fmt;

/// An ACTION table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Push the lookahead and move to the state.
    Shift(usize),
    /// Reduce by the grammar production with this index.
    Reduce(usize),
    Accept,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "shift {}", s),
            Action::Reduce(p) => write!(f, "reduce {}", p),
            Action::Accept => write!(f, "accept"),
        }
    }
}

/// ACTION and GOTO tables, one row per automaton state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseTable {
    action: Vec<BTreeMap<Terminal, Action>>,
    goto: Vec<BTreeMap<NonTerminal, usize>>,
}

impl ParseTable {
    pub fn new(n_states: usize) -> Self {
        Self {
            action: vec![BTreeMap::new(); n_states],
            goto: vec![BTreeMap::new(); n_states],
        }
    }

    pub fn n_states(&self) -> usize {
        self.action.len()
    }

    #[inline]
    pub fn action(&self, state: usize, terminal: Terminal) -> Option<Action> {
        self.action.get(state)?.get(&terminal).copied()
    }

    #[inline]
    pub fn goto(&self, state: usize, nonterminal: NonTerminal) -> Option<usize> {
        self.goto.get(state)?.get(&nonterminal).copied()
    }

    /// Stores `action`, returning the entry it replaced.
    pub fn set_action(&mut self, state: usize, terminal: Terminal, action: Action) -> Option<Action> {
        self.action[state].insert(terminal, action)
    }

    pub fn set_goto(&mut self, state: usize, nonterminal: NonTerminal, target: usize) {
        self.goto[state].insert(nonterminal, target);
    }

    pub fn actions(&self, state: usize) -> impl Iterator<Item = (Terminal, Action)> + '_ {
        self.action[state].iter().map(|(&t, &a)| (t, a))
    }

    pub fn gotos(&self, state: usize) -> impl Iterator<Item = (NonTerminal, usize)> + '_ {
        self.goto[state].iter().map(|(&n, &s)| (n, s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    AcceptReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
            ConflictKind::AcceptReduce => "accept/reduce",
        })
    }
}

/// A table slot claimed by two actions that no resolver settled.
///
/// `kept` is the action left in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub terminal: Terminal,
    pub kind: ConflictKind,
    pub kept: Action,
    pub rejected: Action,
}

/// A parse stack entry. The bottom frame has no symbol.
#[derive(Debug, Clone)]
pub struct Frame<V> {
    pub state: usize,
    pub symbol: Option<Symbol>,
    pub value: V,
}

#[derive(Debug, Clone, Default)]
pub struct ParserStats {
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

/// A generated shift-reduce parser: a grammar and its tables.
pub struct Parser<V> {
    grammar: Grammar<V>,
    table: ParseTable,
    conflicts: Vec<Conflict>,
}

impl<V> Clone for Parser<V> {
    fn clone(&self) -> Self {
        Self {
            grammar: self.grammar.clone(),
            table: self.table.clone(),
            conflicts: self.conflicts.clone(),
        }
    }
}

impl<V> fmt::Debug for Parser<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("grammar", &self.grammar)
            .field("table", &self.table)
            .field("conflicts", &self.conflicts)
            .finish()
    }
}

impl<V> Parser<V> {
    pub fn new(grammar: Grammar<V>, table: ParseTable, conflicts: Vec<Conflict>) -> Self {
        Self {
            grammar,
            table,
            conflicts,
        }
    }

    pub fn grammar(&self) -> &Grammar<V> {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    /// Conflicts found while generating the tables.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    fn dump_state(&self, stack: &[Frame<V>], incoming: &Token<V>) {
        let mut output = String::new();
        for frame in stack {
            output.push_str(&format!("<{}>", frame.state));
            if let Some(sym) = frame.symbol {
                output.push(' ');
                output.push_str(self.grammar.name(sym));
            }
            output.push_str("  ");
        }
        output.push_str("<-  ");
        output.push_str(self.grammar.vocabulary().terminal_name(incoming.symbol));
        log::trace!("{}", output);
    }
}

impl<V: Default> Parser<V> {
    /// Parses `tokens`; end of input is appended automatically.
    pub fn parse<I>(&self, tokens: I) -> Result<V, ParseError>
    where
        I: IntoIterator<Item = Token<V>>,
    {
        self.parse_results(tokens.into_iter().map(Ok::<_, LexError>))
    }

    /// Parses a fallible token stream such as the output of
    /// [`Lexer::analyze`](crate::Lexer::analyze). The first stream error
    /// aborts the parse.
    pub fn parse_results<I, E>(&self, tokens: I) -> Result<V, ParseError<E>>
    where
        I: IntoIterator<Item = Result<Token<V>, E>>,
    {
        let mut stats = ParserStats::default();
        self.parse_with_stats(tokens, &mut stats)
    }

    pub fn parse_with_stats<I, E>(
        &self,
        tokens: I,
        stats: &mut ParserStats,
    ) -> Result<V, ParseError<E>>
    where
        I: IntoIterator<Item = Result<Token<V>, E>>,
    {
        let mut feed = Feed {
            input: tokens.into_iter(),
            last_span: None,
            eof_sent: false,
        };
        let mut stack = vec![Frame {
            state: 0,
            symbol: None,
            value: V::default(),
        }];
        let mut token = feed.next()?;
        stats.tokens += 1;
        loop {
            if log::log_enabled!(log::Level::Trace) {
                self.dump_state(&stack, &token);
            }
            let state = stack.last().map_or(0, |f| f.state);
            let Some(action) = self.table.action(state, token.symbol) else {
                return Err(ParseError::UndefinedAction {
                    state,
                    symbol: self.grammar.vocabulary().terminal_name(token.symbol).into(),
                    span: token.span,
                });
            };
            match action {
                Action::Shift(next) => {
                    log::trace!("Shift {}", next);
                    stack.push(Frame {
                        state: next,
                        symbol: Some(token.symbol.into()),
                        value: token.value,
                    });
                    stats.shifts += 1;
                    token = feed.next()?;
                    stats.tokens += 1;
                }

                Action::Reduce(index) => {
                    let production = &self.grammar.productions()[index];
                    log::trace!("Reduce {}", self.grammar.display_production(index));
                    let Some(base) = stack
                        .len()
                        .checked_sub(production.arity())
                        .filter(|&base| base > 0)
                    else {
                        return Err(ParseError::StackUnderflow {
                            state,
                            production: index,
                        });
                    };
                    let values: Vec<V> = stack.drain(base..).map(|f| f.value).collect();
                    let state = stack.last().map_or(0, |f| f.state);
                    let Some(next) = self.table.goto(state, production.from) else {
                        return Err(ParseError::UndefinedGoto {
                            state,
                            symbol: self.grammar.vocabulary().nonterminal_name(production.from).into(),
                        });
                    };
                    stack.push(Frame {
                        state: next,
                        symbol: Some(production.from.into()),
                        value: production.reduce(values),
                    });
                    stats.reductions += 1;
                }

                Action::Accept => {
                    log::trace!("Accept");
                    return Ok(stack.pop().map(|f| f.value).unwrap_or_default());
                }
            }
        }
    }
}

/// Pulls tokens from the input, then a single end-of-input token.
struct Feed<I> {
    input: I,
    last_span: Option<Span>,
    eof_sent: bool,
}

impl<I, V, E> Feed<I>
where
    I: Iterator<Item = Result<Token<V>, E>>,
    V: Default,
{
    fn next(&mut self) -> Result<Token<V>, ParseError<E>> {
        if !self.eof_sent {
            if let Some(item) = self.input.next() {
                let token = item.map_err(ParseError::Lex)?;
                self.last_span = token.span.or(self.last_span);
                return Ok(token);
            }
            self.eof_sent = true;
            let mut eof = Token::new(Terminal::EOF, V::default());
            if let Some(mut span) = self.last_span {
                span.collapse();
                eof.span = Some(span);
            }
            return Ok(eof);
        }
        Err(ParseError::UnexpectedEndOfInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::span;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    struct Pair {
        parser: Parser<i64>,
        num: Terminal,
        comma: Terminal,
    }

    /// `P -> num , num` with hand-written tables.
    fn pair() -> Pair {
        let mut g = GrammarBuilder::<i64>::new();
        let p = g.nonterminal("P");
        let num = g.terminal("num");
        let comma = g.terminal(",");
        g.rule(p, [num.into(), comma.into(), num.into()])
            .action(|v| v[0] * 10 + v[2]);
        let grammar = g.build(p);

        let mut table = ParseTable::new(5);
        table.set_action(0, num, Action::Shift(2));
        table.set_goto(0, p, 1);
        table.set_action(1, Terminal::EOF, Action::Accept);
        table.set_action(2, comma, Action::Shift(3));
        table.set_action(3, num, Action::Shift(4));
        table.set_action(4, Terminal::EOF, Action::Reduce(0));
        Pair {
            parser: Parser::new(grammar, table, Vec::new()),
            num,
            comma,
        }
    }

    #[test]
    fn parses_with_semantic_action() {
        init_logger();
        let Pair { parser, num, comma } = pair();
        let tokens = vec![
            Token::new(num, 4),
            Token::new(comma, 0),
            Token::new(num, 2),
        ];
        let mut stats = ParserStats::default();
        let value = parser
            .parse_with_stats(tokens.into_iter().map(Ok::<_, LexError>), &mut stats)
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(stats.shifts, 3);
        assert_eq!(stats.reductions, 1);
        assert_eq!(stats.tokens, 4);
    }

    #[test]
    fn undefined_action_reports_token() {
        let Pair { parser, num, .. } = pair();
        let tokens = vec![
            Token::new(num, 1).with_span(span!(0, 0, 0, 1).unwrap()),
            Token::new(num, 2).with_span(span!(0, 2, 0, 3).unwrap()),
        ];
        let err = parser.parse(tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::UndefinedAction {
                state: 2,
                symbol: "num".into(),
                span: span!(0, 2, 0, 3),
            }
        );
    }

    #[test]
    fn premature_eof_is_an_undefined_action() {
        let Pair { parser, num, .. } = pair();
        let tokens = vec![Token::new(num, 1).with_span(span!(0, 0, 0, 1).unwrap())];
        let err = parser.parse(tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::UndefinedAction {
                state: 2,
                symbol: "eof".into(),
                span: span!(0, 1, 0, 1),
            }
        );
    }

    #[test]
    fn undefined_goto() {
        let Pair { parser, num, comma } = pair();
        let mut table = parser.table().clone();
        table.goto[0].clear();
        let parser = Parser::new(parser.grammar().clone(), table, Vec::new());
        let tokens = vec![Token::new(num, 1), Token::new(comma, 0), Token::new(num, 2)];
        assert_eq!(
            parser.parse(tokens).unwrap_err(),
            ParseError::UndefinedGoto {
                state: 0,
                symbol: "P".into()
            }
        );
    }

    #[test]
    fn shifting_eof_runs_out_of_input() {
        let mut g = GrammarBuilder::<()>::new();
        let s = g.nonterminal("S");
        let grammar = g.build(s);
        let mut table = ParseTable::new(2);
        table.set_action(0, Terminal::EOF, Action::Shift(1));
        let parser = Parser::new(grammar, table, Vec::new());
        assert_eq!(
            parser.parse(Vec::new()).unwrap_err(),
            ParseError::UnexpectedEndOfInput
        );
    }

    #[test]
    fn stream_errors_abort() {
        let Pair { parser, num, .. } = pair();
        let tokens = vec![Ok(Token::new(num, 1)), Err("boom")];
        assert_eq!(parser.parse_results(tokens).unwrap_err(), ParseError::Lex("boom"));
    }

    #[test]
    fn explicit_epsilon_pops_nothing() {
        let mut g = GrammarBuilder::<i64>::new();
        let s = g.nonterminal("S");
        let a = g.terminal("a");
        g.rule(s, [a.into(), Terminal::EPSILON.into()]).action(|v| v[0]);
        let grammar = g.build(s);
        assert_eq!(grammar.production(0).unwrap().arity(), 1);

        let mut table = ParseTable::new(3);
        table.set_action(0, a, Action::Shift(2));
        table.set_goto(0, s, 1);
        table.set_action(1, Terminal::EOF, Action::Accept);
        table.set_action(2, Terminal::EOF, Action::Reduce(0));
        let parser = Parser::new(grammar, table, Vec::new());
        assert_eq!(parser.parse([Token::new(a, 5)]).unwrap(), 5);
    }

    #[test]
    fn short_stack_is_an_error() {
        let mut g = GrammarBuilder::<i64>::new();
        let p = g.nonterminal("P");
        let num = g.terminal("num");
        g.rule(p, [num.into(), num.into()]);
        let grammar = g.build(p);
        let mut table = ParseTable::new(1);
        table.set_action(0, num, Action::Reduce(0));
        let parser = Parser::new(grammar, table, Vec::new());
        assert_eq!(
            parser.parse([Token::new(num, 1)]).unwrap_err(),
            ParseError::StackUnderflow {
                state: 0,
                production: 0
            }
        );
    }

    #[test]
    fn set_action_returns_previous() {
        let mut table = ParseTable::new(1);
        assert_eq!(table.set_action(0, Terminal::EOF, Action::Accept), None);
        assert_eq!(
            table.set_action(0, Terminal::EOF, Action::Reduce(1)),
            Some(Action::Accept)
        );
        assert_eq!(table.actions(0).count(), 1);
        assert_eq!(table.action(3, Terminal::EOF), None);
    }
}
