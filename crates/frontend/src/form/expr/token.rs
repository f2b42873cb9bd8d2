use super::ExprError;
use chumsky::error::RichReason;
use chumsky::prelude::*;
use std::fmt;

pub(super) type Span = SimpleSpan;
pub(super) type Spanned<T> = (T, Span);

const UNTERMINATED_STRING: &str = "unterminated string";

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Ident(s) => write!(f, "{}", s),
            Self::Op(p) => write!(f, "{}", p),
        }
    }
}

pub(super) fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<Spanned<Token>>, extra::Err<Rich<'src, char, Span>>> {
    // Longest first so `===` wins over `==`.
    let comparator = choice((
        just("===").to("==="),
        just("!==").to("!=="),
        just("==").to("=="),
        just("!=").to("!="),
        just("<=").to("<="),
        just(">=").to(">="),
        just("<").to("<"),
        just(">").to(">"),
    ));

    let logical = choice((just("&&").to("&&"), just("||").to("||"), just("!").to("!")));

    let arithmetic = choice((just("+").to("+"), just("-").to("-"), just("*").to("*"), just("/").to("/"), just("%").to("%")));

    let punctuation = choice((
        just("?").to("?"),
        just(":").to(":"),
        just("(").to("("),
        just(")").to(")"),
        just("[").to("["),
        just("]").to("]"),
        just(",").to(","),
        just(".").to("."),
    ));

    let number = choice((
        text::int(10)
            .then(just('.').then(text::digits(10)).or_not())
            .to_slice(),
        just('.').then(text::digits(10)).to_slice(),
    ))
    .from_str()
    .unwrapped()
    .map(Token::Number);

    let escape = just('\\').ignore_then(any().map(|c| match c {
        'n' => '\n',
        't' => '\t',
        other => other,
    }));

    let single_quoted = just('\'')
        .ignore_then(none_of("'\\").or(escape.clone()).repeated().collect::<String>())
        .then(just('\'').or_not());
    let double_quoted = just('"')
        .ignore_then(none_of("\"\\").or(escape).repeated().collect::<String>())
        .then(just('"').or_not());

    let string = single_quoted
        .or(double_quoted)
        .validate(|(text, closed), extra, emitter| {
            if closed.is_none() {
                emitter.emit(Rich::custom(extra.span(), UNTERMINATED_STRING));
            }
            Token::Str(text)
        });

    let identifier = any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_' || *c == '$')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || *c == '_' || *c == '$')
                .repeated(),
        )
        .to_slice()
        .map(|name: &str| Token::Ident(name.to_string()));

    let token = choice((
        number,
        string,
        identifier,
        comparator.map(Token::Op),
        logical.map(Token::Op),
        arithmetic.map(Token::Op),
        punctuation.map(Token::Op),
    ));

    token
        .map_with(|token, extra| (token, extra.span()))
        .padded()
        .repeated()
        .collect()
        .padded()
        .then_ignore(end())
}

pub(super) fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, ExprError> {
    lexer()
        .parse(source)
        .into_result()
        .map_err(|errors| errors.into_iter().next().map_or(ExprError::UnexpectedEnd, lex_error))
}

fn lex_error(err: Rich<'_, char, Span>) -> ExprError {
    let pos = err.span().start;
    if matches!(err.reason(), RichReason::Custom(msg) if msg == UNTERMINATED_STRING) {
        return ExprError::UnterminatedString { pos };
    }
    match err.found() {
        Some(ch) => ExprError::UnexpectedChar { ch: *ch, pos },
        None => ExprError::UnexpectedEnd,
    }
}
