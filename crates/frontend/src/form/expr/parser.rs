use super::ast::{BinaryOp, Expr, UnaryOp};
use super::token::{Span, Spanned, Token};
use super::ExprError;
use crate::shared::value::number;
use chumsky::{input::ValueInput, pratt::*, prelude::*};
use serde_json::Value;

type Extra<'tok> = extra::Err<Rich<'tok, Token, Span>>;

/// One step of a member, index or call chain.
enum Suffix {
    Member(String),
    Index(Expr),
    Call(Vec<Expr>),
}

fn op<'tok, I>(p: &'static str) -> impl Parser<'tok, I, Token, Extra<'tok>> + Clone
where
    I: ValueInput<'tok, Token = Token, Span = Span>,
{
    just(Token::Op(p))
}

fn binary(op: BinaryOp, l: Expr, r: Expr) -> Expr {
    Expr::Binary(op, Box::new(l), Box::new(r))
}

pub(super) fn parser<'tok, I>() -> impl Parser<'tok, I, Expr, Extra<'tok>>
where
    I: ValueInput<'tok, Token = Token, Span = Span>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Number(n) => Expr::Literal(number(n)),
            Token::Str(s) => Expr::Literal(Value::String(s)),
            Token::Ident(name) => match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name),
            },
        };

        let items = expr
            .clone()
            .separated_by(op(","))
            .collect::<Vec<_>>();

        let array = items
            .clone()
            .delimited_by(op("["), op("]"))
            .map(Expr::Array);

        let nested = expr.clone().delimited_by(op("("), op(")"));

        let suffix = choice((
            op(".")
                .ignore_then(select! { Token::Ident(name) => name })
                .map(Suffix::Member),
            expr.clone()
                .delimited_by(op("["), op("]"))
                .map(Suffix::Index),
            items.delimited_by(op("("), op(")")).map(Suffix::Call),
        ));

        let chain = choice((literal, array, nested)).foldl(suffix.repeated(), |target, suffix| {
            match suffix {
                Suffix::Member(name) => Expr::Member(Box::new(target), name),
                Suffix::Index(index) => Expr::Index(Box::new(target), Box::new(index)),
                Suffix::Call(args) => Expr::Call(Box::new(target), args),
            }
        });

        let operation = chain.pratt((
            prefix(7, op("!"), |_, rhs, _| Expr::Unary(UnaryOp::Not, Box::new(rhs))),
            prefix(7, op("-"), |_, rhs, _| Expr::Unary(UnaryOp::Neg, Box::new(rhs))),
            prefix(7, op("+"), |_, rhs, _| rhs),
            infix(
                left(6),
                choice((
                    op("*").to(BinaryOp::Mul),
                    op("/").to(BinaryOp::Div),
                    op("%").to(BinaryOp::Rem),
                )),
                |l, op, r, _| binary(op, l, r),
            ),
            infix(
                left(5),
                op("+").to(BinaryOp::Add).or(op("-").to(BinaryOp::Sub)),
                |l, op, r, _| binary(op, l, r),
            ),
            infix(
                left(4),
                choice((
                    op("<=").to(BinaryOp::Le),
                    op(">=").to(BinaryOp::Ge),
                    op("<").to(BinaryOp::Lt),
                    op(">").to(BinaryOp::Gt),
                )),
                |l, op, r, _| binary(op, l, r),
            ),
            infix(
                left(3),
                choice((
                    op("===").to(BinaryOp::StrictEq),
                    op("!==").to(BinaryOp::StrictNe),
                    op("==").to(BinaryOp::LooseEq),
                    op("!=").to(BinaryOp::LooseNe),
                )),
                |l, op, r, _| binary(op, l, r),
            ),
            infix(left(2), op("&&").to(BinaryOp::And), |l, op, r, _| binary(op, l, r)),
            infix(left(1), op("||").to(BinaryOp::Or), |l, op, r, _| binary(op, l, r)),
        ));

        // `test ? then : otherwise`, right-associative.
        operation
            .then(
                op("?")
                    .ignore_then(expr.clone())
                    .then_ignore(op(":"))
                    .then(expr)
                    .or_not(),
            )
            .map(|(test, branches)| match branches {
                Some((then, otherwise)) => {
                    Expr::Conditional(Box::new(test), Box::new(then), Box::new(otherwise))
                }
                None => test,
            })
    })
}

/// Parse a lexed token list; spans index into the original source.
pub(super) fn parse_tokens(tokens: &[Spanned<Token>], source_len: usize) -> Result<Expr, ExprError> {
    let input = tokens.map(Span::from(source_len..source_len), |(t, s)| (t, s));
    parser()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errors| errors.into_iter().next().map_or(ExprError::UnexpectedEnd, parse_error))
}

fn parse_error(err: Rich<'_, Token, Span>) -> ExprError {
    match err.found() {
        Some(token) => ExprError::UnexpectedToken {
            token: token.to_string(),
            pos: err.span().start,
        },
        None => ExprError::UnexpectedEnd,
    }
}

#[cfg(test)]
mod tests {
    use super::super::token::tokenize;
    use super::*;
    use serde_json::json;

    fn parse(src: &str) -> Result<Expr, ExprError> {
        parse_tokens(&tokenize(src)?, src.len())
    }

    fn lit(n: f64) -> Box<Expr> {
        Box::new(Expr::Literal(json!(n)))
    }

    #[test]
    fn test_parse_precedence() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::Binary(
                BinaryOp::Add,
                lit(1.0),
                Box::new(Expr::Binary(BinaryOp::Mul, lit(2.0), lit(3.0))),
            )
        );
    }

    #[test]
    fn test_parse_left_associative() {
        assert_eq!(
            parse("8 - 2 - 1").unwrap(),
            Expr::Binary(
                BinaryOp::Sub,
                Box::new(Expr::Binary(BinaryOp::Sub, lit(8.0), lit(2.0))),
                lit(1.0),
            )
        );
    }

    #[test]
    fn test_parse_and_binds_tighter_than_or() {
        let expr = parse("a || b && c").unwrap();
        assert!(matches!(expr, Expr::Binary(BinaryOp::Or, _, _)));
    }

    #[test]
    fn test_parse_unary_binds_tighter_than_binary() {
        let expr = parse("!doc.a && -doc.b < 0").unwrap();
        let Expr::Binary(BinaryOp::And, lhs, rhs) = expr else {
            panic!("expected &&");
        };
        assert!(matches!(*lhs, Expr::Unary(UnaryOp::Not, ref inner) if matches!(**inner, Expr::Member(..))));
        assert!(matches!(*rhs, Expr::Binary(BinaryOp::Lt, ref l, _) if matches!(**l, Expr::Unary(UnaryOp::Neg, _))));
    }

    #[test]
    fn test_parse_member_call_chain() {
        let expr = parse("in_list(['A', 'B'], doc.status)").unwrap();
        assert!(matches!(expr, Expr::Call(_, ref args) if args.len() == 2));
        let expr = parse("doc.items[0].name").unwrap();
        assert!(matches!(expr, Expr::Member(ref target, ref name)
            if name == "name" && matches!(**target, Expr::Index(..))));
    }

    #[test]
    fn test_parse_nested_conditional() {
        let expr = parse("a ? 1 : b ? 2 : 3").unwrap();
        let Expr::Conditional(_, _, otherwise) = expr else {
            panic!("expected conditional");
        };
        assert!(matches!(*otherwise, Expr::Conditional(..)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(parse("doc.qty >"), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(
            parse("doc.qty 1"),
            Err(ExprError::UnexpectedToken { pos: 8, .. })
        ));
        assert!(matches!(parse("(a"), Err(ExprError::UnexpectedEnd)));
    }
}
