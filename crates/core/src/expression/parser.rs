//! Nom parser for configured expressions.
//!
//! Precedence, loosest first: ternary `?:`, `||`, `&&`, `==`/`!=`,
//! comparisons, `+`, unary `!`, then primaries (parentheses, object literals,
//! literals and dotted paths).

use super::ast::{BinaryOp, Expr, LogicalOp};
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0},
    combinator::{all_consuming, cut, map, opt, recognize, value},
    multi::{fold_many0, many0_count, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
    IResult,
};
use serde_json::{Number, Value};

/// Parse a complete expression; trailing input is an error.
pub(crate) fn parse_expression(input: &str) -> IResult<&str, Expr> {
    all_consuming(ws(expression))(input)
}

// =============================================================================
// HELPERS
// =============================================================================

fn ws<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Left-associative chain of `operand (operator operand)*`, each link built
/// into a node by `node`.
fn chain<'a, Op, P>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, Expr>,
    operator: P,
    node: fn(Op, Box<Expr>, Box<Expr>) -> Expr,
) -> IResult<&'a str, Expr>
where
    P: FnMut(&'a str) -> IResult<&'a str, Op>,
{
    let (input, first) = operand(input)?;
    fold_many0(
        pair(ws(operator), operand),
        move || first.clone(),
        move |lhs, (op, rhs)| node(op, Box::new(lhs), Box::new(rhs)),
    )(input)
}

fn binary_chain<'a, P>(
    input: &'a str,
    operand: fn(&'a str) -> IResult<&'a str, Expr>,
    operator: P,
) -> IResult<&'a str, Expr>
where
    P: FnMut(&'a str) -> IResult<&'a str, BinaryOp>,
{
    chain(input, operand, operator, Expr::Binary)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('"'),
            map(
                opt(escaped_transform(
                    is_not("\\\""),
                    '\\',
                    alt((value("\\", tag("\\")), value("\"", tag("\"")), value("\n", tag("n")))),
                )),
                Option::unwrap_or_default,
            ),
            char('"'),
        ),
        delimited(
            char('\''),
            map(
                opt(escaped_transform(
                    is_not("\\'"),
                    '\\',
                    alt((value("\\", tag("\\")), value("'", tag("'")), value("\n", tag("n")))),
                )),
                Option::unwrap_or_default,
            ),
            char('\''),
        ),
    ))(input)
}

// =============================================================================
// GRAMMAR
// =============================================================================

fn expression(input: &str) -> IResult<&str, Expr> {
    ternary(input)
}

fn ternary(input: &str) -> IResult<&str, Expr> {
    let (input, condition) = or_expr(input)?;
    let (input, branches) = opt(preceded(
        ws(char('?')),
        cut(separated_pair(expression, ws(char(':')), expression)),
    ))(input)?;
    Ok(match branches {
        Some((then, otherwise)) => (
            input,
            Expr::Conditional(Box::new(condition), Box::new(then), Box::new(otherwise)),
        ),
        None => (input, condition),
    })
}

fn or_expr(input: &str) -> IResult<&str, Expr> {
    chain(input, and_expr, value(LogicalOp::Or, tag("||")), Expr::Logical)
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    chain(input, equality, value(LogicalOp::And, tag("&&")), Expr::Logical)
}

fn equality(input: &str) -> IResult<&str, Expr> {
    binary_chain(
        input,
        comparison,
        alt((value(BinaryOp::Eq, tag("==")), value(BinaryOp::Ne, tag("!=")))),
    )
}

fn comparison(input: &str) -> IResult<&str, Expr> {
    binary_chain(
        input,
        additive,
        alt((
            value(BinaryOp::Le, tag("<=")),
            value(BinaryOp::Ge, tag(">=")),
            value(BinaryOp::Lt, tag("<")),
            value(BinaryOp::Gt, tag(">")),
        )),
    )
}

fn additive(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, unary, value(BinaryOp::Add, tag("+")))
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded(ws(char('!')), unary), |inner| Expr::Not(Box::new(inner))),
        ws(primary),
    ))(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        delimited(char('('), ws(expression), char(')')),
        object,
        map(quoted, |s| Expr::Literal(Value::String(s))),
        number,
        path_or_keyword,
    ))(input)
}

fn number(input: &str) -> IResult<&str, Expr> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)?;

    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<i64>().ok().map(Number::from)
    };
    match parsed {
        Some(n) => Ok((rest, Expr::Literal(Value::Number(n)))),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

fn path_or_keyword(input: &str) -> IResult<&str, Expr> {
    let (rest, segments) = separated_list1(char('.'), identifier)(input)?;
    let expr = match segments.as_slice() {
        ["true"] => Expr::Literal(Value::Bool(true)),
        ["false"] => Expr::Literal(Value::Bool(false)),
        ["null"] => Expr::Literal(Value::Null),
        _ => Expr::Path(segments.into_iter().map(str::to_string).collect()),
    };
    Ok((rest, expr))
}

fn object(input: &str) -> IResult<&str, Expr> {
    let entry = separated_pair(
        ws(alt((map(identifier, str::to_string), quoted))),
        char(':'),
        expression,
    );
    map(
        delimited(
            char('{'),
            terminated(separated_list0(char(','), entry), opt(ws(char(',')))),
            ws(char('}')),
        ),
        Expr::Object,
    )(input)
}
