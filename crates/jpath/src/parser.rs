//! nom grammar for JPath.
//!
//! ```text
//! expression := literal | call | path
//! call       := identifier '(' [expression (',' expression)*] ')'
//! path       := 'this' step* | head step* | '.'
//! head       := identifier | bracket
//! step       := '.' identifier | bracket
//! bracket    := '[' (integer | quoted) ']'
//! ```
use crate::ast::{Expression, Path, Step};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0, satisfy, u64 as index},
    combinator::{all_consuming, map, not, peek, recognize, value},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};
use serde_json::Value;

pub fn parse_expression(source: &str) -> Result<Expression, JPathError> {
    all_consuming(terminated(expression, multispace0))
        .parse(source)
        .map(|(_, expr)| expr)
        .map_err(|e| JPathError::JPathParse(source.to_string(), e.to_string()))
}

fn expression(input: &str) -> IResult<&str, Expression> {
    preceded(
        multispace0,
        alt((map(literal, Expression::Literal), call, map(path, Expression::Path))),
    )
    .parse(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '@')
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-')
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_char))).parse(input)
}

/// `word`, but not as the prefix of a longer identifier.
fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_ident_char)))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_while(|c: char| c != '\''), char('\'')).parse(input)
}

fn literal(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Null, keyword("null")),
        value(Value::Bool(true), keyword("true")),
        value(Value::Bool(false), keyword("false")),
        map(quoted, Value::from),
        number,
    ))
    .parse(input)
}

fn number(input: &str) -> IResult<&str, Value> {
    // A digit or sign must lead, so `inf` and `nan` stay identifiers.
    let (rest, n) = preceded(peek(satisfy(|c: char| c.is_ascii_digit() || c == '-')), double).parse(input)?;
    let number = if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    };
    Ok((rest, number))
}

fn call(input: &str) -> IResult<&str, Expression> {
    let (input, function) = terminated(identifier, multispace0).parse(input)?;
    let (input, args) = delimited(
        char('('),
        separated_list0(char(','), terminated(expression, multispace0)),
        preceded(multispace0, char(')')),
    )
    .parse(input)?;
    Ok((input, Expression::Call { function: function.to_string(), args }))
}

fn bracket(input: &str) -> IResult<&str, Step> {
    delimited(
        char('['),
        delimited(
            multispace0,
            alt((
                map(index, |i| Step::Index(i as usize)),
                map(quoted, |key| Step::Key(key.to_string())),
            )),
            multispace0,
        ),
        char(']'),
    )
    .parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    alt((map(preceded(char('.'), identifier), |key| Step::Key(key.to_string())), bracket)).parse(input)
}

fn path(input: &str) -> IResult<&str, Path> {
    let head = alt((map(identifier, |key| Step::Key(key.to_string())), bracket));
    alt((
        map(preceded(keyword("this"), many0(step)), |steps| Path { steps }),
        map(pair(head, many0(step)), |(first, rest)| {
            let mut steps = Vec::with_capacity(rest.len() + 1);
            steps.push(first);
            steps.extend(rest);
            Path { steps }
        }),
        value(Path::current(), char('.')),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(path: &[&str]) -> Expression {
        Expression::Path(Path { steps: path.iter().map(|k| Step::Key(k.to_string())).collect() })
    }

    #[test]
    fn test_relation_keys_are_path_steps() {
        assert_eq!(parse_expression("$parent.@id").unwrap(), keys(&["$parent", "@id"]));
        assert_eq!(parse_expression("$parent.$parent.name").unwrap(), keys(&["$parent", "$parent", "name"]));
    }

    #[test]
    fn test_this_is_the_scope() {
        assert_eq!(parse_expression("this").unwrap(), Expression::Path(Path::current()));
        assert_eq!(parse_expression(" . ").unwrap(), Expression::Path(Path::current()));
        assert_eq!(parse_expression("this.name").unwrap(), keys(&["name"]));
        assert_eq!(parse_expression("thistle").unwrap(), keys(&["thistle"]));
    }

    #[test]
    fn test_bracket_steps() {
        let expr = parse_expression("['schema:name'][ 2 ].x").unwrap();
        assert_eq!(
            expr,
            Expression::Path(Path {
                steps: vec![Step::Key("schema:name".into()), Step::Index(2), Step::Key("x".into())],
            })
        );
    }

    #[test]
    fn test_keyword_prefix_is_an_identifier() {
        assert_eq!(parse_expression("nullable").unwrap(), keys(&["nullable"]));
        assert_eq!(parse_expression("info").unwrap(), keys(&["info"]));
    }

    #[test]
    fn test_integral_numbers_stay_integers() {
        assert_eq!(parse_expression("42").unwrap(), Expression::Literal(json!(42)));
        assert_eq!(parse_expression("-1.5").unwrap(), Expression::Literal(json!(-1.5)));
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(parse_expression("''").unwrap(), Expression::Literal(json!("")));
    }

    #[test]
    fn test_call_with_whitespace() {
        let expr = parse_expression(" concat( 'a' , this ) ").unwrap();
        assert_eq!(
            expr,
            Expression::Call {
                function: "concat".to_string(),
                args: vec![Expression::Literal(json!("a")), Expression::Path(Path::current())],
            }
        );
    }

    #[test]
    fn test_trailing_input_is_an_error() {
        assert!(matches!(parse_expression("name )"), Err(JPathError::JPathParse(..))));
        assert!(matches!(parse_expression("this name"), Err(JPathError::JPathParse(..))));
    }
}
