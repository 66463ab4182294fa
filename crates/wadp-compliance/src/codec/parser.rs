use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag, take_while};
use nom::character::complete::{char, digit1, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, map, opt, recognize, value};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated, tuple};
use nom::IResult;

use super::{CodecError, RecordFields};

/// Decodes a whole portal document. Blank input is an empty document;
/// anything else must parse completely.
pub fn parse_records(input: &str) -> Result<Vec<RecordFields>, CodecError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    match document(input) {
        Ok((_, records)) => Ok(records),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(CodecError::Syntax {
            near: snippet(err.input),
        }),
        Err(nom::Err::Incomplete(_)) => Err(CodecError::Truncated),
    }
}

fn snippet(rest: &str) -> String {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return "end of document".to_string();
    }
    let mut cut: String = trimmed.chars().take(32).collect();
    if trimmed.chars().count() > 32 {
        cut.push_str("...");
    }
    cut
}

fn document(input: &str) -> IResult<&str, Vec<RecordFields>> {
    let records = delimited(
        char('{'),
        many0(terminated(ws(record), opt(ws(one_of(",;"))))),
        preceded(multispace0, char('}')),
    );

    all_consuming(delimited(
        multispace0,
        preceded(opt(terminated(tag("return"), multispace0)), records),
        multispace0,
    ))(input)
}

fn record(input: &str) -> IResult<&str, RecordFields> {
    map(
        delimited(
            char('{'),
            many0(terminated(ws(field_entry), opt(ws(one_of(",;"))))),
            preceded(multispace0, char('}')),
        ),
        |entries| {
            let mut fields = RecordFields::new();
            for (key, entry) in entries {
                // nil assignments drop the field entirely
                if let Some(raw) = entry {
                    fields.insert(key, raw);
                }
            }
            fields
        },
    )(input)
}

fn field_entry(input: &str) -> IResult<&str, (String, Option<String>)> {
    separated_pair(field_key, ws(char('=')), scalar)(input)
}

fn field_key(input: &str) -> IResult<&str, String> {
    alt((
        map(identifier, str::to_string),
        delimited(char('['), ws(quoted), char(']')),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn scalar(input: &str) -> IResult<&str, Option<String>> {
    alt((
        map(quoted, Some),
        map(number, |digits: &str| Some(digits.to_string())),
        value(Some(String::from("true")), tag("true")),
        value(Some(String::from("false")), tag("false")),
        value(None, tag("nil")),
    ))(input)
}

fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1)))))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((single_quoted, double_quoted))(input)
}

fn single_quoted(input: &str) -> IResult<&str, String> {
    let (rest, body) = delimited(
        char('\''),
        opt(escaped_transform(is_not("\\'"), '\\', escape_sequence)),
        char('\''),
    )(input)?;
    Ok((rest, body.unwrap_or_default()))
}

fn double_quoted(input: &str) -> IResult<&str, String> {
    let (rest, body) = delimited(
        char('"'),
        opt(escaped_transform(is_not("\\\""), '\\', escape_sequence)),
        char('"'),
    )(input)?;
    Ok((rest, body.unwrap_or_default()))
}

fn escape_sequence(input: &str) -> IResult<&str, &str> {
    alt((
        value("\\", char('\\')),
        value("'", char('\'')),
        value("\"", char('"')),
        value("\n", char('n')),
        value("\t", char('t')),
        value("\r", char('r')),
    ))(input)
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}
