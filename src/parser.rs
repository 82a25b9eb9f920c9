use nom::bytes::complete::{is_not, tag};
use nom::branch::alt;
use nom::character::complete::{char, digit0, digit1, one_of};
use nom::combinator::{opt, recognize, rest};
use nom::error::Error;
use nom::sequence::{pair, preceded};
use nom::IResult;

use crate::types::is_space;

/// `##key=value` or `##key`.
pub(crate) fn meta_line(input: &[u8]) -> IResult<&[u8], (&[u8], Option<&[u8]>)> {
    preceded(tag("##"), pair(is_not("="), opt(preceded(char('='), rest))))(input)
}

/// Splits a meta line into an owned key and value.
pub(crate) fn meta_entry(line: &[u8]) -> Option<(String, String)> {
    let (_, (key, value)) = meta_line(line).ok()?;
    Some((
        String::from_utf8_lossy(key).into_owned(),
        value
            .map(|v| String::from_utf8_lossy(v).into_owned())
            .unwrap_or_default(),
    ))
}

pub(crate) fn is_meta_line(line: &[u8]) -> bool {
    line.starts_with(b"##")
}

fn trim_leading_space(input: &[u8]) -> &[u8] {
    let start = input
        .iter()
        .position(|&b| !is_space(b))
        .unwrap_or(input.len());
    &input[start..]
}

/// Parses the longest numeric prefix of `input` as a float, like C `atof`.
///
/// Leading whitespace is skipped. Input without a numeric prefix yields 0.
pub fn leading_f64(input: &[u8]) -> f64 {
    let input = trim_leading_space(input);
    match nom::number::complete::double::<_, Error<&[u8]>>(input) {
        Ok((_, v)) => v,
        // `double` rejects a dangling exponent such as `1e` or `2.5E+`
        Err(_) => mantissa(input)
            .ok()
            .and_then(|(_, digits)| std::str::from_utf8(digits).ok())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0.0),
    }
}

/// Sign, integer digits and fraction of a float, without any exponent.
fn mantissa(input: &[u8]) -> IResult<&[u8], &[u8]> {
    recognize(pair(
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
    ))(input)
}

/// Parses the longest integer prefix of `input`, like C `atoi`.
///
/// Leading whitespace is skipped. Input without digits, or whose digits
/// overflow `i64`, yields 0.
pub fn leading_i64(input: &[u8]) -> i64 {
    nom::character::complete::i64::<_, Error<&[u8]>>(trim_leading_space(input))
        .map(|(_, v)| v)
        .unwrap_or(0)
}
