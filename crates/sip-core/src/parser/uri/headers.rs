//! URI header component: `?name=value&name=value`

use nom::{
    bytes::complete::{take_till, take_till1},
    character::complete::char,
    combinator::map,
    multi::separated_list1,
    sequence::separated_pair,
    IResult,
};

// header = hname "=" hvalue
fn uri_header(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(
            take_till1(|c| c == '=' || c == '&'),
            char('='),
            take_till(|c| c == '&'),
        ),
        |(name, value): (&str, &str)| (name.to_string(), value.to_string()),
    )(input)
}

/// headers = header *( "&" header ), without the leading `?`
pub fn uri_headers(input: &str) -> IResult<&str, Vec<(String, String)>> {
    separated_list1(char('&'), uri_header)(input)
}
