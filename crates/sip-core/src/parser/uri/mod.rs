//! nom parser for SIP, SIPS and opaque URIs
//!
//! The user part ends at the *first* `@`. A malformed URI such as
//! `sip:eve@bad@example.com` therefore parses with host `bad@example.com`;
//! callers that route on the host are expected to reject it.

mod headers;

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{take_till, take_till1, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::types::param::Param;
use crate::types::uri::{Host, Scheme, Uri};

pub use headers::uri_headers;

type SipParts<'a> = (
    Option<&'a str>,
    Host,
    Option<u16>,
    Vec<Param>,
    Option<Vec<(String, String)>>,
);

fn scheme(input: &str) -> IResult<&str, &str> {
    terminated(
        take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        char(':'),
    )(input)
}

// userinfo = user [ ":" password ] "@"
fn userinfo(input: &str) -> IResult<&str, &str> {
    terminated(take_till1(|c| matches!(c, '@' | ';' | '?')), char('@'))(input)
}

fn ipv6_reference(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('['), take_till1(|c| c == ']'), char(']')))(input)
}

fn hostname(input: &str) -> IResult<&str, &str> {
    take_till1(|c| matches!(c, ':' | ';' | '?'))(input)
}

fn host(input: &str) -> IResult<&str, Host> {
    map_res(alt((ipv6_reference, hostname)), Host::from_str)(input)
}

fn port(input: &str) -> IResult<&str, u16> {
    preceded(char(':'), map_res(digit1, |d: &str| d.parse::<u16>()))(input)
}

// uri-parameter = pname [ "=" pvalue ]
fn uri_param(input: &str) -> IResult<&str, Param> {
    map(
        pair(
            take_till1(|c| matches!(c, '=' | ';' | '?')),
            opt(preceded(char('='), take_till(|c| matches!(c, ';' | '?')))),
        ),
        |(name, value): (&str, Option<&str>)| Param {
            name: name.to_string(),
            value: value.map(str::to_string),
        },
    )(input)
}

fn uri_params(input: &str) -> IResult<&str, Vec<Param>> {
    many0(preceded(char(';'), uri_param))(input)
}

fn sip_parts(input: &str) -> IResult<&str, SipParts<'_>> {
    all_consuming(tuple((
        opt(userinfo),
        host,
        opt(port),
        uri_params,
        opt(preceded(char('?'), uri_headers)),
    )))(input)
}

fn opaque_parts(input: &str) -> IResult<&str, (&str, Vec<Param>)> {
    all_consuming(pair(take_till1(|c| c == ';'), uri_params))(input)
}

/// Parse a URI string into a [`Uri`].
pub fn parse_uri(input: &str) -> Result<Uri> {
    let (rest, scheme_text) = scheme(input)
        .map_err(|_| Error::InvalidUri(format!("missing scheme in '{}'", input)))?;
    let scheme = Scheme::from_str(scheme_text)?;

    if !scheme.is_sip() {
        let (_, (raw, parameters)) = opaque_parts(rest)
            .map_err(|e| Error::InvalidUri(format!("'{}': {:?}", input, e)))?;
        let mut uri = Uri::new(scheme, Host::Domain(String::new()));
        uri.raw_uri = Some(raw.to_string());
        uri.parameters = parameters;
        return Ok(uri);
    }

    let (_, (userinfo, host, port, parameters, headers)) =
        sip_parts(rest).map_err(|e| Error::InvalidUri(format!("'{}': {:?}", input, e)))?;

    let (user, password) = match userinfo {
        Some(info) => match info.split_once(':') {
            Some((user, password)) => (Some(user.to_string()), Some(password.to_string())),
            None => (Some(info.to_string()), None),
        },
        None => (None, None),
    };

    Ok(Uri {
        scheme,
        user,
        password,
        host,
        port,
        parameters,
        headers: headers.unwrap_or_default(),
        raw_uri: None,
    })
}
