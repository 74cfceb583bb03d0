// Parser tests for SIP URIs as the proxy core receives them: configured
// routes, Request-URIs and registrar contact strings.

use std::str::FromStr;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sipfwd_sip_core::{
    error::Error,
    types::param::{Param, ParamList},
    types::uri::{Host, Scheme, Uri},
};

#[test]
fn test_parse_sip_uri() {
    let uri = Uri::from_str("sip:user@example.com").expect("Failed to parse basic SIP URI");
    assert_eq!(uri.scheme, Scheme::Sip, "URI scheme should be SIP");
    assert_eq!(uri.user.as_deref(), Some("user"));
    assert_eq!(uri.host.to_string(), "example.com");
    assert!(uri.port.is_none());
    assert!(uri.parameters.is_empty());
    assert!(uri.headers.is_empty());

    let uri = Uri::from_str("sip:user@example.com:5060").expect("Failed to parse URI with port");
    assert_eq!(uri.port, Some(5060));

    let uri = Uri::from_str("sip:user@example.com;transport=tcp;ttl=5")
        .expect("Failed to parse URI with parameters");
    assert_eq!(uri.transport(), Some("tcp"));
    assert_eq!(uri.param_value("ttl"), Some("5"));

    let uri = Uri::from_str("sip:user@example.com?subject=Meeting&priority=urgent")
        .expect("Failed to parse URI with headers");
    assert_eq!(uri.headers.len(), 2);
    assert_eq!(uri.headers[0], ("subject".to_string(), "Meeting".to_string()));

    let uri = Uri::from_str("sip:example.com").expect("Failed to parse URI without user part");
    assert_eq!(uri.user, None);

    let uri = Uri::from_str("sips:secure@example.com").expect("Failed to parse SIPS URI");
    assert_eq!(uri.scheme, Scheme::Sips);
    assert_eq!(uri.effective_port(), 5061);

    let uri = Uri::from_str("sip:user@192.0.2.1").expect("Failed to parse IPv4 URI");
    assert_eq!(uri.host, Host::Address("192.0.2.1".parse().unwrap()));

    let uri = Uri::from_str("sip:user@[2001:db8::1]:5070").expect("Failed to parse IPv6 URI");
    assert!(uri.host.is_ip());
    assert_eq!(uri.port, Some(5070));

    let uri = Uri::from_str("sip:user:password@example.com").expect("Failed to parse password");
    assert_eq!(uri.user.as_deref(), Some("user"));
    assert_eq!(uri.password.as_deref(), Some("password"));
}

#[test]
fn test_proxy_marker_params() {
    let uri = Uri::from_str(
        "sip:p1.example.com;lr;fs-received=203.0.113.7;fs-rport=41234;fs-proxy-id=9f3c",
    )
    .unwrap();
    assert!(uri.has_param("lr"));
    assert_eq!(uri.param("lr"), Some(&Param::lr()));
    assert_eq!(uri.param_value("fs-received"), Some("203.0.113.7"));
    assert_eq!(uri.param_value("fs-rport"), Some("41234"));
    assert_eq!(uri.parameters.param_value("fs-proxy-id"), Some("9f3c"));
}

#[test]
fn test_gruu_contact() {
    let uri = Uri::from_str("sip:bob@203.0.113.5;gr=urn:uuid:f81d4fae-7dec-11d0-a765-00a0c91e6bf6")
        .unwrap();
    assert_eq!(
        uri.param_value("gr"),
        Some("urn:uuid:f81d4fae-7dec-11d0-a765-00a0c91e6bf6")
    );
}

#[test]
fn test_display_round_trip() {
    for text in [
        "sip:bob@example.com",
        "sip:bob@example.com:5070;transport=tcp;lr",
        "sips:alice:secret@example.com:5061;maddr=239.255.255.1?subject=x&priority=y",
        "sip:[2001:db8::1]:5060",
        "tel:+15551234;phone-context=example.com",
    ] {
        let uri = Uri::from_str(text).unwrap();
        assert_eq!(uri.to_string(), text);
    }
}

#[test]
fn test_invalid_uris() {
    for text in ["", "example.com", "sip:", "sip:host:99999", "sip:[::1"] {
        match Uri::from_str(text) {
            Err(Error::InvalidUri(_)) | Err(Error::InvalidHost(_)) => {}
            other => panic!("expected error for '{}', got {:?}", text, other),
        }
    }
}

proptest! {
    #[test]
    fn prop_params_survive_parse(names in proptest::collection::vec("[a-z][a-z0-9-]{0,8}", 0..6)) {
        let mut text = String::from("sip:user@example.com");
        for (i, name) in names.iter().enumerate() {
            text.push_str(&format!(";{}={}", name, i));
        }
        let uri = Uri::from_str(&text).unwrap();
        prop_assert_eq!(uri.parameters.len(), names.len());
        for (param, name) in uri.parameters.iter().zip(names.iter()) {
            prop_assert_eq!(&param.name, name);
        }
        prop_assert_eq!(uri.to_string(), text);
    }
}
