//! Pure URI helpers used along the forwarding path

use std::str::FromStr;

use sipfwd_sip_core::{Address, Param, Scheme, Uri, Via};

/// Transport a URI asks for: its `transport` parameter, else TLS for `sips:`
/// and UDP otherwise. Upper-cased to compare against Via sent-protocols.
pub fn uri_transport(uri: &Uri) -> String {
    match uri.transport() {
        Some(transport) => transport.to_ascii_uppercase(),
        None if uri.scheme == Scheme::Sips => "TLS".to_string(),
        None => "UDP".to_string(),
    }
}

/// True when the host is a literal IP address, so no name resolution is needed
pub fn url_is_resolved(uri: &Uri) -> bool {
    uri.host.is_ip()
}

/// True when some Via entry was sent by `candidate`.
///
/// Host comparison is case-insensitive and ports compare after defaulting.
/// With `strict` the transports must agree as well.
pub fn url_via_match(candidate: &Uri, via_chain: &[Via], strict: bool) -> bool {
    let port = candidate.effective_port();
    let transport = strict.then(|| uri_transport(candidate));

    via_chain.iter().any(|via| {
        via.host.matches(&candidate.host)
            && via.effective_port() == port
            && transport
                .as_deref()
                .map_or(true, |t| via.transport.eq_ignore_ascii_case(t))
    })
}

/// Copy of `uri` without any parameter named in `names`
pub fn strip_params<S: AsRef<str>>(uri: &Uri, names: &[S]) -> Uri {
    let mut stripped = uri.clone();
    stripped
        .parameters
        .retain(|param| !names.iter().any(|name| name.as_ref() == param.name));
    stripped
}

/// Strip `names` from every Contact URI in place. Returns whether anything changed.
pub fn strip_contact_params<S: AsRef<str>>(contacts: &mut [Address], names: &[S]) -> bool {
    let mut changed = false;
    for contact in contacts.iter_mut() {
        let stripped = strip_params(&contact.uri, names);
        if stripped != contact.uri {
            contact.uri = stripped;
            changed = true;
        }
    }
    changed
}

/// Append the raw `name[=value]` token unless a parameter of that name exists.
/// Returns whether the parameter was added.
pub fn add_param_if_absent(uri: &mut Uri, param_text: &str) -> bool {
    let Ok(param) = Param::from_str(param_text) else {
        return false;
    };
    if uri.has_param(&param.name) {
        return false;
    }
    uri.parameters.push(param);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn uri(text: &str) -> Uri {
        Uri::from_str(text).unwrap()
    }

    #[test]
    fn test_url_is_resolved() {
        assert!(url_is_resolved(&uri("sip:alice@192.0.2.1")));
        assert!(url_is_resolved(&uri("sip:alice@[2001:db8::1]:5070")));
        assert!(!url_is_resolved(&uri("sip:alice@example.com")));
    }

    #[test]
    fn test_via_match_defaults_ports() {
        let vias = vec![Via::new("UDP", "GW.example.com", None)];
        assert!(url_via_match(&uri("sip:gw.example.com"), &vias, false));
        assert!(url_via_match(&uri("sip:gw.example.com:5060"), &vias, false));
        assert!(!url_via_match(&uri("sip:gw.example.com:5070"), &vias, false));
        assert!(!url_via_match(&uri("sips:gw.example.com"), &vias, false));
        assert!(!url_via_match(&uri("sip:other.example.com"), &vias, false));
    }

    #[test]
    fn test_via_match_strict_transport() {
        let vias = vec![
            Via::new("TCP", "a.example.com", Some(5080)),
            Via::new("TLS", "b.example.com", None),
        ];
        assert!(url_via_match(&uri("sip:a.example.com:5080"), &vias, false));
        assert!(!url_via_match(&uri("sip:a.example.com:5080"), &vias, true));
        assert!(url_via_match(&uri("sip:a.example.com:5080;transport=tcp"), &vias, true));
        assert!(url_via_match(&uri("sips:b.example.com"), &vias, true));
        assert!(url_via_match(&uri("sip:b.example.com;transport=tls"), &vias, true));
    }

    #[test]
    fn test_strip_params_keeps_order() {
        let original = uri("sip:bob@example.com;a=1;pn-tok=x;b;pn-type=y;c=3");
        let stripped = strip_params(&original, &["pn-tok", "pn-type"]);
        assert_eq!(stripped.to_string(), "sip:bob@example.com;a=1;b;c=3");
        assert_eq!(original.parameters.len(), 5);

        let untouched = strip_params(&original, &["missing"]);
        assert_eq!(untouched, original);
    }

    #[test]
    fn test_strip_contact_params() {
        let mut contacts = vec![
            Address::new(uri("sip:bob@192.0.2.7;pn-tok=abc;transport=tcp")),
            Address::new(uri("sip:bob@192.0.2.8")),
        ];
        assert!(strip_contact_params(&mut contacts, &["pn-tok"]));
        assert_eq!(contacts[0].uri.to_string(), "sip:bob@192.0.2.7;transport=tcp");
        assert!(!strip_contact_params(&mut contacts, &["pn-tok"]));
    }

    #[test]
    fn test_add_param_if_absent() {
        let mut target = uri("sip:gw.example.com");
        assert!(add_param_if_absent(&mut target, "transport=tcp"));
        assert_eq!(target.transport(), Some("tcp"));
        assert!(!add_param_if_absent(&mut target, "transport=tls"));
        assert_eq!(target.transport(), Some("tcp"));
        assert!(add_param_if_absent(&mut target, "lr"));
        assert_eq!(target.to_string(), "sip:gw.example.com;transport=tcp;lr");
    }

    proptest! {
        #[test]
        fn prop_strip_removes_listed_and_keeps_rest(
            names in proptest::collection::vec("[a-e]{1,2}", 0..8),
            remove in proptest::collection::vec("[a-e]{1,2}", 0..4),
        ) {
            let mut original = Uri::sip("example.com");
            for (i, name) in names.iter().enumerate() {
                original.parameters.push(Param::new(name.clone(), i.to_string()));
            }
            let stripped = strip_params(&original, &remove);

            for name in &remove {
                prop_assert!(!stripped.has_param(name));
            }
            let expected: Vec<Param> = original
                .parameters
                .iter()
                .filter(|p| !remove.contains(&p.name))
                .cloned()
                .collect();
            prop_assert_eq!(stripped.parameters, expected);
        }
    }
}
