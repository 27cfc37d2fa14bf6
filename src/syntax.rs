//! Address shape checks. Pure string predicates, no network involved.

use std::sync::OnceLock;

use regex::Regex;

static ADDRESS_RE: OnceLock<Regex> = OnceLock::new();

/// Cheap syntactic test for `local@domain.tld` shapes.
///
/// Deliberately narrower than RFC 5322: dotted/dashed word runs on both
/// sides and a 2-3 letter final label. The probe itself does not depend on
/// this; it only feeds the `address` field of the report.
pub fn is_valid_address(addr: &str) -> bool {
    let re = ADDRESS_RE.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("address pattern")
    });
    re.is_match(addr)
}

/// Returns the domain part of `addr`, i.e. everything after the first `@`.
pub fn domain_of(addr: &str) -> Option<&str> {
    addr.split_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_address("alice@example.org"));
        assert!(is_valid_address("first.last@mail.example.com"));
        assert!(is_valid_address("a-b@ex-ample.io"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("no-at-sign"));
        assert!(!is_valid_address("@example.org"));
        assert!(!is_valid_address("alice@"));
        assert!(!is_valid_address("alice@nodot"));
        assert!(!is_valid_address("alice@example."));
        assert!(!is_valid_address("alice bob@example.org"));
    }

    #[test]
    fn domain_of_splits_on_first_at() {
        assert_eq!(domain_of("alice@example.org"), Some("example.org"));
        assert_eq!(domain_of("a@b@c"), Some("b@c"));
        assert_eq!(domain_of("alice"), None);
        assert_eq!(domain_of("alice@"), None);
    }

    proptest! {
        #[test]
        fn simple_alphanumeric_addresses_pass(
            local in "[a-z0-9]{1,12}",
            host in "[a-z0-9]{1,12}",
            tld in "[a-z]{2,3}",
        ) {
            let addr = format!("{}@{}.{}", local, host, tld);
            prop_assert!(is_valid_address(&addr));
        }
    }
}
