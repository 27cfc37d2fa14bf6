//! The SMTP probe: liveness selection and recipient verification.
//!
//! [`check_mailbox`] is the one-call entry point the CLI uses; the pieces
//! ([`select_live_server`], [`verify_recipient`]) are public for callers
//! that already know their MX hosts.

mod dial;
mod error;
mod liveness;
mod options;
mod session;
mod types;
mod verifier;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::ProbeError;
pub use liveness::select_live_server;
pub use options::{ProbeOptions, ProxyEndpoint};
pub use types::{LivenessResult, ProbeReport, RcptOutcome, SmtpReply};
pub use verifier::verify_recipient;

use crate::mx::{self, MxRecord};
use crate::syntax;

/// Runs the whole probe for one address: MX discovery, liveness selection,
/// recipient verification, report assembly.
///
/// The MX list degrades to empty on any DNS trouble; verification then
/// proceeds against the bare domain, since a domain without MX records may
/// accept mail on its apex host.
pub fn check_mailbox(address: &str, options: &ProbeOptions) -> Result<ProbeReport, ProbeError> {
    let domain = syntax::domain_of(address).ok_or(ProbeError::MissingDomain)?;
    let ascii = mx::normalize_domain(domain).unwrap_or_else(|_| domain.to_string());
    let records = mx::resolve_mx(domain);
    assemble(address, &ascii, records, options)
}

pub(crate) fn check_mailbox_with_resolver<R>(
    address: &str,
    options: &ProbeOptions,
    resolver: &R,
) -> Result<ProbeReport, ProbeError>
where
    R: mx::LookupMx,
{
    let domain = syntax::domain_of(address).ok_or(ProbeError::MissingDomain)?;
    let ascii = mx::normalize_domain(domain).unwrap_or_else(|_| domain.to_string());
    let records = mx::resolve_with(resolver, &ascii);
    assemble(address, &ascii, records, options)
}

fn assemble(
    address: &str,
    ascii_domain: &str,
    records: Vec<MxRecord>,
    options: &ProbeOptions,
) -> Result<ProbeReport, ProbeError> {
    let mx_domains: Vec<String> = records.into_iter().map(|record| record.exchange).collect();
    let mx_exists = !mx_domains.is_empty();
    let candidates = if mx_exists {
        mx_domains.clone()
    } else {
        vec![ascii_domain.to_string()]
    };

    let liveness = select_live_server(&candidates, options);
    let outcome = verify_recipient(liveness.server_host.as_deref(), address, options)?;

    Ok(ProbeReport {
        server_is_online: liveness.online,
        server_helo_response: liveness.helo_greeting,
        rcpt_to_response: outcome.rcpt_to_response,
        address_exists: outcome.address_exists,
        mail_from_response: outcome.mail_from_response,
        wrong_address_accepted: outcome.wrong_address_accepted,
        address: syntax::is_valid_address(address),
        mx_exists,
        mx_domains,
    })
}

#[cfg(test)]
mod tests {
    use super::testutil::{MockScript, spawn_mock_server};
    use super::*;
    use crate::mx::tests::StubResolver;

    fn options_for(port: u16) -> ProbeOptions {
        ProbeOptions {
            port,
            ..ProbeOptions::default()
        }
    }

    fn loopback_resolver() -> StubResolver {
        StubResolver::new(|_| Ok(vec![MxRecord::new(10, "127.0.0.1")]))
    }

    fn full_session(rcpt_target: &'static str, rcpt_control: &'static str) -> MockScript {
        MockScript::new(
            "220 mx1 ready\r\n",
            vec![
                ("EHLO", "250 ehlo-ok\r\n"),
                ("MAIL FROM:", "250 sender-ok\r\n"),
                ("RCPT TO:", rcpt_target),
                ("RCPT TO:", rcpt_control),
            ],
        )
    }

    #[test]
    fn missing_domain_is_an_error() {
        let err = check_mailbox("not-an-address", &ProbeOptions::default())
            .expect_err("should fail");
        assert!(matches!(err, ProbeError::MissingDomain));
    }

    #[test]
    fn end_to_end_verifying_server() {
        let (port, handle) = spawn_mock_server(vec![
            MockScript::greeting_only("220 mx1 ready\r\n"),
            full_session("250 recipient-ok\r\n", "550 unknown user\r\n"),
        ]);
        let report = check_mailbox_with_resolver(
            "alice@example.org",
            &options_for(port),
            &loopback_resolver(),
        )
        .expect("report");

        assert!(report.server_is_online);
        assert_eq!(report.server_helo_response.as_deref(), Some("220 mx1 ready"));
        assert!(report.mx_exists);
        assert_eq!(report.mx_domains, vec!["127.0.0.1".to_string()]);
        assert!(report.address_exists);
        assert!(!report.wrong_address_accepted);
        assert_eq!(report.mail_from_response, "250 sender-ok");
        assert_eq!(report.rcpt_to_response, "250 recipient-ok");
        assert!(report.address);
        handle.join().expect("mock server");
    }

    #[test]
    fn no_mx_records_probe_the_bare_domain() {
        // Catch-all server behind the apex host: every recipient accepted.
        let (port, handle) = spawn_mock_server(vec![
            MockScript::greeting_only("220 apex ready\r\n"),
            full_session("250 ok\r\n", "250 ok\r\n"),
        ]);
        let empty = StubResolver::new(|_| Ok(Vec::new()));
        let report =
            check_mailbox_with_resolver("user@127.0.0.1", &options_for(port), &empty)
                .expect("report");

        assert!(!report.mx_exists);
        assert!(report.mx_domains.is_empty());
        assert!(report.server_is_online, "bare domain must still be probed");
        assert!(report.address_exists);
        assert!(report.wrong_address_accepted, "catch-all must be flagged");
        handle.join().expect("mock server");
    }

    #[test]
    fn nothing_listening_yields_fully_negative_report() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let mut options = options_for(port);
        options.connect_timeout = std::time::Duration::from_millis(500);
        options.command_timeout = std::time::Duration::from_millis(500);

        let report =
            check_mailbox_with_resolver("alice@example.org", &options, &loopback_resolver())
                .expect("report");

        assert!(!report.server_is_online);
        assert!(report.server_helo_response.is_none());
        assert!(!report.address_exists);
        assert!(!report.wrong_address_accepted);
        assert_eq!(report.mail_from_response, "");
        assert_eq!(report.rcpt_to_response, "");
        assert!(report.mx_exists);
    }

    #[test]
    fn repeated_probes_are_idempotent() {
        let (port, handle) = spawn_mock_server(vec![
            MockScript::greeting_only("220 mx1 ready\r\n"),
            full_session("550 no such user\r\n", "550 no such user\r\n"),
            MockScript::greeting_only("220 mx1 ready\r\n"),
            full_session("550 no such user\r\n", "550 no such user\r\n"),
        ]);
        let options = options_for(port);
        let first =
            check_mailbox_with_resolver("bob@example.org", &options, &loopback_resolver())
                .expect("first run");
        let second =
            check_mailbox_with_resolver("bob@example.org", &options, &loopback_resolver())
                .expect("second run");

        assert_eq!(first, second);
        assert!(!first.address_exists);
        assert!(!first.wrong_address_accepted);
        handle.join().expect("mock server");
    }
}
