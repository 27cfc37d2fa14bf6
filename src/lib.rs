#![forbid(unsafe_code)]
//! mailprobe: checks whether a mailbox accepts mail without delivering any.
//!
//! The probe resolves the domain's MX records, picks the first exchanger that
//! answers with an SMTP greeting, and walks a short `EHLO`/`MAIL FROM`/
//! `RCPT TO` dialogue. A second, fabricated recipient is offered as a control
//! so catch-all servers do not produce false positives.

pub mod mx;
pub mod probe;
pub mod syntax;

pub use mx::{MxRecord, resolve_mx};
pub use probe::{
    LivenessResult, ProbeError, ProbeOptions, ProbeReport, ProxyEndpoint, RcptOutcome,
    check_mailbox, select_live_server, verify_recipient,
};
pub use syntax::is_valid_address;
