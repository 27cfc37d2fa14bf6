use serde::{Deserialize, Serialize};

/// One complete server reply, possibly spanning several continuation lines.
/// Lines are kept raw; classification works on the literal code prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    lines: Vec<String>,
}

impl SmtpReply {
    pub(crate) fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The first three characters of the first line, or `""` when the reply
    /// is shorter than a status code.
    pub fn code_prefix(&self) -> &str {
        self.lines
            .first()
            .and_then(|line| line.get(..3))
            .unwrap_or("")
    }

    /// A reply counts as positive only when its code prefix is literally
    /// `220` or `250`. Everything else (4xx, 5xx, or unparseable text) is
    /// a rejection for whichever stage observed it.
    pub fn is_positive(&self) -> bool {
        matches!(self.code_prefix(), "220" | "250")
    }

    /// The reply text as received, trimmed, continuation lines joined.
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }
}

/// Outcome of scanning the candidate servers for one that greets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivenessResult {
    pub online: bool,
    pub helo_greeting: Option<String>,
    pub server_host: Option<String>,
}

impl LivenessResult {
    pub(crate) fn alive(host: impl Into<String>, greeting: String) -> Self {
        Self {
            online: true,
            helo_greeting: Some(greeting),
            server_host: Some(host.into()),
        }
    }

    pub(crate) fn offline() -> Self {
        Self {
            online: false,
            helo_greeting: None,
            server_host: None,
        }
    }
}

/// What the recipient-verification session concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcptOutcome {
    pub address_exists: bool,
    /// True when the server also accepted the fabricated control recipient,
    /// i.e. the `address_exists` verdict cannot be trusted (catch-all).
    pub wrong_address_accepted: bool,
    pub mail_from_response: String,
    pub rcpt_to_response: String,
}

impl RcptOutcome {
    /// The verdict when no live server was found: nothing was probed, so
    /// every field is negative/empty.
    pub(crate) fn unreachable() -> Self {
        Self {
            address_exists: false,
            wrong_address_accepted: false,
            mail_from_response: String::new(),
            rcpt_to_response: String::new(),
        }
    }
}

/// Final report for one probed address. Field names and order are the JSON
/// output contract of the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub server_is_online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_helo_response: Option<String>,
    pub rcpt_to_response: String,
    pub address_exists: bool,
    pub mail_from_response: String,
    pub wrong_address_accepted: bool,
    /// Syntactic validity of the input address (pure predicate).
    pub address: bool,
    pub mx_exists: bool,
    pub mx_domains: Vec<String>,
}
