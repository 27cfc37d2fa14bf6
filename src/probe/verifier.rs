use rand::{Rng, distributions::Alphanumeric};

use super::dial::dial;
use super::error::ProbeError;
use super::options::ProbeOptions;
use super::session::SmtpStream;
use super::types::{RcptOutcome, SmtpReply};

/// Domain of the fabricated control recipient. It must never accept mail;
/// a server that says yes to it says yes to anything.
const CONTROL_DOMAIN: &str = "wwrronggmail.com";

/// Asks `server_host` whether `target` is a deliverable mailbox.
///
/// The session is a fixed five-step dialogue: greeting, `EHLO`, `MAIL FROM`,
/// `RCPT TO` for the real recipient, then `RCPT TO` for a fabricated one.
/// The control recipient distinguishes a verifying server from a catch-all:
/// if the fabricated address is not rejected, `wrong_address_accepted` is
/// reported and the positive verdict cannot be trusted.
///
/// `None` for `server_host` short-circuits to an all-negative outcome
/// without opening a connection. Connection and I/O failures abort the whole
/// verification; odd reply codes do not, they only turn verdict fields
/// negative. 4xx and 5xx replies are deliberately not distinguished.
pub fn verify_recipient(
    server_host: Option<&str>,
    target: &str,
    options: &ProbeOptions,
) -> Result<RcptOutcome, ProbeError> {
    let Some(host) = server_host else {
        return Ok(RcptOutcome::unreachable());
    };
    let stream = dial(
        host,
        options.port,
        options.proxy.as_ref(),
        options.connect_timeout,
        options.command_timeout,
    )?;
    let handshake = Handshake::new(target, control_recipient(), options);
    drive(SmtpStream::new(stream), handshake)
}

fn drive(mut stream: SmtpStream, mut handshake: Handshake) -> Result<RcptOutcome, ProbeError> {
    loop {
        let reply = stream.read_reply()?;
        tracing::debug!(state = ?handshake.state(), reply = %reply.text(), "server reply");
        match handshake.on_reply(&reply) {
            StepAction::Send(command) => {
                tracing::debug!(state = ?handshake.state(), %command, "sending");
                stream.send_command(&command)?;
            }
            StepAction::Finish => return Ok(handshake.finish()),
        }
    }
}

/// A fabricated recipient that is syntactically fine and certainly absent.
/// The local part is randomized so repeated probes do not hit server-side
/// caches.
fn control_recipient() -> String {
    let local: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();
    format!("{local}@{CONTROL_DOMAIN}")
}

/// Session states, one per expected server reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandshakeState {
    Greeting,
    Ehlo,
    MailFrom,
    RcptTarget,
    RcptProbe,
}

pub(crate) enum StepAction {
    Send(String),
    Finish,
}

/// The handshake state machine. Exactly one transition per inbound reply;
/// the verdict record is only ever touched from these transitions.
pub(crate) struct Handshake {
    state: HandshakeState,
    helo_domain: String,
    sender: String,
    target: String,
    control: String,
    address_exists: Option<bool>,
    wrong_address_accepted: Option<bool>,
    mail_from_response: String,
    rcpt_to_response: String,
}

impl Handshake {
    pub(crate) fn new(target: &str, control: String, options: &ProbeOptions) -> Self {
        Self {
            state: HandshakeState::Greeting,
            helo_domain: options.helo_domain.clone(),
            sender: options.sender.clone(),
            target: target.to_string(),
            control,
            address_exists: None,
            wrong_address_accepted: None,
            mail_from_response: String::new(),
            rcpt_to_response: String::new(),
        }
    }

    pub(crate) fn state(&self) -> HandshakeState {
        self.state
    }

    /// Advances the machine on one complete server reply.
    ///
    /// The pre-RCPT states advance no matter what the server said; reply
    /// codes only influence the verdict once the real and control
    /// recipients are on the wire.
    pub(crate) fn on_reply(&mut self, reply: &SmtpReply) -> StepAction {
        match self.state {
            HandshakeState::Greeting => {
                self.state = HandshakeState::Ehlo;
                StepAction::Send(format!("EHLO {}", self.helo_domain))
            }
            HandshakeState::Ehlo => {
                self.state = HandshakeState::MailFrom;
                StepAction::Send(format!("MAIL FROM: <{}>", self.sender))
            }
            HandshakeState::MailFrom => {
                self.mail_from_response = reply.text();
                self.state = HandshakeState::RcptTarget;
                StepAction::Send(format!("RCPT TO: <{}>", self.target))
            }
            HandshakeState::RcptTarget => {
                if reply.is_positive() {
                    if self.address_exists.is_none() {
                        self.rcpt_to_response = reply.text();
                        self.address_exists = Some(true);
                    }
                } else {
                    self.rcpt_to_response = reply.text();
                    self.address_exists = Some(false);
                }
                self.state = HandshakeState::RcptProbe;
                StepAction::Send(format!("RCPT TO: <{}>", self.control))
            }
            HandshakeState::RcptProbe => {
                if !reply.is_positive() {
                    self.wrong_address_accepted = Some(false);
                }
                StepAction::Finish
            }
        }
    }

    /// Seals the verdict. An unset `wrong_address_accepted` means the
    /// control recipient was never rejected, so the server accepts
    /// everything.
    pub(crate) fn finish(self) -> RcptOutcome {
        RcptOutcome {
            address_exists: self.address_exists.unwrap_or(false),
            wrong_address_accepted: self.wrong_address_accepted.unwrap_or(true),
            mail_from_response: self.mail_from_response,
            rcpt_to_response: self.rcpt_to_response,
        }
    }
}
