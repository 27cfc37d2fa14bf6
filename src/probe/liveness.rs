use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use super::dial::dial;
use super::options::ProbeOptions;
use super::session::SmtpStream;
use super::types::LivenessResult;

/// Scans `candidates` (MX priority order) for the first server that answers
/// with a `220` greeting on the configured port.
///
/// Dials run concurrently, but outcomes are consumed strictly in candidate
/// order: the first candidate *in the given order* that is alive wins, even
/// when a lower-priority one answers faster. Once a winner is known the
/// remaining dials are abandoned: not-yet-started ones are skipped via a
/// flag, in-flight ones run into their socket deadline and their late
/// results land in a dropped channel.
pub fn select_live_server(candidates: &[String], options: &ProbeOptions) -> LivenessResult {
    let limit = options.max_candidates;
    let options = options.clone();
    select_live_with(candidates, limit, move |host| greet(host, &options))
}

pub(crate) fn select_live_with<F>(
    candidates: &[String],
    max_candidates: usize,
    dialer: F,
) -> LivenessResult
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let candidates: Vec<String> = candidates
        .iter()
        .take(max_candidates.max(1))
        .cloned()
        .collect();
    if candidates.is_empty() {
        return LivenessResult::offline();
    }

    let dialer = Arc::new(dialer);
    let abandon = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<(usize, Option<String>)>();

    for (idx, host) in candidates.iter().cloned().enumerate() {
        let dialer = Arc::clone(&dialer);
        let abandon = Arc::clone(&abandon);
        let tx = tx.clone();
        thread::spawn(move || {
            let outcome = if abandon.load(Ordering::Relaxed) {
                None
            } else {
                dialer(&host)
            };
            let _ = tx.send((idx, outcome));
        });
    }
    drop(tx);

    // One slot per candidate; `next` only advances over settled slots, so
    // the winner is always the earliest alive candidate.
    let mut outcomes: Vec<Option<Option<String>>> = vec![None; candidates.len()];
    let mut next = 0usize;
    while let Ok((idx, outcome)) = rx.recv() {
        outcomes[idx] = Some(outcome);
        while next < candidates.len() {
            match outcomes[next].as_ref() {
                None => break,
                Some(None) => next += 1,
                Some(Some(greeting)) => {
                    abandon.store(true, Ordering::Relaxed);
                    return LivenessResult::alive(candidates[next].clone(), greeting.clone());
                }
            }
        }
        if next == candidates.len() {
            break;
        }
    }
    LivenessResult::offline()
}

/// One liveness attempt: connect, read the banner, hang up.
fn greet(host: &str, options: &ProbeOptions) -> Option<String> {
    let stream = match dial(
        host,
        options.port,
        options.proxy.as_ref(),
        options.connect_timeout,
        options.command_timeout,
    ) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::debug!(host, error = %err, "candidate unreachable");
            return None;
        }
    };
    let mut stream = SmtpStream::new(stream);
    let reply = match stream.read_reply() {
        Ok(reply) => reply,
        Err(err) => {
            tracing::debug!(host, error = %err, "no greeting from candidate");
            return None;
        }
    };
    tracing::debug!(host, greeting = %reply.text(), "candidate answered");
    if reply.code_prefix() == "220" {
        Some(reply.text())
    } else {
        None
    }
}
