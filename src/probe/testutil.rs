//! Scripted loopback SMTP servers for the probe tests.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;

/// What one accepted connection says: a greeting, then a response for each
/// expected inbound command (matched by prefix).
pub(crate) struct MockScript {
    greeting: &'static str,
    exchanges: Vec<(&'static str, &'static str)>,
}

impl MockScript {
    pub(crate) fn new(
        greeting: &'static str,
        exchanges: Vec<(&'static str, &'static str)>,
    ) -> Self {
        Self {
            greeting,
            exchanges,
        }
    }

    /// A connection that only ever banners, as seen by a liveness check.
    pub(crate) fn greeting_only(greeting: &'static str) -> Self {
        Self::new(greeting, Vec::new())
    }
}

/// Binds a loopback listener and serves each script on one accepted
/// connection, in order. Returns once the listener is ready to accept.
pub(crate) fn spawn_mock_server(scripts: Vec<MockScript>) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
    let port = listener.local_addr().expect("addr").port();
    let (ready_tx, ready_rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        ready_tx.send(()).ok();
        for script in scripts {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let _ = serve(&mut stream, script);
        }
    });
    ready_rx.recv().expect("server ready");
    (port, handle)
}

fn serve(stream: &mut TcpStream, script: MockScript) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    stream.write_all(script.greeting.as_bytes())?;
    stream.flush()?;
    for (expected, response) in script.exchanges {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        assert!(
            line.starts_with(expected),
            "expected command starting with '{expected}', got '{line}'"
        );
        stream.write_all(response.as_bytes())?;
        stream.flush()?;
    }
    // Drain until the client hangs up so the close is always client-first.
    let mut rest = String::new();
    let _ = reader.read_line(&mut rest);
    Ok(())
}
