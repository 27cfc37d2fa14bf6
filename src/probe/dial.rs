use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use socks::Socks5Stream;

use super::error::ProbeError;
use super::options::ProxyEndpoint;

/// Opens a TCP connection to `host:port`, either directly or through the
/// SOCKS5 proxy. The proxy is dialed and handed the true destination
/// host/port as its target, so name resolution happens at the proxy's
/// vantage point. Read/write deadlines are set before the stream is handed
/// back.
pub(crate) fn dial(
    host: &str,
    port: u16,
    proxy: Option<&ProxyEndpoint>,
    connect_timeout: Duration,
    command_timeout: Duration,
) -> Result<TcpStream, ProbeError> {
    let stream = match proxy {
        Some(endpoint) => dial_via_proxy(host, port, endpoint)?,
        None => dial_direct(host, port, connect_timeout)?,
    };
    stream
        .set_read_timeout(Some(command_timeout))
        .map_err(ProbeError::io)?;
    stream
        .set_write_timeout(Some(command_timeout))
        .map_err(ProbeError::io)?;
    Ok(stream)
}

fn dial_direct(host: &str, port: u16, connect_timeout: Duration) -> Result<TcpStream, ProbeError> {
    let target = format!("{host}:{port}");
    let addrs = target
        .to_socket_addrs()
        .map_err(|err| ProbeError::connect(&target, err))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, connect_timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_err = Some(err),
        }
    }
    let source = last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no address resolved")
    });
    Err(ProbeError::connect(target, source))
}

fn dial_via_proxy(
    host: &str,
    port: u16,
    endpoint: &ProxyEndpoint,
) -> Result<TcpStream, ProbeError> {
    let proxy_addr = (endpoint.host.as_str(), endpoint.port);
    let stream = Socks5Stream::connect(proxy_addr, (host, port)).map_err(|err| {
        ProbeError::Proxy {
            proxy: endpoint.to_string(),
            source: err,
        }
    })?;
    Ok(stream.into_inner())
}
