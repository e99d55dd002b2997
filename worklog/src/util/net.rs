use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Can a TCP connection be made to `host:port`?
#[must_use]
pub fn check_server_port(host: &str, port: u16) -> bool {
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!("Unable to resolve {host}: {e}");
            return false;
        }
    };
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(_) => return true,
            Err(e) => debug!("Connecting to {addr} failed: {e}"),
        }
    }
    false
}
