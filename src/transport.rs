use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::warn;

use crate::error::OscError;

/// How long a blocking receive waits before re-checking the stop flag. The
/// blocking `recv_from` has no other cancellation signal, so this bounds how
/// long `request_stop` can go unobserved.
const RECV_TIMEOUT: Duration = Duration::from_millis(200);

/// Datagram socket wrapper driving the receive loop. `request_stop` may be
/// called from any thread and unblocks an in-progress or future
/// `run_receive_loop`; `has_stopped` flips once the loop has actually
/// exited, which is what makes a race-free join possible.
pub struct UdpTransport {
    socket: UdpSocket,
    stop: AtomicBool,
    stopped: AtomicBool,
}

impl UdpTransport {
    /// Bind a UDP socket on `port`, any local address. Port 0 asks the OS
    /// for an ephemeral port; see `local_port`.
    pub fn bind(port: u16) -> Result<Self, OscError> {
        let socket =
            UdpSocket::bind(("0.0.0.0", port)).map_err(|source| OscError::Bind { port, source })?;
        socket
            .set_read_timeout(Some(RECV_TIMEOUT))
            .map_err(|source| OscError::Bind { port, source })?;
        Ok(UdpTransport {
            socket,
            stop: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        })
    }

    /// The actually bound port (useful after binding port 0).
    pub fn local_port(&self) -> u16 {
        self.socket.local_addr().map(|addr| addr.port()).unwrap_or(0)
    }

    /// Block the calling thread, invoking `on_packet` once per received
    /// datagram, until `request_stop` is called. Receive errors other than
    /// the timeout are logged and the loop keeps going.
    pub fn run_receive_loop<F>(&self, mut on_packet: F)
    where
        F: FnMut(&[u8], SocketAddr),
    {
        let mut buf = [0u8; rosc::decoder::MTU];
        while !self.stop.load(Ordering::SeqCst) {
            match self.socket.recv_from(&mut buf) {
                Ok((size, peer)) => on_packet(&buf[..size], peer),
                Err(ref e)
                    if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut =>
                {
                    // timeout, loop around to re-check the stop flag
                    continue;
                }
                Err(e) => {
                    warn!("OSC recv error: {}", e);
                }
            }
        }
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// True once `run_receive_loop` has observed the stop request and
    /// returned.
    pub fn has_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_on_busy_port_fails() {
        let first = UdpTransport::bind(0).unwrap();
        let port = first.local_port();
        match UdpTransport::bind(port) {
            Err(OscError::Bind { port: p, .. }) => assert_eq!(p, port),
            other => panic!("expected Bind error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn stop_requested_before_the_loop_still_terminates_it() {
        let transport = UdpTransport::bind(0).unwrap();
        transport.request_stop();
        transport.run_receive_loop(|_, _| panic!("no packet expected"));
        assert!(transport.has_stopped());
    }

    #[test]
    fn stop_unblocks_a_running_loop() {
        let transport = std::sync::Arc::new(UdpTransport::bind(0).unwrap());
        let worker = {
            let transport = std::sync::Arc::clone(&transport);
            std::thread::spawn(move || transport.run_receive_loop(|_, _| {}))
        };
        transport.request_stop();
        worker.join().unwrap();
        assert!(transport.has_stopped());
    }
}
