use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;
use rosc::OscPacket;

use crate::callbacks::{CallbackHandle, CallbackRegistry};
use crate::error::OscError;
use crate::message::Message;
use crate::queue::MessageQueue;
use crate::transport::UdpTransport;

/// Interval between checks while waiting for the receive thread to
/// acknowledge a stop request.
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct ReceiveWorker {
    transport: Arc<UdpTransport>,
    thread: JoinHandle<()>,
}

/// Background OSC receiver. Owns one receive thread while running, a FIFO
/// of decoded messages for polling consumers, and a registry of
/// message-received callbacks.
///
/// Each received message goes to exactly one sink: if any callback is
/// registered it is invoked (and the message is not queued), otherwise the
/// message is queued for `get_next_message`.
pub struct Listener {
    queue: Arc<Mutex<MessageQueue>>,
    callbacks: Arc<Mutex<CallbackRegistry>>,
    worker: Option<ReceiveWorker>,
}

impl Listener {
    pub fn new() -> Self {
        Listener {
            queue: Arc::new(Mutex::new(MessageQueue::new())),
            callbacks: Arc::new(Mutex::new(CallbackRegistry::new())),
            worker: None,
        }
    }

    /// Bind a UDP socket on `port` (any local address, 0 for an ephemeral
    /// port) and start the receive thread. If the listener is already
    /// running it is shut down first, so the old thread and socket are
    /// released before rebinding. On a bind error the listener keeps its
    /// previous (stopped) state.
    pub fn setup(&mut self, port: u16) -> Result<(), OscError> {
        self.shutdown();

        let transport = Arc::new(UdpTransport::bind(port)?);
        let queue = Arc::clone(&self.queue);
        let callbacks = Arc::clone(&self.callbacks);
        let thread_transport = Arc::clone(&transport);
        let thread = thread::spawn(move || {
            thread_transport.run_receive_loop(|bytes, peer| {
                dispatch_datagram(bytes, peer, &queue, &callbacks);
            });
        });

        debug!("OSC listener bound on port {}", transport.local_port());
        self.worker = Some(ReceiveWorker { transport, thread });
        Ok(())
    }

    /// Stop the receive thread and release the socket. Idempotent; a no-op
    /// when not running. Signals the transport to abort its blocking
    /// receive, waits (sleep-and-check) until the receive loop has actually
    /// exited, then joins the thread. Joining only after the loop has
    /// confirmed its exit is what rules out a deadlock against the blocking
    /// receive call.
    pub fn shutdown(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.transport.request_stop();
            while !worker.transport.has_stopped() {
                thread::sleep(STOP_POLL_INTERVAL);
            }
            if worker.thread.join().is_err() {
                warn!("OSC receive thread panicked");
            }
            debug!("OSC listener stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// The bound port while running. Useful when `setup` was given port 0.
    pub fn local_port(&self) -> Option<u16> {
        self.worker.as_ref().map(|w| w.transport.local_port())
    }

    /// Non-blocking check for queued messages. Always `false` while any
    /// callback is registered, since messages then bypass the queue.
    pub fn has_waiting_messages(&self) -> bool {
        let callbacks = self.callbacks.lock();
        if !callbacks.is_empty() {
            return false;
        }
        !self.queue.lock().is_empty()
    }

    /// Pop the oldest queued message, non-blocking. Always `None` while any
    /// callback is registered.
    pub fn get_next_message(&self) -> Option<Message> {
        let callbacks = self.callbacks.lock();
        if !callbacks.is_empty() {
            return None;
        }
        self.queue.lock().pop_front()
    }

    /// Register `callback` to be invoked on the receive thread for every
    /// decoded message. While any callback is registered, polling sees
    /// nothing. Callbacks must not block for long; they delay every
    /// subsequent packet.
    pub fn register_message_received<F>(&self, callback: F) -> CallbackHandle
    where
        F: FnMut(&Message) + Send + 'static,
    {
        self.callbacks.lock().register(Box::new(callback))
    }

    /// Remove a previously registered callback. Unknown handles are
    /// ignored.
    pub fn unregister_message_received(&self, handle: CallbackHandle) {
        self.callbacks.lock().unregister(handle);
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener::new()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn dispatch_datagram(
    bytes: &[u8],
    peer: SocketAddr,
    queue: &Mutex<MessageQueue>,
    callbacks: &Mutex<CallbackRegistry>,
) {
    match rosc::decoder::decode_udp(bytes) {
        Ok((_, packet)) => dispatch_packet(packet, peer, queue, callbacks),
        Err(e) => {
            warn!("dropping undecodable OSC packet from {}: {}", peer, e);
        }
    }
}

/// Bundles are flattened: every contained message, recursively, is
/// dispatched on its own, in bundle order.
fn dispatch_packet(
    packet: OscPacket,
    peer: SocketAddr,
    queue: &Mutex<MessageQueue>,
    callbacks: &Mutex<CallbackRegistry>,
) {
    match packet {
        OscPacket::Message(decoded) => dispatch_message(decoded, peer, queue, callbacks),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                dispatch_packet(inner, peer, queue, callbacks);
            }
        }
    }
}

/// Deliver one decoded message to its single sink. The registry lock is
/// held across the whole decision and, when queueing, the queue lock is
/// taken under it, so a concurrent register/unregister can never split a
/// message between sinks or lose it.
fn dispatch_message(
    decoded: rosc::OscMessage,
    peer: SocketAddr,
    queue: &Mutex<MessageQueue>,
    callbacks: &Mutex<CallbackRegistry>,
) {
    let message = match Message::from_decoded(decoded, peer) {
        Ok(message) => message,
        Err(e) => {
            warn!("dropping OSC packet from {}: {}", peer, e);
            return;
        }
    };

    let mut callbacks = callbacks.lock();
    if callbacks.is_empty() {
        queue.lock().push_back(message);
    } else {
        callbacks.invoke_all(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosc::{OscBundle, OscMessage, OscTime, OscType};
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::mpsc::channel;

    fn peer() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 4242)
    }

    fn decoded(addr: &str, args: Vec<OscType>) -> OscMessage {
        OscMessage {
            addr: addr.to_string(),
            args,
        }
    }

    #[test]
    fn shutdown_without_setup_is_a_noop() {
        let mut listener = Listener::new();
        listener.shutdown();
        listener.shutdown();
        assert!(!listener.is_running());
    }

    #[test]
    fn shutdown_is_idempotent_after_running() {
        let mut listener = Listener::new();
        listener.setup(0).unwrap();
        assert!(listener.is_running());
        listener.shutdown();
        listener.shutdown();
        assert!(!listener.is_running());
    }

    #[test]
    fn setup_twice_restarts_cleanly() {
        let mut listener = Listener::new();
        listener.setup(0).unwrap();
        let first_port = listener.local_port().unwrap();
        // rebinding tears the old worker down first
        listener.setup(0).unwrap();
        assert!(listener.is_running());
        let second_port = listener.local_port().unwrap();
        assert!(second_port != 0);
        // the first port is free again (unless the OS just re-issued it)
        if second_port != first_port {
            assert!(UdpTransport::bind(first_port).is_ok());
        }
        listener.shutdown();
    }

    #[test]
    fn queued_when_no_callbacks() {
        let listener = Listener::new();
        dispatch_message(
            decoded("/a", vec![OscType::Int(1)]),
            peer(),
            &listener.queue,
            &listener.callbacks,
        );
        assert!(listener.has_waiting_messages());
        let msg = listener.get_next_message().unwrap();
        assert_eq!(msg.address, "/a");
        assert_eq!(msg.remote_port, 4242);
        assert!(listener.get_next_message().is_none());
    }

    #[test]
    fn callbacks_bypass_the_queue() {
        let listener = Listener::new();
        let (tx, rx) = channel();
        let handle = listener.register_message_received(move |msg: &Message| {
            tx.send(msg.address.clone()).unwrap();
        });

        dispatch_message(
            decoded("/cb", vec![]),
            peer(),
            &listener.queue,
            &listener.callbacks,
        );

        assert_eq!(rx.try_recv().unwrap(), "/cb");
        // with a callback registered the polling side sees nothing
        assert!(!listener.has_waiting_messages());
        assert!(listener.get_next_message().is_none());

        listener.unregister_message_received(handle);
        // nothing was queued behind the callback's back
        assert!(!listener.has_waiting_messages());
    }

    #[test]
    fn queued_messages_are_hidden_while_a_callback_is_registered() {
        let listener = Listener::new();
        dispatch_message(
            decoded("/early", vec![]),
            peer(),
            &listener.queue,
            &listener.callbacks,
        );
        assert!(listener.has_waiting_messages());

        let handle = listener.register_message_received(|_| {});
        assert!(!listener.has_waiting_messages());
        assert!(listener.get_next_message().is_none());

        // unregistering makes the backlog visible again
        listener.unregister_message_received(handle);
        assert_eq!(listener.get_next_message().unwrap().address, "/early");
    }

    #[test]
    fn unknown_argument_kind_drops_the_packet_only() {
        let listener = Listener::new();
        dispatch_message(
            decoded("/bad", vec![OscType::Blob(vec![0xff])]),
            peer(),
            &listener.queue,
            &listener.callbacks,
        );
        dispatch_message(
            decoded("/good", vec![OscType::Int(1)]),
            peer(),
            &listener.queue,
            &listener.callbacks,
        );
        // the bad packet vanished, the next one still flows
        let msg = listener.get_next_message().unwrap();
        assert_eq!(msg.address, "/good");
        assert!(listener.get_next_message().is_none());
    }

    #[test]
    fn bundles_are_flattened_in_order() {
        let listener = Listener::new();
        let bundle = OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: 0,
                fractional: 1,
            },
            content: vec![
                OscPacket::Message(decoded("/one", vec![])),
                OscPacket::Bundle(OscBundle {
                    timetag: OscTime {
                        seconds: 0,
                        fractional: 1,
                    },
                    content: vec![OscPacket::Message(decoded("/two", vec![]))],
                }),
                OscPacket::Message(decoded("/three", vec![])),
            ],
        });
        dispatch_packet(bundle, peer(), &listener.queue, &listener.callbacks);

        let order: Vec<_> = std::iter::from_fn(|| listener.get_next_message())
            .map(|m| m.address)
            .collect();
        assert_eq!(order, vec!["/one", "/two", "/three"]);
    }
}
