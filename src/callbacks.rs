use std::collections::BTreeMap;

use crate::message::Message;

/// Opaque handle identifying one registered callback. Handles are unique
/// for the lifetime of the registry (monotonic, never reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackHandle(u64);

/// Callback invoked on the receive thread for every decoded message.
pub type MessageCallback = Box<dyn FnMut(&Message) + Send>;

/// Registered message-received callbacks, invoked in registration order.
/// Callbacks run on the receive thread and must not block for long, since
/// they delay every subsequent packet.
#[derive(Default)]
pub struct CallbackRegistry {
    next_handle: u64,
    callbacks: BTreeMap<CallbackHandle, MessageCallback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        CallbackRegistry::default()
    }

    pub fn register(&mut self, callback: MessageCallback) -> CallbackHandle {
        let handle = CallbackHandle(self.next_handle);
        self.next_handle += 1;
        self.callbacks.insert(handle, callback);
        handle
    }

    /// Removing an unknown handle is a no-op, not an error.
    pub fn unregister(&mut self, handle: CallbackHandle) {
        self.callbacks.remove(&handle);
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Pass `message` to every callback, oldest registration first. Handles
    /// are monotonic, so BTreeMap iteration order is registration order.
    pub fn invoke_all(&mut self, message: &Message) {
        for callback in self.callbacks.values_mut() {
            callback(message);
        }
    }
}
