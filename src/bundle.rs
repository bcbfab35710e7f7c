use crate::message::Message;

/// A group of messages and nested bundles treated as a unit. Bundles own
/// their contents by value; nothing is shared with the receiver's queue,
/// which only ever holds flat Messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub messages: Vec<Message>,
    pub bundles: Vec<Bundle>,
}

impl Bundle {
    pub fn new() -> Self {
        Bundle::default()
    }

    /// Append a deep copy of `message`. Later changes to the original do not
    /// affect this bundle.
    pub fn add_message(&mut self, message: &Message) {
        self.messages.push(message.clone());
    }

    /// Append a deep copy of `bundle`. Nesting depth is unbounded.
    pub fn add_bundle(&mut self, bundle: &Bundle) {
        self.bundles.push(bundle.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.bundles.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.bundles.clear();
    }
}
