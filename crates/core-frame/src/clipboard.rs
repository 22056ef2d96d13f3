//! Snarf buffer owned by a frame.

use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clipboard {
    bytes: Vec<u8>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents.
    pub fn set(&mut self, bytes: &[u8]) {
        self.bytes.clear();
        self.bytes.extend_from_slice(bytes);
        trace!(target: "frame", size_bytes = bytes.len(), "clipboard_set");
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces() {
        let mut c = Clipboard::new();
        assert!(c.is_empty());
        c.set(b"mink");
        c.set(b"ox");
        assert_eq!(c.bytes(), b"ox");
        assert_eq!(c.len(), 2);
        c.clear();
        assert!(c.is_empty());
    }
}
