// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subscribe/publish lists for scene notifications.

use std::fmt;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// An ordered list of callbacks of type `F`
pub struct Listeners<F: ?Sized> {
    next: u64,
    entries: Vec<(ListenerHandle, Box<F>)>,
}

impl<F: ?Sized> Listeners<F> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }

    /// Add a callback
    pub fn subscribe(&mut self, callback: Box<F>) -> ListenerHandle {
        let handle = ListenerHandle(self.next);
        self.next += 1;
        self.entries.push((handle, callback));
        handle
    }

    /// Remove a callback. Returns `false` if the handle is unknown.
    pub fn unsubscribe(&mut self, handle: ListenerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    /// Number of subscribed callbacks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is subscribed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Callbacks in subscription order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> {
        self.entries.iter_mut().map(|(_, cb)| cb)
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.entries.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let hits = Rc::new(Cell::new(0));
        let mut listeners: Listeners<dyn FnMut(u32)> = Listeners::new();

        let counter = Rc::clone(&hits);
        let handle = listeners.subscribe(Box::new(move |n| counter.set(counter.get() + n)));

        for cb in listeners.iter_mut() {
            cb(2);
        }
        assert_eq!(hits.get(), 2);

        assert!(listeners.unsubscribe(handle));
        assert!(!listeners.unsubscribe(handle));
        for cb in listeners.iter_mut() {
            cb(2);
        }
        assert_eq!(hits.get(), 2);
    }
}
