//! Shared FIFO of pending device commands.
//!
//! Many producers (one per client connection), one consumer. Every
//! operation takes the same lock, so a dequeue can never hand out a
//! command that a concurrent `clear` is discarding.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Command;

/// Unbounded, cloneable handle to the command queue.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<Command>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one command.
    pub fn push(&self, command: Command) {
        self.inner.lock().push_back(command);
    }

    /// Append a batch contiguously, preserving its order.
    pub fn push_all<I>(&self, commands: I)
    where
        I: IntoIterator<Item = Command>,
    {
        self.inner.lock().extend(commands);
    }

    /// Take the oldest command, if any. Never blocks on an empty queue.
    pub fn pop(&self) -> Option<Command> {
        self.inner.lock().pop_front()
    }

    /// Discard every pending command and return how many were dropped.
    pub fn clear(&self) -> usize {
        let mut queue = self.inner.lock();
        let dropped = queue.len();
        queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Copy of the pending commands, oldest first.
    pub fn snapshot(&self) -> Vec<Command> {
        self.inner.lock().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let queue = CommandQueue::new();
        queue.push(Command::PenUp);
        queue.push_all([Command::go_to((1.0, 2.0)), Command::PenDown]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(Command::PenUp));
        assert_eq!(queue.pop(), Some(Command::go_to((1.0, 2.0))));
        assert_eq!(queue.pop(), Some(Command::PenDown));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn clear_reports_dropped_count() {
        let queue = CommandQueue::new();
        for _ in 0..5 {
            queue.push(Command::PenDown);
        }
        let handle = queue.clone();
        assert_eq!(handle.clear(), 5);
        assert!(queue.is_empty());
        assert_eq!(queue.clear(), 0);
    }

    #[test]
    fn concurrent_producers_keep_per_producer_order() {
        let queue = CommandQueue::new();
        let threads: Vec<_> = (0..4)
            .map(|p| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(Command::go_to((p as f64, i as f64)));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(queue.len(), 1000);
        let mut last = [-1.0f64; 4];
        while let Some(Command::GoTo { x, y }) = queue.pop() {
            let p = x as usize;
            assert!(y > last[p], "producer {p} reordered");
            last[p] = y;
        }
    }
}
