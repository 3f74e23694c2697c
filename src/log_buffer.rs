//! Console log - timestamped, bounded record of everything shown to the user

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// One line of console output
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Monotonic sequence number, never reused
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only log with a fixed capacity; the oldest entry is evicted once
/// the capacity is reached.
#[derive(Debug)]
pub struct ConsoleLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl ConsoleLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            next_seq: 0,
        }
    }

    /// Append a message, returning its sequence number
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push_back(LogEntry {
            seq,
            timestamp: Local::now(),
            message: message.into(),
        });
        seq
    }

    /// Sequence number the next pushed entry will get
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Entries with `seq >= from` that are still retained
    pub fn since(&self, from: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.seq >= from)
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
