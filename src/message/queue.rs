use std::collections::VecDeque;
use std::time::Instant;
use crate::SendError;
use crate::message::types::{GameMessage, QueuedMessage};

/// Observable state of the outbound queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStatus {
    /// Buffered, not yet handed to the delivery lane
    pub pending: usize,

    /// Handed to the delivery lane, result not yet known
    pub in_flight: usize,

    /// Buffering instead of sending
    pub suspended: bool,

    /// Suspended by the app leaving the foreground
    pub foreground_suspended: bool,

    pub delivered: u64,
    pub failed: u64,
}

/// FIFO of outbound messages, owned by the session actor.
#[derive(Debug)]
pub struct OutboundQueue {
    pending: VecDeque<QueuedMessage>,
    next_seq: u64,
    foreground_suspended: bool,
    in_flight: usize,
    delivered: u64,
    failed: u64,
}

impl OutboundQueue {
    pub fn new(foreground_suspended: bool) -> Self {
        OutboundQueue {
            pending: VecDeque::new(),
            next_seq: 0,
            foreground_suspended,
            in_flight: 0,
            delivered: 0,
            failed: 0,
        }
    }

    /// Append a message. Returns its sequence number.
    pub fn push(&mut self, message: GameMessage) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(QueuedMessage {
            seq,
            message,
            enqueued_at: Instant::now(),
        });
        seq
    }

    /// Take every buffered message in enqueue order, counting them in flight.
    pub fn drain(&mut self) -> Vec<QueuedMessage> {
        self.in_flight += self.pending.len();
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &QueuedMessage> {
        self.pending.iter()
    }

    /// App left the foreground
    pub fn suspend(&mut self) {
        self.foreground_suspended = true;
    }

    /// App entered the foreground
    pub fn resume(&mut self) {
        self.foreground_suspended = false;
    }

    pub fn is_foreground_suspended(&self) -> bool {
        self.foreground_suspended
    }

    /// Check whether messages must be buffered
    pub fn is_suspended(&self, connected: bool) -> bool {
        self.foreground_suspended || !connected
    }

    /// Record the outcome of one delivery attempt
    pub fn record_result(&mut self, result: &Result<(), SendError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(()) => self.delivered += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn status(&self, connected: bool) -> QueueStatus {
        QueueStatus {
            pending: self.pending.len(),
            in_flight: self.in_flight,
            suspended: self.is_suspended(connected),
            foreground_suspended: self.foreground_suspended,
            delivered: self.delivered,
            failed: self.failed,
        }
    }
}
