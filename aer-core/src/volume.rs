//! Spatiotemporal volumes: per-seed event lists and the stack holding them.

use crate::types::{DecodedEvent, Polarity};
use tracing::debug;

/// Initial slot capacity of a [`VolumeStack`].
pub const DEFAULT_STACK_CAPACITY: usize = 1000;

/// Forward-only ordered events sharing a spatial seed.
///
/// Elements are never removed individually. A cursor supports one forward
/// pass at a time; once exhausted it stays exhausted until [`rewind`].
///
/// [`rewind`]: EventList::rewind
#[derive(Debug, Clone)]
pub struct EventList {
    events: Vec<DecodedEvent>,
    positives: usize,
    negatives: usize,
    pointed: usize,
    exhausted: bool,
}

impl EventList {
    /// Creates a list seeded with its first event.
    pub fn new(x: u32, y: u32, polarity: Polarity, timestamp: u32) -> Self {
        let mut list = Self {
            events: Vec::new(),
            positives: 0,
            negatives: 0,
            pointed: 0,
            exhausted: false,
        };
        list.append(x, y, polarity, timestamp);
        list
    }

    /// Creates a list seeded with a decoded event, keeping its eye.
    pub fn from_event(event: &DecodedEvent) -> Self {
        let mut list = Self::new(event.x, event.y, event.polarity, event.timestamp);
        list.events[0].eye = event.eye;
        list
    }

    /// Appends an event at the tail.
    pub fn append(&mut self, x: u32, y: u32, polarity: Polarity, timestamp: u32) {
        self.push_event(&DecodedEvent::new(x, y, polarity, 0, timestamp));
    }

    pub fn push_event(&mut self, event: &DecodedEvent) {
        match event.polarity {
            Polarity::On => self.positives += 1,
            Polarity::Off => self.negatives += 1,
        }
        self.events.push(*event);
    }

    /// Puts the cursor back on the head.
    pub fn rewind(&mut self) {
        self.pointed = 0;
        self.exhausted = self.events.is_empty();
    }

    /// Moves the cursor to the next element. Returns false once the list is
    /// exhausted.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        self.pointed += 1;
        if self.pointed >= self.events.len() {
            self.exhausted = true;
            return false;
        }
        true
    }

    /// Element under the cursor, `None` when exhausted.
    pub fn current(&self) -> Option<&DecodedEvent> {
        if self.exhausted {
            None
        } else {
            self.events.get(self.pointed)
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Seed position and first timestamp.
    pub fn seed(&self) -> (u32, u32, u32) {
        let head = &self.events[0];
        (head.x, head.y, head.timestamp)
    }

    /// Timestamp of the seed event.
    pub fn seed_timestamp(&self) -> u32 {
        self.events[0].timestamp
    }

    /// Number of positive and negative events.
    pub fn count(&self) -> (usize, usize) {
        (self.positives, self.negatives)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DecodedEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a DecodedEvent;
    type IntoIter = std::slice::Iter<'a, DecodedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Growable stack of event lists, oldest first.
///
/// Capacity starts at [`DEFAULT_STACK_CAPACITY`] and doubles when full.
#[derive(Debug)]
pub struct VolumeStack {
    lists: Vec<EventList>,
    capacity: usize,
}

impl Default for VolumeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl VolumeStack {
    pub fn new() -> Self {
        Self {
            lists: Vec::with_capacity(DEFAULT_STACK_CAPACITY),
            capacity: DEFAULT_STACK_CAPACITY,
        }
    }

    /// Creates a new list seeded at this event.
    pub fn push(&mut self, x: u32, y: u32, polarity: Polarity, timestamp: u32) {
        self.push_list(EventList::new(x, y, polarity, timestamp));
    }

    /// Creates a new list seeded at a decoded event.
    pub fn push_event(&mut self, event: &DecodedEvent) {
        self.push_list(EventList::from_event(event));
    }

    fn push_list(&mut self, list: EventList) {
        if self.lists.len() >= self.capacity {
            self.capacity *= 2;
            self.lists.reserve_exact(self.capacity - self.lists.len());
            debug!(capacity = self.capacity, "volume stack grew");
        }
        self.lists.push(list);
    }

    /// Newest index whose seed timestamp plus `window` is at or before `ts`.
    pub fn upper_bound(&self, ts: u32, window: u32) -> Option<usize> {
        self.lists
            .iter()
            .rposition(|list| list.seed_timestamp() as u64 + window as u64 <= ts as u64)
    }

    /// Removes the list at `index`, shifting later lists down by one.
    pub fn pop(&mut self, index: usize) -> Option<EventList> {
        if index < self.lists.len() {
            Some(self.lists.remove(index))
        } else {
            None
        }
    }

    pub fn at(&self, index: usize) -> Option<&EventList> {
        self.lists.get(index)
    }

    /// Mutable access for fanning events into an existing seed.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut EventList> {
        self.lists.get_mut(index)
    }

    pub fn size(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Destroys every list and returns to the initial capacity.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
