//! Bounded look-back window over a forward-only frame stream.
//!
//! The frame on screen is held apart from the window, so the window only ever
//! contains frames an undo can step back to. Undone frames wait in a redo queue
//! and are replayed before anything new is pulled from the source.

use crate::frames::FrameSource;
use anyhow::Result;
use std::collections::VecDeque;

pub struct NavigationBuffer<S: FrameSource> {
    source: S,
    capacity: usize,
    current: Option<S::Frame>,
    /// Frames shown before `current`, oldest first.
    history: VecDeque<S::Frame>,
    /// Frames undone past, nearest first.
    redo: VecDeque<S::Frame>,
    released: bool,
}

impl<S: FrameSource> NavigationBuffer<S> {
    /// A capacity of zero is raised to one so undo can always reach the previous frame.
    pub fn new(source: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            source,
            capacity,
            current: None,
            history: VecDeque::with_capacity(capacity),
            redo: VecDeque::new(),
            released: false,
        }
    }

    /// Move to the next frame, replaying undone frames before decoding new ones.
    ///
    /// Returns `None` when the source is exhausted; nothing changes in that case.
    pub fn advance(&mut self) -> Result<Option<S::Frame>> {
        let next = match self.redo.pop_front() {
            Some(frame) => frame,
            None => {
                if self.released {
                    return Ok(None);
                }
                match self.source.next_frame()? {
                    Some(frame) => frame,
                    None => return Ok(None),
                }
            }
        };
        if let Some(previous) = self.current.replace(next.clone()) {
            if self.history.len() >= self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(previous);
        }
        Ok(Some(next))
    }

    /// Step back to the previously shown frame.
    ///
    /// Returns `None` when no earlier frame is retained (start of video or evicted).
    pub fn undo(&mut self) -> Option<S::Frame> {
        let previous = self.history.pop_back()?;
        if let Some(current) = self.current.replace(previous.clone()) {
            self.redo.push_front(current);
        }
        Some(previous)
    }

    pub fn current(&self) -> Option<&S::Frame> {
        self.current.as_ref()
    }

    /// Number of frames an undo can still reach.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Release the frame source. Later advances only replay the redo queue.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.source.release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::CountingSource;
    use super::*;

    fn buffer(total: u32, capacity: usize) -> NavigationBuffer<CountingSource> {
        NavigationBuffer::new(CountingSource::new(total), capacity)
    }

    #[test]
    fn first_advance_leaves_history_empty() {
        let mut nav = buffer(3, 50);
        assert_eq!(nav.advance().unwrap(), Some(0));
        assert_eq!(nav.current(), Some(&0));
        assert!(nav.is_empty());
        assert_eq!(nav.undo(), None);
        assert_eq!(nav.current(), Some(&0));
        assert_eq!(nav.redo_len(), 0);
    }

    #[test]
    fn undo_after_advance_restores_previous_frame() {
        let mut nav = buffer(5, 50);
        nav.advance().unwrap();
        nav.advance().unwrap();
        assert_eq!(nav.advance().unwrap(), Some(2));

        assert_eq!(nav.undo(), Some(1));
        assert_eq!(nav.current(), Some(&1));
        assert_eq!(nav.redo_len(), 1);
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn advance_replays_redo_before_pulling_new_frames() {
        let mut nav = buffer(5, 50);
        for _ in 0..3 {
            nav.advance().unwrap();
        }
        nav.undo();
        nav.undo();
        assert_eq!(nav.current(), Some(&0));
        let pulls_before = nav.source().pulls;

        assert_eq!(nav.advance().unwrap(), Some(1));
        assert_eq!(nav.advance().unwrap(), Some(2));
        assert_eq!(nav.source().pulls, pulls_before);
        assert_eq!(nav.redo_len(), 0);

        assert_eq!(nav.advance().unwrap(), Some(3));
        assert_eq!(nav.source().pulls, pulls_before + 1);
    }

    #[test]
    fn exhausted_source_leaves_state_untouched() {
        let mut nav = buffer(2, 50);
        nav.advance().unwrap();
        nav.advance().unwrap();
        assert_eq!(nav.advance().unwrap(), None);
        assert_eq!(nav.current(), Some(&1));
        assert_eq!(nav.len(), 1);
        assert_eq!(nav.undo(), Some(0));
    }

    #[test]
    fn history_never_exceeds_capacity() {
        let capacity = 4;
        let mut nav = buffer(20, capacity);
        for _ in 0..20 {
            nav.advance().unwrap();
            assert!(nav.len() <= capacity);
        }
        assert_eq!(nav.len(), capacity);

        // Only the newest `capacity` predecessors survive eviction.
        let mut reached = Vec::new();
        while let Some(frame) = nav.undo() {
            reached.push(frame);
        }
        assert_eq!(reached, vec![18, 17, 16, 15]);
        assert_eq!(nav.current(), Some(&15));
    }

    #[test]
    fn appending_past_capacity_evicts_oldest() {
        let mut nav = buffer(10, 2);
        // current=0, then 0 and 1 enter history, then 2 evicts 0.
        for _ in 0..4 {
            nav.advance().unwrap();
        }
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.undo(), Some(2));
        assert_eq!(nav.undo(), Some(1));
        assert_eq!(nav.undo(), None);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let nav = buffer(1, 0);
        assert_eq!(nav.capacity(), 1);
    }

    #[test]
    fn decode_errors_propagate() {
        let mut source = CountingSource::new(5);
        source.fail_at = Some(1);
        let mut nav = NavigationBuffer::new(source, 50);
        nav.advance().unwrap();
        assert!(nav.advance().is_err());
        assert_eq!(nav.current(), Some(&0));
    }

    #[test]
    fn release_is_idempotent_and_stops_decoding() {
        let mut nav = buffer(5, 50);
        let released = nav.source().released.clone();
        nav.advance().unwrap();
        nav.release();
        nav.release();
        assert_eq!(released.get(), 1);
        assert!(nav.is_released());
        assert_eq!(nav.advance().unwrap(), None);
    }

    #[test]
    fn redo_is_still_replayed_after_release() {
        let mut nav = buffer(5, 50);
        nav.advance().unwrap();
        nav.advance().unwrap();
        nav.undo();
        nav.release();
        assert_eq!(nav.advance().unwrap(), Some(1));
    }
}
