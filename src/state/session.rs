//! The shuffled viewing session: items, cursor and the pending soft delete.

use crate::config::AdvancePolicy;
use crate::error::SessionError;
use crate::media::{ImageRef, PlaybackSource};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Result of removing an item from the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Playback continues; the cursor points at a valid item.
    Continue(ImageRef),
    /// The removed item was the last one; playback is over.
    Ended(ImageRef),
}

impl RemoveOutcome {
    pub fn removed(&self) -> &ImageRef {
        match self {
            RemoveOutcome::Continue(image) | RemoveOutcome::Ended(image) => image,
        }
    }

    pub fn ended(&self) -> bool {
        matches!(self, RemoveOutcome::Ended(_))
    }
}

/// Handle for a soft delete that can still be undone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoTicket {
    pub token: u64,
    pub deadline: Instant,
    pub outcome: RemoveOutcome,
}

#[derive(Debug, Clone)]
struct PendingRemoval {
    token: u64,
    image: ImageRef,
    index: usize,
    cursor: usize,
    deadline: Instant,
}

/// Mutable ordered session plus cursor.
///
/// Whenever `items` is non-empty, `cursor < items.len()`. An empty list means
/// no playback is running.
pub struct SessionList {
    items: Vec<ImageRef>,
    cursor: usize,
    source: PlaybackSource,
    policy: AdvancePolicy,
    pending: Option<PendingRemoval>,
    next_token: u64,
    committed: Vec<ImageRef>,
    rng: StdRng,
}

impl SessionList {
    pub fn new(policy: AdvancePolicy) -> Self {
        Self::with_rng(policy, StdRng::from_os_rng())
    }

    /// Deterministic shuffles, for reproducible sessions.
    pub fn with_seed(policy: AdvancePolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(policy: AdvancePolicy, rng: StdRng) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            source: PlaybackSource::Library,
            policy,
            pending: None,
            next_token: 0,
            committed: Vec::new(),
            rng,
        }
    }

    /// Starts playback over a shuffled copy of `source`.
    ///
    /// An empty source is rejected and leaves the session untouched.
    pub fn start(
        &mut self,
        source: &[ImageRef],
        origin: PlaybackSource,
    ) -> Result<&ImageRef, SessionError> {
        if source.is_empty() {
            return Err(SessionError::EmptySource);
        }

        self.commit_pending();
        self.items = source.to_vec();
        self.items.shuffle(&mut self.rng);
        self.cursor = 0;
        self.source = origin;
        info!("Session started: {} items from {:?}", self.items.len(), origin);
        Ok(&self.items[0])
    }

    /// Moves to the next item, applying the advance policy at the end.
    pub fn advance(&mut self) -> Option<&ImageRef> {
        if self.items.is_empty() {
            return None;
        }

        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        } else {
            match self.policy {
                AdvancePolicy::Wrap => self.cursor = 0,
                AdvancePolicy::ReshuffleWithoutRepeat => {
                    self.commit_pending();
                    let last = self.items[self.cursor].clone();
                    reshuffle_without_repeat(&mut self.items, &last, &mut self.rng);
                    self.cursor = 0;
                    debug!("Reached end of session, reshuffled {} items", self.items.len());
                }
            }
        }
        self.items.get(self.cursor)
    }

    /// Moves to the previous item, wrapping to the last one.
    pub fn retreat(&mut self) -> Option<&ImageRef> {
        if self.items.is_empty() {
            return None;
        }
        self.cursor = if self.cursor == 0 {
            self.items.len() - 1
        } else {
            self.cursor - 1
        };
        self.items.get(self.cursor)
    }

    /// Removes the item under the cursor.
    pub fn remove_current(&mut self) -> Result<RemoveOutcome, SessionError> {
        if self.items.is_empty() {
            return Err(SessionError::NotPlaying);
        }
        self.commit_pending();
        Ok(self.remove_at(self.cursor))
    }

    /// Removes the first occurrence of `image`, preferring the one under the cursor.
    pub fn remove_item(&mut self, image: &ImageRef) -> Result<RemoveOutcome, SessionError> {
        if self.items.is_empty() {
            return Err(SessionError::NotPlaying);
        }
        let index = self.index_of(image).ok_or(SessionError::NotInSession)?;
        self.commit_pending();
        Ok(self.remove_at(index))
    }

    /// Removes `image` right away but keeps it restorable through [`Self::undo`]
    /// until `window` elapses or another mutation commits it.
    pub fn remove_and_allow_undo(
        &mut self,
        image: &ImageRef,
        window: Duration,
    ) -> Result<UndoTicket, SessionError> {
        if self.items.is_empty() {
            return Err(SessionError::NotPlaying);
        }
        let index = self.index_of(image).ok_or(SessionError::NotInSession)?;
        self.commit_pending();

        let cursor = self.cursor;
        let outcome = self.remove_at(index);
        self.next_token += 1;
        let deadline = Instant::now() + window;
        self.pending = Some(PendingRemoval {
            token: self.next_token,
            image: image.clone(),
            index,
            cursor,
            deadline,
        });

        Ok(UndoTicket {
            token: self.next_token,
            deadline,
            outcome,
        })
    }

    /// Puts the pending soft-deleted item back where it was.
    pub fn undo(&mut self) -> Result<&ImageRef, SessionError> {
        let pending = self.pending.take().ok_or(SessionError::NothingToUndo)?;
        let index = pending.index.min(self.items.len());
        self.items.insert(index, pending.image);
        self.cursor = pending.cursor.min(self.items.len() - 1);
        debug!("Undo restored item at {}", index);
        Ok(&self.items[self.cursor])
    }

    /// Commits the pending removal if `token` still identifies it.
    pub fn finalize(&mut self, token: u64) -> Option<ImageRef> {
        if self.pending.as_ref().is_some_and(|p| p.token == token) {
            return self.commit_pending();
        }
        None
    }

    /// Commits the pending removal if its undo window has passed.
    pub fn finalize_expired(&mut self, now: Instant) -> Option<ImageRef> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            return self.commit_pending();
        }
        None
    }

    /// Drains removals that are final and whose resources may be deleted.
    pub fn take_committed(&mut self) -> Vec<ImageRef> {
        std::mem::take(&mut self.committed)
    }

    /// Ends playback. A pending soft delete becomes final.
    pub fn clear(&mut self) {
        self.commit_pending();
        self.items.clear();
        self.cursor = 0;
    }

    /// Item under the cursor, `None` when not playing.
    pub fn current_item(&self) -> Option<&ImageRef> {
        self.items.get(self.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[ImageRef] {
        &self.items
    }

    /// 1-based position and total, for "3 / 40" style display.
    pub fn position(&self) -> Option<(usize, usize)> {
        (!self.items.is_empty()).then(|| (self.cursor + 1, self.items.len()))
    }

    /// Source of the running session, `None` when not playing.
    pub fn source(&self) -> Option<PlaybackSource> {
        (!self.items.is_empty()).then_some(self.source)
    }

    /// Item waiting in the undo window, if any.
    pub fn pending_undo(&self) -> Option<&ImageRef> {
        self.pending.as_ref().map(|p| &p.image)
    }

    pub fn policy(&self) -> AdvancePolicy {
        self.policy
    }

    fn index_of(&self, image: &ImageRef) -> Option<usize> {
        if self.items.get(self.cursor) == Some(image) {
            return Some(self.cursor);
        }
        self.items.iter().position(|item| item == image)
    }

    fn remove_at(&mut self, index: usize) -> RemoveOutcome {
        let removed = self.items.remove(index);
        if self.items.is_empty() {
            self.cursor = 0;
            info!("Session ended: last item removed");
            return RemoveOutcome::Ended(removed);
        }
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.cursor = self.cursor.min(self.items.len() - 1);
        RemoveOutcome::Continue(removed)
    }

    /// Makes the pending soft delete final right away.
    pub fn commit_pending(&mut self) -> Option<ImageRef> {
        let pending = self.pending.take()?;
        debug!("Soft delete of {} is final", pending.image);
        self.committed.push(pending.image.clone());
        Some(pending.image)
    }

    #[cfg(test)]
    fn with_items(policy: AdvancePolicy, items: Vec<ImageRef>, cursor: usize, seed: u64) -> Self {
        let mut session = Self::with_seed(policy, seed);
        session.items = items;
        session.cursor = cursor;
        session
    }
}

/// Fisher–Yates shuffle of `items`, then a single swap so that `last` does
/// not come up first again when any other item is available.
pub fn reshuffle_without_repeat<R: rand::Rng + ?Sized>(
    items: &mut [ImageRef],
    last: &ImageRef,
    rng: &mut R,
) {
    items.shuffle(rng);
    if items.first() != Some(last) {
        return;
    }
    if let Some(swap_with) = (1..items.len()).find(|&i| items[i] != *last) {
        items.swap(0, swap_with);
    }
}
