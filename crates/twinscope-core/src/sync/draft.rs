// ── Edit drafts ──
//
// The locally-edited, unsaved copy of a synchronized payload. Held by
// the consumer next to its tracker subscription, never inside the
// tracker: the state machine governs server data, the draft governs the
// user's in-progress edit.

/// A consumer-side edit buffer for a synchronized payload.
///
/// The invariant this type exists to enforce: a dirty draft is never
/// overwritten by a background refresh. The single sanctioned discard
/// point is a completed save that had `needs_refresh` set when issued,
/// where the buffer is replaced with the server's confirmed post-save
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft<P: Clone> {
    value: Option<P>,
    is_dirty: bool,
    needs_refresh: bool,
}

impl<P: Clone> Default for EditDraft<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone> EditDraft<P> {
    pub fn new() -> Self {
        Self {
            value: None,
            is_dirty: false,
            needs_refresh: false,
        }
    }

    /// The buffer's current value: the user's edit when dirty, the last
    /// accepted payload otherwise.
    pub fn value(&self) -> Option<&P> {
        self.value.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Seed the buffer from a settled payload, clearing any edit.
    pub fn begin(&mut self, payload: &P) {
        self.value = Some(payload.clone());
        self.is_dirty = false;
        self.needs_refresh = false;
    }

    /// Record a user edit.
    pub fn set(&mut self, value: P) {
        self.value = Some(value);
        self.is_dirty = true;
    }

    /// Note that the buffer should be rebased onto the server's value
    /// at the next save completion.
    pub fn mark_needs_refresh(&mut self) {
        self.needs_refresh = true;
    }

    /// Offer a freshly fetched payload to the buffer.
    ///
    /// Accepted only while clean. A dirty buffer ignores it — the
    /// refresh still updated the tracker, so nothing is lost; the user
    /// just keeps their edit on screen.
    pub fn apply_fetched(&mut self, payload: &P) -> bool {
        if self.is_dirty {
            return false;
        }
        self.value = Some(payload.clone());
        true
    }

    /// Offer the confirmed post-save payload to the buffer.
    ///
    /// Replaces the buffer when clean, and also when `needs_refresh` was
    /// set: that is the one point where an in-flight edit may be
    /// discarded, and only in favor of the value the server just
    /// confirmed.
    pub fn apply_upserted(&mut self, payload: &P) -> bool {
        if self.is_dirty && !self.needs_refresh {
            return false;
        }
        self.value = Some(payload.clone());
        self.is_dirty = false;
        self.needs_refresh = false;
        true
    }

    /// Drop the buffer entirely.
    pub fn clear(&mut self) {
        self.value = None;
        self.is_dirty = false;
        self.needs_refresh = false;
    }
}
