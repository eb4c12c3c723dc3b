//! Shared append-only display channel
//!
//! Every component writes user-visible output here: diagnostic mirroring
//! (`log`/`warn`/`err`) and console-internal notices (`meta`). Entries are
//! ordered by call completion time and removed only by an explicit clear.

use parking_lot::RwLock;

/// Kind of a display entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Log,
    Warn,
    Err,
    Meta,
}

/// One line of the display log.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEntry {
    pub text: String,
    pub kind: DisplayKind,
}

#[derive(Default)]
struct ChannelInner {
    entries: Vec<DisplayEntry>,
    /// Total entries ever appended; survives clears. Doubles as the
    /// "newest entry scrolled into view" signal for front ends.
    appended: u64,
}

/// The shared, multi-writer display log.
///
/// Unbounded by design: nothing evicts entries except `clear`.
#[derive(Default)]
pub struct DisplayChannel {
    inner: RwLock<ChannelInner>,
}

impl DisplayChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. `log`/`warn`/`err` entries also mirror to tracing,
    /// the way the embedded console mirrors the real diagnostic stream.
    pub fn append(&self, text: impl Into<String>, kind: DisplayKind) {
        let text = text.into();
        match kind {
            DisplayKind::Log => tracing::info!(target: "display", "{text}"),
            DisplayKind::Warn => tracing::warn!(target: "display", "{text}"),
            DisplayKind::Err => tracing::error!(target: "display", "{text}"),
            DisplayKind::Meta => {}
        }
        let mut inner = self.inner.write();
        inner.entries.push(DisplayEntry { text, kind });
        inner.appended += 1;
    }

    pub fn log(&self, text: impl Into<String>) {
        self.append(text, DisplayKind::Log);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.append(text, DisplayKind::Warn);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.append(text, DisplayKind::Err);
    }

    pub fn meta(&self, text: impl Into<String>) {
        self.append(text, DisplayKind::Meta);
    }

    /// Remove all entries. The only way the log shrinks.
    pub fn clear(&self) {
        self.inner.write().entries.clear();
    }

    /// Snapshot of all current entries.
    pub fn entries(&self) -> Vec<DisplayEntry> {
        self.inner.read().entries.clone()
    }

    /// Monotonic append counter; bumps once per appended entry.
    pub fn revision(&self) -> u64 {
        self.inner.read().appended
    }

    /// Entries appended since a previously observed revision, plus the new
    /// revision. Entries removed by an interleaved clear are gone for good.
    pub fn entries_since(&self, seen: u64) -> (Vec<DisplayEntry>, u64) {
        let inner = self.inner.read();
        let fresh = (inner.appended.saturating_sub(seen) as usize).min(inner.entries.len());
        let start = inner.entries.len() - fresh;
        (inner.entries[start..].to_vec(), inner.appended)
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_grow_by_exactly_one() {
        let ch = DisplayChannel::new();
        ch.log("first");
        ch.warn("second");
        assert_eq!(ch.len(), 2);
        let entries = ch.entries();
        assert_eq!(entries[0].kind, DisplayKind::Log);
        assert_eq!(entries[1].kind, DisplayKind::Warn);
        assert_eq!(entries[1].text, "second");
    }

    #[test]
    fn clear_removes_everything() {
        let ch = DisplayChannel::new();
        ch.log("a");
        ch.meta("b");
        ch.clear();
        assert!(ch.is_empty());
        // Revision keeps counting across clears
        assert_eq!(ch.revision(), 2);
    }

    #[test]
    fn entries_since_returns_only_fresh_entries() {
        let ch = DisplayChannel::new();
        ch.log("a");
        let (fresh, rev) = ch.entries_since(0);
        assert_eq!(fresh.len(), 1);

        ch.log("b");
        ch.error("c");
        let (fresh, rev2) = ch.entries_since(rev);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].text, "b");
        assert_eq!(rev2, 3);
    }

    #[test]
    fn entries_since_survives_an_interleaved_clear() {
        let ch = DisplayChannel::new();
        ch.log("a");
        let (_, rev) = ch.entries_since(0);
        ch.clear();
        ch.log("b");
        let (fresh, _) = ch.entries_since(rev);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].text, "b");
    }
}
