//! Signed window arithmetic (RFC 9113 Section 6.9).
//!
//! The window may legitimately go negative when the peer lowers
//! SETTINGS_INITIAL_WINDOW_SIZE after data has already been credited.

/// Largest legal flow control window (2^31 - 1).
pub const MAX_WINDOW_SIZE: i64 = 0x7fff_ffff;

/// Default initial window size (RFC 9113 Section 6.9.2).
pub const DEFAULT_INITIAL_WINDOW_SIZE: u32 = 65_535;

/// Send window for one stream or connection.
#[derive(Debug, Clone)]
pub struct FlowWindow {
    available: i64,
    aborted: bool,
}

impl FlowWindow {
    /// Create a window with the given initial size.
    ///
    /// Sizes above [`MAX_WINDOW_SIZE`] are clamped.
    pub fn new(initial_window_size: u32) -> Self {
        Self {
            available: i64::from(initial_window_size).min(MAX_WINDOW_SIZE),
            aborted: false,
        }
    }

    /// Bytes currently permitted to send (may be negative).
    pub fn available(&self) -> i64 {
        self.available
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Credit `bytes` to the window without a range check.
    ///
    /// The caller has already validated the WINDOW_UPDATE increment.
    pub fn advance(&mut self, bytes: u32) {
        self.available = self.available.saturating_add(i64::from(bytes));
    }

    /// Debit `bytes` that were just written to the peer.
    pub fn consume(&mut self, bytes: u32) {
        self.available = self.available.saturating_sub(i64::from(bytes));
    }

    /// Apply a signed delta, rejecting results outside `±MAX_WINDOW_SIZE`.
    ///
    /// Returns `false` and leaves the window unchanged on rejection.
    pub fn try_update_window(&mut self, delta: i64) -> bool {
        match self.available.checked_add(delta) {
            Some(next) if (-MAX_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&next) => {
                self.available = next;
                true
            }
            _ => false,
        }
    }

    /// Mark the window aborted. Idempotent.
    pub fn abort(&mut self) {
        self.aborted = true;
    }
}

impl Default for FlowWindow {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_WINDOW_SIZE)
    }
}
