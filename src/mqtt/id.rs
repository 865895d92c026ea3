//! Message ID allocation.

/// Hands out packet identifiers for QoS 1/2 publishes, SUBSCRIBE and
/// UNSUBSCRIBE.
///
/// IDs count up from 1 and wrap from 65 535 back to 1. Zero is never
/// returned.
///
/// # Examples
///
/// ```rust
/// use libmqtt::mqtt::MessageIds;
///
/// let mut ids = MessageIds::new();
/// assert_eq!(ids.next(), 1);
/// assert_eq!(ids.next(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIds {
    next: u16,
}

impl Default for MessageIds {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageIds {
    /// An allocator whose first ID is 1.
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Restart the sequence at 1.
    pub fn reset(&mut self) {
        self.next = 1;
    }

    /// The ID the next call to [`MessageIds::next`] returns.
    pub fn peek(&self) -> u16 {
        self.next
    }

    /// Return the current ID and advance.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u16 {
        let id = self.next;
        self.next = match self.next.wrapping_add(1) {
            0 => 1,
            n => n,
        };
        id
    }

    /// Like [`MessageIds::next`], but skips IDs for which `in_use` is true.
    ///
    /// Gives up after one full cycle and returns the next ID anyway; callers
    /// bound the number of IDs in use far below that.
    pub fn next_unused(&mut self, in_use: impl Fn(u16) -> bool) -> u16 {
        for _ in 0..u16::MAX {
            let id = self.next();
            if !in_use(id) {
                return id;
            }
        }
        self.next()
    }
}
