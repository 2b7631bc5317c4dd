//! Channel name validation.

/// Maximum channel name length, prefix included.
pub const MAX_CHANNEL_LEN: usize = 50;

/// Extension trait for checking whether a string names a channel.
pub trait ChannelExt {
    /// Starts with `#` or `&`, has at least one more character, is at most
    /// [`MAX_CHANNEL_LEN`] characters, and contains no space, comma, BEL or
    /// other control character.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        if !matches!(chars.next(), Some('#' | '&')) {
            return false;
        }
        let len = self.chars().count();
        if !(2..=MAX_CHANNEL_LEN).contains(&len) {
            return false;
        }
        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}
