//! Analog inputs of the resolver.

/// The three physical ADC inputs a resolver is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Channel {
    /// Excitation signal the sine and cosine windows are aligned to
    Reference = 0,
    /// Cosine winding
    Cosine = 1,
    /// Sine winding
    Sine = 2,
}

impl Channel {
    /// All channels in index order
    pub const ALL: [Channel; 3] = [Channel::Reference, Channel::Cosine, Channel::Sine];
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> u8 {
        channel as u8
    }
}
