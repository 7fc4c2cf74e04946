//! Polarity inference for the sine and cosine means, and quadrant lookup.

/// One of the four 90° sectors, identified by the sine and cosine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Quadrant {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::First,
        Quadrant::Second,
        Quadrant::Third,
        Quadrant::Fourth,
    ];

    /// Look up the quadrant for a pair of phase flags
    ///
    /// | sine  | cosine | quadrant |
    /// |-------|--------|----------|
    /// | true  | true   | 1        |
    /// | true  | false  | 2        |
    /// | false | true   | 3        |
    /// | false | false  | 4        |
    #[must_use]
    pub const fn from_phases(sine_positive: bool, cosine_positive: bool) -> Self {
        match (sine_positive, cosine_positive) {
            (true, true) => Quadrant::First,
            (true, false) => Quadrant::Second,
            (false, true) => Quadrant::Third,
            (false, false) => Quadrant::Fourth,
        }
    }

    /// Quadrant number, 1 to 4
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    pub(crate) const fn index(self) -> usize {
        self as usize - 1
    }
}

impl From<Quadrant> for u8 {
    fn from(quadrant: Quadrant) -> u8 {
        quadrant.number()
    }
}

/// Mean voltage of one channel with its inferred polarity
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseReading {
    mean: f32,
    positive: bool,
    magnitude: f32,
    retried: bool,
    floored: bool,
}

impl PhaseReading {
    /// Classify the first window mean
    ///
    /// Returns `None` when the mean stays below `threshold` and a second window
    /// has to be taken.
    #[must_use]
    pub fn from_first(mean: f32, threshold: f32) -> Option<Self> {
        (mean >= threshold).then_some(Self {
            mean,
            positive: true,
            magnitude: mean,
            retried: false,
            floored: false,
        })
    }

    /// Classify the retry window mean
    ///
    /// A signal that shows up on the second attempt is taken as negative
    /// polarity. One that still does not clear `threshold` gets `floor` as its
    /// magnitude so the angle ratio keeps a non-zero denominator.
    #[must_use]
    pub fn from_retry(mean: f32, threshold: f32, floor: f32) -> Self {
        let floored = mean <= threshold;
        Self {
            mean,
            positive: false,
            magnitude: if floored { floor } else { -mean },
            retried: true,
            floored,
        }
    }

    /// Mean of the window the reading was decided on
    #[must_use]
    pub const fn mean(&self) -> f32 {
        self.mean
    }

    /// `true` when the channel is positive-dominant
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.positive
    }

    /// Signed magnitude fed to the angle computation, never zero
    #[must_use]
    pub const fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// `true` when the first window was below threshold
    #[must_use]
    pub const fn retried(&self) -> bool {
        self.retried
    }

    /// `true` when neither window cleared the threshold
    #[must_use]
    pub const fn is_floored(&self) -> bool {
        self.floored
    }
}
