//! [`SampleWindow`] – recent measured motor torque.
//!
//! The window only answers "is this command consistent with what the motor
//! is actually doing"; it never feeds the absolute limits.

/// Number of samples retained.
pub const WINDOW_LEN: usize = 3;

/// Fixed-capacity, most-recent-first sequence of measured torque samples.
///
/// Starts out holding zeros, so a gate that has never seen telemetry
/// validates against a measured torque of 0.
///
/// ```
/// use cangate_kernel::sample::SampleWindow;
///
/// let mut w = SampleWindow::new();
/// w.push(5);
/// w.push(-7);
/// assert_eq!(w.latest(), -7);
/// assert_eq!(w.as_slice(), &[-7, 5, 0]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleWindow {
    values: [i32; WINDOW_LEN],
}

impl SampleWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `sample` as the newest value, evicting the oldest.
    pub fn push(&mut self, sample: i32) {
        self.values.rotate_right(1);
        self.values[0] = sample;
    }

    /// The most recent sample.
    pub fn latest(&self) -> i32 {
        self.values[0]
    }

    /// All samples, newest first.
    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    pub fn clear(&mut self) {
        self.values = [0; WINDOW_LEN];
    }
}
