/// Trailing-window sum over a ring buffer. Partial windows are summed as-is,
/// so the first push already yields a value.
///
/// The sum is rebuilt from the buffer on every push, so an all-zero window
/// sums to exactly 0.0.
#[derive(Debug, Clone)]
pub struct RollingSum {
    window: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
}

impl RollingSum {
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "rolling window must be > 0");
        Self {
            window,
            buffer: vec![0.0; window],
            head: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Push a new value and return the sum of the last `window` values.
    pub fn push(&mut self, value: f64) -> f64 {
        self.buffer[self.head] = value;
        self.head = (self.head + 1) % self.window;
        if self.count < self.window {
            self.count += 1;
        }
        self.sum = self.buffer.iter().sum();
        self.sum
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
