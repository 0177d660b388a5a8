/// A fixed-length vector space with the same bounds on every component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSpace {
    pub low: f64,
    pub high: f64,
    pub size: usize,
}

impl BoxSpace {
    pub fn new(low: f64, high: f64, size: usize) -> Self {
        Self { low, high, size }
    }

    pub fn contains<I>(&self, values: I) -> bool
    where
        I: IntoIterator,
        I::Item: Into<f64>,
    {
        let mut count = 0;
        for value in values {
            let value: f64 = value.into();
            if !(value >= self.low && value <= self.high) {
                return false;
            }
            count += 1;
        }

        count == self.size
    }
}
