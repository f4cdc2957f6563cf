use super::Univariate;

/// Running mean.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Mean {
    n: f64,
    mean: f64,
}

impl Mean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values seen.
    pub fn count(&self) -> f64 {
        self.n
    }
}

impl Univariate for Mean {
    fn update(&mut self, x: f64) {
        self.n += 1.0;
        self.mean += (x - self.mean) / self.n;
    }

    fn get(&self) -> f64 {
        self.mean
    }
}

/// Running variance (Welford's algorithm).
///
/// `ddof` is the delta degrees of freedom: 0 gives the population variance,
/// 1 the sample variance. While `n <= ddof` the variance is 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Variance {
    ddof: u32,
    mean: Mean,
    m2: f64,
}

impl Default for Variance {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Variance {
    pub fn new(ddof: u32) -> Self {
        Self {
            ddof,
            mean: Mean::new(),
            m2: 0.0,
        }
    }

    /// Running mean of the same stream.
    pub fn mean(&self) -> f64 {
        self.mean.get()
    }

    /// Number of values seen.
    pub fn count(&self) -> f64 {
        self.mean.count()
    }
}

impl Univariate for Variance {
    fn update(&mut self, x: f64) {
        let old_mean = self.mean.get();
        self.mean.update(x);
        self.m2 += (x - old_mean) * (x - self.mean.get());
    }

    fn get(&self) -> f64 {
        let denom = self.mean.count() - self.ddof as f64;
        if denom > 0.0 {
            self.m2 / denom
        } else {
            0.0
        }
    }
}

/// Running minimum. `+inf` until the first value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Min {
    value: f64,
}

impl Default for Min {
    fn default() -> Self {
        Self {
            value: f64::INFINITY,
        }
    }
}

impl Min {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Min {
    fn update(&mut self, x: f64) {
        if x < self.value {
            self.value = x;
        }
    }

    fn get(&self) -> f64 {
        self.value
    }
}

/// Running maximum. `-inf` until the first value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Max {
    value: f64,
}

impl Default for Max {
    fn default() -> Self {
        Self {
            value: f64::NEG_INFINITY,
        }
    }
}

impl Max {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Univariate for Max {
    fn update(&mut self, x: f64) {
        if x > self.value {
            self.value = x;
        }
    }

    fn get(&self) -> f64 {
        self.value
    }
}
