use super::{Bivariate, Univariate, Variance};

/// Running covariance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Covariance {
    ddof: u32,
    n: f64,
    mean_x: f64,
    mean_y: f64,
    c: f64,
}

impl Default for Covariance {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Covariance {
    pub fn new(ddof: u32) -> Self {
        Self {
            ddof,
            n: 0.0,
            mean_x: 0.0,
            mean_y: 0.0,
            c: 0.0,
        }
    }
}

impl Bivariate for Covariance {
    fn update(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        let dx = x - self.mean_x;
        self.mean_x += dx / self.n;
        self.mean_y += (y - self.mean_y) / self.n;
        self.c += dx * (y - self.mean_y);
    }

    fn get(&self) -> f64 {
        let denom = self.n - self.ddof as f64;
        if denom > 0.0 {
            self.c / denom
        } else {
            0.0
        }
    }
}

/// Running Pearson correlation coefficient.
///
/// Returns 0 while either variable has zero variance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PearsonCorrelation {
    var_x: Variance,
    var_y: Variance,
    cov: Covariance,
}

impl Default for PearsonCorrelation {
    fn default() -> Self {
        Self::new()
    }
}

impl PearsonCorrelation {
    pub fn new() -> Self {
        Self {
            var_x: Variance::new(1),
            var_y: Variance::new(1),
            cov: Covariance::new(1),
        }
    }
}

impl Bivariate for PearsonCorrelation {
    fn update(&mut self, x: f64, y: f64) {
        self.var_x.update(x);
        self.var_y.update(y);
        self.cov.update(x, y);
    }

    fn get(&self) -> f64 {
        let denom = (self.var_x.get() * self.var_y.get()).sqrt();
        if denom > 0.0 {
            self.cov.get() / denom
        } else {
            0.0
        }
    }
}
