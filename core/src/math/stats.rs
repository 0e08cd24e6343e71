pub struct StatsHelper;

impl StatsHelper {
    pub fn mean(samples: &[f64]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f64>() / samples.len() as f64
    }

    pub fn max_abs(samples: &[f64]) -> f64 {
        samples.iter().fold(0.0, |acc, &v| acc.max(v.abs()))
    }

    /// Zero-lag normalized cross-correlation; zero when either side is silent.
    pub fn correlation(lhs: &[f64], rhs: &[f64]) -> f64 {
        let len = lhs.len().min(rhs.len());
        let (lhs, rhs) = (&lhs[..len], &rhs[..len]);
        let dot: f64 = lhs.iter().zip(rhs).map(|(a, b)| a * b).sum();
        let norm = (lhs.iter().map(|v| v * v).sum::<f64>() * rhs.iter().map(|v| v * v).sum::<f64>())
            .sqrt();
        if norm == 0.0 {
            0.0
        } else {
            dot / norm
        }
    }
}
