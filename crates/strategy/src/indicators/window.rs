use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

/// Trailing minimum or maximum over the last `period` values pushed.
///
/// Keeps a monotonic queue of candidates so each push is amortised O(1).
/// Returns `None` until `period` values have been seen.
#[derive(Debug, Clone)]
pub struct RollingExtreme {
    period: usize,
    extreme: Extreme,
    /// (position, value), best candidate at the front.
    candidates: VecDeque<(usize, f64)>,
    pushed: usize,
}

impl RollingExtreme {
    pub fn min(period: usize) -> Self {
        Self::new(period, Extreme::Min)
    }

    pub fn max(period: usize) -> Self {
        Self::new(period, Extreme::Max)
    }

    fn new(period: usize, extreme: Extreme) -> Self {
        assert!(period >= 1, "rolling window period must be >= 1");
        Self {
            period,
            extreme,
            candidates: VecDeque::with_capacity(period),
            pushed: 0,
        }
    }

    /// Add the next value and return the extreme of the window ending at it.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        let pos = self.pushed;
        self.pushed += 1;

        while let Some(&(_, back)) = self.candidates.back() {
            if self.supersedes(value, back) {
                self.candidates.pop_back();
            } else {
                break;
            }
        }
        self.candidates.push_back((pos, value));

        while let Some(&(front_pos, _)) = self.candidates.front() {
            if front_pos + self.period <= pos {
                self.candidates.pop_front();
            } else {
                break;
            }
        }

        self.value()
    }

    /// Extreme of the last `period` values, without pushing.
    pub fn value(&self) -> Option<f64> {
        if self.pushed < self.period {
            return None;
        }
        self.candidates.front().map(|&(_, v)| v)
    }

    fn supersedes(&self, new: f64, old: f64) -> bool {
        match self.extreme {
            Extreme::Min => new <= old,
            Extreme::Max => new >= old,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_until_window_fills() {
        let mut w = RollingExtreme::min(3);
        assert_eq!(w.push(5.0), None);
        assert_eq!(w.push(4.0), None);
        assert_eq!(w.push(6.0), Some(4.0));
    }

    #[test]
    fn min_drops_values_leaving_the_window() {
        let mut w = RollingExtreme::min(3);
        let out: Vec<Option<f64>> = [1.0, 5.0, 6.0, 7.0, 2.0, 9.0]
            .iter()
            .map(|&v| w.push(v))
            .collect();
        assert_eq!(
            out,
            vec![None, None, Some(1.0), Some(5.0), Some(2.0), Some(2.0)]
        );
    }

    #[test]
    fn max_tracks_trailing_high() {
        let mut w = RollingExtreme::max(2);
        let out: Vec<Option<f64>> = [3.0, 8.0, 1.0, 1.0, 4.0]
            .iter()
            .map(|&v| w.push(v))
            .collect();
        assert_eq!(out, vec![None, Some(8.0), Some(8.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn matches_naive_scan() {
        let data: Vec<f64> = (0..200)
            .map(|i| ((i * 37 % 101) as f64).sin() * 10.0 + 50.0)
            .collect();
        let period = 30;
        let mut lo = RollingExtreme::min(period);
        let mut hi = RollingExtreme::max(period);

        for (i, &v) in data.iter().enumerate() {
            let got_lo = lo.push(v);
            let got_hi = hi.push(v);
            if i + 1 < period {
                assert!(got_lo.is_none() && got_hi.is_none());
                continue;
            }
            let slice = &data[i + 1 - period..=i];
            let want_lo = slice.iter().copied().fold(f64::INFINITY, f64::min);
            let want_hi = slice.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(got_lo, Some(want_lo), "min at {i}");
            assert_eq!(got_hi, Some(want_hi), "max at {i}");
        }
    }
}
