/// Per-bin ball counts. Index = bin = image column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    bins: Vec<u64>,
}

impl Histogram {
    pub fn new(width: usize) -> Self {
        Self {
            bins: vec![0; width],
        }
    }

    // Only the simulator's collector records; callers get the histogram by value once it is done.
    pub(crate) fn record(&mut self, bin: usize) {
        self.bins[bin] += 1;
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }
}
