//! Bounded history of completed runs.

use std::collections::VecDeque;

use heurix_protocols::AnalysisResult;

/// The last `capacity` results, oldest first.
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    entries: VecDeque<AnalysisResult>,
    capacity: usize,
}

impl AnalysisHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a result, evicting the oldest beyond capacity.
    pub fn push(&mut self, result: AnalysisResult) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(result);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&AnalysisResult> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AnalysisHistory {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(timestamp: i64) -> AnalysisResult {
        AnalysisResult {
            usability_score: Some(50.0),
            strengths: vec![],
            issues: vec![],
            summary: format!("run {timestamp}"),
            timestamp,
        }
    }

    #[test]
    fn test_keeps_last_three() {
        let mut history = AnalysisHistory::default();
        for ts in 1..=5 {
            history.push(result(ts));
        }
        let timestamps: Vec<i64> = history.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![3, 4, 5]);
        assert_eq!(history.latest().unwrap().timestamp, 5);
    }

    #[test]
    fn test_custom_capacity() {
        let mut history = AnalysisHistory::new(1);
        history.push(result(1));
        history.push(result(2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.latest().unwrap().timestamp, 2);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut history = AnalysisHistory::new(0);
        history.push(result(1));
        assert!(history.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut history = AnalysisHistory::default();
        history.push(result(1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
