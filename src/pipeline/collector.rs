//! Session-scoped accumulation of processed results.
//!
//! Append-only: results are added by track tasks and read by the archiver.
//! There is no removal; a new playlist session starts with a new collector.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::types::ProcessedResult;

/// Shared handle to the accumulating collection. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct ResultCollector {
    results: Arc<Mutex<Vec<ProcessedResult>>>,
}

impl ResultCollector {
    /// Creates an empty collector for a new session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result. The only mutation the collection supports.
    pub async fn append(&self, result: ProcessedResult) {
        self.results.lock().await.push(result);
    }

    /// Returns a copy of everything accumulated so far, in append order.
    pub async fn snapshot(&self) -> Vec<ProcessedResult> {
        self.results.lock().await.clone()
    }

    /// Returns the file names accumulated so far, in append order.
    pub async fn file_names(&self) -> Vec<String> {
        self.results
            .lock()
            .await
            .iter()
            .map(|r| r.file_name.clone())
            .collect()
    }

    /// Returns the number of accumulated results.
    pub async fn len(&self) -> usize {
        self.results.lock().await.len()
    }

    /// Returns true if nothing has been accumulated.
    pub async fn is_empty(&self) -> bool {
        self.results.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_collector_is_empty() {
        let collector = ResultCollector::new();
        assert!(collector.is_empty().await);
        assert_eq!(collector.len().await, 0);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let collector = ResultCollector::new();
        let handle = collector.clone();

        handle.append(ProcessedResult::new("a.wav", vec![1])).await;

        assert_eq!(collector.len().await, 1);
        assert_eq!(collector.file_names().await, vec!["a.wav".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_not_lost() {
        let collector = ResultCollector::new();

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let collector = collector.clone();
                tokio::spawn(async move {
                    collector
                        .append(ProcessedResult::new(format!("{}.wav", i), vec![i as u8]))
                        .await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let mut names = collector.file_names().await;
        names.sort();
        let mut expected: Vec<String> = (0..64).map(|i| format!("{}.wav", i)).collect();
        expected.sort();
        assert_eq!(names, expected);
    }
}
