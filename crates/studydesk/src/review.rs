//! The review topic list shared between the flashcard generator and the tutor chat.
//!
//! The flashcard side only ever gets a [`ReviewTopicWriter`], the tutor side a
//! [`ReviewTopicReader`]. Both point at the same [`ReviewBoard`].
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Topics in first-seen order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewTopicSet {
    topics: Vec<String>,
}

impl ReviewTopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union with the existing topics. Returns how many were actually new.
    pub fn add<I, S>(&mut self, topics: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.topics.len();
        for topic in topics {
            let topic = topic.into();
            if !self.contains(&topic) {
                self.topics.push(topic);
            }
        }
        self.topics.len() - before
    }

    /// Drop every entry equal to `topic`. An absent topic is not an error.
    pub fn remove(&mut self, topic: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|existing| existing != topic);
        self.topics.len() != before
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|existing| existing == topic)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReviewBoard {
    inner: Arc<Mutex<ReviewTopicSet>>,
}

impl ReviewBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writer(&self) -> ReviewTopicWriter {
        ReviewTopicWriter {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn reader(&self) -> ReviewTopicReader {
        ReviewTopicReader {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        lock(&self.inner).as_slice().to_vec()
    }
}

/// Add-only access to the board
#[derive(Debug, Clone)]
pub struct ReviewTopicWriter {
    inner: Arc<Mutex<ReviewTopicSet>>,
}

impl ReviewTopicWriter {
    pub fn add<I, S>(&self, topics: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let added = lock(&self.inner).add(topics);
        tracing::debug!(added, "added review topics");
        added
    }
}

/// Read and consume access to the board
#[derive(Debug, Clone)]
pub struct ReviewTopicReader {
    inner: Arc<Mutex<ReviewTopicSet>>,
}

impl ReviewTopicReader {
    pub fn topics(&self) -> Vec<String> {
        lock(&self.inner).as_slice().to_vec()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).is_empty()
    }

    pub fn remove(&self, topic: &str) -> bool {
        lock(&self.inner).remove(topic)
    }
}

// A panic while holding the lock cannot leave the Vec half-updated, so keep going
fn lock(inner: &Mutex<ReviewTopicSet>) -> MutexGuard<'_, ReviewTopicSet> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(topics: &[&str]) -> ReviewTopicSet {
        let mut set = ReviewTopicSet::new();
        set.add(topics.iter().copied());
        set
    }

    #[test]
    fn test_add_twice_matches_union() {
        let a = ["Limits", "Derivatives", "Limits"];
        let b = ["Integrals", "Derivatives", "Series"];

        let mut stepwise = ReviewTopicSet::new();
        stepwise.add(a);
        stepwise.add(b);

        let combined: Vec<&str> = a.iter().chain(b.iter()).copied().collect();
        let at_once = set_of(&combined);

        assert_eq!(stepwise, at_once);
        assert_eq!(
            stepwise.as_slice(),
            &["Limits", "Derivatives", "Integrals", "Series"]
        );
    }

    #[test]
    fn test_readding_is_a_no_op() {
        let mut set = set_of(&["Derivatives"]);
        assert_eq!(set.add(["Derivatives"]), 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_add_is_case_sensitive() {
        let set = set_of(&["derivatives", "Derivatives"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove_absent_topic_is_a_no_op() {
        let mut set = set_of(&["Limits", "Series"]);
        assert!(!set.remove("Integrals"));
        assert_eq!(set.as_slice(), &["Limits", "Series"]);

        assert!(set.remove("Limits"));
        assert_eq!(set.as_slice(), &["Series"]);
    }

    #[test]
    fn test_handles_share_one_board() {
        let board = ReviewBoard::new();
        let writer = board.writer();
        let reader = board.reader();

        writer.add(["Q1", "Q2"]);
        assert_eq!(reader.topics(), vec!["Q1", "Q2"]);

        assert!(reader.remove("Q1"));
        assert_eq!(board.snapshot(), vec!["Q2"]);

        writer.add(["Q1"]);
        assert_eq!(board.snapshot(), vec!["Q2", "Q1"]);
        assert!(!reader.is_empty());
    }
}
