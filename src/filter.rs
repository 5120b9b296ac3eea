//! Topic subscription filter

use std::collections::HashSet;

use crate::types::Topic;

/// Set of topics the application asked for.
///
/// Frames on any other topic are dropped by the receive path before they reach the queue,
/// so irrelevant traffic cannot grow the queue and consumers never filter redundantly.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
    topics: HashSet<Topic>,
}

impl TopicFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topic. Returns `true` if it was not subscribed before.
    pub fn subscribe(&mut self, topic: Topic) -> bool {
        self.topics.insert(topic)
    }

    /// Add several topics at once.
    pub fn subscribe_all<I>(&mut self, topics: I)
    where
        I: IntoIterator<Item = Topic>,
    {
        self.topics.extend(topics);
    }

    /// Whether frames on `topic` should be retained.
    pub fn accepts(&self, topic: Topic) -> bool {
        self.topics.contains(&topic)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Subscribed topics in ascending order.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.topics.iter().copied().collect();
        topics.sort_unstable();
        topics
    }

    /// Iterate subscribed topics in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = Topic> + '_ {
        self.topics.iter().copied()
    }
}

impl FromIterator<Topic> for TopicFilter {
    fn from_iter<I: IntoIterator<Item = Topic>>(iter: I) -> Self {
        Self { topics: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_accepts_exactly_subscribed_topics(
            subscribed in prop::collection::hash_set(any::<u32>(), 0..16),
            probe in any::<u32>()
        ) {
            let filter: TopicFilter = subscribed.iter().copied().map(Topic).collect();
            prop_assert_eq!(filter.accepts(Topic(probe)), subscribed.contains(&probe));
            prop_assert_eq!(filter.len(), subscribed.len());
        }
    }

    #[test]
    fn subscribe_is_idempotent() {
        let mut filter = TopicFilter::new();
        assert!(filter.is_empty());
        assert!(filter.subscribe(Topic::LIGHT));
        assert!(!filter.subscribe(Topic::LIGHT));
        assert_eq!(filter.len(), 1);
        assert!(filter.accepts(Topic::LIGHT));
        assert!(!filter.accepts(Topic::COUNTER));
    }

    #[test]
    fn topics_are_listed_in_order() {
        let mut filter = TopicFilter::new();
        filter.subscribe_all([Topic::LIGHT, Topic::COUNTER, Topic::ELECTRICAL, Topic::COUNTER]);
        assert_eq!(filter.topics(), vec![Topic::COUNTER, Topic::ELECTRICAL, Topic::LIGHT]);
    }
}
