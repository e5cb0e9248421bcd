//! Local record of the topic subscriptions this process has issued.
//!
//! This is bookkeeping only. It reflects what the relay told the
//! messaging provider, not what the provider will actually deliver,
//! so it must never be used to decide delivery eligibility. Entries
//! are never removed and there is no lookup by topic.

use std::collections::HashSet;

use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    topics_by_token: DashMap<String, HashSet<String>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `topic` to the set recorded for `token`, creating the set on
    /// first use. Calling it again with the same pair is a no-op.
    pub fn record_subscription(&self, token: &str, topic: &str) {
        // The entry guard holds the shard write lock for the whole
        // get-or-create-then-insert step
        self.topics_by_token
            .entry(token.to_string())
            .or_default()
            .insert(topic.to_string());
    }

    /// Whether this process recorded a subscription of `token` to `topic`.
    /// Unknown tokens are simply not subscribed.
    pub fn is_subscribed(&self, token: &str, topic: &str) -> bool {
        self.topics_by_token
            .get(token)
            .is_some_and(|topics| topics.contains(topic))
    }

    /// Sorted snapshot of the topics recorded for `token`
    pub fn topics_for(&self, token: &str) -> Vec<String> {
        let mut topics = self
            .topics_by_token
            .get(token)
            .map(|topics| topics.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        topics.sort();
        topics
    }

    /// Number of tokens with at least one recorded topic
    pub fn len(&self) -> usize {
        self.topics_by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics_by_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_record_subscription_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        registry.record_subscription("tok-A", "news");
        registry.record_subscription("tok-A", "news");

        assert!(registry.is_subscribed("tok-A", "news"));
        assert_eq!(registry.topics_for("tok-A"), vec!["news".to_string()]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_subscriptions_are_isolated_per_token() {
        let registry = SubscriptionRegistry::new();
        registry.record_subscription("tok-1", "news");

        assert!(registry.is_subscribed("tok-1", "news"));
        assert!(!registry.is_subscribed("tok-2", "news"));
        assert!(!registry.is_subscribed("tok-1", "sports"));
    }

    #[test]
    fn test_unknown_token_is_not_subscribed() {
        let registry = SubscriptionRegistry::new();

        assert!(!registry.is_subscribed("unknown", "any"));
        assert!(registry.topics_for("unknown").is_empty());
        // Queries never create entries
        assert!(registry.is_empty());
    }

    #[test]
    fn test_topics_for_is_sorted() {
        let registry = SubscriptionRegistry::new();
        registry.record_subscription("tok", "weather");
        registry.record_subscription("tok", "alerts");
        registry.record_subscription("tok", "news");

        assert_eq!(registry.topics_for("tok"), vec!["alerts", "news", "weather"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_subscribes_lose_no_updates() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..200 {
            let registry = Arc::clone(&registry);
            tasks.spawn(async move {
                registry.record_subscription("tok-shared", &format!("topic-{}", i));
            });
        }
        while let Some(res) = tasks.join_next().await {
            res.unwrap();
        }

        for i in 0..200 {
            assert!(registry.is_subscribed("tok-shared", &format!("topic-{}", i)));
        }
        assert_eq!(registry.topics_for("tok-shared").len(), 200);
        assert_eq!(registry.len(), 1);
    }
}
