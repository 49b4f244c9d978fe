use crate::answer::AnswerGenerator;
use crate::extract::extract_order_id;
use crate::index::{InvertedIndex, VectorizerConfig};
use crate::order::{build_corpus, demo_orders, OrderRecord};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_K: usize = 3;

/// Score given to an order named explicitly in the query.
pub const OVERRIDE_SCORE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderMatch {
    pub order: OrderRecord,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub best_match: Option<OrderMatch>,
    pub top_k: Vec<OrderMatch>,
    #[serde(rename = "gemini_answer")]
    pub answer: Option<String>,
}

impl QueryResult {
    fn empty(query: &str) -> Self {
        Self { query: query.to_string(), best_match: None, top_k: Vec::new(), answer: None }
    }
}

/// Round to four decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Immutable query context: the order set and the index fitted over it.
#[derive(Debug)]
pub struct OrderSearch {
    orders: Vec<OrderRecord>,
    index: InvertedIndex,
}

impl OrderSearch {
    pub fn new(orders: Vec<OrderRecord>, config: VectorizerConfig) -> Self {
        let corpus = build_corpus(&orders);
        let index = InvertedIndex::build(&corpus, config);
        Self { orders, index }
    }

    pub fn demo() -> Self {
        Self::new(demo_orders(), VectorizerConfig::default())
    }

    pub fn orders(&self) -> &[OrderRecord] { &self.orders }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    /// Case-insensitive lookup by order id.
    pub fn find_order(&self, order_id: &str) -> Option<&OrderRecord> {
        self.orders.iter().find(|o| o.order_id.eq_ignore_ascii_case(order_id))
    }

    /// Similarity ranking only: rounded positive scores, highest first, ties
    /// in corpus order, at most `top_k` entries.
    pub fn rank(&self, query: &str, top_k: usize) -> Vec<OrderMatch> {
        let sims = self.index.similarities(query);
        let mut scored: Vec<OrderMatch> = sims
            .into_iter()
            .enumerate()
            .filter(|(_, s)| s.is_finite())
            .map(|(idx, s)| (idx, round_score(s)))
            .filter(|(_, s)| *s > 0.0)
            .map(|(idx, score)| OrderMatch { order: self.orders[idx].clone(), score })
            .collect();
        // stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        scored
    }

    /// Ranking plus identifier override, without answer generation.
    pub fn retrieve(&self, query: &str, top_k: usize) -> QueryResult {
        if query.trim().is_empty() {
            return QueryResult::empty(query);
        }

        let mut scored = self.rank(query, top_k);

        if let Some(order) = extract_order_id(query).and_then(|id| self.find_order(&id)) {
            if scored.iter().any(|m| m.order.order_id == order.order_id) {
                // Kept as-is: the override is prepended even when the order
                // is already in the similarity list.
                tracing::debug!(order_id = %order.order_id, "identifier override duplicates a ranked match");
            }
            scored.insert(0, OrderMatch { order: order.clone(), score: OVERRIDE_SCORE });
        }

        let best_match = scored.first().cloned();
        tracing::debug!(
            query,
            matches = scored.len(),
            best = best_match.as_ref().map(|m| m.order.order_id.as_str()),
            "retrieved orders"
        );
        QueryResult { query: query.to_string(), best_match, top_k: scored, answer: None }
    }

    /// Full query: retrieval, then an answer grounded in the best match.
    pub async fn query(&self, query: &str, top_k: usize, generator: &dyn AnswerGenerator) -> QueryResult {
        let mut result = self.retrieve(query, top_k);
        if let Some(best) = &result.best_match {
            result.answer = generator.generate(&best.order.grounding_text(), query).await;
            if result.answer.is_none() {
                tracing::debug!(generator = generator.id(), "no generated answer");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Unconfigured;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AnswerGenerator for Echo {
        fn id(&self) -> &'static str { "echo" }

        async fn generate(&self, grounding: &str, _query: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Some(grounding.lines().next().unwrap_or_default().to_string())
        }
    }

    #[test]
    fn rank_is_sorted_and_bounded() {
        let search = OrderSearch::demo();
        let ranked = search.rank("order payment shipped", 3);
        assert!(ranked.len() <= 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        for m in &ranked {
            assert!(m.score > 0.0 && m.score <= 1.0);
            assert_eq!(round_score(m.score), m.score);
        }
    }

    #[test]
    fn macbook_query_ranks_bob_first() {
        let result = OrderSearch::demo().retrieve("Where is my MacBook order?", DEFAULT_TOP_K);
        let best = result.best_match.unwrap();
        assert_eq!(best.order.order_id, "ORD-1002");
        assert!(best.score > 0.0 && best.score < 1.0);
    }

    #[test]
    fn whitespace_query_is_empty() {
        let result = OrderSearch::demo().retrieve("   ", 10);
        assert!(result.best_match.is_none());
        assert!(result.top_k.is_empty());
        assert_eq!(result.query, "   ");
    }

    #[test]
    fn explicit_id_overrides_similarity() {
        let result = OrderSearch::demo().retrieve("ord1005", DEFAULT_TOP_K);
        let best = result.best_match.unwrap();
        assert_eq!(best.order.order_id, "ORD-1005");
        assert_eq!(best.score, 1.0);
    }

    #[test]
    fn override_may_duplicate_ranked_order() {
        let result = OrderSearch::demo().retrieve("ORD-1002 MacBook", DEFAULT_TOP_K);
        let ids: Vec<&str> = result.top_k.iter().map(|m| m.order.order_id.as_str()).collect();
        assert_eq!(ids[0], "ORD-1002");
        assert_eq!(ids.iter().filter(|id| **id == "ORD-1002").count(), 2);
        assert!(result.top_k.len() <= DEFAULT_TOP_K + 1);
    }

    #[test]
    fn unknown_id_skips_override() {
        let result = OrderSearch::demo().retrieve("ORD-9999", DEFAULT_TOP_K);
        assert!(result.top_k.iter().all(|m| m.score < 1.0));
    }

    #[test]
    fn zero_top_k_keeps_only_override() {
        let result = OrderSearch::demo().retrieve("what about order 1003", 0);
        assert_eq!(result.top_k.len(), 1);
        assert_eq!(result.top_k[0].order.order_id, "ORD-1003");
    }

    #[tokio::test]
    async fn answer_is_grounded_in_best_match() {
        let echo = Echo { calls: AtomicUsize::new(0) };
        let result = OrderSearch::demo().query("ord 1004", DEFAULT_TOP_K, &echo).await;
        assert_eq!(result.answer.as_deref(), Some("Order ID: ORD-1004"));
        assert_eq!(echo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generator_not_called_without_match() {
        let echo = Echo { calls: AtomicUsize::new(0) };
        let result = OrderSearch::demo().query("zebra", DEFAULT_TOP_K, &echo).await;
        assert!(result.best_match.is_none());
        assert!(result.answer.is_none());
        assert_eq!(echo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unconfigured_generator_degrades_to_none() {
        let result = OrderSearch::demo().query("ORD-1001", DEFAULT_TOP_K, &Unconfigured).await;
        assert_eq!(result.best_match.unwrap().order.order_id, "ORD-1001");
        assert!(result.answer.is_none());
    }
}
