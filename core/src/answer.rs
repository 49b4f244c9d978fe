//! Answer generation seam.
//!
//! The retrieval core only needs "maybe a sentence or two about this order".
//! Implementations must swallow their own failures and return `None`; a
//! missing answer never fails a query.

use async_trait::async_trait;

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Short provider name for logs.
    fn id(&self) -> &'static str;

    /// Produce an answer to `query` grounded in `grounding`, or `None` when
    /// the generator is unavailable or the call failed.
    async fn generate(&self, grounding: &str, query: &str) -> Option<String>;
}

/// Generator used when no credential is configured. Always answers `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl AnswerGenerator for Unconfigured {
    fn id(&self) -> &'static str {
        "unconfigured"
    }

    async fn generate(&self, _grounding: &str, _query: &str) -> Option<String> {
        None
    }
}

/// Instruction prompt shared by language-model backed generators.
pub fn build_prompt(grounding: &str, query: &str) -> String {
    format!(
        "You are an order-tracking assistant. Based on the following order summary \
         and user query, answer briefly with the current status of the order and any \
         useful next steps.\n\n\
         ORDER SUMMARY:\n{grounding}\n\n\
         USER QUERY:\n{query}\n\n\
         Answer in 2-3 short sentences."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_never_answers() {
        assert_eq!(Unconfigured.generate("Order ID: ORD-1", "where?").await, None);
    }

    #[test]
    fn prompt_embeds_both_inputs() {
        let prompt = build_prompt("Order ID: ORD-1001", "is it shipped?");
        assert!(prompt.contains("ORDER SUMMARY:\nOrder ID: ORD-1001\n\nUSER QUERY:\nis it shipped?"));
    }
}
