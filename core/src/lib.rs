pub mod answer;
pub mod extract;
pub mod index;
pub mod order;
pub mod search;
pub mod tokenizer;

pub use answer::{AnswerGenerator, Unconfigured};
pub use extract::extract_order_id;
pub use index::{DocId, InvertedIndex, Posting, TermId, VectorizerConfig};
pub use order::{build_corpus, demo_orders, load_orders, OrderRecord};
pub use search::{round_score, OrderMatch, OrderSearch, QueryResult, DEFAULT_TOP_K};
