use crate::tokenizer::{tokenize, TokenizerOptions};
use std::collections::HashMap;

pub type TermId = u32;
pub type DocId = u32;

/// How raw counts become term weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorizerConfig {
    /// Use smoothed IDF = ln((1 + N) / (1 + df)) + 1 instead of ln(N / df)
    pub smooth_idf: bool,
    /// Use 1 + ln(tf) instead of the raw count
    pub sublinear_tf: bool,
    pub tokenizer: TokenizerOptions,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self { smooth_idf: true, sublinear_tf: false, tokenizer: TokenizerOptions::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}

/// Fitted term-weight index over a static corpus. Document vectors are stored
/// as per-term postings of unit-normalized weights.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pub dictionary: HashMap<String, TermId>,
    pub df: Vec<u32>,
    pub idf: Vec<f64>,
    pub postings: Vec<Vec<Posting>>, // indexed by term id, sorted by doc_id
    pub num_docs: u32,
    config: VectorizerConfig,
}

impl InvertedIndex {
    /// Fit the vocabulary and document vectors. Document `i` of `corpus`
    /// becomes doc id `i`.
    pub fn build<S: AsRef<str>>(corpus: &[S], config: VectorizerConfig) -> Self {
        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        let mut postings_raw: Vec<Vec<(DocId, u32)>> = Vec::new();

        for (doc_id, text) in corpus.iter().enumerate() {
            let doc_id = doc_id as DocId;
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for term in tokenize(text.as_ref(), config.tokenizer) {
                let next = dictionary.len() as TermId;
                let tid = *dictionary.entry(term).or_insert(next);
                if tid == next {
                    df.push(0);
                    postings_raw.push(Vec::new());
                }
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for (tid, tf_raw) in tf_counts {
                df[tid as usize] += 1;
                postings_raw[tid as usize].push((doc_id, tf_raw));
            }
        }

        let num_docs = corpus.len() as u32;
        let idf: Vec<f64> = df.iter().map(|&df_t| idf_weight(num_docs, df_t, config.smooth_idf)).collect();

        // First pass: accumulate squared norms per document
        let mut doc_norms: Vec<f64> = vec![0.0; num_docs as usize];
        for (tid, plist) in postings_raw.iter().enumerate() {
            for &(doc_id, tf_raw) in plist {
                let w = tf_weight(tf_raw, config.sublinear_tf) * idf[tid];
                doc_norms[doc_id as usize] += w * w;
            }
        }
        for dn in doc_norms.iter_mut() {
            *dn = dn.sqrt();
            if *dn == 0.0 { *dn = 1.0; }
        }

        // Second pass: normalized postings
        let postings = postings_raw
            .into_iter()
            .enumerate()
            .map(|(tid, plist)| {
                let mut out: Vec<Posting> = plist
                    .into_iter()
                    .map(|(doc_id, tf_raw)| Posting {
                        doc_id,
                        weight: tf_weight(tf_raw, config.sublinear_tf) * idf[tid] / doc_norms[doc_id as usize],
                    })
                    .collect();
                out.sort_by_key(|p| p.doc_id);
                out
            })
            .collect();

        tracing::debug!(num_docs, num_terms = dictionary.len(), "fitted term-weight index");
        Self { dictionary, df, idf, postings, num_docs, config }
    }

    pub fn config(&self) -> VectorizerConfig { self.config }

    pub fn vocabulary_len(&self) -> usize { self.dictionary.len() }

    /// Unit-normalized query weights. Terms outside the fitted vocabulary are
    /// dropped; an empty vector means nothing in the query is known.
    pub fn query_weights(&self, query: &str) -> Vec<(TermId, f64)> {
        let mut tf_q_raw: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(query, self.config.tokenizer) {
            if let Some(&tid) = self.dictionary.get(&term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }
        let mut weights: Vec<(TermId, f64)> = tf_q_raw
            .into_iter()
            .map(|(tid, tf_raw)| (tid, tf_weight(tf_raw, self.config.sublinear_tf) * self.idf[tid as usize]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for (_, w) in weights.iter_mut() { *w /= norm; }
        weights.sort_by_key(|(tid, _)| *tid);
        weights
    }

    /// Cosine similarity of `query` against every document, in corpus order.
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.num_docs as usize];
        for (tid, q_w) in self.query_weights(query) {
            for p in &self.postings[tid as usize] {
                scores[p.doc_id as usize] += p.weight * q_w; // cosine since doc weights are normalized
            }
        }
        for s in scores.iter_mut() {
            *s = s.clamp(0.0, 1.0);
        }
        scores
    }

    /// Vocabulary terms found in `query` with their idf, in query order.
    pub fn known_terms(&self, query: &str) -> Vec<(String, f64)> {
        let mut out: Vec<(String, f64)> = Vec::new();
        for term in tokenize(query, self.config.tokenizer) {
            if out.iter().any(|(t, _)| *t == term) { continue; }
            if let Some(&tid) = self.dictionary.get(&term) {
                out.push((term, self.idf[tid as usize]));
            }
        }
        out
    }
}

fn tf_weight(tf_raw: u32, sublinear: bool) -> f64 {
    if tf_raw == 0 {
        0.0
    } else if sublinear {
        1.0 + (tf_raw as f64).ln()
    } else {
        tf_raw as f64
    }
}

fn idf_weight(num_docs: u32, df_t: u32, smoothed: bool) -> f64 {
    let n = num_docs as f64;
    let df_t = df_t.max(1) as f64;
    if smoothed {
        ((1.0 + n) / (1.0 + df_t)).ln() + 1.0
    } else {
        (n / df_t).ln()
    }
}
