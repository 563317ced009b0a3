//! Minimal BM25 scorer over a fixed corpus
//!
//! The corpus is the tool pool, built once at recommender construction and
//! never updated. Tokenization is a bare whitespace split -- a known
//! simplification; no lowercasing, stemming, or punctuation handling.

use std::collections::HashMap;

const K1: f32 = 1.2;
const B: f32 = 0.75;

/// BM25 index over a fixed ordered document set
#[derive(Debug)]
pub struct Bm25Index {
    /// token -> [(doc index, term frequency)]
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_len: Vec<u32>,
    avg_len: f32,
}

impl Bm25Index {
    /// Build an index; document order is preserved in score output
    pub fn build<'a>(docs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_len = Vec::new();

        for (index, doc) in docs.into_iter().enumerate() {
            let tokens = tokenize(doc);
            let mut counts: HashMap<&str, u32> = HashMap::new();
            for token in &tokens {
                *counts.entry(token).or_insert(0) += 1;
            }
            #[allow(clippy::cast_possible_truncation)]
            doc_len.push(tokens.len() as u32);
            for (token, tf) in counts {
                postings.entry(token.to_owned()).or_default().push((index, tf));
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let avg_len = if doc_len.is_empty() {
            0.0
        } else {
            doc_len.iter().map(|&l| f64::from(l)).sum::<f64>() as f32 / doc_len.len() as f32
        };

        Self {
            postings,
            doc_len,
            avg_len,
        }
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.doc_len.len()
    }

    /// Whether the index holds no documents
    pub fn is_empty(&self) -> bool {
        self.doc_len.is_empty()
    }

    /// Score every document against a query; output is indexed by document
    #[allow(clippy::cast_precision_loss)]
    pub fn scores(&self, query: &str) -> Vec<f32> {
        let mut scores = vec![0.0_f32; self.doc_len.len()];
        if self.doc_len.is_empty() {
            return scores;
        }

        let n = self.doc_len.len() as f32;
        for token in tokenize(query) {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(doc, tf) in postings {
                let tf = tf as f32;
                let dl = self.doc_len[doc] as f32;
                let denom = tf + K1 * (1.0 - B + B * dl / self.avg_len.max(f32::EPSILON));
                scores[doc] += idf * tf * (K1 + 1.0) / denom;
            }
        }
        scores
    }

    /// Indices of the `k` highest-scoring documents, ties broken by document
    /// order
    pub fn top_k(&self, query: &str, k: usize) -> Vec<usize> {
        let scores = self.scores(query);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable sort keeps ascending document order within equal scores
        order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal));
        order.truncate(k);
        order
    }
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
