// Keyword analysis: markup stripping, TF-IDF, trends, emerging topics,
// and leading blogs.

pub mod emerging;
pub mod leaders;
pub mod normalize;
pub mod tfidf;
pub mod trends;
