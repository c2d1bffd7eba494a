// BlogPulse: trends, similarity, and citation networks for a blog corpus
//
// This is the library root. Each module corresponds to a major subsystem
// of the analysis pipeline.

pub mod clusters;
pub mod config;
pub mod db;
pub mod network;
pub mod output;
pub mod pipeline;
pub mod topics;
