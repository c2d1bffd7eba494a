// Colored terminal output for trends, similarity, clusters, and the
// citation network.
//
// This module handles all terminal-specific formatting: colors and tables.
// The main.rs command handlers delegate here.

use std::collections::BTreeMap;

use colored::Colorize;

use crate::clusters::{Cluster, SimilarBlog};
use crate::network::{rank_by_pagerank, Centrality};
use crate::pipeline::import::ImportSummary;
use crate::topics::emerging::EmergingTopic;
use crate::topics::leaders::LeadingBlog;
use crate::topics::trends::{top_keywords, TrendTable};

/// Display the top keywords of each period, oldest period first.
pub fn display_trends(trends: &TrendTable, top: usize) {
    if trends.is_empty() {
        println!("No trends yet. Trends need dated posts and a vocabulary of repeated terms.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Keyword Trends ({} periods) ===", trends.len()).bold()
    );

    for (period, scores) in trends {
        println!("\n  {}", period.cyan().bold());
        for (keyword, score) in top_keywords(scores, top) {
            println!("    {:<32} {:.4}  {}", keyword, score, bar(score));
        }
    }
    println!();
}

/// Display emerging topics, fastest-accelerating first.
pub fn display_emerging(topics: &[EmergingTopic], window: usize) {
    if topics.is_empty() {
        println!("No emerging topics (need at least {} periods of data).", window + 1);
        return;
    }

    println!(
        "\n{}",
        format!("=== Emerging Topics ({}) ===", topics.len()).bold()
    );
    println!();
    println!(
        "  {:<32} {:>10} {:>10} {:>8}",
        "Keyword".dimmed(),
        "Recent".dimmed(),
        "Baseline".dimmed(),
        "Accel".dimmed(),
    );
    println!("  {}", "-".repeat(64).dimmed());

    for topic in topics {
        let accel = format!("{:.2}x", topic.acceleration);
        println!(
            "  {:<32} {:>10.4} {:>10.4} {:>8}",
            topic.keyword,
            topic.recent_score,
            topic.historical_avg,
            colorize_acceleration(topic.acceleration, &accel),
        );
    }
    println!();
}

/// Display the blogs that wrote about a keyword, earliest first.
pub fn display_leaders(keyword: &str, leaders: &[LeadingBlog]) {
    if leaders.is_empty() {
        println!("No posts mention \"{keyword}\".");
        return;
    }

    println!(
        "\n{}",
        format!("=== Who wrote about \"{keyword}\" first ===").bold()
    );
    println!();

    for (i, leader) in leaders.iter().enumerate() {
        let first = if leader.first_mention.is_empty() {
            "undated".dimmed().to_string()
        } else {
            leader.first_mention.clone()
        };
        let mentions = if leader.mention_count == 1 { "post" } else { "posts" };
        println!(
            "  {:>3}. {:<36} {:<12} {} {}",
            i + 1,
            super::truncate_chars(&leader.blog_name, 36),
            first,
            leader.mention_count,
            mentions.dimmed(),
        );
    }
    println!();
}

/// Display the nearest neighbours of one blog.
pub fn display_similar(blog_name: &str, similar: &[SimilarBlog]) {
    if similar.is_empty() {
        println!("No similar blogs found for \"{blog_name}\". Is the name spelled exactly?");
        return;
    }

    println!("\n{}", format!("=== Blogs similar to {blog_name} ===").bold());
    println!();

    for (i, blog) in similar.iter().enumerate() {
        println!(
            "  {:>3}. {:<40} {:.3}  {}",
            i + 1,
            super::truncate_chars(&blog.name, 40),
            blog.similarity_score,
            bar(blog.similarity_score),
        );
    }
    println!();
}

/// Display clusters with their label terms and members.
pub fn display_clusters(clusters: &[Cluster]) {
    if clusters.is_empty() {
        println!("No clusters. Import some posts first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Blog Clusters ({}) ===", clusters.len()).bold()
    );

    for cluster in clusters {
        let label = if cluster.label.is_empty() {
            "(no distinctive terms)".dimmed().to_string()
        } else {
            cluster.label.cyan().to_string()
        };
        println!(
            "\n  {} {}  {}",
            format!("#{}", cluster.cluster_id).bold(),
            label,
            format!("({} blogs)", cluster.blogs.len()).dimmed(),
        );
        for blog in &cluster.blogs {
            println!("      {blog}");
        }
    }
    println!();
}

/// Display the citation network's most central blogs by PageRank.
pub fn display_centrality(centrality: &BTreeMap<String, Centrality>, top: usize) {
    if centrality.is_empty() {
        println!("No blogs in the citation network. Run `blogpulse citations` first.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Citation Network ({} blogs) ===", centrality.len()).bold()
    );
    println!();
    println!(
        "  {:>4}  {:<32} {:>9} {:>11} {:>5} {:>5}",
        "Rank".dimmed(),
        "Blog".dimmed(),
        "PageRank".dimmed(),
        "Between".dimmed(),
        "In".dimmed(),
        "Out".dimmed(),
    );
    println!("  {}", "-".repeat(72).dimmed());

    for (i, (name, c)) in rank_by_pagerank(centrality).into_iter().take(top).enumerate() {
        println!(
            "  {:>4}. {:<32} {:>9.4} {:>11.4} {:>5} {:>5}",
            i + 1,
            super::truncate_chars(name, 32),
            c.pagerank,
            c.betweenness,
            c.in_degree,
            c.out_degree,
        );
    }

    let isolated = centrality
        .values()
        .filter(|c| c.in_degree == 0 && c.out_degree == 0)
        .count();
    if isolated > 0 {
        println!("\n  {} {} blogs neither cite nor are cited", "~".yellow(), isolated);
    }
    println!();
}

pub fn display_import_summary(summary: &ImportSummary) {
    println!(
        "Imported {} new blogs and {} new posts ({} skipped).",
        summary.blogs_added.to_string().bold(),
        summary.posts_added.to_string().bold(),
        summary.posts_skipped,
    );
}

/// Ten-cell bar for a score in [0, 1].
fn bar(score: f64) -> colored::ColoredString {
    let cells = (score.clamp(0.0, 1.0) * 10.0).round() as usize;
    "#".repeat(cells).green()
}

fn colorize_acceleration(acceleration: f64, text: &str) -> colored::ColoredString {
    if acceleration >= 5.0 {
        text.red().bold()
    } else if acceleration >= 3.0 {
        text.bright_red()
    } else {
        text.yellow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_width() {
        colored::control::set_override(false);
        assert_eq!(bar(0.0).to_string(), "");
        assert_eq!(bar(0.5).to_string(), "#####");
        assert_eq!(bar(2.0).to_string(), "##########");
    }
}
