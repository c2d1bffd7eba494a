// Domain resolution: which known blog does a URL point at?
//
// Blogs are keyed by the host of their site URL, lower-cased with a single
// leading "www." removed. Matching is exact on that normalized host. On
// shared hosting platforms the full subdomain is the key, so
// alice.blogspot.com and bob.blogspot.com stay different blogs and neither
// matches a bare link to blogspot.com.

use std::collections::HashMap;

use tracing::debug;
use url::Url;

use crate::db::models::Blog;

/// Hosting platforms where each blog lives on its own subdomain.
pub const SHARED_PLATFORMS: &[&str] = &["blogspot.com", "substack.com", "github.io", "dreamwidth.org"];

/// Lower-case and strip one leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.to_lowercase();
    match lowered.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Normalized host of an absolute or protocol-relative (`//host/path`) URL.
/// Path-relative links, non-host schemes (`mailto:`), and garbage all give
/// `None`.
pub fn domain_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = match url.strip_prefix("//") {
        Some(rest) => Url::parse(&format!("https://{rest}")).ok()?,
        None => Url::parse(url).ok()?,
    };
    let host = parsed.host_str()?;
    let domain = normalize_domain(host);
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Whether `domain` is a blog subdomain of a shared hosting platform.
pub fn is_shared_platform(domain: &str) -> bool {
    SHARED_PLATFORMS.iter().any(|platform| {
        domain
            .strip_suffix(platform)
            .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Normalized domain -> blog id, built from blogs' site URLs.
#[derive(Debug, Clone, Default)]
pub struct DomainMap {
    domains: HashMap<String, i64>,
}

impl DomainMap {
    /// Blogs without a usable site URL are left out. If two blogs share a
    /// domain, the later one wins.
    pub fn from_blogs(blogs: &[Blog]) -> Self {
        let mut domains = HashMap::new();
        for blog in blogs {
            if let Some(domain) = blog.site_url.as_deref().and_then(domain_from_url) {
                domains.insert(domain, blog.id);
            }
        }
        debug!(blogs = blogs.len(), domains = domains.len(), "Built domain map");
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Blog id for an already-normalized domain.
    pub fn resolve_domain(&self, domain: &str) -> Option<i64> {
        if domain.is_empty() {
            return None;
        }
        let found = self.domains.get(domain).copied();
        if found.is_none() && is_shared_platform(domain) {
            debug!(domain, "Unknown blog on a shared hosting platform");
        }
        found
    }

    /// Blog id a URL points at, if any.
    pub fn resolve(&self, url: &str) -> Option<i64> {
        domain_from_url(url).and_then(|domain| self.resolve_domain(&domain))
    }
}
