//! Robots.txt parser implementation
//!
//! This module provides functionality for parsing robots.txt content using the robotstxt crate.

use robotstxt::DefaultMatcher;

/// Parsed robots.txt rules for one host
///
/// This is a wrapper around the robotstxt crate's matcher, providing a
/// simplified interface for checking if URLs are allowed.
#[derive(Debug, Clone)]
pub struct RobotsPolicy {
    /// Raw robots.txt content (empty string means allow all)
    content: String,
    /// Whether to allow all (true = allow all, false = parse content)
    allow_all: bool,
}

impl RobotsPolicy {
    /// Creates a new RobotsPolicy from raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            allow_all: false,
        }
    }

    /// Creates a permissive RobotsPolicy that allows everything
    ///
    /// This is what a missing or unreadable robots.txt resolves to.
    pub fn allow_all() -> Self {
        Self {
            content: String::new(),
            allow_all: true,
        }
    }

    /// Returns true if this policy places no restriction at all
    pub fn is_unrestricted(&self) -> bool {
        self.allow_all || self.content.trim().is_empty()
    }

    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `url` - The URL (or bare path) to check
    /// * `user_agent` - The product token, e.g. `Creole` (no version)
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// Gets the crawl delay for a specific user agent
    ///
    /// A group naming the agent wins over the `*` group. Within a group the
    /// first valid `Crawl-delay` counts.
    ///
    /// # Returns
    ///
    /// * `Some(f64)` - The crawl delay in seconds
    /// * `None` - If no crawl delay is specified
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        if self.is_unrestricted() {
            return None;
        }

        let normalized_agent = user_agent.to_lowercase();

        // Consecutive User-agent lines form one group; any other directive closes the list
        let mut current_user_agents: Vec<String> = Vec::new();
        let mut collecting_agents = false;
        let mut crawl_delay_for_wildcard: Option<f64> = None;
        let mut crawl_delay_for_agent: Option<f64> = None;

        for line in self.content.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "user-agent" => {
                    if !collecting_agents {
                        current_user_agents.clear();
                        collecting_agents = true;
                    }
                    current_user_agents.push(value.to_lowercase());
                }
                "crawl-delay" => {
                    collecting_agents = false;

                    let delay = match value.parse::<f64>() {
                        Ok(d) if d.is_finite() && d >= 0.0 => d,
                        _ => continue,
                    };

                    let names_agent = current_user_agents.iter().any(|ua| {
                        ua != "*" && !ua.is_empty() && normalized_agent.contains(ua.as_str())
                    });

                    if names_agent {
                        crawl_delay_for_agent.get_or_insert(delay);
                    } else if current_user_agents.iter().any(|ua| ua == "*") {
                        crawl_delay_for_wildcard.get_or_insert(delay);
                    }
                }
                _ => collecting_agents = false,
            }
        }

        crawl_delay_for_agent.or(crawl_delay_for_wildcard)
    }
}
