//! Static route table resolving inbound paths to backend services

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::error::{AppError, Result};
use crate::gateway::services::{ServiceKind, ServiceRegistry};

/// How a rule matches an inbound path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Whole path, trailing slash ignored
    Exact,
    /// Path with `{name}` placeholders, one segment each
    Template,
    /// Path prefix ending at a segment boundary
    Prefix,
}

/// A single entry of the route table as configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub kind: RuleKind,
    pub pattern: String,
    pub service: ServiceKind,
    pub target: String,
}

impl RouteRule {
    /// Prefix rule; `rewritten` replaces the matched prefix when given
    pub fn prefix(pattern: &str, service: ServiceKind, rewritten: Option<&str>) -> Self {
        Self {
            kind: RuleKind::Prefix,
            pattern: pattern.to_string(),
            service,
            target: rewritten.unwrap_or(pattern).to_string(),
        }
    }

    pub fn exact(pattern: &str, service: ServiceKind, target: &str) -> Self {
        Self {
            kind: RuleKind::Exact,
            pattern: pattern.to_string(),
            service,
            target: target.to_string(),
        }
    }

    pub fn template(pattern: &str, service: ServiceKind, target: &str) -> Self {
        Self {
            kind: RuleKind::Template,
            pattern: pattern.to_string(),
            service,
            target: target.to_string(),
        }
    }
}

/// Outcome of resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub service: ServiceKind,
    pub base_url: String,
    pub target_path: String,
}

impl ResolvedRoute {
    /// Full upstream URL, carrying the inbound query string over
    pub fn url(&self, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, self.target_path, q),
            _ => format!("{}{}", self.base_url, self.target_path),
        }
    }
}

/// Route table statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RouteTableStats {
    pub exact_routes: usize,
    pub template_routes: usize,
    pub prefix_routes: usize,
}

#[derive(Debug, Clone)]
struct Target {
    service: ServiceKind,
    base_url: String,
    path: String,
}

#[derive(Debug, Clone)]
struct TemplateRoute {
    segments: Vec<Segment>,
    target: Target,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct PrefixRoute {
    prefix: String,
    /// Replacement prefix with trailing slashes removed, empty for `/`
    rewritten: String,
    target: Target,
}

/// Compiled, immutable route table.
///
/// Resolution order is exact rules, then template rules in declaration
/// order, then prefix rules from the longest prefix down.
#[derive(Debug, Clone)]
pub struct RouteTable {
    exact: HashMap<String, Target>,
    templates: Vec<TemplateRoute>,
    prefixes: Vec<PrefixRoute>,
}

impl RouteTable {
    /// Compile rules against the registry; fails on duplicate patterns or unknown services
    pub fn new(rules: Vec<RouteRule>, services: &ServiceRegistry) -> Result<Self> {
        let mut exact = HashMap::new();
        let mut templates = Vec::new();
        let mut template_keys = HashSet::new();
        let mut prefixes: Vec<PrefixRoute> = Vec::new();
        let mut prefix_keys = HashSet::new();

        for rule in rules {
            let service = services.get(rule.service).ok_or_else(|| {
                AppError::Config(config::ConfigError::Message(format!(
                    "Route '{}' targets unknown service '{}'",
                    rule.pattern, rule.service
                )))
            })?;

            let key = normalize(&rule.pattern).to_string();
            let target = Target {
                service: rule.service,
                base_url: service.base_url.clone(),
                path: rule.target.clone(),
            };

            let fresh = match rule.kind {
                RuleKind::Exact => exact.insert(key.clone(), target).is_none(),
                RuleKind::Template => {
                    templates.push(TemplateRoute {
                        segments: parse_segments(&key),
                        target,
                    });
                    template_keys.insert(key.clone())
                }
                RuleKind::Prefix => {
                    prefixes.push(PrefixRoute {
                        prefix: key.clone(),
                        rewritten: rule.target.trim_end_matches('/').to_string(),
                        target,
                    });
                    prefix_keys.insert(key.clone())
                }
            };

            if !fresh {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Duplicate {:?} route '{}'",
                    rule.kind, key
                ))));
            }
        }

        prefixes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        let table = Self {
            exact,
            templates,
            prefixes,
        };
        let stats = table.stats();
        info!(
            exact = stats.exact_routes,
            templates = stats.template_routes,
            prefixes = stats.prefix_routes,
            "Route table compiled"
        );
        Ok(table)
    }

    /// Resolve an inbound path to its backend and rewritten path
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute> {
        let key = normalize(path);

        if let Some(target) = self.exact.get(key) {
            debug!(path = %path, service = %target.service, "Exact route match");
            return Ok(target.resolved(target.path.clone()));
        }

        for template in &self.templates {
            if let Some(params) = template.capture(key) {
                let mut target_path = render(normalize(&template.target.path), &params);
                if path.ends_with('/') && !target_path.ends_with('/') {
                    target_path.push('/');
                }
                debug!(path = %path, service = %template.target.service, "Template route match");
                return Ok(template.target.resolved(target_path));
            }
        }

        for route in &self.prefixes {
            if let Some(rest) = strip_segment_prefix(path, &route.prefix) {
                let target_path = format!("{}{}", route.rewritten, rest);
                debug!(
                    path = %path,
                    prefix = %route.prefix,
                    service = %route.target.service,
                    "Prefix route match"
                );
                return Ok(route.target.resolved(target_path));
            }
        }

        Err(AppError::RouteNotFound(path.to_string()))
    }

    pub fn stats(&self) -> RouteTableStats {
        RouteTableStats {
            exact_routes: self.exact.len(),
            template_routes: self.templates.len(),
            prefix_routes: self.prefixes.len(),
        }
    }
}

impl Target {
    fn resolved(&self, target_path: String) -> ResolvedRoute {
        ResolvedRoute {
            service: self.service,
            base_url: self.base_url.clone(),
            target_path,
        }
    }
}

impl TemplateRoute {
    fn capture<'a>(&self, path: &'a str) -> Option<HashMap<&str, &'a str>> {
        let parts: Vec<&str> = path.split('/').skip(1).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    params.insert(name.as_str(), part);
                }
                _ => return None,
            }
        }
        Some(params)
    }
}

/// Drop trailing slashes, keeping the root as `/`
fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn parse_segments(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .skip(1)
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(s.to_string()),
        })
        .collect()
}

fn render(template: &str, params: &HashMap<&str, &str>) -> String {
    template
        .split('/')
        .map(|s| {
            s.strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .and_then(|name| params.get(name).copied())
                .unwrap_or(s)
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Remainder of `path` after `prefix`, only when the prefix ends on a segment boundary
fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == "/" {
        return Some(path);
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}
