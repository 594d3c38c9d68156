//! Source domains, the unit of "no repeated source" constraints

use crate::model::BehavioralHypothesis;
use std::collections::HashSet;
use url::Url;

/// Lower-cased host of `url` without a leading `www.`; `None` when the URL
/// does not parse or carries no host
pub fn source_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed
        .host_str()
        .map(str::trim)
        .filter(|value| !value.is_empty())?
        .to_ascii_lowercase();

    Some(
        host.strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(host),
    )
}

/// Deduplicated domains of `urls`, in first-seen order. Malformed URLs are
/// skipped.
pub fn extract_domains<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter_map(|url| source_domain(url.as_ref()))
        .filter(|domain| seen.insert(domain.clone()))
        .collect()
}

pub fn hypothesis_source_urls(hypotheses: &[BehavioralHypothesis]) -> Vec<&str> {
    hypotheses
        .iter()
        .flat_map(|h| h.supporting_sources.iter())
        .map(|s| s.url.as_str())
        .collect()
}

/// Domains already cited by the hypothesis evidence, passed forward so the
/// signal research does not reuse them
pub fn banned_domains(hypotheses: &[BehavioralHypothesis]) -> Vec<String> {
    extract_domains(hypothesis_source_urls(hypotheses))
}
