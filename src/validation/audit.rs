//! Post-hoc evidence checks
//!
//! The research stages are asked for exact counts, evidence mixes and
//! domain-unique sources, but the generator is not bound by the request.
//! These checks report every deviation as an [`AuditFinding`]; none of them
//! fail a run.

use crate::model::{
    BehavioralHypothesis, EvidenceType, Layer, MarketSignal, SignalType, Source, Strength,
};
use crate::pipeline::domains::source_domain;
use std::collections::HashSet;
use std::fmt;

pub const HYPOTHESIS_COUNT: usize = 5;
pub const SOURCES_PER_HYPOTHESIS: usize = 5;
pub const BEHAVIORAL_SOURCES_PER_HYPOTHESIS: usize = 3;
pub const QUANTITATIVE_SOURCES_PER_HYPOTHESIS: usize = 2;
pub const HYPOTHESIS_SNIPPET_MAX_CHARS: usize = 180;
pub const MAX_CONTRADICTING_SIGNALS: usize = 2;
pub const CONTRADICTING_SIGNAL_MAX_CHARS: usize = 140;

pub const SIGNAL_COUNT: usize = 8;
pub const SOURCES_PER_SIGNAL: usize = 2;
pub const SIGNAL_SNIPPET_MAX_CHARS: usize = 160;

/// Where in the report a finding was observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Hypothesis(usize),
    Signal(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Hypothesis(i) => write!(f, "behavioralHypotheses[{}]", i),
            Location::Signal(i) => write!(f, "marketSignals[{}]", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFinding {
    WrongCount {
        field: String,
        expected: usize,
        actual: usize,
    },
    WrongLayerOrder {
        index: usize,
        expected: Layer,
        actual: Layer,
    },
    WrongSignalOrder {
        index: usize,
        expected: SignalType,
        actual: SignalType,
    },
    UnexpectedSources {
        location: Location,
        count: usize,
    },
    WrongEvidenceMix {
        location: Location,
        behavioral: usize,
        quantitative: usize,
    },
    RepeatedDomain {
        location: Location,
        domain: String,
    },
    BannedDomain {
        location: Location,
        domain: String,
    },
    UnparseableUrl {
        location: Location,
        url: String,
    },
    TooLong {
        location: Location,
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Directional evidence only supports a low-strength signal
    DirectionalStrength {
        location: Location,
        strength: Strength,
    },
}

impl fmt::Display for AuditFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditFinding::WrongCount {
                field,
                expected,
                actual,
            } => write!(f, "{}: expected {} entries, got {}", field, expected, actual),
            AuditFinding::WrongLayerOrder {
                index,
                expected,
                actual,
            } => write!(
                f,
                "behavioralHypotheses[{}]: expected layer {}, got {}",
                index,
                expected.as_str(),
                actual.as_str()
            ),
            AuditFinding::WrongSignalOrder {
                index,
                expected,
                actual,
            } => write!(
                f,
                "marketSignals[{}]: expected type {}, got {}",
                index,
                expected.as_str(),
                actual.as_str()
            ),
            AuditFinding::UnexpectedSources { location, count } => {
                write!(f, "{}: expected no sources, got {}", location, count)
            }
            AuditFinding::WrongEvidenceMix {
                location,
                behavioral,
                quantitative,
            } => write!(
                f,
                "{}: expected 3 behavioral + 2 quantitative sources, got {} + {}",
                location, behavioral, quantitative
            ),
            AuditFinding::RepeatedDomain { location, domain } => {
                write!(f, "{}: domain {} already cited", location, domain)
            }
            AuditFinding::BannedDomain { location, domain } => {
                write!(f, "{}: domain {} was used by hypothesis evidence", location, domain)
            }
            AuditFinding::UnparseableUrl { location, url } => {
                write!(f, "{}: source url {:?} has no host", location, url)
            }
            AuditFinding::TooLong {
                location,
                field,
                max,
                actual,
            } => write!(f, "{}: {} is {} chars, limit {}", location, field, actual, max),
            AuditFinding::DirectionalStrength { location, strength } => write!(
                f,
                "{}: directional sources with strength {}, expected low",
                location,
                strength.as_str()
            ),
        }
    }
}

/// Draft output: five hypotheses in layer order, none with sources yet
pub fn audit_draft(hypotheses: &[BehavioralHypothesis]) -> Vec<AuditFinding> {
    let mut findings = layer_findings(hypotheses);

    for (index, hypothesis) in hypotheses.iter().enumerate() {
        if !hypothesis.supporting_sources.is_empty() {
            findings.push(AuditFinding::UnexpectedSources {
                location: Location::Hypothesis(index),
                count: hypothesis.supporting_sources.len(),
            });
        }
    }

    findings
}

/// Hypothesis evidence: 5 sources each (3 behavioral + 2 quantitative), every
/// domain unique across all sources, bounded snippets and contradictions.
pub fn audit_hypotheses(hypotheses: &[BehavioralHypothesis]) -> Vec<AuditFinding> {
    let mut findings = layer_findings(hypotheses);
    let mut seen = HashSet::new();

    for (index, hypothesis) in hypotheses.iter().enumerate() {
        let location = Location::Hypothesis(index);
        let sources = &hypothesis.supporting_sources;

        if sources.len() != SOURCES_PER_HYPOTHESIS {
            findings.push(AuditFinding::WrongCount {
                field: format!("{}.supportingSources", location),
                expected: SOURCES_PER_HYPOTHESIS,
                actual: sources.len(),
            });
        }

        let behavioral = count_type(sources, EvidenceType::Behavioral);
        let quantitative = count_type(sources, EvidenceType::Quantitative);
        if behavioral != BEHAVIORAL_SOURCES_PER_HYPOTHESIS
            || quantitative != QUANTITATIVE_SOURCES_PER_HYPOTHESIS
        {
            findings.push(AuditFinding::WrongEvidenceMix {
                location: location.clone(),
                behavioral,
                quantitative,
            });
        }

        for source in sources {
            check_domain(&source.url, &location, &mut seen, &HashSet::new(), &mut findings);
            check_length(
                &source.snippet,
                "snippet",
                HYPOTHESIS_SNIPPET_MAX_CHARS,
                &location,
                &mut findings,
            );
        }

        if hypothesis.contradicting_signals.len() > MAX_CONTRADICTING_SIGNALS {
            findings.push(AuditFinding::WrongCount {
                field: format!("{}.contradictingSignals", location),
                expected: MAX_CONTRADICTING_SIGNALS,
                actual: hypothesis.contradicting_signals.len(),
            });
        }
        for signal in &hypothesis.contradicting_signals {
            check_length(
                signal,
                "contradicting signal",
                CONTRADICTING_SIGNAL_MAX_CHARS,
                &location,
                &mut findings,
            );
        }
    }

    findings
}

/// Signal evidence: 8 signals in type order, 2 sources and 2 snippets each,
/// domains unique across the signals and disjoint from `banned`. A signal
/// backed by directional evidence must be rated low.
pub fn audit_signals(signals: &[MarketSignal], banned: &[String]) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    if signals.len() != SIGNAL_COUNT {
        findings.push(AuditFinding::WrongCount {
            field: "marketSignals".to_string(),
            expected: SIGNAL_COUNT,
            actual: signals.len(),
        });
    }

    for (index, (signal, expected)) in signals.iter().zip(SignalType::ALL).enumerate() {
        if signal.signal_type != expected {
            findings.push(AuditFinding::WrongSignalOrder {
                index,
                expected,
                actual: signal.signal_type,
            });
        }
    }

    let banned: HashSet<&str> = banned.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    for (index, signal) in signals.iter().enumerate() {
        let location = Location::Signal(index);

        if signal.sources.len() != SOURCES_PER_SIGNAL {
            findings.push(AuditFinding::WrongCount {
                field: format!("{}.sources", location),
                expected: SOURCES_PER_SIGNAL,
                actual: signal.sources.len(),
            });
        }
        if signal.evidence_snippets.len() != SOURCES_PER_SIGNAL {
            findings.push(AuditFinding::WrongCount {
                field: format!("{}.evidenceSnippets", location),
                expected: SOURCES_PER_SIGNAL,
                actual: signal.evidence_snippets.len(),
            });
        }

        for source in &signal.sources {
            check_domain(&source.url, &location, &mut seen, &banned, &mut findings);
        }
        if signal.strength != Strength::Low
            && count_type(&signal.sources, EvidenceType::Directional) > 0
        {
            findings.push(AuditFinding::DirectionalStrength {
                location: location.clone(),
                strength: signal.strength,
            });
        }
        for snippet in &signal.evidence_snippets {
            check_length(
                snippet,
                "evidence snippet",
                SIGNAL_SNIPPET_MAX_CHARS,
                &location,
                &mut findings,
            );
        }
    }

    findings
}

fn layer_findings(hypotheses: &[BehavioralHypothesis]) -> Vec<AuditFinding> {
    let mut findings = Vec::new();

    if hypotheses.len() != HYPOTHESIS_COUNT {
        findings.push(AuditFinding::WrongCount {
            field: "behavioralHypotheses".to_string(),
            expected: HYPOTHESIS_COUNT,
            actual: hypotheses.len(),
        });
    }

    for (index, (hypothesis, expected)) in hypotheses.iter().zip(Layer::ALL).enumerate() {
        if hypothesis.layer != expected {
            findings.push(AuditFinding::WrongLayerOrder {
                index,
                expected,
                actual: hypothesis.layer,
            });
        }
    }

    findings
}

fn count_type(sources: &[Source], evidence_type: EvidenceType) -> usize {
    sources
        .iter()
        .filter(|s| s.evidence_type == evidence_type)
        .count()
}

fn check_domain(
    url: &str,
    location: &Location,
    seen: &mut HashSet<String>,
    banned: &HashSet<&str>,
    findings: &mut Vec<AuditFinding>,
) {
    let Some(domain) = source_domain(url) else {
        findings.push(AuditFinding::UnparseableUrl {
            location: location.clone(),
            url: url.to_string(),
        });
        return;
    };

    if banned.contains(domain.as_str()) {
        findings.push(AuditFinding::BannedDomain {
            location: location.clone(),
            domain: domain.clone(),
        });
    }
    if !seen.insert(domain.clone()) {
        findings.push(AuditFinding::RepeatedDomain {
            location: location.clone(),
            domain,
        });
    }
}

fn check_length(
    text: &str,
    field: &'static str,
    max: usize,
    location: &Location,
    findings: &mut Vec<AuditFinding>,
) {
    let actual = text.chars().count();
    if actual > max {
        findings.push(AuditFinding::TooLong {
            location: location.clone(),
            field,
            max,
            actual,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Confidence;

    fn source(url: &str, evidence_type: EvidenceType) -> Source {
        Source {
            title: "t".to_string(),
            url: url.to_string(),
            evidence_type,
            snippet: "short".to_string(),
        }
    }

    fn hypothesis(layer: Layer, sources: Vec<Source>) -> BehavioralHypothesis {
        BehavioralHypothesis {
            layer,
            title: layer.as_str().to_string(),
            description: "d".to_string(),
            evidence_summary: String::new(),
            confidence: Confidence::Medium,
            supporting_sources: sources,
            contradicting_signals: vec![],
        }
    }

    fn enriched() -> Vec<BehavioralHypothesis> {
        Layer::ALL
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let sources = (0..5)
                    .map(|j| {
                        let kind = if j < 3 {
                            EvidenceType::Behavioral
                        } else {
                            EvidenceType::Quantitative
                        };
                        source(&format!("https://h{}s{}.example.com/x", i, j), kind)
                    })
                    .collect();
                hypothesis(*layer, sources)
            })
            .collect()
    }

    fn signal(signal_type: SignalType, urls: [&str; 2]) -> MarketSignal {
        MarketSignal {
            signal_type,
            title: "t".to_string(),
            summary: "s".to_string(),
            classification: "c".to_string(),
            evidence_snippets: vec!["a".to_string(), "b".to_string()],
            sources: urls
                .iter()
                .map(|u| source(u, EvidenceType::Directional))
                .collect(),
            strength: Strength::Low,
        }
    }

    #[test]
    fn test_clean_draft() {
        let draft: Vec<_> = Layer::ALL.iter().map(|l| hypothesis(*l, vec![])).collect();
        assert!(audit_draft(&draft).is_empty());
    }

    #[test]
    fn test_draft_out_of_order() {
        let mut draft: Vec<_> = Layer::ALL.iter().map(|l| hypothesis(*l, vec![])).collect();
        draft.swap(0, 1);

        let findings = audit_draft(&draft);

        assert_eq!(findings.len(), 2);
        assert!(matches!(
            findings[0],
            AuditFinding::WrongLayerOrder {
                index: 0,
                expected: Layer::Existence,
                actual: Layer::Awareness
            }
        ));
    }

    #[test]
    fn test_clean_hypotheses() {
        assert!(audit_hypotheses(&enriched()).is_empty());
    }

    #[test]
    fn test_repeated_domain_across_hypotheses() {
        let mut hypotheses = enriched();
        hypotheses[4].supporting_sources[0].url = "https://www.H0S0.example.com/other".to_string();

        let findings = audit_hypotheses(&hypotheses);

        assert_eq!(
            findings,
            vec![AuditFinding::RepeatedDomain {
                location: Location::Hypothesis(4),
                domain: "h0s0.example.com".to_string(),
            }]
        );
    }

    #[test]
    fn test_wrong_mix_and_long_snippet() {
        let mut hypotheses = enriched();
        hypotheses[2].supporting_sources[4].evidence_type = EvidenceType::Stated;
        hypotheses[2].supporting_sources[0].snippet = "x".repeat(181);

        let findings = audit_hypotheses(&hypotheses);

        assert!(findings.contains(&AuditFinding::WrongEvidenceMix {
            location: Location::Hypothesis(2),
            behavioral: 3,
            quantitative: 1,
        }));
        assert!(findings.iter().any(|f| matches!(
            f,
            AuditFinding::TooLong { max: 180, actual: 181, .. }
        )));
    }

    #[test]
    fn test_signals_banned_and_order() {
        let banned = vec!["reddit.com".to_string()];
        let mut signals: Vec<_> = SignalType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| {
                signal(
                    *t,
                    [
                        &format!("https://a{}.example.org", i),
                        &format!("https://b{}.example.org", i),
                    ],
                )
            })
            .collect();
        assert!(audit_signals(&signals, &banned).is_empty());

        signals[3].sources[1].url = "https://www.reddit.com/r/dogs".to_string();
        signals.swap(6, 7);

        let findings = audit_signals(&signals, &banned);

        assert!(findings.contains(&AuditFinding::BannedDomain {
            location: Location::Signal(3),
            domain: "reddit.com".to_string(),
        }));
        assert_eq!(
            findings
                .iter()
                .filter(|f| matches!(f, AuditFinding::WrongSignalOrder { .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_directional_signal_must_be_low() {
        let mut signals: Vec<_> = SignalType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| {
                signal(
                    *t,
                    [
                        &format!("https://a{}.example.org", i),
                        &format!("https://b{}.example.org", i),
                    ],
                )
            })
            .collect();
        signals[5].strength = Strength::Medium;
        signals[6].strength = Strength::High;
        signals[6].sources[0].evidence_type = EvidenceType::Behavioral;
        signals[6].sources[1].evidence_type = EvidenceType::Quantitative;

        let findings = audit_signals(&signals, &[]);

        assert_eq!(
            findings,
            vec![AuditFinding::DirectionalStrength {
                location: Location::Signal(5),
                strength: Strength::Medium,
            }]
        );
        assert_eq!(
            findings[0].to_string(),
            "marketSignals[5]: directional sources with strength medium, expected low"
        );
    }

    #[test]
    fn test_finding_display() {
        let finding = AuditFinding::WrongCount {
            field: "marketSignals".to_string(),
            expected: 8,
            actual: 7,
        };
        assert_eq!(finding.to_string(), "marketSignals: expected 8 entries, got 7");
    }
}
