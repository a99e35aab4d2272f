/// Negative keywords cause a hard rejection regardless of any positive match
/// (spec §4.3: "hard reject, score -> 0").
const NEGATIVE_KEYWORDS: &[&str] = &[
    "voting precinct",
    "tree canopy",
    "zoning overlay",
    "parcel",
    "polling",
    "school district",
    "fire district",
    "police district",
    "congressional district",
];

/// At least one required positive must match for a candidate to clear the
/// score-30 floor.
const REQUIRED_POSITIVES: &[&str] = &["city council", "council district", "ward", "alderman", "supervisor district"];

const WEAK_POSITIVES: &[(&str, u32)] = &[("council", 15), ("district", 10), ("electoral", 10), ("representative", 8)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticVerdict {
    Rejected,
    AcceptedWithWarning,
    AcceptedClean,
}

#[derive(Debug, Clone)]
pub struct SemanticScore {
    pub score: u32,
    pub verdict: SemanticVerdict,
    pub matched_negative: Option<&'static str>,
}

/// Score a candidate layer's title (and optional description) against the
/// keyword lists (spec §4.3). Matching is case-insensitive substring search;
/// the text most portals hand back is free-form enough that anything
/// stricter misses real layers.
pub fn score_layer(title: &str, description: Option<&str>) -> SemanticScore {
    let haystack = match description {
        Some(d) => format!("{title} {d}").to_ascii_lowercase(),
        None => title.to_ascii_lowercase(),
    };

    if let Some(negative) = NEGATIVE_KEYWORDS.iter().find(|kw| haystack.contains(*kw)) {
        return SemanticScore { score: 0, verdict: SemanticVerdict::Rejected, matched_negative: Some(negative) };
    }

    let has_required = REQUIRED_POSITIVES.iter().any(|kw| haystack.contains(kw));
    let mut score: u32 = if has_required { 30 } else { 0 };
    for (kw, weight) in WEAK_POSITIVES {
        if haystack.contains(kw) {
            score += weight;
        }
    }

    let verdict = if score < 30 {
        SemanticVerdict::Rejected
    } else if score < 50 {
        SemanticVerdict::AcceptedWithWarning
    } else {
        SemanticVerdict::AcceptedClean
    };

    SemanticScore { score, verdict, matched_negative: None }
}
