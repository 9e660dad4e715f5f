//! The Insight Document - the single current synthesized report
//!
//! Unlike records, the document has snapshot lifecycle: each run replaces the
//! previous one. Only `executive_summary` is mandatory, so that the fallback
//! produced from an unparsable response (`{"executive_summary": <text>}`) is
//! itself a valid document and serializes to exactly that shape.

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregated insight over every enriched record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDocument {
    /// High-level overview of competitor perception and market dynamics
    pub executive_summary: String,

    /// Per-competitor strengths and weaknesses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_insights: Option<Vec<CompetitorInsight>>,

    /// Product development recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations_for_product_manager: Option<Vec<String>>,

    /// Messaging recommendations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations_for_marketing_team: Option<MarketingRecommendations>,

    /// Regulatory watch items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_notes: Option<RegulatoryNotes>,
}

/// Strengths and weaknesses of one competitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorInsight {
    /// Competitor or competing product name
    #[serde(default, deserialize_with = "null_as_default")]
    pub competitor: String,

    /// What users praise
    #[serde(default, deserialize_with = "null_as_default")]
    pub strengths: Vec<String>,

    /// What users complain about
    #[serde(default, deserialize_with = "null_as_default")]
    pub weaknesses: Vec<String>,
}

/// Recommendations for the marketing team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketingRecommendations {
    /// Campaign narratives
    #[serde(default, deserialize_with = "null_as_default")]
    pub campaign_themes: Vec<String>,

    /// High-frequency words and phrases worth leveraging
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,

    /// User frustrations messaging can address
    #[serde(default, deserialize_with = "null_as_default")]
    pub pain_points: Vec<String>,

    /// Needs competitors leave unmet
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_gaps: Vec<String>,
}

/// Regulatory notes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryNotes {
    /// FDA approvals or recalls to monitor
    #[serde(rename = "FDA", default, deserialize_with = "null_as_default")]
    pub fda: String,

    /// Notable recall issues
    #[serde(default, deserialize_with = "null_as_default")]
    pub recalls: String,

    /// New approvals to track
    #[serde(default, deserialize_with = "null_as_default")]
    pub approvals: String,

    /// Compliance reminders
    #[serde(default, deserialize_with = "null_as_default")]
    pub regulations: String,
}

/// Read an explicit `null` as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl InsightDocument {
    /// Document carrying only an executive summary
    ///
    /// This is the fallback shape used when inference output cannot be parsed.
    ///
    /// # Examples
    ///
    /// ```
    /// use vantage_domain::InsightDocument;
    ///
    /// let doc = InsightDocument::summary_only("not a json document");
    /// assert_eq!(
    ///     doc.to_json().unwrap(),
    ///     r#"{"executive_summary":"not a json document"}"#
    /// );
    /// ```
    pub fn summary_only(text: impl Into<String>) -> Self {
        Self {
            executive_summary: text.into(),
            competitor_insights: None,
            recommendations_for_product_manager: None,
            recommendations_for_marketing_team: None,
            regulatory_notes: None,
        }
    }

    /// Whether every section besides the summary is absent
    pub fn is_summary_only(&self) -> bool {
        self.competitor_insights.is_none()
            && self.recommendations_for_product_manager.is_none()
            && self.recommendations_for_marketing_team.is_none()
            && self.regulatory_notes.is_none()
    }

    /// Compact JSON encoding, as stored in the insight table
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a stored document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
