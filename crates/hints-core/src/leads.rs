//! Structured result of the LLM "potential buyers / sellers" analysis.

use serde::{Deserialize, Serialize};

/// One contact detail the model extracted for an author.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactSummary {
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub platform: String,
    /// e.g. `"wechat"`, `"phone"`, `"email"`.
    #[serde(default)]
    pub contact_type: String,
    #[serde(default)]
    pub value: String,
    /// Where the contact was found (post body, comment, profile).
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PotentialSeller {
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub source_post_id: String,
    #[serde(default)]
    pub contacts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PotentialBuyer {
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub platform: String,
    /// `explicit_inquiry`, `interested`, `sharing_only` or `unknown`.
    #[serde(default)]
    pub intent_level: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub source_post_id: String,
    #[serde(default)]
    pub contacts: Vec<String>,
}

impl PotentialBuyer {
    #[must_use]
    pub fn intent_label(&self) -> &str {
        match self.intent_level.as_str() {
            "explicit_inquiry" => "明确询价/求购",
            "interested" => "感兴趣/羡慕",
            "sharing_only" => "仅分享/炫耀",
            "unknown" | "" => "无法判断",
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LeadsResult {
    #[serde(default)]
    pub potential_sellers: Vec<PotentialSeller>,
    #[serde(default)]
    pub potential_buyers: Vec<PotentialBuyer>,
    #[serde(default)]
    pub contacts_summary: Vec<ContactSummary>,
    #[serde(default)]
    pub analysis_summary: Option<String>,
}

impl LeadsResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.potential_sellers.is_empty()
            && self.potential_buyers.is_empty()
            && self.contacts_summary.is_empty()
    }
}

/// Analysis scenario offered by the backend; labels name the supply and demand sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmScenario {
    pub id: String,
    pub name: String,
    pub seller_label: String,
    pub buyer_label: String,
}
