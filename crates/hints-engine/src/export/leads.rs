use chrono::SecondsFormat;
use hints_core::AnalysisRecord;

use super::{csv_line, BOM};
use crate::error::ExportError;

const CSV_HEADER: [&str; 14] = [
    "分析名称",
    "创建时间",
    "模型",
    "分析条数",
    "场景",
    "类型",
    "分类",
    "作者",
    "作者ID",
    "平台",
    "意向",
    "理由/来源",
    "来源帖子ID",
    "联系方式",
];

/// Flattened analysis export: one row per seller, buyer and contact entry.
///
/// Every row repeats the parent analysis columns. The `类型` column holds
/// `seller`, `buyer` or `contact`; `分类` holds the scenario's display label
/// for that row.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when there are no records.
pub fn analyses_to_csv(records: &[AnalysisRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut lines = vec![CSV_HEADER.join(",")];
    for record in records {
        let parent = [
            record.draft.name.clone(),
            record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            record.draft.model.clone(),
            record.draft.posts_count.to_string(),
            record.scenario().to_string(),
        ];
        let result = &record.draft.result;

        for seller in &result.potential_sellers {
            lines.push(csv_line(parent.iter().cloned().chain([
                "seller".to_string(),
                record.seller_label().to_string(),
                seller.author_name.clone(),
                seller.author_id.clone(),
                seller.platform.clone(),
                String::new(),
                seller.reason.clone(),
                seller.source_post_id.clone(),
                seller.contacts.join(" / "),
            ])));
        }

        for buyer in &result.potential_buyers {
            lines.push(csv_line(parent.iter().cloned().chain([
                "buyer".to_string(),
                record.buyer_label().to_string(),
                buyer.author_name.clone(),
                buyer.author_id.clone(),
                buyer.platform.clone(),
                buyer.intent_label().to_string(),
                buyer.reason.clone(),
                buyer.source_post_id.clone(),
                buyer.contacts.join(" / "),
            ])));
        }

        for contact in &result.contacts_summary {
            lines.push(csv_line(parent.iter().cloned().chain([
                "contact".to_string(),
                contact.contact_type.clone(),
                String::new(),
                contact.author_id.clone(),
                contact.platform.clone(),
                String::new(),
                contact.source.clone(),
                String::new(),
                contact.value.clone(),
            ])));
        }
    }

    Ok(format!("{BOM}{}", lines.join("\n")))
}

/// Pretty JSON array of the full analysis records.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for no records, or [`ExportError::Serialize`].
pub fn analyses_to_json(records: &[AnalysisRecord]) -> Result<String, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    serde_json::to_string_pretty(records).map_err(|source| ExportError::Serialize {
        context: "llm analyses".to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use hints_core::{
        AnalysisDraft, ContactSummary, LeadsResult, PotentialBuyer, PotentialSeller,
    };

    use super::super::test_support::parse_csv;
    use super::*;

    fn record() -> AnalysisRecord {
        AnalysisRecord {
            id: "llm-1714521600000-abc1234".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            draft: AnalysisDraft {
                name: "concert, resale".to_string(),
                model: "qwen-plus".to_string(),
                posts_count: 40,
                result: LeadsResult {
                    potential_sellers: vec![PotentialSeller {
                        author_id: "s1".to_string(),
                        author_name: "Seller".to_string(),
                        platform: "dy".to_string(),
                        reason: "posts ticket photos".to_string(),
                        source_post_id: "p1".to_string(),
                        contacts: vec!["wx: abc".to_string(), "qq: 1".to_string()],
                    }],
                    potential_buyers: vec![PotentialBuyer {
                        author_id: "b1".to_string(),
                        author_name: "Buyer".to_string(),
                        platform: "xhs".to_string(),
                        intent_level: "explicit_inquiry".to_string(),
                        reason: "asks for price".to_string(),
                        source_post_id: "p2".to_string(),
                        contacts: Vec::new(),
                    }],
                    contacts_summary: vec![ContactSummary {
                        author_id: "s1".to_string(),
                        platform: "dy".to_string(),
                        contact_type: "wechat".to_string(),
                        value: "abc".to_string(),
                        source: "comment".to_string(),
                    }],
                    analysis_summary: Some("two leads".to_string()),
                },
                scene: Some("resale".to_string()),
                scene_name: Some("二手转让".to_string()),
                seller_label: Some("转让方".to_string()),
                buyer_label: None,
            },
        }
    }

    #[test]
    fn csv_flattens_one_row_per_lead_and_contact() {
        let csv = analyses_to_csv(&[record()]).unwrap();
        let rows = parse_csv(csv.strip_prefix(BOM).unwrap());

        assert_eq!(rows.len(), 4, "header + seller + buyer + contact");
        assert!(rows.iter().all(|r| r.len() == CSV_HEADER.len()));

        let kinds: Vec<&str> = rows[1..].iter().map(|r| r[5].as_str()).collect();
        assert_eq!(kinds, vec!["seller", "buyer", "contact"]);

        assert_eq!(rows[1][0], "concert, resale");
        assert_eq!(rows[1][4], "二手转让");
        assert_eq!(rows[1][6], "转让方");
        assert_eq!(rows[1][13], "wx: abc / qq: 1");
        assert_eq!(rows[2][6], "潜在买家");
        assert_eq!(rows[2][10], "明确询价/求购");
        assert_eq!(rows[3][13], "abc");
    }

    #[test]
    fn json_keeps_full_records() {
        let json = analyses_to_json(&[record()]).unwrap();
        let back: Vec<AnalysisRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![record()]);
    }

    #[test]
    fn empty_records_are_rejected() {
        assert!(matches!(analyses_to_csv(&[]), Err(ExportError::Empty)));
        assert!(matches!(analyses_to_json(&[]), Err(ExportError::Empty)));
    }
}
