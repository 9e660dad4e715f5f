//! Prompt for the aggregation call

use vantage_domain::ProductContext;

/// Exact document shape the service must return
pub const INSIGHT_SCHEMA: &str = r#"{
  "executive_summary": "High-level overview of competitor perception, competitor activity and market dynamics.",
  "competitor_insights": [
    {
      "competitor": "Name of competitor",
      "strengths": ["Key strengths users mention"],
      "weaknesses": ["Weaknesses or complaints users mention"]
    }
  ],
  "recommendations_for_product_manager": [
    "Product development or strategic recommendations based on competitor gaps, opportunities or user feedback."
  ],
  "recommendations_for_marketing_team": {
    "campaign_themes": ["Themes or narratives marketing can use"],
    "keywords": ["High-frequency words, hashtags or phrases worth leveraging"],
    "pain_points": ["Frustrations or unmet needs messaging can address"],
    "market_gaps": ["Where the competitor is weak or user needs are not met"]
  },
  "regulatory_notes": {
    "FDA": "Relevant FDA approvals or recalls to monitor",
    "recalls": "Notable competitor recall issues",
    "approvals": "New approvals to track",
    "regulations": "General compliance reminders"
  }
}"#;

/// Build the aggregation prompt over the combined analysis text
pub fn build_insight_prompt(product: &ProductContext, combined: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "You are an analyst helping a product team understand user and market insights. \
         Our product is {}. The competitor product is {}.\n\n",
        product.name, product.competitor
    ));
    prompt.push_str(
        "Based on the per-record analyses below (reviews, forum posts, news, regulatory \
         notices, summaries), produce structured insights as JSON with exactly these fields:\n\n",
    );
    prompt.push_str(INSIGHT_SCHEMA);
    prompt.push_str("\n\nEnsure the JSON is valid and complete. Be concise but actionable.\n");
    prompt.push_str("Return JSON only.\n\nCombined enriched data:\n");
    prompt.push_str(combined);
    prompt.push('\n');

    prompt
}
