//! Prompt for per-record analysis

use vantage_domain::{ProductContext, RawRecord};

/// Analysis dimensions requested for every record, in output order
pub const TAXONOMY: [(&str, &str); 8] = [
    ("sentiment", "positive, negative or neutral"),
    ("common_pains", "problems or frustrations users describe"),
    ("common_praises", "what users like"),
    ("feature_gaps", "capabilities users want but do not get"),
    ("competitor_mentions", "competing products named and how they are described"),
    ("opportunities", "openings for our product"),
    ("recommendations", "concrete actions for the product manager"),
    ("regulatory_notes", "FDA actions, recalls, approvals or regulations mentioned"),
];

/// Builds the analysis prompt for one record
///
/// Output depends only on the record and the product context, so identical
/// input always produces an identical prompt.
pub struct EnrichmentPrompt<'a> {
    record: &'a RawRecord,
    product: &'a ProductContext,
}

impl<'a> EnrichmentPrompt<'a> {
    /// Prompt for `record`, framed around `product`
    pub fn new(record: &'a RawRecord, product: &'a ProductContext) -> Self {
        Self { record, product }
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "You are a product analyst. Analyze the following {} and extract actionable insights \
             for the product manager of {}, measured against the competitor {}.\n\n",
            self.record.source.prompt_label(),
            self.product.name,
            self.product.competitor
        ));

        prompt.push_str("Return a JSON object with these keys:\n");
        for (key, meaning) in TAXONOMY {
            prompt.push_str(&format!("- {}: {}\n", key, meaning));
        }

        prompt.push_str("\nRaw data:\n---\n");
        prompt.push_str(&self.record.render());
        prompt.push_str("\n---\n\nJSON output only.\n");

        prompt
    }
}
