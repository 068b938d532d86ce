//! Project context: the topic plus product and competitor descriptors.
//!
//! This record is treated as opaque context by the orchestration core: it
//! is immutable for the duration of one project and injected verbatim into
//! every generation prompt that needs market context.

use serde::{Deserialize, Serialize};

/// A product or service being researched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub target_audience: String,
    pub benefit: String,
    pub benefit_reason: String,
    pub basic_facts: String,
}

/// A competing product or service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub description: String,
    pub price: Option<String>,
    pub features: Option<String>,
}

/// Market context for one research project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub topic: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

impl ProjectInfo {
    /// Builds a topic-only project with no product or competitor context.
    pub fn with_topic(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..Self::default()
        }
    }

    /// Renders the full market context block injected into prompts.
    pub fn market_context(&self) -> String {
        let mut out = format!("Research topic: {}\n", self.topic);

        for product in &self.products {
            out.push_str(&format!(
                "\nProduct: {}\n\
                 Target audience: {}\n\
                 Claimed benefit: {}\n\
                 Why the benefit is credible: {}\n\
                 Basic facts: {}\n",
                product.name,
                product.target_audience,
                product.benefit,
                product.benefit_reason,
                product.basic_facts
            ));
        }

        for competitor in &self.competitors {
            out.push_str(&format!(
                "\nCompetitor: {}\nDescription: {}\n",
                competitor.name, competitor.description
            ));
            if let Some(price) = &competitor.price {
                out.push_str(&format!("Price: {price}\n"));
            }
            if let Some(features) = &competitor.features {
                out.push_str(&format!("Features: {features}\n"));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_context_includes_products_and_competitors() {
        let project = ProjectInfo {
            topic: "coffee brewing".to_string(),
            products: vec![Product {
                name: "AeroDrip".to_string(),
                target_audience: "home baristas".to_string(),
                benefit: "cafe-grade pour-over without the skill curve".to_string(),
                benefit_reason: "flow restrictor keeps extraction even".to_string(),
                basic_facts: "$49, dishwasher safe".to_string(),
            }],
            competitors: vec![Competitor {
                name: "ChemPress".to_string(),
                description: "classic immersion brewer".to_string(),
                price: Some("$39".to_string()),
                features: None,
            }],
        };

        let context = project.market_context();
        assert!(context.contains("Research topic: coffee brewing"));
        assert!(context.contains("Product: AeroDrip"));
        assert!(context.contains("Competitor: ChemPress"));
        assert!(context.contains("Price: $39"));
        assert!(!context.contains("Features:"));
    }
}
