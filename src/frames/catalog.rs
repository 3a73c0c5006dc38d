//! Built-in PIK v5 frame templates.

use serde::{Deserialize, Serialize};

/// A named form whose fields are auto-filled from document blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTemplate {
    /// Stable identifier, e.g. `platform-business-model`
    pub slug: String,
    /// Display name
    pub name: String,
    /// Field names in display order
    pub fields: Vec<String>,
}

impl FrameTemplate {
    /// Create a frame template.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Slugs auto-assigned when no explicit frame list is requested.
pub const DEFAULT_TARGET_SLUGS: &[&str] = &["platform-experience", "platform-business-model"];

/// All built-in frames.
pub fn builtin_frames() -> Vec<FrameTemplate> {
    vec![
        FrameTemplate::new(
            "platform-experience",
            "Platform Experience",
            &[
                "Stakeholder",
                "Services",
                "Key Expectations",
                "Motivation",
                "Key Resources",
                "Alternatives",
                "Satisfaction Drivers Success Factors",
                "Attract",
                "Touchpoints",
                "CRM",
                "Key Insights",
                "Basic",
                "Delight",
            ],
        ),
        FrameTemplate::new(
            "ecosystem-forces-scan",
            "Ecosystem Forces Scan",
            &["Environment", "Market", "Macroeconomic", "Value Chain", "Emerging Needs"],
        ),
        FrameTemplate::new(
            "platform-business-model",
            "Platform Business Model",
            &[
                "Mission",
                "Core Services",
                "Core Value Proposition",
                "Core Network Effects",
                "Consumers",
                "Producers",
                "Value Capture",
                "Cost Structure",
                "Key People Skills",
                "Key Data",
                "Key Infrastructure",
                "Supporters",
                "Investors",
                "Suppliers",
                "USP",
                "TAM",
                "SAM",
                "SOM",
            ],
        ),
        FrameTemplate::new(
            "nfx-reinforcement-engines",
            "NFX Reinforcement Engines",
            &[
                "Demand Side",
                "Supply Side",
                "Core Value",
                "Brand Loyalty",
                "Tech Infrastructure",
                "Economy of Scale",
                "Experience Personal Social",
                "Ecosystem Sustainability",
                "Data Intelligence",
            ],
        ),
        FrameTemplate::new(
            "platform-value-network",
            "Platform Value Network",
            &["Consumers", "Producers", "Partners", "Owners", "Value Propositions", "Transactions"],
        ),
    ]
}

/// Look up a built-in frame by slug.
pub fn find_frame(slug: &str) -> Option<FrameTemplate> {
    builtin_frames().into_iter().find(|f| f.slug == slug)
}

/// Built-in frames selected by [`DEFAULT_TARGET_SLUGS`], in catalog order.
pub fn target_frames() -> Vec<FrameTemplate> {
    builtin_frames()
        .into_iter()
        .filter(|f| DEFAULT_TARGET_SLUGS.contains(&f.slug.as_str()))
        .collect()
}
