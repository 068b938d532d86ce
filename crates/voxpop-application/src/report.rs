//! Prompt templates for the synthesis reports.
//!
//! A template fixes the analyst role, the task framing, and the ordered
//! report sections; callers supply the labeled context blocks (market
//! context, interview summaries, hypothesis text) at render time.

/// A reusable synthesis prompt: role, task, and a fixed section outline.
#[derive(Debug, Clone, Copy)]
pub struct ReportTemplate {
    pub role: &'static str,
    pub task: &'static str,
    pub sections: &'static [&'static str],
}

impl ReportTemplate {
    /// Renders the full prompt: role and task, then each labeled context
    /// block, then the numbered section outline the report must follow.
    pub fn render(&self, blocks: &[(String, String)]) -> String {
        let mut out = format!("You are {}. {}\n", self.role, self.task);

        for (label, content) in blocks {
            out.push_str(&format!("\n--- {label} ---\n{content}\n"));
        }

        out.push_str("\nStructure the report with exactly these sections:\n");
        for (i, section) in self.sections.iter().enumerate() {
            out.push_str(&format!("{}. **{}**\n", i + 1, section));
        }
        out
    }
}

/// First-round analysis over the initial interview summaries.
pub const INITIAL_ANALYSIS: ReportTemplate = ReportTemplate {
    role: "a seasoned marketing analyst",
    task: "Analyze the interview summaries below against the market context \
           and produce a structured research report. Ground every claim in \
           what the respondents actually said.",
    sections: &[
        "Benefit resonance: which claimed benefits landed, and with whom",
        "Purchase intent: who would buy, at what strength, and why",
        "Rejection reasons: explicit and implied reasons not to buy",
        "Latent insights: needs the respondents revealed without stating",
        "Customer insight: the single deepest truth about these customers",
        "Competitive comparison: how the product fares against alternatives",
        "Target validation: whether the assumed audience is the real one",
        "Price sensitivity: reactions to price and willingness to pay",
        "Positioning map: where the product sits in the respondents' minds",
        "Strategic implications: what marketing should do next",
    ],
};

/// Final synthesis over both interview rounds and the tested hypothesis.
pub const FINAL_ANALYSIS: ReportTemplate = ReportTemplate {
    role: "a chief marketing officer's strategy advisor",
    task: "The hypothesis below was tested in a second interview round with \
           the same respondents. Synthesize everything into a final report \
           that states what was verified, what was refuted, and what the \
           business should do about it.",
    sections: &[
        "Final insights: the confirmed truths across both interview rounds",
        "Hypothesis validation: which hypotheses held, which collapsed, and the evidence",
        "Revised customer understanding: how the second round changed the picture",
        "Recommended strategy: positioning, messaging, and channel moves",
        "Pricing guidance: what the willingness-to-pay signals support",
        "Business impact: expected effect and the risks that remain",
        "Open questions: what still needs validation and how to get it",
    ],
};
