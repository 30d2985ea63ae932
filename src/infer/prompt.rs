//! Classification prompts for the C3PA labels.
//!
//! The system prompt lists every taxonomy label with its statutory
//! description; the user prompt carries one span and the two sentences of
//! policy text preceding it.

use c3pa_core::LabelTaxonomy;

/// Statutory descriptions, keyed by label name.
pub const LABEL_DESCRIPTIONS: [(&str, &str); 12] = [
    (
        "Updated Privacy Policy",
        "Annotate any statement indicating when the policy was last updated or its effective date.",
    ),
    (
        "Categories of Personal Information Sold",
        "Cal. Civ. Code § 1798.115(c)(1): “The category or categories of consumers’ personal information it has sold … or if the business has not sold consumers’ personal information, it shall disclose that fact.”\
         ONLY the **types** of PI the business has **sold** in the last 12 months (e.g., Marketing Data; Demographics), or an explicit “We do not sell” statement.",
    ),
    (
        "Categories of Personal Information Shared / Disclosed",
        "Cal. Civ. Code § 1798.115(c)(2): “The category or categories of consumers’ personal information it has disclosed for a business purpose … or if the business has not disclosed consumers’ personal information for a business purpose, it shall disclose that fact.”  \n\
         ONLY the **types** of PI **shared** or **disclosed** for a **business purpose** (e.g., Service Providers, Analytics Partners), or an explicit “We do not share” statement.",
    ),
    (
        "Categories of Personal Information Collected",
        "Cal. Civ. Code § 1798.130(a)(5)(B)(i): “A list of the categories of personal information it has collected about consumers in the preceding 12 months by reference to the enumerated category or categories in subdivision (c).”  \n\
         ONLY the **types** of PI collected (e.g., Identifiers; Commercial Information; Internet Activity), **not** how it’s used or shared.",
    ),
    (
        "Description of Right to Delete",
        "Cal. Civ. Code § 1798.105(a): “A consumer shall have the right to request that a business delete any personal information about the consumer which the business has collected from the consumer.”  \
         Annotate any statement granting or describing this right to delete personal information.",
    ),
    (
        "Description of Right to Correct Information",
        "Cal. Civ. Code § 1798.106(a) (amended Jan 1, 2025): “A consumer shall have the right to request a business that maintains inaccurate personal information about the consumer to correct that inaccurate personal information, taking into account the nature of the personal information and the purposes of the processing of the personal information.”  \
         Annotate any statement granting or describing this right to correct inaccurate information.",
    ),
    (
        "Description of Right to Know PI Collected",
        "Cal. Civ. Code § 1798.110(a)(1)–(5): “A consumer shall have the right to request that a business that collects personal information about the consumer disclose to the consumer the following: \
         (1) The categories of personal information that the business collected; \
         (2) The categories of sources from which the personal information is collected; \
         (3) The business or commercial purpose for collecting, selling, or sharing personal information; \
         (4) The categories of third parties to whom the business discloses personal information; \
         (5) The specific pieces of personal information collected about the consumer.”  \
         Annotate any statement describing the consumer’s right to access or know what data has been collected.",
    ),
    (
        "Description of Right to Know PI sold / shared",
        "Cal. Civ. Code § 1798.115(a)(2)–(3): “A consumer shall have the right to request that a business that sells or shares the consumer’s personal information, or that discloses it for a business purpose, disclose to that consumer: \
         (2) The categories of personal information that the business sold or shared about the consumer and the categories of third parties to whom it was sold or shared; \
         (3) The categories of personal information that the business disclosed about the consumer for a business purpose and the categories of persons to whom it was disclosed.”  \
         Annotate any statement describing the consumer’s right to know what data has been sold or shared.",
    ),
    (
        "Description of Right to Opt-out of sale of PI",
        "Cal. Civ. Code § 1798.120(a): “A consumer shall have the right, at any time, to direct a business that sells or shares personal information about the consumer to third parties not to sell or share the consumer’s personal information. This right may be referred to as the right to opt-out of sale or sharing.”  \
         Annotate any instruction or statement granting this opt-out right.",
    ),
    (
        "Description of Right to Limit use of PI",
        "CPRA § 1798.121(a): “A consumer shall have the right, at any time, to direct a business that collects sensitive personal information about the consumer to limit its use of the consumer’s sensitive personal information to that use which is necessary to perform the services or provide the goods reasonably expected by an average consumer … and as authorized by regulations adopted pursuant to subparagraph (C) of paragraph (19) of subdivision (a) of Section 1798.185.”  \
         Annotate any statement describing the limitation on use of sensitive personal information.",
    ),
    (
        "Description of Right to Non-discrimination on exercising rights",
        "Cal. Civ. Code § 1798.125(a)(1): “A business shall not discriminate against a consumer because the consumer exercised any of the consumer’s rights under this title, including, but not limited to, by: \
         (A) Denying goods or services to the consumer; \
         (B) Charging different prices or rates for goods or services, including through the use of discounts or other benefits or imposing penalties; \
         (C) Providing a different level or quality of goods or services to the consumer; \
         (D) Suggesting that the consumer will receive a different price or rate or level or quality of goods or services; \
         (E) Retaliating against an employee, applicant, or independent contractor for exercising their rights.”  \
         Annotate any assurance that exercising rights will not result in discrimination or retaliation.",
    ),
    (
        "Methods to exercise rights",
        "Cal. Civ. Code § 1798.130(a)(1)(A)–(B): “Make available to consumers two or more designated methods for submitting requests for information required to be disclosed (Secs. 1798.110, 1798.115) or for requests for deletion or correction (Secs. 1798.105, 1798.106), including, at a minimum, a toll-free telephone number. If the business maintains an internet website, make that website available to consumers to submit such requests.”  \
         Annotate any description of how to submit CCPA/CPRA requests (e.g., toll-free number, web form, email address).",
    ),
];

const SYSTEM_PREAMBLE: &str = "\
You are a expert legal‐tech annotation assistant for CCPA/CPRA compliance.
Your job is to **assign exactly one** of the following labels to each input span.
You may use chain-of-thought internally: identify the relevant statute,
match it against the span, self-critique your choice, but **do NOT** output your reasoning. **Only** output the final label name.

Process (do NOT output these steps):
  1. Read the span and recall the full statutory text for each label.
  2. Determine which single mandate (§1798.105–§1798.130) the span fulfills.
  3. Mentally verify that the span’s language matches the statutory requirement.

**Output format (exactly one line):**
<Label Name>

**Labels and their legal definitions:**";

/// Statutory description of `label`, if it is one of the C3PA labels.
pub fn description(label: &str) -> Option<&'static str> {
    LABEL_DESCRIPTIONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, text)| *text)
}

/// Instruction prompt listing every label of `taxonomy`, in order.
///
/// Labels without a known description are listed by name alone.
pub fn system_prompt(taxonomy: &LabelTaxonomy) -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);
    for label in taxonomy.iter() {
        match description(label) {
            Some(text) => prompt.push_str(&format!("\n- **{}**: {}", label, text)),
            None => prompt.push_str(&format!("\n- **{}**", label)),
        }
    }
    prompt
}

/// Per-span prompt with the preceding context.
pub fn user_prompt(span: &str, context: &str) -> String {
    format!(
        "Here is a candidate text span from a privacy policy, with two sentences of context before:\n\
         \n\
         Context (2 sentences before):\n\
         \"\"\"{context}\"\"\"\n\
         \n\
         Target span:\n\
         \"\"\"{span}\"\"\"\n\
         \n\
         Respond with exactly the full label name on a single line.",
        context = context,
        span = span
    )
}

/// Map raw model output onto a taxonomy label where possible.
///
/// Surrounding whitespace, quotes and markdown emphasis are stripped. An
/// exact case-insensitive match returns the canonical label; anything else
/// is returned trimmed, so free-form answers still count as wrong
/// predictions instead of disappearing.
pub fn normalize_label(raw: &str, taxonomy: &LabelTaxonomy) -> String {
    let cleaned = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*' || c == '`' || c.is_whitespace());
    taxonomy
        .iter()
        .find(|label| label.eq_ignore_ascii_case(cleaned))
        .unwrap_or(cleaned)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3pa_core::C3PA_LABELS;

    #[test]
    fn test_every_label_has_description() {
        for label in C3PA_LABELS {
            assert!(description(label).is_some(), "no description for {}", label);
        }
    }

    #[test]
    fn test_system_prompt_lists_labels_in_order() {
        let prompt = system_prompt(&LabelTaxonomy::c3pa());
        let positions: Vec<usize> = C3PA_LABELS
            .iter()
            .map(|label| prompt.find(&format!("- **{}**: ", label)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.starts_with("You are a expert legal‐tech annotation assistant"));
    }

    #[test]
    fn test_system_prompt_unknown_label() {
        let prompt = system_prompt(&LabelTaxonomy::new(["Custom"]).unwrap());
        assert!(prompt.ends_with("\n- **Custom**"));
    }

    #[test]
    fn test_user_prompt() {
        let prompt = user_prompt("We sell data.", "Intro. More intro.");
        assert!(prompt.contains("Context (2 sentences before):\n\"\"\"Intro. More intro.\"\"\"\n"));
        assert!(prompt.contains("Target span:\n\"\"\"We sell data.\"\"\"\n"));
        assert!(prompt.ends_with("single line."));
    }

    #[test]
    fn test_normalize_label() {
        let taxonomy = LabelTaxonomy::c3pa();
        assert_eq!(
            normalize_label("  **methods to exercise rights**\n", &taxonomy),
            "Methods to exercise rights"
        );
        assert_eq!(
            normalize_label("\"Updated Privacy Policy\"", &taxonomy),
            "Updated Privacy Policy"
        );
        assert_eq!(normalize_label(" Something else ", &taxonomy), "Something else");
    }
}
