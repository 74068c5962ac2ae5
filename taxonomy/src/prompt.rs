//! Prompt assembly for content-safety classification.
//!
//! Builds the system and user prompts sent to the classification oracle.
//! The tier list here is the only place the model learns the priority
//! vocabulary, so it must name exactly the four [`Priority`] values.

use crate::types::{ContentType, Priority};

/// Maximum characters of member content embedded in a prompt.
pub const MAX_CONTENT_CHARS: usize = 4_000;

/// Assembles prompts for the classification oracle.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Build the system prompt establishing the classifier's role and output format.
    pub fn build_system_prompt() -> String {
        let mut prompt = String::new();

        prompt.push_str("# CONTENT SAFETY CLASSIFIER\n\n");
        prompt.push_str(
            "You classify member-submitted content for a faith-based church community \
             (social feed, prayer requests, SOAP journal entries, comments).\n",
        );
        prompt.push_str(
            "Protect members, especially minors and vulnerable people, while leaving \
             ordinary fellowship, encouragement and honest struggle untouched.\n\n",
        );

        prompt.push_str("## PRIORITY TIERS\n\n");
        prompt.push_str("Assign exactly one of these tiers:\n\n");
        for priority in Priority::ALL {
            prompt.push_str(&format!(
                "- **{}**: {}\n",
                priority.as_str(),
                Self::tier_guidance(priority)
            ));
        }

        prompt.push_str("\n## CLASSIFICATION GUIDANCE\n\n");
        prompt.push_str("1. Judge the content itself, not the member's theology or opinions\n");
        prompt.push_str("2. Prayer requests describing pain or sin are not violations\n");
        prompt.push_str("3. Personal data (phone numbers, addresses, finances) is a privacy concern\n");
        prompt.push_str("4. Flirtatious or romantic advances toward members deserve review\n");
        prompt.push_str("5. When unsure between two tiers, choose the more severe one\n");

        prompt.push_str("\n## Required Response Format\n\n");
        prompt.push_str("Respond with a single JSON object and nothing else:\n\n");
        prompt.push_str("```json\n");
        prompt.push_str("{\n");
        prompt.push_str("  \"priority\": \"low|medium|high|critical\",\n");
        prompt.push_str("  \"category\": \"<short snake_case label, e.g. sexual_content, privacy_violation, community_interaction>\",\n");
        prompt.push_str("  \"confidence\": 0.0-1.0,\n");
        prompt.push_str("  \"action_required\": \"approve|hide|remove|edit_requested|review\",\n");
        prompt.push_str("  \"reason\": \"<one or two sentences>\"\n");
        prompt.push_str("}\n");
        prompt.push_str("```\n");

        prompt
    }

    /// Build the per-item user prompt.
    ///
    /// `context_hint` carries learned correction patterns and is placed
    /// before the content so the model reads it as guidance.
    pub fn build_classification_prompt(
        content: &str,
        content_type: &str,
        context_hint: Option<&str>,
    ) -> String {
        let mut prompt = String::new();

        prompt.push_str("# CLASSIFICATION REQUEST\n\n");
        prompt.push_str(&format!(
            "**Content type**: {}\n\n",
            ContentType::describe_raw(content_type)
        ));

        if let Some(hint) = context_hint.map(str::trim).filter(|h| !h.is_empty()) {
            prompt.push_str("## Lessons From Moderator Corrections\n\n");
            prompt.push_str(hint);
            prompt.push_str("\n\n");
        }

        prompt.push_str("## Content\n\n");
        prompt.push_str("<<<\n");
        prompt.push_str(&truncate_chars(content.trim(), MAX_CONTENT_CHARS));
        prompt.push_str("\n>>>\n");

        prompt
    }

    /// One-line description of a tier for prompts.
    pub fn tier_guidance(priority: Priority) -> &'static str {
        match priority {
            Priority::Low => {
                "ordinary fellowship, encouragement, scripture, prayer; approve"
            }
            Priority::Medium => {
                "mildly inappropriate, flirtatious, off-topic selling or heated tone; needs a moderator glance"
            }
            Priority::High => {
                "sexual content, harassment, hate, or sharing another member's private details; hide pending review"
            }
            Priority::Critical => {
                "threats, self-harm risk, exploitation, grooming, or trading personal information; remove immediately"
            }
        }
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_names_all_tiers() {
        let prompt = PromptAssembler::build_system_prompt();

        assert!(prompt.contains("CONTENT SAFETY CLASSIFIER"));
        assert!(prompt.contains("faith-based"));
        for priority in Priority::ALL {
            assert!(prompt.contains(&format!("**{}**", priority.as_str())));
        }
        assert!(prompt.contains("Required Response Format"));
    }

    #[test]
    fn test_classification_prompt_with_hint() {
        let prompt = PromptAssembler::build_classification_prompt(
            "Any personal info for sale?",
            "comment",
            Some("Note: greetings are usually low"),
        );

        assert!(prompt.contains("a comment replying"));
        assert!(prompt.contains("Lessons From Moderator Corrections"));
        assert!(prompt.contains("Note: greetings are usually low"));
        assert!(prompt.contains("Any personal info for sale?"));
    }

    #[test]
    fn test_classification_prompt_without_hint() {
        let prompt = PromptAssembler::build_classification_prompt("Praise God!", "discussion", Some("  "));
        assert!(!prompt.contains("Lessons From Moderator Corrections"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo…");
    }
}
