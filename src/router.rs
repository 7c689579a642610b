//! Keyword router for the voice-assistant host.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::navigator::SectionNavigator;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub phrases: Vec<String>,
    pub section: String,
}

impl RouteRule {
    pub fn new(phrases: &[&str], section: &str) -> Self {
        Self {
            phrases: phrases.iter().map(|phrase| phrase.to_lowercase()).collect(),
            section: section.to_string(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.to_lowercase().as_str()))
    }
}

pub fn default_rules() -> Vec<RouteRule> {
    vec![
        RouteRule::new(&["draft email", "email draft"], "email"),
        RouteRule::new(&["resume format", "format resume"], "resume"),
        RouteRule::new(&["boolean", "skill extract"], "boolean"),
        RouteRule::new(&["notes", "quick notes"], "notes"),
        RouteRule::new(&["resume match", "match resume"], "matcher"),
        RouteRule::new(&["dashboard", "home"], "dashboard"),
    ]
}

/// Ordered phrase rules; the first rule with a contained phrase wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRouter {
    rules: Vec<RouteRule>,
}

impl KeywordRouter {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    pub fn route(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| rule.section.as_str())
    }

    /// Scrolls to the routed section. Returns it only when the view had it.
    pub fn dispatch(&self, text: &str, navigator: &mut dyn SectionNavigator) -> Option<String> {
        let section = self.route(text)?;
        if navigator.scroll_into_view(section) {
            debug!(section, "voice command routed");
            Some(section.to_string())
        } else {
            debug!(section, "routed section not present in view");
            None
        }
    }
}

impl Default for KeywordRouter {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct RecordingNavigator {
        present: Vec<&'static str>,
        scrolled: Vec<String>,
    }

    impl SectionNavigator for RecordingNavigator {
        fn scroll_into_view(&mut self, section: &str) -> bool {
            if self.present.iter().any(|present| *present == section) {
                self.scrolled.push(section.to_string());
                true
            } else {
                false
            }
        }
    }

    #[test]
    fn substring_match_routes_email_drafter() {
        let router = KeywordRouter::default();
        let mut navigator = RecordingNavigator {
            present: vec!["email"],
            ..Default::default()
        };
        let routed = router.dispatch("Please open Email Drafter now", &mut navigator);
        assert_eq!(routed.as_deref(), Some("email"));
        assert_eq!(navigator.scrolled, vec!["email".to_string()]);
    }

    #[test]
    fn unmatched_text_is_a_no_op() {
        let router = KeywordRouter::default();
        let mut navigator = RecordingNavigator {
            present: vec!["email", "dashboard"],
            ..Default::default()
        };
        assert_eq!(router.dispatch("open something else", &mut navigator), None);
        assert!(navigator.scrolled.is_empty());
    }

    #[test]
    fn missing_section_is_a_no_op() {
        let router = KeywordRouter::default();
        let mut navigator = RecordingNavigator::default();
        assert_eq!(router.dispatch("go to dashboard", &mut navigator), None);
        assert!(navigator.scrolled.is_empty());
    }

    #[test]
    fn first_matching_rule_wins() {
        let router = KeywordRouter::default();
        // "format resume" precedes "notes" in rule order.
        assert_eq!(router.route("format resume then notes"), Some("resume"));
        // Substring matching, not whole words.
        assert_eq!(router.route("go homeward"), Some("dashboard"));
    }

    #[test]
    fn custom_rules_match_case_insensitively() {
        let router = KeywordRouter::new(vec![RouteRule {
            phrases: vec!["Candidate List".to_string()],
            section: "candidates".to_string(),
        }]);
        assert_eq!(router.route("show the candidate list"), Some("candidates"));
    }
}
