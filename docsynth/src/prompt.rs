//! Prompt templates.

use crate::error::Error;
use rand::Rng;
use rand::seq::SliceRandom;

/// The default prompt, asking for a one page Russian business document.
pub const DEFAULT_TEMPLATE: &str = "Напиши официальное письмо или служебный документ \
(ок. 1 стр. A4) на тему:\n— {topic}\nСтиль: деловой, канцелярский. \
Добавь реальные даты, числа, ФИО, адреса.";

/// The default document topics.
pub const DEFAULT_TOPICS: [&str; 5] = [
    "акт сверки",
    "служебная записка",
    "договор аренды",
    "счёт-фактура",
    "заявление на отпуск",
];

const PLACEHOLDER: &str = "{topic}";

/// A prompt with a `{topic}` placeholder and the topics to fill it with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    topics: Vec<String>,
}

impl PromptTemplate {
    /// Create a template. It must contain the placeholder and at least one
    /// topic must be given.
    pub fn new(template: impl Into<String>, topics: Vec<String>) -> Result<Self, Error> {
        let template = template.into();
        if !template.contains(PLACEHOLDER) {
            return Err(Error::InvalidParameter(format!(
                "prompt template has no {PLACEHOLDER} placeholder"
            )));
        }
        if topics.is_empty() || topics.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::InvalidParameter(
                "prompt topics must be non-empty".to_string(),
            ));
        }

        Ok(Self { template, topics })
    }

    /// The topics of the template.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Fill the placeholder with `topic`.
    pub fn render(&self, topic: &str) -> String {
        self.template.replace(PLACEHOLDER, topic)
    }

    /// Choose a topic uniformly and return it along with the prompt.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (&str, String) {
        let topic = self
            .topics
            .choose(rng)
            .map(String::as_str)
            .unwrap_or_default();
        (topic, self.render(topic))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            topics: DEFAULT_TOPICS.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fills_the_placeholder() {
        let prompt = PromptTemplate::new("Write a {topic}.", vec!["memo".to_string()]).unwrap();
        assert_eq!(prompt.render("lease"), "Write a lease.");
    }

    #[test]
    fn default_prompt_names_the_topic() {
        let prompt = PromptTemplate::default();
        let mut rng = StdRng::seed_from_u64(1);
        let (topic, text) = prompt.sample(&mut rng);
        assert!(DEFAULT_TOPICS.contains(&topic));
        assert!(text.contains(topic));
        assert!(!text.contains(PLACEHOLDER));
    }

    #[test]
    fn samples_every_topic() {
        let prompt = PromptTemplate::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(prompt.sample(&mut rng).0.to_string());
        }
        assert_eq!(seen.len(), DEFAULT_TOPICS.len());
    }

    #[test]
    fn rejects_bad_templates() {
        assert!(PromptTemplate::new("no placeholder", vec!["a".to_string()]).is_err());
        assert!(PromptTemplate::new("{topic}", Vec::new()).is_err());
        assert!(PromptTemplate::new("{topic}", vec![" ".to_string()]).is_err());
    }
}
