//! Prompt context assembly.

use brain_core::{BrainRequest, SessionTurn};

use crate::profile::LeadProfile;

/// Heading placed before the lead summary.
const LEAD_CONTEXT_HEADER: &str = "CONTEXTO DO LEAD:";

/// Everything known about a lead for one model call.
///
/// Combines the durable profile summary, the recent session turns and the
/// new message into a single [`BrainRequest`].
#[derive(Debug, Clone, Default)]
pub struct PromptContext {
    lead_summary: String,
    history: Vec<SessionTurn>,
    input: String,
}

impl PromptContext {
    /// Build the context for `input` from a profile and its session turns.
    pub fn new(profile: &LeadProfile, history: Vec<SessionTurn>, input: impl Into<String>) -> Self {
        Self {
            lead_summary: profile.summary(),
            history,
            input: input.into(),
        }
    }

    /// The lead block injected as a system message.
    pub fn lead_block(&self) -> String {
        format!("{}\n{}", LEAD_CONTEXT_HEADER, self.lead_summary)
    }

    /// Number of session turns carried.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Convert into a brain request.
    ///
    /// System messages come in order: persona, format instructions, lead block.
    pub fn into_request(
        self,
        system_prompt: &str,
        instructions: &str,
        max_iterations: usize,
    ) -> BrainRequest {
        let lead_block = self.lead_block();
        BrainRequest {
            system: vec![system_prompt.to_string(), instructions.to_string(), lead_block],
            history: self.history,
            input: self.input,
            max_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_block_for_new_lead() {
        let context = PromptContext::new(&LeadProfile::new("u1"), Vec::new(), "oi");
        assert_eq!(
            context.lead_block(),
            "CONTEXTO DO LEAD:\nEstágio do funil: Etapa 1: Diagnóstico\nTotal de mensagens: 0"
        );
        assert_eq!(context.history_len(), 0);
    }

    #[test]
    fn test_into_request_orders_messages() {
        let mut profile = LeadProfile::new("u1");
        profile.topic_of_interest = Some("POLÍCIA FEDERAL".to_string());

        let history = vec![
            SessionTurn::user("Quero PF"),
            SessionTurn::assistant("Bora! Já viu o edital?"),
        ];
        let request = PromptContext::new(&profile, history.clone(), "Quanto custa?")
            .into_request("persona", "formato", 10);

        assert_eq!(request.system.len(), 3);
        assert_eq!(request.system[0], "persona");
        assert_eq!(request.system[1], "formato");
        assert!(request.system[2].starts_with("CONTEXTO DO LEAD:\n"));
        assert!(request.system[2].contains("Concurso de interesse: POLÍCIA FEDERAL"));
        assert_eq!(request.history, history);
        assert_eq!(request.input, "Quanto custa?");
        assert_eq!(request.max_iterations, 10);
    }
}
