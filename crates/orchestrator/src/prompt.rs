//! Sales persona and output-format instructions.

use std::path::Path;

use brain_core::{FunnelStage, ToolDefinition, Vertical};

use crate::error::AgentError;

/// Built-in sales persona.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Você é Saulo Farias, Co-Founder do Forefy, aprovado na PF aos 22 anos.

O Forefy é o \"Waze da Aprovação\": uma IA que mapeia as bancas e recalcula a rota de estudo todos os dias.

REGRAS:
- No máximo 20 palavras por mensagem
- Português coloquial: tá, pra, bora
- Descubra sempre qual concurso o lead quer
- Quando o lead citar um órgão, use a tool search_web para buscar notícias de edital
- Para dúvidas sobre o Forefy, use a tool documents

FUNIL:
1. Pergunte: Qual concurso você mira?
2. Concurso citado: busque notícias com search_web
3. Mostre: o Forefy recalcula sua rota todo dia. É o Waze da aprovação.
4. Oferta: Plano Estratégico Anual por R$ 699,90
5. Link: https://app.forefy.ai/

Seja direto e visceral. Sempre no máximo 20 palavras.";

/// Structured-output instructions appended after the persona.
///
/// Lists the JSON keys, the accepted enum labels and the available tools.
pub fn format_instructions(max_words: usize, tools: &[ToolDefinition]) -> String {
    let stages: Vec<&str> = FunnelStage::ALL.iter().map(FunnelStage::as_str).collect();
    let verticals: Vec<&str> = Vertical::ALL.iter().map(Vertical::as_str).collect();

    let mut text = format!(
        "IMPORTANTE: Retorne apenas um objeto JSON com as chaves:\n\
         - current_funnel_stage: um de [{}]\n\
         - identified_vertical: um de [{}]\n\
         - search_required: true ou false\n\
         - search_query: texto (opcional)\n\
         - response_message: resposta ao lead (máximo {} palavras)\n\
         - suggested_next_action: texto (opcional)",
        stages.join(", "),
        verticals.join(", "),
        max_words
    );

    if !tools.is_empty() {
        text.push_str("\n\nTools disponíveis:");
        for tool in tools {
            text.push_str(&format!("\n- {}: {}", tool.name, tool.description));
        }
    }

    text
}

/// Read a system prompt override from disk.
pub fn load_system_prompt(path: impl AsRef<Path>) -> Result<String, AgentError> {
    let path = path.as_ref();
    let prompt = std::fs::read_to_string(path).map_err(|e| {
        AgentError::Configuration(format!("failed to read prompt file {}: {}", path.display(), e))
    })?;

    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AgentError::Configuration(format!(
            "prompt file {} is empty",
            path.display()
        )));
    }

    Ok(prompt.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_instructions_lists_labels() {
        let text = format_instructions(20, &[]);

        assert!(text.contains("current_funnel_stage"));
        assert!(text.contains("Etapa 1: Diagnóstico"));
        assert!(text.contains("Etapa 8/9: Fechamento/Link"));
        assert!(text.contains("ITA_IME"));
        assert!(text.contains("DESCONHECIDO"));
        assert!(text.contains("máximo 20 palavras"));
        assert!(!text.contains("Tools disponíveis"));
    }

    #[test]
    fn test_format_instructions_lists_tools() {
        let tools = vec![
            ToolDefinition::query_tool("documents", "Base de conhecimento do Forefy", "consulta"),
            ToolDefinition::query_tool("search_web", "Busca notícias de editais", "consulta"),
        ];
        let text = format_instructions(15, &tools);

        assert!(text.contains("- documents: Base de conhecimento do Forefy"));
        assert!(text.contains("- search_web: Busca notícias de editais"));
        assert!(text.contains("máximo 15 palavras"));
    }

    #[test]
    fn test_load_system_prompt() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("prompt-{}.txt", std::process::id()));
        std::fs::write(&path, "  Você é um vendedor.\n").unwrap();

        assert_eq!(load_system_prompt(&path).unwrap(), "Você é um vendedor.");

        std::fs::write(&path, "   \n").unwrap();
        assert!(matches!(
            load_system_prompt(&path),
            Err(AgentError::Configuration(msg)) if msg.contains("empty")
        ));

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            load_system_prompt(&path),
            Err(AgentError::Configuration(_))
        ));
    }
}
