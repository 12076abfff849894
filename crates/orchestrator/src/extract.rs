//! Deterministic signal extraction from lead messages.
//!
//! Every detector is an ordered list of case-insensitive rules where the
//! first match wins. Detectors are pure: no state, no I/O.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A compiled pattern and the label it yields.
struct Rule {
    pattern: Regex,
    label: &'static str,
}

fn rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .map(|(pattern, label)| Rule {
            pattern: Regex::new(&format!("(?i){}", pattern)).expect("hardcoded regex"),
            label,
        })
        .collect()
}

fn first_match(rules: &[Rule], text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.label)
}

/// Known exams and public bodies, most specific first.
static TOPICS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (r"pol[ií]cia rodovi[aá]ria federal|\bprf\b", "POLÍCIA RODOVIÁRIA FEDERAL"),
        (r"pol[ií]cia federal|\bpf\b", "POLÍCIA FEDERAL"),
        (r"pol[ií]cia civil|\bpc[-\s]?(?:sp|rj|mg|df|pr|rs|sc|ba|go|pe|ce)\b", "POLÍCIA CIVIL"),
        (r"pol[ií]cia militar|\bpm[-\s]?(?:sp|rj|mg|df|pr|rs|sc|ba|go|pe|ce)\b", "POLÍCIA MILITAR"),
        (r"pol[ií]cia penal", "POLÍCIA PENAL"),
        (r"receita federal", "RECEITA FEDERAL"),
        (r"\bsefaz\b", "SEFAZ"),
        (r"\binss\b", "INSS"),
        (r"banco do brasil", "BANCO DO BRASIL"),
        (r"caixa econ[oô]mica|\bcef\b", "CAIXA"),
        (r"\btrf\b", "TRF"),
        (r"\btrt\b", "TRT"),
        (r"\btre\b", "TRE"),
        (r"\btj[a-z]{0,2}\b|tribunal de justi[çc]a", "TJ"),
        (r"\bstf\b|\bstj\b", "TRIBUNAIS SUPERIORES"),
        (r"\boab\b|exame da ordem", "OAB"),
        (r"magistratura|\bjuiz\b|\bju[ií]za\b", "MAGISTRATURA"),
        (r"resid[eê]ncia m[eé]dica|\brevalida\b", "RESIDÊNCIA MÉDICA"),
        (r"\bita\b", "ITA"),
        (r"\bime\b", "IME"),
        (r"\benem\b", "ENEM"),
        (r"\btoefl\b", "TOEFL"),
    ])
});

/// Career areas.
static CATEGORIES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (
            r"pol[ií]cia|policial|delegad[oa]|escriv[aã]|perito|agente penitenci|\bpf\b|\bprf\b",
            "POLICIAL",
        ),
        (r"receita|auditor|fiscal|\bsefaz\b|tribut", "FISCAL"),
        (r"tribunal|\btr[fte]\b|\btj[a-z]{0,2}\b|analista judici|t[eé]cnico judici", "TRIBUNAIS"),
        (r"banco do brasil|caixa econ[oô]mica|banc[aá]ri", "BANCÁRIA"),
        (r"\boab\b|magistratura|\bjuiz\b|promotor|defensor|advoga", "JURÍDICA"),
        (r"\binss\b|administrativ|previd[eê]nci", "ADMINISTRATIVA"),
        (r"medicina|resid[eê]ncia|enfermag|\bsa[uú]de\b", "SAÚDE"),
        (r"\benem\b|vestibular|\bita\b|\bime\b|militar", "VESTIBULARES E MILITARES"),
    ])
});

/// Self-introduction phrasings followed by a capitalized first name.
static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(?i:meu nome [eé])|(?i:me chamo)|(?i:eu sou o)|(?i:eu sou a)|(?i:sou o)|(?i:sou a)|(?i:aqui [eé] o)|(?i:aqui [eé] a)|(?i:pode me chamar de))\s+(\p{Lu}\p{Ll}+)",
    )
    .expect("hardcoded regex")
});

/// Objection categories in priority order.
static OBJECTIONS: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    rules(&[
        (
            r"quanto custa|\bpre[çc]o|\bcaro\b|\bvalor\b|\bpagar\b|sem dinheiro|n[aã]o tenho dinheiro|parcel",
            "PREÇO",
        ),
        (r"sem tempo|n[aã]o tenho tempo|\btempo\b|trabalho o dia|rotina corrida", "TEMPO"),
        (r"funciona|vale a pena|garantia|d[aá] resultado|ser[aá] que", "EFICÁCIA"),
        (
            r"depois eu|mais tarde|outro dia|semana que vem|ano que vem|vou pensar|ainda n[aã]o sei",
            "PROCRASTINAÇÃO",
        ),
        (r"golpe|confi[aá]vel|confian[çc]a|[eé] seguro|\bfake\b|pir[aâ]mide", "CONFIANÇA"),
    ])
});

static NEGATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)n[aã]o quero|n[aã]o gostei|n[aã]o tenho interesse|\bcaro\b|\bruim\b|p[eé]ssim|\bchato\b|desist|\bpara de\b",
    )
    .expect("hardcoded regex")
});

static POSITIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bquero\b|\bbora\b|[oó]timo|\blegal\b|\bmassa\b|\btop\b|gostei|\bshow\b|perfeito|obrigad|\bsim\b|interessante",
    )
    .expect("hardcoded regex")
});

/// Tone of a lead message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

/// Everything the extractor found in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signals {
    pub topic: Option<String>,
    pub category: Option<String>,
    pub name: Option<String>,
    pub objection: Option<String>,
    pub sentiment: Sentiment,
    /// Whether the message is a question.
    pub is_question: bool,
}

/// Pattern-based extractor for lead signals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Run every detector over `text`.
    pub fn extract(&self, text: &str) -> Signals {
        Signals {
            topic: self.topic(text),
            category: self.category(text),
            name: self.name(text),
            objection: self.objection(text),
            sentiment: self.sentiment(text),
            is_question: text.trim_end().ends_with('?'),
        }
    }

    /// First known exam or public body mentioned, upper-cased.
    pub fn topic(&self, text: &str) -> Option<String> {
        first_match(&TOPICS, text).map(str::to_string)
    }

    /// Career area implied by the text.
    pub fn category(&self, text: &str) -> Option<String> {
        first_match(&CATEGORIES, text).map(str::to_string)
    }

    /// First name given in a self-introduction.
    pub fn name(&self, text: &str) -> Option<String> {
        NAME.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Objection category raised by the text.
    pub fn objection(&self, text: &str) -> Option<String> {
        first_match(&OBJECTIONS, text).map(str::to_string)
    }

    /// Negative cues win over positive ones.
    pub fn sentiment(&self, text: &str) -> Sentiment {
        if NEGATIVE.is_match(text) {
            Sentiment::Negative
        } else if POSITIVE.is_match(text) {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_and_category() {
        let extractor = SignalExtractor::new();
        let signals = extractor.extract("Quero saber sobre concurso da Polícia Federal");

        assert_eq!(signals.topic.as_deref(), Some("POLÍCIA FEDERAL"));
        assert_eq!(signals.category.as_deref(), Some("POLICIAL"));
        assert_eq!(signals.objection, None);
        assert_eq!(signals.name, None);
        assert_eq!(signals.sentiment, Sentiment::Positive);
        assert!(!signals.is_question);
    }

    #[test]
    fn test_topic_without_accents_and_acronyms() {
        let extractor = SignalExtractor::new();
        assert_eq!(extractor.topic("policia federal").as_deref(), Some("POLÍCIA FEDERAL"));
        assert_eq!(extractor.topic("vou prestar PRF").as_deref(), Some("POLÍCIA RODOVIÁRIA FEDERAL"));
        assert_eq!(extractor.topic("estudo pra OAB").as_deref(), Some("OAB"));
        assert_eq!(extractor.topic("oi tudo bem"), None);
    }

    #[test]
    fn test_topic_first_match_wins() {
        let extractor = SignalExtractor::new();
        let topic = extractor.topic("estou entre Receita Federal e Polícia Federal");
        assert_eq!(topic.as_deref(), Some("POLÍCIA FEDERAL"));
    }

    #[test]
    fn test_category_rules() {
        let extractor = SignalExtractor::new();
        assert_eq!(extractor.category("quero ser auditor fiscal").as_deref(), Some("FISCAL"));
        assert_eq!(extractor.category("analista judiciário do TRT").as_deref(), Some("TRIBUNAIS"));
        assert_eq!(extractor.category("bom dia"), None);
    }

    #[test]
    fn test_name_detection() {
        let extractor = SignalExtractor::new();
        assert_eq!(extractor.name("Oi, meu nome é João").as_deref(), Some("João"));
        assert_eq!(extractor.name("me chamo Ana e quero PF").as_deref(), Some("Ana"));
        assert_eq!(extractor.name("MEU NOME É Carla").as_deref(), Some("Carla"));
        assert_eq!(extractor.name("meu nome é joão"), None);
        assert_eq!(extractor.name("quero estudar"), None);
    }

    #[test]
    fn test_objection_detection() {
        let extractor = SignalExtractor::new();
        assert_eq!(extractor.objection("Quanto custa?").as_deref(), Some("PREÇO"));
        assert_eq!(extractor.objection("não tenho tempo").as_deref(), Some("TEMPO"));
        assert_eq!(extractor.objection("isso funciona mesmo?").as_deref(), Some("EFICÁCIA"));
        assert_eq!(extractor.objection("vou pensar").as_deref(), Some("PROCRASTINAÇÃO"));
        assert_eq!(extractor.objection("isso é golpe?").as_deref(), Some("CONFIANÇA"));
        assert_eq!(extractor.objection("bora!"), None);
    }

    #[test]
    fn test_objection_priority() {
        let extractor = SignalExtractor::new();
        let objection = extractor.objection("não tenho tempo e é caro");
        assert_eq!(objection.as_deref(), Some("PREÇO"));
    }

    #[test]
    fn test_sentiment() {
        let extractor = SignalExtractor::new();
        assert_eq!(extractor.sentiment("Bora, gostei!"), Sentiment::Positive);
        assert_eq!(extractor.sentiment("não quero, obrigado"), Sentiment::Negative);
        assert_eq!(extractor.sentiment("qual o horário?"), Sentiment::Neutral);
    }

    #[test]
    fn test_question_flag() {
        let signals = SignalExtractor::new().extract("Quanto custa? ");
        assert!(signals.is_question);
        assert_eq!(signals.objection.as_deref(), Some("PREÇO"));
        assert_eq!(signals.topic, None);
        assert_eq!(signals.category, None);
    }
}
