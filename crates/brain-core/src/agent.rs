//! Structured agent output and the enumerations it carries.
//!
//! The wire values are the Portuguese labels the model is instructed to
//! emit, so the same strings round-trip through prompts, JSON output and
//! the persisted lead profile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subject-matter category of the exam or credential a lead is preparing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Vertical {
    #[serde(rename = "CONCURSOS")]
    Concursos,
    #[serde(rename = "OAB")]
    Oab,
    #[serde(rename = "MAGISTRATURA")]
    Magistratura,
    #[serde(rename = "MEDICINA")]
    Medicina,
    #[serde(rename = "ITA_IME")]
    ItaIme,
    #[serde(rename = "ENEM")]
    Enem,
    #[serde(rename = "TOEFL")]
    Toefl,
    #[serde(rename = "INFOPRODUTORES")]
    Infoprodutores,
    #[default]
    #[serde(rename = "DESCONHECIDO", alias = "UNKNOWN")]
    Unknown,
}

impl Vertical {
    /// Every vertical, in declaration order.
    pub const ALL: [Vertical; 9] = [
        Vertical::Concursos,
        Vertical::Oab,
        Vertical::Magistratura,
        Vertical::Medicina,
        Vertical::ItaIme,
        Vertical::Enem,
        Vertical::Toefl,
        Vertical::Infoprodutores,
        Vertical::Unknown,
    ];

    /// Wire label for this vertical.
    pub fn as_str(&self) -> &'static str {
        match self {
            Vertical::Concursos => "CONCURSOS",
            Vertical::Oab => "OAB",
            Vertical::Magistratura => "MAGISTRATURA",
            Vertical::Medicina => "MEDICINA",
            Vertical::ItaIme => "ITA_IME",
            Vertical::Enem => "ENEM",
            Vertical::Toefl => "TOEFL",
            Vertical::Infoprodutores => "INFOPRODUTORES",
            Vertical::Unknown => "DESCONHECIDO",
        }
    }

    /// Whether the vertical carries information.
    pub fn is_known(&self) -> bool {
        *self != Vertical::Unknown
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vertical {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace(['-', ' ', '/'], "_");
        if normalized == "UNKNOWN" {
            return Ok(Vertical::Unknown);
        }
        Vertical::ALL
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| format!("unknown vertical: {}", s))
    }
}

/// One of the eight ordered phases of the sales conversation.
///
/// The ordering is advisory: the agent is expected to move forward but
/// nothing prevents it from reporting an earlier stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum FunnelStage {
    #[default]
    #[serde(rename = "Etapa 1: Diagnóstico")]
    Diagnosis,
    #[serde(rename = "Etapa 2: Verificação de Mercado")]
    MarketCheck,
    #[serde(rename = "Etapa 3: Classificação")]
    Classification,
    #[serde(rename = "Etapa 4: Intensificação")]
    Intensification,
    #[serde(rename = "Etapa 5: Premissa Waze")]
    WazePremise,
    #[serde(rename = "Etapa 6: Benefícios")]
    Benefits,
    #[serde(rename = "Etapa 7: Oferta")]
    Offer,
    #[serde(rename = "Etapa 8/9: Fechamento/Link")]
    Closing,
}

impl FunnelStage {
    /// Every stage, in funnel order.
    pub const ALL: [FunnelStage; 8] = [
        FunnelStage::Diagnosis,
        FunnelStage::MarketCheck,
        FunnelStage::Classification,
        FunnelStage::Intensification,
        FunnelStage::WazePremise,
        FunnelStage::Benefits,
        FunnelStage::Offer,
        FunnelStage::Closing,
    ];

    /// Wire label for this stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            FunnelStage::Diagnosis => "Etapa 1: Diagnóstico",
            FunnelStage::MarketCheck => "Etapa 2: Verificação de Mercado",
            FunnelStage::Classification => "Etapa 3: Classificação",
            FunnelStage::Intensification => "Etapa 4: Intensificação",
            FunnelStage::WazePremise => "Etapa 5: Premissa Waze",
            FunnelStage::Benefits => "Etapa 6: Benefícios",
            FunnelStage::Offer => "Etapa 7: Oferta",
            FunnelStage::Closing => "Etapa 8/9: Fechamento/Link",
        }
    }

    /// One-based position in the funnel.
    pub fn ordinal(&self) -> u8 {
        match self {
            FunnelStage::Diagnosis => 1,
            FunnelStage::MarketCheck => 2,
            FunnelStage::Classification => 3,
            FunnelStage::Intensification => 4,
            FunnelStage::WazePremise => 5,
            FunnelStage::Benefits => 6,
            FunnelStage::Offer => 7,
            FunnelStage::Closing => 8,
        }
    }

    /// The following stage, or `None` at the end of the funnel.
    pub fn next(&self) -> Option<FunnelStage> {
        FunnelStage::ALL.get(self.ordinal() as usize).copied()
    }

    /// Look up a stage by its one-based position.
    pub fn from_ordinal(ordinal: u8) -> Option<FunnelStage> {
        match ordinal {
            0 => None,
            // "Etapa 8/9" covers both closing steps.
            9 => Some(FunnelStage::Closing),
            n => FunnelStage::ALL.get(n as usize - 1).copied(),
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunnelStage {
    type Err = String;

    /// Accepts the exact label, or anything starting with `Etapa N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(stage) = FunnelStage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(trimmed))
        {
            return Ok(stage);
        }

        let lower = trimmed.to_lowercase();
        let digits = lower
            .strip_prefix("etapa")
            .unwrap_or(&lower)
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>();

        digits
            .parse::<u8>()
            .ok()
            .and_then(FunnelStage::from_ordinal)
            .ok_or_else(|| format!("unknown funnel stage: {}", s))
    }
}

/// The structured reply produced by the agent for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    #[serde(rename = "current_funnel_stage")]
    pub funnel_stage: FunnelStage,
    pub identified_vertical: Vertical,
    pub search_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub response_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_next_action: Option<String>,
}

impl AgentOutput {
    /// A minimal output at the first stage with an unknown vertical.
    pub fn fallback(response_message: impl Into<String>) -> Self {
        Self {
            funnel_stage: FunnelStage::Diagnosis,
            identified_vertical: Vertical::Unknown,
            search_required: false,
            search_query: None,
            response_message: response_message.into(),
            suggested_next_action: None,
        }
    }
}
