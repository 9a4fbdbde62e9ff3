// src/models/leads.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Linha da tabela `controle_leads`, como o serviço remoto devolve.
// O fluxo de captação preenche os campos aos poucos, então quase tudo
// é opcional; `telefone` é a chave de negócio que amarra as três tabelas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lead {
    pub id: i64,
    pub telefone: String,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub origem: Option<String>,
    pub atividade: Option<String>,
    pub solucao: Option<String>,
    pub tamanho: Option<String>,
    pub data_criacao: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
    pub followup_status: Option<i32>,
    pub criado_no_hubspot: Option<bool>,
    pub nps_score: Option<i32>,
    pub ultimo_tipo_msg: Option<String>,
}

// Linha da tabela `conversa_validacao`: no máximo uma por telefone.
// A ausência da linha significa "pendente".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversaValidacao {
    pub id: i64,
    pub telefone: String,
    pub validada: Option<bool>,
    pub observacoes: Option<String>,
    pub validado_por: Option<Uuid>,
    pub validado_em: Option<DateTime<Utc>>,
}

// Linha da tabela `chat_pluggy`. Somente leitura: transcrição e contagens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: i64,
    pub telefone: String,
    pub mensagem: Option<String>,
    pub nome: Option<String>,
    pub tipo_msg: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub timestamp: Option<DateTime<Utc>>,
}

// Projeção do lookup em lote: só o que o join precisa
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ValidacaoResumo {
    pub telefone: String,
    pub validada: Option<bool>,
}

// Corpo de inserção em `conversa_validacao`
#[derive(Debug, Clone, Serialize)]
pub struct NovaValidacao {
    pub telefone: String,
    pub validada: bool,
    pub observacoes: String,
    pub validado_por: Uuid,
    pub validado_em: DateTime<Utc>,
}

// Corpo de atualização: mesmo conteúdo, sem a chave
#[derive(Debug, Clone, Serialize)]
pub struct AtualizaValidacao {
    pub validada: bool,
    pub observacoes: String,
    pub validado_por: Uuid,
    pub validado_em: DateTime<Utc>,
}

// A página primária da consulta de leads, com o total exato do conjunto
// filtrado que veio junto dela
#[derive(Debug, Clone, PartialEq)]
pub struct PaginaLeads {
    pub leads: Vec<Lead>,
    pub total: u64,
}

// Status derivado do join com `conversa_validacao`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidacaoStatus {
    Validada,
    Invalida,
    Pendente,
}

impl ValidacaoStatus {
    // validada=true -> Validada, false -> Invalida, linha ausente -> Pendente
    pub fn from_validada(validada: Option<bool>) -> Self {
        match validada {
            Some(true) => Self::Validada,
            Some(false) => Self::Invalida,
            None => Self::Pendente,
        }
    }

    pub fn rotulo(&self) -> &'static str {
        match self {
            Self::Validada => "Válida",
            Self::Invalida => "Inválida",
            Self::Pendente => "Pendente",
        }
    }

    // Cores fixas dos gráficos de status
    pub fn cor(&self) -> &'static str {
        match self {
            Self::Validada => "#10B981",
            Self::Invalida => "#EF4444",
            Self::Pendente => "#F59E0B",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deriva_do_campo_validada() {
        assert_eq!(
            ValidacaoStatus::from_validada(Some(true)),
            ValidacaoStatus::Validada
        );
        assert_eq!(
            ValidacaoStatus::from_validada(Some(false)),
            ValidacaoStatus::Invalida
        );
        assert_eq!(
            ValidacaoStatus::from_validada(None),
            ValidacaoStatus::Pendente
        );
    }

    #[test]
    fn lead_desserializa_com_campos_nulos() {
        let json = r#"{
            "id": 7,
            "telefone": "5511999990000",
            "nome": null,
            "email": null,
            "origem": null,
            "atividade": null,
            "solucao": null,
            "tamanho": null,
            "data_criacao": null,
            "timestamp": null,
            "followup_status": null,
            "criado_no_hubspot": null,
            "nps_score": null,
            "ultimo_tipo_msg": null
        }"#;
        let lead: Lead = serde_json::from_str(json).unwrap();
        assert_eq!(lead.telefone, "5511999990000");
        assert!(lead.nome.is_none());
        assert!(lead.criado_no_hubspot.is_none());
    }
}
