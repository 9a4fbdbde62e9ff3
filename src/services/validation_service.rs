// src/services/validation_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::leads::{AtualizaValidacao, ChatMessage, ConversaValidacao, NovaValidacao},
    remote::{MensagensRepository, ValidacaoRepository},
};

// Porta da revisão de conversas: a linha de validação e a transcrição
#[async_trait]
pub trait RevisaoApi: Send + Sync {
    async fn validacao_por_telefone(
        &self,
        token: &str,
        telefone: &str,
    ) -> Result<Option<ConversaValidacao>, AppError>;

    async fn inserir_validacao(&self, token: &str, nova: &NovaValidacao)
        -> Result<(), AppError>;

    async fn atualizar_validacao(
        &self,
        token: &str,
        telefone: &str,
        mudanca: &AtualizaValidacao,
    ) -> Result<(), AppError>;

    async fn transcricao(&self, token: &str, telefone: &str)
        -> Result<Vec<ChatMessage>, AppError>;
}

pub struct RevisaoRemota {
    validacoes: ValidacaoRepository,
    mensagens: MensagensRepository,
}

impl RevisaoRemota {
    pub fn new(validacoes: ValidacaoRepository, mensagens: MensagensRepository) -> Self {
        Self {
            validacoes,
            mensagens,
        }
    }
}

#[async_trait]
impl RevisaoApi for RevisaoRemota {
    async fn validacao_por_telefone(
        &self,
        token: &str,
        telefone: &str,
    ) -> Result<Option<ConversaValidacao>, AppError> {
        self.validacoes.por_telefone(Some(token), telefone).await
    }

    async fn inserir_validacao(
        &self,
        token: &str,
        nova: &NovaValidacao,
    ) -> Result<(), AppError> {
        self.validacoes.inserir(Some(token), nova).await
    }

    async fn atualizar_validacao(
        &self,
        token: &str,
        telefone: &str,
        mudanca: &AtualizaValidacao,
    ) -> Result<(), AppError> {
        self.validacoes
            .atualizar(Some(token), telefone, mudanca)
            .await
    }

    async fn transcricao(
        &self,
        token: &str,
        telefone: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.mensagens.transcricao(Some(token), telefone).await
    }
}

// O julgamento humano sobre a conversa de um lead: transcrição, status
// corrente e o registro da revisão.
#[derive(Clone)]
pub struct ValidationService {
    api: Arc<dyn RevisaoApi>,
}

impl ValidationService {
    pub fn new(api: Arc<dyn RevisaoApi>) -> Self {
        Self { api }
    }

    pub async fn transcricao(
        &self,
        token: &str,
        telefone: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.api.transcricao(token, telefone).await
    }

    pub async fn status(
        &self,
        token: &str,
        telefone: &str,
    ) -> Result<Option<ConversaValidacao>, AppError> {
        self.api.validacao_por_telefone(token, telefone).await
    }

    // No máximo uma linha por telefone: consulta primeiro e decide entre
    // insert e update.
    pub async fn salvar(
        &self,
        token: &str,
        telefone: &str,
        validada: bool,
        observacoes: &str,
        validado_por: Uuid,
    ) -> Result<(), AppError> {
        let agora = Utc::now();
        let existente = self.api.validacao_por_telefone(token, telefone).await?;

        if existente.is_some() {
            self.api
                .atualizar_validacao(
                    token,
                    telefone,
                    &AtualizaValidacao {
                        validada,
                        observacoes: observacoes.to_string(),
                        validado_por,
                        validado_em: agora,
                    },
                )
                .await
        } else {
            self.api
                .inserir_validacao(
                    token,
                    &NovaValidacao {
                        telefone: telefone.to_string(),
                        validada,
                        observacoes: observacoes.to_string(),
                        validado_por,
                        validado_em: agora,
                    },
                )
                .await
        }
    }
}
