// src/remote/validation_repo.rs

use crate::{
    common::error::AppError,
    models::leads::{AtualizaValidacao, ConversaValidacao, NovaValidacao, ValidacaoResumo},
    remote::{client::RemoteClient, query::TableQuery},
};

const TABELA: &str = "conversa_validacao";

// Repositório da tabela `conversa_validacao`: o lookup em lote do painel
// e o insert-ou-update da revisão de conversas.
#[derive(Clone)]
pub struct ValidacaoRepository {
    client: RemoteClient,
}

impl ValidacaoRepository {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    // Uma única requisição para o conjunto inteiro de telefones da página.
    // Jamais uma por lead.
    pub async fn por_telefones(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<Vec<ValidacaoResumo>, AppError> {
        let consulta = TableQuery::select("telefone, validada").in_set("telefone", telefones);
        let pagina = self
            .client
            .select::<ValidacaoResumo>(token, TABELA, &consulta)
            .await?;
        Ok(pagina.linhas)
    }

    pub async fn por_telefone(
        &self,
        token: Option<&str>,
        telefone: &str,
    ) -> Result<Option<ConversaValidacao>, AppError> {
        let consulta = TableQuery::select("*").eq("telefone", telefone);
        self.client.select_single(token, TABELA, &consulta).await
    }

    pub async fn inserir(
        &self,
        token: Option<&str>,
        nova: &NovaValidacao,
    ) -> Result<(), AppError> {
        self.client.insert(token, TABELA, nova).await
    }

    pub async fn atualizar(
        &self,
        token: Option<&str>,
        telefone: &str,
        mudanca: &AtualizaValidacao,
    ) -> Result<(), AppError> {
        let alvo = TableQuery::select("*").eq("telefone", telefone);
        self.client.update(token, TABELA, &alvo, mudanca).await
    }
}
