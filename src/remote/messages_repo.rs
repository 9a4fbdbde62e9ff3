// src/remote/messages_repo.rs

use crate::{
    common::error::AppError,
    models::leads::ChatMessage,
    remote::{
        client::RemoteClient,
        query::{Ordenacao, TableQuery},
    },
};

const TABELA: &str = "chat_pluggy";

// Repositório da tabela `chat_pluggy` (somente leitura)
#[derive(Clone)]
pub struct MensagensRepository {
    client: RemoteClient,
}

impl MensagensRepository {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    // Contagem em lote para o conjunto de telefones da página: uma
    // requisição com contagem exata, sem trazer as mensagens em si.
    pub async fn contar_por_telefones(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<u64, AppError> {
        let consulta = TableQuery::select("id")
            .in_set("telefone", telefones)
            .com_contagem_exata()
            .range(0, 0);
        let pagina = self
            .client
            .select::<serde_json::Value>(token, TABELA, &consulta)
            .await?;
        Ok(pagina.total.unwrap_or(pagina.linhas.len() as u64))
    }

    // Transcrição completa de uma conversa, em ordem cronológica
    pub async fn transcricao(
        &self,
        token: Option<&str>,
        telefone: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let consulta = TableQuery::select("*")
            .eq("telefone", telefone)
            .order("created_at", Ordenacao::Asc);
        let pagina = self
            .client
            .select::<ChatMessage>(token, TABELA, &consulta)
            .await?;
        Ok(pagina.linhas)
    }
}
