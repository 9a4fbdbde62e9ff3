// src/remote/users_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AtualizaPerfil, UserProfile},
    remote::{
        client::RemoteClient,
        query::{Ordenacao, TableQuery},
    },
};

const TABELA: &str = "usuarios_dashboard";

// Repositório da área administrativa: listagem e mutação dos perfis
// de `usuarios_dashboard`.
#[derive(Clone)]
pub struct UsuariosRepository {
    client: RemoteClient,
}

impl UsuariosRepository {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub async fn listar(&self, token: Option<&str>) -> Result<Vec<UserProfile>, AppError> {
        let consulta = TableQuery::select("*").order("created_at", Ordenacao::Desc);
        let pagina = self
            .client
            .select::<UserProfile>(token, TABELA, &consulta)
            .await?;
        Ok(pagina.linhas)
    }

    // Segundo passo da criação: ajusta papel/ativação da linha que o
    // gatilho de provisionamento criou para a identidade nova
    pub async fn atualizar_por_user_id(
        &self,
        token: Option<&str>,
        user_id: Uuid,
        mudanca: &AtualizaPerfil,
    ) -> Result<(), AppError> {
        let alvo = TableQuery::select("*").eq("user_id", user_id);
        self.client.update(token, TABELA, &alvo, mudanca).await
    }

    pub async fn atualizar_por_id(
        &self,
        token: Option<&str>,
        id: Uuid,
        mudanca: &AtualizaPerfil,
    ) -> Result<(), AppError> {
        let alvo = TableQuery::select("*").eq("id", id);
        self.client.update(token, TABELA, &alvo, mudanca).await
    }
}
