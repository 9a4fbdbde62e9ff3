// src/remote/profile_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::UserProfile,
    remote::{client::RemoteClient, query::TableQuery},
};

const TABELA: &str = "usuarios_dashboard";

// Busca do perfil de aplicação de uma identidade autenticada.
// Perfil ausente é estado válido: a linha é criada por provisionamento
// externo e pode nunca ter existido.
#[derive(Clone)]
pub struct PerfilRepository {
    client: RemoteClient,
}

impl PerfilRepository {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    pub async fn por_user_id(
        &self,
        token: Option<&str>,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError> {
        let consulta = TableQuery::select("*").eq("user_id", user_id);
        self.client.select_single(token, TABELA, &consulta).await
    }
}
