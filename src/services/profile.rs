// src/services/profile.rs

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::UserProfile, remote::PerfilRepository};

// Porta de leitura do perfil de aplicação
#[async_trait]
pub trait PerfilApi: Send + Sync {
    async fn por_user_id(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError>;
}

#[async_trait]
impl PerfilApi for PerfilRepository {
    async fn por_user_id(
        &self,
        token: &str,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError> {
        Self::por_user_id(self, Some(token), user_id).await
    }
}

// Resolve o perfil de uma identidade autenticada. Independente da lógica
// de tokens do SessionStore: recebe o token pronto e só consulta a tabela.
#[derive(Clone)]
pub struct ProfileResolver {
    api: Arc<dyn PerfilApi>,
}

impl ProfileResolver {
    pub fn new(api: Arc<dyn PerfilApi>) -> Self {
        Self { api }
    }

    // Falha na resolução vira "sem perfil", nunca erro fatal: o painel
    // continua de pé com acesso básico.
    pub async fn resolver(&self, token: &str, user_id: Uuid) -> Option<UserProfile> {
        match self.api.por_user_id(token, user_id).await {
            Ok(perfil) => perfil,
            Err(e) => {
                tracing::warn!("Falha ao carregar o perfil do usuário {user_id}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use chrono::Utc;

    struct PerfilFake {
        resultado: Result<Option<UserProfile>, ()>,
    }

    #[async_trait]
    impl PerfilApi for PerfilFake {
        async fn por_user_id(
            &self,
            _token: &str,
            _user_id: Uuid,
        ) -> Result<Option<UserProfile>, AppError> {
            self.resultado
                .clone()
                .map_err(|()| AppError::RemoteRejected {
                    status: 500,
                    mensagem: "indisponível".to_string(),
                })
        }
    }

    fn perfil() -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "op@exemplo.com".to_string(),
            nome: "Operadora".to_string(),
            role: Role::User,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn falha_de_resolucao_vira_sem_perfil() {
        let resolver = ProfileResolver::new(Arc::new(PerfilFake {
            resultado: Err(()),
        }));
        assert!(resolver.resolver("tok", Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn perfil_encontrado_e_devolvido() {
        let resolver = ProfileResolver::new(Arc::new(PerfilFake {
            resultado: Ok(Some(perfil())),
        }));
        let resolvido = resolver.resolver("tok", Uuid::new_v4()).await;
        assert_eq!(resolvido.unwrap().nome, "Operadora");
    }
}
