// src/services/session.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{watch, RwLock};

use crate::{
    common::error::AppError,
    models::auth::Session,
    remote::client::SignUpResult,
    remote::TokenStorage,
};

// A porta para o serviço de autenticação remoto. O cliente HTTP real a
// implementa; os testes usam dublês.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nome: &str,
    ) -> Result<SignUpResult, AppError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError>;
    async fn get_user(
        &self,
        access_token: &str,
    ) -> Result<crate::models::auth::AuthUser, AppError>;
}

#[async_trait]
impl AuthApi for crate::remote::RemoteClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        Self::sign_in(self, email, password).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nome: &str,
    ) -> Result<SignUpResult, AppError> {
        Self::sign_up(self, email, password, nome).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        Self::sign_out(self, access_token).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError> {
        Self::refresh_session(self, refresh_token).await
    }

    async fn get_user(
        &self,
        access_token: &str,
    ) -> Result<crate::models::auth::AuthUser, AppError> {
        Self::get_user(self, access_token).await
    }
}

// Eventos difundidos aos inscritos a cada mudança de sessão
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    // Replay sintético emitido na criação do canal. Quem assina durante a
    // inicialização deve ignorá-lo para não processar a sessão duas vezes.
    Restaurada,
    Entrou,
    Saiu,
    Renovada,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionChange {
    pub seq: u64,
    pub evento: SessionEvent,
}

// O dono único da sessão corrente do aplicativo. Guarda o par de tokens
// em memória e no armazenamento local, e notifica os inscritos a cada
// mudança. Ninguém mais toca no TokenStorage.
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    storage: TokenStorage,
    atual: Arc<RwLock<Option<Session>>>,
    mudancas: Arc<watch::Sender<SessionChange>>,
    seq: Arc<AtomicU64>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>, storage: TokenStorage) -> Self {
        let (tx, _rx) = watch::channel(SessionChange {
            seq: 0,
            evento: SessionEvent::Restaurada,
        });
        Self {
            api,
            storage,
            atual: Arc::new(RwLock::new(None)),
            mudancas: Arc::new(tx),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionChange> {
        self.mudancas.subscribe()
    }

    fn notificar(&self, evento: SessionEvent) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.mudancas.send_replace(SessionChange { seq, evento });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let sessao = self.api.sign_in(email, password).await?;
        self.adotar(sessao.clone(), SessionEvent::Entrou).await;
        Ok(sessao)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nome: &str,
    ) -> Result<SignUpResult, AppError> {
        let resultado = self.api.sign_up(email, password, nome).await?;
        if let Some(sessao) = &resultado.session {
            self.adotar(sessao.clone(), SessionEvent::Entrou).await;
        }
        Ok(resultado)
    }

    pub async fn sign_out(&self) {
        let sessao = self.atual.write().await.take();
        if let Some(sessao) = sessao {
            // Logout remoto é melhor esforço: a sessão local morre de
            // qualquer jeito.
            if let Err(e) = self.api.sign_out(&sessao.access_token).await {
                tracing::warn!("Falha no logout remoto: {e}");
            }
        }
        if let Err(e) = self.storage.remover_sessao() {
            tracing::warn!("Falha ao remover a sessão do armazenamento: {e}");
        }
        self.notificar(SessionEvent::Saiu);
    }

    // A sessão corrente, restaurando do armazenamento local quando o
    // processo acabou de subir. Sessão com expiração no passado força
    // sign-out antes de qualquer outra coisa.
    pub async fn sessao_atual(&self) -> Result<Option<Session>, AppError> {
        let agora = Utc::now();

        let em_memoria = self.atual.read().await.clone();
        if let Some(sessao) = em_memoria {
            if sessao.expirada(agora) {
                self.sign_out().await;
                return Ok(None);
            }
            return Ok(Some(sessao));
        }

        // Partida fria: tenta o armazenamento. Erro de leitura sobe como
        // falha de armazenamento, que o guard trata como estado próprio.
        let Some(sessao) = self.storage.carregar_sessao()? else {
            return Ok(None);
        };

        if sessao.expirada(agora) {
            return self.renovar_ou_descartar(&sessao).await;
        }

        // Confere com o serviço que o token restaurado ainda vale
        match self.api.get_user(&sessao.access_token).await {
            Ok(_) => {
                *self.atual.write().await = Some(sessao.clone());
                Ok(Some(sessao))
            }
            Err(AppError::SessionExpired) => self.renovar_ou_descartar(&sessao).await,
            Err(outro) => Err(outro),
        }
    }

    async fn renovar_ou_descartar(&self, sessao: &Session) -> Result<Option<Session>, AppError> {
        match self.api.refresh_session(&sessao.refresh_token).await {
            Ok(renovada) => {
                self.adotar(renovada.clone(), SessionEvent::Renovada).await;
                Ok(Some(renovada))
            }
            Err(e) => {
                tracing::info!("Sessão não renovável, descartando: {e}");
                if let Err(e) = self.storage.remover_sessao() {
                    tracing::warn!("Falha ao remover a sessão do armazenamento: {e}");
                }
                *self.atual.write().await = None;
                self.notificar(SessionEvent::Saiu);
                Ok(None)
            }
        }
    }

    async fn adotar(&self, sessao: Session, evento: SessionEvent) {
        if let Err(e) = self.storage.salvar_sessao(&sessao) {
            // Persistência é melhor esforço: a sessão vive em memória e o
            // operador só perde o "continuar conectado" entre execuções.
            tracing::warn!("Falha ao persistir a sessão: {e}");
        }
        *self.atual.write().await = Some(sessao);
        self.notificar(evento);
    }

    pub async fn token_acesso(&self) -> Option<String> {
        self.atual
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    // Ação de recuperação: apaga o namespace de autenticação inteiro do
    // armazenamento local e zera a sessão em memória.
    pub async fn limpar_dados(&self) -> Result<usize, AppError> {
        let removidas = self.storage.limpar_dados_auth()?;
        *self.atual.write().await = None;
        self.notificar(SessionEvent::Saiu);
        Ok(removidas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::AuthUser;
    use chrono::Duration;
    use std::sync::Mutex;
    use uuid::Uuid;

    // Dublê configurável da porta de autenticação
    #[derive(Default)]
    struct AuthApiFake {
        sessao_no_login: Option<Session>,
        usuario_valido: bool,
        renovada: Option<Session>,
        chamadas_sign_out: Mutex<u32>,
    }

    #[async_trait]
    impl AuthApi for AuthApiFake {
        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, AppError> {
            self.sessao_no_login
                .clone()
                .ok_or(AppError::InvalidCredentials)
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _nome: &str,
        ) -> Result<SignUpResult, AppError> {
            unimplemented!("não usado nestes testes")
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AppError> {
            *self.chamadas_sign_out.lock().unwrap() += 1;
            Ok(())
        }

        async fn refresh_session(&self, _refresh_token: &str) -> Result<Session, AppError> {
            self.renovada.clone().ok_or(AppError::SessionExpired)
        }

        async fn get_user(&self, _access_token: &str) -> Result<AuthUser, AppError> {
            if self.usuario_valido {
                Ok(AuthUser {
                    id: Uuid::new_v4(),
                    email: "op@exemplo.com".to_string(),
                })
            } else {
                Err(AppError::SessionExpired)
            }
        }
    }

    fn sessao(expira_em_segundos: i64) -> Session {
        Session {
            access_token: "acesso".to_string(),
            refresh_token: "renovacao".to_string(),
            expires_at: Utc::now() + Duration::seconds(expira_em_segundos),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: "op@exemplo.com".to_string(),
            },
        }
    }

    fn store(api: AuthApiFake, diretorio: &std::path::Path) -> SessionStore {
        SessionStore::new(Arc::new(api), TokenStorage::new(diretorio))
    }

    #[tokio::test]
    async fn login_persiste_e_notifica() {
        let diretorio = tempfile::tempdir().unwrap();
        let api = AuthApiFake {
            sessao_no_login: Some(sessao(3600)),
            ..AuthApiFake::default()
        };
        let sessoes = store(api, diretorio.path());
        let mut rx = sessoes.subscribe();
        assert_eq!(rx.borrow().evento, SessionEvent::Restaurada);

        sessoes.sign_in("op@exemplo.com", "segredo").await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().evento, SessionEvent::Entrou);
        assert!(sessoes.token_acesso().await.is_some());
        assert!(TokenStorage::new(diretorio.path())
            .carregar_sessao()
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn sessao_expirada_em_memoria_forca_sign_out() {
        let diretorio = tempfile::tempdir().unwrap();
        let api = AuthApiFake {
            sessao_no_login: Some(sessao(-10)),
            ..AuthApiFake::default()
        };
        let sessoes = store(api, diretorio.path());
        sessoes.sign_in("op@exemplo.com", "segredo").await.unwrap();

        // Expirou 10 segundos atrás: sem recarga nenhuma, vira ausência
        let atual = sessoes.sessao_atual().await.unwrap();
        assert!(atual.is_none());
        assert!(sessoes.token_acesso().await.is_none());
        assert_eq!(
            sessoes.subscribe().borrow().evento,
            SessionEvent::Saiu
        );
    }

    #[tokio::test]
    async fn restauracao_fria_valida_o_token_no_servico() {
        let diretorio = tempfile::tempdir().unwrap();
        TokenStorage::new(diretorio.path())
            .salvar_sessao(&sessao(3600))
            .unwrap();
        let api = AuthApiFake {
            usuario_valido: true,
            ..AuthApiFake::default()
        };
        let sessoes = store(api, diretorio.path());

        let atual = sessoes.sessao_atual().await.unwrap();
        assert!(atual.is_some());
    }

    #[tokio::test]
    async fn sessao_expirada_no_disco_renova_quando_possivel() {
        let diretorio = tempfile::tempdir().unwrap();
        TokenStorage::new(diretorio.path())
            .salvar_sessao(&sessao(-60))
            .unwrap();
        let nova = sessao(3600);
        let api = AuthApiFake {
            renovada: Some(nova.clone()),
            ..AuthApiFake::default()
        };
        let sessoes = store(api, diretorio.path());

        let atual = sessoes.sessao_atual().await.unwrap().unwrap();
        assert_eq!(atual.access_token, nova.access_token);
        assert_eq!(
            sessoes.subscribe().borrow().evento,
            SessionEvent::Renovada
        );
    }

    #[tokio::test]
    async fn sessao_irrenovavel_e_descartada() {
        let diretorio = tempfile::tempdir().unwrap();
        TokenStorage::new(diretorio.path())
            .salvar_sessao(&sessao(-60))
            .unwrap();
        let sessoes = store(AuthApiFake::default(), diretorio.path());

        let atual = sessoes.sessao_atual().await.unwrap();
        assert!(atual.is_none());
        assert!(TokenStorage::new(diretorio.path())
            .carregar_sessao()
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn armazenamento_corrompido_sobe_como_falha_propria() {
        let diretorio = tempfile::tempdir().unwrap();
        std::fs::write(diretorio.path().join("armazenamento.json"), "lixo").unwrap();
        let sessoes = store(AuthApiFake::default(), diretorio.path());

        match sessoes.sessao_atual().await {
            Err(AppError::StorageUnavailable(_)) => {}
            outro => panic!("esperava StorageUnavailable, veio {outro:?}"),
        }
    }
}
