// src/services/guard.rs

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::{
    common::error::indica_timeout,
    models::auth::{AuthUser, Role, UserProfile},
    services::{profile::ProfileResolver, session::SessionEvent, SessionStore},
};

// Limite da busca de sessão na inicialização. Nenhuma outra operação do
// painel define timeout próprio; essas ficam no padrão do transporte.
const TIMEOUT_INICIALIZACAO: Duration = Duration::from_secs(5);

// A máquina de estados de autenticação. Os quatro últimos são os estados
// de regime; qualquer um deles volta para Initializing numa nova tentativa
// ou numa notificação externa de mudança de sessão.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardState {
    Uninitialized,
    Initializing,
    AuthenticatedWithProfile {
        user: AuthUser,
        profile: UserProfile,
    },
    AuthenticatedNoProfile {
        user: AuthUser,
    },
    Unauthenticated,
    Error {
        mensagem: String,
        tentativas: u32,
    },
}

// O que a camada de rotas/comandos faz com o estado corrente
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    Allow,
    Loading,
    RedirectLogin,
    Deny { mensagem: String },
}

#[derive(Clone)]
pub struct AccessGuard {
    sessoes: SessionStore,
    perfis: ProfileResolver,
    estado: Arc<RwLock<GuardState>>,
    tentativas: Arc<AtomicU32>,
    // Cada inicialização ganha um número; respostas de perfil que chegam
    // depois de outra inicialização começar são descartadas.
    geracao: Arc<AtomicU64>,
    timeout: Duration,
}

impl AccessGuard {
    pub fn new(sessoes: SessionStore, perfis: ProfileResolver) -> Self {
        Self::com_timeout(sessoes, perfis, TIMEOUT_INICIALIZACAO)
    }

    pub fn com_timeout(
        sessoes: SessionStore,
        perfis: ProfileResolver,
        timeout: Duration,
    ) -> Self {
        Self {
            sessoes,
            perfis,
            estado: Arc::new(RwLock::new(GuardState::Uninitialized)),
            tentativas: Arc::new(AtomicU32::new(0)),
            geracao: Arc::new(AtomicU64::new(0)),
            timeout,
        }
    }

    pub async fn estado(&self) -> GuardState {
        self.estado.read().await.clone()
    }

    // Montagem: busca a sessão com tempo limitado e resolve o perfil.
    pub async fn inicializar(&self) -> GuardState {
        let geracao = self.geracao.fetch_add(1, Ordering::SeqCst) + 1;
        *self.estado.write().await = GuardState::Initializing;

        let sessao = match tokio::time::timeout(self.timeout, self.sessoes.sessao_atual()).await
        {
            Err(_) => {
                return self
                    .falhar(
                        "Tempo esgotado ao verificar a sessão. Tente novamente.".to_string(),
                        geracao,
                    )
                    .await;
            }
            Ok(Err(e)) => {
                // Falha de armazenamento local chega aqui com mensagem
                // própria, distinta das falhas de transporte.
                return self.falhar(e.mensagem_usuario(), geracao).await;
            }
            Ok(Ok(sessao)) => sessao,
        };

        let novo = match sessao {
            None => GuardState::Unauthenticated,
            Some(sessao) => {
                let perfil = self
                    .perfis
                    .resolver(&sessao.access_token, sessao.user.id)
                    .await;
                // Outra inicialização começou enquanto o perfil resolvia:
                // este resultado está obsoleto e não escreve estado.
                if self.geracao.load(Ordering::SeqCst) != geracao {
                    return self.estado().await;
                }
                match perfil {
                    Some(profile) => GuardState::AuthenticatedWithProfile {
                        user: sessao.user,
                        profile,
                    },
                    None => GuardState::AuthenticatedNoProfile { user: sessao.user },
                }
            }
        };

        if self.geracao.load(Ordering::SeqCst) == geracao {
            self.tentativas.store(0, Ordering::SeqCst);
            *self.estado.write().await = novo.clone();
        }
        novo
    }

    async fn falhar(&self, mensagem: String, geracao: u64) -> GuardState {
        let tentativas = self.tentativas.fetch_add(1, Ordering::SeqCst) + 1;
        let novo = GuardState::Error {
            mensagem,
            tentativas,
        };
        if self.geracao.load(Ordering::SeqCst) == geracao {
            *self.estado.write().await = novo.clone();
        }
        novo
    }

    // Ação de retry: limpa o erro e volta para Initializing, carregando
    // a contagem de tentativas.
    pub async fn tentar_novamente(&self) -> GuardState {
        self.inicializar().await
    }

    // Segue as notificações externas de mudança de sessão (login, logout,
    // renovação vindos de outro ponto do processo), reexecutando a
    // resolução. O replay sintético inicial é ignorado para não duplicar
    // o trabalho da inicialização de montagem.
    pub async fn acompanhar_sessao(&self) {
        let mut rx = self.sessoes.subscribe();
        loop {
            if rx.changed().await.is_err() {
                break;
            }
            let mudanca = *rx.borrow_and_update();
            if mudanca.evento == SessionEvent::Restaurada {
                continue;
            }
            self.inicializar().await;
        }
    }

    // ------------------------------------------------------------------
    // Contrato consumido pela camada de comandos
    // ------------------------------------------------------------------

    pub async fn decidir(&self, requer_admin: bool) -> AccessDecision {
        match self.estado().await {
            GuardState::Uninitialized | GuardState::Initializing => AccessDecision::Loading,
            GuardState::Unauthenticated => AccessDecision::RedirectLogin,
            GuardState::Error { mensagem, .. } => {
                // Timeout não tranca o operador para sempre: acesso básico
                // continua liberado; só a área administrativa fica fechada.
                if indica_timeout(&mensagem) && !requer_admin {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Deny { mensagem }
                }
            }
            GuardState::AuthenticatedNoProfile { user } => {
                if requer_admin {
                    AccessDecision::Deny {
                        mensagem: format!(
                            "Área restrita a administradores e o perfil de {} não foi \
                             encontrado.",
                            user.email
                        ),
                    }
                } else {
                    AccessDecision::Allow
                }
            }
            GuardState::AuthenticatedWithProfile { profile, .. } => {
                if !profile.is_active {
                    AccessDecision::Deny {
                        mensagem: "Sua conta está inativa. Entre em contato com o \
                                   administrador para reativá-la."
                            .to_string(),
                    }
                } else if requer_admin && profile.role != Role::Admin {
                    AccessDecision::Deny {
                        mensagem: "Você não tem permissão para acessar esta área.".to_string(),
                    }
                } else {
                    AccessDecision::Allow
                }
            }
        }
    }

    // Autenticado = há identidade presente; perfil NÃO é exigido
    pub async fn is_authenticated(&self) -> bool {
        matches!(
            self.estado().await,
            GuardState::AuthenticatedWithProfile { .. } | GuardState::AuthenticatedNoProfile { .. }
        )
    }

    pub async fn is_active(&self) -> bool {
        matches!(
            self.estado().await,
            GuardState::AuthenticatedWithProfile { profile, .. } if profile.is_active
        )
    }

    pub async fn is_admin(&self) -> bool {
        matches!(
            self.estado().await,
            GuardState::AuthenticatedWithProfile { profile, .. }
                if profile.is_active && profile.role == Role::Admin
        )
    }

    pub async fn usuario(&self) -> Option<AuthUser> {
        match self.estado().await {
            GuardState::AuthenticatedWithProfile { user, .. }
            | GuardState::AuthenticatedNoProfile { user } => Some(user),
            _ => None,
        }
    }

    pub async fn perfil(&self) -> Option<UserProfile> {
        match self.estado().await {
            GuardState::AuthenticatedWithProfile { profile, .. } => Some(profile),
            _ => None,
        }
    }
}
