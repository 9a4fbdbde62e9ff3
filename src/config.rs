// src/config.rs

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    remote::{
        LeadsRepository, MensagensRepository, PerfilRepository, RemoteClient, TokenStorage,
        UsuariosRepository, ValidacaoRepository,
    },
    services::{
        dashboard_service::BackendRemoto, validation_service::RevisaoRemota, AccessGuard,
        AdminService, DashboardService, ProfileResolver, SessionStore, ValidationService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub sessoes: SessionStore,
    pub guard: AccessGuard,
    pub dashboard_service: DashboardService,
    pub validation_service: ValidationService,
    pub admin_service: AdminService,
}

impl AppState {
    // Carrega as configurações e monta o gráfico de dependências
    pub fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let servico_url = env::var("PAINEL_SERVICO_URL")
            .map_err(|_| anyhow::anyhow!("PAINEL_SERVICO_URL deve ser definida"))?;
        let chave_api = env::var("PAINEL_CHAVE_API")
            .map_err(|_| anyhow::anyhow!("PAINEL_CHAVE_API deve ser definida"))?;
        let diretorio_dados = diretorio_de_dados()?;

        let client = RemoteClient::new(&servico_url, &chave_api)?;
        tracing::info!("✅ Cliente do serviço remoto configurado para {servico_url}");

        // --- Monta o gráfico de dependências ---
        let storage = TokenStorage::new(&diretorio_dados);
        let sessoes = SessionStore::new(Arc::new(client.clone()), storage);
        let perfis = ProfileResolver::new(Arc::new(PerfilRepository::new(client.clone())));
        let guard = AccessGuard::new(sessoes.clone(), perfis);

        let dashboard_service = DashboardService::new(Arc::new(BackendRemoto::new(
            LeadsRepository::new(client.clone()),
            ValidacaoRepository::new(client.clone()),
            MensagensRepository::new(client.clone()),
        )));

        let validation_service = ValidationService::new(Arc::new(RevisaoRemota::new(
            ValidacaoRepository::new(client.clone()),
            MensagensRepository::new(client.clone()),
        )));

        let admin_service = AdminService::new(
            Arc::new(UsuariosRepository::new(client.clone())),
            Arc::new(client),
        );

        Ok(Self {
            sessoes,
            guard,
            dashboard_service,
            validation_service,
            admin_service,
        })
    }
}

// Diretório dos dados locais: PAINEL_DIR quando definido, senão um
// `.painel` no diretório do usuário.
fn diretorio_de_dados() -> anyhow::Result<PathBuf> {
    if let Ok(caminho) = env::var("PAINEL_DIR") {
        return Ok(PathBuf::from(caminho));
    }
    if let Ok(home) = env::var("HOME") {
        return Ok(PathBuf::from(home).join(".painel"));
    }
    if let Ok(home) = env::var("USERPROFILE") {
        return Ok(PathBuf::from(home).join(".painel"));
    }
    Err(anyhow::anyhow!(
        "Não foi possível determinar o diretório de dados; defina PAINEL_DIR"
    ))
}
