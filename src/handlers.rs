pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod validation;

use crate::{
    common::error::AppError,
    config::AppState,
    services::guard::AccessDecision,
};

// Porteiro comum dos comandos protegidos: roda a inicialização do guard
// e traduz a decisão de acesso em prosseguir ou falhar com mensagem.
pub(crate) async fn exigir_acesso(estado: &AppState, requer_admin: bool) -> Result<(), AppError> {
    println!("Verificando autenticação...");
    estado.guard.inicializar().await;
    match estado.guard.decidir(requer_admin).await {
        AccessDecision::Allow => Ok(()),
        AccessDecision::RedirectLogin => Err(AppError::AccessDenied(
            "você não está conectado. Rode `painel login` primeiro.".to_string(),
        )),
        AccessDecision::Deny { mensagem } => Err(AppError::AccessDenied(mensagem)),
        // Inalcançável depois de `inicializar`, mas a decisão é total
        AccessDecision::Loading => Err(AppError::AccessDenied(
            "a verificação da sessão ainda não terminou".to_string(),
        )),
    }
}
