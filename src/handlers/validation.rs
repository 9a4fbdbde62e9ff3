// src/handlers/validation.rs

use clap::{Args, ValueEnum};

use crate::{
    common::error::AppError,
    config::AppState,
    presentation::tables,
};

#[derive(Debug, Args)]
pub struct ConversaArgs {
    /// Telefone do lead
    pub telefone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Julgamento {
    Valida,
    Invalida,
}

#[derive(Debug, Args)]
pub struct ValidarArgs {
    /// Telefone do lead
    pub telefone: String,

    /// O julgamento sobre a conversa
    #[arg(long, value_enum)]
    pub status: Julgamento,

    /// Observações da revisão
    #[arg(long, default_value = "")]
    pub observacoes: String,
}

// Transcrição + status corrente da validação de uma conversa
pub async fn conversa(estado: &AppState, args: &ConversaArgs) -> Result<(), AppError> {
    super::exigir_acesso(estado, false).await?;
    let token = estado
        .sessoes
        .token_acesso()
        .await
        .ok_or(AppError::SessionExpired)?;

    let mensagens = estado
        .validation_service
        .transcricao(&token, &args.telefone)
        .await?;
    println!("\nConversa com {}", args.telefone);
    println!("{}\n", tables::transcricao(&mensagens));

    match estado
        .validation_service
        .status(&token, &args.telefone)
        .await?
    {
        Some(validacao) => {
            let rotulo = match validacao.validada {
                Some(true) => "válida",
                Some(false) => "inválida",
                None => "pendente",
            };
            println!("Status: {rotulo}");
            if let Some(quando) = validacao.validado_em {
                println!("Revisada em {}", quando.format("%d/%m/%Y %H:%M"));
            }
            if let Some(observacoes) = &validacao.observacoes {
                if !observacoes.is_empty() {
                    println!("Observações: {observacoes}");
                }
            }
        }
        None => println!("Status: pendente (sem revisão registrada)"),
    }
    Ok(())
}

// Registra o julgamento do revisor. Exige usuário autenticado: a linha
// guarda quem validou e quando.
pub async fn validar(estado: &AppState, args: &ValidarArgs) -> Result<(), AppError> {
    super::exigir_acesso(estado, false).await?;
    let usuario = estado
        .guard
        .usuario()
        .await
        .ok_or_else(|| AppError::AccessDenied("usuário não autenticado".to_string()))?;
    let token = estado
        .sessoes
        .token_acesso()
        .await
        .ok_or(AppError::SessionExpired)?;

    let validada = args.status == Julgamento::Valida;
    estado
        .validation_service
        .salvar(
            &token,
            &args.telefone,
            validada,
            &args.observacoes,
            usuario.id,
        )
        .await?;

    println!(
        "Conversa marcada como {}.",
        if validada { "válida" } else { "inválida" }
    );
    Ok(())
}
