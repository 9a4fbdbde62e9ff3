// src/handlers/admin.rs

use clap::{Args, Subcommand, ValueEnum};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{CreateUserPayload, Role, UpdateUserPayload},
    presentation::tables,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Papel {
    Admin,
    User,
}

impl From<Papel> for Role {
    fn from(papel: Papel) -> Self {
        match papel {
            Papel::Admin => Self::Admin,
            Papel::User => Self::User,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ComandoUsuarios {
    /// Lista os usuários do painel
    Listar,
    /// Cria um usuário novo
    Criar(CriarUsuarioArgs),
    /// Atualiza nome, papel e ativação de um usuário
    Atualizar(AtualizarUsuarioArgs),
    /// Desativa um usuário
    Desativar(DesativarArgs),
}

#[derive(Debug, Args)]
pub struct CriarUsuarioArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub nome: String,

    #[arg(long, value_enum, default_value_t = Papel::User)]
    pub papel: Papel,

    /// Cria a conta já desativada
    #[arg(long)]
    pub inativo: bool,
}

#[derive(Debug, Args)]
pub struct AtualizarUsuarioArgs {
    /// Id do perfil (coluna id, não user_id)
    pub id: Uuid,

    #[arg(long)]
    pub nome: String,

    #[arg(long, value_enum)]
    pub papel: Papel,

    #[arg(long)]
    pub inativo: bool,
}

#[derive(Debug, Args)]
pub struct DesativarArgs {
    /// Id do perfil
    pub id: Uuid,
}

pub async fn executar(estado: &AppState, comando: &ComandoUsuarios) -> Result<(), AppError> {
    // Toda a área de usuários é restrita a administradores ativos
    super::exigir_acesso(estado, true).await?;
    let token = estado
        .sessoes
        .token_acesso()
        .await
        .ok_or(AppError::SessionExpired)?;

    match comando {
        ComandoUsuarios::Listar => {
            let perfis = estado.admin_service.listar_usuarios(&token).await?;
            println!("{}", tables::tabela_usuarios(&perfis));
            println!("  {} usuário(s)", perfis.len());
        }
        ComandoUsuarios::Criar(args) => {
            let payload = CreateUserPayload {
                email: args.email.clone(),
                password: super::auth::ler_senha()?,
                nome: args.nome.clone(),
                role: args.papel.into(),
                is_active: !args.inativo,
            };
            payload.validate()?;

            let criado = estado.admin_service.criar_usuario(&token, &payload).await?;
            println!("✅ Usuário criado: {} (id {})", criado.email, criado.id);
        }
        ComandoUsuarios::Atualizar(args) => {
            let payload = UpdateUserPayload {
                nome: args.nome.clone(),
                role: args.papel.into(),
                is_active: !args.inativo,
            };
            payload.validate()?;

            estado
                .admin_service
                .atualizar_usuario(&token, args.id, &payload)
                .await?;
            println!("Usuário {} atualizado.", args.id);
        }
        ComandoUsuarios::Desativar(args) => {
            estado
                .admin_service
                .desativar_usuario(&token, args.id)
                .await?;
            println!("Usuário {} desativado.", args.id);
        }
    }
    Ok(())
}
