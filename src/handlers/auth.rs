// src/handlers/auth.rs

use std::io::{self, BufRead, Write};

use clap::Args;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{LoginPayload, SignUpPayload},
    services::guard::GuardState,
};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// E-mail da conta
    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Args)]
pub struct CadastroArgs {
    /// E-mail da conta nova
    #[arg(long)]
    pub email: String,

    /// Nome exibido no painel
    #[arg(long)]
    pub nome: String,
}

// A senha nunca passa pela linha de comando: vem de PAINEL_SENHA ou do
// prompt interativo.
pub(crate) fn ler_senha() -> Result<String, AppError> {
    if let Ok(senha) = std::env::var("PAINEL_SENHA") {
        return Ok(senha);
    }
    print!("Senha: ");
    io::stdout().flush()?;
    let mut linha = String::new();
    io::stdin().lock().read_line(&mut linha)?;
    Ok(linha.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(estado: &AppState, args: &LoginArgs) -> Result<(), AppError> {
    let payload = LoginPayload {
        email: args.email.clone(),
        password: ler_senha()?,
    };
    payload.validate()?;

    let sessao = estado
        .sessoes
        .sign_in(&payload.email, &payload.password)
        .await?;
    println!("✅ Conectado como {}", sessao.user.email);
    Ok(())
}

pub async fn logout(estado: &AppState) -> Result<(), AppError> {
    estado.sessoes.sign_out().await;
    println!("Sessão encerrada.");
    Ok(())
}

pub async fn cadastro(estado: &AppState, args: &CadastroArgs) -> Result<(), AppError> {
    let payload = SignUpPayload {
        email: args.email.clone(),
        password: ler_senha()?,
        nome: args.nome.clone(),
    };
    payload.validate()?;

    let resultado = estado
        .sessoes
        .sign_up(&payload.email, &payload.password, &payload.nome)
        .await?;
    match resultado.session {
        Some(sessao) => println!("✅ Conta criada; conectado como {}", sessao.user.email),
        None => println!(
            "Conta criada para {}. Confirme o e-mail antes de entrar.",
            resultado.user.email
        ),
    }
    Ok(())
}

// Mostra o estado do guard e o perfil resolvido, sem exigir acesso:
// é justamente o comando para entender por que o acesso falhou.
pub async fn quem_sou(estado: &AppState) -> Result<(), AppError> {
    println!("Verificando autenticação...");
    estado.guard.inicializar().await;

    match estado.guard.estado().await {
        GuardState::Unauthenticated => println!("Desconectado. Rode `painel login`."),
        GuardState::Error {
            mensagem,
            tentativas,
        } => {
            println!("Falha na verificação (tentativa {tentativas}): {mensagem}");
        }
        GuardState::AuthenticatedNoProfile { user } => {
            println!("Conectado como {} (id {})", user.email, user.id);
            println!("Perfil: não encontrado — acesso básico apenas.");
        }
        GuardState::AuthenticatedWithProfile { user, profile } => {
            println!("Conectado como {} (id {})", user.email, user.id);
            println!(
                "Perfil: {} — papel {:?}, {}",
                profile.nome,
                profile.role,
                if profile.is_active {
                    "ativo"
                } else {
                    "inativo"
                }
            );
            println!(
                "Administrador: {}",
                if estado.guard.is_admin().await {
                    "sim"
                } else {
                    "não"
                }
            );
        }
        GuardState::Uninitialized | GuardState::Initializing => {
            println!("A verificação da sessão ainda não terminou.")
        }
    }
    Ok(())
}

// A ação de recuperação para armazenamento local problemático
pub async fn limpar_dados(estado: &AppState) -> Result<(), AppError> {
    let removidas = estado.sessoes.limpar_dados().await?;
    println!("Dados locais de autenticação limpos ({removidas} chave(s) removida(s)).");
    Ok(())
}
