//src/main.rs

use clap::{Parser, Subcommand};

mod common;
mod config;
mod handlers;
mod models;
mod presentation;
mod remote;
mod services;

use crate::config::AppState;

#[derive(Parser)]
#[command(name = "painel", version, about = "Painel de qualificação de leads")]
struct Cli {
    #[command(subcommand)]
    comando: Comando,
}

#[derive(Subcommand)]
enum Comando {
    /// Entra com e-mail e senha
    Login(handlers::auth::LoginArgs),
    /// Encerra a sessão atual
    Logout,
    /// Cria uma conta nova
    Cadastro(handlers::auth::CadastroArgs),
    /// Mostra a sessão e o perfil atuais
    QuemSou,
    /// Limpa os dados locais de autenticação
    LimparDados,
    /// Mostra o painel com os filtros dados
    Dashboard(handlers::dashboard::DashboardArgs),
    /// Transcrição e status de validação de uma conversa
    Conversa(handlers::validation::ConversaArgs),
    /// Registra o julgamento sobre uma conversa
    Validar(handlers::validation::ValidarArgs),
    /// Gestão de usuários (restrita a administradores)
    #[command(subcommand)]
    Usuarios(handlers::admin::ComandoUsuarios),
}

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();

    // Se a configuração falhar, a aplicação não deve iniciar
    let app_state = match AppState::new() {
        Ok(estado) => estado,
        Err(e) => {
            tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {e}");
            std::process::exit(1);
        }
    };

    let resultado = match &cli.comando {
        Comando::Login(args) => handlers::auth::login(&app_state, args).await,
        Comando::Logout => handlers::auth::logout(&app_state).await,
        Comando::Cadastro(args) => handlers::auth::cadastro(&app_state, args).await,
        Comando::QuemSou => handlers::auth::quem_sou(&app_state).await,
        Comando::LimparDados => handlers::auth::limpar_dados(&app_state).await,
        Comando::Dashboard(args) => handlers::dashboard::mostrar(&app_state, args).await,
        Comando::Conversa(args) => handlers::validation::conversa(&app_state, args).await,
        Comando::Validar(args) => handlers::validation::validar(&app_state, args).await,
        Comando::Usuarios(comando) => handlers::admin::executar(&app_state, comando).await,
    };

    if let Err(e) = resultado {
        eprintln!("{}", e.mensagem_usuario());
        std::process::exit(1);
    }
}
