// src/common/error.rs

use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// "Linha não encontrada" nunca vira erro: os repositórios devolvem Ok(None).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail ou senha inválidos")]
    InvalidCredentials,

    #[error("Sessão expirada")]
    SessionExpired,

    // Estouro do limite de tempo na inicialização da sessão
    #[error("Tempo esgotado ao falar com o serviço remoto")]
    Timeout,

    #[error("Perfil do usuário não encontrado")]
    ProfileNotFound,

    #[error("Acesso negado: {0}")]
    AccessDenied(String),

    // Armazenamento local ilegível ou sem permissão de escrita.
    // Recuperável pela ação "limpar dados e recarregar".
    #[error("Falha no armazenamento local: {0}")]
    StorageUnavailable(String),

    // O serviço remoto respondeu, mas recusou a operação
    #[error("O serviço remoto recusou a operação ({status}): {mensagem}")]
    RemoteRejected { status: u16, mensagem: String },

    // Variante para falhas de transporte (DNS, conexão, TLS)
    #[error("Erro de transporte")]
    Transport(#[from] reqwest::Error),

    #[error("Erro de E/S")]
    Io(#[from] std::io::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    // Mensagem amigável mostrada ao operador. Os detalhes técnicos vão
    // para o log via `tracing`, nunca para a tela.
    pub fn mensagem_usuario(&self) -> String {
        match self {
            Self::ValidationError(errors) => {
                let mut linhas = vec!["Um ou mais campos são inválidos.".to_string()];
                for (campo, erros_campo) in errors.field_errors() {
                    for erro in erros_campo {
                        if let Some(msg) = &erro.message {
                            linhas.push(format!("  {campo}: {msg}"));
                        }
                    }
                }
                linhas.join("\n")
            }
            Self::InvalidCredentials => "E-mail ou senha inválidos.".to_string(),
            Self::SessionExpired => {
                "Sua sessão expirou. Faça login novamente.".to_string()
            }
            Self::Timeout => {
                "Tempo esgotado ao verificar a sessão. Tente novamente.".to_string()
            }
            Self::ProfileNotFound => {
                "Não foi possível carregar o perfil do usuário.".to_string()
            }
            Self::AccessDenied(motivo) => format!("Acesso negado: {motivo}"),
            Self::StorageUnavailable(detalhe) => format!(
                "Falha ao acessar os dados locais ({detalhe}). \
                 Use `painel limpar-dados` para limpar e tentar de novo."
            ),
            Self::RemoteRejected { mensagem, .. } => mensagem.clone(),

            // Todos os outros (Transport, Io, Internal) viram mensagem genérica.
            // O `tracing` loga a causa detalhada que `thiserror` nos dá.
            ref e => {
                tracing::error!("Erro inesperado: {e:?}");
                "Ocorreu um erro inesperado.".to_string()
            }
        }
    }
}

// O guard libera acesso básico quando o texto do erro indica timeout,
// em vez de trancar o operador para sempre.
pub fn indica_timeout(mensagem: &str) -> bool {
    let texto = mensagem.to_lowercase();
    texto.contains("tempo esgotado") || texto.contains("timeout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mensagem_de_timeout_e_reconhecida() {
        assert!(indica_timeout(&AppError::Timeout.mensagem_usuario()));
        assert!(indica_timeout("operation timeout after 5s"));
        assert!(!indica_timeout("E-mail ou senha inválidos."));
    }

    #[test]
    fn validacao_lista_os_campos() {
        use validator::Validate;

        #[derive(Validate)]
        struct Payload {
            #[validate(email(message = "O e-mail fornecido é inválido."))]
            email: String,
        }

        let erro = Payload {
            email: "sem-arroba".to_string(),
        }
        .validate()
        .unwrap_err();
        let mensagem = AppError::from(erro).mensagem_usuario();
        assert!(mensagem.contains("Um ou mais campos são inválidos."));
        assert!(mensagem.contains("email"));
    }
}
