// src/remote/storage.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::{common::error::AppError, models::auth::Session};

// Prefixo de namespace das chaves de autenticação. A ação de recuperação
// "limpar dados" remove tudo que casa com ele e nada além.
const PREFIXO_AUTH: &str = "auth.";
const CHAVE_SESSAO: &str = "auth.sessao";
const ARQUIVO: &str = "armazenamento.json";

// Armazenamento local persistente de tokens: um arquivo JSON simples de
// chave-valor. Só o SessionStore lê e escreve aqui.
#[derive(Debug, Clone)]
pub struct TokenStorage {
    caminho: PathBuf,
}

impl TokenStorage {
    pub fn new(diretorio: &Path) -> Self {
        Self {
            caminho: diretorio.join(ARQUIVO),
        }
    }

    fn ler_tudo(&self) -> Result<Map<String, Value>, AppError> {
        if !self.caminho.exists() {
            return Ok(Map::new());
        }
        let texto = fs::read_to_string(&self.caminho)
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        serde_json::from_str(&texto)
            .map_err(|e| AppError::StorageUnavailable(format!("arquivo corrompido: {e}")))
    }

    fn gravar_tudo(&self, dados: &Map<String, Value>) -> Result<(), AppError> {
        if let Some(diretorio) = self.caminho.parent() {
            fs::create_dir_all(diretorio)
                .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        }
        let texto = serde_json::to_string_pretty(dados)
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        fs::write(&self.caminho, texto).map_err(|e| AppError::StorageUnavailable(e.to_string()))
    }

    pub fn carregar_sessao(&self) -> Result<Option<Session>, AppError> {
        let dados = self.ler_tudo()?;
        let Some(valor) = dados.get(CHAVE_SESSAO) else {
            return Ok(None);
        };
        // Sessão gravada por versão antiga ou truncada: trata como corrupção
        serde_json::from_value(valor.clone())
            .map(Some)
            .map_err(|e| AppError::StorageUnavailable(format!("sessão ilegível: {e}")))
    }

    pub fn salvar_sessao(&self, sessao: &Session) -> Result<(), AppError> {
        let mut dados = self.ler_tudo()?;
        let valor = serde_json::to_value(sessao)
            .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
        dados.insert(CHAVE_SESSAO.to_string(), valor);
        self.gravar_tudo(&dados)
    }

    pub fn remover_sessao(&self) -> Result<(), AppError> {
        let mut dados = self.ler_tudo()?;
        if dados.remove(CHAVE_SESSAO).is_some() {
            self.gravar_tudo(&dados)?;
        }
        Ok(())
    }

    // Remove todas as chaves do namespace de autenticação. É a saída para
    // armazenamento corrompido, então ignora o conteúdo atual se preciso.
    pub fn limpar_dados_auth(&self) -> Result<usize, AppError> {
        let dados = match self.ler_tudo() {
            Ok(dados) => dados,
            // Corrompido: descarta o arquivo inteiro
            Err(_) => {
                fs::remove_file(&self.caminho)
                    .map_err(|e| AppError::StorageUnavailable(e.to_string()))?;
                return Ok(1);
            }
        };
        let (mantidas, removidas): (Map<String, Value>, Map<String, Value>) = dados
            .into_iter()
            .partition(|(chave, _)| !chave.starts_with(PREFIXO_AUTH));
        let quantidade = removidas.len();
        if quantidade > 0 {
            self.gravar_tudo(&mantidas)?;
        }
        Ok(quantidade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::AuthUser;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn sessao_de_teste() -> Session {
        Session {
            access_token: "acesso".to_string(),
            refresh_token: "renovacao".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: "op@exemplo.com".to_string(),
            },
        }
    }

    #[test]
    fn sessao_sobrevive_a_gravacao_e_leitura() {
        let diretorio = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(diretorio.path());

        assert!(storage.carregar_sessao().unwrap().is_none());

        let sessao = sessao_de_teste();
        storage.salvar_sessao(&sessao).unwrap();
        let restaurada = storage.carregar_sessao().unwrap().unwrap();
        assert_eq!(restaurada.access_token, sessao.access_token);
        assert_eq!(restaurada.user.email, sessao.user.email);

        storage.remover_sessao().unwrap();
        assert!(storage.carregar_sessao().unwrap().is_none());
    }

    #[test]
    fn arquivo_corrompido_vira_erro_de_armazenamento() {
        let diretorio = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(diretorio.path());
        fs::write(diretorio.path().join(ARQUIVO), "{ nao é json").unwrap();

        match storage.carregar_sessao() {
            Err(AppError::StorageUnavailable(_)) => {}
            outro => panic!("esperava StorageUnavailable, veio {outro:?}"),
        }
    }

    #[test]
    fn limpar_dados_remove_so_o_namespace_auth() {
        let diretorio = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(diretorio.path());
        storage.salvar_sessao(&sessao_de_teste()).unwrap();

        // Uma chave fora do namespace convive no mesmo arquivo
        let mut dados = storage.ler_tudo().unwrap();
        dados.insert("preferencias.tema".to_string(), Value::from("escuro"));
        storage.gravar_tudo(&dados).unwrap();

        let removidas = storage.limpar_dados_auth().unwrap();
        assert_eq!(removidas, 1);
        let restantes = storage.ler_tudo().unwrap();
        assert!(restantes.contains_key("preferencias.tema"));
        assert!(!restantes.contains_key(CHAVE_SESSAO));
    }

    #[test]
    fn limpar_dados_descarta_arquivo_corrompido() {
        let diretorio = tempfile::tempdir().unwrap();
        let storage = TokenStorage::new(diretorio.path());
        fs::write(diretorio.path().join(ARQUIVO), "lixo").unwrap();

        storage.limpar_dados_auth().unwrap();
        assert!(storage.carregar_sessao().unwrap().is_none());
    }
}
