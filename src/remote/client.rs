// src/remote/client.rs

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{
    common::error::AppError,
    models::auth::{AuthUser, Session},
    remote::query::TableQuery,
};

// Uma página de linhas de uma tabela remota. `total` só vem preenchido
// quando a consulta pediu contagem exata (cabeçalho Content-Range).
#[derive(Debug, Clone)]
pub struct Pagina<T> {
    pub linhas: Vec<T>,
    pub total: Option<u64>,
}

// Resultado do cadastro: o serviço pode ou não emitir sessão na hora,
// dependendo da confirmação de e-mail. A identidade sempre vem.
#[derive(Debug, Clone)]
pub struct SignUpResult {
    pub user: AuthUser,
    pub session: Option<Session>,
}

// Cliente HTTP do serviço hospedado (autenticação + tabelas).
// Toda requisição leva a chave pública `apikey`; o Authorization é o
// token de acesso da sessão quando há uma, senão a própria chave.
#[derive(Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(api_key)
                .map_err(|e| anyhow::anyhow!("chave de API inválida: {e}"))?,
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url_auth(&self, caminho: &str) -> String {
        format!("{}/auth/v1/{caminho}", self.base_url)
    }

    fn url_tabela(&self, tabela: &str) -> String {
        format!("{}/rest/v1/{tabela}", self.base_url)
    }

    fn bearer(&self, token: Option<&str>) -> String {
        format!("Bearer {}", token.unwrap_or(&self.api_key))
    }

    // ------------------------------------------------------------------
    // Autenticação
    // ------------------------------------------------------------------

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let resposta = self
            .http
            .post(self.url_auth("token"))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resposta.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AppError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }
        Ok(resposta.json::<Session>().await?)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        nome: &str,
    ) -> Result<SignUpResult, AppError> {
        let resposta = self
            .http
            .post(self.url_auth("signup"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": { "nome": nome }
            }))
            .send()
            .await?;

        let status = resposta.status();
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }

        // Com confirmação automática o corpo já é a sessão; sem ela, vem
        // só a identidade recém-criada.
        let corpo: Value = resposta.json().await?;
        if corpo.get("access_token").is_some() {
            let sessao: Session = serde_json::from_value(corpo)
                .map_err(|e| anyhow::anyhow!("resposta de cadastro inesperada: {e}"))?;
            return Ok(SignUpResult {
                user: sessao.user.clone(),
                session: Some(sessao),
            });
        }
        let identidade = corpo.get("user").cloned().unwrap_or(corpo);
        let user: AuthUser = serde_json::from_value(identidade)
            .map_err(|e| anyhow::anyhow!("resposta de cadastro inesperada: {e}"))?;
        Ok(SignUpResult {
            user,
            session: None,
        })
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let resposta = self
            .http
            .post(self.url_auth("logout"))
            .header(AUTHORIZATION, self.bearer(Some(access_token)))
            .send()
            .await?;
        let status = resposta.status();
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }
        Ok(())
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<Session, AppError> {
        let resposta = self
            .http
            .post(self.url_auth("token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let status = resposta.status();
        if !status.is_success() {
            return Err(AppError::SessionExpired);
        }
        Ok(resposta.json::<Session>().await?)
    }

    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, AppError> {
        let resposta = self
            .http
            .get(self.url_auth("user"))
            .header(AUTHORIZATION, self.bearer(Some(access_token)))
            .send()
            .await?;
        let status = resposta.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::SessionExpired);
        }
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }
        Ok(resposta.json::<AuthUser>().await?)
    }

    // ------------------------------------------------------------------
    // Tabelas
    // ------------------------------------------------------------------

    pub async fn select<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        tabela: &str,
        consulta: &TableQuery,
    ) -> Result<Pagina<T>, AppError> {
        let mut requisicao = self
            .http
            .get(self.url_tabela(tabela))
            .query(&consulta.params())
            .header(AUTHORIZATION, self.bearer(token));
        if let Some(intervalo) = consulta.range_header() {
            requisicao = requisicao.header("Range", intervalo);
        }
        if let Some(prefer) = consulta.prefer_header() {
            requisicao = requisicao.header("Prefer", prefer);
        }

        let resposta = requisicao.send().await?;
        let status = resposta.status();
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }

        let total = resposta
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(total_do_content_range);
        let linhas = resposta.json::<Vec<T>>().await?;
        Ok(Pagina { linhas, total })
    }

    // Busca de linha única: ausência é estado esperado, nunca erro
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        token: Option<&str>,
        tabela: &str,
        consulta: &TableQuery,
    ) -> Result<Option<T>, AppError> {
        let pagina = self
            .select::<T>(token, tabela, &consulta.clone().range(0, 0))
            .await?;
        Ok(pagina.linhas.into_iter().next())
    }

    pub async fn insert<B: Serialize>(
        &self,
        token: Option<&str>,
        tabela: &str,
        corpo: &B,
    ) -> Result<(), AppError> {
        let resposta = self
            .http
            .post(self.url_tabela(tabela))
            .header(AUTHORIZATION, self.bearer(token))
            .header("Prefer", "return=minimal")
            .json(corpo)
            .send()
            .await?;
        let status = resposta.status();
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }
        Ok(())
    }

    pub async fn update<B: Serialize>(
        &self,
        token: Option<&str>,
        tabela: &str,
        alvo: &TableQuery,
        corpo: &B,
    ) -> Result<(), AppError> {
        let resposta = self
            .http
            .patch(self.url_tabela(tabela))
            .query(&alvo.filtros())
            .header(AUTHORIZATION, self.bearer(token))
            .header("Prefer", "return=minimal")
            .json(corpo)
            .send()
            .await?;
        let status = resposta.status();
        if !status.is_success() {
            return Err(erro_remoto(status.as_u16(), resposta.text().await.ok()));
        }
        Ok(())
    }
}

// "0-99/250" -> 250; "*/0" -> 0; total desconhecido ("0-99/*") -> None
fn total_do_content_range(valor: &str) -> Option<u64> {
    valor.rsplit('/').next()?.parse().ok()
}

// Tenta extrair a mensagem do corpo de erro; os dois serviços usam
// campos diferentes (error_description, message, msg, error).
fn erro_remoto(status: u16, corpo: Option<String>) -> AppError {
    let mensagem = corpo
        .as_deref()
        .and_then(|texto| serde_json::from_str::<Value>(texto).ok())
        .and_then(|v| {
            ["error_description", "message", "msg", "error"]
                .iter()
                .find_map(|campo| v.get(campo).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("HTTP {status}"));
    AppError::RemoteRejected { status, mensagem }
}
