// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Identidade emitida pelo serviço de autenticação remoto.
// O ciclo de vida dela é o da sessão: aparece no sign-in, some no sign-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

// A sessão como o serviço remoto devolve: par de tokens opacos + expiração.
// Nada aqui é decodificado localmente; `expires_at` chega em segundos unix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    // Expirada = o carimbo ficou no passado. Quem decide o que fazer é o guard.
    pub fn expirada(&self, agora: DateTime<Utc>) -> bool {
        self.expires_at <= agora
    }
}

// Papel do usuário dentro do painel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

// Linha da tabela `usuarios_dashboard`. Criada por provisionamento externo:
// pode não existir para toda identidade autenticada, e isso é um estado válido.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub nome: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Corpo de PATCH em `usuarios_dashboard`: só os campos presentes mudam
#[derive(Debug, Clone, Default, Serialize)]
pub struct AtualizaPerfil {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para cadastro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
pub struct SignUpPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub nome: String,
}

// Criação de usuário pela área administrativa: cadastro + papel em dois passos
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub nome: String,
    pub role: Role,
    pub is_active: bool,
}

// Atualização de perfil pela área administrativa
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub nome: String,
    pub role: Role,
    pub is_active: bool,
}
