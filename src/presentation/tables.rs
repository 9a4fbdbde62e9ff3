// src/presentation/tables.rs

use chrono::{DateTime, Utc};

use crate::models::{
    auth::UserProfile,
    dashboard::{Pagination, PendingLead},
    leads::ChatMessage,
};

fn data_curta(data: Option<DateTime<Utc>>) -> String {
    data.map(|d| d.format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn truncar(texto: &str, largura: usize) -> String {
    if texto.chars().count() <= largura {
        return texto.to_string();
    }
    let cortado: String = texto.chars().take(largura.saturating_sub(1)).collect();
    format!("{cortado}…")
}

// Filtro de busca da tabela: nome, telefone ou e-mail contendo o termo
pub fn filtrar_leads<'a>(leads: &'a [PendingLead], busca: &str) -> Vec<&'a PendingLead> {
    let termo = busca.to_lowercase();
    leads
        .iter()
        .filter(|lead| {
            lead.nome
                .as_deref()
                .is_some_and(|nome| nome.to_lowercase().contains(&termo))
                || lead.telefone.contains(&termo)
                || lead
                    .email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&termo))
        })
        .collect()
}

// A tabela de leads pendentes de follow-up da página corrente
pub fn tabela_leads(leads: &[PendingLead]) -> String {
    let mut linhas = vec![format!(
        "  {:<20} {:<15} {:<26} {:<16} {:<11} {:<9}",
        "Nome", "Telefone", "E-mail", "Criado em", "Etapa", "Validação"
    )];
    for lead in leads {
        linhas.push(format!(
            "  {:<20} {:<15} {:<26} {:<16} {:<11} {:<9}",
            truncar(lead.nome.as_deref().unwrap_or("—"), 20),
            truncar(&lead.telefone, 15),
            truncar(lead.email.as_deref().unwrap_or("—"), 26),
            data_curta(lead.data_criacao),
            lead.missing_stage,
            lead.validacao_status.rotulo(),
        ));
    }
    linhas.join("\n")
}

pub fn rodape_paginacao(paginacao: &Pagination, limite: u32) -> String {
    format!(
        "  Mostrando {} a {} de {} registros — Página {} de {}",
        paginacao.start_item(limite),
        paginacao.end_item(limite),
        paginacao.total_count,
        paginacao.current_page,
        paginacao.total_pages,
    )
}

// Transcrição da conversa, uma mensagem por linha
pub fn transcricao(mensagens: &[ChatMessage]) -> String {
    if mensagens.is_empty() {
        return "  (sem mensagens)".to_string();
    }
    mensagens
        .iter()
        .map(|mensagem| {
            let quando = data_curta(mensagem.created_at);
            let quem = match mensagem.tipo_msg.as_deref() {
                Some("ia") => "IA",
                Some("human") => mensagem.nome.as_deref().unwrap_or("Humano"),
                _ => mensagem.nome.as_deref().unwrap_or("?"),
            };
            format!(
                "  [{quando}] {quem}: {}",
                mensagem.mensagem.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn tabela_usuarios(perfis: &[UserProfile]) -> String {
    let mut linhas = vec![format!(
        "  {:<36} {:<24} {:<28} {:<6} {:<6}",
        "Id", "Nome", "E-mail", "Papel", "Ativo"
    )];
    for perfil in perfis {
        linhas.push(format!(
            "  {:<36} {:<24} {:<28} {:<6} {:<6}",
            perfil.id,
            truncar(&perfil.nome, 24),
            truncar(&perfil.email, 28),
            match perfil.role {
                crate::models::auth::Role::Admin => "admin",
                crate::models::auth::Role::User => "user",
            },
            if perfil.is_active { "sim" } else { "não" },
        ));
    }
    linhas.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::leads::ValidacaoStatus;

    fn lead(nome: &str, telefone: &str, email: &str) -> PendingLead {
        PendingLead {
            id: 1,
            nome: Some(nome.to_string()),
            telefone: telefone.to_string(),
            email: Some(email.to_string()),
            data_criacao: None,
            origem: None,
            atividade: None,
            solucao: None,
            tamanho: None,
            followup_status: None,
            criado_no_hubspot: None,
            nps_score: None,
            ultimo_tipo_msg: None,
            validacao_status: ValidacaoStatus::Pendente,
            missing_stage: "Origem",
        }
    }

    #[test]
    fn busca_casa_nome_telefone_ou_email() {
        let leads = vec![
            lead("Maria Silva", "5511999990000", "maria@exemplo.com"),
            lead("João Souza", "5521988880000", "joao@exemplo.com"),
        ];

        assert_eq!(filtrar_leads(&leads, "maria").len(), 1);
        assert_eq!(filtrar_leads(&leads, "5521").len(), 1);
        assert_eq!(filtrar_leads(&leads, "@exemplo.com").len(), 2);
        assert_eq!(filtrar_leads(&leads, "nada").len(), 0);
    }

    #[test]
    fn tabela_tem_cabecalho_e_uma_linha_por_lead() {
        let leads = vec![
            lead("Maria", "111", "maria@exemplo.com"),
            lead("João", "222", "joao@exemplo.com"),
        ];
        let texto = tabela_leads(&leads);
        assert_eq!(texto.lines().count(), 3);
        assert!(texto.lines().next().unwrap().contains("Telefone"));
    }

    #[test]
    fn transcricao_vazia_tem_aviso() {
        assert!(transcricao(&[]).contains("sem mensagens"));
    }

    #[test]
    fn rodape_resume_o_intervalo() {
        let paginacao = Pagination {
            current_page: 3,
            total_pages: 3,
            total_count: 250,
            has_next_page: false,
            has_prev_page: true,
        };
        assert_eq!(
            rodape_paginacao(&paginacao, 100),
            "  Mostrando 201 a 250 de 250 registros — Página 3 de 3"
        );
    }
}
