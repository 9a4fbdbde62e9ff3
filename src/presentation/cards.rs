// src/presentation/cards.rs

use crate::{
    models::dashboard::DashboardData,
    services::dashboard_service::formatar_tempo_qualificacao,
};

// Um cartão de métrica: título à esquerda, valor alinhado à direita
fn cartao(titulo: &str, valor: &str) -> String {
    format!("  {titulo:<28} {valor:>12}")
}

// Os KPIs do topo do painel
pub fn cartoes_resumo(dados: &DashboardData) -> String {
    let percentual_ia = {
        let total = dados.ia_vs_human.ia + dados.ia_vs_human.human;
        if total > 0 {
            format!(
                "{}% IA",
                ((dados.ia_vs_human.ia as f64 / total as f64) * 100.0).round()
            )
        } else {
            "—".to_string()
        }
    };

    [
        cartao("Total de Leads", &dados.total_leads.to_string()),
        cartao(
            "Leads Qualificados",
            &format!(
                "{} ({:.1}%)",
                dados.qualified_leads, dados.qualification_rate
            ),
        ),
        cartao("Follow-ups Pendentes", &dados.pending_followups.to_string()),
        cartao("Criados no HubSpot", &dados.hubspot_created.to_string()),
        cartao(
            "Tempo Médio Qualificação",
            &formatar_tempo_qualificacao(dados.avg_qualification_time),
        ),
        cartao("Total de Mensagens", &dados.total_messages.to_string()),
        cartao("Mensagens IA vs Humano", &percentual_ia),
        cartao(
            "Satisfação (NPS 0-5)",
            &format!(
                "{:.0}% ({} satisfeitos, {} neutros)",
                dados.nps_score, dados.satisfeitos, dados.neutros
            ),
        ),
    ]
    .join("\n")
}
