// src/remote/leads_repo.rs

use crate::{
    common::error::AppError,
    models::{
        dashboard::DashboardFilters,
        leads::{Lead, PaginaLeads},
    },
    remote::{client::RemoteClient, query::TableQuery},
};

const TABELA: &str = "controle_leads";

// O repositório de leads, responsável por todas as consultas à tabela
// `controle_leads` do serviço remoto.
#[derive(Clone)]
pub struct LeadsRepository {
    client: RemoteClient,
}

impl LeadsRepository {
    pub fn new(client: RemoteClient) -> Self {
        Self { client }
    }

    // Traduz os filtros do painel na consulta primária. Conjunto vazio e
    // booleano nulo não viram predicado nenhum (pass-through).
    pub fn consulta_pagina(filtros: &DashboardFilters) -> TableQuery {
        let mut consulta = TableQuery::select("*").com_contagem_exata();

        if let Some(inicio) = filtros.date_start {
            consulta = consulta.gte("data_criacao", format!("{inicio}T00:00:00.000Z"));
        }
        if let Some(fim) = filtros.date_end {
            consulta = consulta.lte("data_criacao", format!("{fim}T23:59:59.999Z"));
        }
        if !filtros.origem.is_empty() {
            consulta = consulta.in_set("origem", &filtros.origem);
        }
        if !filtros.atividade.is_empty() {
            consulta = consulta.in_set("atividade", &filtros.atividade);
        }
        if !filtros.solucao.is_empty() {
            consulta = consulta.in_set("solucao", &filtros.solucao);
        }
        if let Some(hubspot) = filtros.hubspot {
            consulta = consulta.eq("criado_no_hubspot", hubspot);
        }
        if let Some(followup) = filtros.followup {
            consulta = consulta.eq("followup_status", followup);
        }
        if let Some(interacao) = &filtros.interaction {
            consulta = consulta.eq("ultimo_tipo_msg", interacao);
        }

        let limite = u64::from(filtros.limit.max(1));
        let offset = u64::from(filtros.page.saturating_sub(1)) * limite;
        consulta.range(offset, offset + limite - 1)
    }

    pub async fn pagina(
        &self,
        token: Option<&str>,
        filtros: &DashboardFilters,
    ) -> Result<PaginaLeads, AppError> {
        let pagina = self
            .client
            .select::<Lead>(token, TABELA, &Self::consulta_pagina(filtros))
            .await?;
        Ok(PaginaLeads {
            total: pagina.total.unwrap_or(pagina.linhas.len() as u64),
            leads: pagina.linhas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn filtros_vazios_nao_geram_predicado() {
        let consulta = LeadsRepository::consulta_pagina(&DashboardFilters::default());
        let params = consulta.params();

        // Só o select; nenhum eq/in/gte/lte para campos não preenchidos
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
        assert_eq!(consulta.range_header(), Some("0-99".to_string()));
        assert_eq!(consulta.prefer_header(), Some("count=exact"));
    }

    #[test]
    fn intervalo_de_datas_cobre_o_dia_inteiro() {
        let filtros = DashboardFilters {
            date_start: Some(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            date_end: Some(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()),
            ..DashboardFilters::default()
        };
        let params = LeadsRepository::consulta_pagina(&filtros).params();
        assert!(params.contains(&(
            "data_criacao".to_string(),
            "gte.2025-03-01T00:00:00.000Z".to_string()
        )));
        assert!(params.contains(&(
            "data_criacao".to_string(),
            "lte.2025-03-31T23:59:59.999Z".to_string()
        )));
    }

    #[test]
    fn filtros_preenchidos_viram_predicados() {
        let filtros = DashboardFilters {
            origem: vec!["Indicação".to_string()],
            hubspot: Some(true),
            followup: Some(2),
            interaction: Some("ia".to_string()),
            ..DashboardFilters::default()
        };
        let params = LeadsRepository::consulta_pagina(&filtros).params();
        assert!(params.contains(&("origem".to_string(), "in.(\"Indicação\")".to_string())));
        assert!(params.contains(&("criado_no_hubspot".to_string(), "eq.true".to_string())));
        assert!(params.contains(&("followup_status".to_string(), "eq.2".to_string())));
        assert!(params.contains(&("ultimo_tipo_msg".to_string(), "eq.ia".to_string())));
    }

    #[test]
    fn paginacao_usa_offset_da_pagina() {
        let filtros = DashboardFilters {
            page: 3,
            limit: 100,
            ..DashboardFilters::default()
        };
        let consulta = LeadsRepository::consulta_pagina(&filtros);
        assert_eq!(consulta.range_header(), Some("200-299".to_string()));
    }
}
