// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::leads::ValidacaoStatus;

// Filtros transitórios do painel. Nunca são persistidos; o valor estrutural
// serve de chave de cache, por isso Hash + Eq.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DashboardFilters {
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    pub origem: Vec<String>,
    pub atividade: Vec<String>,
    pub solucao: Vec<String>,
    pub hubspot: Option<bool>,
    pub followup: Option<i32>,
    pub interaction: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for DashboardFilters {
    fn default() -> Self {
        Self {
            date_start: None,
            date_end: None,
            origem: Vec::new(),
            atividade: Vec::new(),
            solucao: Vec::new(),
            hubspot: None,
            followup: None,
            interaction: None,
            page: 1,
            limit: 100,
        }
    }
}

// 1. Distribuição de avaliações (sempre 5 entradas, scores 1..5)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DistribuicaoAvaliacao {
    pub score: i32,
    pub quantidade: u64,
}

// 2. Últimas interações: IA vs humano
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IaVsHuman {
    pub ia: u64,
    pub human: u64,
}

// 3. Barras do gráfico de status de validação, com as cores fixas
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationStatusEntry {
    pub status: &'static str,
    pub count: u64,
    pub color: &'static str,
}

// 4. Funil de qualificação
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FunnelStage {
    pub stage: &'static str,
    pub count: u64,
    pub rate: f64,
}

// 5. Linha da tabela de leads pendentes (página atual, já com o join
// de validação aplicado e a etapa faltante derivada)
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PendingLead {
    pub id: i64,
    pub nome: Option<String>,
    pub telefone: String,
    pub email: Option<String>,
    pub data_criacao: Option<DateTime<Utc>>,
    pub origem: Option<String>,
    pub atividade: Option<String>,
    pub solucao: Option<String>,
    pub tamanho: Option<String>,
    pub followup_status: Option<i32>,
    pub criado_no_hubspot: Option<bool>,
    pub nps_score: Option<i32>,
    pub ultimo_tipo_msg: Option<String>,
    pub validacao_status: ValidacaoStatus,
    pub missing_stage: &'static str,
}

// 6. Bloco de paginação
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    // "Mostrando X a Y de N registros"
    pub fn start_item(&self, limit: u32) -> u64 {
        if self.total_count == 0 {
            return 0;
        }
        u64::from(self.current_page - 1) * u64::from(limit) + 1
    }

    pub fn end_item(&self, limit: u32) -> u64 {
        (u64::from(self.current_page) * u64::from(limit)).min(self.total_count)
    }
}

// O agregado completo que o painel consome. Nunca persistido: é recomputado
// a cada mudança de filtro, sempre a partir da página corrente + os dois
// lookups em lote por telefone.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardData {
    pub total_leads: u64,
    pub qualified_leads: u64,
    pub qualification_rate: f64,
    pub pending_followups: u64,
    pub hubspot_created: u64,
    pub nps_score: f64,
    pub satisfeitos: u64,
    pub neutros: u64,
    pub distribuicao_avaliacoes: Vec<DistribuicaoAvaliacao>,
    pub avg_qualification_time: i64,
    pub total_messages: u64,
    pub ia_vs_human: IaVsHuman,
    pub funnel_data: Vec<FunnelStage>,
    pub validation_status_data: Vec<ValidationStatusEntry>,
    pub pending_leads: Vec<PendingLead>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtros_padrao_paginam_em_100() {
        let filtros = DashboardFilters::default();
        assert_eq!(filtros.page, 1);
        assert_eq!(filtros.limit, 100);
        assert!(filtros.origem.is_empty());
        assert!(filtros.hubspot.is_none());
    }

    #[test]
    fn intervalo_exibido_na_ultima_pagina() {
        let paginacao = Pagination {
            current_page: 3,
            total_pages: 3,
            total_count: 250,
            has_next_page: false,
            has_prev_page: true,
        };
        assert_eq!(paginacao.start_item(100), 201);
        assert_eq!(paginacao.end_item(100), 250);
    }

    #[test]
    fn intervalo_exibido_sem_registros() {
        let paginacao = Pagination {
            current_page: 1,
            total_pages: 0,
            total_count: 0,
            has_next_page: false,
            has_prev_page: false,
        };
        assert_eq!(paginacao.start_item(100), 0);
        assert_eq!(paginacao.end_item(100), 0);
    }
}
