// src/services/dashboard_service.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use tokio::sync::mpsc;

use crate::{
    common::error::AppError,
    models::{
        dashboard::{
            DashboardData, DashboardFilters, DistribuicaoAvaliacao, FunnelStage, IaVsHuman,
            Pagination, PendingLead, ValidationStatusEntry,
        },
        leads::{Lead, PaginaLeads, ValidacaoResumo, ValidacaoStatus},
    },
    remote::{LeadsRepository, MensagensRepository, ValidacaoRepository},
};

// Janela de frescor do agregado e pausa de debounce das edições de filtro
const FRESCOR_CACHE: Duration = Duration::from_secs(120);
pub const PAUSA_DEBOUNCE: Duration = Duration::from_millis(300);

// Catálogos fixos de opções de filtro do painel
pub const ORIGENS: &[&str] = &[
    "Indicação",
    "Busca no Google",
    "Chats de IA (ex: ChatGPT)",
    "Redes sociais (LinkedIn, Instagram...)",
    "Youtube",
    "Matéria ou evento",
];

pub const ATIVIDADES: &[&str] = &[
    "ERP, BPO ou sistema de gestão",
    "Fintech / app financeiro",
    "Quero apenas para uso pessoal",
    "Outro",
];

pub const SOLUCOES: &[&str] = &[
    "Dados (Open Finance, saldo, movimentações, investimentos, etc.)",
    "Cobranças via PIX (PIX simples, PIX automático)",
    "Pagamentos (boletos, tributos, pagamento em lote...)",
    "Outro",
];

// A porta de dados do painel: a consulta primária e os dois lookups em
// lote por telefone. Uma requisição por conjunto, nunca uma por lead.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn pagina_de_leads(
        &self,
        token: Option<&str>,
        filtros: &DashboardFilters,
    ) -> Result<PaginaLeads, AppError>;

    async fn validacoes_por_telefones(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<Vec<ValidacaoResumo>, AppError>;

    async fn contar_mensagens(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<u64, AppError>;
}

// Adaptador real por cima dos repositórios remotos
pub struct BackendRemoto {
    leads: LeadsRepository,
    validacoes: ValidacaoRepository,
    mensagens: MensagensRepository,
}

impl BackendRemoto {
    pub fn new(
        leads: LeadsRepository,
        validacoes: ValidacaoRepository,
        mensagens: MensagensRepository,
    ) -> Self {
        Self {
            leads,
            validacoes,
            mensagens,
        }
    }
}

#[async_trait]
impl DashboardBackend for BackendRemoto {
    async fn pagina_de_leads(
        &self,
        token: Option<&str>,
        filtros: &DashboardFilters,
    ) -> Result<PaginaLeads, AppError> {
        self.leads.pagina(token, filtros).await
    }

    async fn validacoes_por_telefones(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<Vec<ValidacaoResumo>, AppError> {
        self.validacoes.por_telefones(token, telefones).await
    }

    async fn contar_mensagens(
        &self,
        token: Option<&str>,
        telefones: &[String],
    ) -> Result<u64, AppError> {
        self.mensagens
            .contar_por_telefones(token, telefones)
            .await
    }
}

// Monta o agregado do painel a partir dos filtros correntes. Resultados
// ficam em cache pela chave estrutural dos filtros: uma resposta atrasada
// de filtros antigos escreve numa entrada que ninguém mais lê.
#[derive(Clone)]
pub struct DashboardService {
    backend: Arc<dyn DashboardBackend>,
    cache: MokaCache<DashboardFilters, DashboardData>,
}

impl DashboardService {
    pub fn new(backend: Arc<dyn DashboardBackend>) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(64)
            .time_to_live(FRESCOR_CACHE)
            .build();
        Self { backend, cache }
    }

    pub async fn carregar(
        &self,
        token: Option<&str>,
        filtros: &DashboardFilters,
    ) -> Result<DashboardData, AppError> {
        if let Some(dados) = self.cache.get(filtros).await {
            return Ok(dados);
        }
        let dados = self.montar(token, filtros).await?;
        self.cache.insert(filtros.clone(), dados.clone()).await;
        Ok(dados)
    }

    async fn montar(
        &self,
        token: Option<&str>,
        filtros: &DashboardFilters,
    ) -> Result<DashboardData, AppError> {
        // Passo 1 — consulta primária. Falha aqui aborta a operação toda.
        let pagina = self.backend.pagina_de_leads(token, filtros).await?;

        let telefones = telefones_distintos(&pagina.leads);

        // Passo 2 — join de validação em lote. Falha rebaixa a página
        // inteira para "pendente" em vez de derrubar o painel.
        let validacoes: HashMap<String, Option<bool>> = if telefones.is_empty() {
            HashMap::new()
        } else {
            match self
                .backend
                .validacoes_por_telefones(token, &telefones)
                .await
            {
                Ok(resumos) => resumos
                    .into_iter()
                    .map(|resumo| (resumo.telefone, resumo.validada))
                    .collect(),
                Err(e) => {
                    tracing::warn!("Lookup de validação falhou, página fica pendente: {e}");
                    HashMap::new()
                }
            }
        };

        // Passo 3 — contagem de mensagens. Falha vira zero, não erro.
        let total_mensagens = if telefones.is_empty() {
            0
        } else {
            match self.backend.contar_mensagens(token, &telefones).await {
                Ok(total) => total,
                Err(e) => {
                    tracing::warn!("Contagem de mensagens falhou: {e}");
                    0
                }
            }
        };

        // Passo 4 — métricas derivadas, todas sobre a página corrente
        Ok(montar_dashboard(
            &pagina,
            &validacoes,
            total_mensagens,
            filtros,
        ))
    }
}

fn telefones_distintos(leads: &[Lead]) -> Vec<String> {
    let mut vistos = std::collections::HashSet::new();
    leads
        .iter()
        .filter(|lead| vistos.insert(lead.telefone.clone()))
        .map(|lead| lead.telefone.clone())
        .collect()
}

fn campo_vazio(campo: Option<&String>) -> bool {
    campo.is_none_or(|valor| valor.is_empty())
}

// Primeira etapa de qualificação ainda não preenchida, na ordem do funil
fn etapa_faltante(lead: &Lead) -> &'static str {
    if campo_vazio(lead.origem.as_ref()) {
        "Origem"
    } else if campo_vazio(lead.email.as_ref()) {
        "E-mail"
    } else if campo_vazio(lead.atividade.as_ref()) {
        "Atividade"
    } else if campo_vazio(lead.solucao.as_ref()) {
        "Solução"
    } else if campo_vazio(lead.tamanho.as_ref()) {
        "Tamanho"
    } else {
        "Qualificado"
    }
}

// O cálculo puro do agregado. As taxas dividem pelo total exato do
// conjunto filtrado, mas as contagens vêm só da página corrente — é o
// comportamento preservado do painel, não um agregado do conjunto todo.
fn montar_dashboard(
    pagina: &PaginaLeads,
    validacoes: &HashMap<String, Option<bool>>,
    total_mensagens: u64,
    filtros: &DashboardFilters,
) -> DashboardData {
    let total_leads = pagina.total;

    let status_por_lead: Vec<ValidacaoStatus> = pagina
        .leads
        .iter()
        .map(|lead| match validacoes.get(&lead.telefone) {
            Some(validada) => ValidacaoStatus::from_validada(*validada),
            None => ValidacaoStatus::Pendente,
        })
        .collect();

    let qualified_leads = pagina
        .leads
        .iter()
        .filter(|lead| lead.criado_no_hubspot == Some(true))
        .count() as u64;

    let qualification_rate = if total_leads > 0 {
        (qualified_leads as f64 / total_leads as f64) * 100.0
    } else {
        0.0
    };

    let pending_followups = pagina
        .leads
        .iter()
        .filter(|lead| lead.followup_status.is_some_and(|status| status >= 1))
        .count() as u64;

    // Avaliações dos clientes (escala 0-5)
    let avaliacoes: Vec<i32> = pagina
        .leads
        .iter()
        .filter_map(|lead| lead.nps_score)
        .collect();
    let satisfeitos = avaliacoes.iter().filter(|&&score| score == 5).count() as u64;
    let neutros = avaliacoes
        .iter()
        .filter(|&&score| (1..=4).contains(&score))
        .count() as u64;
    let nps_score = if satisfeitos + neutros > 0 {
        (satisfeitos as f64 / (satisfeitos + neutros) as f64) * 100.0
    } else {
        0.0
    };

    // Sempre as cinco notas, zerando as ausentes
    let distribuicao_avaliacoes = (1..=5)
        .map(|score| DistribuicaoAvaliacao {
            score,
            quantidade: avaliacoes.iter().filter(|&&nota| nota == score).count() as u64,
        })
        .collect();

    let ia = pagina
        .leads
        .iter()
        .filter(|lead| lead.ultimo_tipo_msg.as_deref() == Some("ia"))
        .count() as u64;
    let human = pagina
        .leads
        .iter()
        .filter(|lead| lead.ultimo_tipo_msg.as_deref() == Some("human"))
        .count() as u64;

    let contar_status = |status: ValidacaoStatus| {
        status_por_lead.iter().filter(|&&s| s == status).count() as u64
    };
    let validation_status_data = vec![
        ValidationStatusEntry {
            status: ValidacaoStatus::Pendente.rotulo(),
            count: contar_status(ValidacaoStatus::Pendente),
            color: ValidacaoStatus::Pendente.cor(),
        },
        ValidationStatusEntry {
            status: ValidacaoStatus::Invalida.rotulo(),
            count: contar_status(ValidacaoStatus::Invalida),
            color: ValidacaoStatus::Invalida.cor(),
        },
        ValidationStatusEntry {
            status: ValidacaoStatus::Validada.rotulo(),
            count: contar_status(ValidacaoStatus::Validada),
            color: ValidacaoStatus::Validada.cor(),
        },
    ];

    // Tempo médio de qualificação: diferença de relógio entre a criação e
    // o envio ao CRM, só para leads qualificados com os dois carimbos
    let duracoes_minutos: Vec<f64> = pagina
        .leads
        .iter()
        .filter(|lead| lead.criado_no_hubspot == Some(true))
        .filter_map(|lead| match (lead.data_criacao, lead.timestamp) {
            (Some(inicio), Some(fim)) => {
                Some((fim - inicio).num_milliseconds() as f64 / 60_000.0)
            }
            _ => None,
        })
        .collect();
    let avg_qualification_time = if duracoes_minutos.is_empty() {
        0
    } else {
        (duracoes_minutos.iter().sum::<f64>() / duracoes_minutos.len() as f64).round() as i64
    };

    let funnel_data = vec![
        FunnelStage {
            stage: "Total de Leads",
            count: total_leads,
            rate: 100.0,
        },
        FunnelStage {
            stage: "Leads Qualificados",
            count: qualified_leads,
            rate: qualification_rate,
        },
    ];

    let pending_leads = pagina
        .leads
        .iter()
        .zip(status_por_lead.iter())
        .map(|(lead, status)| PendingLead {
            id: lead.id,
            nome: lead.nome.clone(),
            telefone: lead.telefone.clone(),
            email: lead.email.clone(),
            data_criacao: lead.data_criacao,
            origem: lead.origem.clone(),
            atividade: lead.atividade.clone(),
            solucao: lead.solucao.clone(),
            tamanho: lead.tamanho.clone(),
            followup_status: lead.followup_status,
            criado_no_hubspot: lead.criado_no_hubspot,
            nps_score: lead.nps_score,
            ultimo_tipo_msg: lead.ultimo_tipo_msg.clone(),
            validacao_status: *status,
            missing_stage: etapa_faltante(lead),
        })
        .collect();

    let total_pages = (total_leads.div_ceil(u64::from(filtros.limit))) as u32;
    let pagination = Pagination {
        current_page: filtros.page,
        total_pages,
        total_count: total_leads,
        has_next_page: filtros.page < total_pages,
        has_prev_page: filtros.page > 1,
    };

    DashboardData {
        total_leads,
        qualified_leads,
        qualification_rate,
        pending_followups,
        hubspot_created: qualified_leads,
        nps_score,
        satisfeitos,
        neutros,
        distribuicao_avaliacoes,
        avg_qualification_time,
        total_messages: total_mensagens,
        ia_vs_human: IaVsHuman { ia, human },
        funnel_data,
        validation_status_data,
        pending_leads,
        pagination,
    }
}

// "95min" -> "1h 35min"; acima de um dia, "1d 2h"
pub fn formatar_tempo_qualificacao(minutos: i64) -> String {
    if minutos < 60 {
        format!("{minutos}min")
    } else if minutos < 1440 {
        let horas = minutos / 60;
        let resto = minutos % 60;
        if resto == 0 {
            format!("{horas}h")
        } else {
            format!("{horas}h {resto}min")
        }
    } else {
        let dias = minutos / 1440;
        let horas_restantes = (minutos % 1440) / 60;
        if horas_restantes == 0 {
            format!("{dias}d")
        } else {
            format!("{dias}d {horas_restantes}h")
        }
    }
}

// Absorve edições rápidas de filtro: devolve o último valor recebido
// depois de uma pausa sem novas edições.
pub async fn debounce_filtros(
    rx: &mut mpsc::Receiver<DashboardFilters>,
    pausa: Duration,
) -> Option<DashboardFilters> {
    let mut atual = rx.recv().await?;
    loop {
        match tokio::time::timeout(pausa, rx.recv()).await {
            Ok(Some(mais_novo)) => atual = mais_novo,
            Ok(None) | Err(_) => return Some(atual),
        }
    }
}
