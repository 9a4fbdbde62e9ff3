// src/handlers/dashboard.rs

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use tokio::sync::mpsc;

use crate::{
    common::error::AppError,
    config::AppState,
    models::dashboard::{DashboardData, DashboardFilters},
    presentation::{cards, charts, tables},
    services::{
        dashboard_service::{
            debounce_filtros, ATIVIDADES, ORIGENS, PAUSA_DEBOUNCE, SOLUCOES,
        },
        export,
    },
};

#[derive(Debug, Args)]
pub struct DashboardArgs {
    /// Início do intervalo de criação (AAAA-MM-DD)
    #[arg(long)]
    pub inicio: Option<NaiveDate>,

    /// Fim do intervalo de criação (AAAA-MM-DD)
    #[arg(long)]
    pub fim: Option<NaiveDate>,

    /// Filtra por origem (repetível)
    #[arg(long)]
    pub origem: Vec<String>,

    /// Filtra por atividade (repetível)
    #[arg(long)]
    pub atividade: Vec<String>,

    /// Filtra por solução (repetível)
    #[arg(long)]
    pub solucao: Vec<String>,

    /// Só leads criados (true) ou não criados (false) no HubSpot
    #[arg(long)]
    pub hubspot: Option<bool>,

    /// Só leads neste nível de follow-up (0 a 3)
    #[arg(long)]
    pub followup: Option<i32>,

    /// Última interação: ia ou human
    #[arg(long)]
    pub interacao: Option<String>,

    #[arg(long, default_value_t = 1)]
    pub pagina: u32,

    #[arg(long, default_value_t = 100)]
    pub limite: u32,

    /// Busca por nome, telefone ou e-mail na tabela
    #[arg(long)]
    pub busca: Option<String>,

    /// Exporta a tabela da página para um CSV
    #[arg(long)]
    pub exportar: Option<PathBuf>,

    /// Modo interativo: edite filtros e veja o painel se atualizar
    #[arg(long)]
    pub interativo: bool,
}

// Opções fora do catálogo não quebram nada (a consulta só volta vazia),
// mas quase sempre são erro de digitação: avisa.
fn conferir_catalogo(valores: &[String], catalogo: &[&str], campo: &str) {
    for valor in valores {
        if !catalogo.contains(&valor.as_str()) {
            tracing::warn!("{campo} \"{valor}\" não está no catálogo de opções do painel");
        }
    }
}

fn filtros_de(args: &DashboardArgs) -> DashboardFilters {
    conferir_catalogo(&args.origem, ORIGENS, "Origem");
    conferir_catalogo(&args.atividade, ATIVIDADES, "Atividade");
    conferir_catalogo(&args.solucao, SOLUCOES, "Solução");

    DashboardFilters {
        date_start: args.inicio,
        date_end: args.fim,
        origem: args.origem.clone(),
        atividade: args.atividade.clone(),
        solucao: args.solucao.clone(),
        hubspot: args.hubspot,
        followup: args.followup,
        interaction: args.interacao.clone(),
        page: args.pagina,
        limit: args.limite,
    }
}

fn render(dados: &DashboardData, filtros: &DashboardFilters, busca: Option<&str>) {
    println!("\nDashboard Executivo — qualificação de leads\n");
    println!("{}\n", cards::cartoes_resumo(dados));

    println!("Funil de qualificação");
    println!("{}\n", charts::grafico_funil(&dados.funnel_data));

    println!("Status de validação das conversas");
    println!("{}\n", charts::grafico_validacao(&dados.validation_status_data));

    println!("Distribuição de avaliações");
    println!(
        "{}\n",
        charts::grafico_avaliacoes(&dados.distribuicao_avaliacoes)
    );

    println!("Última interação");
    println!("{}\n", charts::grafico_ia_vs_human(&dados.ia_vs_human));

    println!("Leads da página");
    match busca {
        Some(termo) => {
            let filtrados = tables::filtrar_leads(&dados.pending_leads, termo);
            let filtrados: Vec<_> = filtrados.into_iter().cloned().collect();
            println!("{}", tables::tabela_leads(&filtrados));
            println!("  ({} lead(s) casando com \"{termo}\")", filtrados.len());
        }
        None => println!("{}", tables::tabela_leads(&dados.pending_leads)),
    }
    println!("{}\n", tables::rodape_paginacao(&dados.pagination, filtros.limit));
}

pub async fn mostrar(estado: &AppState, args: &DashboardArgs) -> Result<(), AppError> {
    super::exigir_acesso(estado, false).await?;

    if args.interativo {
        return interativo(estado, filtros_de(args)).await;
    }

    let token = estado.sessoes.token_acesso().await;
    let filtros = filtros_de(args);
    let dados = estado
        .dashboard_service
        .carregar(token.as_deref(), &filtros)
        .await?;

    render(&dados, &filtros, args.busca.as_deref());

    if let Some(caminho) = &args.exportar {
        export::exportar_para_arquivo(caminho, &dados.pending_leads)?;
        println!("Exportado para {}", caminho.display());
    }
    Ok(())
}

// ----------------------------------------------------------------------
// Modo interativo
// ----------------------------------------------------------------------

enum Edicao {
    Atualiza(DashboardFilters),
    Sair,
    Invalida(String),
}

// Uma linha digitada vira uma edição de filtro sobre o estado corrente
fn aplicar_edicao(filtros: &DashboardFilters, linha: &str) -> Edicao {
    let linha = linha.trim();
    let (comando, resto) = match linha.split_once(' ') {
        Some((comando, resto)) => (comando, resto.trim()),
        None => (linha, ""),
    };

    let mut novos = filtros.clone();
    match comando {
        "sair" => return Edicao::Sair,
        "limpar" => novos = DashboardFilters::default(),
        "recarregar" => {}
        "pagina" => match resto.parse::<u32>() {
            Ok(pagina) if pagina >= 1 => novos.page = pagina,
            _ => return Edicao::Invalida("use: pagina <número a partir de 1>".to_string()),
        },
        "proxima" => novos.page += 1,
        "anterior" => {
            if novos.page > 1 {
                novos.page -= 1;
            }
        }
        "inicio" => match resto.parse::<NaiveDate>() {
            Ok(data) => novos.date_start = Some(data),
            Err(_) => return Edicao::Invalida("use: inicio AAAA-MM-DD".to_string()),
        },
        "fim" => match resto.parse::<NaiveDate>() {
            Ok(data) => novos.date_end = Some(data),
            Err(_) => return Edicao::Invalida("use: fim AAAA-MM-DD".to_string()),
        },
        // As categorias alternam: repetir o valor remove o filtro
        "origem" | "atividade" | "solucao" => {
            if resto.is_empty() {
                return Edicao::Invalida(format!("use: {comando} <valor>"));
            }
            let lista = match comando {
                "origem" => &mut novos.origem,
                "atividade" => &mut novos.atividade,
                _ => &mut novos.solucao,
            };
            if let Some(posicao) = lista.iter().position(|v| v == resto) {
                lista.remove(posicao);
            } else {
                lista.push(resto.to_string());
            }
        }
        "hubspot" => {
            novos.hubspot = match resto {
                "sim" => Some(true),
                "nao" | "não" => Some(false),
                "todos" => None,
                _ => return Edicao::Invalida("use: hubspot sim|nao|todos".to_string()),
            }
        }
        "followup" => {
            novos.followup = match resto {
                "todos" => None,
                numero => match numero.parse::<i32>() {
                    Ok(nivel) => Some(nivel),
                    Err(_) => return Edicao::Invalida("use: followup <nível>|todos".to_string()),
                },
            }
        }
        "interacao" => {
            novos.interaction = match resto {
                "ia" | "human" => Some(resto.to_string()),
                "todas" => None,
                _ => return Edicao::Invalida("use: interacao ia|human|todas".to_string()),
            }
        }
        _ => {
            return Edicao::Invalida(
                "comandos: pagina N, proxima, anterior, inicio/fim AAAA-MM-DD, \
                 origem/atividade/solucao <valor>, hubspot sim|nao|todos, \
                 followup N|todos, interacao ia|human|todas, limpar, recarregar, sair"
                    .to_string(),
            )
        }
    }
    // Toda edição de filtro (menos paginação e recarga) volta à página 1
    if !matches!(comando, "pagina" | "proxima" | "anterior" | "recarregar") {
        novos.page = 1;
    }
    Edicao::Atualiza(novos)
}

async fn interativo(estado: &AppState, iniciais: DashboardFilters) -> Result<(), AppError> {
    // Mudanças de sessão vindas de outro ponto do processo reexecutam a
    // resolução do guard enquanto o modo interativo roda
    let guard = estado.guard.clone();
    let acompanhamento = tokio::spawn(async move { guard.acompanhar_sessao().await });

    let (tx, mut rx) = mpsc::channel::<DashboardFilters>(16);
    tx.send(iniciais.clone())
        .await
        .map_err(|e| anyhow::anyhow!("canal de filtros fechado: {e}"))?;

    // Leitor de stdin em thread própria; as edições entram no canal e o
    // debounce colapsa rajadas de digitação em uma consulta só
    let leitor = std::thread::spawn({
        let tx = tx.clone();
        let mut filtros = iniciais;
        move || {
            use std::io::BufRead;
            let stdin = std::io::stdin();
            for linha in stdin.lock().lines() {
                let Ok(linha) = linha else { break };
                match aplicar_edicao(&filtros, &linha) {
                    Edicao::Sair => break,
                    Edicao::Invalida(ajuda) => println!("{ajuda}"),
                    Edicao::Atualiza(novos) => {
                        filtros = novos.clone();
                        if tx.blocking_send(novos).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    });
    drop(tx);

    println!("Modo interativo. Digite um comando de filtro ou `sair`.");
    while let Some(filtros) = debounce_filtros(&mut rx, PAUSA_DEBOUNCE).await {
        let token = estado.sessoes.token_acesso().await;
        match estado
            .dashboard_service
            .carregar(token.as_deref(), &filtros)
            .await
        {
            Ok(dados) => render(&dados, &filtros, None),
            // Erro da consulta primária não derruba o modo interativo
            Err(e) => println!("Erro ao carregar dados: {}", e.mensagem_usuario()),
        }
    }

    acompanhamento.abort();
    let _ = leitor.join();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtros() -> DashboardFilters {
        DashboardFilters::default()
    }

    #[test]
    fn edicao_de_pagina_e_navegacao() {
        let Edicao::Atualiza(novos) = aplicar_edicao(&filtros(), "pagina 3") else {
            panic!("esperava atualização")
        };
        assert_eq!(novos.page, 3);

        let Edicao::Atualiza(seguinte) = aplicar_edicao(&novos, "proxima") else {
            panic!("esperava atualização")
        };
        assert_eq!(seguinte.page, 4);

        let Edicao::Atualiza(anterior) = aplicar_edicao(&filtros(), "anterior") else {
            panic!("esperava atualização")
        };
        assert_eq!(anterior.page, 1);
    }

    #[test]
    fn categoria_alterna_entre_presente_e_ausente() {
        let Edicao::Atualiza(com) = aplicar_edicao(&filtros(), "origem Indicação") else {
            panic!("esperava atualização")
        };
        assert_eq!(com.origem, vec!["Indicação".to_string()]);

        let Edicao::Atualiza(sem) = aplicar_edicao(&com, "origem Indicação") else {
            panic!("esperava atualização")
        };
        assert!(sem.origem.is_empty());
    }

    #[test]
    fn tristate_de_hubspot() {
        let Edicao::Atualiza(sim) = aplicar_edicao(&filtros(), "hubspot sim") else {
            panic!("esperava atualização")
        };
        assert_eq!(sim.hubspot, Some(true));

        let Edicao::Atualiza(todos) = aplicar_edicao(&sim, "hubspot todos") else {
            panic!("esperava atualização")
        };
        assert_eq!(todos.hubspot, None);

        assert!(matches!(
            aplicar_edicao(&filtros(), "hubspot talvez"),
            Edicao::Invalida(_)
        ));
    }

    #[test]
    fn sair_e_comando_desconhecido() {
        assert!(matches!(aplicar_edicao(&filtros(), "sair"), Edicao::Sair));
        assert!(matches!(
            aplicar_edicao(&filtros(), "xyz"),
            Edicao::Invalida(_)
        ));
    }

    #[test]
    fn limpar_volta_ao_padrao() {
        let Edicao::Atualiza(com_filtros) = aplicar_edicao(&filtros(), "origem Youtube") else {
            panic!("esperava atualização")
        };
        let Edicao::Atualiza(limpos) = aplicar_edicao(&com_filtros, "limpar") else {
            panic!("esperava atualização")
        };
        assert_eq!(limpos, DashboardFilters::default());
    }
}
