// src/services/export.rs

use std::fs;
use std::path::Path;

use crate::{common::error::AppError, models::dashboard::PendingLead};

const CABECALHO: [&str; 8] = [
    "Nome",
    "Telefone",
    "Email",
    "Data Criação",
    "Follow-up",
    "HubSpot",
    "NPS",
    "Status Validação",
];

// Todo campo sai entre aspas duplas; aspas internas são dobradas.
fn campo(valor: &str) -> String {
    format!("\"{}\"", valor.replace('"', "\"\""))
}

fn linha(lead: &PendingLead) -> String {
    let campos = [
        lead.nome.clone().unwrap_or_default(),
        lead.telefone.clone(),
        lead.email.clone().unwrap_or_default(),
        lead.data_criacao
            .map(|data| data.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_default(),
        lead.followup_status
            .map(|status| status.to_string())
            .unwrap_or_default(),
        if lead.criado_no_hubspot == Some(true) {
            "Sim".to_string()
        } else {
            "Não".to_string()
        },
        lead.nps_score
            .map(|score| score.to_string())
            .unwrap_or_default(),
        lead.validacao_status.rotulo().to_string(),
    ];
    campos
        .iter()
        .map(|valor| campo(valor))
        .collect::<Vec<_>>()
        .join(",")
}

// Exportação da tabela de leads da página corrente
pub fn leads_para_csv(leads: &[PendingLead]) -> String {
    let mut linhas = Vec::with_capacity(leads.len() + 1);
    linhas.push(
        CABECALHO
            .iter()
            .map(|titulo| campo(titulo))
            .collect::<Vec<_>>()
            .join(","),
    );
    linhas.extend(leads.iter().map(linha));
    let mut csv = linhas.join("\r\n");
    csv.push_str("\r\n");
    csv
}

pub fn exportar_para_arquivo(caminho: &Path, leads: &[PendingLead]) -> Result<(), AppError> {
    fs::write(caminho, leads_para_csv(leads))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::leads::ValidacaoStatus;
    use chrono::{TimeZone, Utc};

    fn lead(nome: &str) -> PendingLead {
        PendingLead {
            id: 1,
            nome: Some(nome.to_string()),
            telefone: "5511999990000".to_string(),
            email: Some("maria@exemplo.com".to_string()),
            data_criacao: Some(Utc.with_ymd_and_hms(2025, 3, 10, 14, 30, 0).unwrap()),
            origem: None,
            atividade: None,
            solucao: None,
            tamanho: None,
            followup_status: Some(2),
            criado_no_hubspot: Some(true),
            nps_score: Some(5),
            ultimo_tipo_msg: None,
            validacao_status: ValidacaoStatus::Validada,
            missing_stage: "Qualificado",
        }
    }

    // Leitor mínimo de uma linha CSV, só para o round-trip dos testes
    fn desfazer_linha(linha: &str) -> Vec<String> {
        let mut campos = Vec::new();
        let mut atual = String::new();
        let mut dentro = false;
        let mut caracteres = linha.chars().peekable();
        while let Some(c) = caracteres.next() {
            match c {
                '"' if !dentro => dentro = true,
                '"' if caracteres.peek() == Some(&'"') => {
                    caracteres.next();
                    atual.push('"');
                }
                '"' => dentro = false,
                ',' if !dentro => {
                    campos.push(std::mem::take(&mut atual));
                }
                outro => atual.push(outro),
            }
        }
        campos.push(atual);
        campos
    }

    #[test]
    fn cabecalho_na_primeira_linha() {
        let csv = leads_para_csv(&[]);
        assert_eq!(
            csv.lines().next().unwrap(),
            "\"Nome\",\"Telefone\",\"Email\",\"Data Criação\",\"Follow-up\",\"HubSpot\",\"NPS\",\"Status Validação\""
        );
    }

    #[test]
    fn aspas_internas_sao_dobradas_e_voltam_no_parse() {
        let original = r#"He said "hi""#;
        let csv = leads_para_csv(&[lead(original)]);
        let linha_do_lead = csv.lines().nth(1).unwrap();

        assert!(linha_do_lead.starts_with(r#""He said ""hi""""#));

        let campos = desfazer_linha(linha_do_lead);
        assert_eq!(campos[0], original);
        assert_eq!(campos[1], "5511999990000");
        assert_eq!(campos[5], "Sim");
        assert_eq!(campos[7], "Válida");
    }

    #[test]
    fn campos_ausentes_saem_vazios() {
        let mut sem_dados = lead("Maria");
        sem_dados.email = None;
        sem_dados.nps_score = None;
        sem_dados.followup_status = None;
        sem_dados.criado_no_hubspot = None;

        let csv = leads_para_csv(&[sem_dados]);
        let campos = desfazer_linha(csv.lines().nth(1).unwrap());
        assert_eq!(campos[2], "");
        assert_eq!(campos[4], "");
        assert_eq!(campos[5], "Não");
        assert_eq!(campos[6], "");
    }

    #[test]
    fn exporta_para_arquivo_no_caminho_dado() {
        let diretorio = tempfile::tempdir().unwrap();
        let caminho = diretorio.path().join("leads.csv");
        exportar_para_arquivo(&caminho, &[lead("Maria")]).unwrap();

        let conteudo = std::fs::read_to_string(&caminho).unwrap();
        assert!(conteudo.contains("\"Maria\""));
        assert_eq!(conteudo.lines().count(), 2);
    }
}
