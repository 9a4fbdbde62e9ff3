// src/presentation/charts.rs

use crate::models::dashboard::{
    DistribuicaoAvaliacao, FunnelStage, IaVsHuman, ValidationStatusEntry,
};

const LARGURA_BARRA: usize = 30;

fn barra(quantidade: u64, maximo: u64) -> String {
    if maximo == 0 {
        return String::new();
    }
    let preenchido = ((quantidade as f64 / maximo as f64) * LARGURA_BARRA as f64).round() as usize;
    "█".repeat(preenchido.min(LARGURA_BARRA))
}

// Barras horizontais do status de validação (Pendente / Inválida / Válida)
pub fn grafico_validacao(entradas: &[ValidationStatusEntry]) -> String {
    let maximo = entradas.iter().map(|e| e.count).max().unwrap_or(0);
    entradas
        .iter()
        .map(|entrada| {
            format!(
                "  {:<10} {:>5}  {}",
                entrada.status,
                entrada.count,
                barra(entrada.count, maximo)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// Distribuição de avaliações por nota (1 a 5)
pub fn grafico_avaliacoes(distribuicao: &[DistribuicaoAvaliacao]) -> String {
    let maximo = distribuicao.iter().map(|d| d.quantidade).max().unwrap_or(0);
    distribuicao
        .iter()
        .map(|entrada| {
            format!(
                "  nota {}  {:>5}  {}",
                entrada.score,
                entrada.quantidade,
                barra(entrada.quantidade, maximo)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn grafico_funil(etapas: &[FunnelStage]) -> String {
    let maximo = etapas.iter().map(|e| e.count).max().unwrap_or(0);
    etapas
        .iter()
        .map(|etapa| {
            format!(
                "  {:<20} {:>6} ({:.1}%)  {}",
                etapa.stage,
                etapa.count,
                etapa.rate,
                barra(etapa.count, maximo)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn grafico_ia_vs_human(contagens: &IaVsHuman) -> String {
    let maximo = contagens.ia.max(contagens.human);
    [
        format!("  {:<8} {:>5}  {}", "IA", contagens.ia, barra(contagens.ia, maximo)),
        format!(
            "  {:<8} {:>5}  {}",
            "Humano",
            contagens.human,
            barra(contagens.human, maximo)
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barra_escala_pelo_maximo() {
        assert_eq!(barra(30, 30).chars().count(), LARGURA_BARRA);
        assert_eq!(barra(15, 30).chars().count(), LARGURA_BARRA / 2);
        assert_eq!(barra(0, 30), "");
        assert_eq!(barra(5, 0), "");
    }

    #[test]
    fn grafico_de_validacao_lista_os_tres_status() {
        let entradas = vec![
            ValidationStatusEntry {
                status: "Pendente",
                count: 8,
                color: "#F59E0B",
            },
            ValidationStatusEntry {
                status: "Inválida",
                count: 2,
                color: "#EF4444",
            },
            ValidationStatusEntry {
                status: "Válida",
                count: 4,
                color: "#10B981",
            },
        ];
        let texto = grafico_validacao(&entradas);
        assert_eq!(texto.lines().count(), 3);
        assert!(texto.contains("Pendente"));
        assert!(texto.contains("Válida"));
    }

    #[test]
    fn grafico_de_avaliacoes_uma_linha_por_nota() {
        let distribuicao: Vec<DistribuicaoAvaliacao> = (1..=5)
            .map(|score| DistribuicaoAvaliacao {
                score,
                quantidade: 0,
            })
            .collect();
        assert_eq!(grafico_avaliacoes(&distribuicao).lines().count(), 5);
    }
}
