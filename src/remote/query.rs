// src/remote/query.rs

// Construtor de consultas para a API de tabelas do serviço hospedado.
// Cobre exatamente o subconjunto de predicados que o painel usa:
// eq, in, gte, lte, order, range e contagem exata. Qualquer backend com
// essa semântica de filtro/paginação/contagem serve.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordenacao {
    Asc,
    Desc,
}

impl Ordenacao {
    fn sufixo(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    select: String,
    filtros: Vec<(String, String)>,
    ordenacao: Option<(String, Ordenacao)>,
    intervalo: Option<(u64, u64)>,
    contagem_exata: bool,
}

impl TableQuery {
    pub fn select(colunas: &str) -> Self {
        Self {
            select: colunas.to_string(),
            filtros: Vec::new(),
            ordenacao: None,
            intervalo: None,
            contagem_exata: false,
        }
    }

    pub fn eq(mut self, coluna: &str, valor: impl Display) -> Self {
        self.filtros.push((coluna.to_string(), format!("eq.{valor}")));
        self
    }

    // Predicado "valor no conjunto". Os valores são citados um a um porque
    // as opções do painel carregam vírgulas e parênteses.
    pub fn in_set(mut self, coluna: &str, valores: &[String]) -> Self {
        let citados: Vec<String> = valores
            .iter()
            .map(|v| format!("\"{}\"", v.replace('"', "\\\"")))
            .collect();
        self.filtros
            .push((coluna.to_string(), format!("in.({})", citados.join(","))));
        self
    }

    pub fn gte(mut self, coluna: &str, valor: impl Display) -> Self {
        self.filtros.push((coluna.to_string(), format!("gte.{valor}")));
        self
    }

    pub fn lte(mut self, coluna: &str, valor: impl Display) -> Self {
        self.filtros.push((coluna.to_string(), format!("lte.{valor}")));
        self
    }

    pub fn order(mut self, coluna: &str, ordenacao: Ordenacao) -> Self {
        self.ordenacao = Some((coluna.to_string(), ordenacao));
        self
    }

    // Intervalo inclusivo de linhas; vira o cabeçalho Range da requisição
    pub fn range(mut self, de: u64, ate: u64) -> Self {
        self.intervalo = Some((de, ate));
        self
    }

    // Pede o total exato do conjunto filtrado junto com a página
    pub fn com_contagem_exata(mut self) -> Self {
        self.contagem_exata = true;
        self
    }

    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select.clone())];
        params.extend(self.filtros.iter().cloned());
        if let Some((coluna, ordenacao)) = &self.ordenacao {
            params.push((
                "order".to_string(),
                format!("{coluna}.{}", ordenacao.sufixo()),
            ));
        }
        params
    }

    pub fn range_header(&self) -> Option<String> {
        self.intervalo.map(|(de, ate)| format!("{de}-{ate}"))
    }

    pub fn prefer_header(&self) -> Option<&'static str> {
        self.contagem_exata.then_some("count=exact")
    }

    // Só os predicados, para PATCHes que reusam o construtor como alvo
    pub fn filtros(&self) -> &[(String, String)] {
        &self.filtros
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consulta_basica_so_tem_select() {
        let consulta = TableQuery::select("*");
        assert_eq!(consulta.params(), vec![("select".to_string(), "*".to_string())]);
        assert_eq!(consulta.range_header(), None);
        assert_eq!(consulta.prefer_header(), None);
    }

    #[test]
    fn predicados_acumulam_na_ordem() {
        let consulta = TableQuery::select("telefone, validada")
            .eq("criado_no_hubspot", true)
            .gte("data_criacao", "2025-01-01T00:00:00.000Z")
            .order("created_at", Ordenacao::Asc);
        let params = consulta.params();
        assert!(params.contains(&("criado_no_hubspot".to_string(), "eq.true".to_string())));
        assert!(params.contains(&(
            "data_criacao".to_string(),
            "gte.2025-01-01T00:00:00.000Z".to_string()
        )));
        assert_eq!(
            params.last().unwrap(),
            &("order".to_string(), "created_at.asc".to_string())
        );
    }

    #[test]
    fn in_set_cita_valores_com_virgula() {
        let consulta = TableQuery::select("*").in_set(
            "origem",
            &[
                "Busca no Google".to_string(),
                "Redes sociais (LinkedIn, Instagram...)".to_string(),
            ],
        );
        let params = consulta.params();
        assert_eq!(
            params[1],
            (
                "origem".to_string(),
                "in.(\"Busca no Google\",\"Redes sociais (LinkedIn, Instagram...)\")".to_string()
            )
        );
    }

    #[test]
    fn paginacao_vira_cabecalho_range() {
        let consulta = TableQuery::select("*").range(200, 249).com_contagem_exata();
        assert_eq!(consulta.range_header(), Some("200-249".to_string()));
        assert_eq!(consulta.prefer_header(), Some("count=exact"));
    }
}
