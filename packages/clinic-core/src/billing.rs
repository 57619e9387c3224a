//! Cobrança da consulta
//!
//! Total = taxa fixa da consulta + preço do exame selecionado (zero quando nenhum).
//! Valores em rúpias inteiras.

use serde::Serialize;

use crate::error::{ClinicError, Result};

/// Taxa fixa da consulta
pub const CONSULTATION_FEE: u32 = 500;

/// Tabela de preços dos exames laboratoriais
pub const PRICE_TABLE: &[(&str, u32)] = &[
    ("Blood Test", 300),
    ("Kidney Test", 500),
    ("Liver Function Test", 700),
    ("Thyroid Profile", 450),
    ("Lipid Profile", 600),
    ("Urine Analysis", 200),
    ("X-Ray", 800),
];

/// Preço de um exame pelo nome exato
pub fn test_price(name: &str) -> Option<u32> {
    PRICE_TABLE
        .iter()
        .find(|(test, _)| *test == name)
        .map(|(_, price)| *price)
}

/// Total a cobrar para o exame selecionado
pub fn total(selected: Option<&str>) -> Result<u32> {
    Ok(breakdown(selected)?.total)
}

/// Detalhamento da cobrança exibido no formulário
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingBreakdown {
    pub consultation_fee: u32,
    pub test_price: u32,
    pub total: u32,
}

pub fn breakdown(selected: Option<&str>) -> Result<BillingBreakdown> {
    let test_price = match selected {
        None => 0,
        Some(name) => test_price(name).ok_or_else(|| ClinicError::UnknownTest(name.to_string()))?,
    };
    Ok(BillingBreakdown {
        consultation_fee: CONSULTATION_FEE,
        test_price,
        total: CONSULTATION_FEE + test_price,
    })
}
