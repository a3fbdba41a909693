// src/models/operations.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::finance::PaymentStatus;

// --- Enums ---

// Tipo do documento comercial: compra (fornecedor) ou venda (cliente).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Achat,
    Vente,
}

impl DocumentKind {
    // Prefixo da numeração: "ACH0012" para compras, "FACT0005" para vendas.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Achat => "ACH",
            DocumentKind::Vente => "FACT",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub kind: DocumentKind,

    #[schema(example = "FACT0005")]
    pub number: String,

    // Fornecedor (achat) ou cliente (vente)
    #[schema(example = "Grossiste Pharma SARL")]
    pub counterparty: String,

    #[schema(example = "0.00")]
    pub global_discount: Decimal,

    // Regravado a cada inclusão/remoção de pagamento, nunca calculado na leitura
    pub payment_status: PaymentStatus,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLine {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub document_id: Uuid,

    #[schema(example = "Amoxicilline 1g")]
    pub product_name: String,
    #[schema(example = "10.0")]
    pub quantity: Decimal,
    #[schema(example = "3.20")]
    pub unit_price: Decimal,
    #[schema(example = "0.00")]
    pub discount: Decimal,
    #[schema(value_type = Option<String>, format = Date, example = "2027-06-30")]
    pub expiry_date: Option<NaiveDate>,

    // Compras podem informar o lote recebido (estoque multi-lote)
    pub lot_number: Option<String>,
}

// Documento + linhas + valores derivados, para as telas de detalhe e impressão
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub header: Document,
    pub lines: Vec<DocumentLine>,
    #[schema(example = "100.00")]
    pub total: Decimal,
    #[schema(example = "40.00")]
    pub total_paid: Decimal,
}

// ---
// Payloads (entrada da API)
// ---

pub(crate) fn validate_not_negative(
    value: &Decimal,
) -> Result<(), validator::ValidationError> {
    if value.is_sign_negative() {
        return Err(validator::ValidationError::new("negative")
            .with_message("O valor não pode ser negativo.".into()));
    }
    Ok(())
}

fn validate_positive(value: &Decimal) -> Result<(), validator::ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(validator::ValidationError::new("not_positive")
            .with_message("O valor deve ser maior que zero.".into()));
    }
    Ok(())
}

// Serialize também: a validação de comprimento de `DocumentPayload::lines`
// serializa o valor recusado para os detalhes do erro.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentLinePayload {
    #[validate(length(min = 1, message = "O nome do produto é obrigatório."))]
    pub product_name: String,
    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,
    #[validate(custom(function = validate_not_negative))]
    pub unit_price: Decimal,
    #[serde(default)]
    #[validate(custom(function = validate_not_negative))]
    pub discount: Decimal,
    pub expiry_date: Option<NaiveDate>,
    pub lot_number: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    #[validate(length(min = 1, message = "O fornecedor/cliente é obrigatório."))]
    pub counterparty: String,
    #[serde(default)]
    #[validate(custom(function = validate_not_negative))]
    pub global_discount: Decimal,
    #[validate(length(min = 1, message = "O documento precisa de ao menos uma linha."))]
    #[validate(nested)]
    pub lines: Vec<DocumentLinePayload>,
}

// ---
// Totais derivados
// ---
// Os totais NUNCA são a cópia canônica: esta é a única função de cálculo,
// reutilizada por listagem, pagamentos, impressão e dashboard.

pub fn line_total(line: &DocumentLine) -> Decimal {
    let total = line.quantity * line.unit_price - line.discount;
    total.max(Decimal::ZERO)
}

pub fn document_total(lines: &[DocumentLine], global_discount: Decimal) -> Decimal {
    let sum: Decimal = lines.iter().map(line_total).sum();
    (sum - global_discount).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(qty: &str, price: &str, discount: &str) -> DocumentLine {
        DocumentLine {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            product_name: "Doliprane".into(),
            quantity: qty.parse().unwrap(),
            unit_price: price.parse().unwrap(),
            discount: discount.parse().unwrap(),
            expiry_date: None,
            lot_number: None,
        }
    }

    #[test]
    fn total_de_linha_aplica_desconto() {
        let l = line("10", "3.20", "2.00");
        assert_eq!(line_total(&l), dec("30.00"));
    }

    #[test]
    fn total_de_linha_nunca_negativo() {
        let l = line("1", "2.00", "5.00");
        assert_eq!(line_total(&l), Decimal::ZERO);
    }

    #[test]
    fn total_do_documento_soma_linhas_e_desconto_global() {
        let lines = vec![line("10", "3.20", "0"), line("5", "2.00", "0")];
        assert_eq!(document_total(&lines, dec("2.00")), dec("40.00"));
    }

    #[test]
    fn total_do_documento_com_desconto_maior_que_soma_vai_a_zero() {
        let lines = vec![line("1", "1.00", "0")];
        assert_eq!(document_total(&lines, dec("10.00")), Decimal::ZERO);
    }

    #[test]
    fn payload_sem_linhas_e_recusado_na_validacao() {
        let payload = DocumentPayload {
            counterparty: "Client comptoir".into(),
            global_discount: Decimal::ZERO,
            lines: vec![],
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("lines"));
    }

    #[test]
    fn payload_com_linha_valida_passa() {
        let payload = DocumentPayload {
            counterparty: "Grossiste Pharma SARL".into(),
            global_discount: Decimal::ZERO,
            lines: vec![DocumentLinePayload {
                product_name: "Doliprane".into(),
                quantity: dec("10"),
                unit_price: dec("3.20"),
                discount: Decimal::ZERO,
                expiry_date: None,
                lot_number: None,
            }],
        };
        assert!(payload.validate().is_ok());
    }
}
