// src/services/document_service.rs

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, OperationsRepository, TenancyRepository},
    models::operations::{document_total, line_total, DocumentDetail, DocumentKind},
    models::tenancy::Societe,
};

// ---
// Numeração
// ---

/// Próximo número da sequência: maior sufixo numérico existente + 1, com
/// 4 dígitos. Furos na sequência NÃO são reaproveitados: {1, 2, 4} gera 5.
pub fn next_document_number(existing: &[String], prefix: &str) -> String {
    let max = existing
        .iter()
        .filter_map(|n| n.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:04}", prefix, max + 1)
}

#[derive(Clone)]
pub struct DocumentService {
    operations_repo: OperationsRepository,
    finance_repo: FinanceRepository,
    tenancy_repo: TenancyRepository,
}

impl DocumentService {
    pub fn new(
        operations_repo: OperationsRepository,
        finance_repo: FinanceRepository,
        tenancy_repo: TenancyRepository,
    ) -> Self {
        Self { operations_repo, finance_repo, tenancy_repo }
    }

    /// Monta a visão completa de um documento: cabeçalho, linhas e os dois
    /// valores derivados (total calculado e soma dos pagamentos).
    pub async fn get_detail(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<DocumentDetail, AppError> {
        let header = self
            .operations_repo
            .find_by_id(&mut *conn, tenant_id, document_id)
            .await?
            .ok_or(AppError::NotFound("Documento"))?;

        let lines = self
            .operations_repo
            .list_lines(&mut *conn, tenant_id, document_id)
            .await?;
        let total = document_total(&lines, header.global_discount);
        let total_paid = self
            .finance_repo
            .sum_by_document(&mut *conn, tenant_id, document_id)
            .await?;

        Ok(DocumentDetail { header, lines, total, total_paid })
    }

    /// Versão imprimível de uma fatura: um documento HTML completo e
    /// autocontido (estilos embutidos), pronto para o diálogo de impressão.
    pub async fn render_print(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<String, AppError> {
        let detail = self.get_detail(&mut *conn, tenant_id, document_id).await?;
        let societe = self
            .tenancy_repo
            .find_by_id(&mut *conn, tenant_id)
            .await?
            .ok_or(AppError::NotFound("Farmácia"))?;

        Ok(render_invoice_html(&societe, &detail))
    }
}

// ---
// Impressão
// ---

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_invoice_html(societe: &Societe, detail: &DocumentDetail) -> String {
    let title = match detail.header.kind {
        DocumentKind::Achat => "Bon d'achat",
        DocumentKind::Vente => "Facture",
    };
    let balance = (detail.total - detail.total_paid).max(Decimal::ZERO);

    let mut rows = String::new();
    for line in &detail.lines {
        rows.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            escape_html(&line.product_name),
            line.quantity,
            line.unit_price,
            line.discount,
            line_total(line),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<title>{title} {number}</title>
<style>
  body {{ font-family: sans-serif; margin: 2em; color: #222; }}
  h1 {{ font-size: 1.4em; }}
  table {{ width: 100%; border-collapse: collapse; margin-top: 1em; }}
  th, td {{ border: 1px solid #999; padding: 6px 10px; text-align: left; }}
  td.num, th.num {{ text-align: right; }}
  .totals {{ margin-top: 1em; text-align: right; }}
  .totals p {{ margin: 2px 0; }}
  @media print {{ body {{ margin: 0; }} }}
</style>
</head>
<body>
<h1>{societe_name}</h1>
<p>{societe_address}</p>
<h2>{title} {number}</h2>
<p>{counterparty_label} : {counterparty}<br>Date : {date}</p>
<table>
<thead>
<tr><th>Produit</th><th class="num">Quantité</th><th class="num">Prix unitaire</th>
<th class="num">Remise</th><th class="num">Total</th></tr>
</thead>
<tbody>
{rows}</tbody>
</table>
<div class="totals">
<p>Remise globale : {global_discount}</p>
<p><strong>Total : {total}</strong></p>
<p>Payé : {total_paid}</p>
<p>Reste à payer : {balance}</p>
<p>Statut : {status}</p>
</div>
</body>
</html>
"#,
        title = title,
        number = escape_html(&detail.header.number),
        societe_name = escape_html(&societe.name),
        societe_address = escape_html(societe.address.as_deref().unwrap_or("")),
        counterparty_label = match detail.header.kind {
            DocumentKind::Achat => "Fournisseur",
            DocumentKind::Vente => "Client",
        },
        counterparty = escape_html(&detail.header.counterparty),
        date = detail.header.created_at.format("%d/%m/%Y"),
        rows = rows,
        global_discount = detail.header.global_discount,
        total = detail.total,
        total_paid = detail.total_paid,
        balance = balance,
        status = detail.header.payment_status.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn primeiro_numero_da_sequencia() {
        assert_eq!(next_document_number(&[], "FACT"), "FACT0001");
    }

    #[test]
    fn usa_o_maximo_mais_um_sem_reaproveitar_furos() {
        let existing = numbers(&["FACT0001", "FACT0002", "FACT0004"]);
        assert_eq!(next_document_number(&existing, "FACT"), "FACT0005");
    }

    #[test]
    fn ignora_numeros_de_outro_prefixo_ou_malformados() {
        let existing = numbers(&["ACH0009", "FACT0002", "FACTXXXX"]);
        assert_eq!(next_document_number(&existing, "FACT"), "FACT0003");
    }

    #[test]
    fn sequencia_passa_de_9999_sem_truncar() {
        let existing = numbers(&["FACT9999"]);
        assert_eq!(next_document_number(&existing, "FACT"), "FACT10000");
    }
}
