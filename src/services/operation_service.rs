// src/services/operation_service.rs

use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, OperationsRepository},
    models::auth::CurrentUser,
    models::operations::{
        document_total, Document, DocumentKind, DocumentLine, DocumentPayload,
    },
    services::document_service::next_document_number,
    services::finance_service::derive_payment_status,
    services::policy,
    services::stock_service::StockService,
};

fn write_permission(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Achat => "achats:write",
        DocumentKind::Vente => "ventes:write",
    }
}

fn read_permission(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Achat => "achats:read",
        DocumentKind::Vente => "ventes:read",
    }
}

#[derive(Clone)]
pub struct OperationService {
    operations_repo: OperationsRepository,
    finance_repo: FinanceRepository,
    stock_service: StockService,
}

impl OperationService {
    pub fn new(
        operations_repo: OperationsRepository,
        finance_repo: FinanceRepository,
        stock_service: StockService,
    ) -> Self {
        Self { operations_repo, finance_repo, stock_service }
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Vec<Document>, AppError> {
        policy::require(current, read_permission(kind))?;
        self.operations_repo.list_documents(&mut *conn, tenant_id, kind).await
    }

    /// Cria o documento com suas linhas E os efeitos de estoque na MESMA
    /// transação: numeração, cabeçalho, linhas e movimentos entram juntos
    /// ou não entram.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        kind: DocumentKind,
        payload: &DocumentPayload,
    ) -> Result<Document, AppError> {
        policy::require(current, write_permission(kind))?;

        let mut tx = conn.begin().await?;

        // 1. Numeração calculada dentro da transação do INSERT; a UNIQUE
        // (tenant_id, number) pega a corrida entre duas criações simultâneas.
        let existing = self
            .operations_repo
            .list_numbers(&mut *tx, tenant_id, kind)
            .await?;
        let number = next_document_number(&existing, kind.number_prefix());

        // 2. Cabeçalho
        let document = self
            .operations_repo
            .insert_document(
                &mut *tx,
                tenant_id,
                kind,
                &number,
                &payload.counterparty,
                payload.global_discount,
                current.user.id,
            )
            .await?;

        // 3. Linhas + efeito de estoque linha a linha
        for line_payload in &payload.lines {
            let line = self
                .operations_repo
                .insert_line(
                    &mut *tx,
                    tenant_id,
                    document.id,
                    &line_payload.product_name,
                    line_payload.quantity,
                    line_payload.unit_price,
                    line_payload.discount,
                    line_payload.expiry_date,
                    line_payload.lot_number.as_deref(),
                )
                .await?;

            self.apply_line_effect(&mut tx, tenant_id, kind, &line, &payload.counterparty)
                .await?;
        }

        tx.commit().await?;
        Ok(document)
    }

    /// Edição: desfaz o efeito das linhas antigas, substitui o conjunto de
    /// linhas, re-aplica os efeitos e re-deriva o status de pagamento (o
    /// total pode ter mudado). O número original é preservado.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        kind: DocumentKind,
        document_id: Uuid,
        payload: &DocumentPayload,
    ) -> Result<Document, AppError> {
        policy::require(current, write_permission(kind))?;

        let mut tx = conn.begin().await?;

        let existing = self
            .operations_repo
            .find_by_id(&mut *tx, tenant_id, document_id)
            .await?
            .filter(|d| d.kind == kind)
            .ok_or(AppError::NotFound("Documento"))?;

        // 1. Reverte o estoque das linhas atuais
        let old_lines = self
            .operations_repo
            .list_lines(&mut *tx, tenant_id, existing.id)
            .await?;
        for line in &old_lines {
            self.revert_line_effect(&mut tx, tenant_id, kind, line).await?;
        }

        // 2. Substitui as linhas por inteiro
        self.operations_repo
            .delete_lines(&mut *tx, tenant_id, existing.id)
            .await?;

        let document = self
            .operations_repo
            .update_document(
                &mut *tx,
                tenant_id,
                existing.id,
                &payload.counterparty,
                payload.global_discount,
            )
            .await?;

        let mut new_lines = Vec::with_capacity(payload.lines.len());
        for line_payload in &payload.lines {
            let line = self
                .operations_repo
                .insert_line(
                    &mut *tx,
                    tenant_id,
                    document.id,
                    &line_payload.product_name,
                    line_payload.quantity,
                    line_payload.unit_price,
                    line_payload.discount,
                    line_payload.expiry_date,
                    line_payload.lot_number.as_deref(),
                )
                .await?;

            self.apply_line_effect(&mut tx, tenant_id, kind, &line, &payload.counterparty)
                .await?;
            new_lines.push(line);
        }

        // 3. O total mudou: o status gravado precisa acompanhar
        let total = document_total(&new_lines, document.global_discount);
        let paid = self
            .finance_repo
            .sum_by_document(&mut *tx, tenant_id, document.id)
            .await?;
        let status = derive_payment_status(total, paid);
        self.operations_repo
            .set_payment_status(&mut *tx, tenant_id, document.id, status)
            .await?;

        tx.commit().await?;
        Ok(document)
    }

    /// Exclusão: reverte o estoque de cada linha e apaga o documento
    /// (linhas e pagamentos caem em cascata), tudo na mesma transação.
    pub async fn delete(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<(), AppError> {
        policy::require(current, write_permission(kind))?;

        let mut tx = conn.begin().await?;

        let existing = self
            .operations_repo
            .find_by_id(&mut *tx, tenant_id, document_id)
            .await?
            .filter(|d| d.kind == kind)
            .ok_or(AppError::NotFound("Documento"))?;

        let lines = self
            .operations_repo
            .list_lines(&mut *tx, tenant_id, existing.id)
            .await?;
        for line in &lines {
            self.revert_line_effect(&mut tx, tenant_id, kind, line).await?;
        }

        self.operations_repo
            .delete_document(&mut *tx, tenant_id, existing.id)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn apply_line_effect(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: Uuid,
        kind: DocumentKind,
        line: &DocumentLine,
        counterparty: &str,
    ) -> Result<(), AppError> {
        match kind {
            DocumentKind::Achat => {
                self.stock_service
                    .restock_from_line(&mut *tx, tenant_id, line, counterparty)
                    .await?;
            }
            DocumentKind::Vente => {
                self.stock_service
                    .deduct_from_line(&mut *tx, tenant_id, line)
                    .await?;
            }
        }
        Ok(())
    }

    async fn revert_line_effect(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        tenant_id: Uuid,
        kind: DocumentKind,
        line: &DocumentLine,
    ) -> Result<(), AppError> {
        match kind {
            DocumentKind::Achat => {
                self.stock_service
                    .revert_restock_from_line(&mut *tx, tenant_id, line)
                    .await
            }
            DocumentKind::Vente => {
                self.stock_service
                    .restore_from_line(&mut *tx, tenant_id, line)
                    .await
            }
        }
    }
}
