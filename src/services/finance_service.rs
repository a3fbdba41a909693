// src/services/finance_service.rs

use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{FinanceRepository, OperationsRepository},
    models::auth::CurrentUser,
    models::finance::{Payment, PaymentPayload, PaymentStatus},
    models::operations::document_total,
    services::policy,
};

/// Classificação total (pago, total) -> status, regravada no documento a
/// cada mudança de pagamento. Pagamento acima do total nunca chega aqui:
/// é recusado antes da escrita.
pub fn derive_payment_status(total: Decimal, paid: Decimal) -> PaymentStatus {
    if paid <= Decimal::ZERO {
        PaymentStatus::Impaye
    } else if paid < total {
        PaymentStatus::Partiel
    } else {
        PaymentStatus::Paye
    }
}

/// A soma dos pagamentos jamais ultrapassa o total: o excedente é recusado
/// aqui, antes de qualquer escrita. Fechar o saldo exato é permitido.
pub fn ensure_within_total(
    total: Decimal,
    paid: Decimal,
    amount: Decimal,
) -> Result<(), AppError> {
    if paid + amount > total {
        return Err(AppError::PaymentExceedsBalance);
    }
    Ok(())
}

#[derive(Clone)]
pub struct FinanceService {
    finance_repo: FinanceRepository,
    operations_repo: OperationsRepository,
}

impl FinanceService {
    pub fn new(finance_repo: FinanceRepository, operations_repo: OperationsRepository) -> Self {
        Self { finance_repo, operations_repo }
    }

    pub async fn list_payments(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<Vec<Payment>, AppError> {
        policy::require(current, "paiements:read")?;
        self.finance_repo
            .list_by_document(&mut *conn, tenant_id, document_id)
            .await
    }

    /// Registra um pagamento e regrava o status do documento, na mesma
    /// transação. A soma dos pagamentos jamais ultrapassa o total: o
    /// excedente é recusado ANTES de qualquer escrita.
    pub async fn add_payment(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        document_id: Uuid,
        payload: &PaymentPayload,
    ) -> Result<Payment, AppError> {
        policy::require(current, "paiements:write")?;

        let mut tx = conn.begin().await?;

        let document = self
            .operations_repo
            .find_by_id(&mut *tx, tenant_id, document_id)
            .await?
            .ok_or(AppError::NotFound("Documento"))?;

        let lines = self
            .operations_repo
            .list_lines(&mut *tx, tenant_id, document.id)
            .await?;
        let total = document_total(&lines, document.global_discount);
        let paid = self
            .finance_repo
            .sum_by_document(&mut *tx, tenant_id, document.id)
            .await?;

        ensure_within_total(total, paid, payload.amount)?;

        let payment = self
            .finance_repo
            .insert(
                &mut *tx,
                tenant_id,
                document.id,
                payload.amount,
                payload.mode,
                current.user.id,
            )
            .await?;

        let status = derive_payment_status(total, paid + payload.amount);
        self.operations_repo
            .set_payment_status(&mut *tx, tenant_id, document.id, status)
            .await?;

        tx.commit().await?;
        Ok(payment)
    }

    /// Remove um pagamento e re-deriva o status do documento afetado.
    pub async fn delete_payment(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        payment_id: Uuid,
    ) -> Result<(), AppError> {
        policy::require(current, "paiements:write")?;

        let mut tx = conn.begin().await?;

        let document_id = self.finance_repo.delete(&mut *tx, tenant_id, payment_id).await?;

        let document = self
            .operations_repo
            .find_by_id(&mut *tx, tenant_id, document_id)
            .await?
            .ok_or(AppError::NotFound("Documento"))?;
        let lines = self
            .operations_repo
            .list_lines(&mut *tx, tenant_id, document.id)
            .await?;
        let total = document_total(&lines, document.global_discount);
        let paid = self
            .finance_repo
            .sum_by_document(&mut *tx, tenant_id, document.id)
            .await?;

        let status = derive_payment_status(total, paid);
        self.operations_repo
            .set_payment_status(&mut *tx, tenant_id, document.id, status)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn sem_pagamento_fica_impaye() {
        assert_eq!(derive_payment_status(dec("100"), Decimal::ZERO), PaymentStatus::Impaye);
    }

    #[test]
    fn pagamento_parcial_fica_partiel() {
        assert_eq!(derive_payment_status(dec("100"), dec("40")), PaymentStatus::Partiel);
    }

    #[test]
    fn pagamento_exato_fica_paye() {
        assert_eq!(derive_payment_status(dec("100"), dec("100.00")), PaymentStatus::Paye);
    }

    #[test]
    fn documento_de_total_zero_sem_pagamentos_fica_impaye() {
        assert_eq!(derive_payment_status(Decimal::ZERO, Decimal::ZERO), PaymentStatus::Impaye);
    }

    #[test]
    fn pagamento_acima_do_saldo_e_recusado() {
        assert!(matches!(
            ensure_within_total(dec("100"), dec("60"), dec("50")),
            Err(AppError::PaymentExceedsBalance)
        ));
    }

    #[test]
    fn pagamento_que_fecha_o_saldo_exato_e_aceito() {
        assert!(ensure_within_total(dec("100"), dec("60"), dec("40")).is_ok());
    }

    #[test]
    fn qualquer_pagamento_sobre_total_zero_e_recusado() {
        assert!(matches!(
            ensure_within_total(Decimal::ZERO, Decimal::ZERO, dec("0.01")),
            Err(AppError::PaymentExceedsBalance)
        ));
    }
}
