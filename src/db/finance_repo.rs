// src/db/finance_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Payment, PaymentMode},
};

// Sem estado próprio: todo método recebe o executor de quem chama.
#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_by_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments
             WHERE tenant_id = $1 AND document_id = $2
             ORDER BY created_at ASC",
        )
        .bind(tenant_id)
        .bind(document_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    /// Soma dos pagamentos de um documento. COALESCE: sem pagamentos = 0.
    pub async fn sum_by_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0) FROM payments
             WHERE tenant_id = $1 AND document_id = $2",
        )
        .bind(tenant_id)
        .bind(document_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
        amount: Decimal,
        mode: PaymentMode,
        created_by: Uuid,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (tenant_id, document_id, amount, mode, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(document_id)
        .bind(amount)
        .bind(mode)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    /// Remove um pagamento e devolve o documento dele (o status do documento
    /// precisa ser recalculado em seguida, na mesma transação).
    pub async fn delete<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payment_id: Uuid,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "DELETE FROM payments WHERE tenant_id = $1 AND id = $2 RETURNING document_id",
        )
        .bind(tenant_id)
        .bind(payment_id)
        .fetch_optional(executor)
        .await?;
        row.map(|(id,)| id).ok_or(AppError::NotFound("Pagamento"))
    }
}
