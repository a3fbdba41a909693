// src/db/operations_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::PaymentStatus,
    models::operations::{Document, DocumentKind, DocumentLine},
};

// Sem estado próprio: todo método recebe o executor de quem chama.
#[derive(Clone, Default)]
pub struct OperationsRepository;

impl OperationsRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Funções de "Leitura" (Getters)
    // ---

    pub async fn list_documents<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents
             WHERE tenant_id = $1 AND kind = $2
             ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .bind(kind)
        .fetch_all(executor)
        .await?;
        Ok(documents)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(document_id)
        .fetch_optional(executor)
        .await?;
        Ok(document)
    }

    /// Números já atribuídos para um tipo de documento. A numeração nova é
    /// calculada em cima desta lista (máximo existente + 1), na mesma
    /// transação do INSERT.
    pub async fn list_numbers<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: DocumentKind,
    ) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT number FROM documents WHERE tenant_id = $1 AND kind = $2",
        )
        .bind(tenant_id)
        .bind(kind)
        .fetch_all(executor)
        .await?;
        Ok(rows.into_iter().map(|(n,)| n).collect())
    }

    pub async fn list_lines<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<Vec<DocumentLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, DocumentLine>(
            "SELECT * FROM document_lines
             WHERE tenant_id = $1 AND document_id = $2
             ORDER BY product_name ASC",
        )
        .bind(tenant_id)
        .bind(document_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    /// Documentos de um tipo criados em um dia (cartão "vendas de hoje").
    pub async fn list_documents_for_day<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: DocumentKind,
        day: NaiveDate,
    ) -> Result<Vec<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents
             WHERE tenant_id = $1 AND kind = $2 AND created_at::date = $3
             ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(day)
        .fetch_all(executor)
        .await?;
        Ok(documents)
    }

    /// Vendas ainda não quitadas (status 'impayé' ou 'partiel').
    pub async fn count_unpaid_sales<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM documents
             WHERE tenant_id = $1 AND kind = $2 AND payment_status <> $3",
        )
        .bind(tenant_id)
        .bind(DocumentKind::Vente)
        .bind(PaymentStatus::Paye)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    pub async fn insert_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        kind: DocumentKind,
        number: &str,
        counterparty: &str,
        global_discount: Decimal,
        created_by: Uuid,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents
                (tenant_id, kind, number, counterparty, global_discount, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(kind)
        .bind(number)
        .bind(counterparty)
        .bind(global_discount)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(number.to_string());
                }
            }
            e.into()
        })
    }

    /// Atualiza o cabeçalho mantendo o número original do documento.
    pub async fn update_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
        counterparty: &str,
        global_discount: Decimal,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents
            SET counterparty = $3, global_discount = $4, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(document_id)
        .bind(counterparty)
        .bind(global_discount)
        .fetch_optional(executor)
        .await?;
        document.ok_or(AppError::NotFound("Documento"))
    }

    pub async fn set_payment_status<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
        status: PaymentStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE documents SET payment_status = $3, updated_at = NOW()
             WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(document_id)
        .bind(status)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// As linhas e pagamentos caem junto via ON DELETE CASCADE.
    pub async fn delete_document<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM documents WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(document_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Documento"));
        }
        Ok(())
    }

    pub async fn insert_line<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
        product_name: &str,
        quantity: Decimal,
        unit_price: Decimal,
        discount: Decimal,
        expiry_date: Option<NaiveDate>,
        lot_number: Option<&str>,
    ) -> Result<DocumentLine, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let line = sqlx::query_as::<_, DocumentLine>(
            r#"
            INSERT INTO document_lines
                (tenant_id, document_id, product_name, quantity, unit_price,
                 discount, expiry_date, lot_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(document_id)
        .bind(product_name)
        .bind(quantity)
        .bind(unit_price)
        .bind(discount)
        .bind(expiry_date)
        .bind(lot_number)
        .fetch_one(executor)
        .await?;
        Ok(line)
    }

    /// Na edição, o conjunto de linhas é substituído por inteiro (apaga e
    /// reinsere), sempre dentro da transação que também reverte o estoque.
    pub async fn delete_lines<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        document_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM document_lines WHERE tenant_id = $1 AND document_id = $2")
            .bind(tenant_id)
            .bind(document_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
