// src/services/stock_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StockRepository,
    models::auth::CurrentUser,
    models::operations::DocumentLine,
    models::stock::{StockItem, StockLot},
    services::policy,
};

/// Limiar de reposição atribuído quando uma compra cria o produto.
fn default_threshold() -> Decimal {
    Decimal::from(5)
}

// ---
// Transições de estoque (puras)
// ---
// Cada tipo de movimento é uma função total sobre o item carregado; as
// escritas no banco acontecem depois, na transação do documento.

/// Compra de um produto já cadastrado: soma a quantidade e sobrescreve
/// preço de compra e validade com os valores da linha, inclusive quando a
/// linha não traz validade.
pub fn apply_restock(
    item: &mut StockItem,
    quantity: Decimal,
    purchase_price: Decimal,
    expiry_date: Option<NaiveDate>,
) {
    item.quantity += quantity;
    item.purchase_price = purchase_price;
    item.expiry_date = expiry_date;
}

/// Desfazer de uma compra: nunca deixa a quantidade negativa, mesmo que
/// parte do lote já tenha sido vendida.
pub fn apply_purchase_reversal(item: &mut StockItem, quantity: Decimal) {
    item.quantity = (item.quantity - quantity).max(Decimal::ZERO);
}

/// Venda: recusa explicitamente se não há quantidade suficiente.
pub fn apply_sale(item: &mut StockItem, quantity: Decimal) -> Result<(), AppError> {
    if item.quantity < quantity {
        return Err(AppError::InsufficientStock(item.product_name.clone()));
    }
    item.quantity -= quantity;
    Ok(())
}

/// Desfazer de uma venda: devolve a quantidade ao estoque.
pub fn apply_sale_reversal(item: &mut StockItem, quantity: Decimal) {
    item.quantity += quantity;
}

#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
}

impl StockService {
    pub fn new(stock_repo: StockRepository) -> Self {
        Self { stock_repo }
    }

    // ---
    // Consultas (telas de estoque)
    // ---

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
    ) -> Result<Vec<StockItem>, AppError> {
        self.stock_repo.list_items(&mut *conn, tenant_id).await
    }

    pub async fn detail(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        item_id: Uuid,
    ) -> Result<(StockItem, Vec<StockLot>), AppError> {
        let item = self
            .stock_repo
            .find_item_by_id(&mut *conn, tenant_id, item_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;
        let lots = self.stock_repo.list_lots(&mut *conn, tenant_id, item.id).await?;
        Ok((item, lots))
    }

    /// Ajustes manuais do item: limiar de reposição e preço de venda.
    /// A quantidade NÃO é editável por aqui: ela só muda via documentos.
    pub async fn configure_item(
        &self,
        conn: &mut PgConnection,
        current: &CurrentUser,
        tenant_id: Uuid,
        item_id: Uuid,
        low_stock_threshold: Option<Decimal>,
        sale_price: Option<Decimal>,
    ) -> Result<StockItem, AppError> {
        policy::require(current, "stock:write")?;

        let mut item = self
            .stock_repo
            .find_item_by_id(&mut *conn, tenant_id, item_id)
            .await?
            .ok_or(AppError::NotFound("Produto"))?;

        if let Some(threshold) = low_stock_threshold {
            item.low_stock_threshold = threshold;
        }
        if sale_price.is_some() {
            item.sale_price = sale_price;
        }

        let mut tx = conn.begin().await?;
        let updated = self.stock_repo.update_item(&mut *tx, &item).await?;
        tx.commit().await?;
        Ok(updated)
    }

    // ---
    // Efeitos dos documentos (chamados DENTRO da transação do documento)
    // ---

    /// Entrada por linha de compra: cria o produto na primeira vez (limiar
    /// padrão 5) ou mescla no registro existente. Se a linha traz número de
    /// lote, registra também a entrada multi-lote.
    pub async fn restock_from_line(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        line: &DocumentLine,
        supplier: &str,
    ) -> Result<StockItem, AppError> {
        let existing = self
            .stock_repo
            .find_item_for_update(&mut *conn, tenant_id, &line.product_name)
            .await?;

        let item = match existing {
            Some(mut item) => {
                apply_restock(&mut item, line.quantity, line.unit_price, line.expiry_date);
                self.stock_repo.update_item(&mut *conn, &item).await?
            }
            None => {
                self.stock_repo
                    .insert_item(
                        &mut *conn,
                        tenant_id,
                        &line.product_name,
                        line.quantity,
                        line.unit_price,
                        None,
                        line.expiry_date,
                        default_threshold(),
                    )
                    .await?
            }
        };

        if let Some(lot_number) = line.lot_number.as_deref() {
            self.stock_repo
                .insert_lot(
                    &mut *conn,
                    tenant_id,
                    item.id,
                    lot_number,
                    Some(supplier),
                    line.quantity,
                    line.expiry_date,
                )
                .await?;
        }

        Ok(item)
    }

    /// Desfaz a entrada de uma linha de compra (edição/exclusão do achat).
    /// Produto que desapareceu do estoque é ignorado em silêncio: não há o
    /// que reverter.
    pub async fn revert_restock_from_line(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        line: &DocumentLine,
    ) -> Result<(), AppError> {
        if let Some(mut item) = self
            .stock_repo
            .find_item_for_update(&mut *conn, tenant_id, &line.product_name)
            .await?
        {
            apply_purchase_reversal(&mut item, line.quantity);
            self.stock_repo.update_item(&mut *conn, &item).await?;
        }
        Ok(())
    }

    /// Saída por linha de venda. Produto inexistente ou quantidade
    /// insuficiente abortam a transação inteira do documento.
    pub async fn deduct_from_line(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        line: &DocumentLine,
    ) -> Result<StockItem, AppError> {
        let mut item = self
            .stock_repo
            .find_item_for_update(&mut *conn, tenant_id, &line.product_name)
            .await?
            .ok_or_else(|| AppError::InsufficientStock(line.product_name.clone()))?;

        apply_sale(&mut item, line.quantity)?;
        self.stock_repo.update_item(&mut *conn, &item).await
    }

    /// Devolve ao estoque a linha de uma venda desfeita.
    pub async fn restore_from_line(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        line: &DocumentLine,
    ) -> Result<(), AppError> {
        match self
            .stock_repo
            .find_item_for_update(&mut *conn, tenant_id, &line.product_name)
            .await?
        {
            Some(mut item) => {
                apply_sale_reversal(&mut item, line.quantity);
                self.stock_repo.update_item(&mut *conn, &item).await?;
            }
            None => {
                // O produto foi removido depois da venda: recria com os
                // dados da própria linha.
                self.stock_repo
                    .insert_item(
                        &mut *conn,
                        tenant_id,
                        &line.product_name,
                        line.quantity,
                        Decimal::ZERO,
                        Some(line.unit_price),
                        line.expiry_date,
                        default_threshold(),
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: &str) -> StockItem {
        StockItem {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            product_name: "Paracétamol 500mg".into(),
            quantity: quantity.parse().unwrap(),
            purchase_price: dec("2.00"),
            sale_price: None,
            expiry_date: None,
            low_stock_threshold: default_threshold(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn compra_soma_quantidade_e_sobrescreve_preco_e_validade() {
        let mut it = item("10");
        let expiry = NaiveDate::from_ymd_opt(2027, 6, 30);
        apply_restock(&mut it, dec("5"), dec("2.50"), expiry);
        assert_eq!(it.quantity, dec("15"));
        assert_eq!(it.purchase_price, dec("2.50"));
        assert_eq!(it.expiry_date, expiry);
    }

    #[test]
    fn compra_sem_validade_limpa_a_existente() {
        let mut it = item("10");
        it.expiry_date = NaiveDate::from_ymd_opt(2026, 1, 1);
        apply_restock(&mut it, dec("5"), dec("2.50"), None);
        assert_eq!(it.expiry_date, None);
    }

    #[test]
    fn reverter_compra_nunca_fica_negativo() {
        let mut it = item("3");
        apply_purchase_reversal(&mut it, dec("10"));
        assert_eq!(it.quantity, Decimal::ZERO);
    }

    #[test]
    fn venda_deduz_quando_ha_estoque() {
        let mut it = item("10");
        assert!(apply_sale(&mut it, dec("4")).is_ok());
        assert_eq!(it.quantity, dec("6"));
    }

    #[test]
    fn venda_sem_estoque_e_recusada_sem_alterar_nada() {
        let mut it = item("3");
        let result = apply_sale(&mut it, dec("4"));
        assert!(matches!(result, Err(AppError::InsufficientStock(_))));
        assert_eq!(it.quantity, dec("3"));
    }

    #[test]
    fn reverter_venda_devolve_a_quantidade() {
        let mut it = item("6");
        apply_sale_reversal(&mut it, dec("4"));
        assert_eq!(it.quantity, dec("10"));
    }
}
