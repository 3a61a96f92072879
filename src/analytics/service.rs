use crate::analytics::error::AnalyticsError;
use crate::analytics::models::{
    CartEfficiency, CartFinalTotal, CartTotal, CategoryQuantity, CustomerCartCount,
    OutOfStockProduct, ProductAdditionCount, PromoDiscountProjection,
};
use crate::analytics::repository::SnapshotRepository;
use crate::analytics::reports;
use crate::models::PromoCode;

/// Service for the cart analytics reports
///
/// Each method takes a fresh snapshot from the repository and delegates
/// to the pure aggregation pass in [`reports`]. No state survives a call;
/// concurrent reports share nothing but the connection pool.
#[derive(Clone)]
pub struct AnalyticsService {
    repository: SnapshotRepository,
}

impl AnalyticsService {
    /// Create a new AnalyticsService
    pub fn new(repository: SnapshotRepository) -> Self {
        Self { repository }
    }

    /// Totals of all active carts
    pub async fn active_cart_totals(&self) -> Result<Vec<CartTotal>, AnalyticsError> {
        let carts = self.repository.list_active_carts().await?;
        tracing::debug!("Computing totals for {} active carts", carts.len());
        Ok(reports::active_cart_totals(&carts))
    }

    /// Top products by summed line item quantity
    pub async fn top_products_by_additions(
        &self,
    ) -> Result<Vec<ProductAdditionCount>, AnalyticsError> {
        let items = self.repository.list_all_line_items().await?;
        tracing::debug!("Ranking products over {} line items", items.len());
        Ok(reports::top_products_by_additions(&items))
    }

    /// Active cart count per customer
    pub async fn active_cart_count_per_customer(
        &self,
    ) -> Result<Vec<CustomerCartCount>, AnalyticsError> {
        let carts = self.repository.list_active_carts().await?;
        let customers = self.repository.list_all_customers().await?;
        Ok(reports::active_cart_count_per_customer(&carts, &customers))
    }

    /// Line item quantity totals per normalized category
    pub async fn category_quantity_totals(
        &self,
    ) -> Result<Vec<CategoryQuantity>, AnalyticsError> {
        let items = self.repository.list_all_line_items().await?;
        Ok(reports::category_quantity_totals(&items))
    }

    /// Final payable totals for carts carrying a promo code
    pub async fn final_totals_with_promo(
        &self,
    ) -> Result<Vec<CartFinalTotal>, AnalyticsError> {
        let carts = self.repository.list_all_carts().await?;
        let promos = self.repository.list_all_promo_codes().await?;
        Ok(reports::final_totals_with_promo(&carts, &promos))
    }

    /// Active promo codes never used on any cart
    pub async fn unused_active_promos(&self) -> Result<Vec<PromoCode>, AnalyticsError> {
        let promos = self.repository.list_active_promo_codes().await?;
        let carts = self.repository.list_all_carts().await?;
        Ok(reports::unused_active_promos(&promos, &carts))
    }

    /// Projected discount per promo code if applied to every cart
    pub async fn promo_discount_if_applied(
        &self,
    ) -> Result<Vec<PromoDiscountProjection>, AnalyticsError> {
        let promos = self.repository.list_all_promo_codes().await?;
        let carts = self.repository.list_all_carts().await?;
        tracing::debug!(
            "Projecting {} promos across {} carts",
            promos.len(),
            carts.len()
        );
        Ok(reports::promo_discount_if_applied(&promos, &carts))
    }

    /// Products in carts that were out of stock when snapshotted
    pub async fn out_of_stock_products_in_carts(
        &self,
    ) -> Result<Vec<OutOfStockProduct>, AnalyticsError> {
        let items = self.repository.list_all_line_items().await?;
        Ok(reports::out_of_stock_products_in_carts(&items))
    }

    /// Weighted efficiency scores, best cart first
    pub async fn cart_efficiency_scores(
        &self,
    ) -> Result<Vec<CartEfficiency>, AnalyticsError> {
        let carts = self.repository.list_all_carts().await?;
        Ok(reports::cart_efficiency_scores(&carts))
    }
}
