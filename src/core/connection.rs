use crate::domain::model::{ConnectionResponse, ShopInfo};
use crate::domain::ports::ShopifyApi;
use crate::utils::error::Result;

/// 以 shop 端點驗證商店網址與 access token
pub async fn test_connection<A: ShopifyApi + ?Sized>(api: &A) -> Result<ShopInfo> {
    let shop = api.shop().await?;
    tracing::info!(
        "🔗 Connected to '{}' ({})",
        shop.name,
        shop.myshopify_domain.as_deref().unwrap_or("unknown domain")
    );
    Ok(shop)
}

pub async fn connection_report<A: ShopifyApi + ?Sized>(api: &A) -> ConnectionResponse {
    match test_connection(api).await {
        Ok(shop) => ConnectionResponse {
            success: true,
            shop: Some(shop),
            error: None,
        },
        Err(e) => {
            tracing::warn!("⚠️ Connection test failed: {}", e);
            ConnectionResponse {
                success: false,
                shop: None,
                error: Some(e.to_string()),
            }
        }
    }
}
