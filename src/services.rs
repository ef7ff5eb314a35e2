// src/services.rs

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api_client::{ApiClient, path_segment};
use crate::errors::AppError;
use crate::filters::Query;
use crate::models::{
    DataEnvelope, Order, OrderAnalytics, OrderStatus, Product, SalesSummary, TopProduct,
    TopProductsResponse, Vendor,
};
use crate::pagination::{PaginatedCustomersResponse, PaginatedOrdersResponse};

pub const DEFAULT_ANALYTICS_DAYS: u32 = 7;
pub const DEFAULT_RECENT_ORDERS_LIMIT: u32 = 10;
pub const DEFAULT_TOP_PRODUCTS_LIMIT: u32 = 5;

#[derive(Serialize)]
struct LimitParam {
    limit: u32,
}

#[derive(Serialize)]
struct DaysParam {
    days: u32,
}

const NO_PARAMS: &[(&str, &str)] = &[];

// --- ZAMÓWIENIA ---

/// Pobiera stronę zamówień zgodnie z bieżącym zapytaniem listy.
pub async fn list_orders(api: &ApiClient, query: &Query) -> Result<PaginatedOrdersResponse, AppError> {
    api.get_json("/admin/orders", &query.to_params()).await
}

pub async fn update_order_status(
    api: &ApiClient,
    order_id: &str,
    status: &OrderStatus,
) -> Result<(), AppError> {
    let path = format!("/admin/orders/{}/status", path_segment(order_id));
    api.put_json(&path, Some(&json!({ "status": status }))).await?;
    tracing::info!(
        "Zaktualizowano status zamówienia: order_id={}, nowy_status={}",
        order_id,
        status
    );
    Ok(())
}

pub async fn order_analytics(api: &ApiClient, days: u32) -> Result<OrderAnalytics, AppError> {
    let envelope: DataEnvelope<OrderAnalytics> =
        api.get_json("/order/analytics", &DaysParam { days }).await?;
    Ok(envelope.data)
}

pub async fn recent_orders(api: &ApiClient, limit: u32) -> Result<Vec<Order>, AppError> {
    let value: Value = api
        .get_json("/admin/orders/recent", &LimitParam { limit })
        .await?;
    extract_list(value, "orders")
}

// --- KLIENCI ---

pub async fn list_customers(
    api: &ApiClient,
    query: &Query,
) -> Result<PaginatedCustomersResponse, AppError> {
    api.get_json("/admin/customers", &query.to_params()).await
}

pub async fn customer_details(api: &ApiClient, customer_id: &str) -> Result<Value, AppError> {
    let path = format!("/admin/customers/{}", path_segment(customer_id));
    api.get_json(&path, NO_PARAMS).await
}

pub async fn toggle_customer_status(api: &ApiClient, customer_id: &str) -> Result<(), AppError> {
    let path = format!("/admin/customers/{}/toggle-status", path_segment(customer_id));
    api.put_json::<Value>(&path, None).await?;
    tracing::info!("Przełączono status klienta: customer_id={}", customer_id);
    Ok(())
}

// --- PULPIT ---

pub async fn dashboard_stats(api: &ApiClient) -> Result<Value, AppError> {
    api.get_json("/admin/dashboard/stats", NO_PARAMS).await
}

pub async fn sales_summary(api: &ApiClient) -> Result<SalesSummary, AppError> {
    let envelope: DataEnvelope<SalesSummary> =
        api.get_json("/order/sales-summary", NO_PARAMS).await?;
    Ok(envelope.data)
}

pub async fn top_products(api: &ApiClient, limit: u32) -> Result<Vec<TopProduct>, AppError> {
    let response: TopProductsResponse = api.get_json("/product/top", &LimitParam { limit }).await?;
    Ok(response.products)
}

// --- PRODUKTY I SPRZEDAWCY ---

pub async fn product_stats(api: &ApiClient) -> Result<Value, AppError> {
    api.get_json("/product/stats", NO_PARAMS).await
}

pub async fn list_products(api: &ApiClient) -> Result<Vec<Product>, AppError> {
    let value: Value = api.get_json("/product/getproducts", NO_PARAMS).await?;
    extract_list(value, "products")
}

pub async fn product_details(api: &ApiClient, product_id: &str) -> Result<Value, AppError> {
    let path = format!("/product/getproduct/{}", path_segment(product_id));
    api.get_json(&path, NO_PARAMS).await
}

pub async fn list_vendors(api: &ApiClient) -> Result<Vec<Vendor>, AppError> {
    let value: Value = api.get_json("/vendors", NO_PARAMS).await?;
    extract_list(value, "vendors")
}

pub async fn vendor_details(api: &ApiClient, vendor_id: &str) -> Result<Value, AppError> {
    let path = format!("/vendors/{}", path_segment(vendor_id));
    api.get_json(&path, NO_PARAMS).await
}

/// Wyciąga listę z odpowiedzi, która bywa gołą tablicą albo obiektem `{ key: [...] }`
/// lub `{ data: [...] }`. Brak listy oznacza pustą kolekcję.
fn extract_list<T: DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, AppError> {
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove(key).or_else(|| map.remove("data")) {
            Some(list @ Value::Array(_)) => list,
            _ => {
                tracing::warn!("Odpowiedź nie zawiera listy '{}', zwracam pustą", key);
                return Ok(Vec::new());
            }
        },
        _ => {
            tracing::warn!("Nieoczekiwany kształt odpowiedzi dla listy '{}'", key);
            return Ok(Vec::new());
        }
    };
    Ok(serde_json::from_value(list)?)
}
