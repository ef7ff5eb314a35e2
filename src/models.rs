// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use strum_macros::EnumString;

/// Pola kolekcji, które serwer potrafi zwrócić jako `null`, traktujemy jak puste.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status zamówienia
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    #[default]
    Pending, // Oczekujące
    Process, // W trakcie realizacji
    #[strum(serialize = "In Transit")]
    InTransit, // W drodze
    Delivered, // Dostarczone
    Canceled,  // Anulowane
    #[strum(default)]
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Process => "Process",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Zamówienia przekazane do realizacji lub już wysłane.
    pub fn is_in_transit(&self) -> bool {
        matches!(self, OrderStatus::Process | OrderStatus::InTransit)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(OrderStatus::Other(raw))
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum CustomerStatus {
    #[default]
    Active,
    Blocked,
    #[strum(default)]
    Other(String),
}

impl CustomerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            CustomerStatus::Active => "Active",
            CustomerStatus::Blocked => "Blocked",
            CustomerStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for CustomerStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(CustomerStatus::Other(raw))
    }
}

impl From<CustomerStatus> for String {
    fn from(status: CustomerStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum CustomerType {
    New,
    Returning,
    #[strum(default)]
    Other(String),
}

impl From<String> for CustomerType {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(CustomerType::Other(raw))
    }
}

impl From<CustomerType> for String {
    fn from(kind: CustomerType) -> Self {
        match kind {
            CustomerType::New => "New".to_string(),
            CustomerType::Returning => "Returning".to_string(),
            CustomerType::Other(raw) => raw,
        }
    }
}

/// Rekord listy, który da się zidentyfikować przy mutacjach.
pub trait ListRecord {
    fn record_id(&self) -> &str;

    /// Skrócony identyfikator do tabel (ostatnie 6 znaków).
    fn short_id(&self) -> String {
        let id = self.record_id();
        let start = id
            .char_indices()
            .rev()
            .nth(5)
            .map_or(0, |(index, _)| index);
        format!("#{}", &id[start..])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Zamówienie w postaci zwracanej przez panel administracyjny API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub product: Option<OrderProduct>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "amount")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: OrderStatus,
}

impl Order {
    pub fn display_product(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .or(self.product_name.as_deref())
            .unwrap_or("N/A")
    }

    pub fn display_customer(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("N/A")
    }

    pub fn display_date(&self) -> String {
        match (&self.created_at, &self.date) {
            (Some(created_at), _) => created_at.format("%Y-%m-%d").to_string(),
            (None, Some(date)) => date.clone(),
            (None, None) => "N/A".to_string(),
        }
    }

    pub fn display_amount(&self) -> String {
        format!("${:.2}", self.total_amount.unwrap_or(0.0))
    }
}

impl ListRecord for Order {
    fn record_id(&self) -> &str {
        self.mongo_id
            .as_deref()
            .or(self.order_id.as_deref())
            .unwrap_or_default()
    }
}

/// Klient sklepu widziany z panelu administracyjnego
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_id: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub last_order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: CustomerStatus,
    #[serde(default)]
    pub customer_type: Option<CustomerType>,
}

impl Customer {
    pub fn display_email(&self) -> &str {
        match self.customer_email.as_deref() {
            None | Some("N/A") | Some("") => "Not provided",
            Some(email) => email,
        }
    }

    pub fn display_last_order(&self) -> String {
        self.last_order_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn is_blocked(&self) -> bool {
        self.status == CustomerStatus::Blocked
    }

    pub fn is_new(&self) -> bool {
        self.customer_type == Some(CustomerType::New)
    }
}

impl ListRecord for Customer {
    fn record_id(&self) -> &str {
        &self.customer_id
    }
}

// --- STRUKTURY DLA WIDGETÓW PULPITU ---

/// Koperta `{ data: ... }` używana przez endpointy analityczne
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric<T> {
    #[serde(default)]
    pub value: T,
    #[serde(default)]
    pub change: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    #[serde(default)]
    pub total_sales: Metric<f64>,
    #[serde(default)]
    pub total_orders: Metric<u64>,
    #[serde(default)]
    pub products_sold: Metric<u64>,
    #[serde(default)]
    pub new_customers: Metric<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub total_quantity_sold: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopProductsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<TopProduct>,
}

/// Grupa agregacji `{ _id, count }` zwracana przez analitykę zamówień
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountBucket {
    #[serde(rename = "_id")]
    pub key: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders_by_time: Vec<CountBucket>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily_orders: Vec<CountBucket>,
    #[serde(default)]
    pub total_orders: u64,
    #[serde(default)]
    pub percentage_change: f64,
}

/// Produkt katalogu; pola, których panel nie używa, zostają w `extra`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
