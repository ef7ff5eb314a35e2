// src/dashboard.rs

use chrono::{DateTime, Datelike, NaiveDate};
use std::future::Future;

use crate::api_client::ApiClient;
use crate::errors::AppError;
use crate::models::{OrderAnalytics, SalesSummary, TopProduct};
use crate::services;

pub const DASHBOARD_TOP_PRODUCTS: u32 = 4;

const PRODUCT_COLORS: [&str; 5] = ["#4a90e2", "#2ecc71", "#9b59b6", "#e67e22", "#f39c12"];

/// Stan pojedynczego widgetu: dane, flaga ładowania i komunikat błędu.
#[derive(Debug, Clone)]
pub struct WidgetState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for WidgetState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

/// Zdejmuje flagę ładowania także wtedy, gdy future widgetu zostanie porzucony.
struct Loading<'a> {
    flag: &'a mut bool,
}

impl<'a> Loading<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

impl<T> WidgetState<T> {
    /// Ładuje dane widgetu. Po błędzie poprzednie dane zostają, a widget
    /// dostaje stały komunikat i przycisk ponowienia.
    pub async fn load<F>(&mut self, failure_message: &str, request: F) -> bool
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let loading = Loading::start(&mut self.loading);
        let result = request.await;
        drop(loading);

        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                true
            }
            Err(err) => {
                tracing::error!("{}: {}", failure_message, err);
                self.error = Some(failure_message.to_string());
                false
            }
        }
    }

    pub fn can_retry(&self) -> bool {
        self.error.is_some()
    }
}

// --- PODSUMOWANIE SPRZEDAŻY ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub value: String,
    pub change: String,
}

/// Skraca kwotę do postaci `$1.2M`, `$3.4k` albo `$12`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.1}k", value / 1_000.0)
    } else {
        format!("${:.0}", value)
    }
}

pub fn sales_cards(summary: Option<&SalesSummary>) -> Vec<SummaryCard> {
    const TITLES: [&str; 4] = [
        "Łączna sprzedaż",
        "Zamówienia",
        "Sprzedane produkty",
        "Nowi klienci",
    ];

    let Some(summary) = summary else {
        return TITLES
            .into_iter()
            .map(|title| SummaryCard {
                title,
                value: "--".to_string(),
                change: "Ładowanie...".to_string(),
            })
            .collect();
    };

    let change = |c: &Option<String>| c.clone().unwrap_or_default();
    vec![
        SummaryCard {
            title: TITLES[0],
            value: format_currency(summary.total_sales.value),
            change: change(&summary.total_sales.change),
        },
        SummaryCard {
            title: TITLES[1],
            value: summary.total_orders.value.to_string(),
            change: change(&summary.total_orders.change),
        },
        SummaryCard {
            title: TITLES[2],
            value: summary.products_sold.value.to_string(),
            change: change(&summary.products_sold.change),
        },
        SummaryCard {
            title: TITLES[3],
            value: summary.new_customers.value.to_string(),
            change: change(&summary.new_customers.change),
        },
    ]
}

// --- NAJLEPSZE PRODUKTY ---

#[derive(Debug, Clone, PartialEq)]
pub struct TopProductRow {
    pub rank: usize,
    pub name: String,
    pub brand: Option<String>,
    pub thumbnail: Option<String>,
    pub color: &'static str,
    pub popularity: f64,
    pub sold_label: String,
}

pub fn top_product_rows(products: &[TopProduct]) -> Vec<TopProductRow> {
    products
        .iter()
        .enumerate()
        .map(|(index, product)| TopProductRow {
            rank: index + 1,
            name: product.name.clone(),
            brand: product.brand.clone(),
            thumbnail: product.thumbnail.clone(),
            color: PRODUCT_COLORS[index % PRODUCT_COLORS.len()],
            popularity: product.popularity.clamp(0.0, 100.0),
            sold_label: format!("{} sold", product.total_quantity_sold),
        })
        .collect()
}

// --- ANALITYKA ZAMÓWIEŃ ---

/// Przedział godzin dla kubełka pory dnia zwracanego przez API.
pub fn time_range_label(bucket: &str) -> Option<&'static str> {
    match bucket {
        "Morning" => Some("6–12 AM"),
        "Afternoon" => Some("12–6 PM"),
        "Evening" => Some("6–12 PM"),
        "Night" => Some("12–6 AM"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlice {
    pub label: String,
    pub range: Option<&'static str>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyPoint {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrdersOverview {
    pub by_time: Vec<TimeSlice>,
    pub daily: Vec<DailyPoint>,
    pub total_orders: u64,
    pub percentage_change: f64,
}

impl OrdersOverview {
    pub fn from_analytics(analytics: &OrderAnalytics) -> Self {
        Self {
            by_time: analytics
                .orders_by_time
                .iter()
                .map(|bucket| TimeSlice {
                    label: bucket.key.clone(),
                    range: time_range_label(&bucket.key),
                    count: bucket.count,
                })
                .collect(),
            daily: analytics
                .daily_orders
                .iter()
                .map(|bucket| DailyPoint {
                    day: day_label(&bucket.key),
                    count: bucket.count,
                })
                .collect(),
            total_orders: analytics.total_orders,
            percentage_change: analytics.percentage_change,
        }
    }

    pub fn is_growing(&self) -> bool {
        self.percentage_change >= 0.0
    }

    pub fn trend_label(&self) -> String {
        trend_label(self.percentage_change)
    }
}

/// Dzień miesiąca (dwie cyfry) z daty `YYYY-MM-DD` lub RFC 3339.
pub fn day_label(raw: &str) -> String {
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.day())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|date| date.day()));
    match day {
        Ok(day) => format!("{:02}", day),
        Err(_) => raw.to_string(),
    }
}

pub fn trend_label(percentage_change: f64) -> String {
    let sign = if percentage_change >= 0.0 { "+" } else { "" };
    format!("{}{}% vs last week", sign, percentage_change)
}

// --- PULPIT ---

/// Trzy widgety pulpitu ładowane razem.
pub struct DashboardWidgets {
    api: ApiClient,
    pub sales: WidgetState<SalesSummary>,
    pub top_products: WidgetState<Vec<TopProduct>>,
    pub analytics: WidgetState<OrderAnalytics>,
}

impl DashboardWidgets {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            sales: WidgetState::default(),
            top_products: WidgetState::default(),
            analytics: WidgetState::default(),
        }
    }

    pub async fn refresh_sales(&mut self) -> bool {
        self.sales
            .load(
                "Nie udało się pobrać danych sprzedaży",
                services::sales_summary(&self.api),
            )
            .await
    }

    pub async fn refresh_top_products(&mut self) -> bool {
        self.top_products
            .load(
                "Nie udało się pobrać najlepszych produktów",
                services::top_products(&self.api, DASHBOARD_TOP_PRODUCTS),
            )
            .await
    }

    pub async fn refresh_analytics(&mut self) -> bool {
        self.analytics
            .load(
                "Nie udało się pobrać analityki zamówień",
                services::order_analytics(&self.api, services::DEFAULT_ANALYTICS_DAYS),
            )
            .await
    }

    /// Odświeża wszystkie widgety równolegle; każdy ma własny stan błędu.
    pub async fn refresh_all(&mut self) {
        let Self {
            api,
            sales,
            top_products,
            analytics,
        } = self;
        let api = &*api;

        futures::join!(
            sales.load(
                "Nie udało się pobrać danych sprzedaży",
                services::sales_summary(api),
            ),
            top_products.load(
                "Nie udało się pobrać najlepszych produktów",
                services::top_products(api, DASHBOARD_TOP_PRODUCTS),
            ),
            analytics.load(
                "Nie udało się pobrać analityki zamówień",
                services::order_analytics(api, services::DEFAULT_ANALYTICS_DAYS),
            ),
        );
    }

    pub fn sales_cards(&self) -> Vec<SummaryCard> {
        sales_cards(self.sales.data.as_ref())
    }

    pub fn top_product_rows(&self) -> Vec<TopProductRow> {
        self.top_products
            .data
            .as_deref()
            .map(top_product_rows)
            .unwrap_or_default()
    }

    pub fn orders_overview(&self) -> Option<OrdersOverview> {
        self.analytics.data.as_ref().map(OrdersOverview::from_analytics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CountBucket, Metric};
    use reqwest::StatusCode;

    #[test]
    fn currency_is_abbreviated() {
        assert_eq!(format_currency(2_450_000.0), "$2.5M");
        assert_eq!(format_currency(12_340.0), "$12.3k");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn placeholder_cards_until_data_arrives() {
        let cards = sales_cards(None);

        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|card| card.value == "--"));
    }

    #[test]
    fn cards_from_summary() {
        let summary = SalesSummary {
            total_sales: Metric {
                value: 15_800.0,
                change: Some("+8%".to_string()),
            },
            total_orders: Metric {
                value: 310,
                change: None,
            },
            ..SalesSummary::default()
        };

        let cards = sales_cards(Some(&summary));

        assert_eq!(cards[0].value, "$15.8k");
        assert_eq!(cards[0].change, "+8%");
        assert_eq!(cards[1].value, "310");
        assert_eq!(cards[1].change, "");
        assert_eq!(cards[3].value, "0");
    }

    #[test]
    fn top_product_colors_cycle() {
        let products: Vec<TopProduct> = (0..6)
            .map(|i| TopProduct {
                name: format!("p{i}"),
                brand: None,
                thumbnail: None,
                popularity: if i == 0 { 140.0 } else { 50.0 },
                total_quantity_sold: 12,
            })
            .collect();

        let rows = top_product_rows(&products);

        assert_eq!(rows[0].color, "#4a90e2");
        assert_eq!(rows[5].color, "#4a90e2");
        assert_eq!(rows[0].popularity, 100.0);
        assert_eq!(rows[2].rank, 3);
        assert_eq!(rows[2].sold_label, "12 sold");
    }

    #[test]
    fn overview_labels() {
        let analytics = OrderAnalytics {
            orders_by_time: vec![
                CountBucket {
                    key: "Morning".to_string(),
                    count: 12,
                },
                CountBucket {
                    key: "Late".to_string(),
                    count: 1,
                },
            ],
            daily_orders: vec![
                CountBucket {
                    key: "2024-03-05".to_string(),
                    count: 4,
                },
                CountBucket {
                    key: "2024-03-06T00:00:00Z".to_string(),
                    count: 6,
                },
            ],
            total_orders: 10,
            percentage_change: -12.5,
        };

        let overview = OrdersOverview::from_analytics(&analytics);

        assert_eq!(overview.by_time[0].range, Some("6–12 AM"));
        assert_eq!(overview.by_time[1].range, None);
        assert_eq!(overview.daily[0].day, "05");
        assert_eq!(overview.daily[1].day, "06");
        assert!(!overview.is_growing());
        assert_eq!(overview.trend_label(), "-12.5% vs last week");
        assert_eq!(trend_label(4.0), "+4% vs last week");
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_load_clears_loading_flag() {
        let mut widget: WidgetState<u32> = WidgetState::default();

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            widget.load(
                "Nie udało się pobrać danych",
                std::future::pending::<Result<u32, AppError>>(),
            ),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!widget.loading);
        assert!(widget.data.is_none());
        assert!(widget.error.is_none());
    }

    #[tokio::test]
    async fn widget_keeps_data_after_failure() {
        let mut widget: WidgetState<u32> = WidgetState::default();

        assert!(widget.load("błąd", async { Ok(7) }).await);
        let failed = widget
            .load("Nie udało się pobrać danych", async {
                Err(AppError::Status {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: String::new(),
                })
            })
            .await;

        assert!(!failed);
        assert_eq!(widget.data, Some(7));
        assert_eq!(widget.error.as_deref(), Some("Nie udało się pobrać danych"));
        assert!(widget.can_retry());
        assert!(!widget.loading);
    }
}
