// src/orders.rs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::api_client::ApiClient;
use crate::controller::{ListController, RefreshOutcome, RemoteCollection};
use crate::errors::AppError;
use crate::filters::Query;
use crate::models::{Order, OrderStatus};
use crate::pagination::{PageResult, PageSize};
use crate::services;

pub const PAYMENT_MODE_FILTER: &str = "paymentMode";
pub const STATUS_FILTER: &str = "status";

/// Rozmiary strony dostępne w tabeli zamówień
pub const ORDER_PAGE_SIZES: [PageSize; 3] = [PageSize::Five, PageSize::Ten, PageSize::Twenty];

/// Liczniki kart nad tabelą zamówień.
/// `total` pochodzi z serwera, pozostałe liczone są tylko z bieżącej strony.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub total: u64,
    pub delivered: u64,
    pub in_transit: u64,
    pub canceled: u64,
}

impl OrderStats {
    pub fn from_page(page: &PageResult<Order>) -> Self {
        let count = |pred: fn(&OrderStatus) -> bool| {
            page.items.iter().filter(|order| pred(&order.status)).count() as u64
        };
        Self {
            total: page.total_count,
            delivered: count(|status| *status == OrderStatus::Delivered),
            in_transit: count(OrderStatus::is_in_transit),
            canceled: count(|status| *status == OrderStatus::Canceled),
        }
    }

    pub fn counters(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("totalOrders", self.total),
            ("deliveredOrders", self.delivered),
            ("inTransitOrders", self.in_transit),
            ("canceledOrders", self.canceled),
        ])
    }
}

/// Wartości do list rozwijanych filtrów, zebrane z rekordów bieżącej strony.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub payment_modes: Vec<String>,
    pub statuses: Vec<OrderStatus>,
}

impl FilterOptions {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut options = FilterOptions::default();
        for order in orders {
            if let Some(mode) = order.payment_mode.as_ref().filter(|m| !m.is_empty()) {
                if !options.payment_modes.contains(mode) {
                    options.payment_modes.push(mode.clone());
                }
            }
            if !options.statuses.contains(&order.status) {
                options.statuses.push(order.status.clone());
            }
        }
        options
    }
}

pub struct OrdersCollection {
    api: ApiClient,
}

impl OrdersCollection {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCollection for OrdersCollection {
    const NAME: &'static str = "orders";

    type Record = Order;
    type Stats = OrderStats;
    type Mutation = OrderStatus;

    async fn fetch(&self, query: &Query) -> Result<PageResult<Order>, AppError> {
        Ok(services::list_orders(&self.api, query).await?.into())
    }

    async fn mutate(&self, order_id: &str, status: OrderStatus) -> Result<(), AppError> {
        services::update_order_status(&self.api, order_id, &status).await
    }

    fn derive_stats(&self, page: &PageResult<Order>) -> OrderStats {
        OrderStats::from_page(page)
    }
}

pub type OrdersController = ListController<OrdersCollection>;

impl ListController<OrdersCollection> {
    pub fn for_orders(api: ApiClient, page_size: PageSize, debounce: Duration) -> Self {
        ListController::new(OrdersCollection::new(api), page_size, debounce)
    }

    pub fn set_payment_mode_filter(&self, mode: Option<String>) -> bool {
        self.set_filter(PAYMENT_MODE_FILTER, mode)
    }

    pub fn set_status_filter(&self, status: Option<OrderStatus>) -> bool {
        self.set_filter(STATUS_FILTER, status.map(String::from))
    }

    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<RefreshOutcome, AppError> {
        self.mutate(order_id, status).await
    }

    pub async fn mark_delivered(&self, order_id: &str) -> Result<RefreshOutcome, AppError> {
        self.mutate(order_id, OrderStatus::Delivered).await
    }

    pub async fn cancel_order(&self, order_id: &str) -> Result<RefreshOutcome, AppError> {
        self.mutate(order_id, OrderStatus::Canceled).await
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_orders(&self.snapshot().page.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, status: OrderStatus, payment_mode: Option<&str>) -> Order {
        Order {
            mongo_id: Some(id.to_string()),
            status,
            payment_mode: payment_mode.map(str::to_string),
            ..Order::default()
        }
    }

    #[test]
    fn stats_count_only_current_page() {
        let page = PageResult {
            items: vec![
                order("1", OrderStatus::Delivered, Some("Card")),
                order("2", OrderStatus::Process, Some("Cash")),
                order("3", OrderStatus::InTransit, None),
                order("4", OrderStatus::Canceled, Some("Card")),
                order("5", OrderStatus::Delivered, None),
            ],
            total_pages: 8,
            total_count: 74,
        };

        let stats = OrderStats::from_page(&page);

        assert_eq!(
            stats,
            OrderStats {
                total: 74,
                delivered: 2,
                in_transit: 2,
                canceled: 1,
            }
        );
        assert_eq!(stats.counters()["deliveredOrders"], 2);
    }

    #[test]
    fn filter_options_are_distinct_in_first_seen_order() {
        let orders = vec![
            order("1", OrderStatus::Pending, Some("UPI")),
            order("2", OrderStatus::Delivered, Some("Card")),
            order("3", OrderStatus::Pending, Some("UPI")),
            order("4", OrderStatus::Other("Returned".into()), Some("")),
        ];

        let options = FilterOptions::from_orders(&orders);

        assert_eq!(options.payment_modes, vec!["UPI", "Card"]);
        assert_eq!(
            options.statuses,
            vec![
                OrderStatus::Pending,
                OrderStatus::Delivered,
                OrderStatus::Other("Returned".into())
            ]
        );
    }
}
