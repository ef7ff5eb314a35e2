// src/customers.rs

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::api_client::ApiClient;
use crate::controller::{ListController, RefreshOutcome, RemoteCollection};
use crate::errors::AppError;
use crate::filters::Query;
use crate::models::Customer;
use crate::pagination::{PageResult, PageSize};
use crate::services;

/// Rozmiary strony dostępne w tabeli klientów
pub const CUSTOMER_PAGE_SIZES: [PageSize; 3] =
    [PageSize::Ten, PageSize::TwentyFive, PageSize::Fifty];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerAction {
    ToggleStatus,
}

/// Liczniki kart nad tabelą klientów.
/// `new_signups` i `blocked_customers` dotyczą tylko bieżącej strony.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerStats {
    pub total_customers: u64,
    pub new_signups: u64,
    pub returning_customers: u64,
    pub blocked_customers: u64,
}

impl CustomerStats {
    pub fn from_page(page: &PageResult<Customer>) -> Self {
        let new_signups = page.items.iter().filter(|c| c.is_new()).count() as u64;
        let blocked_customers = page.items.iter().filter(|c| c.is_blocked()).count() as u64;
        Self {
            total_customers: page.total_count,
            new_signups,
            // Suma globalna minus nowi ze strony, tak jak liczy to pulpit.
            returning_customers: page.total_count.saturating_sub(new_signups),
            blocked_customers,
        }
    }

    pub fn counters(&self) -> BTreeMap<&'static str, u64> {
        BTreeMap::from([
            ("totalCustomers", self.total_customers),
            ("newSignups", self.new_signups),
            ("returningCustomers", self.returning_customers),
            ("blockedCustomers", self.blocked_customers),
        ])
    }
}

pub struct CustomersCollection {
    api: ApiClient,
}

impl CustomersCollection {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RemoteCollection for CustomersCollection {
    const NAME: &'static str = "customers";

    type Record = Customer;
    type Stats = CustomerStats;
    type Mutation = CustomerAction;

    async fn fetch(&self, query: &Query) -> Result<PageResult<Customer>, AppError> {
        Ok(services::list_customers(&self.api, query).await?.into())
    }

    async fn mutate(&self, customer_id: &str, action: CustomerAction) -> Result<(), AppError> {
        match action {
            CustomerAction::ToggleStatus => {
                services::toggle_customer_status(&self.api, customer_id).await
            }
        }
    }

    fn derive_stats(&self, page: &PageResult<Customer>) -> CustomerStats {
        CustomerStats::from_page(page)
    }
}

pub type CustomersController = ListController<CustomersCollection>;

impl ListController<CustomersCollection> {
    pub fn for_customers(api: ApiClient, page_size: PageSize, debounce: Duration) -> Self {
        ListController::new(CustomersCollection::new(api), page_size, debounce)
    }

    pub async fn toggle_status(&self, customer_id: &str) -> Result<RefreshOutcome, AppError> {
        self.mutate(customer_id, CustomerAction::ToggleStatus).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerStatus, CustomerType};

    fn customer(id: usize, status: CustomerStatus, kind: Option<CustomerType>) -> Customer {
        Customer {
            customer_id: format!("cust-{id}"),
            customer_phone: None,
            customer_email: None,
            last_order_date: None,
            total_orders: 0,
            total_spent: 0.0,
            status,
            customer_type: kind,
        }
    }

    #[test]
    fn blocked_count_comes_from_the_page_not_the_total() {
        let mut items: Vec<Customer> = (0..7)
            .map(|i| customer(i, CustomerStatus::Active, Some(CustomerType::Returning)))
            .collect();
        items.push(customer(7, CustomerStatus::Blocked, Some(CustomerType::New)));
        items.push(customer(8, CustomerStatus::Blocked, None));
        items.push(customer(9, CustomerStatus::Active, Some(CustomerType::New)));
        let page = PageResult {
            items,
            total_pages: 3,
            total_count: 23,
        };

        let stats = CustomerStats::from_page(&page);

        assert_eq!(stats.total_customers, 23);
        assert_eq!(stats.blocked_customers, 2);
        assert_eq!(stats.new_signups, 2);
        assert_eq!(stats.returning_customers, 21);
        assert_eq!(stats.counters()["blockedCustomers"], 2);
    }

    #[test]
    fn returning_never_underflows() {
        let page = PageResult {
            items: vec![customer(1, CustomerStatus::Active, Some(CustomerType::New))],
            total_pages: 1,
            total_count: 0,
        };

        assert_eq!(CustomerStats::from_page(&page).returning_customers, 0);
    }
}
