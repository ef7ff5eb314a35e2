// src/pagination.rs
use crate::errors::AppError;
use crate::models::{Customer, Order, null_as_default};
use serde::Deserialize;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Dozwolone rozmiary strony w tabelach panelu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, EnumIter)]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub fn get(self) -> u32 {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
        }
    }

    pub fn as_usize(self) -> usize {
        self.get() as usize
    }
}

impl TryFrom<u32> for PageSize {
    type Error = AppError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::iter()
            .find(|size| size.get() == value)
            .ok_or(AppError::InvalidPageSize(value))
    }
}

/// Jedna strona rekordów razem z metadanymi paginacji
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_pages: u32,
    pub total_count: u64,
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
            total_count: 0,
        }
    }
}

impl<T> PageResult<T> {
    /// Buduje wynik z odpowiedzi serwera; brakujące liczniki zastępuje bezpiecznymi wartościami.
    pub fn from_wire(items: Vec<T>, total_pages: Option<u32>, total_count: Option<u64>) -> Self {
        Self {
            items,
            total_pages: total_pages.unwrap_or(1).max(1),
            total_count: total_count.unwrap_or(0),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self, page: u32) -> bool {
        page > 1
    }

    pub fn has_next(&self, page: u32) -> bool {
        page < self.total_pages
    }

    /// Numery stron do wyświetlenia w pagerze (1..=total_pages).
    pub fn page_numbers(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }
}

// --- KOPERTY ODPOWIEDZI API ---

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedOrdersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_orders: Option<u64>,
}

impl From<PaginatedOrdersResponse> for PageResult<Order> {
    fn from(response: PaginatedOrdersResponse) -> Self {
        PageResult::from_wire(response.orders, response.total_pages, response.total_orders)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedCustomersResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_customers: Option<u64>,
}

impl From<PaginatedCustomersResponse> for PageResult<Customer> {
    fn from(response: PaginatedCustomersResponse) -> Self {
        PageResult::from_wire(
            response.customers,
            response.total_pages,
            response.total_customers,
        )
    }
}
