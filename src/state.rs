// src/state.rs

use crate::api_client::ApiClient;
use crate::config::AppConfig;
use crate::customers::CustomersController;
use crate::dashboard::DashboardWidgets;
use crate::errors::AppError;
use crate::orders::OrdersController;

#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let api = ApiClient::new(&config.api)?;
        Ok(Self { api, config })
    }

    pub fn orders_controller(&self) -> OrdersController {
        OrdersController::for_orders(
            self.api.clone(),
            self.config.default_page_size,
            self.config.search_debounce,
        )
    }

    pub fn customers_controller(&self) -> CustomersController {
        CustomersController::for_customers(
            self.api.clone(),
            self.config.default_page_size,
            self.config.search_debounce,
        )
    }

    pub fn dashboard(&self) -> DashboardWidgets {
        DashboardWidgets::new(self.api.clone())
    }
}
