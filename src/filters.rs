// src/filters.rs
use crate::pagination::PageSize;
use std::collections::BTreeMap;

const FIRST_PAGE: u32 = 1;
const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";
const SEARCH_PARAM: &str = "search";

/// Parametry zapytania listy: paginacja, wyszukiwanie i filtry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub page: u32,
    pub page_size: PageSize,
    pub search: String,
    pub filters: BTreeMap<String, Option<String>>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Query {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: FIRST_PAGE,
            page_size,
            search: String::new(),
            filters: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> u32 {
        self.page_size.get()
    }

    pub fn reset_page(&mut self) {
        self.page = FIRST_PAGE;
    }

    /// Fraza wyszukiwania bez białych znaków; `None`, gdy pusta.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters
            .get(name)
            .and_then(|value| value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Ustawia filtr; pusty tekst oznacza brak filtra. Zwraca `true`, gdy wartość się zmieniła.
    pub fn set_filter(&mut self, name: &str, value: Option<String>) -> bool {
        let value = value.filter(|v| !v.trim().is_empty());
        let previous = self.filters.insert(name.to_string(), value.clone());
        previous.flatten() != value
    }

    pub fn clear_filters(&mut self) -> bool {
        let had_active = self.active_filters().next().is_some();
        self.filters.clear();
        had_active
    }

    pub fn active_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.keys().filter_map(move |name| {
            self.filter(name).map(|value| (name.as_str(), value))
        })
    }

    /// Parametry wysyłane do API: page, limit, search (jeśli podano) i aktywne filtry.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (PAGE_PARAM.to_string(), self.page.to_string()),
            (LIMIT_PARAM.to_string(), self.limit().to_string()),
        ];
        if let Some(term) = self.search_term() {
            params.push((SEARCH_PARAM.to_string(), term.to_string()));
        }
        params.extend(
            self.active_filters()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn blank_search_and_filters_are_not_sent() {
        let mut query = Query::new(PageSize::Twenty);
        query.search = "   ".to_string();
        query.set_filter("status", Some(String::new()));
        query.set_filter("paymentMode", None);

        let params = query.to_params();

        assert_eq!(
            params,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn search_is_trimmed_and_filters_appended() {
        let mut query = Query::default();
        query.page = 3;
        query.search = "  anna ".to_string();
        query.set_filter("status", Some("Delivered".to_string()));

        let params = query.to_params();

        assert_eq!(param(&params, "page"), Some("3"));
        assert_eq!(param(&params, "limit"), Some("10"));
        assert_eq!(param(&params, "search"), Some("anna"));
        assert_eq!(param(&params, "status"), Some("Delivered"));
    }

    #[test]
    fn set_filter_reports_changes() {
        let mut query = Query::default();

        assert!(query.set_filter("status", Some("Canceled".to_string())));
        assert!(!query.set_filter("status", Some("Canceled".to_string())));
        assert!(query.set_filter("status", None));
        assert!(!query.set_filter("status", Some(" ".to_string())));
        assert!(!query.clear_filters());
    }
}
