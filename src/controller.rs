// src/controller.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::AppError;
use crate::filters::Query;
use crate::pagination::{PageResult, PageSize};

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Zdalna kolekcja rekordów, z której korzysta kontroler listy.
/// Produkcyjnie to wrapper na REST API, w testach zwykła atrapa.
#[async_trait]
pub trait RemoteCollection: Send + Sync + 'static {
    /// Nazwa kolekcji używana w logach.
    const NAME: &'static str;

    type Record: Clone + Send + Sync + 'static;
    type Stats: Clone + Default + Send + Sync + 'static;
    type Mutation: Send + 'static;

    async fn fetch(&self, query: &Query) -> Result<PageResult<Self::Record>, AppError>;

    async fn mutate(&self, record_id: &str, mutation: Self::Mutation) -> Result<(), AppError>;

    /// Statystyki liczone lokalnie z bieżącej strony (nie z całego zbioru).
    fn derive_stats(&self, page: &PageResult<Self::Record>) -> Self::Stats;
}

/// Wynik pojedynczego odświeżenia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// Odpowiedź przyszła po wysłaniu nowszego żądania i została pominięta.
    Discarded,
    Failed,
}

/// Migawka stanu widoku listy dla warstwy prezentacji.
#[derive(Debug, Clone)]
pub struct ListView<R, S> {
    pub query: Query,
    pub page: PageResult<R>,
    pub stats: S,
    pub loading: bool,
    pub error: Option<String>,
    /// Czy ostatni błąd da się naprawić ponowieniem (sieć, status, format odpowiedzi).
    pub retryable: bool,
}

impl<R, S> ListView<R, S> {
    /// Widok pokazuje przycisk "Ponów", gdy ostatnie pobranie się nie udało
    /// z powodu, który ponowienie może usunąć.
    pub fn can_retry(&self) -> bool {
        self.error.is_some() && self.retryable
    }
}

enum Fetched {
    Done(RefreshOutcome),
    /// Odpowiedź zastosowana, ale numer strony trzeba było przyciąć.
    Clamped,
}

impl Fetched {
    fn outcome(self) -> RefreshOutcome {
        match self {
            Fetched::Done(outcome) => outcome,
            Fetched::Clamped => RefreshOutcome::Applied,
        }
    }
}

struct ViewState<R, S> {
    query: Query,
    page: PageResult<R>,
    stats: S,
    in_flight: usize,
    error: Option<String>,
    retryable: bool,
    issued_seq: u64,
    debounce: Option<CancellationToken>,
}

struct Inner<C: RemoteCollection> {
    collection: C,
    debounce_delay: Duration,
    state: Mutex<ViewState<C::Record, C::Stats>>,
}

impl<C: RemoteCollection> Inner<C> {
    fn lock(&self) -> MutexGuard<'_, ViewState<C::Record, C::Stats>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: RemoteCollection> Drop for Inner<C> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = state.debounce.take() {
            token.cancel();
        }
    }
}

/// Zdejmuje licznik trwających żądań także wtedy, gdy future zostanie porzucony.
struct InFlight<'a, C: RemoteCollection> {
    inner: &'a Inner<C>,
    settled: bool,
}

impl<C: RemoteCollection> Drop for InFlight<'_, C> {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.inner.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

/// Kontroler widoku listy: paginacja po stronie serwera, wyszukiwanie z opóźnieniem,
/// statystyki z bieżącej strony i odświeżenie po każdej udanej mutacji.
pub struct ListController<C: RemoteCollection> {
    inner: Arc<Inner<C>>,
}

impl<C: RemoteCollection> Clone for ListController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RemoteCollection> ListController<C> {
    pub fn new(collection: C, page_size: PageSize, debounce_delay: Duration) -> Self {
        let page = PageResult::default();
        let stats = collection.derive_stats(&page);
        Self {
            inner: Arc::new(Inner {
                collection,
                debounce_delay,
                state: Mutex::new(ViewState {
                    query: Query::new(page_size),
                    page,
                    stats,
                    in_flight: 0,
                    error: None,
                    retryable: false,
                    issued_seq: 0,
                    debounce: None,
                }),
            }),
        }
    }

    pub fn collection(&self) -> &C {
        &self.inner.collection
    }

    pub fn snapshot(&self) -> ListView<C::Record, C::Stats> {
        let state = self.inner.lock();
        ListView {
            query: state.query.clone(),
            page: state.page.clone(),
            stats: state.stats.clone(),
            loading: state.in_flight > 0,
            error: state.error.clone(),
            retryable: state.retryable,
        }
    }

    pub fn query(&self) -> Query {
        self.inner.lock().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    /// `Err`, gdy ostatnie pobranie listy się nie udało.
    pub fn check_loaded(&self) -> Result<(), AppError> {
        let state = self.inner.lock();
        match &state.error {
            Some(message) => Err(AppError::ListUnavailable {
                message: message.clone(),
                retryable: state.retryable,
            }),
            None => Ok(()),
        }
    }

    pub fn has_pending_search(&self) -> bool {
        self.inner.lock().debounce.is_some()
    }

    /// Pobiera stronę dla bieżącego zapytania. Przy błędzie poprzednie dane zostają
    /// na ekranie, a w stanie ląduje komunikat dla użytkownika.
    /// Gdy bieżąca strona wypadła poza nowy zakres, pobiera jeszcze raz ostatnią stronę.
    pub async fn refresh(&self) -> RefreshOutcome {
        match self.fetch_current().await {
            Fetched::Clamped => {
                tracing::debug!("[{}] Ponowne pobranie po przycięciu numeru strony", C::NAME);
                self.fetch_current().await.outcome()
            }
            fetched => fetched.outcome(),
        }
    }

    async fn fetch_current(&self) -> Fetched {
        let (seq, query) = {
            let mut state = self.inner.lock();
            state.issued_seq += 1;
            state.in_flight += 1;
            (state.issued_seq, state.query.clone())
        };
        let mut in_flight = InFlight {
            inner: &self.inner,
            settled: false,
        };

        tracing::debug!(
            "[{}] Pobieranie strony {} (limit={}, żądanie #{})",
            C::NAME,
            query.page,
            query.limit(),
            seq
        );
        let result = self.inner.collection.fetch(&query).await;

        let mut state = self.inner.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        in_flight.settled = true;

        if seq != state.issued_seq {
            tracing::warn!(
                "[{}] Pominięto nieaktualną odpowiedź #{} (najnowsze żądanie #{})",
                C::NAME,
                seq,
                state.issued_seq
            );
            return Fetched::Done(RefreshOutcome::Discarded);
        }

        match result {
            Ok(mut page) => {
                let limit = query.page_size.as_usize();
                if page.items.len() > limit {
                    tracing::warn!(
                        "[{}] Serwer zwrócił {} rekordów przy limicie {}, przycinam",
                        C::NAME,
                        page.items.len(),
                        limit
                    );
                    page.items.truncate(limit);
                }
                page.total_pages = page.total_pages.max(1);
                let clamped = state.query.page > page.total_pages;
                if clamped {
                    tracing::warn!(
                        "[{}] Strona {} poza zakresem, ustawiam {}",
                        C::NAME,
                        state.query.page,
                        page.total_pages
                    );
                    state.query.page = page.total_pages;
                }

                state.stats = self.inner.collection.derive_stats(&page);
                tracing::info!(
                    "[{}] Wczytano {} rekordów (strona {}/{}, łącznie {})",
                    C::NAME,
                    page.items.len(),
                    query.page,
                    page.total_pages,
                    page.total_count
                );
                state.page = page;
                state.error = None;
                state.retryable = false;
                if clamped {
                    Fetched::Clamped
                } else {
                    Fetched::Done(RefreshOutcome::Applied)
                }
            }
            Err(err) => {
                tracing::error!("[{}] Nie udało się pobrać listy: {:?}", C::NAME, err);
                state.error = Some(err.user_message());
                state.retryable = err.is_retryable();
                Fetched::Done(RefreshOutcome::Failed)
            }
        }
    }

    /// Ręczne ponowienie po błędzie. Brak automatycznych ponowień.
    pub async fn retry(&self) -> RefreshOutcome {
        self.refresh().await
    }

    /// Przechodzi na stronę `page` przyciętą do `[1, total_pages]`.
    /// `None`, gdy strona się nie zmienia (bez żądania).
    pub async fn set_page(&self, page: u32) -> Option<RefreshOutcome> {
        {
            let mut state = self.inner.lock();
            let target = page.clamp(1, state.page.total_pages.max(1));
            if target == state.query.page {
                return None;
            }
            state.query.page = target;
        }
        Some(self.refresh().await)
    }

    pub async fn set_page_size(&self, page_size: PageSize) -> RefreshOutcome {
        {
            let mut state = self.inner.lock();
            // Natychmiastowe pobranie i tak uwzględnia ostatnie zmiany wyszukiwania.
            if let Some(token) = state.debounce.take() {
                token.cancel();
            }
            state.query.page_size = page_size;
            state.query.reset_page();
        }
        self.refresh().await
    }

    /// Zmienia frazę wyszukiwania i uruchamia odliczanie do odświeżenia.
    pub fn set_search_text(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        let changed = {
            let mut state = self.inner.lock();
            if state.query.search == text {
                false
            } else {
                state.query.search = text;
                true
            }
        };
        if changed {
            self.arm_debounce();
        }
        changed
    }

    pub fn set_filter(&self, name: &str, value: Option<String>) -> bool {
        let changed = self.inner.lock().query.set_filter(name, value);
        if changed {
            self.arm_debounce();
        }
        changed
    }

    pub fn clear_filters(&self) -> bool {
        let changed = self.inner.lock().query.clear_filters();
        if changed {
            self.arm_debounce();
        }
        changed
    }

    /// Wysyła mutację rekordu; po sukcesie dokładnie jedno odświeżenie,
    /// po błędzie stan zostaje nietknięty, a błąd wraca do wywołującego.
    pub async fn mutate(
        &self,
        record_id: &str,
        mutation: C::Mutation,
    ) -> Result<RefreshOutcome, AppError> {
        match self.inner.collection.mutate(record_id, mutation).await {
            Ok(()) => {
                tracing::info!("[{}] Zmieniono rekord {}, odświeżam listę", C::NAME, record_id);
                Ok(self.refresh().await)
            }
            Err(err) => {
                tracing::error!("[{}] Nie udało się zmienić rekordu {}: {}", C::NAME, record_id, err);
                Err(err)
            }
        }
    }

    /// Anuluje oczekujące wyszukiwanie; wywoływane przy zamykaniu widoku.
    pub fn teardown(&self) {
        if let Some(token) = self.inner.lock().debounce.take() {
            tracing::debug!("[{}] Anulowano oczekujące wyszukiwanie", C::NAME);
            token.cancel();
        }
    }

    pub fn has_previous_page(&self) -> bool {
        let state = self.inner.lock();
        state.page.has_previous(state.query.page)
    }

    pub fn has_next_page(&self) -> bool {
        let state = self.inner.lock();
        state.page.has_next(state.query.page)
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.inner.lock().page.page_numbers()
    }

    pub async fn go_first(&self) -> Option<RefreshOutcome> {
        self.set_page(1).await
    }

    pub async fn go_previous(&self) -> Option<RefreshOutcome> {
        let page = self.inner.lock().query.page;
        self.set_page(page.saturating_sub(1)).await
    }

    pub async fn go_next(&self) -> Option<RefreshOutcome> {
        let page = self.inner.lock().query.page;
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn go_last(&self) -> Option<RefreshOutcome> {
        let last = self.inner.lock().page.total_pages;
        self.set_page(last).await
    }

    fn arm_debounce(&self) {
        let token = CancellationToken::new();
        if let Some(previous) = self.inner.lock().debounce.replace(token.clone()) {
            previous.cancel();
        }

        let weak: Weak<Inner<C>> = Arc::downgrade(&self.inner);
        let delay = self.inner.debounce_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let controller = ListController { inner };
            if controller.fire_debounce(&token) {
                controller.refresh().await;
            }
        });
    }

    fn fire_debounce(&self, token: &CancellationToken) -> bool {
        let mut state = self.inner.lock();
        if token.is_cancelled() {
            return false;
        }
        state.debounce = None;
        state.query.reset_page();
        true
    }
}
