// src/errors.rs

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Błąd połączenia z API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API zwróciło status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Nieoczekiwany format odpowiedzi: {0}")]
    Decode(String),

    #[error("Nieprawidłowy adres URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Błąd konfiguracji: {0}")]
    Config(String),

    #[error("Nieobsługiwany rozmiar strony: {0}")]
    InvalidPageSize(u32),

    /// Lista nie została wczytana; komunikat pochodzi ze stanu widoku.
    #[error("Nie udało się wczytać listy: {message}")]
    ListUnavailable { message: String, retryable: bool },
}

impl AppError {
    /// Zamienia błąd na jeden komunikat pokazywany użytkownikowi.
    /// Szczegóły loguje wywołujący, widok dostaje tylko krótki tekst.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(err) if err.is_timeout() => {
                "Serwer nie odpowiedział na czas".to_string()
            }
            AppError::Transport(_) => "Błąd połączenia z serwerem".to_string(),
            AppError::Status { status, .. } => {
                format!("Żądanie nie powiodło się (status: {})", status.as_u16())
            }
            AppError::Decode(_) => "Nie można przetworzyć odpowiedzi serwera".to_string(),
            AppError::InvalidUrl(_) => "Nieprawidłowy adres serwera API".to_string(),
            AppError::Config(message) => message.clone(),
            AppError::InvalidPageSize(size) => {
                format!("Nieobsługiwany rozmiar strony: {}", size)
            }
            AppError::ListUnavailable { message, .. } => message.clone(),
        }
    }

    /// `true` dla błędów, po których ma sens ręczne ponowienie żądania.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Transport(_) | AppError::Status { .. } | AppError::Decode(_) => true,
            AppError::ListUnavailable { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}
