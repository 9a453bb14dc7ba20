//! Common error types for MPR

use thiserror::Error;

use crate::validation::FieldError;

/// Common result type for MPR operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the portal
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream answered with a non-success status
    #[error("HTTP {status}")]
    Http { status: u16 },

    /// Upstream did not answer within the request timeout
    #[error("Tempo de requisição esgotado")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset, TLS)
    #[error("Falha de rede: {0}")]
    Network(String),

    /// Upstream body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Input rejected by validation rules
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a GET that failed this way is worth one more attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http { status } => *status >= 500,
            Error::Network(_) => true,
            _ => false,
        }
    }

    /// Friendly Portuguese message for display to citizens
    pub fn user_message(&self) -> String {
        match self {
            Error::Timeout => "Tempo limite excedido. Tente novamente.".to_string(),
            Error::Network(_) => "Problema de conexão. Verifique sua internet.".to_string(),
            Error::Http { status } => status_message(*status).to_string(),
            Error::InvalidResponse(_) => {
                "Resposta inesperada do serviço. Tente novamente mais tarde.".to_string()
            }
            Error::Validation(errors) => format_field_errors(errors),
            Error::NotFound(_) => "Recurso não encontrado.".to_string(),
            Error::Config(_) | Error::Io(_) => "Falha na solicitação.".to_string(),
        }
    }
}

/// Map an upstream status code to its user-facing message
pub fn status_message(status: u16) -> &'static str {
    match status {
        400 => "Dados inválidos. Verifique as informações enviadas.",
        401 => "Não autorizado. Faça login novamente.",
        403 => "Acesso negado. Você não tem permissão para esta ação.",
        404 => "Recurso não encontrado.",
        408 => "Tempo limite da requisição excedido.",
        429 => "Muitas requisições. Tente novamente em alguns minutos.",
        500 => "Erro interno do servidor. Tente novamente mais tarde.",
        502 => "Serviço temporariamente indisponível.",
        503 => "Serviço em manutenção. Tente novamente mais tarde.",
        504 => "Tempo limite do gateway excedido.",
        s if s >= 500 => "Serviço indisponível. Tente novamente mais tarde.",
        s if s >= 400 => "Falha na solicitação. Verifique os dados enviados.",
        _ => "Falha na solicitação.",
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if let Some(status) = err.status() {
            Error::Http {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Error::InvalidResponse(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Http { status: 500 }.is_retryable());
        assert!(Error::Http { status: 503 }.is_retryable());
        assert!(Error::Network("reset".into()).is_retryable());
        assert!(!Error::Http { status: 404 }.is_retryable());
        assert!(!Error::Timeout.is_retryable());
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(status_message(404), "Recurso não encontrado.");
        assert_eq!(status_message(429), "Muitas requisições. Tente novamente em alguns minutos.");
        assert_eq!(status_message(507), "Serviço indisponível. Tente novamente mais tarde.");
        assert_eq!(status_message(418), "Falha na solicitação. Verifique os dados enviados.");
    }

    #[test]
    fn test_validation_display_joins_fields() {
        let err = Error::Validation(vec![
            FieldError::new("informacao", "muito curta"),
            FieldError::new("data", "formato inválido"),
        ]);
        assert_eq!(err.user_message(), "informacao: muito curta, data: formato inválido");
        assert!(err.to_string().starts_with("Validation failed"));
    }
}
