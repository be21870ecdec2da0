use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CompanyStats, CompanySummary, ManifestType, NewProtocol, NewUser, Protocol, ProtocolStatus,
    User, UserRole,
};

// --- Error taxonomy ---

#[derive(Debug, Error)]
pub enum StoreError {
    // Every transport failure collapses to one fixed message for the UI;
    // the underlying error survives only as the source, for the log.
    #[error("Erro de conexão: Verifique sua internet ou se o projeto Supabase está ativo.")]
    Connection(#[source] reqwest::Error),

    // The store's own error body, surfaced verbatim.
    #[error("{0}")]
    Store(String),

    // A success status whose body does not decode as the expected rows.
    #[error("Resposta inesperada do servidor: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

// --- Domain operations ---

pub trait RowStore {
    fn login(&self, identifier: &str, password: &str, role: UserRole) -> Result<Option<User>>;
    fn register(&self, user: &NewUser) -> Result<Option<User>>;
    fn companies(&self) -> Result<Vec<CompanySummary>>;
    fn create_protocol(&self, input: &NewProtocol) -> Result<Protocol>;
    fn protocols_for(&self, user_id: &str) -> Result<Vec<Protocol>>;
    fn company_stats(&self, company_id: &str) -> Result<CompanyStats>;
}

// --- REST client ---

pub struct StoreClient {
    rest_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl StoreClient {
    pub fn new(store_url: &str, api_key: String) -> Self {
        Self {
            rest_url: format!("{}/rest/v1", store_url.trim_end_matches('/')),
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let request = self
            .client
            .get(format!("{}/{}", self.rest_url, table))
            .query(query);
        let body = self.execute(request)?;
        decode_rows(&body)
    }

    fn insert<B: Serialize, T: DeserializeOwned>(&self, table: &str, row: &B) -> Result<Vec<T>> {
        let request = self
            .client
            .post(format!("{}/{}", self.rest_url, table))
            .header("Prefer", "return=representation")
            .json(row);
        let body = self.execute(request)?;
        decode_rows(&body)
    }

    // Attaches the key headers, sends, and applies the error taxonomy.
    // Returns the raw success body; decoding is the caller's problem.
    fn execute(&self, request: reqwest::blocking::RequestBuilder) -> Result<String> {
        let response = request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .map_err(|err| {
                warn!(error = %err, "store request failed to send");
                StoreError::Connection(err)
            })?;

        let status = response.status();
        let body = response.text().map_err(StoreError::Connection)?;
        if !status.is_success() {
            warn!(%status, "store request rejected");
            return Err(StoreError::Store(extract_error_message(&body)));
        }
        debug!(%status, bytes = body.len(), "store request ok");
        Ok(body)
    }
}

impl RowStore for StoreClient {
    fn login(&self, identifier: &str, password: &str, role: UserRole) -> Result<Option<User>> {
        // Empty credentials would become `eq.` filters matching nothing
        // useful; resolve them locally as not-found.
        if identifier.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let rows: Vec<User> = self.select(
            "users",
            &[
                ("identifier", format!("eq.{identifier}")),
                ("password", format!("eq.{password}")),
                ("role", format!("eq.{}", role.as_str())),
            ],
        )?;
        Ok(rows.into_iter().next())
    }

    fn register(&self, user: &NewUser) -> Result<Option<User>> {
        let mut payload = user.clone();
        payload.avatar_url = normalize_ref(payload.avatar_url);
        payload.company_id = normalize_ref(payload.company_id);
        let rows: Vec<User> = self.insert("users", &payload)?;
        Ok(rows.into_iter().next())
    }

    fn companies(&self) -> Result<Vec<CompanySummary>> {
        self.select(
            "users",
            &[
                ("role", format!("eq.{}", UserRole::Company.as_str())),
                ("select", "id,name,avatar_url".to_string()),
            ],
        )
    }

    fn create_protocol(&self, input: &NewProtocol) -> Result<Protocol> {
        // The display id is random; an unlucky duplicate gets a fresh roll
        // instead of surfacing the store's constraint error.
        let mut attempts = DISPLAY_ID_ATTEMPTS;
        loop {
            let row = build_protocol_row(input);
            let result: Result<Vec<Protocol>> = self.insert("protocols", &row);
            match result {
                Ok(rows) => {
                    return rows.into_iter().next().ok_or_else(|| {
                        StoreError::InvalidResponse("linha criada não retornada".to_string())
                    });
                }
                Err(err) => {
                    attempts -= 1;
                    if attempts == 0 || !is_duplicate_id_error(&err) {
                        return Err(err);
                    }
                    warn!(id = %row.id, "display id collision, retrying with a fresh id");
                }
            }
        }
    }

    fn protocols_for(&self, user_id: &str) -> Result<Vec<Protocol>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }
        self.select(
            "protocols",
            &[
                ("userId", format!("eq.{user_id}")),
                ("order", "createdAt.desc".to_string()),
            ],
        )
    }

    fn company_stats(&self, company_id: &str) -> Result<CompanyStats> {
        // The store rejects an empty string in uuid filter position, so an
        // unset reference short-circuits to the zero result.
        if company_id.is_empty() {
            return Ok(CompanyStats::default());
        }
        let praises: Vec<Protocol> = self.select(
            "protocols",
            &[
                ("targetCompanyId", format!("eq.{company_id}")),
                ("type", format!("eq.{}", ManifestType::Praise.as_str())),
                ("order", "createdAt.desc".to_string()),
            ],
        )?;
        let apprentices: Vec<IdRow> = self.select(
            "users",
            &[
                ("company_id", format!("eq.{company_id}")),
                ("select", "id".to_string()),
            ],
        )?;
        Ok(CompanyStats {
            praises,
            apprentice_count: apprentices.len(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: String,
}

// --- Helpers ---

fn decode_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    // A bodyless success is a valid empty result, not an error.
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|err| StoreError::InvalidResponse(err.to_string()))
}

// The store reports errors as JSON with a `message` or `error` field;
// anything else is passed through raw.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    body.to_string()
}

fn normalize_ref(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn build_protocol_row(input: &NewProtocol) -> Protocol {
    Protocol {
        id: new_display_id(),
        user_id: input.user_id.clone(),
        target_company_id: normalize_ref(input.target_company_id.clone()),
        kind: input.kind,
        reason: input.reason.clone(),
        description: input.description.clone(),
        ai_refinement: input.ai_refinement.clone(),
        legal_analysis: input.legal_analysis.clone(),
        status: ProtocolStatus::Received,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

// Six random decimal digits. Collisions stay possible; the retry above only
// rerolls a bounded number of times before the store error surfaces.
const DISPLAY_ID_ATTEMPTS: u32 = 3;

fn new_display_id() -> String {
    let digits = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("PJA-{digits}")
}

// Postgres reports a primary-key collision as a unique-constraint
// violation; any other store error is not worth a reroll.
fn is_duplicate_id_error(err: &StoreError) -> bool {
    matches!(err, StoreError::Store(message) if message.contains("duplicate key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    // Points at a closed local port, so any accidental network call fails
    // fast instead of hanging.
    fn unreachable_client() -> StoreClient {
        StoreClient::new("http://127.0.0.1:1", "test-key".to_string())
    }

    #[test]
    fn test_login_with_empty_credentials_skips_network() {
        let store = unreachable_client();
        assert!(store.login("", "secret1", UserRole::Apprentice).unwrap().is_none());
        assert!(store.login("12345", "", UserRole::Apprentice).unwrap().is_none());
        assert!(store.login("", "", UserRole::Company).unwrap().is_none());
    }

    #[test]
    fn test_protocols_for_empty_user_skips_network() {
        let store = unreachable_client();
        assert!(store.protocols_for("").unwrap().is_empty());
    }

    #[test]
    fn test_company_stats_empty_company_skips_network() {
        let store = unreachable_client();
        let stats = store.company_stats("").unwrap();
        assert!(stats.praises.is_empty());
        assert_eq!(stats.apprentice_count, 0);
    }

    #[test]
    fn test_unreachable_store_reports_fixed_connection_message() {
        let store = unreachable_client();
        let err = store.companies().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Erro de conexão: Verifique sua internet ou se o projeto Supabase está ativo."
        );
    }

    #[test]
    fn test_normalize_ref() {
        assert_eq!(normalize_ref(Some("c1".to_string())), Some("c1".to_string()));
        assert_eq!(normalize_ref(Some(String::new())), None);
        assert_eq!(normalize_ref(None), None);
    }

    #[test]
    fn test_extract_error_message_prefers_message_field() {
        let body = r#"{"message":"duplicate key value","code":"23505"}"#;
        assert_eq!(extract_error_message(body), "duplicate key value");
    }

    #[test]
    fn test_extract_error_message_falls_back_to_error_field() {
        let body = r#"{"error":"invalid api key"}"#;
        assert_eq!(extract_error_message(body), "invalid api key");

        let empty_message = r#"{"message":"","error":"invalid api key"}"#;
        assert_eq!(extract_error_message(empty_message), "invalid api key");
    }

    #[test]
    fn test_extract_error_message_raw_text() {
        assert_eq!(extract_error_message("gateway timeout"), "gateway timeout");
        assert_eq!(extract_error_message(r#"{"hint":null}"#), r#"{"hint":null}"#);
    }

    #[test]
    fn test_decode_rows_empty_body_is_empty_result() {
        let rows: Vec<Protocol> = decode_rows("").unwrap();
        assert!(rows.is_empty());
        let rows: Vec<Protocol> = decode_rows("  \n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_decode_rows_rejects_malformed_body() {
        let result: Result<Vec<Protocol>> = decode_rows("<html>bad gateway</html>");
        assert!(matches!(result, Err(StoreError::InvalidResponse(_))));
    }

    #[test]
    fn test_build_protocol_row_defaults() {
        let input = NewProtocol {
            user_id: "u1".to_string(),
            target_company_id: Some(String::new()),
            kind: ManifestType::Complaint,
            reason: "Ambiente de Trabalho".to_string(),
            description: "Relato.".to_string(),
            ai_refinement: None,
            legal_analysis: None,
        };
        let row = build_protocol_row(&input);
        assert_eq!(row.status, ProtocolStatus::Received);
        assert_eq!(row.target_company_id, None);
        assert!(row.created_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&row.created_at).is_ok());
    }

    #[test]
    fn test_display_id_format() {
        let id_format = Regex::new(r"^PJA-\d{6}$").unwrap();
        for _ in 0..100 {
            let id = new_display_id();
            assert!(id_format.is_match(&id), "bad id: {id}");
        }
    }

    #[test]
    fn test_duplicate_id_detection() {
        let duplicate = StoreError::Store(
            "duplicate key value violates unique constraint \"protocols_pkey\"".to_string(),
        );
        assert!(is_duplicate_id_error(&duplicate));

        let other = StoreError::Store("permission denied for table protocols".to_string());
        assert!(!is_duplicate_id_error(&other));

        let connection = unreachable_client().companies().unwrap_err();
        assert!(!is_duplicate_id_error(&connection));
    }
}
