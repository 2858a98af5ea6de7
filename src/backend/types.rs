//! Wire types for the hosted backend.

use serde::{Deserialize, Serialize};

/// Health payload returned by the backend's `/api/health` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    /// Reported status ("ok" or "error").
    pub status: String,
    /// Timestamp the backend stamped the report with.
    pub timestamp: Option<String>,
    /// App identifier the backend saw on the request.
    #[serde(rename = "appId")]
    pub app_id: Option<String>,
    /// Hosted backend state.
    pub manifest: Option<String>,
    /// Backend version.
    pub version: Option<String>,
    /// Deployment environment.
    pub environment: Option<String>,
    /// Port the backend reports.
    pub port: Option<String>,
    /// Error message on the failure path.
    pub error: Option<String>,
}

impl HealthReport {
    /// Whether the backend reported itself healthy.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Session token returned by login/signup.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionToken {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Envelope for `find()` responses: `{ "data": [...] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct FindResponse<T> {
    /// Matching records.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// An authenticated dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Record identifier.
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Login email.
    pub email: String,
    /// Role, e.g. "owner".
    #[serde(default)]
    pub role: Option<String>,
}

/// A restaurant owned by a dashboard user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    /// Record identifier (absent on create).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Restaurant name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
    /// Owning user id.
    #[serde(rename = "ownerId")]
    pub owner_id: u64,
}

/// A menu item belonging to a restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    /// Record identifier (absent on create).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Item name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Price in the restaurant's currency.
    pub price: f64,
    /// Menu category, e.g. "Main".
    pub category: String,
    /// Restaurant the item belongs to.
    #[serde(rename = "restaurantId")]
    pub restaurant_id: u64,
    /// Owning user id.
    #[serde(rename = "ownerId")]
    pub owner_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn health_report_decodes_success_payload() {
        let report: HealthReport = serde_json::from_str(
            r#"{"status":"ok","timestamp":"2025-01-01T00:00:00Z","appId":"dash","manifest":"running","version":"1.0.0","environment":"production","port":"1111"}"#,
        )
        .unwrap();
        assert!(report.is_ok());
        assert_eq!(report.app_id.as_deref(), Some("dash"));
    }

    #[test]
    fn health_report_decodes_error_payload() {
        let report: HealthReport = serde_json::from_str(
            r#"{"status":"error","timestamp":"2025-01-01T00:00:00Z","appId":"dash","error":"boom"}"#,
        )
        .unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.error.as_deref(), Some("boom"));
    }

    #[test]
    fn find_response_defaults_to_empty_data() {
        let response: FindResponse<Restaurant> = serde_json::from_str("{}").unwrap();
        assert!(response.data.is_empty());
    }

    #[test]
    fn menu_item_round_trips_camel_case() {
        let item = MenuItem {
            id: None,
            name: "Margherita".to_string(),
            description: None,
            price: 11.5,
            category: "Main".to_string(),
            restaurant_id: 4,
            owner_id: 2,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["restaurantId"], 4);
        assert_eq!(json["ownerId"], 2);
        assert!(json.get("id").is_none());
    }
}
