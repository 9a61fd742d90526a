//! Agent response types

use serde::{Deserialize, Serialize};

/// Agent -> client message, sent once per received job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintResult {
    pub success: bool,
    pub message: String,
    /// Assigned per attempt
    pub print_job_id: String,
}

impl PrintResult {
    /// Create a successful result
    pub fn ok(print_job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            print_job_id: print_job_id.into(),
        }
    }

    /// Create a failed result
    pub fn failed(print_job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            print_job_id: print_job_id.into(),
        }
    }
}

/// `GET /health` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub connected_clients: usize,
}

impl HealthStatus {
    pub fn healthy(connected_clients: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            connected_clients,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_wire_format() {
        let result = PrintResult::failed("job-1", "Missing print data");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": false,
                "message": "Missing print data",
                "printJobId": "job-1"
            })
        );
    }

    #[test]
    fn test_health_wire_format() {
        let json = serde_json::to_string(&HealthStatus::healthy(3)).unwrap();
        assert_eq!(json, r#"{"status":"healthy","connectedClients":3}"#);
    }
}
