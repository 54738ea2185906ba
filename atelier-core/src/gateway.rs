use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// Transaction status reported by the payment gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Authorize,
    Capture,
    Settlement,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Authorize => "authorize",
            TransactionStatus::Capture => "capture",
            TransactionStatus::Settlement => "settlement",
            TransactionStatus::Deny => "deny",
            TransactionStatus::Cancel => "cancel",
            TransactionStatus::Expire => "expire",
            TransactionStatus::Failure => "failure",
            TransactionStatus::Refund => "refund",
            TransactionStatus::PartialRefund => "partial_refund",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "authorize" => Some(TransactionStatus::Authorize),
            "capture" => Some(TransactionStatus::Capture),
            "settlement" => Some(TransactionStatus::Settlement),
            "deny" => Some(TransactionStatus::Deny),
            "cancel" => Some(TransactionStatus::Cancel),
            "expire" => Some(TransactionStatus::Expire),
            "failure" => Some(TransactionStatus::Failure),
            "refund" => Some(TransactionStatus::Refund),
            "partial_refund" => Some(TransactionStatus::PartialRefund),
            _ => None,
        }
    }
}

/// Fraud screening verdict attached to card transactions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FraudStatus {
    Accept,
    Challenge,
    Deny,
}

impl FraudStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudStatus::Accept => "accept",
            FraudStatus::Challenge => "challenge",
            FraudStatus::Deny => "deny",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(FraudStatus::Accept),
            "challenge" => Some(FraudStatus::Challenge),
            "deny" => Some(FraudStatus::Deny),
            _ => None,
        }
    }
}

/// Virtual-account detail for bank-transfer payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaNumber {
    pub bank: String,
    pub va_number: String,
}

/// Webhook payload delivered by the payment gateway. `order_id` carries the
/// merchant reference, i.e. our `order_number`. Amounts arrive as decimal
/// strings and timestamps as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayCallback {
    pub transaction_id: String,
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: TransactionStatus,
    #[serde(default)]
    pub fraud_status: Option<FraudStatus>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub va_numbers: Option<Vec<VaNumber>>,
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub payment_code: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("signature mismatch for transaction {0}")]
    SignatureMismatch(String),
    #[error("malformed gross_amount: {0}")]
    MalformedAmount(String),
}

impl GatewayCallback {
    /// Check `signature_key` against the locally computed
    /// `sha512(order_id + status_code + gross_amount + server_key)`.
    pub fn verify_signature(&self, server_key: &str) -> Result<(), GatewayError> {
        let expected = signature_for(&self.order_id, &self.status_code, &self.gross_amount, server_key);
        if constant_time_eq(expected.as_bytes(), self.signature_key.to_lowercase().as_bytes()) {
            Ok(())
        } else {
            Err(GatewayError::SignatureMismatch(self.transaction_id.clone()))
        }
    }

    /// Parse the decimal-string amount into whole currency units.
    /// IDR has no subunit, so the fractional part must be zero.
    pub fn gross_amount_units(&self) -> Result<i64, GatewayError> {
        let raw = self.gross_amount.trim();
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, f),
            None => (raw, ""),
        };
        if !frac_part.is_empty() && frac_part.bytes().any(|b| b != b'0') {
            return Err(GatewayError::MalformedAmount(self.gross_amount.clone()));
        }
        int_part
            .parse::<i64>()
            .map_err(|_| GatewayError::MalformedAmount(self.gross_amount.clone()))
    }

    pub fn transaction_time_utc(&self) -> Option<DateTime<Utc>> {
        self.transaction_time.as_deref().and_then(parse_gateway_time)
    }

    pub fn settlement_time_utc(&self) -> Option<DateTime<Utc>> {
        self.settlement_time.as_deref().and_then(parse_gateway_time)
    }

    pub fn expiry_time_utc(&self) -> Option<DateTime<Utc>> {
        self.expiry_time.as_deref().and_then(parse_gateway_time)
    }

    /// Bank reported either at top level or inside the first VA entry.
    pub fn bank_name(&self) -> Option<String> {
        self.bank.clone().or_else(|| {
            self.va_numbers
                .as_ref()
                .and_then(|v| v.first())
                .map(|v| v.bank.clone())
        })
    }

    pub fn va_number(&self) -> Option<String> {
        self.va_numbers
            .as_ref()
            .and_then(|v| v.first())
            .map(|v| v.va_number.clone())
    }
}

/// Gateway timestamps come as `YYYY-MM-DD HH:MM:SS` (UTC); RFC 3339 is
/// accepted as well for tooling that replays payloads.
pub fn parse_gateway_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn signature_for(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    let digest = hasher.finalize();
    digest.iter().fold(String::with_capacity(128), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{:02x}", b);
        out
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(signature: &str) -> GatewayCallback {
        GatewayCallback {
            transaction_id: "9aed5972-5b6a-401e-894b-a32c91ed1a3a".to_string(),
            order_id: "ORD-1".to_string(),
            status_code: "200".to_string(),
            gross_amount: "5000000.00".to_string(),
            signature_key: signature.to_string(),
            transaction_status: TransactionStatus::Settlement,
            fraud_status: Some(FraudStatus::Accept),
            payment_type: Some("bank_transfer".to_string()),
            transaction_time: Some("2025-11-13 10:00:00".to_string()),
            settlement_time: Some("2025-11-13 10:05:00".to_string()),
            expiry_time: None,
            currency: Some("IDR".to_string()),
            bank: None,
            va_numbers: Some(vec![VaNumber {
                bank: "bca".to_string(),
                va_number: "1234567890".to_string(),
            }]),
            store: None,
            payment_code: None,
        }
    }

    #[test]
    fn accepts_matching_signature() {
        let expected = signature_for("ORD-1", "200", "5000000.00", "server-key");
        let cb = callback(&expected);
        assert!(cb.verify_signature("server-key").is_ok());
    }

    #[test]
    fn rejects_bad_signature() {
        let cb = callback("deadbeef");
        let err = cb.verify_signature("server-key").unwrap_err();
        assert!(matches!(err, GatewayError::SignatureMismatch(_)));
    }

    #[test]
    fn rejects_signature_computed_with_wrong_key() {
        let forged = signature_for("ORD-1", "200", "5000000.00", "other-key");
        let cb = callback(&forged);
        assert!(cb.verify_signature("server-key").is_err());
    }

    #[test]
    fn parses_whole_unit_amounts() {
        let cb = callback("x");
        assert_eq!(cb.gross_amount_units().unwrap(), 5_000_000);

        let mut plain = callback("x");
        plain.gross_amount = "150000".to_string();
        assert_eq!(plain.gross_amount_units().unwrap(), 150_000);
    }

    #[test]
    fn rejects_fractional_amounts() {
        let mut cb = callback("x");
        cb.gross_amount = "5000000.50".to_string();
        assert!(cb.gross_amount_units().is_err());
    }

    #[test]
    fn parses_gateway_timestamps() {
        let t = parse_gateway_time("2025-11-13 10:00:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2025-11-13T10:00:00+00:00");
        assert!(parse_gateway_time("2025-11-13T10:00:00Z").is_some());
        assert!(parse_gateway_time("not a time").is_none());
    }

    #[test]
    fn bank_falls_back_to_va_entry() {
        let cb = callback("x");
        assert_eq!(cb.bank_name().as_deref(), Some("bca"));
        assert_eq!(cb.va_number().as_deref(), Some("1234567890"));
    }
}
