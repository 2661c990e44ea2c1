use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{GatewayError, GatewayResult};

/// A single charge to run against the gateway.
///
/// Required fields are validated by [`ChargeRequest::new`]; the optional
/// fields are sent to the gateway only when set.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: f64,
    pub ip_address: String,
    pub card_cryptogram_packet: String,
    pub invoice_id: Option<String>,
    pub currency: Option<String>,
    pub name: Option<String>,
    pub payment_url: Option<String>,
    pub description: Option<String>,
    pub culture_name: Option<String>,
    pub account_id: Option<String>,
    pub email: Option<String>,
}

impl ChargeRequest {
    /// Build a charge from the required fields. `amount` is in the
    /// gateway's currency units and must be positive;
    /// `card_cryptogram_packet` is the opaque token from the gateway's
    /// client-side encryption step, never a raw card number.
    pub fn new(
        amount: f64,
        ip_address: impl Into<String>,
        card_cryptogram_packet: impl Into<String>,
    ) -> GatewayResult<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(GatewayError::InvalidRequest(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        let ip_address = ip_address.into();
        if ip_address.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "ip_address must not be empty".to_string(),
            ));
        }
        let card_cryptogram_packet = card_cryptogram_packet.into();
        if card_cryptogram_packet.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "card_cryptogram_packet must not be empty".to_string(),
            ));
        }

        Ok(ChargeRequest {
            amount,
            ip_address,
            card_cryptogram_packet,
            invoice_id: None,
            currency: None,
            name: None,
            payment_url: None,
            description: None,
            culture_name: None,
            account_id: None,
            email: None,
        })
    }

    pub fn with_invoice_id(mut self, invoice_id: impl Into<String>) -> Self {
        self.invoice_id = Some(invoice_id.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Cardholder name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_payment_url(mut self, payment_url: impl Into<String>) -> Self {
        self.payment_url = Some(payment_url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_culture_name(mut self, culture_name: impl Into<String>) -> Self {
        self.culture_name = Some(culture_name.into());
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Apply a free-form field mapping. Recognized keys (`invoice_id`,
    /// `currency`, `name`, `payment_url`, `description`, `culture_name`,
    /// `account_id`, `email`) set the matching optional field; anything
    /// else is dropped and never reaches the gateway.
    pub fn apply_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in fields {
            self.set_field(key.as_ref(), value.into());
        }
        self
    }

    fn set_field(&mut self, key: &str, value: String) {
        match key {
            "invoice_id" => self.invoice_id = Some(value),
            "currency" => self.currency = Some(value),
            "name" => self.name = Some(value),
            "payment_url" => self.payment_url = Some(value),
            "description" => self.description = Some(value),
            "culture_name" => self.culture_name = Some(value),
            "account_id" => self.account_id = Some(value),
            "email" => self.email = Some(value),
            _ => {}
        }
    }

    /// Wire body for this charge, with the client's `PublicId` injected.
    pub(crate) fn payload<'a>(&'a self, public_id: &'a str) -> ChargePayload<'a> {
        ChargePayload {
            amount: self.amount,
            ip_address: &self.ip_address,
            card_cryptogram_packet: &self.card_cryptogram_packet,
            public_id,
            invoice_id: self.invoice_id.as_deref(),
            currency: self.currency.as_deref(),
            name: self.name.as_deref(),
            payment_url: self.payment_url.as_deref(),
            description: self.description.as_deref(),
            culture_name: self.culture_name.as_deref(),
            account_id: self.account_id.as_deref(),
            email: self.email.as_deref(),
        }
    }
}

/// Wire-format charge body, field names exactly as the gateway expects.
/// Absent optional fields are omitted, not sent as null.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ChargePayload<'a> {
    pub amount: f64,
    pub ip_address: &'a str,
    pub card_cryptogram_packet: &'a str,
    pub public_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub culture_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

/// Decoded gateway response. `Success` and `Message` are typed; every
/// other field the gateway sends is kept verbatim in `extra`, so a
/// successful charge hands the caller the full body unmodified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeResponse {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "Message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> ChargeRequest {
        ChargeRequest::new(120.5, "10.0.0.1", "crypto_packet").unwrap()
    }

    #[test]
    fn test_payload_required_fields_only() {
        let value = serde_json::to_value(request().payload("pk_test")).unwrap();
        assert_eq!(
            value,
            json!({
                "Amount": 120.5,
                "IpAddress": "10.0.0.1",
                "CardCryptogramPacket": "crypto_packet",
                "PublicId": "pk_test",
            })
        );
    }

    #[test]
    fn test_payload_includes_supplied_optionals() {
        let request = request()
            .with_invoice_id("1234567")
            .with_currency("RUB")
            .with_email("payer@example.com");
        let value = serde_json::to_value(request.payload("pk_test")).unwrap();

        assert_eq!(value["InvoiceId"], "1234567");
        assert_eq!(value["Currency"], "RUB");
        assert_eq!(value["Email"], "payer@example.com");
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("Description"));
        assert!(!object.contains_key("AccountId"));
    }

    #[test]
    fn test_apply_fields_drops_unrecognized_keys() {
        let request = request().apply_fields([
            ("invoice_id", "1234567"),
            ("account_id", "user-42"),
            ("track_id", "dropped"),
            ("Currency", "dropped-too"),
        ]);
        let value = serde_json::to_value(request.payload("pk_test")).unwrap();

        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "AccountId",
                "Amount",
                "CardCryptogramPacket",
                "InvoiceId",
                "IpAddress",
                "PublicId"
            ]
        );
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        for amount in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = ChargeRequest::new(amount, "10.0.0.1", "crypto_packet");
            assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        }
    }

    #[test]
    fn test_rejects_empty_required_strings() {
        assert!(matches!(
            ChargeRequest::new(10.0, "", "crypto_packet"),
            Err(GatewayError::InvalidRequest(_))
        ));
        assert!(matches!(
            ChargeRequest::new(10.0, "10.0.0.1", ""),
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_response_round_trips_verbatim() {
        let body = json!({"Success": true, "TransactionId": "123"});
        let response: ChargeResponse = serde_json::from_value(body.clone()).unwrap();
        assert!(response.success);
        assert_eq!(response.extra["TransactionId"], "123");
        assert_eq!(serde_json::to_value(&response).unwrap(), body);
    }

    #[test]
    fn test_response_requires_success_field() {
        let result: Result<ChargeResponse, _> =
            serde_json::from_value(json!({"TransactionId": "123"}));
        assert!(result.is_err());
    }
}
