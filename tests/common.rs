use cloudpay::auth::Credentials;
use cloudpay::gateway::ChargeClient;
use cloudpay::types::ChargeRequest;

pub const PUBLIC_ID: &str = "pk_test_0001";
pub const API_SECRET: &str = "sk_test_secret";

pub fn test_client(base_url: &str) -> ChargeClient {
    ChargeClient::builder(Credentials::new(PUBLIC_ID, API_SECRET).unwrap())
        .with_base_url(base_url)
        .build()
        .unwrap()
}

pub fn test_request(ip_address: &str) -> ChargeRequest {
    ChargeRequest::new(120.5, ip_address, "crypto_packet_AAA").unwrap()
}
