// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use handoff_gate::{
	auth::ApiKey,
	http::PartnerRequest,
	partner::PartnerDescriptor,
	token::{PARTNER_TOKEN_HEADER, ReqwestTokenCache, TokenCache},
	url::Url,
};

const API_KEY: &str = "integration-api-key";

fn build_cache(server: &MockServer) -> ReqwestTokenCache {
	let descriptor = PartnerDescriptor::new(
		Url::parse(&server.url("/partner/token"))
			.expect("Mock token endpoint URL should parse successfully."),
		ApiKey::new(API_KEY),
	);

	TokenCache::new(descriptor)
}

fn cards_request(server: &MockServer) -> PartnerRequest {
	PartnerRequest::get(
		Url::parse(&server.url("/partner/cards"))
			.expect("Mock cards endpoint URL should parse successfully."),
	)
}

fn success_body(token: &str) -> String {
	json!({
		"status": "success",
		"data": { "jwttoken": token, "expiresAt": "2099-01-01T00:00:00Z" },
	})
	.to_string()
}

#[tokio::test]
async fn request_carries_the_partner_token_header() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/partner/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(success_body("bearer-jwt"));
		})
		.await;
	let cards_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/partner/cards")
				.header(PARTNER_TOKEN_HEADER, "bearer-jwt");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"cards":[]}"#);
		})
		.await;
	let response = cache
		.authenticated_request(cards_request(&server))
		.await
		.expect("Authenticated request should succeed.");

	assert_eq!(response.status.as_u16(), 200);

	cards_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn stale_token_is_refreshed_and_retried_once() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	// Warm the cache with a token the data endpoint will reject, then swap the mock so
	// the post-invalidation fetch hands out the accepted one.
	let mut stale_token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/partner/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(success_body("stale-jwt"));
		})
		.await;

	cache.token().await.expect("Warm-up token fetch should succeed.");
	stale_token_mock.delete_async().await;

	let fresh_token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/partner/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(success_body("fresh-jwt"));
		})
		.await;
	let rejected_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/partner/cards").header(PARTNER_TOKEN_HEADER, "stale-jwt");
			then.status(401).body(r#"{"status":"error"}"#);
		})
		.await;
	let accepted_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/partner/cards").header(PARTNER_TOKEN_HEADER, "fresh-jwt");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"cards":[{"name":"Millennia"}]}"#);
		})
		.await;
	let response = cache
		.authenticated_request(cards_request(&server))
		.await
		.expect("Rejected request should be retried with a fresh token.");

	assert_eq!(response.status.as_u16(), 200);

	rejected_mock.assert_calls_async(1).await;
	accepted_mock.assert_calls_async(1).await;
	fresh_token_mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn repeated_rejection_is_returned_without_looping() {
	let server = MockServer::start_async().await;
	let cache = build_cache(&server);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/partner/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(success_body("revoked-jwt"));
		})
		.await;
	let cards_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/partner/cards");
			then.status(401).body(r#"{"status":"error"}"#);
		})
		.await;
	let response = cache
		.authenticated_request(cards_request(&server))
		.await
		.expect("Second rejection should surface as a response, not an error.");

	assert_eq!(response.status.as_u16(), 401);

	// Exactly one retry: two data calls, two token fetches, then the caller decides.
	cards_mock.assert_calls_async(2).await;
	token_mock.assert_calls_async(2).await;
}
