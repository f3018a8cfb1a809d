use chrono::Duration;
use tubely_api::auth::make_jwt;
use uuid::Uuid;

/// Signing secret shared by the test app and the tokens minted here.
pub const TEST_JWT_SECRET: &str = "tubely-test-secret-at-least-32-characters";

pub fn token_for(user_id: Uuid) -> String {
    make_jwt(user_id, TEST_JWT_SECRET, Duration::hours(1)).expect("Failed to mint token")
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}
