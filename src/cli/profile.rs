use serde::Deserialize;

use crate::{
    cli::{AuthOptions, authorize},
    error, info,
    spotify::transport::read_json,
    success,
};

const ENDPOINT_ME: &str = "/v1/me";

#[derive(Debug, Deserialize)]
struct UserProfile {
    id: String,
    display_name: Option<String>,
    email: Option<String>,
    country: Option<String>,
    product: Option<String>,
}

pub async fn me(opts: AuthOptions) {
    let client = authorize(&opts).await;

    let response = match client.transport().get(ENDPOINT_ME, &[], &[]).await {
        Ok(r) => r,
        Err(e) => error!("Failed to request current user profile: {}", e),
    };
    let profile: UserProfile = match read_json(response).await {
        Ok(p) => p,
        Err(e) => error!("Failed to get current user profile: {}", e),
    };

    success!(
        "Signed in as {}",
        profile.display_name.as_deref().unwrap_or(&profile.id)
    );
    info!("User id: {}", profile.id);
    if let Some(email) = profile.email {
        info!("Email: {}", email);
    }
    if let Some(country) = profile.country {
        info!("Country: {}", country);
    }
    if let Some(product) = profile.product {
        info!("Subscription: {}", product);
    }
}
