//! AWS SDK client setup.

use aws_sdk_dynamodb::config::Credentials;
use aws_sdk_dynamodb::Client;
use tablestore_core::ConnectionDescriptor;

/// Name reported by the static credentials provider.
const CREDENTIALS_PROVIDER: &str = "tablestore";

/// Creates a DynamoDB client bound to the descriptor's region, credentials
/// and (optional) endpoint. No environment or profile resolution takes place.
pub async fn create_client(descriptor: &ConnectionDescriptor) -> Client {
    let credentials = Credentials::new(
        descriptor.access_key_id(),
        descriptor.secret_access_key(),
        descriptor.session_token().map(str::to_string),
        None,
        CREDENTIALS_PROVIDER,
    );

    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(descriptor.region().to_string()))
        .credentials_provider(credentials);

    if let Some(endpoint) = descriptor.endpoint_url() {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}
