//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 60;

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const DEFAULT_RESOURCE_CONTROLLER_URL: &str = "https://resource-controller.cloud.ibm.com";

// Path suffixes appended to the configured base URLs
pub const TOKEN_PATH: &str = "/identity/token";
pub const RESOURCE_KEYS_PATH: &str = "/v2/resource_keys";

pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

// Environment fallbacks, read once by the config loader
pub const ENV_API_KEY: &str = "IBMCLOUD_API_KEY";
pub const ENV_IAM_URL: &str = "IBMCLOUD_IAM_URL";
pub const ENV_RESOURCE_CONTROLLER_URL: &str = "IBMCLOUD_RESOURCE_CONTROLLER_URL";

pub const NOT_FOUND_MESSAGE: &str = "No key found";
