//config
pub const CONFIG_ALREADY_INITIALIZED: &str = "Digest config already initialized!";
pub const CONFIG_NOT_INITIALIZED: &str = "Digest config not initialized!";

//subgraph
pub const SUBGRAPH_REQUEST_FAILED: &str = "Failed to send subgraph request";
pub const SUBGRAPH_RESPONSE_FAILED: &str = "Failed to read subgraph response";
pub const SUBGRAPH_DECODE_FAILED: &str = "Failed to decode subgraph response";
pub const MOLOCH_NOT_FOUND: &str = "Moloch entity not found at subgraph";

//digest
pub const HEALTH_BIND_FAILED: &str = "Failed to bind health check listener";
