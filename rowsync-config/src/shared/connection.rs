use serde::{Deserialize, Serialize};

use crate::SerializableSecretString;

/// Configuration for connecting to a MySQL server.
///
/// The relay opens two kinds of connections from these settings: the replication
/// connection that streams the binlog and regular query connections for column
/// metadata lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MySqlConnectionConfig {
    /// Hostname or IP address of the MySQL server.
    pub host: String,
    /// Port number on which the MySQL server is listening.
    pub port: u16,
    /// Username for authenticating with the MySQL server.
    pub username: String,
    /// Password for the specified user. This field is sensitive and redacted in debug output.
    pub password: Option<SerializableSecretString>,
}
