pub const TOP_LEVEL_DOMAIN: &str = "org";
pub const AUTHOR: &str = "schemadocs";
pub const APP_NAME: &str = "schemadocs";

pub const SERVER_CONFIG_FILE_NAME: &str = "server.toml";
pub const UNIX_SOCKET_FILE_NAME: &str = "search.sock";

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:3000";
