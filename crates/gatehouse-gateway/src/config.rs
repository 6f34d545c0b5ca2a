use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const LISTEN_ADDR_ENV: &str = "GATEHOUSE_LISTEN_ADDR";
pub const REDIS_URL_ENV: &str = "GATEHOUSE_REDIS_URL";
pub const ALLOWED_ORIGINS_ENV: &str = "GATEHOUSE_ALLOWED_ORIGINS";
pub const CANDIDATE_FILE_ENV: &str = "GATEHOUSE_CANDIDATE_FILE";
pub const SEED_USERS_ENV: &str = "GATEHOUSE_SEED_USERS";
pub const NODE_URL_TEMPLATE_ENV: &str = "GATEHOUSE_NODE_URL_TEMPLATE";
pub const COOKIE_DOMAIN_ENV: &str = "GATEHOUSE_COOKIE_DOMAIN";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_CANDIDATE_FILE: &str = "candidates.txt";
pub const DEFAULT_NODE_URL_TEMPLATE: &str = "https://node{n}.internal";

#[derive(Debug, Parser)]
#[command(name = "gatehouse-gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Redis connection URL. When absent the gateway runs on the in-memory
    /// store: fine for a single process, state dies with it.
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    /// Comma-separated list of allowed CORS origins.
    #[arg(long, env = ALLOWED_ORIGINS_ENV, value_delimiter = ',', default_value = "http://localhost:8000")]
    pub allowed_origins: Vec<String>,

    /// Line-delimited credential fingerprint file for the jump pool.
    #[arg(long, env = CANDIDATE_FILE_ENV, default_value = DEFAULT_CANDIDATE_FILE)]
    pub candidate_file: PathBuf,

    /// Credential blob of `("user", "pass")` pairs. When set, the store is
    /// flushed and re-seeded at startup and the candidate file rewritten.
    #[arg(long, env = SEED_USERS_ENV)]
    pub seed_users: Option<String>,

    /// Node base URL template for the jump flow; `{n}` is the node index.
    #[arg(long, env = NODE_URL_TEMPLATE_ENV, default_value = DEFAULT_NODE_URL_TEMPLATE)]
    pub node_url_template: String,

    /// Domain attribute for the relayed access-token cookie.
    #[arg(long, env = COOKIE_DOMAIN_ENV)]
    pub cookie_domain: Option<String>,
}
