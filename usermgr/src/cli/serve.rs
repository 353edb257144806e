//! serve サブコマンド
//!
//! HTTPサーバーを起動します。未指定の項目は環境変数の設定を使います。

use crate::config::ServerConfig;
use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// SQLite database URL
    #[arg(long)]
    pub database_url: Option<String>,
}

impl ServeArgs {
    /// 引数で環境変数由来の設定を上書きする
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
        config
    }
}
