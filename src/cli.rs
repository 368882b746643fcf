//! Command-line argument parsing for sqlserver-executor.
//!
//! Uses clap to parse CLI arguments. Connection flags override the values of
//! the selected configuration profile.

use crate::config::PartialProfile;
use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

const CONFIG_EXAMPLE: &str = r#"配置文件示例 (~/.sqlserver-executor.json):
{
    "default": "dev",
    "connections": {
        "dev": {
            "server": "localhost",
            "database": "DevDB",
            "user": "sa",
            "password": "password",
            "port": 1433
        },
        "prod": {
            "server": "prod-server",
            "database": "ProdDB",
            "user": "app_user",
            "password": "secret",
            "port": 1433
        }
    }
}"#;

/// SQL Server 执行器 - 支持除 DELETE 外的所有 SQL 操作
#[derive(Parser, Debug)]
#[command(name = "sqlserver-executor")]
#[command(version, about, long_about = None, after_help = CONFIG_EXAMPLE)]
pub struct Cli {
    /// 配置文件路径
    #[arg(short = 'c', long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 使用指定的配置名称
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// 列出所有可用配置
    #[arg(long)]
    pub list_profiles: bool,

    /// 服务器地址
    #[arg(short = 's', long, value_name = "SERVER")]
    pub server: Option<String>,

    /// 数据库名
    #[arg(short = 'd', long, value_name = "DATABASE")]
    pub database: Option<String>,

    /// 用户名
    #[arg(short = 'u', long, value_name = "USER")]
    pub user: Option<String>,

    /// 密码
    #[arg(
        short = 'p',
        long,
        value_name = "PASSWORD",
        env = "SQLSERVER_EXECUTOR_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// 端口号 (默认: 1433)
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// SQL 语句
    #[arg(short = 'q', long, value_name = "SQL")]
    pub query: Option<String>,

    /// SQL 文件路径
    #[arg(short = 'f', long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// 输出格式
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// 输出调试日志到 stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Connection fields given on the command line.
    pub fn overrides(&self) -> PartialProfile {
        PartialProfile {
            server: self.server.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            port: self.port,
        }
    }
}
