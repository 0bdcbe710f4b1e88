use crate::utils::{
    bucket::DEFAULT_PER_COUNTRY,
    errors::AppError,
    provider::ProviderKind,
    source::SourceFormat,
};

use clap::Parser;
use std::{ path::PathBuf, time::Duration };

pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/kgdpyeifk/cfipcaiji/refs/heads/main/ip.txt";

#[derive(Parser, Debug, Clone)]
#[command(version, about = "查询IP所属国家，每个国家保留前N条，写入文本文件")]
pub struct Args {
    /// IP列表的URL或本地文件路径
    #[arg(short, long, default_value = DEFAULT_SOURCE_URL)]
    pub source: String,

    /// IP列表的格式
    #[arg(short, long, value_enum, default_value_t = SourceFormat::Text)]
    pub format: SourceFormat,

    /// 结果文件
    #[arg(short, long, default_value = "top10.txt")]
    pub output: PathBuf,

    /// 额外输出一份CSV报告
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// 查询接口的顺序，可选 ipinfo、ip-api、geoplugin
    #[arg(long, value_delimiter = ',', default_values = ["ipinfo", "geoplugin"])]
    pub providers: Vec<String>,

    /// ipinfo.io 的 token
    #[arg(long, env = "IPINFO_TOKEN", hide_env_values = true)]
    pub ipinfo_token: Option<String>,

    /// 每个接口最多尝试的次数
    #[arg(long, default_value_t = 2)]
    pub attempts: u32,

    /// 同一接口两次尝试之间等待的秒数
    #[arg(long, default_value_t = 3.0)]
    pub retry_delay: f64,

    /// 单次查询的超时秒数
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /// 获取IP列表的超时秒数
    #[arg(long, default_value_t = 15)]
    pub source_timeout: u64,

    /// 每条记录处理后最少等待的秒数
    #[arg(long, default_value_t = 2.0)]
    pub delay_min: f64,

    /// 每条记录处理后最多等待的秒数（与最少值相等时为固定等待）
    #[arg(long, default_value_t = 4.0)]
    pub delay_max: f64,

    /// 每个国家最多保留的条数
    #[arg(long, default_value_t = DEFAULT_PER_COUNTRY)]
    pub per_country: usize,

    /// 校验IP每段0-255、端口1-65535
    #[arg(long)]
    pub strict: bool,

    /// 输出调试日志
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// 只输出警告和错误
    #[arg(short, long)]
    pub quiet: bool,
}

// 校验后的运行配置
#[derive(Debug, Clone)]
pub struct Config {
    pub source: String,
    pub format: SourceFormat,
    pub output: PathBuf,
    pub csv: Option<PathBuf>,
    pub providers: Vec<ProviderKind>,
    pub ipinfo_token: Option<String>,
    pub attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    pub source_timeout: Duration,
    pub delay_min: Duration,
    pub delay_max: Duration,
    pub per_country: usize,
    pub strict: bool,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, AppError> {
        let mut providers = Vec::with_capacity(args.providers.len());
        for name in args.providers.iter().filter(|n| !n.trim().is_empty()) {
            let kind = ProviderKind::parse(name).ok_or_else(||
                AppError::Config(format!("未知的查询接口: {}", name))
            )?;
            providers.push(kind);
        }
        if providers.is_empty() {
            return Err(AppError::Config("至少需要一个查询接口".to_string()));
        }

        let ipinfo_token = args.ipinfo_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if providers.contains(&ProviderKind::IpInfo) && ipinfo_token.is_none() {
            return Err(AppError::Config("缺少IPINFO_TOKEN，无法使用ipinfo接口".to_string()));
        }

        if args.attempts == 0 {
            return Err(AppError::Config("attempts 至少为1".to_string()));
        }
        if args.per_country == 0 {
            return Err(AppError::Config("per-country 至少为1".to_string()));
        }
        let retry_delay = seconds("retry-delay", args.retry_delay)?;
        let delay_min = seconds("delay-min", args.delay_min)?;
        let delay_max = seconds("delay-max", args.delay_max)?;
        if delay_min > delay_max {
            return Err(AppError::Config("delay-min 不能大于 delay-max".to_string()));
        }

        Ok(Config {
            source: args.source,
            format: args.format,
            output: args.output,
            csv: args.csv,
            providers,
            ipinfo_token,
            attempts: args.attempts,
            retry_delay,
            timeout: Duration::from_secs(args.timeout),
            source_timeout: Duration::from_secs(args.source_timeout),
            delay_min,
            delay_max,
            per_country: args.per_country,
            strict: args.strict,
        })
    }
}

fn seconds(name: &str, value: f64) -> Result<Duration, AppError> {
    Duration::try_from_secs_f64(value).map_err(|_|
        AppError::Config(format!("{} 必须是非负的秒数: {}", name, value))
    )
}
