use thiserror::Error;

// 会让程序提前结束的错误
#[derive(Debug, Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("获取IP列表失败({source_name}): {detail}")]
    SourceFetch {
        source_name: String,
        detail: String,
    },

    #[error("HTTP客户端初始化失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("写入CSV失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("日志初始化失败: {0}")]
    Logger(#[from] fern::InitError),
}

// 单次查询失败的原因，只会被记录，不会中断程序
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("网络错误: {0}")]
    Transport(String),

    #[error("查询超时")]
    Timeout,

    #[error("HTTP状态码 {0}")]
    HttpStatus(u16),

    #[error("接口返回失败: {0}")]
    ProviderStatus(String),

    #[error("解析响应失败: {0}")]
    Parse(String),

    #[error("响应缺少字段 {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(e: serde_json::Error) -> Self {
        LookupError::Parse(e.to_string())
    }
}
