use crate::utils::{
    country::{ self, UNKNOWN_COUNTRY_NAME },
    errors::{ AppError, LookupError },
    models::{ GeoResult, UNKNOWN_COUNTRY_CODE },
};

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{ de::DeserializeOwned, Deserialize };
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// 一个地理位置查询接口
///
/// `lookup` 只接受不带端口的IP，每次调用就是一次网络请求，
/// 任何失败都以 `LookupError` 返回，不会 panic。
#[async_trait]
pub trait GeoProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn lookup(&self, ip: &str) -> Result<GeoResult, LookupError>;
}

// 可以在命令行中选择的接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    IpInfo,
    IpApi,
    GeoPlugin,
}

impl ProviderKind {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ipinfo" => Some(ProviderKind::IpInfo),
            "ip-api" | "ipapi" => Some(ProviderKind::IpApi),
            "geoplugin" => Some(ProviderKind::GeoPlugin),
            _ => None,
        }
    }
}

// 按配置顺序创建接口链
pub fn build_chain(
    kinds: &[ProviderKind],
    ipinfo_token: Option<&str>,
    timeout: Duration
) -> Result<Vec<Box<dyn GeoProvider>>, AppError> {
    let client = Client::builder().timeout(timeout).build()?;
    let mut chain: Vec<Box<dyn GeoProvider>> = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let provider: Box<dyn GeoProvider> = match kind {
            ProviderKind::IpInfo => {
                let token = ipinfo_token.ok_or_else(||
                    AppError::Config("使用ipinfo需要设置IPINFO_TOKEN".to_string())
                )?;
                Box::new(IpInfoProvider::new(client.clone(), token))
            }
            ProviderKind::IpApi => Box::new(IpApiProvider::new(client.clone())),
            ProviderKind::GeoPlugin => Box::new(GeoPluginProvider::new(client.clone())),
        };
        chain.push(provider);
    }
    Ok(chain)
}

// 发送GET请求并把响应解析成JSON，非2xx视为失败
async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    provider: &str,
    url: Url
) -> Result<T, LookupError> {
    debug!("[{}] GET {}", provider, redact_token(&url));
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::HttpStatus(status.as_u16()));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

// 日志里不输出token
fn redact_token(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

fn parse_url(raw: &str) -> Result<Url, LookupError> {
    Url::parse(raw).map_err(|e| LookupError::Parse(e.to_string()))
}

// ---------------------------------------------------------------- ipinfo.io

pub struct IpInfoProvider {
    client: Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    country: Option<String>,
}

impl IpInfoProvider {
    pub fn new(client: Client, token: &str) -> Self {
        IpInfoProvider { client, token: token.to_string() }
    }

    fn url(&self, ip: &str) -> Result<Url, LookupError> {
        let mut url = parse_url("https://ipinfo.io/")?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Parse("ipinfo url".to_string()))?
            .pop_if_empty()
            .push(ip);
        url.query_pairs_mut().append_pair("token", &self.token);
        Ok(url)
    }
}

fn ipinfo_result(data: IpInfoResponse) -> GeoResult {
    let code = data.country
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| UNKNOWN_COUNTRY_CODE.to_string());
    let name = country::country_name(&code).unwrap_or(UNKNOWN_COUNTRY_NAME);
    GeoResult::new(&code, name)
}

#[async_trait]
impl GeoProvider for IpInfoProvider {
    fn name(&self) -> &'static str {
        "ipinfo"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoResult, LookupError> {
        let url = self.url(ip)?;
        let data: IpInfoResponse = fetch_json(&self.client, self.name(), url).await?;
        Ok(ipinfo_result(data))
    }
}

// ---------------------------------------------------------------- ip-api.com

pub struct IpApiProvider {
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: Option<String>,
    message: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

impl IpApiProvider {
    pub fn new(client: Client) -> Self {
        IpApiProvider { client }
    }
}

// lang=zh-CN 时 country 已经是中文国家名
fn ip_api_result(data: IpApiResponse) -> Result<GeoResult, LookupError> {
    if data.status.as_deref() != Some("success") {
        return Err(
            LookupError::ProviderStatus(data.message.unwrap_or_else(|| "未知错误".to_string()))
        );
    }
    let code = data.country_code
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or(LookupError::MissingField("countryCode"))?;
    let name = data.country
        .filter(|c| !c.trim().is_empty())
        .or_else(|| country::country_name(&code).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_COUNTRY_NAME.to_string());
    Ok(GeoResult::new(&code, &name))
}

#[async_trait]
impl GeoProvider for IpApiProvider {
    fn name(&self) -> &'static str {
        "ip-api"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoResult, LookupError> {
        let mut url = parse_url(&format!("http://ip-api.com/json/{}", ip))?;
        url.query_pairs_mut()
            .append_pair("fields", "status,message,country,countryCode")
            .append_pair("lang", "zh-CN");
        let data: IpApiResponse = fetch_json(&self.client, self.name(), url).await?;
        ip_api_result(data)
    }
}

// ---------------------------------------------------------------- geoplugin.net

pub struct GeoPluginProvider {
    client: Client,
}

impl GeoPluginProvider {
    pub fn new(client: Client) -> Self {
        GeoPluginProvider { client }
    }
}

// geoplugin_status 有时是数字有时是字符串，这里直接按Value处理
fn geoplugin_result(data: &Value) -> Result<GeoResult, LookupError> {
    let status = match &data["geoplugin_status"] {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    if status != Some(200) {
        return Err(LookupError::ProviderStatus(format!("geoplugin_status={:?}", status)));
    }
    let code = data["geoplugin_countryCode"]
        .as_str()
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .ok_or(LookupError::MissingField("geoplugin_countryCode"))?;
    // 英文国家名优先换成中文
    let name = match country::country_name(&code) {
        Some(name) => name.to_string(),
        None =>
            data["geoplugin_countryName"]
                .as_str()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(UNKNOWN_COUNTRY_NAME)
                .to_string(),
    };
    Ok(GeoResult::new(&code, &name))
}

#[async_trait]
impl GeoProvider for GeoPluginProvider {
    fn name(&self) -> &'static str {
        "geoplugin"
    }

    async fn lookup(&self, ip: &str) -> Result<GeoResult, LookupError> {
        let mut url = parse_url("http://www.geoplugin.net/json.gp")?;
        url.query_pairs_mut().append_pair("ip", ip);
        let data: Value = fetch_json(&self.client, self.name(), url).await?;
        geoplugin_result(&data)
    }
}
