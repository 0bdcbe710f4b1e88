use crate::utils::{ errors::AppError, files };

use clap::ValueEnum;
use log::info;
use regex::Regex;
use reqwest::Client;
use std::{ sync::OnceLock, time::Duration };
use url::Url;

// IP列表的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceFormat {
    /// 每行一个地址
    Text,
    /// HTML表格，第一列是地址
    Html,
}

// 读取IP列表：http(s) 开头的从网络下载，否则当作本地文件
pub async fn load_entries(
    source: &str,
    format: SourceFormat,
    timeout: Duration
) -> Result<Vec<String>, AppError> {
    let body = match Url::parse(source) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            fetch_remote(url, timeout).await?
        }
        _ => std::fs::read_to_string(source).map_err(|e| fetch_error(source, e))?,
    };

    let entries = match format {
        SourceFormat::Text => files::non_empty_lines(&body),
        SourceFormat::Html => table_first_column(&body),
    };
    if entries.is_empty() {
        return Err(fetch_error(source, "列表为空"));
    }
    info!("成功获取IP列表，共 {} 条记录", entries.len());
    Ok(entries)
}

async fn fetch_remote(url: Url, timeout: Duration) -> Result<String, AppError> {
    let source_name = url.to_string();
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| fetch_error(&source_name, e))?;
    let response = client
        .get(url)
        .send().await
        .map_err(|e| fetch_error(&source_name, e))?;
    let status = response.status();
    if !status.is_success() {
        return Err(fetch_error(&source_name, format!("HTTP状态码 {}", status.as_u16())));
    }
    response.text().await.map_err(|e| fetch_error(&source_name, e))
}

fn fetch_error(source_name: &str, detail: impl ToString) -> AppError {
    AppError::SourceFetch { source_name: source_name.to_string(), detail: detail.to_string() }
}

fn row_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr>").ok()).as_ref()
}

fn cell_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<t[dh]\b[^>]*>(.*?)(?:</t[dh]>|$)").ok()).as_ref()
}

fn tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").ok()).as_ref()
}

// 取HTML表格每一行（跳过表头）第一个单元格的文本
pub fn table_first_column(html: &str) -> Vec<String> {
    let (Some(rows), Some(cells), Some(tags)) = (row_pattern(), cell_pattern(), tag_pattern()) else {
        return Vec::new();
    };
    rows.captures_iter(html)
        .skip(1)
        .filter_map(|row| {
            let inner = row.get(1)?.as_str();
            let cell = cells.captures(inner)?.get(1)?.as_str();
            let text = decode_entities(&tags.replace_all(cell, ""));
            let text = text.trim();
            if text.is_empty() { None } else { Some(text.to_string()) }
        })
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
