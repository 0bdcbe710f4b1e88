use regex::Regex;
use std::{ net::Ipv4Addr, sync::OnceLock };

// 行首的标记符号，例如 ★1.2.3.4
const MARKER_GLYPHS: &[char] = &['★', '☆', '*'];

fn address_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]{1,3}(?:\.[0-9]{1,3}){3})(?::([0-9]{1,5}))?$").ok()).as_ref()
}

// 把一行原始文本整理成 IP 或 IP:端口，不符合格式的返回None
//
// strict 为 false 时只检查数字位数（999.1.1.1、端口 0 都能通过）
pub fn normalize_entry(raw: &str, strict: bool) -> Option<String> {
    let line = raw.trim().trim_start_matches(MARKER_GLYPHS).trim();
    let line = line.split('#').next().unwrap_or_default().trim();
    // 表格里的 http://1.2.3.4 之类，只保留最后一个 "//" 后面的部分
    let line = match line.rfind("//") {
        Some(pos) => line[pos + 2..].trim(),
        None => line,
    };
    if line.is_empty() {
        return None;
    }

    let caps = address_pattern()?.captures(line)?;
    let ip = caps.get(1)?.as_str();
    let port = caps.get(2).map(|m| m.as_str());

    if strict && !in_range(ip, port) {
        return None;
    }

    match port {
        Some(port) => Some(format!("{}:{}", ip, port)),
        None => Some(ip.to_string()),
    }
}

fn in_range(ip: &str, port: Option<&str>) -> bool {
    if ip.parse::<Ipv4Addr>().is_err() {
        return false;
    }
    match port {
        Some(port) => matches!(port.parse::<u32>(), Ok(1..=65535)),
        None => true,
    }
}

// 去掉端口，接口只接受纯IP
pub fn strip_port(address: &str) -> &str {
    address.split(':').next().unwrap_or(address)
}
