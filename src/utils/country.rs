use super::models::UNKNOWN_COUNTRY_CODE;

// 国家代码 -> 中文名（可扩展）
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("HK", "香港"),
    ("CN", "中国"),
    ("US", "美国"),
    ("JP", "日本"),
    ("SG", "新加坡"),
    ("KR", "韩国"),
    ("TW", "台湾"),
    ("MO", "澳门"),
    ("AU", "澳大利亚"),
    ("DE", "德国"),
    ("PH", "菲律宾"),
    ("GB", "英国"),
    ("FR", "法国"),
    ("IN", "印度"),
    ("TH", "泰国"),
    ("VN", "越南"),
    ("MY", "马来西亚"),
    ("ID", "印度尼西亚"),
    ("CA", "加拿大"),
    ("NL", "荷兰"),
    ("RU", "俄罗斯"),
    ("IT", "意大利"),
    ("ES", "西班牙"),
    ("SE", "瑞典"),
    ("CH", "瑞士"),
    ("PL", "波兰"),
    ("FI", "芬兰"),
    ("IE", "爱尔兰"),
    ("BR", "巴西"),
    ("AE", "阿联酋"),
    ("TR", "土耳其"),
    ("ZA", "南非"),
    ("NZ", "新西兰"),
    ("MX", "墨西哥"),
    ("AR", "阿根廷"),
    (UNKNOWN_COUNTRY_CODE, "未知"),
];

// 未知国家名
pub const UNKNOWN_COUNTRY_NAME: &str = "未知";

// 未知国家使用的旗帜
const UNKNOWN_FLAG: &str = "🏳️";

// 'A' 对应的区域指示符号
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

pub fn country_name(code: &str) -> Option<&'static str> {
    COUNTRY_NAMES.iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

// 根据国家代码生成国旗emoji，代码不是两个字母时返回空字符串
pub fn flag_emoji(code: &str) -> String {
    if code == UNKNOWN_COUNTRY_CODE {
        return UNKNOWN_FLAG.to_string();
    }
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }
    code.chars()
        .filter_map(|c| {
            let offset = (c.to_ascii_uppercase() as u32) - ('A' as u32);
            char::from_u32(REGIONAL_INDICATOR_A + offset)
        })
        .collect()
}
