use serde::Serialize;

// 未知国家的占位代码
pub const UNKNOWN_COUNTRY_CODE: &str = "ZZ";

// 一次地理位置查询的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoResult {
    pub country_code: String,
    pub country_name: String,
    pub flag: String,
}

impl GeoResult {
    pub fn new(country_code: &str, country_name: &str) -> Self {
        GeoResult {
            country_code: country_code.to_string(),
            country_name: country_name.to_string(),
            flag: crate::utils::country::flag_emoji(country_code),
        }
    }
}

// 分组里保存的一条记录：规范化后的地址 + 查询结果 + 是哪个接口查到的
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub address: String,
    pub geo: GeoResult,
    pub provider: &'static str,
}

impl Record {
    // 输出格式: IP:端口#🇭🇰HK-香港-备用
    pub fn to_line(&self) -> String {
        format!(
            "{}#{}{}-{}-备用",
            self.address,
            self.geo.flag,
            self.geo.country_code,
            self.geo.country_name
        )
    }
}

// CSV报告的一行
#[derive(Debug, Serialize)]
pub struct CsvRow<'a> {
    pub address: &'a str,
    pub country_code: &'a str,
    pub country_name: &'a str,
    pub flag: &'a str,
    pub provider: &'a str,
}

impl<'a> From<&'a Record> for CsvRow<'a> {
    fn from(record: &'a Record) -> Self {
        CsvRow {
            address: &record.address,
            country_code: &record.geo.country_code,
            country_name: &record.geo.country_name,
            flag: &record.geo.flag,
            provider: record.provider,
        }
    }
}

// 一次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: usize,
    pub skipped_malformed: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub dropped_over_cap: usize,
    pub retained: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_line_matches_output_format() {
        let record = Record {
            address: "1.2.3.4:8443".to_string(),
            geo: GeoResult::new("US", "美国"),
            provider: "ipinfo",
        };
        assert_eq!(record.to_line(), "1.2.3.4:8443#🇺🇸US-美国-备用");
    }
}
