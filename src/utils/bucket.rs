use crate::utils::models::Record;

use std::collections::HashMap;

// 每个国家默认最多保留的条数
pub const DEFAULT_PER_COUNTRY: usize = 10;

/// 按国家代码分组的记录，每组最多 `cap` 条。
///
/// 分组顺序 = 国家代码第一次出现的顺序，组内保持插入顺序。
#[derive(Debug)]
pub struct CountryBuckets {
    cap: usize,
    index: HashMap<String, usize>,
    groups: Vec<(String, Vec<Record>)>,
}

impl CountryBuckets {
    pub fn new(cap: usize) -> Self {
        CountryBuckets { cap, index: HashMap::new(), groups: Vec::new() }
    }

    // 组内未满时加入并返回true，已满时直接丢弃
    pub fn offer(&mut self, record: Record) -> bool {
        let code = record.geo.country_code.clone();
        let pos = match self.index.get(&code) {
            Some(&pos) => pos,
            None => {
                self.groups.push((code.clone(), Vec::new()));
                self.index.insert(code, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let list = &mut self.groups[pos].1;
        if list.len() < self.cap {
            list.push(record);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, list)| list.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // 按国家出现顺序展开所有记录
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.groups.iter().flat_map(|(_, list)| list.iter())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(code, _)| code.as_str())
    }
}

impl Default for CountryBuckets {
    fn default() -> Self {
        CountryBuckets::new(DEFAULT_PER_COUNTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::models::GeoResult;

    fn record(address: &str, code: &str) -> Record {
        Record { address: address.to_string(), geo: GeoResult::new(code, "x"), provider: "test" }
    }

    #[test]
    fn keeps_first_ten_per_country() {
        let mut buckets = CountryBuckets::default();
        let accepted: Vec<bool> = (0..15)
            .map(|i| buckets.offer(record(&format!("10.0.0.{}", i), "HK")))
            .collect();

        assert_eq!(accepted.iter().filter(|a| **a).count(), 10);
        assert!(accepted[10..].iter().all(|a| !a));

        let kept: Vec<&str> = buckets.records().map(|r| r.address.as_str()).collect();
        let expected: Vec<String> = (0..10).map(|i| format!("10.0.0.{}", i)).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn countries_keep_first_seen_order() {
        let mut buckets = CountryBuckets::new(2);
        buckets.offer(record("1.1.1.1", "US"));
        buckets.offer(record("2.2.2.2", "JP"));
        buckets.offer(record("3.3.3.3", "US"));
        buckets.offer(record("4.4.4.4", "HK"));
        buckets.offer(record("5.5.5.5", "JP"));
        buckets.offer(record("6.6.6.6", "US"));

        assert_eq!(buckets.codes().collect::<Vec<_>>(), ["US", "JP", "HK"]);
        let order: Vec<&str> = buckets.records().map(|r| r.address.as_str()).collect();
        assert_eq!(order, ["1.1.1.1", "3.3.3.3", "2.2.2.2", "5.5.5.5", "4.4.4.4"]);
        assert_eq!(buckets.len(), 5);
    }

    #[test]
    fn empty_by_default() {
        let buckets = CountryBuckets::default();
        assert!(buckets.is_empty());
        assert_eq!(buckets.codes().count(), 0);
    }
}
