use crate::utils::{
    bucket::CountryBuckets,
    common::random_delay,
    config::Config,
    errors::AppError,
    files,
    models::{ Record, RunSummary },
    network::normalize_entry,
    provider::build_chain,
    resolver::Resolver,
    source::load_entries,
};

use log::{ info, warn };
use std::time::Duration;

// 列表 -> 规范化 -> 逐条查询 -> 按国家分组
pub struct Pipeline {
    resolver: Resolver,
    strict: bool,
    delay_min: Duration,
    delay_max: Duration,
}

impl Pipeline {
    pub fn new(resolver: Resolver, strict: bool, delay_min: Duration, delay_max: Duration) -> Self {
        Pipeline { resolver, strict, delay_min, delay_max }
    }

    /// 处理一批原始行，把查询成功的地址放进 `buckets` 后交还给调用方。
    ///
    /// 格式不对的行直接跳过，不会发起查询；每两条查询之间都会等待一段时间，无论上一条是否成功。
    /// 最后一条查询之后不再等待，后面没有请求需要限速。
    pub async fn process(
        &self,
        entries: &[String],
        mut buckets: CountryBuckets
    ) -> (CountryBuckets, RunSummary) {
        let mut summary = RunSummary { lines_read: entries.len(), ..RunSummary::default() };

        let addresses: Vec<String> = entries
            .iter()
            .filter_map(|line| normalize_entry(line, self.strict))
            .collect();
        summary.skipped_malformed = entries.len() - addresses.len();

        for (i, address) in addresses.iter().enumerate() {
            if i > 0 {
                let pause = random_delay(self.delay_min, self.delay_max, &mut rand::thread_rng());
                tokio::time::sleep(pause).await;
            }
            match self.resolver.resolve(address).await {
                Some(resolution) => {
                    summary.resolved += 1;
                    info!(
                        "已处理: {} -> {}{}-{}",
                        address,
                        resolution.geo.flag,
                        resolution.geo.country_code,
                        resolution.geo.country_name
                    );
                    let record = Record {
                        address: address.clone(),
                        geo: resolution.geo,
                        provider: resolution.provider,
                    };
                    if !buckets.offer(record) {
                        summary.dropped_over_cap += 1;
                    }
                }
                None => {
                    summary.unresolved += 1;
                    warn!("无法获取 {} 的国家信息，已跳过", address);
                }
            }
        }

        summary.retained = buckets.len();
        (buckets, summary)
    }
}

/// 执行一次完整的流程并写出结果文件。
///
/// 获取列表失败时写一个空的结果文件并正常返回。
pub async fn run(config: &Config) -> Result<RunSummary, AppError> {
    let chain = build_chain(&config.providers, config.ipinfo_token.as_deref(), config.timeout)?;
    let resolver = Resolver::new(chain, config.attempts, config.retry_delay);
    let pipeline = Pipeline::new(resolver, config.strict, config.delay_min, config.delay_max);

    let entries = match load_entries(&config.source, config.format, config.source_timeout).await {
        Ok(entries) => entries,
        Err(e @ AppError::SourceFetch { .. }) => {
            warn!("{}，没有有效的IP列表，写入空文件 {}", e, config.output.display());
            files::write_empty(&config.output)?;
            return Ok(RunSummary::default());
        }
        Err(e) => {
            return Err(e);
        }
    };

    let (buckets, summary) = pipeline.process(&entries, CountryBuckets::new(config.per_country)).await;

    if buckets.is_empty() {
        warn!("没有查询到任何结果，结果文件为空");
    }
    files::write_output(&config.output, &buckets)?;
    if let Some(csv) = &config.csv {
        files::write_to_csv(csv, &buckets)?;
        info!("CSV报告已保存到 {}", csv.display());
    }
    info!(
        "处理完成，{} 个国家，共生成 {} 条记录并保存到 {}",
        buckets.codes().count(),
        summary.retained,
        config.output.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{
        config::Args,
        files::serialize,
        models::GeoResult,
        provider::{ GeoProvider, ProviderKind },
        resolver::tests::ScriptedProvider,
        source::SourceFormat,
    };
    use clap::Parser;
    use std::{ path::PathBuf, sync::{ Arc, Mutex } };

    fn pipeline(providers: Vec<ScriptedProvider>) -> (Pipeline, Vec<Arc<Mutex<Vec<String>>>>) {
        let calls = providers.iter().map(|p| p.calls.clone()).collect();
        let boxed: Vec<Box<dyn GeoProvider>> = providers
            .into_iter()
            .map(|p| Box::new(p) as Box<dyn GeoProvider>)
            .collect();
        let resolver = Resolver::new(boxed, 2, Duration::ZERO);
        (Pipeline::new(resolver, false, Duration::ZERO, Duration::ZERO), calls)
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn us() -> Option<GeoResult> {
        Some(GeoResult::new("US", "美国"))
    }

    #[tokio::test]
    async fn plain_address_becomes_output_line() {
        let (p, _) = pipeline(vec![ScriptedProvider::new("ipinfo", vec![us()])]);
        let (buckets, summary) = p.process(&lines(&["1.2.3.4"]), CountryBuckets::default()).await;
        assert_eq!(serialize(&buckets), "1.2.3.4#🇺🇸US-美国-备用");
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.retained, 1);
    }

    #[tokio::test]
    async fn marker_port_and_comment_are_handled() {
        let (p, calls) = pipeline(vec![ScriptedProvider::new("ipinfo", vec![us()])]);
        let (buckets, _) = p.process(&lines(&["★1.2.3.4:8443 #comment"]), CountryBuckets::default()).await;
        assert_eq!(serialize(&buckets), "1.2.3.4:8443#🇺🇸US-美国-备用");
        // 查询时不带端口
        assert_eq!(*calls[0].lock().unwrap(), ["1.2.3.4"]);
    }

    #[tokio::test]
    async fn only_first_ten_per_country_are_kept() {
        let hk = Some(GeoResult::new("HK", "香港"));
        let (p, _) = pipeline(vec![ScriptedProvider::new("ipinfo", vec![hk; 15])]);
        let entries: Vec<String> = (1..=15).map(|i| format!("10.0.0.{}", i)).collect();

        let (buckets, summary) = p.process(&entries, CountryBuckets::default()).await;
        let output = serialize(&buckets);
        let kept: Vec<&str> = output.lines().collect();
        assert_eq!(kept.len(), 10);
        for (i, line) in kept.iter().enumerate() {
            assert_eq!(*line, format!("10.0.0.{}#🇭🇰HK-香港-备用", i + 1));
        }
        assert_eq!(summary.dropped_over_cap, 5);
        assert_eq!(summary.retained, 10);
    }

    #[tokio::test]
    async fn fallback_result_is_used() {
        let (p, _) = pipeline(vec![
            ScriptedProvider::new("ipinfo", vec![None, None]),
            ScriptedProvider::new("geoplugin", vec![Some(GeoResult::new("SG", "新加坡"))])
        ]);
        let (buckets, _) = p.process(&lines(&["8.8.8.8"]), CountryBuckets::default()).await;
        let record = buckets.records().next().unwrap();
        assert_eq!(record.geo.country_name, "新加坡");
        assert_eq!(record.provider, "geoplugin");
    }

    #[tokio::test]
    async fn malformed_line_makes_no_query() {
        let (p, calls) = pipeline(vec![ScriptedProvider::new("ipinfo", vec![us()])]);
        let (buckets, summary) = p.process(&lines(&["not-an-ip"]), CountryBuckets::default()).await;
        assert!(buckets.is_empty());
        assert!(calls[0].lock().unwrap().is_empty());
        assert_eq!(summary.skipped_malformed, 1);
        assert_eq!(serialize(&buckets), "");
    }

    #[tokio::test]
    async fn unresolved_address_is_skipped_and_run_continues() {
        let (p, _) = pipeline(vec![ScriptedProvider::new("ipinfo", vec![None, None, us()])]);
        let (buckets, summary) = p.process(&lines(&["1.1.1.1", "2.2.2.2"]), CountryBuckets::default()).await;
        assert_eq!(serialize(&buckets), "2.2.2.2#🇺🇸US-美国-备用");
        assert_eq!(summary.unresolved, 1);
        assert_eq!(summary.resolved, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_entries_even_after_failure() {
        let provider = ScriptedProvider::new("ipinfo", vec![None, None, us(), us()]);
        let resolver = Resolver::new(vec![Box::new(provider)], 2, Duration::ZERO);
        let p = Pipeline::new(resolver, false, Duration::from_secs(1), Duration::from_secs(1));

        let start = tokio::time::Instant::now();
        p.process(&lines(&["1.1.1.1", "bad", "2.2.2.2", "3.3.3.3"]), CountryBuckets::default()).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    fn config(source: PathBuf, output: PathBuf) -> Config {
        let mut args = Args::try_parse_from(["ip-country-top10", "--providers", "geoplugin"]).unwrap();
        args.source = source.to_string_lossy().into_owned();
        args.output = output;
        args.format = SourceFormat::Text;
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.providers, [ProviderKind::GeoPlugin]);
        config
    }

    #[tokio::test]
    async fn unreachable_source_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("top10.txt");
        std::fs::write(&output, "stale").unwrap();

        let summary = run(&config(dir.path().join("missing.txt"), output.clone())).await.unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }

    #[tokio::test]
    async fn source_with_only_malformed_lines_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ip.txt");
        std::fs::write(&source, "not-an-ip\n# comment\n").unwrap();
        let output = dir.path().join("top10.txt");

        let summary = run(&config(source, output.clone())).await.unwrap();
        assert_eq!(summary.skipped_malformed, 2);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
    }
}
