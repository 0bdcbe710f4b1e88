use crate::utils::{ models::GeoResult, network::strip_port, provider::GeoProvider };

use log::{ debug, warn };
use std::time::Duration;

// 查询到的结果以及是哪个接口给出的
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub geo: GeoResult,
    pub provider: &'static str,
}

/// 按顺序依次尝试各个接口，每个接口最多 `attempts` 次，同一接口两次尝试之间等待 `retry_delay`。
///
/// 任何一次成功都会直接返回；全部失败时返回 `None`，由调用方跳过该地址。
pub struct Resolver {
    providers: Vec<Box<dyn GeoProvider>>,
    attempts: u32,
    retry_delay: Duration,
}

impl Resolver {
    pub fn new(providers: Vec<Box<dyn GeoProvider>>, attempts: u32, retry_delay: Duration) -> Self {
        Resolver { providers, attempts: attempts.max(1), retry_delay }
    }

    pub async fn resolve(&self, address: &str) -> Option<Resolution> {
        let ip = strip_port(address);
        for provider in &self.providers {
            for attempt in 1..=self.attempts {
                match provider.lookup(ip).await {
                    Ok(geo) => {
                        return Some(Resolution { geo, provider: provider.name() });
                    }
                    Err(e) => {
                        warn!(
                            "{} | {} 查询失败({}/{}): {}",
                            ip,
                            provider.name(),
                            attempt,
                            self.attempts,
                            e
                        );
                        if attempt < self.attempts {
                            tokio::time::sleep(self.retry_delay).await;
                        }
                    }
                }
            }
            debug!("{} | {} 已用完重试次数，换下一个接口", ip, provider.name());
        }
        None
    }
}
