mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use anyhow::Result;
    use reqwest::Client;
    use rollgate::prelude::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn config(path: &str, duration_secs: u64) -> RunConfig {
        RunConfig::new(
            "staging",
            &format!("{MOCK_SERVICE}{path}"),
            Duration::from_secs(duration_secs),
        )
    }

    async fn run(config: RunConfig) -> Result<(LoadRun, PerformanceReport)> {
        let run = LoadTest::http(config.clone())?
            .batch_interval(Duration::from_secs(1))
            .request_timeout(Duration::from_secs(5))
            .await?;
        let report = PerformanceReport::reduce(&run.outcomes, &config, &Thresholds::default());
        Ok((run, report))
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn healthy_target_passes() -> Result<()> {
        init().await;

        let (run, report) = run(config("/delay/ms/20", 3)).await?;

        assert_eq!(run.waves, 3);
        assert_eq!(report.total_requests, 15);
        assert_eq!(report.success_rate, 100.);
        assert_eq!(report.status_codes.get(&200), Some(&15));
        assert!(report.latency.avg >= Duration::from_millis(20));
        assert_eq!(report.verdict, Verdict::Pass);
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn every_client_identifies_itself() -> Result<()> {
        init().await;

        let (_, report) = run(config("/agents/scenario/user-agents", 2)).await?;
        assert_eq!(report.total_requests, 10);

        let mut seen: Vec<String> = reqwest::get(format!("{MOCK_SERVICE}/seen/user-agents"))
            .await?
            .json()
            .await?;
        seen.sort();
        seen.dedup();
        let expected: Vec<_> = (0..5).map(|n| format!("Rollgate-LoadTest-User{n}")).collect();
        assert_eq!(seen, expected);
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn ten_percent_errors_fail() -> Result<()> {
        init().await;

        let (_, report) = run(config("/flaky/10/scenario/ten-percent", 4)).await?;

        assert_eq!(report.total_requests, 20);
        assert_eq!(report.failed_requests, 2);
        assert_eq!(report.success_rate, 90.);
        assert_eq!(report.status_codes, BTreeMap::from([(200, 18)]));
        assert_eq!(report.latency.count, 18);
        assert_eq!(report.errors.len(), 2);
        assert!(report
            .errors
            .iter()
            .all(|e| e.error == "HTTP Error 500: Internal Server Error"));
        assert_eq!(report.verdict, Verdict::Fail);
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn slow_target_fails_on_latency() -> Result<()> {
        init().await;

        let config = config("/delay/ms/2100", 2);
        let run = LoadTest::http(config.clone())?
            .batch_interval(Duration::from_secs(1))
            .await?;
        let report = PerformanceReport::reduce(&run.outcomes, &config, &Thresholds::default());

        assert_eq!(report.success_rate, 100.);
        assert!(report.latency.avg > Duration::from_secs(2));
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(
            report.failure_message().split(", ").next(),
            Some("Performance test failed: Success rate 100.0%")
        );
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn hanging_target_times_out_every_request() -> Result<()> {
        init().await;

        let config = config("/hang", 1);
        let run = LoadTest::http(config.clone())?
            .batch_interval(Duration::from_secs(1))
            .request_timeout(Duration::from_millis(500))
            .await?;
        let report = PerformanceReport::reduce(&run.outcomes, &config, &Thresholds::default());

        assert_eq!(run.waves, 1);
        assert_eq!(report.total_requests, 5);
        assert_eq!(report.errors.len(), 5);
        assert!(report
            .errors
            .iter()
            .all(|e| e.error == "request timed out after 500ms"));
        assert!(report.latency_sample.is_empty());
        assert_eq!(report.verdict, Verdict::Fail);
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn shared_client_is_reused() -> Result<()> {
        init().await;

        let client = Client::builder().pool_max_idle_per_host(5).build()?;
        let config = config("/status/503", 1);
        let probe = HttpProbe::new(client, &config.target_url)?;
        let run = LoadTest::new(probe, config.clone())
            .batch_interval(Duration::from_secs(1))
            .await?;
        let report = PerformanceReport::reduce(&run.outcomes, &config, &Thresholds::default());

        assert_eq!(report.successful_requests, 0);
        assert!(report.status_codes.is_empty());
        assert_eq!(report.latency.count, 0);
        assert_eq!(report.errors.len(), 5);
        assert_eq!(report.errors[0].error, "HTTP Error 503: Service Unavailable");
        Ok(())
    }
}
