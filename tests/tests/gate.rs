mod utils;
#[allow(unused)]
use utils::*;

#[cfg(feature = "integration")]
mod tests {
    use super::*;

    use anyhow::Result;
    use mock_service::RecordedCallback;
    use reqwest::Client;
    use rollgate_runtime::{
        Gate, HttpReporter, JobOutcome, JobParameters, JobRequest, LogReporter,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use url::Url;

    fn gate() -> Result<Gate<HttpReporter>> {
        let client = Client::new();
        let callback = Url::parse(MOCK_SERVICE)?;
        Ok(Gate::new(client.clone(), HttpReporter::new(client, callback))
            .batch_interval(Duration::from_secs(1)))
    }

    fn job(job_id: &str, path: &str) -> JobRequest {
        JobRequest {
            job_id: Some(job_id.to_string()),
            parameters: JobParameters {
                environment: "staging".to_string(),
                service_url: format!("{MOCK_SERVICE}{path}"),
                test_duration: Duration::from_secs(2),
            },
        }
    }

    async fn callbacks(job_id: &str) -> Result<Vec<RecordedCallback>> {
        let recorded = reqwest::get(format!("{MOCK_SERVICE}/jobs/{job_id}"))
            .await?
            .json()
            .await?;
        Ok(recorded)
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn passing_job_reports_success() -> Result<()> {
        init().await;

        let outcome = gate()?.run_job(job("pass-1", "/delay/ms/10")).await;
        assert!(outcome.passed());

        let recorded = callbacks("pass-1").await?;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].signal, "success");
        assert_eq!(recorded[0].body["TestResult"], "PASS");
        assert_eq!(recorded[0].body["SuccessRate"], "100.0");
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn failing_job_reports_failure() -> Result<()> {
        init().await;

        let outcome = gate()?.run_job(job("fail-1", "/status/500")).await;
        let JobOutcome::Completed(body) = &outcome else {
            panic!("expected a completed job, got {outcome:?}");
        };
        assert_eq!(body.metrics.success_rate, 0.);
        assert!(body.status_codes.is_empty());
        assert!(body.response_times.is_empty());
        assert_eq!(body.errors.len(), 10);
        assert_eq!(body.errors[0].error, "HTTP Error 500: Internal Server Error");

        let recorded = callbacks("fail-1").await?;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].signal, "failure");
        assert_eq!(recorded[0].body["type"], "JobFailed");
        assert!(recorded[0].body["message"]
            .as_str()
            .unwrap()
            .starts_with("Performance test failed: Success rate 0.0%"));
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn errored_job_reports_failure() -> Result<()> {
        init().await;

        let outcome = gate()?.run_job(job("error-1", "")).await;
        assert_eq!(outcome.status_code(), 500);

        let recorded = callbacks("error-1").await?;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].signal, "failure");
        assert_eq!(
            recorded[0].body["message"],
            "Performance test error: Target URL must not be empty"
        );
        Ok(())
    }

    #[tokio::test]
    #[ntest::timeout(30_000)]
    async fn jobs_run_over_http() -> Result<()> {
        init().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let gate = Gate::new(Client::new(), LogReporter).batch_interval(Duration::from_secs(1));
        let server = tokio::spawn(rollgate_runtime::serve(
            listener,
            Arc::new(gate),
            shutdown.clone(),
        ));

        let res = Client::new()
            .post(format!("http://{addr}/run"))
            .json(&serde_json::json!({
                "parameters": {
                    "environment": "production",
                    "service_url": format!("{MOCK_SERVICE}/delay/ms/5"),
                    "test_duration": "2",
                }
            }))
            .send()
            .await?;

        assert_eq!(res.status(), 200);
        let body: serde_json::Value = res.json().await?;
        assert_eq!(body["test_result"], "PASS");
        assert_eq!(body["concurrent_users"], 10);
        assert_eq!(body["test_duration"], 2);
        assert_eq!(body["metrics"]["total_requests"], 20);

        shutdown.cancel();
        server.await??;
        Ok(())
    }
}
