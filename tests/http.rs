use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineRecord {
    label: String,
    week_num: i32,
    phase: String,
    actual: Option<Value>,
    forecast: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkResponse {
    network: String,
    volume_gain_pct: f64,
    metric_base: f64,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

const SAMPLE_CSV: &str = "week,impressions,clicks,installs,spend,cpi,cvr,actions\n\
W1,100000,4800,394,134988,342,0.082,120\n\
W2,102000,4900,401,136000,339,0.081,125\n\
W3,99000,4700,380,133000,350,0.080,118";

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/seeds")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_campaign_sim"))
        .env("PORT", port.to_string())
        .env("SIM_START_MONTH", "5")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn fetch_timeline(client: &Client, base_url: &str, campaign: &str) -> Vec<TimelineRecord> {
    client
        .get(format!("{base_url}/api/timeline?campaign={campaign}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_demo_timeline_has_partitioned_phases() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let timeline = fetch_timeline(&client, &server.base_url, "c1").await;
    assert_eq!(timeline.len(), 24);
    assert_eq!(timeline.iter().filter(|r| r.phase == "historical").count(), 12);

    for record in &timeline {
        if record.phase == "historical" {
            assert!(record.actual.is_some() && record.forecast.is_none());
        } else {
            assert_eq!(record.phase, "forecast");
            assert!(record.actual.is_none() && record.forecast.is_some());
            let action = record.forecast.as_ref().unwrap()["bidAction"].as_str().unwrap();
            assert!(["Scale Up", "Hold", "Scale Down"].contains(&action));
        }
    }
    for pair in timeline.windows(2) {
        assert!(pair[0].week_num < pair[1].week_num);
    }

    let again = fetch_timeline(&client, &server.base_url, "c1").await;
    assert_eq!(
        timeline[0].actual.as_ref().unwrap()["cpi"],
        again[0].actual.as_ref().unwrap()["cpi"]
    );
}

#[tokio::test]
async fn http_upload_drives_timeline_until_cleared() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/upload", server.base_url))
        .body(SAMPLE_CSV)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let upload: Value = response.json().await.unwrap();
    assert_eq!(upload["rows"], 3);
    assert_eq!(upload["lastWeek"], "W3");

    let timeline = fetch_timeline(&client, &server.base_url, "all").await;
    assert_eq!(timeline.len(), 15);
    assert_eq!(timeline[0].label, "W1");
    assert_eq!(timeline[3].label, "W1");
    assert_eq!(timeline[3].week_num, 1);
    let first_forecast = timeline[3].forecast.as_ref().unwrap();
    assert!(first_forecast["cpa"].is_object());
    assert!(first_forecast["cprt"].is_null());

    let network: Vec<NetworkResponse> = client
        .get(format!("{}/api/network?bid=20&metric=cpi", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(network[0].metric_base, 350.0);

    let cleared = client
        .delete(format!("{}/api/upload", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(cleared.status(), StatusCode::NO_CONTENT);

    let timeline = fetch_timeline(&client, &server.base_url, "all").await;
    assert_eq!(timeline.len(), 24);
}

#[tokio::test]
async fn http_invalid_upload_keeps_current_data() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/upload", server.base_url))
        .body("week,installs\nW1,0")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = response.text().await.unwrap();
    assert!(message.contains("Expected columns"));

    let timeline = fetch_timeline(&client, &server.base_url, "all").await;
    assert_eq!(timeline.len(), 24);
}

#[tokio::test]
async fn http_network_view_validates_inputs() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let network: Vec<NetworkResponse> = client
        .get(format!("{}/api/network?bid=100&metric=cpa", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = network.iter().map(|n| n.network.as_str()).collect();
    assert_eq!(names, ["Search", "YouTube", "Display"]);
    assert_eq!(network[0].volume_gain_pct, 60.0);

    let too_high = client
        .get(format!("{}/api/network?bid=150", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(too_high.status(), StatusCode::BAD_REQUEST);

    let off_grid = client
        .get(format!("{}/api/network?bid=22", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(off_grid.status(), StatusCode::BAD_REQUEST);

    let bad_metric = client
        .get(format!("{}/api/curves?metric=roas", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_metric.status(), StatusCode::BAD_REQUEST);

    let unknown = client
        .get(format!("{}/api/timeline?campaign=nope", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let curves: Vec<Value> = client
        .get(format!("{}/api/curves?metric=cpft", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(curves.len(), 21);
}

#[tokio::test]
async fn http_targets_feed_summary() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let rejected = client
        .put(format!("{}/api/targets", server.base_url))
        .json(&serde_json::json!({ "cpi": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    let accepted = client
        .put(format!("{}/api/targets", server.base_url))
        .json(&serde_json::json!({ "cpi": 300.0 }))
        .send()
        .await
        .unwrap();
    assert!(accepted.status().is_success());

    let summary: Value = client
        .get(format!("{}/api/summary?metric=cpi", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["target"], 300.0);
    assert_eq!(summary["historicalWeeks"], 12);
    assert_eq!(summary["bidChanges"][0]["weekNum"], 1);

    let reset = client
        .put(format!("{}/api/targets", server.base_url))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert!(reset.status().is_success());
}
