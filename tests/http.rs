use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Entry {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Totals {
    intake: i64,
    burn: i64,
    net: i64,
}

#[derive(Debug, Deserialize)]
struct DaySummary {
    date: String,
    meals: Vec<Entry>,
    workouts: Vec<Entry>,
    totals: Totals,
    meal_count: usize,
}

#[derive(Debug, Deserialize)]
struct AddEntryResponse {
    entry: Option<Entry>,
    day: DaySummary,
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

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "calorie_counter_http_{}_{}.json",
        std::process::id(),
        nanos
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client
            .get(format!("{base_url}/api/days/2000-01-01"))
            .send()
            .await
        {
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
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_calorie_counter"))
        .env("HOST", "127.0.0.1")
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
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

async fn get_day(client: &Client, server: &TestServer, date: &str) -> DaySummary {
    client
        .get(format!("{}/api/days/{date}", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn add(
    client: &Client,
    server: &TestServer,
    date: &str,
    kind: &str,
    body: serde_json::Value,
) -> AddEntryResponse {
    let response = client
        .post(format!("{}/api/days/{date}/entries/{kind}", server.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_add_entries_updates_totals() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2030-01-10";

    let added = add(
        &client,
        &server,
        date,
        "meals",
        serde_json::json!({ "name": "Oatmeal", "calories": 350 }),
    )
    .await;
    assert_eq!(added.entry.as_ref().map(|e| e.name.as_str()), Some("Oatmeal"));
    assert_eq!(added.day.totals.intake, 350);

    add(
        &client,
        &server,
        date,
        "workouts",
        serde_json::json!({ "name": "Cycling", "calories": "400" }),
    )
    .await;

    let day = get_day(&client, &server, date).await;
    assert_eq!(day.date, date);
    assert_eq!(day.meals.len(), 1);
    assert_eq!(day.workouts.len(), 1);
    assert_eq!(day.totals.intake, 350);
    assert_eq!(day.totals.burn, 400);
    assert_eq!(day.totals.net, -50);
}

#[tokio::test]
async fn http_invalid_input_is_ignored() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2030-01-11";

    for body in [
        serde_json::json!({ "name": "", "calories": 100 }),
        serde_json::json!({ "name": "Soup", "calories": -5 }),
        serde_json::json!({ "name": "Soup", "calories": "abc" }),
        serde_json::json!({ "name": "Soup" }),
    ] {
        let response = add(&client, &server, date, "meals", body).await;
        assert!(response.entry.is_none());
        assert_eq!(response.day.meal_count, 0);
    }

    assert_eq!(get_day(&client, &server, date).await.meal_count, 0);
}

#[tokio::test]
async fn http_export_csv() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2024-01-01";

    add(
        &client,
        &server,
        date,
        "meals",
        serde_json::json!({ "name": "Eggs", "calories": 300 }),
    )
    .await;
    add(
        &client,
        &server,
        date,
        "workouts",
        serde_json::json!({ "name": "Run", "calories": 250 }),
    )
    .await;

    let response = client
        .get(format!("{}/days/{date}/export.csv", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()["content-disposition"],
        "attachment; filename=\"calorie-log_2024-01-01.csv\""
    );

    let body = response.text().await.unwrap();
    assert_eq!(
        body,
        "date,type,name,calories\n\
         2024-01-01,meal,Eggs,300\n\
         2024-01-01,workout,Run,250\n\
         2024-01-01,total,intake,300\n\
         2024-01-01,total,burn,250\n\
         2024-01-01,total,net,50"
    );
}

#[tokio::test]
async fn http_form_flow_renders_and_clears() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let date = "2030-01-12";

    let page = client
        .post(format!("{}/days/{date}/entries/meals", server.base_url))
        .form(&[("name", "Soup, \"hot\""), ("calories", "180")])
        .send()
        .await
        .unwrap();
    assert!(page.status().is_success());
    let html = page.text().await.unwrap();
    assert!(html.contains("Soup, &quot;hot&quot;"));
    assert!(html.contains("180 kcal"));

    let ignored = client
        .post(format!("{}/days/{date}/entries/workouts", server.base_url))
        .form(&[("name", "Walk"), ("calories", "-5")])
        .send()
        .await
        .unwrap();
    assert!(ignored.status().is_success());

    let day = get_day(&client, &server, date).await;
    assert_eq!(day.meals.len(), 1);
    assert!(day.workouts.is_empty());

    let csv = client
        .get(format!("{}/days/{date}/export.csv", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(csv.contains("2030-01-12,meal,\"Soup, \"\"hot\"\"\",180"));

    let cleared = client
        .post(format!("{}/days/{date}/clear", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(cleared.status().is_success());
    assert_eq!(get_day(&client, &server, date).await.meal_count, 0);
}

#[tokio::test]
async fn http_delete_and_date_isolation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let kept = add(
        &client,
        &server,
        "2030-02-01",
        "meals",
        serde_json::json!({ "name": "Pasta", "calories": 700 }),
    )
    .await;
    let doomed = add(
        &client,
        &server,
        "2030-02-02",
        "meals",
        serde_json::json!({ "name": "Cake", "calories": 450 }),
    )
    .await
    .entry
    .expect("entry accepted");

    let day: DaySummary = client
        .delete(format!(
            "{}/api/days/2030-02-02/entries/meals/{}",
            server.base_url, doomed.id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(day.meals.is_empty());
    assert_eq!(day.totals.intake, 0);

    let other = get_day(&client, &server, "2030-02-01").await;
    assert_eq!(other.meals.len(), 1);
    assert_eq!(other.meals[0].id, kept.entry.unwrap().id);

    let cleared: DaySummary = client
        .delete(format!("{}/api/days/2030-02-01", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(cleared.meals.is_empty());
}

#[tokio::test]
async fn http_bad_dates_are_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/days/2024-13-01", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/?date=yesterday", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Calorie Counter"));
}
