//! Real browser runs of the Playwright driver against a stub login page
//!
//! The page served here uses the same markup as the application's login form
//! so the default selectors apply. These tests need Node and Playwright, so
//! they are ignored by default:
//!
//! cargo test --package loginprobe-e2e --test browser_login -- --ignored

use axum::response::Html;
use axum::routing::get;
use axum::Router;

use loginprobe_common::outcome::{DASHBOARD_HEADING, INVALID_CREDENTIALS_TEXT, USER_BLOCKED_TEXT};
use loginprobe_common::{Outcome, UserRecord, UserStatus};
use loginprobe_e2e::playwright::{PlaywrightConfig, PlaywrightHandle};
use loginprobe_e2e::{E2eError, LoginDriver, ObservedOutcome};

const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Login</title></head>
<body>
<div id="root">
  <form>
    <span data-test-id="login"><input name="login"></span>
    <span data-test-id="password"><input name="password" type="password"></span>
    <button type="button" class="button_theme_alfa-on-white">Продолжить</button>
  </form>
  <div data-test-id="error-notification" hidden>
    <div class="notification__content"></div>
  </div>
</div>
<script>
  const users = {
    "active-user": { password: "s3cret-pass", status: "active" },
    "blocked-user": { password: "s3cret-pass", status: "blocked" },
  };
  document.querySelector("button").addEventListener("click", () => {
    const login = document.querySelector("[data-test-id=login] input").value;
    const password = document.querySelector("[data-test-id=password] input").value;
    const user = users[login];
    setTimeout(() => {
      if (user && user.password === password && user.status === "active") {
        document.getElementById("root").innerHTML =
          '<h2 class="heading_theme_alfa-on-white">__DASHBOARD__</h2>';
        return;
      }
      const notification = document.querySelector("[data-test-id=error-notification]");
      notification.querySelector(".notification__content").textContent =
        user && user.password === password ? "__BLOCKED__" : "__INVALID__";
      notification.hidden = false;
    }, 200);
  });
</script>
</body>
</html>
"#;

/// A form whose submit button does nothing
const SILENT_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"></head>
<body>
  <form>
    <span data-test-id="login"><input></span>
    <span data-test-id="password"><input type="password"></span>
    <button type="button" class="button_theme_alfa-on-white">Продолжить</button>
  </form>
</body>
</html>
"#;

fn login_page() -> String {
    LOGIN_PAGE
        .replace("__DASHBOARD__", DASHBOARD_HEADING)
        .replace("__BLOCKED__", USER_BLOCKED_TEXT)
        .replace("__INVALID__", INVALID_CREDENTIALS_TEXT)
}

/// Serve the login page at `/` and the silent form at `/silent/`
async fn spawn_page() -> String {
    let page = login_page();
    let app = Router::new()
        .route("/", get(move || std::future::ready(Html(page.clone()))))
        .route("/silent/", get(|| async { Html(SILENT_PAGE) }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Node, Playwright and its Node package must all be present. Login scripts
/// run from a temp dir, so the package is resolved from there too.
fn browser_available() -> bool {
    if PlaywrightHandle::check_playwright_installed().is_err() {
        eprintln!("npx playwright is not available; skipping");
        return false;
    }
    let module = std::process::Command::new("node")
        .args(["-e", "require('playwright')"])
        .current_dir(std::env::temp_dir())
        .status();
    if !matches!(module, Ok(status) if status.success()) {
        eprintln!("the playwright Node package cannot be loaded; skipping");
        return false;
    }
    true
}

fn driver(base_url: String, screenshots: &std::path::Path, outcome_timeout_ms: u64) -> PlaywrightHandle {
    PlaywrightHandle::new(PlaywrightConfig {
        base_url,
        screenshot_dir: screenshots.to_path_buf(),
        outcome_timeout_ms,
        ..Default::default()
    })
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn login_page_outcomes_are_observed() {
    if !browser_available() {
        return;
    }
    let screenshots = tempfile::tempdir().unwrap();
    let driver = driver(spawn_page().await, screenshots.path(), 10_000);

    let cases = [
        (
            UserRecord::new("active-user", "s3cret-pass", UserStatus::Active),
            ObservedOutcome::Authenticated {
                heading: DASHBOARD_HEADING.to_string(),
            },
            Outcome::Authenticated,
        ),
        (
            UserRecord::new("blocked-user", "s3cret-pass", UserStatus::Blocked),
            ObservedOutcome::Notification {
                text: USER_BLOCKED_TEXT.to_string(),
            },
            Outcome::UserBlocked,
        ),
        (
            UserRecord::new("active-user", "wrong-pass", UserStatus::Active),
            ObservedOutcome::Notification {
                text: INVALID_CREDENTIALS_TEXT.to_string(),
            },
            Outcome::InvalidCredentials,
        ),
        (
            UserRecord::new("nobody", "s3cret-pass", UserStatus::Active),
            ObservedOutcome::Notification {
                text: INVALID_CREDENTIALS_TEXT.to_string(),
            },
            Outcome::InvalidCredentials,
        ),
    ];

    for (credentials, expected, outcome) in cases {
        let observed = driver.attempt_login(&credentials).await.unwrap();
        assert_eq!(observed, expected, "login {}", credentials.login());
        assert_eq!(observed.classify(), Some(outcome));
    }
}

#[tokio::test]
#[ignore]
async fn silent_page_times_out_with_screenshot() {
    if !browser_available() {
        return;
    }
    let screenshots = tempfile::tempdir().unwrap();
    let base_url = format!("{}/silent", spawn_page().await);
    let driver = driver(base_url, screenshots.path(), 1_500);

    let credentials = UserRecord::new("active-user", "s3cret-pass", UserStatus::Active);
    let err = driver.attempt_login(&credentials).await.unwrap_err();

    assert!(matches!(err, E2eError::Timeout(msg) if msg.contains("1500 ms")));
    assert!(screenshots.path().join("last-failure.png").exists());
}
