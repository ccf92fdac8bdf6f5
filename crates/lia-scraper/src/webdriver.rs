//! [`PageDriver`] backed by a W3C WebDriver endpoint (chromedriver or any
//! compatible remote).
//!
//! One session drives one Chrome window with a persistent user-data
//! directory, so a manual login survives across runs.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::{Client, Method};
use serde_json::{json, Map, Value};

use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::pacing::{until_driver_ready, StartupBackoff};

/// Key under which W3C WebDriver serializes element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CONNECT_BACKOFF: StartupBackoff = StartupBackoff {
    first_delay: Duration::from_millis(500),
    retries: 3,
};

/// Error codes that mean "try the click again shortly".
const TRANSIENT_CLICK_ERRORS: [&str; 3] = [
    "element not interactable",
    "element click intercepted",
    "stale element reference",
];

#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Base URL of the WebDriver server, e.g. `http://localhost:9515`.
    pub endpoint: String,
    pub headless: bool,
    /// Chrome profile directory holding the logged-in session.
    pub user_data_dir: PathBuf,
    /// Bound on clicks and other polled actions.
    pub action_timeout: Duration,
    /// Bound on a single HTTP round trip to the WebDriver server.
    pub request_timeout: Duration,
}

impl WebDriverConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>, user_data_dir: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headless: false,
            user_data_dir: user_data_dir.into(),
            action_timeout: Duration::from_secs(4),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// WebDriver element reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }

    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(ELEMENT_KEY.to_owned(), Value::String(self.0.clone()));
        Value::Object(map)
    }
}

/// A live WebDriver session.
pub struct WebDriverPage {
    client: Client,
    session_url: String,
    action_timeout: Duration,
}

impl std::fmt::Debug for WebDriverPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverPage")
            .field("session_url", &self.session_url)
            .field("action_timeout", &self.action_timeout)
            .finish_non_exhaustive()
    }
}

impl WebDriverPage {
    /// Starts a Chrome session and grants it clipboard access.
    ///
    /// Connection failures are retried with backoff while the WebDriver
    /// server is still starting up. Failing to grant clipboard permissions
    /// is logged and tolerated; links will then come back empty.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the HTTP client cannot be built or the
    /// server refuses to create a session.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self, DriverError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let endpoint = config.endpoint.trim_end_matches('/').to_owned();
        let capabilities = session_capabilities(config);
        let new_session_url = format!("{endpoint}/session");

        let value = until_driver_ready(CONNECT_BACKOFF, || {
            send_command(&client, Method::POST, &new_session_url, Some(&capabilities))
        })
        .await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or(DriverError::MissingValue("sessionId"))?;

        tracing::info!(
            session_id,
            endpoint = %endpoint,
            headless = config.headless,
            "WebDriver session started"
        );

        let page = Self {
            session_url: format!("{endpoint}/session/{session_id}"),
            client,
            action_timeout: config.action_timeout,
        };
        page.grant_clipboard_permissions().await;
        Ok(page)
    }

    /// Ends the session and closes the browser window.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] if the server rejects the request.
    pub async fn close(self) -> Result<(), DriverError> {
        send_command(&self.client, Method::DELETE, &self.session_url, None).await?;
        tracing::info!("WebDriver session closed");
        Ok(())
    }

    async fn grant_clipboard_permissions(&self) {
        for name in ["clipboard-read", "clipboard-write"] {
            let body = json!({ "descriptor": { "name": name }, "state": "granted" });
            if let Err(e) = self.post("permissions", &body).await {
                tracing::warn!(permission = name, error = %e, "could not grant clipboard permission");
            }
        }
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, DriverError> {
        let url = format!("{}/{path}", self.session_url);
        send_command(&self.client, Method::POST, &url, Some(body)).await
    }

    async fn get(&self, path: &str) -> Result<Value, DriverError> {
        let url = format!("{}/{path}", self.session_url);
        send_command(&self.client, Method::GET, &url, None).await
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.post("execute/sync", &json!({ "script": script, "args": args }))
            .await
    }

    async fn find(
        &self,
        scope: Option<&ElementRef>,
        using: &str,
        value: &str,
    ) -> Result<Vec<ElementRef>, DriverError> {
        let path = match scope {
            Some(el) => format!("element/{}/elements", el.id()),
            None => "elements".to_owned(),
        };
        let found = self
            .post(&path, &json!({ "using": using, "value": value }))
            .await?;
        parse_elements(&found)
    }

    async fn find_first(
        &self,
        scope: Option<&ElementRef>,
        using: &str,
        value: &str,
    ) -> Result<Option<ElementRef>, DriverError> {
        Ok(self.find(scope, using, value).await?.into_iter().next())
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool, DriverError> {
        let value = self
            .get(&format!("element/{}/displayed", element.id()))
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

impl PageDriver for WebDriverPage {
    type Element = ElementRef;

    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        tracing::debug!(url, "navigating");
        self.post("url", &json!({ "url": url })).await?;
        Ok(())
    }

    async fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        Ok(self.find(None, "css selector", selector).await?.len())
    }

    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> Result<bool, DriverError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(first) = self.find_first(None, "css selector", selector).await? {
                match self.is_displayed(&first).await {
                    Ok(true) => return Ok(true),
                    Ok(false) => {}
                    Err(DriverError::WebDriver { error, .. })
                        if error == "stale element reference" => {}
                    Err(e) => return Err(e),
                }
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_by(&mut self, dy: i64) -> Result<(), DriverError> {
        self.execute("window.scrollBy(0, arguments[0]);", vec![json!(dy)])
            .await?;
        Ok(())
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        self.find(None, "css selector", selector).await
    }

    async fn find_within(
        &mut self,
        scope: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, DriverError> {
        self.find_first(Some(scope), "css selector", selector).await
    }

    async fn find_by_role(
        &mut self,
        scope: Option<&ElementRef>,
        role: &str,
        name: &str,
    ) -> Result<Option<ElementRef>, DriverError> {
        let xpath = role_xpath(scope.is_some(), role, name);
        self.find_first(scope, "xpath", &xpath).await
    }

    async fn find_by_text(&mut self, text: &str) -> Result<Option<ElementRef>, DriverError> {
        let xpath = format!("//*[normalize-space(text())={}]", xpath_literal(text));
        self.find_first(None, "xpath", &xpath).await
    }

    async fn scroll_into_view(&mut self, element: &ElementRef) -> Result<(), DriverError> {
        self.execute(
            "arguments[0].scrollIntoView({block: 'center'});",
            vec![element.to_json()],
        )
        .await?;
        Ok(())
    }

    async fn click(&mut self, element: &ElementRef) -> Result<(), DriverError> {
        let path = format!("element/{}/click", element.id());
        let deadline = Instant::now() + self.action_timeout;
        loop {
            let err = match self.post(&path, &json!({})).await {
                Ok(_) => return Ok(()),
                Err(e) => e,
            };
            let transient = matches!(
                &err,
                DriverError::WebDriver { error, .. } if TRANSIENT_CLICK_ERRORS.contains(&error.as_str())
            );
            if !transient {
                return Err(err);
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout {
                    action: format!("click ({err})"),
                    timeout_ms: duration_ms(self.action_timeout),
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn inner_text(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let value = self.get(&format!("element/{}/text", element.id())).await?;
        value
            .as_str()
            .map(str::to_owned)
            .ok_or(DriverError::MissingValue("element text"))
    }

    async fn attribute(
        &mut self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        let value = self
            .get(&format!("element/{}/attribute/{name}", element.id()))
            .await?;
        Ok(value.as_str().map(str::to_owned))
    }

    async fn read_clipboard(&mut self) -> Result<String, DriverError> {
        let script = "const done = arguments[arguments.length - 1];\
                      navigator.clipboard.readText().then(done, () => done(''));";
        let value = self
            .post("execute/async", &json!({ "script": script, "args": [] }))
            .await?;
        Ok(value.as_str().unwrap_or_default().to_owned())
    }

    async fn clear_clipboard(&mut self) -> Result<(), DriverError> {
        let script = "const done = arguments[arguments.length - 1];\
                      navigator.clipboard.writeText('').then(() => done(true), () => done(false));";
        let value = self
            .post("execute/async", &json!({ "script": script, "args": [] }))
            .await?;
        if value.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(DriverError::ClipboardRejected)
        }
    }
}

/// New-session payload for Chrome with a persistent profile.
fn session_capabilities(config: &WebDriverConfig) -> Value {
    let mut args = vec![
        format!("--user-data-dir={}", config.user_data_dir.display()),
        "--disable-blink-features=AutomationControlled".to_owned(),
        "--window-size=1280,900".to_owned(),
    ];
    if config.headless {
        args.push("--headless=new".to_owned());
    }

    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "chrome",
                "goog:chromeOptions": { "args": args }
            }
        }
    })
}

/// Sends one WebDriver command and unwraps the `value` member of the reply.
async fn send_command(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> Result<Value, DriverError> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(body);
    }
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    let parsed: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(_) if status.is_success() && text.trim().is_empty() => Value::Null,
        Err(_) => {
            return Err(DriverError::WebDriver {
                status: status.as_u16(),
                error: "invalid response".to_owned(),
                message: text.chars().take(200).collect(),
            });
        }
    };

    let value = match parsed {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => other,
    };

    if let Some(error) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        return Err(DriverError::WebDriver {
            status: status.as_u16(),
            error: error.to_owned(),
            message,
        });
    }
    if !status.is_success() {
        return Err(DriverError::WebDriver {
            status: status.as_u16(),
            error: "unknown error".to_owned(),
            message: String::new(),
        });
    }

    Ok(value)
}

fn parse_elements(value: &Value) -> Result<Vec<ElementRef>, DriverError> {
    let items = value
        .as_array()
        .ok_or(DriverError::MissingValue("element list"))?;
    items
        .iter()
        .map(|item| {
            item.get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| ElementRef(id.to_owned()))
                .ok_or(DriverError::MissingValue("element reference"))
        })
        .collect()
}

/// XPath for the first element with ARIA role `role` (explicit, or implied
/// by its tag) whose text or `aria-label` contains `name`, ignoring case.
fn role_xpath(scoped: bool, role: &str, name: &str) -> String {
    const UPPER: &str = "'ABCDEFGHIJKLMNOPQRSTUVWXYZ'";
    const LOWER: &str = "'abcdefghijklmnopqrstuvwxyz'";

    let prefix = if scoped { ".//" } else { "//" };
    let role_test = match implicit_tag(role) {
        Some(tag) => format!("(@role={} or self::{tag})", xpath_literal(role)),
        None => format!("@role={}", xpath_literal(role)),
    };
    let needle = xpath_literal(&name.to_lowercase());
    format!(
        "{prefix}*[{role_test} and (contains(translate(normalize-space(.), {UPPER}, {LOWER}), {needle}) \
         or contains(translate(@aria-label, {UPPER}, {LOWER}), {needle}))]"
    )
}

fn implicit_tag(role: &str) -> Option<&'static str> {
    match role {
        "button" => Some("button"),
        "link" => Some("a"),
        _ => None,
    }
}

/// Quotes `s` as an XPath 1.0 string literal. XPath has no escape syntax,
/// so strings holding both quote kinds are built with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        return format!("'{s}'");
    }
    if !s.contains('"') {
        return format!("\"{s}\"");
    }
    let parts: Vec<String> = s
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xpath_literal_picks_quote_style() {
        assert_eq!(xpath_literal("see more"), "'see more'");
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }

    #[test]
    fn role_xpath_scopes_and_lowercases() {
        let scoped = role_xpath(true, "button", "See More");
        assert!(scoped.starts_with(".//*["));
        assert!(scoped.contains("self::button"));
        assert!(scoped.contains("'see more'"));

        let page = role_xpath(false, "menuitem", "Copy link to post");
        assert!(page.starts_with("//*[@role='menuitem' and"));
        assert!(!page.contains("self::"));
    }

    #[test]
    fn capabilities_carry_profile_dir_and_headless_flag() {
        let mut config = WebDriverConfig::new("http://localhost:9515", ".pw");
        let caps = session_capabilities(&config);
        let args = caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"]
            .as_array()
            .unwrap()
            .clone();
        assert!(args.contains(&json!("--user-data-dir=.pw")));
        assert!(!args.contains(&json!("--headless=new")));

        config.headless = true;
        let caps = session_capabilities(&config);
        let args = &caps["capabilities"]["alwaysMatch"]["goog:chromeOptions"]["args"];
        assert!(args.as_array().unwrap().contains(&json!("--headless=new")));
    }

    #[test]
    fn parse_elements_reads_w3c_references() {
        let value = json!([
            ElementRef("e1".into()).to_json(),
            ElementRef("e2".into()).to_json()
        ]);
        let refs = parse_elements(&value).unwrap();
        assert_eq!(refs, vec![ElementRef("e1".into()), ElementRef("e2".into())]);
        assert!(parse_elements(&json!([{ "other": "x" }])).is_err());
    }
}
