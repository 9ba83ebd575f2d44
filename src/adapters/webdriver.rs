//! `PageClient` over the W3C WebDriver HTTP protocol.
//!
//! The driver process (geckodriver or a Selenium grid) is started elsewhere; this client only
//! opens a session against its URL and issues commands through `reqwest`.

use crate::domain::model::ElementHandle;
use crate::domain::ports::{PageClient, PageSessions};
use crate::utils::error::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

/// Web element identifier key from the W3C WebDriver protocol.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
const ENTER_KEY: &str = "\u{E007}";
const XPATH_PREFIX: &str = "xpath:";

pub struct WebDriverClient {
    client: Client,
    base_url: String,
    session_id: String,
}

fn locator(selector: &str) -> Value {
    match selector.strip_prefix(XPATH_PREFIX) {
        Some(xpath) => json!({ "using": "xpath", "value": xpath }),
        None => json!({ "using": "css selector", "value": selector }),
    }
}

fn element_ref(element: &ElementHandle) -> Value {
    json!({ ELEMENT_KEY: element.id() })
}

fn parse_element(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::new)
}

fn protocol_error(message: impl Into<String>) -> HarvestError {
    HarvestError::WebDriver {
        message: message.into(),
    }
}

impl WebDriverClient {
    /// Open a new browser session (Firefox) on the driver at `webdriver_url`.
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let client = Client::new();
        let base_url = webdriver_url.trim_end_matches('/').to_string();
        let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "firefox",
                    "moz:firefoxOptions": { "args": args }
                }
            }
        });

        let request = client
            .post(format!("{}/session", base_url))
            .json(&capabilities);
        let value = Self::execute(request, None).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| protocol_error("new session response without sessionId"))?
            .to_string();

        tracing::info!("🌐 WebDriver session {} opened", session_id);
        Ok(Self {
            client,
            base_url,
            session_id,
        })
    }

    /// Attach to an already open session.
    pub fn attach(webdriver_url: &str, session_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: webdriver_url.trim_end_matches('/').to_string(),
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn quit(self) -> Result<()> {
        let request = self.client.delete(self.endpoint(""));
        Self::execute(request, None).await?;
        tracing::info!("WebDriver session {} closed", self.session_id);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }

    async fn execute(request: RequestBuilder, selector: Option<&str>) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let mut body: Value = response.json().await?;
        let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(value);
        }

        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        if error == "no such element" {
            if let Some(selector) = selector {
                return Err(HarvestError::element_not_found(selector));
            }
        }
        let message = value.get("message").and_then(Value::as_str).unwrap_or("");
        Err(protocol_error(format!("{} (HTTP {}): {}", error, status.as_u16(), message)))
    }

    async fn post(&self, path: &str, body: Value, selector: Option<&str>) -> Result<Value> {
        let request = self.client.post(self.endpoint(path)).json(&body);
        Self::execute(request, selector).await
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let request = self.client.get(self.endpoint(path));
        Self::execute(request, None).await
    }
}

#[async_trait]
impl PageClient for WebDriverClient {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.post("/url", json!({ "url": url }), None).await?;
        Ok(())
    }

    async fn find_single(&self, selector: &str) -> Result<ElementHandle> {
        let value = self.post("/element", locator(selector), Some(selector)).await?;
        parse_element(&value).ok_or_else(|| HarvestError::element_not_found(selector))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementHandle>> {
        let value = self.post("/elements", locator(selector), Some(selector)).await?;
        let items = value
            .as_array()
            .ok_or_else(|| protocol_error("find elements response is not an array"))?;
        Ok(items.iter().filter_map(parse_element).collect())
    }

    async fn find_within(&self, parent: &ElementHandle, selector: &str) -> Result<ElementHandle> {
        let path = format!("/element/{}/element", parent.id());
        let value = self.post(&path, locator(selector), Some(selector)).await?;
        parse_element(&value).ok_or_else(|| HarvestError::element_not_found(selector))
    }

    async fn submit_text(&self, selector: &str, text: &str) -> Result<()> {
        let input = self.find_single(selector).await?;
        self.post(&format!("/element/{}/clear", input.id()), json!({}), None)
            .await?;
        let keys = format!("{}{}", text, ENTER_KEY);
        self.post(
            &format!("/element/{}/value", input.id()),
            json!({ "text": keys }),
            None,
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementHandle) -> Result<()> {
        let script = json!({
            "script": "arguments[0].scrollIntoView({block: 'center'});",
            "args": [element_ref(element)]
        });
        self.post("/execute/sync", script, None).await?;
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        self.post(&format!("/element/{}/click", element.id()), json!({}), None)
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String> {
        let value = self.get(&format!("/element/{}/text", element.id())).await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>> {
        let value = self
            .get(&format!("/element/{}/attribute/{}", element.id(), name))
            .await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn current_url(&self) -> Result<String> {
        let value = self.get("/url").await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| protocol_error("current URL response is not a string"))
    }
}

/// Opens a fresh browser session on the configured driver for each run.
#[derive(Debug, Clone)]
pub struct WebDriverSessions {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverSessions {
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
        }
    }
}

#[async_trait]
impl PageSessions for WebDriverSessions {
    type Page = WebDriverClient;

    async fn open(&self) -> Result<WebDriverClient> {
        WebDriverClient::connect(&self.webdriver_url, self.headless).await
    }

    async fn close(&self, page: WebDriverClient) -> Result<()> {
        page.quit().await
    }
}
