use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDiag {
    pub backend: String,
    pub version: Option<String>,
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    pub page_number: u32, // 1-based
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagesOut {
    pub ok: bool,
    #[serde(default)]
    pub pages: Vec<PageText>,
    #[serde(default)]
    pub error: Option<String>,
}
