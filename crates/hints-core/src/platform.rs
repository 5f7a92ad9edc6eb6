use serde::{Deserialize, Serialize};

/// A social platform a post was scraped from.
///
/// Serialized as the short lowercase code the backend uses (`"dy"`, `"xhs"`, ...).
/// Codes this crate does not know about are kept verbatim in [`Platform::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    Xhs,
    Douyin,
    Kuaishou,
    Bilibili,
    Weibo,
    Tieba,
    Zhihu,
    Other(String),
}

impl Platform {
    /// Platforms the backend currently crawls, in display order.
    pub const SUPPORTED: [Platform; 2] = [Platform::Douyin, Platform::Xhs];

    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Platform::Xhs => "xhs",
            Platform::Douyin => "dy",
            Platform::Kuaishou => "ks",
            Platform::Bilibili => "bili",
            Platform::Weibo => "wb",
            Platform::Tieba => "tieba",
            Platform::Zhihu => "zhihu",
            Platform::Other(code) => code,
        }
    }

    /// Human-readable platform name.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Platform::Xhs => "小红书",
            Platform::Douyin => "抖音",
            Platform::Kuaishou => "快手",
            Platform::Bilibili => "哔哩哔哩",
            Platform::Weibo => "微博",
            Platform::Tieba => "贴吧",
            Platform::Zhihu => "知乎",
            Platform::Other(code) => code,
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Platform::Other(code) if code.is_empty())
    }
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Other(String::new())
    }
}

impl From<&str> for Platform {
    fn from(code: &str) -> Self {
        match code {
            "xhs" => Platform::Xhs,
            "dy" => Platform::Douyin,
            "ks" => Platform::Kuaishou,
            "bili" => Platform::Bilibili,
            "wb" => Platform::Weibo,
            "tieba" => Platform::Tieba,
            "zhihu" => Platform::Zhihu,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl From<String> for Platform {
    fn from(code: String) -> Self {
        Platform::from(code.as_str())
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.code().to_string()
    }
}

impl std::str::FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Platform::from(s.trim()))
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
