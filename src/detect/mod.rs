//! Capability queries over the ambient host environment.
//!
//! Every query is a pure function of the environment's current state. Nothing
//! is cached: a long-lived page can gain or lose objects between calls, so the
//! orchestrator takes a fresh [`Capabilities`] snapshot per save.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static CHROME_IOS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CriOS/\d+").expect("CriOS pattern is valid"));

/// The navigator-equivalent object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    pub user_agent: String,
    pub vendor: String,
    /// Exposes the non-standard save-or-open-blob primitive.
    pub legacy_save_blob: bool,
}

/// The window-equivalent object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Exposes a `safari` property.
    pub safari: bool,
    pub location: Url,
}

/// The anchor element prototype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnchorPrototype {
    pub download: bool,
}

/// Ambient platform state. `None` means the object is absent, as in a test
/// runner or a server-side render.
pub trait Environment {
    fn navigator(&self) -> Option<Navigator>;

    fn window(&self) -> Option<Window>;

    fn anchor_prototype(&self) -> Option<AnchorPrototype>;

    /// A binary-to-data-URI conversion facility is available.
    fn has_file_reader(&self) -> bool;
}

fn user_agent(env: &(impl Environment + ?Sized)) -> String {
    env.navigator().map(|n| n.user_agent).unwrap_or_default()
}

/// Desktop Apple user agent with WebKit but without the Safari token: an
/// in-app browser that mishandles navigation downloads.
pub fn is_apple_desktop_embedded_webview(env: &(impl Environment + ?Sized)) -> bool {
    let ua = user_agent(env);
    ua.contains("Macintosh") && ua.contains("AppleWebKit") && !ua.contains("Safari")
}

pub fn is_first_party_desktop_browser(env: &(impl Environment + ?Sized)) -> bool {
    let Some(window) = env.window() else {
        return false;
    };
    if window.safari {
        return true;
    }
    let navigator = env.navigator().unwrap_or_default();
    navigator.vendor.contains("Apple")
        && navigator.user_agent.contains("Safari")
        && !navigator.user_agent.contains("Chrome")
}

pub fn is_chromium_on_ios(env: &(impl Environment + ?Sized)) -> bool {
    CHROME_IOS.is_match(&user_agent(env))
}

pub fn supports_native_download_attribute(env: &(impl Environment + ?Sized)) -> bool {
    env.anchor_prototype().is_some_and(|proto| proto.download)
        && !is_apple_desktop_embedded_webview(env)
}

pub fn supports_legacy_save_blob(env: &(impl Environment + ?Sized)) -> bool {
    env.navigator().is_some_and(|n| n.legacy_save_blob)
}

/// Immutable snapshot of the five capability facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub apple_desktop_embedded_webview: bool,
    pub first_party_desktop_browser: bool,
    pub chromium_on_ios: bool,
    pub native_download_attribute: bool,
    pub legacy_save_blob: bool,
}

impl Capabilities {
    pub fn detect(env: &(impl Environment + ?Sized)) -> Self {
        Self {
            apple_desktop_embedded_webview: is_apple_desktop_embedded_webview(env),
            first_party_desktop_browser: is_first_party_desktop_browser(env),
            chromium_on_ios: is_chromium_on_ios(env),
            native_download_attribute: supports_native_download_attribute(env),
            legacy_save_blob: supports_legacy_save_blob(env),
        }
    }
}

/// A fixed environment, handy for embedding the library outside a browser
/// and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    pub navigator: Option<Navigator>,
    pub window: Option<Window>,
    pub anchor_prototype: Option<AnchorPrototype>,
    pub file_reader: bool,
}

impl Environment for StaticEnvironment {
    fn navigator(&self) -> Option<Navigator> {
        self.navigator.clone()
    }

    fn window(&self) -> Option<Window> {
        self.window.clone()
    }

    fn anchor_prototype(&self) -> Option<AnchorPrototype> {
        self.anchor_prototype
    }

    fn has_file_reader(&self) -> bool {
        self.file_reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC_SAFARI: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
    const MAC_WEBVIEW: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko)";
    const MAC_CHROME: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const IOS_CHROME: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0.6099.119 Mobile/15E148 Safari/604.1";

    fn browser(ua: &str, vendor: &str) -> StaticEnvironment {
        StaticEnvironment {
            navigator: Some(Navigator {
                user_agent: ua.to_string(),
                vendor: vendor.to_string(),
                legacy_save_blob: false,
            }),
            window: Some(Window {
                safari: false,
                location: Url::parse("https://app.example.com/").unwrap(),
            }),
            anchor_prototype: Some(AnchorPrototype { download: true }),
            file_reader: true,
        }
    }

    #[test]
    fn test_absent_environment_degrades_to_false() {
        let caps = Capabilities::detect(&StaticEnvironment::default());
        assert_eq!(caps, Capabilities::default());
    }

    #[test]
    fn test_mac_safari() {
        let caps = Capabilities::detect(&browser(MAC_SAFARI, "Apple Computer, Inc."));
        assert!(caps.first_party_desktop_browser);
        assert!(!caps.apple_desktop_embedded_webview);
        assert!(caps.native_download_attribute);
    }

    #[test]
    fn test_mac_chrome_is_not_first_party() {
        let caps = Capabilities::detect(&browser(MAC_CHROME, "Google Inc."));
        assert!(!caps.first_party_desktop_browser);
        assert!(caps.native_download_attribute);
    }

    #[test]
    fn test_webview_disables_download_attribute() {
        let caps = Capabilities::detect(&browser(MAC_WEBVIEW, "Apple Computer, Inc."));
        assert!(caps.apple_desktop_embedded_webview);
        assert!(!caps.native_download_attribute);
    }

    #[test]
    fn test_chrome_ios() {
        let caps = Capabilities::detect(&browser(IOS_CHROME, "Apple Computer, Inc."));
        assert!(caps.chromium_on_ios);
        assert!(!caps.apple_desktop_embedded_webview);
    }

    #[test]
    fn test_safari_window_property_wins() {
        let mut env = browser(MAC_CHROME, "Google Inc.");
        if let Some(window) = env.window.as_mut() {
            window.safari = true;
        }
        assert!(is_first_party_desktop_browser(&env));
    }

    #[test]
    fn test_legacy_save_blob() {
        let mut env = browser("Mozilla/5.0 (Windows NT 10.0; Trident/7.0; rv:11.0)", "");
        env.anchor_prototype = Some(AnchorPrototype { download: false });
        if let Some(navigator) = env.navigator.as_mut() {
            navigator.legacy_save_blob = true;
        }
        let caps = Capabilities::detect(&env);
        assert!(caps.legacy_save_blob);
        assert!(!caps.native_download_attribute);
    }
}
