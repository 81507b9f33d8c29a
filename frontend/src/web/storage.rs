//! LocalStorage 封装模块
//!
//! The token is stored as a raw string (not JSON-encoded) under
//! `STORAGE_TOKEN_KEY`, so it stays readable by anything else on the origin.

use gloo_storage::Storage;
use intellidash::TokenStore;
use intellidash_shared::STORAGE_TOKEN_KEY;

/// 浏览器 LocalStorage 中的令牌存储
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTokenStore;

impl BrowserTokenStore {
    /// 获取 LocalStorage 实例
    fn storage() -> web_sys::Storage {
        gloo_storage::LocalStorage::raw()
    }
}

impl TokenStore for BrowserTokenStore {
    fn load(&self) -> Option<String> {
        Self::storage().get_item(STORAGE_TOKEN_KEY).ok()?
    }

    fn save(&self, token: &str) {
        if Self::storage().set_item(STORAGE_TOKEN_KEY, token).is_err() {
            log::error!("Failed to persist token to localStorage");
        }
    }

    fn clear(&self) {
        let _ = Self::storage().remove_item(STORAGE_TOKEN_KEY);
    }
}
