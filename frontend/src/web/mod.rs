//! 原生 Web API 封装模块
//!
//! 对浏览器 API 的轻量级封装：fetch、LocalStorage、History 路由、文件读取。
//! 这里是前端唯一直接接触 web_sys 的地方。

mod file;
mod http;
pub mod router;
mod storage;

pub use file::read_file;
pub use http::FetchHttpClient;
pub use storage::BrowserTokenStore;
