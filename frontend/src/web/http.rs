//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 实现核心库的 `HttpClient` 特性。
//! 每个请求都挂一个 `AbortController`：超时或调用方丢弃 future 时中止底层 fetch。

use futures::future::{Either, select};
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response};

use intellidash::request::{MultipartForm, RequestBody};
use intellidash::{HttpClient, HttpRequest, HttpResponse, TransportError};

fn js_error(context: &str, err: JsValue) -> TransportError {
    TransportError::Network(format!("{}: {:?}", context, err))
}

/// 丢弃时中止 fetch，除非已 `disarm`
struct AbortOnDrop {
    controller: AbortController,
    armed: bool,
}

impl AbortOnDrop {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abort();
        }
    }
}

fn form_data(form: &MultipartForm) -> Result<FormData, TransportError> {
    let data = FormData::new().map_err(|e| js_error("FormData", e))?;
    for part in &form.parts {
        let bytes = js_sys::Uint8Array::from(part.bytes.as_slice());
        let parts = js_sys::Array::of1(&bytes);
        let options = BlobPropertyBag::new();
        options.set_type(&part.content_type);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|e| js_error("Blob", e))?;
        data.append_with_blob_and_filename(&part.field, &blob, &part.file_name)
            .map_err(|e| js_error("FormData.append", e))?;
    }
    Ok(data)
}

/// 基于 fetch 的 HTTP 客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchHttpClient;

impl FetchHttpClient {
    fn build(req: &HttpRequest, controller: &AbortController) -> Result<Request, TransportError> {
        let headers = Headers::new().map_err(|e| js_error("Headers", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| js_error("Headers.set", e))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));

        match &req.body {
            Some(RequestBody::Json(body)) => opts.set_body(&JsValue::from_str(body)),
            // the browser writes the multipart Content-Type with its boundary
            Some(RequestBody::Multipart(form)) => opts.set_body(&form_data(form)?.into()),
            None => {}
        }

        Request::new_with_str_and_init(&req.url, &opts).map_err(|e| js_error("Request", e))
    }

    async fn fetch(request: Request) -> Result<HttpResponse, TransportError> {
        let window =
            web_sys::window().ok_or_else(|| TransportError::Network("no window".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("fetch", e))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| js_error("Response", e))?;

        let text_promise = response.text().map_err(|e| js_error("Response.text", e))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|e| js_error("Response.text", e))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse {
            status: response.status(),
            body,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = AbortController::new().map_err(|e| js_error("AbortController", e))?;
        let request = Self::build(&req, &controller)?;
        let guard = AbortOnDrop {
            controller,
            armed: true,
        };

        let fetch = Box::pin(Self::fetch(request));
        let result = match req.timeout {
            Some(timeout) => {
                let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
                match select(fetch, TimeoutFuture::new(millis)).await {
                    Either::Left((result, _)) => result,
                    // guard stays armed: dropping it aborts the fetch
                    Either::Right(_) => return Err(TransportError::Timeout),
                }
            }
            None => fetch.await,
        };

        guard.disarm();
        result
    }
}
