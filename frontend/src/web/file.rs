//! 文件读取

use wasm_bindgen_futures::JsFuture;

/// Name, MIME type and bytes of a picked file.
pub async fn read_file(file: web_sys::File) -> Result<(String, String, Vec<u8>), String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("Could not read {}: {:?}", file.name(), e))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok((file.name(), file.type_(), bytes))
}
