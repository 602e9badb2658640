use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};

use crate::errors::Result;
use crate::http::{HttpClient, HttpResponse};


/// In-memory `HttpClient` that records every requested URL.
/// Unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct MockHttp {
    routes: HashMap<String, HttpResponse>,
    calls: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.respond(url, 200, Some("text/html; charset=utf-8"), html.as_bytes().to_vec())
    }

    pub fn respond(
        mut self,
        url: &str,
        status: u16,
        content_type: Option<&str>,
        body: Vec<u8>,
    ) -> Self {
        self.routes.insert(
            url.to_string(),
            HttpResponse {
                status,
                content_type: content_type.map(String::from),
                body,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl HttpClient for MockHttp {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());

        self.routes.get(url).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("{url}: unreachable"),
            )
            .into()
        })
    }
}

fn pattern(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    pattern(width, height)
        .write_to(&mut buffer, ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    pattern(width, height)
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .unwrap();
    buffer.into_inner()
}
