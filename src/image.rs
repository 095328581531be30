//! Download emoji images into scoped temporary files.
//!
//! An [ImageBuffer] owns an anonymous temporary file which the OS reclaims as
//! soon as the buffer is dropped, whether or not the upload went through.

use crate::error::Failure;
use reqwest::multipart::Part;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use url::Url;

/// Name given to uploads whose URL has no usable last path segment.
const FALLBACK_FILE_NAME: &str = "emoji";

/// Anything that can turn an image URL into a buffered image.
pub trait ImageSource {
    async fn fetch(&self, url: &Url) -> Result<ImageBuffer, Failure>;
}

/// Streams images over HTTP.
#[derive(Default)]
pub struct HttpImageSource {
    http: reqwest::Client,
}

impl ImageSource for HttpImageSource {
    /// Nothing is retried; any failure here is a [Failure::Download] or a
    /// [Failure::Buffer], both of which only cost the current emoji.
    async fn fetch(&self, url: &Url) -> Result<ImageBuffer, Failure> {
        let download = |reason: String| Failure::Download {
            url: url.to_string(),
            reason,
        };

        let mut res = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| download(e.to_string()))?;

        if !res.status().is_success() {
            return Err(download(format!("unexpected status {}", res.status())));
        }

        let mut buf = ImageBuffer::for_url(url)?;
        while let Some(chunk) = res.chunk().await.map_err(|e| download(e.to_string()))? {
            buf.write_chunk(&chunk)?;
        }

        Ok(buf)
    }
}

/// A fully downloaded image, ready to be attached to any number of requests.
#[derive(Debug)]
pub struct ImageBuffer {
    file: File,
    len: u64,
    file_name: String,
    mime: String,
}

impl ImageBuffer {
    /// Create an empty buffer named and typed after the URL's last segment.
    pub fn for_url(url: &Url) -> Result<Self, Failure> {
        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_owned();

        let mime = mime_guess::from_path(url.path())
            .first_or_octet_stream()
            .essence_str()
            .to_owned();

        Ok(ImageBuffer {
            file: tempfile::tempfile()?,
            len: 0,
            file_name,
            mime,
        })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), Failure> {
        self.file.write_all(chunk)?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.len
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Read the whole image back from the start and wrap it as a multipart
    /// file part. Can be called repeatedly, e.g. to resubmit.
    pub fn to_part(&mut self) -> Result<Part, Failure> {
        self.file.seek(SeekFrom::Start(0))?;

        let mut bytes = Vec::with_capacity(self.len as usize);
        self.file.read_to_end(&mut bytes)?;

        let part = Part::bytes(bytes)
            .file_name(self.file_name.clone())
            .mime_str(&self.mime)?;

        Ok(part)
    }

    #[cfg(test)]
    pub fn from_bytes(url: &str, bytes: &[u8]) -> Self {
        let mut buf = ImageBuffer::for_url(&Url::parse(url).unwrap()).unwrap();
        buf.write_chunk(bytes).unwrap();
        buf
    }
}
