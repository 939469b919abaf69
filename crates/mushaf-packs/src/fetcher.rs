use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::PackError;

/// A started pack download.
pub struct PackDownload {
    /// Total size of the complete pack file, when the server reports one.
    pub total_bytes: Option<u64>,
    /// Byte offset this stream starts at. Zero when the server ignored the
    /// resume request and is sending the whole file again.
    pub offset: u64,
    pub stream: BoxStream<'static, Result<Vec<u8>, PackError>>,
}

/// Remote pack source: a fixed base location plus a per-language file name.
#[async_trait]
pub trait PackFetcher: Send + Sync {
    /// Start fetching a language's pack, asking the server to resume from
    /// `offset` bytes when it is non-zero.
    async fn fetch(&self, language: &str, offset: u64) -> Result<PackDownload, PackError>;
}

/// HTTP implementation over the pack CDN.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn with_timeout(base_url: String, timeout: std::time::Duration) -> Result<Self, PackError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn pack_url(&self, language: &str) -> String {
        format!("{}/{}.json", self.base_url.trim_end_matches('/'), language)
    }
}

#[async_trait]
impl PackFetcher for HttpFetcher {
    async fn fetch(&self, language: &str, offset: u64) -> Result<PackDownload, PackError> {
        let url = self.pack_url(language);
        let mut request = self.client.get(&url);
        if offset > 0 {
            request = request.header(reqwest::header::RANGE, format!("bytes={offset}-"));
        }

        let response = request.send().await?;
        let status = response.status();

        let resumed_at = match status.as_u16() {
            206 => offset,
            200 => 0,
            _ => return Err(PackError::Http(status.as_u16())),
        };

        let total_bytes = response.content_length().map(|len| resumed_at + len);
        let stream = response
            .bytes_stream()
            .map(|chunk| match chunk {
                Ok(bytes) => Ok(bytes.to_vec()),
                Err(e) => Err(PackError::Network(e)),
            })
            .boxed();

        Ok(PackDownload {
            total_bytes,
            offset: resumed_at,
            stream,
        })
    }
}
