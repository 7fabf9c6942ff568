//! HTTP throughput measurement

use crate::error::{ProbeError, ProbeResult, Result};
use futures::StreamExt;
use reqwest::{header, Client};
use std::time::{Duration, Instant};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Measures download and upload throughput against HTTP endpoints
#[derive(Debug, Clone)]
pub struct BandwidthMeter {
    client: Client,
    download_url: String,
    upload_url: String,
    upload_bytes: u64,
}

impl BandwidthMeter {
    pub fn new<D: Into<String>, U: Into<String>>(
        download_url: D,
        upload_url: U,
        upload_bytes: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("{}/{}", crate::PKG_NAME, crate::VERSION))
            .build()?;

        Ok(Self {
            client,
            download_url: download_url.into(),
            upload_url: upload_url.into(),
            upload_bytes,
        })
    }

    /// Stream the download endpoint's body and report bits per second.
    ///
    /// `Ok(None)` means the server answered with an empty body.
    pub async fn download(&self) -> ProbeResult<Option<f64>> {
        let started = Instant::now();
        let response = self
            .client
            .get(&self.download_url)
            .send()
            .await
            .map_err(transfer_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::sample(format!("download endpoint returned HTTP {}", status)));
        }

        let mut body = response.bytes_stream();
        let mut received: u64 = 0;
        while let Some(chunk) = body.next().await {
            received += chunk.map_err(transfer_error)?.len() as u64;
        }

        Ok(bits_per_second(received, started.elapsed()))
    }

    /// Post `upload_bytes` zero bytes and report bits per second
    pub async fn upload(&self) -> ProbeResult<Option<f64>> {
        let payload = vec![0u8; self.upload_bytes as usize];
        let started = Instant::now();

        let response = self
            .client
            .post(&self.upload_url)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(payload)
            .send()
            .await
            .map_err(transfer_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::sample(format!("upload endpoint returned HTTP {}", status)));
        }
        // Wait for the full acknowledgement before stopping the clock
        response.bytes().await.map_err(transfer_error)?;

        Ok(bits_per_second(self.upload_bytes, started.elapsed()))
    }
}

fn transfer_error(error: reqwest::Error) -> ProbeError {
    if error.is_connect() || error.is_builder() {
        ProbeError::unavailable(format!("bandwidth server unreachable: {}", error))
    } else if error.is_timeout() {
        ProbeError::sample("transfer timed out")
    } else {
        ProbeError::sample(format!("transfer failed: {}", error))
    }
}

fn bits_per_second(bytes: u64, elapsed: Duration) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    if bytes == 0 || seconds <= 0.0 {
        return None;
    }
    Some(bytes as f64 * 8.0 / seconds)
}
