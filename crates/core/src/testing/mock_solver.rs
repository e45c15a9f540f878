//! Mock CAPTCHA solver for testing.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::captcha::{CaptchaError, CaptchaSolver};

/// Mock implementation of the CaptchaSolver trait.
#[derive(Debug)]
pub struct MockCaptchaSolver {
    answer: Result<String, String>,
    images: RwLock<Vec<Vec<u8>>>,
}

impl MockCaptchaSolver {
    /// Solver that answers every image with `answer`.
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            images: RwLock::new(Vec::new()),
        }
    }

    /// Solver whose command always fails with `stderr`.
    pub fn failing(stderr: &str) -> Self {
        Self {
            answer: Err(stderr.to_string()),
            images: RwLock::new(Vec::new()),
        }
    }

    /// Images passed to `solve`, in call order.
    pub async fn received_images(&self) -> Vec<Vec<u8>> {
        self.images.read().await.clone()
    }
}

#[async_trait]
impl CaptchaSolver for MockCaptchaSolver {
    async fn solve(&self, image: &[u8]) -> Result<String, CaptchaError> {
        self.images.write().await.push(image.to_vec());
        match &self.answer {
            Ok(answer) => Ok(answer.clone()),
            Err(stderr) => Err(CaptchaError::CommandFailed {
                code: Some(1),
                stderr: stderr.clone(),
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
