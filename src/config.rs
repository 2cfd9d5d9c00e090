use crate::Args;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ocr_space_endpoint: String,
    pub max_upload_size: usize,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            ocr_space_endpoint: args.ocr_space_endpoint,
            max_upload_size: args.max_upload_size,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            ocr_space_endpoint: "http://upstream.test/parse/image".to_string(),
            max_upload_size: 10 * 1024 * 1024,
        }
    }
}
