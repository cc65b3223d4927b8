use thirtyfour::error::WebDriverError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("webdriver: {0}")]
    WebDriver(#[from] WebDriverError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("config: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
    #[error("browser session not started")]
    NotConnected,
    /// The detail page rendered without the element every offer must have.
    #[error("missing {0}")]
    MissingField(&'static str),
}
