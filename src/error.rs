use custom_error::custom_error;

pub type Result<T> = std::result::Result<T, Error>;

custom_error! {pub Error
    Io{source: std::io::Error} = "I/O error",
    Http{source: reqwest::Error} = "HTTP transport error",
    Fetch{status: u16} = "HTTP error! status: {status}",
    Parse{source: serde_json::Error} = "Banner document could not be decoded",
    InvalidUrl{source: url::ParseError} = "Not an absolute URL",
    Xml{source: quick_xml::Error} = "XML error"
}
