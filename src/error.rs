use std::error::Error as StdError;

#[derive(Debug)]
pub enum Error {
    OutOfRange {
        address: usize,
        source: Option<String>,
    },
    Message(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::OutOfRange { address, source } => {
                if let Some(source) = source {
                    write!(f, "out of range access at {:x} from {}", address, source)
                } else {
                    write!(f, "out of range access at {:x}", address)
                }
            }
            Error::Message(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn from_address(address: usize) -> Self {
        Error::OutOfRange {
            address,
            source: None,
        }
    }

    pub fn from_address_with_source(address: usize, source: String) -> Self {
        Error::OutOfRange {
            address,
            source: Some(source),
        }
    }

    pub fn from_message(msg: String) -> Self {
        Error::Message(msg)
    }
}

impl From<String> for Error {
    fn from(str: String) -> Self {
        Error::from_message(str)
    }
}
