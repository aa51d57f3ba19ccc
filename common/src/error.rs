use std::num::ParseIntError;

use thiserror::Error;

use crate::entity::PropertyPath;
use crate::types::EntityId;

/// Why a textual Steam ID could not be converted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SteamIdError {
    #[error("expected the form STEAM_X:Y:Z")]
    InvalidFormat,
    #[error("invalid number: {0}")]
    ParseInt(#[from] ParseIntError),
    #[error("account number does not fit into 32 bits")]
    OutOfRange,
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A forced property lookup found nothing at `path`.
    #[error("property `{path}` not found on entity {entity_id}")]
    PropertyNotFound {
        entity_id: EntityId,
        path: PropertyPath,
    },
    /// A forced property lookup was made on an object whose entity is gone.
    #[error("property `{path}` requested but the object has no backing entity")]
    EntityMissing { path: PropertyPath },
    #[error("malformed Steam ID `{input}`: {reason}")]
    MalformedSteamId {
        input: String,
        #[source]
        reason: SteamIdError,
    },
    #[error("invalid demo header: {0}")]
    InvalidHeader(String),
    #[error("nom parsing error: {0:?}")]
    Nom(nom::error::ErrorKind),
    #[error("unexpected end of input, {needed} more bytes required")]
    UnexpectedEof { needed: usize },
    #[error("failed to read config file")]
    ConfigRead(#[from] std::io::Error),
    #[error("failed to parse config file")]
    ConfigParse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error {
    kind: ErrorKind,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        ErrorKind::ConfigRead(err).into()
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        ErrorKind::ConfigParse(err).into()
    }
}

impl nom::error::ParseError<&[u8]> for Error {
    fn from_error_kind(_input: &[u8], kind: nom::error::ErrorKind) -> Self {
        ErrorKind::Nom(kind).into()
    }

    fn append(_input: &[u8], _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Incomplete(nom::Needed::Size(n)) => {
                ErrorKind::UnexpectedEof { needed: n.get() }.into()
            }
            nom::Err::Incomplete(nom::Needed::Unknown) => {
                ErrorKind::UnexpectedEof { needed: 0 }.into()
            }
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
        }
    }
}

pub type IResult<I, O> = nom::IResult<I, O, Error>;

pub type Result<T> = std::result::Result<T, Error>;
