//! Error types
//!
//! Defines domain-specific error types for the registry, router and sessions.

use std::fmt;
use std::io;

/// Registry module errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    HandleInUse(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::HandleInUse(h) => write!(f, "Handle already in use: {}", h),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Router module errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The router control loop has stopped and no longer accepts requests
    Closed,
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Closed => write!(f, "Router is no longer running"),
        }
    }
}

impl std::error::Error for RouterError {}

/// Session (connection pump) errors. All of them end the session.
#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    Router(RouterError),
    OutboundClosed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "I/O error: {}", e),
            SessionError::Router(e) => write!(f, "Router error: {}", e),
            SessionError::OutboundClosed => write!(f, "Outbound queue closed"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<io::Error> for SessionError {
    fn from(error: io::Error) -> Self {
        SessionError::Io(error)
    }
}

impl From<RouterError> for SessionError {
    fn from(error: RouterError) -> Self {
        SessionError::Router(error)
    }
}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Io(io::Error),
    Config(config::ConfigError),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Io(e) => write!(f, "I/O error: {}", e),
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::Io(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

