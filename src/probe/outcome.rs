//! Outcome classification
//!
//! Every probe ends in exactly one [`Outcome`]: the HTTP status code of the
//! response, or a [`FailureCategory`] naming the root cause of a transport
//! failure. Non-2xx responses are ordinary status outcomes.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Maximum number of `source()` hops followed when looking for a root cause
pub const MAX_CAUSE_DEPTH: usize = 64;

/// Result of one probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The server answered with this status code
    Status(u16),

    /// The request failed before a complete response was read
    Failure(FailureCategory),
}

impl Outcome {
    /// Returns the status code, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            Self::Failure(_) => None,
        }
    }

    /// Returns the failure category, if the request failed
    pub fn failure(&self) -> Option<&FailureCategory> {
        match self {
            Self::Status(_) => None,
            Self::Failure(category) => Some(category),
        }
    }

    /// Returns true for a 2xx status
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Status(code) if (200..300).contains(code))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "{}", code),
            Self::Failure(category) => write!(f, "{}", category),
        }
    }
}

/// Root-cause category of a failed probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The per-request deadline expired
    Timeout,

    /// The host name could not be resolved
    Dns,

    /// The remote host refused the connection
    ConnectionRefused,

    /// The connection was reset or aborted mid-request
    ConnectionReset,

    /// Any other failure to establish a connection
    Connection,

    /// TLS handshake or certificate failure
    Tls,

    /// Redirect loop or too many redirects
    Redirect,

    /// The response body could not be read
    Body,

    /// The response body could not be decoded (gzip, brotli)
    Decode,

    /// The URL is not an absolute http(s) URL
    InvalidUrl,

    /// The request could not be built or sent
    Request,

    /// The probe never got a concurrency permit
    Cancelled,

    /// Unrecognized root cause, named by the leading segment of its message
    Other(String),
}

impl FailureCategory {
    /// Stable name used in per-request lines and summaries
    pub fn name(&self) -> &str {
        match self {
            Self::Timeout => "TimeoutError",
            Self::Dns => "DNSError",
            Self::ConnectionRefused => "ConnectionRefusedError",
            Self::ConnectionReset => "ConnectionResetError",
            Self::Connection => "ConnectionError",
            Self::Tls => "TLSError",
            Self::Redirect => "RedirectError",
            Self::Body => "BodyError",
            Self::Decode => "DecodeError",
            Self::InvalidUrl => "InvalidURLError",
            Self::Request => "RequestError",
            Self::Cancelled => "CancelledError",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over an error and its chain of causes, capped at [`MAX_CAUSE_DEPTH`]
/// hops past the first error
pub fn cause_chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |&e| e.source()).take(MAX_CAUSE_DEPTH + 1)
}

/// Walks the cause chain and returns its last element
///
/// Stops after [`MAX_CAUSE_DEPTH`] hops so a malformed chain cannot hang
/// the caller.
pub fn root_cause<'a>(err: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    cause_chain(err).last().unwrap_or(err)
}

/// Classifies a failed request by its cause chain
///
/// Each layer of the chain is inspected; the deepest layer with a known
/// category wins, so a DNS failure wrapped in a generic connect error is
/// reported as [`FailureCategory::Dns`]. A timeout flagged anywhere in the
/// chain is always [`FailureCategory::Timeout`]. When no layer is
/// recognized the root cause is named by the text before the first `:`
/// of its message.
pub fn classify_error(err: &(dyn StdError + 'static)) -> FailureCategory {
    let mut category = None;
    let mut timed_out = false;

    for layer in cause_chain(err) {
        if let Some(found) = categorize_layer(layer) {
            timed_out |= found == FailureCategory::Timeout;
            category = Some(found);
        }
    }

    if timed_out {
        return FailureCategory::Timeout;
    }

    category.unwrap_or_else(|| other_from_message(root_cause(err)))
}

/// Maps a single error layer to a category, without looking at its sources
fn categorize_layer(err: &(dyn StdError + 'static)) -> Option<FailureCategory> {
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        return categorize_reqwest(e);
    }

    if let Some(e) = err.downcast_ref::<io::Error>() {
        if let Some(category) = categorize_io(e.kind()) {
            return Some(category);
        }
    }

    if err.is::<tokio::time::error::Elapsed>() {
        return Some(FailureCategory::Timeout);
    }

    if err.is::<url::ParseError>() {
        return Some(FailureCategory::InvalidUrl);
    }

    categorize_message(&err.to_string())
}

fn categorize_reqwest(err: &reqwest::Error) -> Option<FailureCategory> {
    if err.is_timeout() {
        Some(FailureCategory::Timeout)
    } else if err.is_connect() {
        Some(FailureCategory::Connection)
    } else if err.is_redirect() {
        Some(FailureCategory::Redirect)
    } else if err.is_decode() {
        Some(FailureCategory::Decode)
    } else if err.is_body() {
        Some(FailureCategory::Body)
    } else if err.is_builder() {
        Some(FailureCategory::InvalidUrl)
    } else if err.is_request() {
        Some(FailureCategory::Request)
    } else {
        None
    }
}

fn categorize_io(kind: io::ErrorKind) -> Option<FailureCategory> {
    match kind {
        io::ErrorKind::TimedOut => Some(FailureCategory::Timeout),
        io::ErrorKind::ConnectionRefused => Some(FailureCategory::ConnectionRefused),
        io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::UnexpectedEof => Some(FailureCategory::ConnectionReset),
        io::ErrorKind::NotConnected | io::ErrorKind::AddrNotAvailable => {
            Some(FailureCategory::Connection)
        }
        _ => None,
    }
}

/// Last resort for opaque transport errors that only expose a message
fn categorize_message(message: &str) -> Option<FailureCategory> {
    let message = message.to_ascii_lowercase();

    if message.starts_with("dns error") || message.contains("failed to lookup address") {
        Some(FailureCategory::Dns)
    } else if message.contains("certificate")
        || message.contains("handshake")
        || message.contains("tls")
    {
        Some(FailureCategory::Tls)
    } else if message.contains("timed out") {
        Some(FailureCategory::Timeout)
    } else {
        None
    }
}

fn other_from_message(root: &(dyn StdError + 'static)) -> FailureCategory {
    let message = root.to_string();
    let name = message.split(':').next().unwrap_or("").trim();

    if name.is_empty() {
        FailureCategory::Other("UnknownError".to_string())
    } else {
        FailureCategory::Other(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Error with an optional inner cause, for building chains of any length
    #[derive(Debug)]
    struct Layer {
        name: String,
        inner: Option<Box<Layer>>,
        root: Option<io::Error>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.name)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            if let Some(inner) = &self.inner {
                return Some(inner.as_ref());
            }
            self.root.as_ref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    /// Builds `len` nested layers named `layer-0` (outermost) .. `layer-{len-1}`
    fn chain(len: usize, root: Option<io::Error>) -> Layer {
        let mut current = Layer {
            name: format!("layer-{}: detail", len - 1),
            inner: None,
            root,
        };
        for i in (0..len - 1).rev() {
            current = Layer {
                name: format!("layer-{}: detail", i),
                inner: Some(Box::new(current)),
                root: None,
            };
        }
        current
    }

    #[test]
    fn test_cause_chain_outermost_first() {
        let err = chain(3, Some(io::Error::new(io::ErrorKind::Other, "root")));
        let names: Vec<String> = cause_chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(
            names,
            vec!["layer-0: detail", "layer-1: detail", "layer-2: detail", "root"]
        );
    }

    #[test]
    fn test_root_cause_of_single_error() {
        let err = chain(1, None);
        let root = root_cause(&err);
        assert_eq!(root.to_string(), "layer-0: detail");
    }

    #[test]
    fn test_root_cause_at_depth_cap() {
        // 64 layers: the root is exactly 63 hops away
        let err = chain(MAX_CAUSE_DEPTH, None);
        let root = root_cause(&err);
        assert_eq!(root.to_string(), format!("layer-{}: detail", MAX_CAUSE_DEPTH - 1));
        assert_eq!(cause_chain(&err).count(), MAX_CAUSE_DEPTH);
    }

    #[test]
    fn test_overlong_chain_is_cut_at_cap() {
        let err = chain(500, None);
        let root = root_cause(&err);
        assert_eq!(root.to_string(), format!("layer-{}: detail", MAX_CAUSE_DEPTH));
        assert_eq!(cause_chain(&err).count(), MAX_CAUSE_DEPTH + 1);
    }

    #[test]
    fn test_unknown_root_named_by_message_prefix() {
        let err = chain(3, None);
        assert_eq!(
            classify_error(&err),
            FailureCategory::Other("layer-2".to_string())
        );
    }

    #[test]
    fn test_io_root_cause_classified() {
        let err = chain(
            4,
            Some(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
        );
        assert_eq!(classify_error(&err), FailureCategory::ConnectionRefused);

        let err = chain(2, Some(io::Error::new(io::ErrorKind::ConnectionReset, "reset")));
        assert_eq!(classify_error(&err), FailureCategory::ConnectionReset);
    }

    #[test]
    fn test_timeout_anywhere_in_chain_wins() {
        let err = chain(2, Some(io::Error::new(io::ErrorKind::TimedOut, "deadline")));
        assert_eq!(classify_error(&err), FailureCategory::Timeout);
    }

    #[test]
    fn test_dns_message_layer() {
        let mut err = chain(2, Some(io::Error::new(io::ErrorKind::Other, "no such host")));
        err.name = "dns error".to_string();
        assert_eq!(classify_error(&err), FailureCategory::Dns);
    }

    #[test]
    fn test_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        assert_eq!(classify_error(&err), FailureCategory::InvalidUrl);
    }

    #[tokio::test]
    async fn test_elapsed_is_timeout() {
        let err = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        assert_eq!(classify_error(&err), FailureCategory::Timeout);
    }

    #[test]
    fn test_outcome_exactly_one_variant() {
        let ok = Outcome::Status(404);
        assert_eq!(ok.status(), Some(404));
        assert!(ok.failure().is_none());
        assert!(!ok.is_success());

        let failed = Outcome::Failure(FailureCategory::Timeout);
        assert!(failed.status().is_none());
        assert_eq!(failed.failure(), Some(&FailureCategory::Timeout));
        assert!(!failed.is_success());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Status(200).to_string(), "200");
        assert_eq!(
            Outcome::Failure(FailureCategory::Dns).to_string(),
            "DNSError"
        );
        assert_eq!(
            Outcome::Failure(FailureCategory::Other("Weird".to_string())).to_string(),
            "Weird"
        );
    }
}
