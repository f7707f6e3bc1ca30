use thiserror::Error;

macro_rules! malformed_error {
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// Every failure the codec can report, for both reading and writing blobs.
///
/// The codec distinguishes between structural corruption of a custom debug information blob,
/// which is always reported, and benign absence (unknown record kinds, unknown global versions,
/// missing records), which is represented as `None` by the reading functions and never reaches
/// this type.
///
/// # Error Categories
///
/// ## Framing Errors
/// - [`Error::Malformed`] - Corrupted global or record header, bad alignment, bad record size
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
///
/// ## Edit-and-Continue Map Errors
/// - [`Error::InvalidData`] - A compressed local slot, lambda or state machine map could not be
///   decoded; carries the failing offset and a hex window around it
///
/// ## Encoding Errors
/// - [`Error::ValueOutOfRange`] - A value cannot be represented in the target wire format
/// - [`Error::TooManyRecords`] - More records were added than the global header can count
///
/// # Examples
///
/// ```rust
/// use cdiscope::{Error, customdebuginfo::{try_get_custom_debug_info_record, CustomDebugInfoKind}};
///
/// match try_get_custom_debug_info_record(&[4, 0], CustomDebugInfoKind::EditAndContinueLambdaMap) {
///     Ok(Some(data)) => println!("lambda map: {} bytes", data.len()),
///     Ok(None) => println!("no lambda map"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed blob: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The blob is damaged and could not be parsed.
    ///
    /// This error indicates that a global header or record header doesn't conform to the
    /// custom debug information framing rules. The error includes the source location where
    /// the malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// What was wrong with the blob
        message: String,
        /// Source file that detected the problem
        file: &'static str,
        /// Line in `file`
        line: u32,
    },

    /// An out of bound access was attempted while reading a buffer.
    ///
    /// This error occurs when trying to read data beyond the end of a blob or record payload.
    /// It's a safety check to prevent buffer overruns while decoding untrusted input.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// Source file that detected the problem
        file: &'static str,
        /// Line in `file`
        line: u32,
    },

    /// A compressed Edit-and-Continue map contains invalid data.
    ///
    /// Corrupted maps are usually diagnosed from crash dumps, so the message carries the offset
    /// at which decoding stopped and a hex dump of the bytes around it. The bytes before the
    /// offset and the bytes after it are separated by `*`; a clipped window is marked with `...`.
    ///
    /// # Fields
    ///
    /// * `offset` - Position in the map at which decoding stopped
    /// * `window` - Hex dump around `offset`, e.g. `01-68-FF*`
    #[error("Invalid data at offset {offset}: {window}")]
    InvalidData {
        /// Position in the map at which decoding stopped
        offset: usize,
        /// Hex dump of the bytes surrounding `offset`
        window: String,
    },

    /// A value cannot be represented in the wire format it is being written to.
    ///
    /// Compressed integers cover `0..=0x1FFF_FFFF`, local slot kinds are limited to six bits,
    /// closure and lambda identifiers must be positional, and so on.
    #[error("Value {value} is out of range - {message}")]
    ValueOutOfRange {
        /// The offending value
        value: i64,
        /// What the value was expected to satisfy
        message: &'static str,
    },

    /// More records were added to a custom debug information blob than its header can count.
    ///
    /// The global header stores the record count in a single byte.
    #[error("Too many custom debug info records - {0}")]
    TooManyRecords(usize),
}
