//! Process exit codes.
//!
//! CI systems can tell apart a run in which some documents failed from one
//! in which the tool itself could not start.

/// Every document was formatted (or left unchanged)
pub const SUCCESS: i32 = 0;

/// At least one document could not be read, parsed or written
pub const FILES_FAILED: i32 = 1;

/// Tool error - bad configuration, unreadable root directory or internal error
pub const TOOL_ERROR: i32 = 2;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{FILES_FAILED, SUCCESS, TOOL_ERROR};

    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    pub fn files_failed() -> ! {
        std::process::exit(FILES_FAILED);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
