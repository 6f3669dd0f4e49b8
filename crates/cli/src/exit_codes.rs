//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 10-19   | font             | Font resolution codes                    |
//! | 20-29   | serve            | Dashboard server codes                   |
//! | 40-49   | card             | Card delivery codes                      |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Font (10-19)
// =============================================================================

/// No usable CJK font anywhere: a reportable outcome, not a failure.
/// Scripts branch on this to install fonts and retry.
pub const EXIT_FONT_NOT_FOUND: u8 = 10;

// =============================================================================
// Serve (20-29)
// =============================================================================

/// Could not bind the dashboard server (port range exhausted,
/// insufficient privileges).
pub const EXIT_SERVE_BIND: u8 = 20;

// =============================================================================
// Card (40-49)
// =============================================================================

/// Card credentials missing or unreadable.
pub const EXIT_CARD_NOT_CONFIGURED: u8 = 40;

/// Network/HTTP error talking to the platform.
pub const EXIT_CARD_NETWORK: u8 = 42;

/// The platform API rejected the request (non-zero reply code).
pub const EXIT_CARD_API: u8 = 43;
