//! Shared constants for end-to-end tests
//!
//! When test data changes (user identities, artist fixtures, etc.),
//! update only this file.

// ============================================================================
// Test User Identities
// ============================================================================

/// Primary test user
pub const ALICE_EMAIL: &str = "alice@uni.edu";

/// Second test user, used as the swipe counterpart
pub const BOB_EMAIL: &str = "bob@uni.edu";

/// Third test user, used for non-member/permission checks
pub const CAROL_EMAIL: &str = "carol@uni.edu";

// ============================================================================
// Test Artist Fixtures
// ============================================================================

/// Artist both Alice and Bob have in their top lists
pub const SHARED_ARTIST_ID: &str = "artist-shared";
pub const SHARED_ARTIST_NAME: &str = "The Common Ground";

/// Artist only Alice listens to
pub const ALICE_ONLY_ARTIST_ID: &str = "artist-alice";
pub const ALICE_ONLY_ARTIST_NAME: &str = "Alice's Secret";

/// Artist only Bob listens to
pub const BOB_ONLY_ARTIST_ID: &str = "artist-bob";
pub const BOB_ONLY_ARTIST_NAME: &str = "Bob's Basement Band";

// ============================================================================
// Timeouts
// ============================================================================

/// Per-request timeout for the test HTTP client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
