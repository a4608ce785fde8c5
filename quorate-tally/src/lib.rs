//! Quorum decryption of a verifiable election tally.
//!
//! An ElGamal-encrypted tally (and any challenged ballots) is decrypted
//! by a quorum of guardians, each contributing a proof-carrying partial
//! decryption; absent guardians are stood in for by the backup holders
//! from the key ceremony. The full secret key is never reconstructed and
//! no single guardian is trusted.
//!
//! Flow: [`Guardian`]s produce shares, per-ciphertext
//! [`aggregator::ShareSet`]s accumulate them after proof verification,
//! and the [`DecryptionMediator`] combines the verified partials with
//! Lagrange weights into the plaintext [`tally::DecryptionResult`].

pub mod aggregator;
pub mod combiner;
pub mod error;
pub mod guardian;
pub mod mediator;
pub mod share;
pub mod tally;

pub use error::DecryptionError;
pub use guardian::Guardian;
pub use mediator::{DecryptionMediator, SessionState};
pub use share::{CompensatedDecryptionShare, DecryptionShare};
