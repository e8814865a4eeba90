//! Invite module: the proposal → acceptance → session lifecycle.
//!
//! ## Example
//!
//! ```
//! use chrono::Utc;
//! use worduel::game::RoundCount;
//! use worduel::invite::{InviteLedger, InviteResponse};
//!
//! let ledger = InviteLedger::default();
//! let invite = ledger
//!     .propose("alice".into(), "bob".into(), None, RoundCount::Three, Utc::now())
//!     .unwrap();
//!
//! match ledger.respond(&invite, true, "bob", Utc::now()).unwrap() {
//!     InviteResponse::Accepted { session, .. } => assert_eq!(session.total_rounds(), 3),
//!     InviteResponse::Declined(_) => unreachable!(),
//! }
//! ```

pub mod ledger;
pub mod models;

pub use ledger::InviteLedger;
pub use models::{Invite, InviteId, InviteLists, InviteResponse, InviteStatus};
